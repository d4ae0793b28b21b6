//! Canonical text form of test steps
//!
//! One step per line, expectation after ` >> `:
//!
//! ```text
//! open the login page >> the form is shown
//! fill in the form
//!   type the account >> account is echoed
//!   type the password >>
//!     characters are masked
//!     caps-lock warning appears
//!   <<
//! ```
//!
//! Child steps carry a two-space prefix on every line. An expectation with
//! a line break becomes a `>>` ... `<<` block whose lines are indented two
//! more spaces. In an independent script the expectation is written to the
//! expectation file instead: bare when single-line, a block otherwise.

use crate::zentao::types::{TestStep, STEP_TYPE_GROUP, STEP_TYPE_ITEM, STEP_TYPE_STEP};

/// Indentation of child steps and of expectation block lines
pub const INDENT: &str = "  ";
pub const EXPECT_OPEN: &str = ">>";
pub const EXPECT_CLOSE: &str = "<<";
const INLINE_SEPARATOR: &str = " >> ";

/// Rewrite `\r\n` and lone `\r` breaks to `\n`
pub fn normalize_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Render a description, prefixing every line of a child step
pub fn step_content(desc: &str, is_child: bool) -> String {
    let desc = normalize_breaks(desc.trim());
    let prefix = if is_child { INDENT } else { "" };
    desc.split('\n')
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render an expectation
///
/// Inline (`independent == false`) the result is appended to the step line;
/// independent it stands on its own. Empty expectations render as nothing.
pub fn expect_content(expect: &str, is_child: bool, independent: bool) -> String {
    let expect = normalize_breaks(expect.trim());
    if expect.is_empty() {
        return String::new();
    }

    let indent = if is_child { INDENT } else { "" };

    if !expect.contains('\n') {
        return if independent {
            format!("{}{}", indent, expect)
        } else {
            format!("{}{}", INLINE_SEPARATOR, expect)
        };
    }

    let body = expect
        .split('\n')
        .map(|line| format!("{}{}{}", indent, INDENT, line))
        .collect::<Vec<_>>()
        .join("\n");

    let open = if independent {
        format!("{}{}", indent, EXPECT_OPEN)
    } else {
        format!(" {}", EXPECT_OPEN)
    };
    format!("{}\n{}\n{}{}", open, body, indent, EXPECT_CLOSE)
}

/// Render one step with its expectation inline
pub fn case_content(step: &TestStep) -> String {
    let is_child = step.is_child();
    format!(
        "{}{}",
        step_content(&step.desc, is_child),
        expect_content(&step.expect, is_child, false)
    )
}

/// Render all steps with inline expectations
pub fn render_steps(steps: &[TestStep]) -> String {
    steps
        .iter()
        .map(case_content)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render steps for an independent script: step lines, and expectation blocks
/// in the same order (steps without an expectation contribute nothing)
pub fn render_independent(steps: &[TestStep]) -> (String, String) {
    let script = steps
        .iter()
        .map(|s| step_content(&s.desc, s.is_child()))
        .collect::<Vec<_>>()
        .join("\n");
    let expects = steps
        .iter()
        .map(|s| expect_content(&s.expect, s.is_child(), true))
        .filter(|e| !e.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (script, expects)
}

/// Parse steps written by [`render_steps`]
pub fn parse_steps(text: &str) -> Vec<TestStep> {
    let lines: Vec<&str> = text.lines().collect();
    let mut steps: Vec<TestStep> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;
        if line.trim().is_empty() {
            continue;
        }

        let is_child = line.starts_with(INDENT);
        let indent = if is_child { INDENT } else { "" };
        let body = &line[indent.len()..];
        let trimmed = body.trim_end();

        let (desc, expect) = if trimmed == EXPECT_OPEN || trimmed.ends_with(" >>") {
            let desc = &trimmed[..trimmed.len() - EXPECT_OPEN.len()];
            let inner = format!("{}{}", indent, INDENT);
            let mut block = Vec::new();
            while i < lines.len() && lines[i].trim() != EXPECT_CLOSE {
                block.push(strip_indent(lines[i], &inner));
                i += 1;
            }
            // skip the closing marker
            i += 1;
            (desc.trim().to_string(), block.join("\n").trim().to_string())
        } else if let Some(pos) = body.find(INLINE_SEPARATOR) {
            (
                body[..pos].trim().to_string(),
                body[pos + INLINE_SEPARATOR.len()..].trim().to_string(),
            )
        } else {
            (body.trim().to_string(), String::new())
        };

        let step_type = if is_child {
            if let Some(parent) = steps.iter_mut().rev().find(|s| !s.is_child()) {
                parent.step_type = STEP_TYPE_GROUP.to_string();
            }
            STEP_TYPE_ITEM
        } else {
            STEP_TYPE_STEP
        };

        steps.push(TestStep {
            step_type: step_type.to_string(),
            desc,
            expect,
            ..Default::default()
        });
    }

    steps
}

fn strip_indent<'a>(line: &'a str, indent: &str) -> &'a str {
    line.strip_prefix(indent).unwrap_or_else(|| line.trim_start())
}
