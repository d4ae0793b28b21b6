//! Script file layout
//!
//! A script carries its case header inside a language comment:
//!
//! ```text
//! #!/usr/bin/env python3
//! '''
//! [case]
//! title=Log in with a valid account
//! cid=101
//! pid=1
//!
//! [steps]
//! open the login page >> the form is shown
//! [esac]
//! '''
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::common::{Error, Result};
use crate::zentao::types::{TestCase, TestStep};

use super::lang::{self, Language, EXT_EXPECT};
use super::steps;

const CASE_START: &str = "[case]";
const STEPS_START: &str = "[steps]";
const CASE_END: &str = "[esac]";

/// Case header and steps read back from a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCase {
    pub id: Option<i64>,
    pub title: String,
    pub steps: Vec<TestStep>,
}

/// Read the embedded `cid=` token of a script
pub fn read_case_id(content: &str) -> Option<String> {
    static CID: OnceLock<Regex> = OnceLock::new();
    let re = CID.get_or_init(|| Regex::new(r"(?m)^\s*cid\s*=\s*(\d+)").expect("valid cid pattern"));
    re.captures(content).map(|c| c[1].to_string())
}

fn read_header_field(content: &str, field: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (key, value) = line.trim().split_once('=')?;
        (key.trim() == field).then(|| value.trim().to_string())
    })
}

/// Leading digits of the file name, e.g. `101` for `101_login.ztf`
pub fn case_id_from_name(path: &Path) -> Option<i64> {
    let name = path.file_name()?.to_str()?;
    let digits: String = name.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Case id of a script: the embedded token, else the file name
pub fn case_id_of(path: &Path) -> Option<i64> {
    let from_content = std::fs::read_to_string(path)
        .ok()
        .and_then(|content| read_case_id(&content))
        .and_then(|id| id.parse().ok());
    from_content.or_else(|| case_id_from_name(path))
}

/// Parse the header and steps of a script
pub fn parse_script(path: &Path, content: &str) -> Result<ScriptCase> {
    let display = path.display().to_string();
    let start = content
        .find(CASE_START)
        .ok_or_else(|| Error::invalid_script(&display, "missing [case] header"))?;
    let header = &content[start..];
    let end = header
        .find(CASE_END)
        .ok_or_else(|| Error::invalid_script(&display, "missing [esac] marker"))?;
    let header = &header[..end];

    let (fields, step_text) = match header.find(STEPS_START) {
        Some(pos) => (&header[..pos], &header[pos + STEPS_START.len()..]),
        None => (header, ""),
    };

    Ok(ScriptCase {
        id: read_case_id(fields).and_then(|id| id.parse().ok()),
        title: read_header_field(fields, "title").unwrap_or_default(),
        steps: steps::parse_steps(step_text.trim_start_matches(['\r', '\n'])),
    })
}

/// File name of a checked-out case
pub fn script_file_name(case: &TestCase, language: &Language) -> String {
    format!("{}.{}", case.id, language.ext)
}

/// Path of the expectation file belonging to an independent script
pub fn expect_file_path(script: &Path) -> PathBuf {
    script.with_extension(EXT_EXPECT)
}

/// Generate script text for a case; independent scripts also get expectation text
pub fn generate_script(case: &TestCase, language: &Language, independent: bool) -> (String, Option<String>) {
    let (step_text, expects) = if independent {
        let (script, expects) = steps::render_independent(&case.steps);
        (script, Some(expects))
    } else {
        (steps::render_steps(&case.steps), None)
    };

    let mut out = String::new();
    if !language.shebang.is_empty() {
        out.push_str(language.shebang);
        out.push('\n');
    }
    out.push_str(language.comment_start);
    out.push('\n');
    out.push_str(CASE_START);
    out.push('\n');
    out.push_str(&format!("title={}\n", case.title.trim()));
    out.push_str(&format!("cid={}\n", case.id));
    out.push_str(&format!("pid={}\n", case.product));
    out.push('\n');
    out.push_str(STEPS_START);
    out.push('\n');
    if !step_text.is_empty() {
        out.push_str(&step_text);
        out.push('\n');
    }
    out.push_str(CASE_END);
    out.push('\n');
    out.push_str(language.comment_end);
    out.push('\n');

    (out, expects.map(|e| if e.is_empty() { e } else { format!("{}\n", e) }))
}

/// Write a case to `dir`, returning the script path
pub fn write_case_script(dir: &Path, case: &TestCase, language: &Language, independent: bool) -> Result<PathBuf> {
    let path = dir.join(script_file_name(case, language));
    let (script, expects) = generate_script(case, language, independent);

    std::fs::write(&path, script).map_err(|e| Error::file_write(&path, e))?;
    if let Some(expects) = expects {
        let exp = expect_file_path(&path);
        std::fs::write(&exp, expects).map_err(|e| Error::file_write(&exp, e))?;
    }
    Ok(path)
}

/// Language for a checkout, by name or extension
pub fn checkout_language(name: &str) -> Result<&'static Language> {
    lang::by_name(name).ok_or_else(|| {
        let known: Vec<_> = lang::all().iter().map(|l| l.name).collect();
        Error::Config(format!(
            "Unknown script language '{}'. Known: {}",
            name,
            known.join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_case() -> TestCase {
        TestCase {
            id: "101".into(),
            product: "1".into(),
            module: "3".into(),
            title: "Log in".into(),
            steps: vec![
                TestStep::new("open page", "form shown"),
                TestStep::new("submit", "saved\r\nredirected"),
            ],
        }
    }

    #[test]
    fn test_read_case_id() {
        assert_eq!(read_case_id("[case]\ntitle=x\ncid=205\n").as_deref(), Some("205"));
        assert_eq!(read_case_id("[case]\n  cid = 7\n").as_deref(), Some("7"));
        assert_eq!(read_case_id("no header"), None);
    }

    #[test]
    fn test_case_id_from_name() {
        assert_eq!(case_id_from_name(Path::new("/x/101_login.ztf")), Some(101));
        assert_eq!(case_id_from_name(Path::new("/x/login.ztf")), None);
    }

    #[test]
    fn test_generate_and_parse() {
        let python = lang::by_name("python").unwrap();
        let (script, expects) = generate_script(&sample_case(), python, false);
        assert!(expects.is_none());
        assert!(script.starts_with("#!/usr/bin/env python3\n'''\n[case]\n"));
        assert!(script.contains("open page >> form shown\nsubmit >>\n  saved\n  redirected\n<<\n[esac]"));

        let parsed = parse_script(Path::new("101.py"), &script).unwrap();
        assert_eq!(parsed.id, Some(101));
        assert_eq!(parsed.title, "Log in");
        assert_eq!(parsed.steps.len(), 2);
        assert_eq!(parsed.steps[1].expect, "saved\nredirected");
    }

    #[test]
    fn test_independent_script_splits_expectations() {
        let shell = lang::by_name("shell").unwrap();
        let (script, expects) = generate_script(&sample_case(), shell, true);
        assert!(script.contains("[steps]\nopen page\nsubmit\n[esac]"));
        assert_eq!(expects.as_deref(), Some("form shown\n>>\n  saved\n  redirected\n<<\n"));
    }

    #[test]
    fn test_write_case_script() {
        let dir = tempdir().unwrap();
        let php = lang::by_name("php").unwrap();
        let path = write_case_script(dir.path(), &sample_case(), php, true).unwrap();

        assert_eq!(path.file_name().unwrap(), "101.php");
        assert_eq!(case_id_of(&path), Some(101));
        assert!(expect_file_path(&path).exists());
    }

    #[test]
    fn test_parse_script_without_header() {
        let err = parse_script(Path::new("x.sh"), "echo hi").unwrap_err();
        assert!(matches!(err, Error::InvalidScript { .. }));
    }

    #[test]
    fn test_unknown_language() {
        assert!(checkout_language("cobol").is_err());
        assert_eq!(checkout_language("sh").unwrap().name, "shell");
    }
}
