//! Narrowing resolved scripts to what can run on this host
//!
//! `.sh` never runs on Windows-like hosts and `.bat` never runs elsewhere.
//! On Windows-like hosts every other script also needs an interpreter for
//! its language: a disabled language (`-`) moves the script to the ignored
//! list, an unconfigured one drops it. `bat` needs no interpreter.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

use crate::common::config::{Config, DISABLED_INTERPRETER};
use crate::common::Host;
use crate::script::lang::{self, ext_of};
use crate::script::read_case_id;

/// Scripts to run and to report as ignored, with column widths for the report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunPlan {
    pub to_run: Vec<PathBuf>,
    pub to_ignore: Vec<PathBuf>,
    /// Widest script path, in terminal columns
    pub path_max_width: usize,
    /// Longest case id
    pub numb_max_width: usize,
}

/// Partition scripts for `host` and measure them
pub fn plan_run(
    cases: &[PathBuf],
    host: Host,
    config: &Config,
    global_interpreter: Option<&str>,
) -> RunPlan {
    let global_interpreter = global_interpreter.filter(|i| !i.trim().is_empty());
    let mut plan = RunPlan::default();

    for case in cases {
        let ext = ext_of(case);

        if host.is_windows() {
            if ext == "sh" {
                continue;
            }

            let language = lang::by_ext(ext);
            let lang_name = language.map(|l| l.name).unwrap_or("");
            let interpreter = config.interpreter(lang_name);

            if interpreter == DISABLED_INTERPRETER && global_interpreter.is_none() {
                debug!(path = %case.display(), "language {} disabled, ignored", lang_name);
                plan.to_ignore.push(case.clone());
                continue;
            }

            let native = language.map(|l| l.is_native_on_windows()).unwrap_or(false);
            if !native && interpreter.is_empty() {
                warn!(
                    "no interpreter configured for '{}', skipping {}",
                    lang_name,
                    case.display()
                );
                continue;
            }
        } else if ext == "bat" {
            continue;
        }

        plan.to_run.push(case.clone());
    }

    let (path_width, numb_width) = measure(&plan.to_run);
    plan.path_max_width = path_width;
    plan.numb_max_width = numb_width;
    plan
}

/// Widest display width of the paths and longest embedded case id
pub fn measure(scripts: &[PathBuf]) -> (usize, usize) {
    let mut path_max_width = 0;
    let mut numb_max_width = 0;

    for script in scripts {
        path_max_width = path_max_width.max(display_width(script));

        match std::fs::read_to_string(script) {
            Ok(content) => {
                let id_len = read_case_id(&content).map(|id| id.len()).unwrap_or(0);
                numb_max_width = numb_max_width.max(id_len);
            }
            Err(e) => debug!(path = %script.display(), "cannot read script: {}", e),
        }
    }

    (path_max_width, numb_max_width)
}

/// Terminal columns taken by a path; wide characters count twice
pub fn display_width(path: &Path) -> usize {
    path.display().to_string().width()
}
