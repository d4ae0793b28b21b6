//! Execution of resolved scripts
//!
//! [`filter::plan_run`] decides what runs on this host, an [`Executor`] runs
//! it, and the report is written under `logs/<unix-seconds>/result.json`.

pub mod executor;
pub mod filter;
pub mod render;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::common::config::Config;
use crate::common::{paths, Error, Host, Result};
use crate::report::Report;

pub use executor::{Executor, ProcessExecutor};
pub use filter::{plan_run, RunPlan};

/// File name of a saved report
pub const RESULT_FILE: &str = "result.json";

/// Outcome of [`run_cases`]
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    /// Where the report was written, if anything ran
    pub saved_to: Option<PathBuf>,
}

/// Filter `cases` for `host`, execute them and save the report below `log_base`
pub async fn run_cases(
    cases: &[PathBuf],
    host: Host,
    config: &Config,
    global_interpreter: Option<&str>,
    executor: &mut dyn Executor,
    log_base: &Path,
) -> Result<RunOutcome> {
    let plan = plan_run(cases, host, config, global_interpreter);
    info!(
        run = plan.to_run.len(),
        ignored = plan.to_ignore.len(),
        "run planned"
    );

    let mut report = Report::new(host);
    if plan.to_run.is_empty() && plan.to_ignore.is_empty() {
        return Ok(RunOutcome {
            report,
            saved_to: None,
        });
    }

    executor
        .execute(
            &plan.to_run,
            &plan.to_ignore,
            &mut report,
            plan.path_max_width,
            plan.numb_max_width,
        )
        .await?;

    let dir = paths::run_log_dir(log_base);
    paths::ensure_dir(&dir).map_err(|e| Error::file_write(&dir, e))?;
    let path = dir.join(RESULT_FILE);
    report.save(&path)?;
    info!(path = %path.display(), "report saved");

    render::print_summary(&report, Some(&path));

    Ok(RunOutcome {
        report,
        saved_to: Some(path),
    })
}
