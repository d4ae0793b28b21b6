//! Running scripts and recording their outcome

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use colored::Colorize;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::common::config::Config;
use crate::common::logging::preview;
use crate::common::{Error, Host, Result};
use crate::report::{CaseStatus, FuncResult, Report};
use crate::script::file::{case_id_of, parse_script};
use crate::script::lang;

use super::render;

/// Runs the scripts a plan selected and fills the report
#[async_trait]
pub trait Executor: Send {
    async fn execute(
        &mut self,
        to_run: &[PathBuf],
        to_ignore: &[PathBuf],
        report: &mut Report,
        path_width: usize,
        numb_width: usize,
    ) -> Result<()>;
}

/// Executes each script as a child process, one after the other
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    host: Host,
    config: Config,
    global_interpreter: Option<String>,
    /// Echo script output to the terminal
    verbose: bool,
}

impl ProcessExecutor {
    pub fn new(host: Host, config: Config, global_interpreter: Option<String>) -> Self {
        Self {
            host,
            config,
            global_interpreter: global_interpreter.filter(|i| !i.trim().is_empty()),
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Program and arguments that run `script` on this host
    pub fn command_line(&self, script: &Path) -> Result<(String, Vec<String>)> {
        let script_arg = script.display().to_string();

        if let Some(global) = &self.global_interpreter {
            return Ok((global.clone(), vec![script_arg]));
        }

        if self.host.is_windows() {
            let language = lang::language_of(script);
            if language.map(|l| l.is_native_on_windows()).unwrap_or(false) {
                return Ok(("cmd".to_string(), vec!["/C".to_string(), script_arg]));
            }
            let name = language.map(|l| l.name).unwrap_or("");
            let interpreter = self.config.interpreter(name);
            if interpreter.is_empty() {
                return Err(Error::Config(format!(
                    "No interpreter configured for '{}'",
                    name
                )));
            }
            return Ok((interpreter.to_string(), vec![script_arg]));
        }

        Ok((script_arg, Vec::new()))
    }

    async fn run_one(&self, script: &Path) -> (CaseStatus, f64) {
        let start = Instant::now();
        let status = match self.spawn(script).await {
            Ok(true) => CaseStatus::Pass,
            Ok(false) => CaseStatus::Fail,
            Err(e) => {
                warn!("{}: {}", script.display(), e);
                CaseStatus::Fail
            }
        };
        (status, start.elapsed().as_secs_f64())
    }

    async fn spawn(&self, script: &Path) -> Result<bool> {
        let (program, args) = self.command_line(script)?;

        if args.is_empty() {
            make_executable(script)?;
        } else if which::which(&program).is_err() && !Path::new(&program).exists() {
            return Err(Error::Config(format!("Interpreter '{}' not found", program)));
        }

        debug!(%program, ?args, "running script");
        let mut command = Command::new(&program);
        command.args(&args).stdin(Stdio::null());

        let output = command
            .output()
            .await
            .map_err(|e| Error::Config(format!("Failed to run '{}': {}", program, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(stdout = preview(&stdout), stderr = preview(&stderr), "script output");

        if self.verbose {
            print!("{}", stdout);
            if !stderr.is_empty() {
                eprint!("{}", stderr.dimmed());
            }
        }

        Ok(output.status.success())
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(
        &mut self,
        to_run: &[PathBuf],
        to_ignore: &[PathBuf],
        report: &mut Report,
        path_width: usize,
        numb_width: usize,
    ) -> Result<()> {
        let total = to_run.len() + to_ignore.len();
        render::print_header(total);

        for (index, script) in to_run.iter().enumerate() {
            let (status, duration) = self.run_one(script).await;
            let result = func_result(script, status, duration);
            render::print_result(index + 1, total, &result, path_width, numb_width);
            report.record(result);
        }

        for (index, script) in to_ignore.iter().enumerate() {
            let result = func_result(script, CaseStatus::Skip, 0.0);
            render::print_result(to_run.len() + index + 1, total, &result, path_width, numb_width);
            report.record(result);
        }

        Ok(())
    }
}

fn func_result(script: &Path, status: CaseStatus, duration: f64) -> FuncResult {
    let title = std::fs::read_to_string(script)
        .ok()
        .and_then(|content| parse_script(script, &content).ok())
        .map(|case| case.title)
        .unwrap_or_default();

    FuncResult {
        id: case_id_of(script).unwrap_or(0),
        title,
        path: script.to_path_buf(),
        status,
        duration,
    }
}

#[cfg(unix)]
fn make_executable(script: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(script).map_err(|e| Error::file_read(script, e))?;
    let mut permissions = metadata.permissions();
    if permissions.mode() & 0o111 == 0 {
        permissions.set_mode(permissions.mode() | 0o755);
        std::fs::set_permissions(script, permissions).map_err(|e| Error::file_write(script, e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_script: &Path) -> Result<()> {
    Ok(())
}
