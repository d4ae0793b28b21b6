//! CLI command handling
//!
//! Dispatches CLI commands and formats output.

use std::path::{Path, PathBuf};

use colored::Colorize;
use tracing::debug;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{paths, Error, Host, Result};
use crate::run::{self, ProcessExecutor};
use crate::script::file::{self, case_id_from_name, checkout_language, expect_file_path};
use crate::selection::{self, Selection, SelectionInput};
use crate::zentao::cases::commit_params;
use crate::zentao::{CaseFetcher, CaseSelector};

/// Settings shared by every command
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config: Config,
    pub verbose: bool,
}

impl Context {
    /// Load the config from `path`, or from the default location
    pub fn load(path: Option<&Path>, verbose: bool) -> Result<Self> {
        let config = match path {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        Ok(Self { config, verbose })
    }
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Run {
            files,
            suite,
            task,
            interpreter,
            project_dir,
        } => {
            let cwd = std::env::current_dir()?;
            let input = SelectionInput {
                suite_id: suite,
                task_id: task,
                files,
                project_dir: project_dir.or_else(|| ctx.config.project_dir.clone()),
            };
            run_scripts(ctx, &input, interpreter.as_deref(), &cwd).await?;
            Ok(())
        }

        Commands::Checkout {
            product,
            module,
            suite,
            task,
            dir,
            lang,
            independent,
        } => {
            let selector = CaseSelector {
                product,
                module,
                suite,
                task,
            };
            checkout(ctx, &selector, &dir, &lang, independent).await
        }

        Commands::Commit { file, yes } => commit(ctx, &file, yes).await,
    }
}

/// How a `run` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunEnd {
    /// The server rejected the login (or could not be reached), so no remote ids
    LoginFailed,
    NoCases,
    /// Cases were found but none can run on this host
    NothingRunnable,
    Ran,
}

async fn run_scripts(
    ctx: &Context,
    input: &SelectionInput,
    interpreter: Option<&str>,
    cwd: &Path,
) -> Result<RunEnd> {
    let selection = Selection::from_input(input, cwd);
    debug!(?selection, "selection");

    if selection.is_remote() {
        ctx.config.check_request_config()?;
    }

    let mut fetcher = CaseFetcher::from_config(&ctx.config);
    let cases = selection::resolve(&selection, &mut fetcher).await;

    if cases.is_empty() {
        if fetcher.login_failed() {
            println!("{}", Error::LoginFailed.to_string().red());
            println!("No cases found");
            return Ok(RunEnd::LoginFailed);
        }
        println!("No cases found");
        return Ok(RunEnd::NoCases);
    }

    let host = Host::current();
    let mut executor = ProcessExecutor::new(host, ctx.config.clone(), interpreter.map(String::from))
        .verbose(ctx.verbose);
    let outcome = run::run_cases(&cases, host, &ctx.config, interpreter, &mut executor, cwd).await?;

    if outcome.saved_to.is_none() {
        println!("No cases can run on this host ({} found)", cases.len());
        return Ok(RunEnd::NothingRunnable);
    }
    Ok(RunEnd::Ran)
}

async fn checkout(
    ctx: &Context,
    selector: &CaseSelector,
    dir: &Path,
    lang: &str,
    independent: bool,
) -> Result<()> {
    let language = checkout_language(lang)?;
    ctx.config.check_request_config()?;

    let mut fetcher = CaseFetcher::from_config(&ctx.config);
    let cases = fetcher.load_test_cases(selector).await?;
    if cases.is_empty() {
        println!("No cases found");
        return Ok(());
    }

    paths::ensure_dir(dir).map_err(|e| Error::file_write(dir, e))?;

    let mut written: Vec<PathBuf> = Vec::with_capacity(cases.len());
    for case in &cases {
        let path = file::write_case_script(dir, case, language, independent)?;
        println!("  {} {}", "✓".green(), path.display());
        written.push(path);
    }

    println!(
        "Checked out {} case(s) as {} scripts into {}",
        written.len(),
        language,
        dir.display()
    );
    Ok(())
}

async fn commit(ctx: &Context, path: &Path, yes: bool) -> Result<()> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
    let case = file::parse_script(path, &content)?;

    let id = case
        .id
        .or_else(|| case_id_from_name(path))
        .ok_or_else(|| Error::MissingCaseId(path.display().to_string()))?;

    let exp = expect_file_path(path);
    if exp.exists() {
        return Err(Error::invalid_script(
            &path.display().to_string(),
            &format!(
                "expectations are kept in {}; independent scripts cannot be committed",
                exp.display()
            ),
        ));
    }

    if !yes {
        let params = commit_params(&case.title, &case.steps);
        println!("Case {} would be updated with:", id);
        println!("{}", serde_json::to_string_pretty(&params)?);
        println!("{}", "Re-run with --yes to send.".dimmed());
        return Ok(());
    }

    ctx.config.check_request_config()?;
    let mut fetcher = CaseFetcher::from_config(&ctx.config);
    fetcher.commit_case(id, &case.title, &case.steps).await?;

    println!("Committed case {} ({} step(s))", id, case.steps.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SCRIPT: &str = "#!/usr/bin/env python3\n'''\n[case]\ntitle=Log in\ncid=101\npid=1\n\n[steps]\nopen >> shown\n[esac]\n'''\n";

    #[tokio::test]
    async fn test_commit_preview_needs_no_server() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("101.py");
        std::fs::write(&script, SCRIPT).unwrap();

        commit(&Context::default(), &script, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_commit_refuses_independent_script() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("101.py");
        std::fs::write(&script, SCRIPT).unwrap();
        std::fs::write(dir.path().join("101.exp"), "shown\n").unwrap();

        let err = commit(&Context::default(), &script, false).await.unwrap_err();
        assert!(matches!(err, Error::InvalidScript { .. }));
    }

    #[tokio::test]
    async fn test_commit_without_case_id() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("login.py");
        std::fs::write(&script, "[case]\ntitle=x\n[esac]\n").unwrap();

        let err = commit(&Context::default(), &script, true).await.unwrap_err();
        assert!(matches!(err, Error::MissingCaseId(_)));
    }

    fn suite_input(id: &str) -> SelectionInput {
        SelectionInput {
            suite_id: Some(id.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_remote_run_requires_url() {
        let err = run_scripts(&Context::default(), &suite_input("3"), None, Path::new("/"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_bad_suite_id_needs_no_server() {
        for bad in ["abc", "0", "-1"] {
            let end = run_scripts(&Context::default(), &suite_input(bad), None, Path::new("/"))
                .await
                .unwrap();
            assert_eq!(end, RunEnd::NoCases);
        }

        let input = SelectionInput {
            task_id: Some("x".into()),
            ..Default::default()
        };
        let end = run_scripts(&Context::default(), &input, None, Path::new("/"))
            .await
            .unwrap();
        assert_eq!(end, RunEnd::NoCases);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_not_fatal() {
        let ctx = Context {
            config: Config::parse("url = \"http://127.0.0.1:9/\"\naccount = \"a\"\npassword = \"p\"\n")
                .unwrap(),
            verbose: false,
        };
        let end = run_scripts(&ctx, &suite_input("3"), None, Path::new("/"))
            .await
            .unwrap();
        assert_eq!(end, RunEnd::LoginFailed);
    }
}
