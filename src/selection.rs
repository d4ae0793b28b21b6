//! Which scripts a run covers
//!
//! The run command accepts a suite id, a task id, a suite file, a result file
//! or plain paths. Exactly one of them is honored, in that order of
//! precedence, and it is resolved to an ordered list of script paths.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::script::discover;
use crate::script::lang::{ext_of, EXT_JSON, EXT_RESULT, EXT_SUITE};
use crate::zentao::CaseFetcher;

/// Raw selection arguments of a run
#[derive(Debug, Clone, Default)]
pub struct SelectionInput {
    pub suite_id: Option<String>,
    pub task_id: Option<String>,
    pub files: Vec<PathBuf>,
    /// Script directory configured for server-side runs
    pub project_dir: Option<PathBuf>,
}

/// The single selection mode of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Cases of a remote suite, looked up in `dir`
    Suite { id: String, dir: PathBuf },
    /// Cases of a remote task, looked up in `dir`
    Task { id: String, dir: PathBuf },
    /// Cases listed in a local suite file, looked up in `dir`
    SuiteFile { file: PathBuf, dir: PathBuf },
    /// Cases that failed in a previous run
    ResultFile { file: PathBuf },
    /// Scripts and directories given directly
    Files(Vec<PathBuf>),
}

impl Selection {
    /// Pick the selection mode: suite id > task id > suite file > result file > files
    pub fn from_input(input: &SelectionInput, cwd: &Path) -> Self {
        let id_dir = || {
            input
                .project_dir
                .clone()
                .or_else(|| input.files.first().cloned())
                .unwrap_or_else(|| cwd.to_path_buf())
        };

        if let Some(id) = non_empty(&input.suite_id) {
            return Selection::Suite { id, dir: id_dir() };
        }
        if let Some(id) = non_empty(&input.task_id) {
            return Selection::Task { id, dir: id_dir() };
        }

        let (suite_file, suite_dir) = suite_file_args(&input.files);
        if let Some(file) = suite_file {
            let dir = suite_dir
                .cloned()
                .or_else(|| input.project_dir.clone())
                .unwrap_or_else(|| cwd.to_path_buf());
            return Selection::SuiteFile {
                file: file.clone(),
                dir,
            };
        }

        if let Some(file) = input
            .files
            .iter()
            .find(|f| has_ext(f, &[EXT_RESULT, EXT_JSON]))
        {
            return Selection::ResultFile { file: file.clone() };
        }

        Selection::Files(input.files.clone())
    }

    /// Whether resolving this selection talks to the server
    ///
    /// A suite or task whose id is not a positive integer resolves locally to
    /// nothing and never needs the server.
    pub fn is_remote(&self) -> bool {
        match self {
            Selection::Suite { id, .. } | Selection::Task { id, .. } => remote_id(id).is_some(),
            _ => false,
        }
    }
}

/// Suite file and lookup directory among the file arguments
///
/// The first non-suite argument is the directory. Scanning stops once both
/// are known, so the suite file is the last one seen up to that point.
fn suite_file_args(files: &[PathBuf]) -> (Option<&PathBuf>, Option<&PathBuf>) {
    let mut suite = None;
    let mut dir = None;
    for file in files {
        if has_ext(file, &[EXT_SUITE]) {
            suite = Some(file);
        } else if dir.is_none() {
            dir = Some(file);
        }
        if suite.is_some() && dir.is_some() {
            break;
        }
    }
    (suite, dir)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn has_ext(path: &Path, exts: &[&str]) -> bool {
    let ext = ext_of(path);
    exts.iter().any(|e| ext.eq_ignore_ascii_case(e))
}

/// Remote id, when the text is a positive integer
///
/// Anything else yields `None`, which resolves like a suite or task
/// without cases.
pub fn remote_id(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().filter(|id| *id > 0)
}

/// Source of remote case ids
#[async_trait]
pub trait CaseIdSource: Send {
    async fn case_ids_by_suite(&mut self, suite_id: &str) -> Vec<i64>;
    async fn case_ids_by_task(&mut self, task_id: &str) -> Vec<i64>;
}

#[async_trait]
impl CaseIdSource for CaseFetcher {
    async fn case_ids_by_suite(&mut self, suite_id: &str) -> Vec<i64> {
        CaseFetcher::case_ids_by_suite(self, suite_id).await
    }

    async fn case_ids_by_task(&mut self, task_id: &str) -> Vec<i64> {
        CaseFetcher::case_ids_by_task(self, task_id).await
    }
}

/// Resolve a selection to script paths
///
/// An empty result means there is nothing to run; it is not an error.
pub async fn resolve(selection: &Selection, remote: &mut dyn CaseIdSource) -> Vec<PathBuf> {
    let cases = match selection {
        Selection::Suite { id, dir } => {
            let ids = match remote_id(id) {
                Some(_) => remote.case_ids_by_suite(id).await,
                None => Vec::new(),
            };
            debug!(suite = %id, ?ids, "remote suite ids");
            discover::scripts_by_ids(dir, &ids)
        }
        Selection::Task { id, dir } => {
            let ids = match remote_id(id) {
                Some(_) => remote.case_ids_by_task(id).await,
                None => Vec::new(),
            };
            debug!(task = %id, ?ids, "remote task ids");
            discover::scripts_by_ids(dir, &ids)
        }
        Selection::SuiteFile { file, dir } => {
            let ids = discover::read_suite_file(file).unwrap_or_else(|e| {
                warn!("{}", e);
                Vec::new()
            });
            discover::scripts_by_ids(dir, &ids)
        }
        Selection::ResultFile { file } => {
            discover::failed_cases_from_result(file).unwrap_or_else(|e| {
                warn!("{}", e);
                Vec::new()
            })
        }
        Selection::Files(files) => discover::expand_paths(files),
    };

    info!("{} script(s) selected", cases.len());
    cases
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(suite: Option<&str>, task: Option<&str>, files: &[&str]) -> SelectionInput {
        SelectionInput {
            suite_id: suite.map(String::from),
            task_id: task.map(String::from),
            files: files.iter().map(PathBuf::from).collect(),
            project_dir: None,
        }
    }

    #[test]
    fn test_suite_id_beats_everything() {
        let sel = Selection::from_input(
            &input(Some("3"), Some("4"), &["cases", "a.suite", "r.result"]),
            Path::new("/cwd"),
        );
        assert_eq!(
            sel,
            Selection::Suite {
                id: "3".into(),
                dir: PathBuf::from("cases")
            }
        );
        assert!(sel.is_remote());
    }

    #[test]
    fn test_empty_suite_id_falls_through_to_task() {
        let sel = Selection::from_input(&input(Some(""), Some("4"), &[]), Path::new("/cwd"));
        assert_eq!(
            sel,
            Selection::Task {
                id: "4".into(),
                dir: PathBuf::from("/cwd")
            }
        );
    }

    #[test]
    fn test_project_dir_beats_file_argument() {
        let mut raw = input(Some("3"), None, &["cases"]);
        raw.project_dir = Some(PathBuf::from("/srv/project"));
        match Selection::from_input(&raw, Path::new("/cwd")) {
            Selection::Suite { dir, .. } => assert_eq!(dir, PathBuf::from("/srv/project")),
            other => panic!("unexpected selection {:?}", other),
        }
    }

    #[test]
    fn test_suite_file_beats_result_file() {
        let sel = Selection::from_input(
            &input(None, None, &["last.result", "smoke.suite"]),
            Path::new("/cwd"),
        );
        assert_eq!(
            sel,
            Selection::SuiteFile {
                file: PathBuf::from("smoke.suite"),
                dir: PathBuf::from("last.result")
            }
        );
    }

    #[test]
    fn test_last_suite_file_before_dir_wins() {
        let sel = Selection::from_input(
            &input(None, None, &["a.suite", "b.suite", "cases", "c.suite"]),
            Path::new("/cwd"),
        );
        assert_eq!(
            sel,
            Selection::SuiteFile {
                file: PathBuf::from("b.suite"),
                dir: PathBuf::from("cases")
            }
        );

        let sel = Selection::from_input(
            &input(None, None, &["cases", "a.suite", "b.suite"]),
            Path::new("/cwd"),
        );
        assert!(matches!(sel, Selection::SuiteFile { file, .. } if file == PathBuf::from("a.suite")));
    }

    #[test]
    fn test_bad_remote_id_is_not_remote() {
        for bad in ["abc", "0", "-1"] {
            let sel = Selection::from_input(&input(Some(bad), None, &[]), Path::new("/cwd"));
            assert!(matches!(sel, Selection::Suite { .. }));
            assert!(!sel.is_remote());

            let sel = Selection::from_input(&input(None, Some(bad), &[]), Path::new("/cwd"));
            assert!(matches!(sel, Selection::Task { .. }));
            assert!(!sel.is_remote());
        }
    }

    #[test]
    fn test_suite_file_dir_defaults_to_cwd() {
        let sel = Selection::from_input(&input(None, None, &["smoke.suite"]), Path::new("/cwd"));
        assert_eq!(
            sel,
            Selection::SuiteFile {
                file: PathBuf::from("smoke.suite"),
                dir: PathBuf::from("/cwd")
            }
        );
    }

    #[test]
    fn test_json_counts_as_result_file() {
        let sel = Selection::from_input(&input(None, None, &["a.sh", "result.json"]), Path::new("/"));
        assert_eq!(
            sel,
            Selection::ResultFile {
                file: PathBuf::from("result.json")
            }
        );
    }

    #[test]
    fn test_plain_files() {
        let sel = Selection::from_input(&input(None, None, &["a.sh", "dir"]), Path::new("/"));
        assert!(matches!(sel, Selection::Files(files) if files.len() == 2));
    }

    #[test]
    fn test_remote_id_parsing() {
        assert_eq!(remote_id("12"), Some(12));
        assert_eq!(remote_id("0"), None);
        assert_eq!(remote_id("-3"), None);
        assert_eq!(remote_id("abc"), None);
        assert_eq!(remote_id(" 5"), None);
    }
}
