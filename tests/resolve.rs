//! End-to-end case resolution
//!
//! Builds script directories on disk and resolves every selection mode
//! against them. Remote ids come from a stub source.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;

use ztf::common::config::Config;
use ztf::common::Host;
use ztf::report::{CaseStatus, FuncResult, Report};
use ztf::run::plan_run;
use ztf::selection::{resolve, CaseIdSource, Selection, SelectionInput};

/// Remote ids served from memory; records which lookups were made
#[derive(Default)]
struct StubRemote {
    suite_ids: Vec<i64>,
    task_ids: Vec<i64>,
    calls: Vec<String>,
}

#[async_trait]
impl CaseIdSource for StubRemote {
    async fn case_ids_by_suite(&mut self, suite_id: &str) -> Vec<i64> {
        self.calls.push(format!("suite:{}", suite_id));
        self.suite_ids.clone()
    }

    async fn case_ids_by_task(&mut self, task_id: &str) -> Vec<i64> {
        self.calls.push(format!("task:{}", task_id));
        self.task_ids.clone()
    }
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn input(dir: &Path, files: &[&str]) -> SelectionInput {
    SelectionInput {
        files: files.iter().map(|f| dir.join(f)).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_suite_file_resolves_in_suite_order() {
    let ws = workspace(&[
        ("smoke.suite", "102\n101\n"),
        ("cases/101_login.ztf", "login"),
        ("cases/102_logout.ztf", "logout"),
        ("cases/103_search.ztf", "search"),
    ]);

    let selection = Selection::from_input(&input(ws.path(), &["smoke.suite", "cases"]), ws.path());
    let mut remote = StubRemote::default();
    let cases = resolve(&selection, &mut remote).await;

    assert_eq!(names(&cases), vec!["102_logout.ztf", "101_login.ztf"]);
    assert!(remote.calls.is_empty());
}

#[tokio::test]
async fn test_suite_file_with_ids_101_102() {
    let ws = workspace(&[
        ("regression.suite", "101\n102\n"),
        ("101_login.ztf", ""),
        ("102_logout.ztf", ""),
    ]);

    let selection = Selection::from_input(&input(ws.path(), &["regression.suite"]), ws.path());
    let cases = resolve(&selection, &mut StubRemote::default()).await;

    assert_eq!(
        cases,
        vec![ws.path().join("101_login.ztf"), ws.path().join("102_logout.ztf")]
    );
}

#[tokio::test]
async fn test_result_file_reruns_only_failures() {
    let ws = workspace(&[("205_search.ztf", ""), ("206_filter.ztf", "")]);

    let mut report = Report::new(Host::Unix);
    for (id, name, status) in [
        (205, "205_search.ztf", CaseStatus::Fail),
        (206, "206_filter.ztf", CaseStatus::Pass),
    ] {
        report.record(FuncResult {
            id,
            title: String::new(),
            path: ws.path().join(name),
            status,
            duration: 0.1,
        });
    }
    let result = ws.path().join("last.result");
    report.save(&result).unwrap();

    let selection = Selection::from_input(&input(ws.path(), &["last.result"]), ws.path());
    let cases = resolve(&selection, &mut StubRemote::default()).await;

    assert_eq!(cases, vec![ws.path().join("205_search.ztf")]);
}

#[tokio::test]
async fn test_remote_suite_ids_map_to_local_scripts() {
    let ws = workspace(&[
        ("a.py", "'''\n[case]\ntitle=one\ncid=11\n[esac]\n'''\n"),
        ("b.py", "'''\n[case]\ntitle=two\ncid=12\n[esac]\n'''\n"),
    ]);

    let raw = SelectionInput {
        suite_id: Some("4".into()),
        project_dir: Some(ws.path().to_path_buf()),
        ..Default::default()
    };
    let mut remote = StubRemote {
        suite_ids: vec![12, 11, 99],
        ..Default::default()
    };
    let cases = resolve(&Selection::from_input(&raw, Path::new("/")), &mut remote).await;

    assert_eq!(names(&cases), vec!["b.py", "a.py"]);
    assert_eq!(remote.calls, vec!["suite:4"]);
}

#[tokio::test]
async fn test_bad_suite_id_resolves_to_nothing_without_remote_call() {
    let ws = workspace(&[("1.ztf", ""), ("2.ztf", "")]);

    for bad in ["abc", "0", "-1"] {
        let raw = SelectionInput {
            suite_id: Some(bad.into()),
            files: vec![ws.path().to_path_buf()],
            ..Default::default()
        };
        let selection = Selection::from_input(&raw, ws.path());
        assert!(matches!(selection, Selection::Suite { .. }));

        let mut remote = StubRemote {
            suite_ids: vec![1, 2],
            ..Default::default()
        };
        assert!(resolve(&selection, &mut remote).await.is_empty());
        assert!(remote.calls.is_empty());
    }
}

#[tokio::test]
async fn test_task_id_ignored_when_suite_id_given() {
    let ws = workspace(&[("7.ztf", ""), ("8.ztf", "")]);
    let raw = SelectionInput {
        suite_id: Some("1".into()),
        task_id: Some("2".into()),
        files: vec![ws.path().join("smoke.suite")],
        project_dir: Some(ws.path().to_path_buf()),
    };
    let mut remote = StubRemote {
        suite_ids: vec![7],
        task_ids: vec![8],
        ..Default::default()
    };
    let cases = resolve(&Selection::from_input(&raw, ws.path()), &mut remote).await;

    assert_eq!(names(&cases), vec!["7.ztf"]);
    assert_eq!(remote.calls, vec!["suite:1"]);
}

#[tokio::test]
async fn test_plain_paths_then_platform_filter() {
    let ws = workspace(&[
        ("cases/1.sh", "[case]\ncid=1\n[esac]\n"),
        ("cases/2.bat", "[case]\ncid=2\n[esac]\n"),
        ("cases/3.py", "[case]\ncid=300\n[esac]\n"),
        ("cases/readme.txt", ""),
    ]);

    let selection = Selection::from_input(&input(ws.path(), &["cases"]), ws.path());
    let cases = resolve(&selection, &mut StubRemote::default()).await;
    assert_eq!(names(&cases), vec!["1.sh", "2.bat", "3.py"]);

    let unix = plan_run(&cases, Host::Unix, &Config::default(), None);
    assert_eq!(names(&unix.to_run), vec!["1.sh", "3.py"]);
    assert_eq!(unix.numb_max_width, 3);

    let mut config = Config::default();
    config.interpreters.insert("python".into(), "-".into());
    let windows = plan_run(&cases, Host::Windows, &config, None);
    assert_eq!(names(&windows.to_run), vec!["2.bat"]);
    assert_eq!(names(&windows.to_ignore), vec!["3.py"]);
}
