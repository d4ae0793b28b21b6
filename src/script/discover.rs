//! Finding scripts on disk
//!
//! Directories are walked recursively in file-name order so results are
//! stable across platforms.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::common::paths::absolute;
use crate::common::{Error, Result};
use crate::report::Report;

use super::file::case_id_of;
use super::lang::is_script;

/// All scripts under a directory, sorted by path
pub fn scripts_in_dir(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_script(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Expand file and directory arguments into script paths
///
/// Files are kept when they are scripts; directories contribute every
/// script below them. Paths are absolute and listed once.
pub fn expand_paths(args: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut scripts = Vec::new();

    for arg in args {
        let arg = absolute(arg);
        let found = if arg.is_dir() {
            scripts_in_dir(&arg)
        } else if arg.is_file() && is_script(&arg) {
            vec![arg]
        } else {
            debug!(path = %arg.display(), "not a script, skipped");
            Vec::new()
        };

        for path in found {
            if seen.insert(path.clone()) {
                scripts.push(path);
            }
        }
    }
    scripts
}

/// Scripts in `dir` whose case id is in `ids`
///
/// Follows the order of `ids`; for each id, matching scripts come in
/// directory order with at most one per containing directory.
pub fn scripts_by_ids(dir: &Path, ids: &[i64]) -> Vec<PathBuf> {
    if ids.is_empty() {
        return Vec::new();
    }

    let dir = absolute(dir);
    let indexed: Vec<(i64, PathBuf)> = scripts_in_dir(&dir)
        .into_iter()
        .filter_map(|path| case_id_of(&path).map(|id| (id, path)))
        .collect();

    let mut taken: HashSet<(PathBuf, i64)> = HashSet::new();
    let mut scripts = Vec::new();
    for id in ids {
        for (script_id, path) in &indexed {
            if script_id != id {
                continue;
            }
            let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
            if taken.insert((parent, *id)) {
                scripts.push(path.clone());
            }
        }
    }
    scripts
}

/// Case ids listed in a suite file, in file order without duplicates
///
/// One id per line; blank lines and `#` comments are ignored, as are lines
/// that are not a number.
pub fn read_suite_file(path: &Path) -> Result<Vec<i64>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;

    let mut ids = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.parse::<i64>() {
            Ok(id) if !ids.contains(&id) => ids.push(id),
            Ok(_) => {}
            Err(_) => debug!(line, "not a case id, skipped"),
        }
    }
    Ok(ids)
}

/// Scripts that failed in a previous run's result file
pub fn failed_cases_from_result(path: &Path) -> Result<Vec<PathBuf>> {
    let report = Report::load(path)?;
    Ok(report.failed_paths())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scripts_in_dir_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("b.sh"), "");
        write(&dir.path().join("a.py"), "");
        write(&dir.path().join("notes.txt"), "");
        write(&dir.path().join("sub/c.ztf"), "");

        let names: Vec<_> = scripts_in_dir(dir.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.py", "b.sh", "c.ztf"]);
    }

    #[test]
    fn test_expand_paths_mixes_files_and_dirs() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("cases/1.sh"), "");
        write(&dir.path().join("cases/2.sh"), "");
        write(&dir.path().join("single.py"), "");

        let args = vec![
            dir.path().join("single.py"),
            dir.path().join("cases"),
            dir.path().join("cases/1.sh"),
        ];
        let scripts = expand_paths(&args);
        assert_eq!(scripts.len(), 3);
        assert!(scripts[0].ends_with("single.py"));
    }

    #[test]
    fn test_scripts_by_ids_follow_id_order() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("a.sh"), "[case]\ncid=2\n");
        write(&dir.path().join("b.sh"), "[case]\ncid=1\n");
        write(&dir.path().join("c.sh"), "[case]\ncid=3\n");

        let found = scripts_by_ids(dir.path(), &[1, 2]);
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("b.sh"));
        assert!(found[1].ends_with("a.sh"));
    }

    #[test]
    fn test_one_script_per_id_per_dir() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("5_a.sh"), "");
        write(&dir.path().join("5_b.sh"), "");
        write(&dir.path().join("other/5.sh"), "");

        let found = scripts_by_ids(dir.path(), &[5]);
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("5_a.sh"));
        assert!(found[1].ends_with("other/5.sh"));
    }

    #[test]
    fn test_empty_ids_find_nothing() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("1.sh"), "");
        assert!(scripts_by_ids(dir.path(), &[]).is_empty());
    }

    #[test]
    fn test_read_suite_file() {
        let dir = tempdir().unwrap();
        let suite = dir.path().join("smoke.suite");
        write(&suite, "# smoke\n102\n\n101\nabc\n102\n");
        assert_eq!(read_suite_file(&suite).unwrap(), vec![102, 101]);
    }
}
