//! Test run report
//!
//! Serialized as `result.json`; a later run can be pointed at that file to
//! re-run only the cases that failed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::{Error, Host, Result};

/// Outcome of one script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Pass,
    Fail,
    Skip,
}

/// Result of one script
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuncResult {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub path: PathBuf,
    pub status: CaseStatus,
    /// Seconds
    #[serde(default)]
    pub duration: f64,
}

/// Report of a functional test run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default)]
    pub env: String,
    #[serde(default)]
    pub test_type: String,
    #[serde(default)]
    pub test_frame: String,
    #[serde(default)]
    pub pass: usize,
    #[serde(default)]
    pub fail: usize,
    #[serde(default)]
    pub skip: usize,
    #[serde(default)]
    pub total: usize,
    /// Seconds
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub func_result: Vec<FuncResult>,
}

impl Report {
    /// Empty functional-test report for a host
    pub fn new(host: Host) -> Self {
        Self {
            env: host.os_name().to_string(),
            test_type: "func".to_string(),
            test_frame: "ztf".to_string(),
            pass: 0,
            fail: 0,
            skip: 0,
            total: 0,
            duration: 0.0,
            func_result: Vec::new(),
        }
    }

    /// Record a script outcome and update the counters
    pub fn record(&mut self, result: FuncResult) {
        match result.status {
            CaseStatus::Pass => self.pass += 1,
            CaseStatus::Fail => self.fail += 1,
            CaseStatus::Skip => self.skip += 1,
        }
        self.total += 1;
        self.duration += result.duration;
        self.func_result.push(result);
    }

    /// Load a report written by a previous run
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the report as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| Error::file_write(path, e))
    }

    /// Paths of the scripts that failed, in report order
    pub fn failed_paths(&self) -> Vec<PathBuf> {
        self.func_result
            .iter()
            .filter(|r| r.status == CaseStatus::Fail)
            .map(|r| r.path.clone())
            .collect()
    }
}
