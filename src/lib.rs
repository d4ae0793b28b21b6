//! ztf - test case resolution and execution for ZenTao
//!
//! This library resolves which local test scripts a run covers (remote
//! suites and tasks, suite files, previous reports, plain paths), runs them
//! and keeps their case headers and steps in sync with the server.

pub mod cli;
pub mod commands;
pub mod common;
pub mod report;
pub mod run;
pub mod script;
pub mod selection;
pub mod zentao;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use selection::{resolve, Selection, SelectionInput};
