//! Local test scripts: languages, step text, file layout and discovery

pub mod discover;
pub mod file;
pub mod lang;
pub mod steps;

pub use file::{read_case_id, ScriptCase};
pub use lang::Language;
