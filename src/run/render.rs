//! Terminal output of a run

use std::path::Path;

use colored::Colorize;

use crate::report::{CaseStatus, FuncResult, Report};

use super::filter::display_width;

pub fn print_header(total: usize) {
    println!("{} {} script(s)", "Running".blue().bold(), total);
}

/// One aligned line per script: `(n/total) STATUS  id  path  title  duration`
pub fn print_result(index: usize, total: usize, result: &FuncResult, path_width: usize, numb_width: usize) {
    println!("{}", result_line(index, total, result, path_width, numb_width, true));
}

pub fn result_line(
    index: usize,
    total: usize,
    result: &FuncResult,
    path_width: usize,
    numb_width: usize,
    colorize: bool,
) -> String {
    let counter = format!("({}/{})", index, total);
    let counter_width = total.to_string().len() * 2 + 3;

    let label = status_label(result.status);
    let label = if colorize {
        match result.status {
            CaseStatus::Pass => label.green().to_string(),
            CaseStatus::Fail => label.red().bold().to_string(),
            CaseStatus::Skip => label.yellow().to_string(),
        }
    } else {
        label.to_string()
    };

    let id = if result.id > 0 {
        result.id.to_string()
    } else {
        String::new()
    };

    format!(
        "{:<cw$} {} {:>nw$}  {}  {}  {:.2}s",
        counter,
        label,
        id,
        pad_path(&result.path, path_width),
        result.title,
        result.duration,
        cw = counter_width,
        nw = numb_width,
    )
    .trim_end()
    .to_string()
}

fn status_label(status: CaseStatus) -> &'static str {
    match status {
        CaseStatus::Pass => "PASS",
        CaseStatus::Fail => "FAIL",
        CaseStatus::Skip => "SKIP",
    }
}

/// Path padded with spaces up to `width` terminal columns
fn pad_path(path: &Path, width: usize) -> String {
    let text = path.display().to_string();
    let used = display_width(path);
    format!("{}{}", text, " ".repeat(width.saturating_sub(used)))
}

pub fn print_summary(report: &Report, saved_to: Option<&Path>) {
    println!();
    println!(
        "{} {}  {} {}  {} {}  {} {}  ({:.2}s)",
        "Total:".bold(),
        report.total,
        "Pass:".green(),
        report.pass,
        "Fail:".red(),
        report.fail,
        "Skip:".yellow(),
        report.skip,
        report.duration
    );

    if report.fail > 0 {
        println!("\n{}", "Failed:".red().bold());
        for path in report.failed_paths() {
            println!("  {}", path.display());
        }
    }

    if let Some(path) = saved_to {
        println!("\nReport saved to {}", path.display().to_string().dimmed());
    }
}
