use std::time::Duration;

use neodeploy_core::domain::SiteDiff;
use neodeploy_sync::engine::DeployReport;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter {
    /// Suppress `info` lines
    pub quiet: bool,
}

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(json: bool, quiet: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter { quiet })
    }
}

// ============================================================================
// Deploy summaries
// ============================================================================

/// `350ms`, `2.4s`, `3m 05s`
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Tense of a summary: what would happen, or what happened
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SummaryTense {
    Preview,
    Done,
}

/// Lines describing a diff, shared by preview and deploy output
pub fn summary_lines(
    diff: &SiteDiff,
    tense: SummaryTense,
    cleanup: bool,
    supporter: bool,
) -> Vec<String> {
    let done = tense == SummaryTense::Done;
    let verb = |present: &str, past: &str| -> String {
        if done {
            past.to_string()
        } else {
            present.to_string()
        }
    };

    let mut lines = Vec::new();
    let n = diff.files_to_upload.len();
    lines.push(format!("{} {} file{}", verb("Upload", "Uploaded"), n, plural(n)));

    let n = diff.files_to_delete.len();
    let action = if cleanup {
        verb("Delete", "Deleted")
    } else {
        verb("Orphan", "Orphaned")
    };
    lines.push(format!("{} {} file{}", action, n, plural(n)));

    let n = diff.files_skipped.len();
    lines.push(format!("{} {} file{}", verb("Skip", "Skipped"), n, plural(n)));

    let n = diff.unsupported_files.len();
    let action = if supporter {
        verb("Include", "Included")
    } else {
        verb("Ignore", "Ignored")
    };
    lines.push(format!("{} {} unsupported file{}", action, n, plural(n)));
    for file in &diff.unsupported_files {
        lines.push(format!("  {}", file));
    }

    let n = diff.protected_files.len();
    lines.push(format!("Found {} protected file{}", n, plural(n)));
    for file in &diff.protected_files {
        lines.push(format!("  {}", file));
    }

    lines
}

/// Prints the outcome of `deploy --preview`
pub fn print_preview(
    fmt: &dyn OutputFormatter,
    format: OutputFormat,
    diff: &SiteDiff,
    elapsed: Duration,
    cleanup: bool,
    supporter: bool,
) {
    if format == OutputFormat::Json {
        fmt.print_json(&serde_json::json!({
            "preview": true,
            "cleanup": cleanup,
            "supporter": supporter,
            "duration_ms": elapsed.as_millis() as u64,
            "diff": diff,
        }));
        return;
    }

    fmt.success(&format!("Preview computed in {}", format_duration(elapsed)));
    for line in summary_lines(diff, SummaryTense::Preview, cleanup, supporter) {
        fmt.info(&line);
    }
}

/// Prints a deploy that finished without errors
pub fn print_deploy(
    fmt: &dyn OutputFormatter,
    format: OutputFormat,
    report: &DeployReport,
    cleanup: bool,
    supporter: bool,
) {
    if format == OutputFormat::Json {
        fmt.print_json(&serde_json::to_value(report).unwrap_or_default());
        return;
    }

    if report.results.is_empty() {
        fmt.success(&format!(
            "Already up to date ({})",
            format_duration(report.duration)
        ));
    } else {
        fmt.success(&format!("Deployed in {}", format_duration(report.duration)));
    }
    for line in summary_lines(&report.diff, SummaryTense::Done, cleanup, supporter) {
        fmt.info(&line);
    }
}

/// Dumps everything known about a deploy that had errors
pub fn print_error_dump(fmt: &dyn OutputFormatter, format: OutputFormat, report: &DeployReport) {
    if format == OutputFormat::Json {
        fmt.print_json(&serde_json::to_value(report).unwrap_or_default());
        return;
    }

    fmt.error(&format!(
        "Deploy finished in {} with {} error{}",
        format_duration(report.duration),
        report.errors.len(),
        plural(report.errors.len())
    ));

    fmt.info("");
    fmt.info("Successful requests:");
    for result in &report.results {
        fmt.info(&format!("  {}", serde_json::to_string(result).unwrap_or_default()));
    }

    fmt.info("");
    fmt.info("Diff:");
    let diff = serde_json::to_string_pretty(&report.diff).unwrap_or_default();
    for line in diff.lines() {
        fmt.info(&format!("  {}", line));
    }

    fmt.info("");
    fmt.info("Errors:");
    for error in &report.errors {
        fmt.info(&format!("  {}", error));
    }

    fmt.info("");
    fmt.info("Your site may be partially updated. Inspect the errors above and run the deploy again.");
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use neodeploy_core::domain::FileUpload;

    use super::*;

    fn diff() -> SiteDiff {
        SiteDiff {
            files_to_upload: vec![FileUpload {
                name: "index.html".to_string(),
                path: PathBuf::from("/site/index.html"),
            }],
            files_to_delete: vec!["old.html".to_string(), "older.html".to_string()],
            files_skipped: Vec::new(),
            protected_files: vec!["keep/me.html".to_string()],
            unsupported_files: vec!["song.mp3".to_string()],
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(350)), "350ms");
        assert_eq!(format_duration(Duration::from_millis(2_400)), "2.4s");
        assert_eq!(format_duration(Duration::from_secs(185)), "3m 05s");
    }

    #[test]
    fn test_preview_summary() {
        let lines = summary_lines(&diff(), SummaryTense::Preview, false, false);
        assert_eq!(
            lines,
            vec![
                "Upload 1 file",
                "Orphan 2 files",
                "Skip 0 files",
                "Ignore 1 unsupported file",
                "  song.mp3",
                "Found 1 protected file",
                "  keep/me.html",
            ]
        );
    }

    #[test]
    fn test_deploy_summary_with_cleanup_and_supporter() {
        let lines = summary_lines(&diff(), SummaryTense::Done, true, true);
        assert_eq!(lines[0], "Uploaded 1 file");
        assert_eq!(lines[1], "Deleted 2 files");
        assert_eq!(lines[2], "Skipped 0 files");
        assert_eq!(lines[3], "Included 1 unsupported file");
    }
}
