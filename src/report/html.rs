//! HTML rendering and report files

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::automation::types::TestCaseResult;
use crate::common::{paths, Error, Result};

use super::{ReportSummary, Reporter, RunInfo};

/// Attempts at finding a free file name within the same second
const MAX_NAME_ATTEMPTS: usize = 1000;

const STYLE: &str = "\
table, th, td {border: 1px solid black; border-collapse: collapse; border-spacing: 8px}
th {background-color: #3DBBDB; color: white}
td {text-align: center}
body {font-family: sans-serif}";

/// Writes one timestamped HTML file per run
#[derive(Debug, Clone)]
pub struct HtmlReporter {
    dir: PathBuf,
    prefix: String,
}

impl HtmlReporter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Create a new report file without touching existing ones
    fn create_file(&self) -> Result<(PathBuf, std::fs::File)> {
        paths::ensure_dir(&self.dir).map_err(|e| {
            Error::Report(format!("cannot create '{}': {}", self.dir.display(), e))
        })?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{}{}.html", self.prefix, stamp)
            } else {
                format!("{}{}_{}.html", self.prefix, stamp, attempt)
            };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(Error::Report(format!(
                        "cannot create '{}': {}",
                        path.display(),
                        e
                    )))
                }
            }
        }
        Err(Error::Report(format!(
            "no free report name for {} in '{}'",
            stamp,
            self.dir.display()
        )))
    }
}

impl Reporter for HtmlReporter {
    fn generate(&self, results: &[TestCaseResult], run: &RunInfo) -> Result<PathBuf> {
        let summary = ReportSummary::from_results(results, &run.automation);
        let document = render(results, run, &summary);

        let (path, file) = self.create_file()?;
        write_or_discard(&path, file, &document)?;

        tracing::debug!(
            "Wrote report with {} rows to {}",
            results.len(),
            path.display()
        );
        Ok(path)
    }
}

/// Write the document, removing the file again if the write fails
fn write_or_discard<W: Write>(path: &Path, mut writer: W, document: &str) -> Result<()> {
    let written = writer
        .write_all(document.as_bytes())
        .and_then(|_| writer.flush());
    drop(writer);

    written.map_err(|e| {
        if let Err(remove) = std::fs::remove_file(path) {
            tracing::warn!(
                "Could not remove partial report {}: {}",
                path.display(),
                remove
            );
        }
        Error::Report(format!("cannot write '{}': {}", path.display(), e))
    })
}

/// Render the complete report document
pub fn render(
    results: &[TestCaseResult],
    run: &RunInfo,
    summary: &ReportSummary,
) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<title>API Automation test results</title>\n");
    let _ = writeln!(html, "<style>\n{}\n</style>", STYLE);
    html.push_str("</head>\n<body>\n");
    html.push_str("<h1>API Automation test results</h1>\n");

    html.push_str("<h2>API Test Results summary:</h2>\n");
    let _ = writeln!(
        html,
        "<p><strong>Test case type</strong>: {}</p>",
        escape(&run.automation.label())
    );
    let _ = writeln!(
        html,
        "<p><strong>Automation start date</strong>: {}</p>",
        escape(&run.start_date)
    );
    let _ = writeln!(
        html,
        "<p><strong>Total Duration</strong>: {}</p>",
        escape(&run.total_duration)
    );

    html.push_str("<table class=\"summary\">\n<tr>");
    for header in ["Planned Test Cases", "Test Case Executed", "Passed", "Failed"] {
        let _ = write!(html, "<th scope=\"col\">{}</th>", header);
    }
    html.push_str("</tr>\n");
    let _ = writeln!(
        html,
        "<tr><td id=\"total\">{}</td><td id=\"executed\">{}</td><td id=\"passed\">{}</td><td id=\"failed\">{}</td></tr>",
        summary.total, summary.executed, summary.passed, summary.failed
    );
    html.push_str("</table>\n");

    html.push_str("<h2>API Test Results details:</h2>\n");
    html.push_str("<table class=\"results\">\n<tr>");
    for header in ["Section", "Test Case", "Result", "Duration", "Reason"] {
        let _ = write!(html, "<th>{}</th>", header);
    }
    html.push_str("</tr>\n");
    for result in results {
        let _ = writeln!(
            html,
            "<tr class=\"result\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&result.section),
            escape(&result.test_case),
            result.result,
            escape(&result.duration),
            escape(&result.reason).replace('\n', "<br/>")
        );
    }
    html.push_str("</table>\n");

    html.push_str("</body>\n</html>\n");
    html
}

/// Escape text for HTML element content and attribute values
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
