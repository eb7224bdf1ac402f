use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    pub name: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot: Option<PathBuf>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    run_id: &'a str,
    summary: ReportSummary,
    records: &'a [TestRecord],
}

/// Collects test outcomes over a run and renders them as JSON or HTML.
pub struct ReportGenerator {
    run_id: String,
    started_at: DateTime<Utc>,
    records: Mutex<Vec<TestRecord>>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn record(&self, record: TestRecord) {
        self.records.lock().expect("report records poisoned").push(record);
    }

    pub fn passed(&self, name: &str, duration_ms: u64) {
        self.record(TestRecord {
            name: name.to_string(),
            status: TestStatus::Passed,
            duration_ms,
            error: None,
            screenshot: None,
            finished_at: Utc::now(),
        });
    }

    pub fn failed(&self, name: &str, duration_ms: u64, error: &str, screenshot: Option<PathBuf>) {
        self.record(TestRecord {
            name: name.to_string(),
            status: TestStatus::Failed,
            duration_ms,
            error: Some(error.to_string()),
            screenshot,
            finished_at: Utc::now(),
        });
    }

    pub fn summary(&self) -> ReportSummary {
        let records = self.records.lock().expect("report records poisoned");
        let count = |status: TestStatus| records.iter().filter(|r| r.status == status).count();
        ReportSummary {
            total: records.len(),
            passed: count(TestStatus::Passed),
            failed: count(TestStatus::Failed),
            skipped: count(TestStatus::Skipped),
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let records = self.records.lock().expect("report records poisoned");
        let document = ReportDocument {
            run_id: &self.run_id,
            summary: ReportSummary {
                total: records.len(),
                passed: records.iter().filter(|r| r.status == TestStatus::Passed).count(),
                failed: records.iter().filter(|r| r.status == TestStatus::Failed).count(),
                skipped: records.iter().filter(|r| r.status == TestStatus::Skipped).count(),
                started_at: self.started_at,
                finished_at: Utc::now(),
            },
            records: records.as_slice(),
        };

        let json = serde_json::to_string_pretty(&document)?;
        write_report(path.as_ref(), &json)
    }

    pub fn write_html(&self, path: impl AsRef<Path>) -> Result<()> {
        let records = self.records.lock().expect("report records poisoned");

        let mut rows = String::new();
        for record in records.iter() {
            let status = match record.status {
                TestStatus::Passed => "passed",
                TestStatus::Failed => "failed",
                TestStatus::Skipped => "skipped",
            };
            rows.push_str(&format!(
                "<tr class=\"{status}\"><td>{}</td><td>{status}</td><td>{} ms</td><td>{}</td></tr>\n",
                html_escape(&record.name),
                record.duration_ms,
                html_escape(record.error.as_deref().unwrap_or("")),
            ));
        }

        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Test report {run_id}</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
table {{ border-collapse: collapse; width: 100%; }}
td, th {{ border: 1px solid #ccc; padding: 6px 10px; text-align: left; }}
tr.passed td {{ background: #eaf7ea; }}
tr.failed td {{ background: #fbeaea; }}
</style>
</head>
<body>
<h1>Test report</h1>
<p>Run {run_id}, started {started}</p>
<table>
<tr><th>Test</th><th>Status</th><th>Duration</th><th>Error</th></tr>
{rows}</table>
</body>
</html>
"#,
            run_id = self.run_id,
            started = self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );

        write_report(path.as_ref(), &html)
    }
}

fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_by_status() {
        let report = ReportGenerator::new();
        report.passed("smoke_login", 1200);
        report.passed("smoke_search", 800);
        report.failed("regression_checkout", 4000, "timeout on #pay", None);

        let summary = report.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 0);
    }

    #[test]
    fn json_report_is_valid_and_complete() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("report.json");

        let report = ReportGenerator::new();
        report.passed("smoke_login", 1500);
        report.write_json(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["summary"]["total"], 1);
        assert_eq!(parsed["records"][0]["name"], "smoke_login");
        assert_eq!(parsed["records"][0]["status"], "passed");
    }

    #[test]
    fn html_report_escapes_error_text() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.html");

        let report = ReportGenerator::new();
        report.failed("bad", 10, "<selector> not found", None);
        report.write_html(&path).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("&lt;selector&gt; not found"));
        assert!(!html.contains("<selector> not found"));
    }
}
