use crate::core::runner::SuiteReport;
use crate::domain::model::CaseOutcome;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, SmokeError};

pub const CSV_REPORT: &str = "smoke_results.csv";
pub const JSON_REPORT: &str = "smoke_results.json";

const RULE: &str = "==================================================";

pub fn render_header(base_url: &str) -> String {
    format!(
        "{rule}\n🔍 TESTING NUESTRA CARNE API 🔍\n{rule}\nBase URL: {base_url}",
        rule = RULE
    )
}

pub fn render_summary(report: &SuiteReport) -> String {
    format!(
        "\n{rule}\n📊 TEST RESULTS 📊\n{rule}\nTests passed: {}/{}\nSuccess rate: {:.2}%",
        report.tests_passed,
        report.tests_run,
        report.success_rate(),
        rule = RULE
    )
}

/// 依區段分組，保留第一次出現的順序
pub fn render_details(report: &SuiteReport) -> String {
    let mut sections: Vec<&str> = Vec::new();
    for result in &report.results {
        if !sections.contains(&result.section.as_str()) {
            sections.push(&result.section);
        }
    }

    let mut lines = vec![
        format!("\n{}", RULE),
        "📋 DETAILED RESULTS 📋".to_string(),
        RULE.to_string(),
    ];

    for section in sections {
        lines.push(format!("\n{}:", section));
        for result in report.results.iter().filter(|r| r.section == section) {
            let line = match &result.outcome {
                CaseOutcome::Passed => format!("  ✅ PASS {}", result.title),
                CaseOutcome::Failed(reason) => format!("  ❌ FAIL {} ({})", result.title, reason),
                CaseOutcome::Skipped(reason) => {
                    format!("  ⏭️ SKIP {} ({})", result.title, reason)
                }
            };
            lines.push(line);
        }
    }

    lines.join("\n")
}

pub fn render_csv(report: &SuiteReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["name", "section", "outcome", "status", "duration_ms", "message"])?;

    for result in &report.results {
        let status = result.status.map(|s| s.to_string()).unwrap_or_default();
        let duration_ms = result.duration.as_millis().to_string();
        writer.write_record([
            result.name.as_str(),
            result.section.as_str(),
            result.outcome.label(),
            status.as_str(),
            duration_ms.as_str(),
            result.message(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| SmokeError::IoError(e.into_error()))
}

pub fn render_json(report: &SuiteReport) -> Result<Vec<u8>> {
    let document = serde_json::json!({
        "run_id": report.run_id,
        "tests_run": report.tests_run,
        "tests_passed": report.tests_passed,
        "success_rate": (report.success_rate() * 100.0).round() / 100.0,
        "results": report.results,
    });
    Ok(serde_json::to_vec_pretty(&document)?)
}

/// 將結果寫入報告目錄
pub struct ReportWriter<S: Storage> {
    storage: S,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn write(&self, report: &SuiteReport) -> Result<Vec<String>> {
        self.storage.write_file(CSV_REPORT, &render_csv(report)?).await?;
        self.storage.write_file(JSON_REPORT, &render_json(report)?).await?;

        tracing::info!(
            "💾 Saved {} results to {} and {}",
            report.results.len(),
            CSV_REPORT,
            JSON_REPORT
        );
        Ok(vec![CSV_REPORT.to_string(), JSON_REPORT.to_string()])
    }
}
