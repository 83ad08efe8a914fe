use crate::core::client::ApiClient;
use crate::core::template::builtin_variables;
use crate::domain::model::{CaseOutcome, CaseResult, CaseVerdict};
use crate::utils::error::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// 執行期間在案例之間傳遞的狀態
#[derive(Debug, Clone)]
pub struct SuiteContext {
    pub run_id: String,
    vars: HashMap<String, String>,
    suite_vars: HashMap<String, String>,
    builtins: HashMap<String, String>,
    results: Vec<CaseResult>,
}

impl SuiteContext {
    pub fn new(
        run_id: String,
        suite_vars: HashMap<String, String>,
        builtins: HashMap<String, String>,
    ) -> Self {
        Self {
            run_id,
            vars: HashMap::new(),
            suite_vars,
            builtins,
            results: Vec::new(),
        }
    }

    /// 佔位符查找順序：擷取的變數、套件變數、內建變數
    pub fn lookup(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .or_else(|| self.suite_vars.get(name))
            .or_else(|| self.builtins.get(name))
            .cloned()
    }

    pub fn get_var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn set_var(&mut self, name: String, value: String) {
        self.vars.insert(name, value);
    }

    pub fn get_result_by_name(&self, name: &str) -> Option<&CaseResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn has_passed(&self, name: &str) -> bool {
        self.get_result_by_name(name)
            .is_some_and(|r| r.outcome.is_passed())
    }

    pub fn add_result(&mut self, result: CaseResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[CaseResult] {
        &self.results
    }
}

/// 一個可執行的檢查：HTTP 案例或資料檔稽核
#[async_trait::async_trait]
pub trait SmokeCase: Send + Sync {
    fn name(&self) -> &str;

    fn title(&self) -> &str;

    /// 詳細報告中的分組
    fn section(&self) -> &str;

    /// 回傳 Some 表示略過，不計入已執行數
    fn skip_reason(&self, _context: &SuiteContext) -> Option<String> {
        None
    }

    async fn run(&self, client: &ApiClient, context: &SuiteContext) -> Result<CaseVerdict>;

    /// `--dry-run` 顯示的一行說明
    fn describe_plan(&self) -> String;
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub run_id: String,
    pub tests_run: usize,
    pub tests_passed: usize,
    pub results: Vec<CaseResult>,
}

impl SuiteReport {
    pub fn from_results(run_id: String, results: Vec<CaseResult>) -> Self {
        let tests_run = results.iter().filter(|r| r.outcome.is_counted()).count();
        let tests_passed = results.iter().filter(|r| r.outcome.is_passed()).count();
        Self {
            run_id,
            tests_run,
            tests_passed,
            results,
        }
    }

    /// 沒有執行任何測試時為 0
    pub fn success_rate(&self) -> f64 {
        if self.tests_run == 0 {
            0.0
        } else {
            self.tests_passed as f64 / self.tests_run as f64 * 100.0
        }
    }

    pub fn all_passed(&self) -> bool {
        self.tests_passed == self.tests_run
    }

    pub fn failed(&self) -> impl Iterator<Item = &CaseResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, CaseOutcome::Failed(_)))
    }

    /// 獲取執行摘要
    pub fn summary(&self) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        let skipped = self.results.len() - self.tests_run;
        let total_duration: Duration = self.results.iter().map(|r| r.duration).sum();
        let failed_cases: Vec<serde_json::Value> = self
            .failed()
            .map(|r| serde_json::Value::String(r.name.clone()))
            .collect();

        summary.insert("run_id".to_string(), serde_json::Value::String(self.run_id.clone()));
        summary.insert("tests_run".to_string(), serde_json::Value::from(self.tests_run));
        summary.insert("tests_passed".to_string(), serde_json::Value::from(self.tests_passed));
        summary.insert(
            "tests_failed".to_string(),
            serde_json::Value::from(self.tests_run - self.tests_passed),
        );
        summary.insert("skipped".to_string(), serde_json::Value::from(skipped));
        summary.insert(
            "success_rate".to_string(),
            serde_json::Value::from((self.success_rate() * 100.0).round() / 100.0),
        );
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::from(total_duration.as_millis() as u64),
        );
        summary.insert("failed_cases".to_string(), serde_json::Value::Array(failed_cases));

        summary
    }
}

/// 依序執行所有案例
pub struct SuiteRunner {
    cases: Vec<Box<dyn SmokeCase>>,
    run_id: String,
    suite_vars: HashMap<String, String>,
    started_at: NaiveDateTime,
}

impl SuiteRunner {
    pub fn new(run_id: String) -> Self {
        Self {
            cases: Vec::new(),
            run_id,
            suite_vars: HashMap::new(),
            started_at: chrono::Local::now().naive_local(),
        }
    }

    pub fn with_variables(mut self, variables: HashMap<String, String>) -> Self {
        self.suite_vars = variables;
        self
    }

    /// 固定內建變數使用的時間
    pub fn with_start_time(mut self, started_at: NaiveDateTime) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn add_case(&mut self, case: Box<dyn SmokeCase>) {
        self.cases.push(case);
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// 不送出請求，只列出將要執行的內容
    pub fn plan(&self) -> Vec<String> {
        self.cases
            .iter()
            .enumerate()
            .map(|(index, case)| {
                format!(
                    "{:>2}. [{}] {}: {}",
                    index + 1,
                    case.section(),
                    case.title(),
                    case.describe_plan()
                )
            })
            .collect()
    }

    fn new_context(&self, client: &ApiClient) -> SuiteContext {
        let mut builtins = builtin_variables(self.started_at);
        builtins.insert("admin_username".to_string(), client.admin_username().to_string());
        builtins.insert("admin_password".to_string(), client.admin_password().to_string());

        SuiteContext::new(self.run_id.clone(), self.suite_vars.clone(), builtins)
    }

    /// 執行所有案例；單一案例失敗不會中斷後續案例
    pub async fn execute_all(&self, client: &ApiClient) -> SuiteReport {
        let mut context = self.new_context(client);

        for case in &self.cases {
            if let Some(reason) = case.skip_reason(&context) {
                println!("\n⏭️ Skipping {} ({})", case.title(), reason);
                tracing::info!("⏭️ Skipping case: {} ({})", case.name(), reason);
                context.add_result(CaseResult {
                    name: case.name().to_string(),
                    title: case.title().to_string(),
                    section: case.section().to_string(),
                    outcome: CaseOutcome::Skipped(reason),
                    status: None,
                    duration: Duration::ZERO,
                    notes: Vec::new(),
                });
                continue;
            }

            println!("\n🔍 Testing {}...", case.title());
            let start_time = Instant::now();

            let verdict = match case.run(client, &context).await {
                Ok(verdict) => verdict,
                Err(e) => {
                    tracing::error!("❌ Case {} errored: {}", case.name(), e);
                    CaseVerdict::failed(None, format!("Error: {}", e))
                }
            };
            let duration = start_time.elapsed();

            match &verdict.outcome {
                CaseOutcome::Passed => match verdict.status {
                    Some(status) => println!("✅ Passed - Status: {}", status),
                    None => println!("✅ Passed"),
                },
                CaseOutcome::Failed(reason) => println!("❌ Failed - {}", reason),
                CaseOutcome::Skipped(reason) => println!("⏭️ Skipped - {}", reason),
            }
            for note in &verdict.notes {
                println!("   {}", note);
            }

            for (name, value) in &verdict.captures {
                tracing::debug!("📌 {}: captured {} = {}", case.name(), name, value);
                context.set_var(name.clone(), value.clone());
            }

            tracing::debug!(
                "{} {} finished in {:?}",
                verdict.outcome.label(),
                case.name(),
                duration
            );

            context.add_result(CaseResult {
                name: case.name().to_string(),
                title: case.title().to_string(),
                section: case.section().to_string(),
                outcome: verdict.outcome,
                status: verdict.status,
                duration,
                notes: verdict.notes,
            });
        }

        SuiteReport::from_results(self.run_id.clone(), context.results)
    }
}
