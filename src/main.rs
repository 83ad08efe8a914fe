use clap::Parser;
use nuestra_carne_smoke::config::env_file::load_env_file;
use nuestra_carne_smoke::core::report::{render_details, render_header, render_summary};
use nuestra_carne_smoke::utils::error::ErrorSeverity;
use nuestra_carne_smoke::utils::{logger, validation::Validate};
use nuestra_carne_smoke::{
    build_cases, ApiClient, CliConfig, LocalStorage, ReportWriter, Result, SuiteConfig,
    SuiteRunner,
};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting nuestra-carne-smoke");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    match run(config).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Smoke run aborted: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

/// 回傳所有計入的測試是否都通過
async fn run(config: CliConfig) -> Result<bool> {
    // 驗證配置
    config.validate()?;

    let suite = match &config.suite {
        Some(path) => {
            tracing::info!("📄 Loading suite from {}", path);
            SuiteConfig::from_file(path)?
        }
        None => SuiteConfig::bundled()?,
    };
    suite.validate()?;

    let env_vars = load_env_file(&config.env_file)?;
    let settings = config.to_settings(suite.suite.base_url.as_deref(), &env_vars);
    settings.validate()?;
    tracing::info!("🌐 Base URL: {}", settings.base_url);

    let cases = build_cases(&suite, settings.data_dir.as_deref(), &config.case_filter())?;

    let run_id = format!(
        "{}_{}",
        suite.suite.name,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let mut runner = SuiteRunner::new(run_id).with_variables(suite.suite.variables.clone());
    for case in cases {
        runner.add_case(case);
    }

    println!("{}", render_header(&settings.base_url));

    if config.dry_run {
        println!("\n📝 {} cases planned (dry run):", runner.len());
        for line in runner.plan() {
            println!("{}", line);
        }
        return Ok(true);
    }

    let client = ApiClient::new(&settings)?;
    let report = runner.execute_all(&client).await;

    println!("{}", render_summary(&report));
    println!("{}", render_details(&report));

    if let Some(dir) = &settings.report_dir {
        let writer = ReportWriter::new(LocalStorage::new(dir.clone()));
        for file in writer.write(&report).await? {
            println!("📁 Saved {}/{}", dir.trim_end_matches('/'), file);
        }
    }

    tracing::info!("📊 Execution summary: {:?}", report.summary());
    Ok(report.all_passed())
}
