pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{
    settings::RunSettings, storage::LocalStorage, suite_config::SuiteConfig, CliConfig,
};
pub use core::{
    case::{build_cases, CaseFilter},
    client::ApiClient,
    report::ReportWriter,
    runner::{SmokeCase, SuiteReport, SuiteRunner},
};
pub use utils::error::{Result, SmokeError};
