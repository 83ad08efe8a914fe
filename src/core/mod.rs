pub mod audit;
pub mod calendar;
pub mod case;
pub mod checks;
pub mod client;
pub mod path;
pub mod report;
pub mod runner;
pub mod template;

pub use crate::domain::model::{ApiResponse, CaseOutcome, CaseResult, CaseVerdict};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
