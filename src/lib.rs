pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod report;
pub mod utils;

pub use cache::HistoryCache;
pub use client::{AnalysisApi, HttpAnalysisClient};
pub use config::Config;
pub use error::TransactionLensError;
pub use models::{RiskLevel, Transaction, TransactionAnalysis};
