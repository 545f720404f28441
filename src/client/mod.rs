mod http;

pub use http::HttpAnalysisClient;

use crate::config::Config;
use crate::error::TransactionLensError;
use crate::models::{Transaction, TransactionAnalysis};
use crate::utils::Upload;
use async_trait::async_trait;
use log::info;
use std::time::Instant;

/// Message used for every failure where no HTTP response was received.
pub const SERVICE_UNREACHABLE: &str =
    "Failed to connect to the analysis service. Please ensure the backend server is running.";

/// The three operations offered by the remote analysis service.
///
/// Implementations hold no mutable state: every call is independent and
/// failures are returned immediately, without retries.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Sends a description and optional file for analysis. Fails with
    /// `AnalysisError`.
    async fn submit(
        &self,
        description: &str,
        file: Option<&Upload>,
    ) -> Result<TransactionAnalysis, TransactionLensError>;

    /// Lists previously analyzed transactions. Fails with `FetchError`.
    async fn list_history(&self) -> Result<Vec<Transaction>, TransactionLensError>;

    /// `Ok(None)` when the service has no analysis for `id`. Fails with
    /// `FetchError`.
    async fn get_analysis(
        &self,
        id: &str,
    ) -> Result<Option<TransactionAnalysis>, TransactionLensError>;

    fn endpoint(&self) -> String;
}

pub fn log_request(endpoint: &str, operation: &str, start_time: Instant, succeeded: bool) {
    let duration = start_time.elapsed();
    info!(
        "{} - {} {} in {:?}",
        endpoint,
        operation,
        if succeeded { "completed" } else { "failed" },
        duration
    );
}

pub fn get_client(config: &Config) -> Result<Box<dyn AnalysisApi>, TransactionLensError> {
    let client = HttpAnalysisClient::new(&config.get_api_url(), config.get_request_timeout())?;
    Ok(Box::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_uses_configured_url() {
        let config = Config {
            api_url: Some("http://127.0.0.1:9/".to_string()),
            ..Config::default()
        };
        let client = get_client(&config).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/");
    }

    #[test]
    fn factory_rejects_unusable_url() {
        let config = Config {
            api_url: Some("not a url".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            get_client(&config),
            Err(TransactionLensError::ConfigError(_))
        ));
    }
}
