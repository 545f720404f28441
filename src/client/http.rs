use super::{log_request, AnalysisApi, SERVICE_UNREACHABLE};
use crate::error::TransactionLensError;
use crate::models::{AnalysisEnvelope, AnalyzeRequest, Transaction, TransactionAnalysis};
use crate::utils::Upload;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// Why a request produced no usable body.
#[derive(Debug)]
enum RequestFailure {
    Unreachable,
    Status(StatusCode),
    InvalidBody(String),
}

impl RequestFailure {
    fn message(&self) -> String {
        match self {
            RequestFailure::Unreachable => SERVICE_UNREACHABLE.to_string(),
            RequestFailure::Status(status) => format!("API error: {}", status.as_u16()),
            RequestFailure::InvalidBody(err) => {
                format!("Invalid response from analysis service: {}", err)
            }
        }
    }
}

#[derive(Clone)]
pub struct HttpAnalysisClient {
    base_url: Url,
    client: Client,
}

impl HttpAnalysisClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, TransactionLensError> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            TransactionLensError::ConfigError(format!("Invalid API URL {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TransactionLensError::ConfigError(format!(
                "Invalid API URL {}: not a base URL",
                base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            TransactionLensError::ConfigError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(HttpAnalysisClient { base_url, client })
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Sends the request and returns the body of a 2xx response. A non-2xx
    /// status is reported before the body is read.
    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, RequestFailure> {
        let response = request.send().await.map_err(|e| {
            debug!("Transport failure talking to {}: {}", self.base_url, e);
            RequestFailure::Unreachable
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestFailure::Status(status));
        }
        let body = response.bytes().await.map_err(|e| {
            debug!("Failed reading response body from {}: {}", self.base_url, e);
            RequestFailure::Unreachable
        })?;
        Ok(body.to_vec())
    }

    fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RequestFailure> {
        serde_json::from_slice(body).map_err(|e| RequestFailure::InvalidBody(e.to_string()))
    }

    async fn post_analyze(&self, request: &AnalyzeRequest) -> Result<TransactionAnalysis, RequestFailure> {
        let body = self
            .execute(self.client.post(self.url(&["analyze"])).json(request))
            .await?;
        let envelope: AnalysisEnvelope = Self::decode(&body)?;
        envelope
            .analysis
            .ok_or_else(|| RequestFailure::InvalidBody("missing analysis".to_string()))
    }

    async fn fetch_history(&self) -> Result<Vec<Transaction>, RequestFailure> {
        let body = self
            .execute(self.client.get(self.url(&["transactions"])))
            .await?;
        Self::decode(&body)
    }

    async fn fetch_analysis(&self, id: &str) -> Result<Option<TransactionAnalysis>, RequestFailure> {
        let body = self
            .execute(self.client.get(self.url(&["transaction", id])))
            .await?;
        let envelope: AnalysisEnvelope = Self::decode(&body)?;
        if envelope.analysis.is_none() {
            debug!("No analysis stored for transaction {}", id);
        }
        Ok(envelope.analysis)
    }
}

#[async_trait]
impl AnalysisApi for HttpAnalysisClient {
    async fn submit(
        &self,
        description: &str,
        file: Option<&Upload>,
    ) -> Result<TransactionAnalysis, TransactionLensError> {
        let start_time = Instant::now();
        let file_content = file.map(Upload::decode_text).transpose()?;
        let request = AnalyzeRequest {
            description: description.to_string(),
            file_content,
        };

        let result = self.post_analyze(&request).await;
        log_request(&self.endpoint(), "POST /analyze", start_time, result.is_ok());
        result.map_err(|failure| {
            error!("Error analyzing transaction: {}", failure.message());
            TransactionLensError::AnalysisError(failure.message())
        })
    }

    async fn list_history(&self) -> Result<Vec<Transaction>, TransactionLensError> {
        let start_time = Instant::now();
        let result = self.fetch_history().await;
        log_request(&self.endpoint(), "GET /transactions", start_time, result.is_ok());
        result.map_err(|failure| {
            error!("Error fetching transaction history: {}", failure.message());
            TransactionLensError::FetchError(failure.message())
        })
    }

    async fn get_analysis(
        &self,
        id: &str,
    ) -> Result<Option<TransactionAnalysis>, TransactionLensError> {
        let start_time = Instant::now();
        let result = self.fetch_analysis(id).await;
        log_request(&self.endpoint(), "GET /transaction/{id}", start_time, result.is_ok());
        result.map_err(|failure| {
            error!("Error fetching transaction analysis {}: {}", id, failure.message());
            TransactionLensError::FetchError(failure.message())
        })
    }

    fn endpoint(&self) -> String {
        self.base_url.to_string()
    }
}
