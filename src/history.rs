use chrono::{SecondsFormat, Utc};
use futures::future::join_all;
use log::{info, warn};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::HistoryCache;
use crate::client::AnalysisApi;
use crate::error::TransactionLensError;
use crate::models::{Transaction, TransactionAnalysis};
use crate::utils::Upload;

const PREVIEW_CHARS: usize = 50;

static LOCAL_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySource {
    Remote,
    Cache,
}

#[derive(Debug, Clone)]
pub struct HistorySnapshot {
    pub transactions: Vec<Transaction>,
    pub source: HistorySource,
    /// Set when the remote fetch failed and the cached copy was used.
    pub error: Option<String>,
}

/// Pairs the remote client with the local cache and decides when to fall
/// back to the cached copy.
pub struct HistoryService<'a> {
    api: &'a dyn AnalysisApi,
    cache: &'a mut HistoryCache,
}

impl<'a> HistoryService<'a> {
    pub fn new(api: &'a dyn AnalysisApi, cache: &'a mut HistoryCache) -> Self {
        HistoryService { api, cache }
    }

    pub async fn refresh(&mut self) -> Result<HistorySnapshot, TransactionLensError> {
        match self.api.list_history().await {
            Ok(transactions) => {
                if let Err(err) = self.cache.store_history(transactions.clone()) {
                    warn!("Could not update cached transaction history: {}", err);
                }
                Ok(HistorySnapshot {
                    transactions,
                    source: HistorySource::Remote,
                    error: None,
                })
            }
            Err(err) => {
                warn!("Using cached transaction history: {}", err);
                Ok(HistorySnapshot {
                    transactions: self.cache.history().to_vec(),
                    source: HistorySource::Cache,
                    error: Some(err.message()),
                })
            }
        }
    }

    pub async fn open(
        &mut self,
        transaction: &Transaction,
    ) -> Result<Option<TransactionAnalysis>, TransactionLensError> {
        self.open_id(&transaction.id).await
    }

    pub async fn open_id(
        &mut self,
        id: &str,
    ) -> Result<Option<TransactionAnalysis>, TransactionLensError> {
        match self.api.get_analysis(id).await {
            Ok(Some(analysis)) => {
                if let Err(err) = self.cache.store_analysis(id, analysis.clone()) {
                    warn!("Could not cache analysis for {}: {}", id, err);
                }
                Ok(Some(analysis))
            }
            Ok(None) => Ok(None),
            Err(err) => match self.cache.analysis(id) {
                Some(cached) => {
                    warn!("Using cached analysis for {}: {}", id, err);
                    Ok(Some(cached.clone()))
                }
                None => Err(err),
            },
        }
    }

    /// Fetches the analyses for `transactions` concurrently and caches the
    /// ones that resolve. Returns how many were cached.
    pub async fn prefetch(
        &mut self,
        transactions: &[Transaction],
    ) -> usize {
        let api = self.api;
        let results = join_all(transactions.iter().map(|transaction| async move {
            let id = transaction.id.as_str();
            (id, api.get_analysis(id).await)
        }))
        .await;

        let mut cached = 0;
        for (id, result) in results {
            match result {
                Ok(Some(analysis)) => match self.cache.store_analysis(id, analysis) {
                    Ok(()) => cached += 1,
                    Err(err) => warn!("Could not cache analysis for {}: {}", id, err),
                },
                Ok(None) => {}
                Err(err) => warn!("Could not prefetch analysis for {}: {}", id, err),
            }
        }
        info!("Prefetched {} of {} analyses", cached, transactions.len());
        cached
    }

    /// Submits a new analysis request and records it in the local cache.
    pub async fn analyze(
        &mut self,
        description: &str,
        file: Option<&Upload>,
    ) -> Result<TransactionAnalysis, TransactionLensError> {
        let has_file = file.map_or(false, |f| !f.is_empty());
        if description.trim().is_empty() && !has_file {
            return Err(TransactionLensError::InvalidInput(
                "Please enter a transaction description or upload a file to analyze.".to_string(),
            ));
        }

        let analysis = self.api.submit(description, file).await?;

        let file_content = file.and_then(|f| f.decode_text().ok());
        let transaction = local_transaction(description, file_content);
        if let Err(err) = self.cache.record_submission(transaction, analysis.clone()) {
            warn!("Submission analyzed but not recorded locally: {}", err);
        }
        Ok(analysis)
    }
}

fn local_transaction(description: &str, file_content: Option<String>) -> Transaction {
    let now = Utc::now();
    let description = if !description.is_empty() {
        description.to_string()
    } else {
        let preview: String = file_content
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(PREVIEW_CHARS)
            .collect();
        format!("File upload: {}...", preview)
    };
    let original_content = file_content.or_else(|| Some(description.clone()));

    Transaction {
        id: format!(
            "local-{}-{}",
            now.timestamp_millis(),
            LOCAL_SEQUENCE.fetch_add(1, Ordering::Relaxed)
        ),
        description,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        original_content,
    }
}
