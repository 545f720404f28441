use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::TransactionLensError;
use crate::models::{Transaction, TransactionAnalysis};

#[derive(Serialize, Deserialize, Default)]
struct CacheData {
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    analyses: HashMap<String, TransactionAnalysis>,
}

/// Last known copy of the history list and the analyses opened from it,
/// persisted as JSON so it can be shown while the service is unreachable.
pub struct HistoryCache {
    cache_file: PathBuf,
    data: CacheData,
}

impl HistoryCache {
    pub fn new(cache_file: &Path) -> Result<Self, TransactionLensError> {
        let data = if cache_file.exists() {
            let file = File::open(cache_file)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).unwrap_or_else(|e| {
                warn!(
                    "Unable to parse history cache {}, starting empty: {}",
                    cache_file.display(),
                    e
                );
                CacheData::default()
            })
        } else {
            CacheData::default()
        };

        Ok(HistoryCache {
            cache_file: cache_file.to_path_buf(),
            data,
        })
    }

    pub fn history(&self) -> &[Transaction] {
        &self.data.transactions
    }

    pub fn analysis(&self, id: &str) -> Option<&TransactionAnalysis> {
        self.data.analyses.get(id)
    }

    pub fn store_history(&mut self, transactions: Vec<Transaction>) -> Result<(), TransactionLensError> {
        self.data.transactions = transactions;
        self.save()
    }

    pub fn store_analysis(
        &mut self,
        id: &str,
        analysis: TransactionAnalysis,
    ) -> Result<(), TransactionLensError> {
        self.data.analyses.insert(id.to_string(), analysis);
        self.save()
    }

    /// Puts a fresh submission at the head of the history and keeps its analysis.
    pub fn record_submission(
        &mut self,
        transaction: Transaction,
        analysis: TransactionAnalysis,
    ) -> Result<(), TransactionLensError> {
        self.data.transactions.retain(|t| t.id != transaction.id);
        self.data.analyses.insert(transaction.id.clone(), analysis);
        self.data.transactions.insert(0, transaction);
        self.save()
    }

    fn save(&self) -> Result<(), TransactionLensError> {
        if let Some(parent) = self.cache_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.cache_file)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.data)?;
        writer.flush()?;
        Ok(())
    }
}
