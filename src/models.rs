use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} Risk", self.label())
    }
}

/// Structured result produced by the remote analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAnalysis {
    pub sender: String,
    pub receiver: String,
    pub amount: String,
    pub currency: String,
    pub transaction_type: String,
    pub transaction_date: String,
    /// 0-100
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    /// 0-1
    pub confidence_score: f64,
    pub category: String,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl TransactionAnalysis {
    pub fn confidence_percent(&self) -> f64 {
        self.confidence_score * 100.0
    }
}

/// A previously submitted request as listed by `GET /transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub timestamp: String,
    #[serde(default, alias = "originalContent")]
    pub original_content: Option<String>,
}

impl Transaction {
    /// Formats the timestamp as e.g. `Mar 4, 2025 3:07 PM`. Unparseable
    /// timestamps are returned as-is.
    pub fn display_timestamp(&self) -> String {
        const FORMAT: &str = "%b %-d, %Y %-I:%M %p";

        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return parsed.format(FORMAT).to_string();
        }
        match NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
            Ok(parsed) => parsed.format(FORMAT).to_string(),
            Err(_) => self.timestamp.clone(),
        }
    }
}

/// Body of `POST /analyze`. `file_content` is sent as `null` when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub description: String,
    pub file_content: Option<String>,
}

/// Response body of `POST /analyze` and `GET /transaction/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisEnvelope {
    #[serde(default)]
    pub analysis: Option<TransactionAnalysis>,
}
