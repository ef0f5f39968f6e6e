use super::{DataOrigin, TransactionRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
    pub data_source: DataOrigin,
    pub request_id: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TransactionView {
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub explorer_url: String,
}

impl From<&TransactionRecord> for TransactionView {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            explorer_url: record.explorer_url(),
            record: record.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TransactionList {
    pub query: String,
    pub token: Option<String>,
    pub loading: bool,
    pub total: usize,
    pub matched: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub transactions: Vec<TransactionView>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TokenSelection {
    pub tokens: Vec<String>,
    pub selected: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub data_source: DataOrigin,
    pub source_name: String,
    pub cycle: u64,
    pub last_refresh: Option<DateTime<Utc>>,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}
