use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const EXPLORER_TX_URL: &str = "https://etherscan.io/tx/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub symbol: String,
    pub amount: f64,
    pub sender: String,
    pub receiver: String,
    pub transaction_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<String>,
}

impl TransactionRecord {
    pub fn new(
        symbol: impl Into<String>,
        amount: f64,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        transaction_hash: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            amount,
            sender: sender.into(),
            receiver: receiver.into(),
            transaction_hash: transaction_hash.into(),
            observed_at: None,
        }
    }

    /// Block explorer link; the hash is interpolated as-is.
    pub fn explorer_url(&self) -> String {
        format!("{}{}", EXPLORER_TX_URL, self.transaction_hash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Live,
    Fallback,
}

/// One published result of the refresh loop. Replaced wholesale every cycle.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionSnapshot {
    pub transactions: Vec<TransactionRecord>,
    pub origin: DataOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub token: Option<String>,
    pub loading: bool,
    pub cycle: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl TransactionSnapshot {
    /// The state before the first cycle completes.
    pub fn loading() -> Self {
        Self {
            transactions: Vec::new(),
            origin: DataOrigin::Fallback,
            fallback_reason: None,
            token: None,
            loading: true,
            cycle: 0,
            refreshed_at: None,
        }
    }

    pub fn live(transactions: Vec<TransactionRecord>, token: Option<String>, cycle: u64) -> Self {
        Self {
            transactions,
            origin: DataOrigin::Live,
            fallback_reason: None,
            token,
            loading: false,
            cycle,
            refreshed_at: Some(Utc::now()),
        }
    }

    pub fn fallback(
        transactions: Vec<TransactionRecord>,
        reason: String,
        token: Option<String>,
        cycle: u64,
    ) -> Self {
        Self {
            transactions,
            origin: DataOrigin::Fallback,
            fallback_reason: Some(reason),
            token,
            loading: false,
            cycle,
            refreshed_at: Some(Utc::now()),
        }
    }

    pub fn is_live(&self) -> bool {
        self.origin == DataOrigin::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explorer_url_interpolates_hash() {
        let record = TransactionRecord::new("ETH", 1.0, "0xA", "0xB", "0x1");
        assert_eq!(record.explorer_url(), "https://etherscan.io/tx/0x1");
    }

    #[test]
    fn initial_snapshot_is_loading() {
        let snapshot = TransactionSnapshot::loading();
        assert!(snapshot.loading);
        assert!(snapshot.transactions.is_empty());
        assert_eq!(snapshot.cycle, 0);
        assert!(snapshot.refreshed_at.is_none());
    }

    #[test]
    fn origin_serializes_lowercase() {
        let snapshot = TransactionSnapshot::fallback(Vec::new(), "offline".into(), None, 1);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["origin"], "fallback");
        assert_eq!(json["fallback_reason"], "offline");
        assert_eq!(json["loading"], false);
    }
}
