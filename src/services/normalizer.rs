use crate::{error::WhaleWatchError, models::TransactionRecord};
use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::Value;

/// One provider item, still in the provider's own shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTransaction {
    /// `{ symbol, amount, from, to, hash }`
    Rest(Value),
    /// `{ Block: {Time}, Transfer: {Amount, Currency: {Symbol}, Sender, Receiver}, Transaction: {Hash} }`
    Transfer(Value),
}

// REST parties come either as plain addresses or as `{ "owner": ... }`
#[derive(Deserialize)]
#[serde(untagged)]
enum Party {
    Address(String),
    Owner { owner: String },
}

impl Party {
    fn into_inner(self) -> String {
        match self {
            Party::Address(addr) => addr,
            Party::Owner { owner } => owner,
        }
    }
}

#[derive(Deserialize)]
struct RestItem {
    symbol: Option<String>,
    amount: Option<Value>,
    from: Option<Party>,
    to: Option<Party>,
    hash: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TransferItem {
    block: Option<BlockInfo>,
    transfer: Option<TransferInfo>,
    transaction: Option<TransactionInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BlockInfo {
    time: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TransferInfo {
    amount: Option<Value>,
    currency: Option<CurrencyInfo>,
    sender: Option<String>,
    receiver: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CurrencyInfo {
    symbol: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TransactionInfo {
    hash: Option<String>,
}

pub fn normalize(raw: &RawTransaction) -> Result<TransactionRecord, WhaleWatchError> {
    match raw {
        RawTransaction::Rest(item) => normalize_rest(item),
        RawTransaction::Transfer(item) => normalize_transfer(item),
    }
}

/// Normalize every item, dropping the ones that fail. Order is preserved.
pub fn normalize_batch(batch: &[RawTransaction]) -> Vec<TransactionRecord> {
    let mut records = Vec::with_capacity(batch.len());

    for (index, raw) in batch.iter().enumerate() {
        match normalize(raw) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(index, error = %e, "Dropping malformed transaction"),
        }
    }

    if records.len() < batch.len() {
        tracing::debug!(
            "Normalized {} of {} transactions",
            records.len(),
            batch.len()
        );
    }

    records
}

fn normalize_rest(item: &Value) -> Result<TransactionRecord, WhaleWatchError> {
    let item: RestItem = serde_json::from_value(item.clone())
        .map_err(|e| WhaleWatchError::normalization("item", e.to_string()))?;

    Ok(TransactionRecord {
        symbol: required("symbol", item.symbol)?,
        amount: parse_amount(item.amount.as_ref())?,
        sender: required("from", item.from.map(Party::into_inner))?,
        receiver: required("to", item.to.map(Party::into_inner))?,
        transaction_hash: required("hash", item.hash)?,
        observed_at: None,
    })
}

fn normalize_transfer(item: &Value) -> Result<TransactionRecord, WhaleWatchError> {
    let item: TransferItem = serde_json::from_value(item.clone())
        .map_err(|e| WhaleWatchError::normalization("item", e.to_string()))?;

    let transfer = item
        .transfer
        .ok_or_else(|| WhaleWatchError::normalization("Transfer", "missing"))?;
    let hash = item.transaction.and_then(|tx| tx.hash);
    let time = item.block.and_then(|block| block.time);

    Ok(TransactionRecord {
        symbol: required("Currency.Symbol", transfer.currency.and_then(|c| c.symbol))?,
        amount: parse_amount(transfer.amount.as_ref())?,
        sender: required("Sender", transfer.sender)?,
        receiver: required("Receiver", transfer.receiver)?,
        transaction_hash: required("Transaction.Hash", hash)?,
        observed_at: time.as_deref().map(localize_time),
    })
}

fn required(field: &'static str, value: Option<String>) -> Result<String, WhaleWatchError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(WhaleWatchError::normalization(field, "empty")),
        None => Err(WhaleWatchError::normalization(field, "missing")),
    }
}

/// Amounts arrive as JSON numbers or numeric strings.
pub fn parse_amount(value: Option<&Value>) -> Result<f64, WhaleWatchError> {
    let amount = match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| WhaleWatchError::normalization("amount", format!("{} out of range", n)))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| WhaleWatchError::normalization("amount", format!("{:?} is not a number", s)))?,
        Some(other) => {
            return Err(WhaleWatchError::normalization(
                "amount",
                format!("unexpected value {}", other),
            ))
        }
        None => return Err(WhaleWatchError::normalization("amount", "missing")),
    };

    if !amount.is_finite() || amount < 0.0 {
        return Err(WhaleWatchError::normalization(
            "amount",
            format!("{} is not a finite non-negative number", amount),
        ));
    }

    Ok(amount)
}

/// RFC 3339 block time in local time. Anything else is passed through.
pub fn localize_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(time) => time
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}
