use crate::models::TransactionRecord;

/// Case-insensitive substring match over symbol, sender and receiver.
/// An empty query keeps everything.
pub fn filter_transactions<'a>(
    records: &'a [TransactionRecord],
    query: &str,
) -> Vec<&'a TransactionRecord> {
    if query.is_empty() {
        return records.iter().collect();
    }

    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|tx| matches_query(tx, &needle))
        .collect()
}

fn matches_query(tx: &TransactionRecord, needle: &str) -> bool {
    tx.symbol.to_lowercase().contains(needle)
        || tx.sender.to_lowercase().contains(needle)
        || tx.receiver.to_lowercase().contains(needle)
}
