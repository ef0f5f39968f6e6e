use crate::{
    error::WhaleWatchError,
    models::TransactionSnapshot,
    services::{RefreshHandle, RefreshScheduler},
};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

struct ActiveLoop {
    token: Option<String>,
    handle: RefreshHandle,
}

/// Ties the refresh loop to the selected token.
///
/// At most one loop publishes at a time. Switching tokens cancels the old loop
/// before the new one starts, so a slow cycle for the previous token can never
/// overwrite data for the current one.
pub struct WhaleFeed {
    scheduler: Arc<RefreshScheduler>,
    receiver: watch::Receiver<Arc<TransactionSnapshot>>,
    tokens: Vec<String>,
    active: Mutex<Option<ActiveLoop>>,
}

impl WhaleFeed {
    pub fn new(
        scheduler: Arc<RefreshScheduler>,
        receiver: watch::Receiver<Arc<TransactionSnapshot>>,
        tokens: Vec<String>,
    ) -> Self {
        Self {
            scheduler,
            receiver,
            tokens,
            active: Mutex::new(None),
        }
    }

    pub async fn start(&self, token: Option<String>) -> Result<(), WhaleWatchError> {
        let token = match token {
            Some(symbol) => Some(self.resolve_token(&symbol)?),
            None => None,
        };
        self.restart(token).await;
        Ok(())
    }

    /// Switch the live query to another listed token.
    pub async fn select_token(&self, symbol: &str) -> Result<String, WhaleWatchError> {
        let token = self.resolve_token(symbol)?;
        self.restart(Some(token.clone())).await;
        tracing::info!("Selected token {}", token);
        Ok(token)
    }

    async fn restart(&self, token: Option<String>) {
        let mut active = self.active.lock().await;

        // The new loop is installed before awaiting the old one, so dropping
        // this future mid-switch still leaves a running loop behind.
        if let Some(previous) = active.as_ref() {
            previous.handle.cancel();
        }
        let handle = self.scheduler.start(token.clone());
        let previous = active.replace(ActiveLoop { token, handle });

        if let Some(previous) = previous {
            previous.handle.stop().await;
        }
    }

    fn resolve_token(&self, symbol: &str) -> Result<String, WhaleWatchError> {
        let wanted = symbol.trim().to_uppercase();
        self.tokens
            .iter()
            .find(|t| **t == wanted)
            .cloned()
            .ok_or_else(|| WhaleWatchError::UnknownToken(symbol.to_string()))
    }

    pub fn snapshot(&self) -> Arc<TransactionSnapshot> {
        self.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<TransactionSnapshot>> {
        self.receiver.clone()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub async fn selected_token(&self) -> Option<String> {
        self.active
            .lock()
            .await
            .as_ref()
            .and_then(|active| active.token.clone())
    }

    pub async fn is_running(&self) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .map_or(false, |active| !active.handle.is_finished())
    }

    pub fn source_name(&self) -> &'static str {
        self.scheduler.source_name()
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        self.scheduler.interval()
    }

    pub async fn shutdown(&self) {
        if let Some(active) = self.active.lock().await.take() {
            active.handle.stop().await;
            tracing::info!("Refresh loop shut down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecordOrdering;
    use crate::services::{normalizer::RawTransaction, RefreshSettings, TransactionSource};
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;

    /// Echoes the requested token back as the transfer symbol.
    struct EchoSource;

    #[async_trait]
    impl TransactionSource for EchoSource {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn fetch(&self, token: Option<&str>) -> Result<Vec<RawTransaction>, WhaleWatchError> {
            let symbol = token.unwrap_or("ANY");
            Ok(vec![RawTransaction::Rest(json!({
                "symbol": symbol, "amount": 1, "from": "0xa", "to": "0xb", "hash": "0x1"
            }))])
        }
    }

    fn feed() -> WhaleFeed {
        let (scheduler, rx) = RefreshScheduler::new(
            Arc::new(EchoSource),
            RefreshSettings {
                interval: Duration::from_secs(30),
                ordering: RecordOrdering::Source,
            },
        );
        WhaleFeed::new(scheduler, rx, vec!["ETH".to_string(), "USDT".to_string()])
    }

    #[tokio::test(start_paused = true)]
    async fn switching_token_restarts_loop() {
        let feed = feed();
        let mut rx = feed.subscribe();

        feed.start(None).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(feed.snapshot().transactions[0].symbol, "ANY");

        let selected = feed.select_token("usdt").await.unwrap();
        assert_eq!(selected, "USDT");
        assert_eq!(feed.selected_token().await.as_deref(), Some("USDT"));

        rx.changed().await.unwrap();
        let snapshot = feed.snapshot();
        assert_eq!(snapshot.token.as_deref(), Some("USDT"));
        assert_eq!(snapshot.transactions[0].symbol, "USDT");

        feed.shutdown().await;
        assert!(!feed.is_running().await);
    }

    #[tokio::test]
    async fn unknown_token_is_rejected_and_loop_untouched() {
        let feed = feed();
        feed.start(Some("ETH".to_string())).await.unwrap();

        let result = feed.select_token("DOGE").await;
        assert!(matches!(result, Err(WhaleWatchError::UnknownToken(t)) if t == "DOGE"));
        assert_eq!(feed.selected_token().await.as_deref(), Some("ETH"));

        feed.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_switch_keeps_refreshing() {
        let feed = feed();
        feed.start(Some("ETH".to_string())).await.unwrap();

        // Dropped after its first poll, while the old loop is still being awaited
        let _ = tokio::time::timeout(Duration::ZERO, feed.select_token("USDT")).await;

        assert!(feed.is_running().await);
        assert_eq!(feed.selected_token().await.as_deref(), Some("USDT"));

        let before = feed.snapshot().cycle;
        tokio::time::sleep(Duration::from_secs(300)).await;

        let snapshot = feed.snapshot();
        assert!(snapshot.cycle > before);
        assert_eq!(snapshot.token.as_deref(), Some("USDT"));

        feed.shutdown().await;
    }

    #[tokio::test]
    async fn snapshot_starts_loading() {
        let feed = feed();
        assert!(feed.snapshot().loading);
        assert_eq!(feed.tokens(), &["ETH".to_string(), "USDT".to_string()]);
    }
}
