use crate::{
    config::RecordOrdering,
    error::WhaleWatchError,
    models::{TransactionRecord, TransactionSnapshot},
    services::{fallback::fallback_transactions, normalizer::normalize_batch, TransactionSource},
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Debug, Clone, Copy)]
pub struct RefreshSettings {
    pub interval: Duration,
    pub ordering: RecordOrdering,
}

/// Fetches, normalizes and publishes transaction snapshots on a fixed period.
///
/// The scheduler is the only writer of the published snapshot. Readers hold a
/// `watch::Receiver` and always see the latest complete cycle.
pub struct RefreshScheduler {
    source: Arc<dyn TransactionSource>,
    settings: RefreshSettings,
    publisher: watch::Sender<Arc<TransactionSnapshot>>,
    cycles: AtomicU64,
}

impl RefreshScheduler {
    pub fn new(
        source: Arc<dyn TransactionSource>,
        settings: RefreshSettings,
    ) -> (Arc<Self>, watch::Receiver<Arc<TransactionSnapshot>>) {
        let (publisher, receiver) = watch::channel(Arc::new(TransactionSnapshot::loading()));

        let scheduler = Arc::new(Self {
            source,
            settings,
            publisher,
            cycles: AtomicU64::new(0),
        });

        (scheduler, receiver)
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn interval(&self) -> Duration {
        self.settings.interval
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<TransactionSnapshot>> {
        self.publisher.subscribe()
    }

    /// Spawn the refresh loop. The first cycle runs immediately.
    pub fn start(self: &Arc<Self>, token: Option<String>) -> RefreshHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let scheduler = Arc::clone(self);

        tracing::info!(
            token = token.as_deref().unwrap_or("all"),
            "Starting refresh loop every {}s",
            self.settings.interval.as_secs_f64()
        );

        let task = tokio::spawn(async move { scheduler.run(token, shutdown_rx).await });

        RefreshHandle {
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }

    async fn run(&self, token: Option<String>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut shutdown) => break,
                _ = ticker.tick() => {}
            }

            // An in-flight fetch is abandoned on cancellation and never published
            let snapshot = tokio::select! {
                biased;
                _ = cancelled(&mut shutdown) => break,
                snapshot = self.run_cycle(token.as_deref()) => snapshot,
            };

            if *shutdown.borrow() {
                break;
            }
            self.publish(snapshot);
        }

        tracing::debug!(
            token = token.as_deref().unwrap_or("all"),
            "Refresh loop stopped"
        );
    }

    /// One fetch-normalize cycle. Falls back instead of failing.
    pub async fn run_cycle(&self, token: Option<&str>) -> TransactionSnapshot {
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        let token_owned = token.map(str::to_string);

        match self.fetch_live(token).await {
            Ok(records) => {
                tracing::info!(
                    cycle,
                    source = self.source.name(),
                    "Published {} live transactions",
                    records.len()
                );
                TransactionSnapshot::live(records, token_owned, cycle)
            }
            Err(e) => {
                tracing::warn!(
                    cycle,
                    source = self.source.name(),
                    error = %e,
                    "Live fetch failed, publishing fallback data"
                );
                TransactionSnapshot::fallback(fallback_transactions(), e.to_string(), token_owned, cycle)
            }
        }
    }

    async fn fetch_live(&self, token: Option<&str>) -> Result<Vec<TransactionRecord>, WhaleWatchError> {
        let batch = self.source.fetch(token).await?;
        let mut records = normalize_batch(&batch);

        if records.is_empty() {
            return Err(WhaleWatchError::EmptyBatch);
        }

        if self.settings.ordering == RecordOrdering::AmountDesc {
            records.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        }

        Ok(records)
    }

    fn publish(&self, snapshot: TransactionSnapshot) {
        // send_replace keeps the value even when no receiver is alive
        self.publisher.send_replace(Arc::new(snapshot));
    }
}

/// Resolves once cancellation is requested or the handle is gone.
async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Owner of a running refresh loop. Dropping it cancels the loop.
pub struct RefreshHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    pub fn cancel(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancel and wait for the loop to exit. Nothing is published afterwards.
    pub async fn stop(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Refresh loop panicked: {}", e);
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
