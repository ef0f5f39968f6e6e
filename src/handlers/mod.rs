pub mod health;
pub mod listing;
pub mod page;
pub mod tokens;
pub mod transactions;

pub use health::*;
pub use listing::*;
pub use page::*;
pub use tokens::*;
pub use transactions::*;

use crate::{models::DomainListing, services::WhaleFeed};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<WhaleFeed>,
    pub listing: Arc<DomainListing>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(feed: Arc<WhaleFeed>, listing: DomainListing) -> Self {
        Self {
            feed,
            listing: Arc::new(listing),
            started_at: Instant::now(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/transactions", get(list_transactions))
        .route("/api/tokens", get(list_tokens))
        .route("/api/tokens/:symbol", post(select_token))
        .route("/api/listing", get(get_listing))
        .with_state(state)
}
