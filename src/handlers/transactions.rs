use crate::{
    handlers::AppState,
    models::{ApiResponse, TransactionList, TransactionView},
    services::filter_transactions,
};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub q: String,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Json<ApiResponse<TransactionList>> {
    let snapshot = state.feed.snapshot();
    let shown = filter_transactions(&snapshot.transactions, &params.q);

    Json(ApiResponse {
        success: true,
        data: TransactionList {
            query: params.q.clone(),
            token: snapshot.token.clone(),
            loading: snapshot.loading,
            total: snapshot.transactions.len(),
            matched: shown.len(),
            refreshed_at: snapshot.refreshed_at,
            transactions: shown.into_iter().map(TransactionView::from).collect(),
        },
        timestamp: Utc::now(),
        data_source: snapshot.origin,
        request_id: Uuid::new_v4().to_string(),
    })
}
