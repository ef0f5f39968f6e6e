use crate::{
    error::WhaleWatchError,
    handlers::AppState,
    models::{ApiResponse, TokenSelection},
};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

pub async fn list_tokens(State(state): State<AppState>) -> Json<ApiResponse<TokenSelection>> {
    Json(selection_response(&state, state.feed.selected_token().await))
}

pub async fn select_token(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<TokenSelection>>, WhaleWatchError> {
    let selected = state.feed.select_token(&symbol).await?;
    Ok(Json(selection_response(&state, Some(selected))))
}

fn selection_response(state: &AppState, selected: Option<String>) -> ApiResponse<TokenSelection> {
    ApiResponse {
        success: true,
        data: TokenSelection {
            tokens: state.feed.tokens().to_vec(),
            selected,
        },
        timestamp: Utc::now(),
        data_source: state.feed.snapshot().origin,
        request_id: Uuid::new_v4().to_string(),
    }
}
