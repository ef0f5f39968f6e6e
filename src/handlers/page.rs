use crate::{
    handlers::{AppState, FilterParams},
    services::filter_transactions,
    templates::{render_page, PageView},
};
use axum::{
    extract::{Query, State},
    response::Html,
};

pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Html<String> {
    let snapshot = state.feed.snapshot();
    let selected = state.feed.selected_token().await;
    let shown = filter_transactions(&snapshot.transactions, &params.q);

    Html(render_page(&PageView {
        query: &params.q,
        loading: snapshot.loading,
        transactions: &shown,
        tokens: state.feed.tokens(),
        selected_token: selected.as_deref(),
        refresh_secs: state.feed.refresh_interval().as_secs(),
        listing: &state.listing,
    }))
}
