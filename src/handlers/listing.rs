use crate::{handlers::AppState, models::DomainListing};
use axum::{extract::State, Json};

pub async fn get_listing(State(state): State<AppState>) -> Json<DomainListing> {
    Json(state.listing.as_ref().clone())
}
