use crate::{handlers::AppState, models::HealthStatus};
use axum::{extract::State, Json};
use chrono::Utc;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let snapshot = state.feed.snapshot();

    let status = if snapshot.loading {
        "starting"
    } else if snapshot.is_live() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data_source: snapshot.origin,
        source_name: state.feed.source_name().to_string(),
        cycle: snapshot.cycle,
        last_refresh: snapshot.refreshed_at,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
