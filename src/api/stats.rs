//! Statistics endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, models::book::BookStats};

/// Get catalog statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Availability counts and publication year range", body = BookStats)
    )
)]
pub async fn get_stats(State(state): State<crate::AppState>) -> AppResult<Json<BookStats>> {
    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
