use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::{ApiError, MAX_PAGE_SIZE};
use crate::fetch::{load_history, HistoryPage, HistoryView};
use crate::models::PlayerId;

#[derive(Debug, Deserialize)]
pub struct SetsParams {
    /// Character short code; defaults to the player's highest rated
    #[serde(rename = "char")]
    pub char_short: Option<String>,
    pub count: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn player_sets(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    params: Result<Query<SetsParams>, QueryRejection>,
) -> Result<Json<HistoryView>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let id: PlayerId = player_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid player id: {}", player_id)))?;

    let count = params.count.unwrap_or(state.default_count);
    if count == 0 || count > MAX_PAGE_SIZE {
        return Err(ApiError::BadRequest(format!(
            "count must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    let page = HistoryPage::new(count, params.offset.unwrap_or(0));
    debug!(player = %id, ?page, "Serving grouped sets");

    let view = load_history(
        state.source.as_ref(),
        id,
        params.char_short.as_deref(),
        page,
    )
    .await?;

    Ok(Json(view))
}
