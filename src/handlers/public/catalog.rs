// handlers/public/catalog.rs - GET /api/items/ summary feed
//
// Open to anonymous callers. Only the summary shape is served here; the full
// shape with owner details stays behind a session.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;

use crate::api::format::summaries;
use crate::database::models::ItemFilter;
use crate::error::ApiResult;
use crate::middleware::Identity;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub filter: Option<String>,
}

/// `?filter=mine` needs a session; anything else lists every item.
pub async fn items_feed(
    State(state): State<AppState>,
    identity: Identity,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    let filter = match query.filter.as_deref() {
        Some("mine") => ItemFilter::Owner(identity.require()?.id),
        _ => ItemFilter::All,
    };

    let items = state.items.list(filter).await?;
    tracing::debug!("Serving {} items in the public feed", items.len());
    Ok(Json(summaries(&items)).into_response())
}
