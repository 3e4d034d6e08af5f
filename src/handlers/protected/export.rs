// handlers/protected/export.rs - /xml/ and /json/ catalog exports
//
// Both encodings carry every field including the owner id. A missing id is a
// 404 rather than an empty document.

use axum::{
    extract::{rejection::PathRejection, OriginalUri, Path, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Json, Response},
};

use crate::api::{format::envelopes, xml};
use crate::database::models::{Item, ItemFilter};
use crate::error::ApiError;
use crate::handlers::utils::{item_not_found, login_required, respond};
use crate::middleware::{Identity, ResponseMode};
use crate::state::AppState;

const XML_CONTENT_TYPE: &str = "application/xml";

/// GET /xml/
pub async fn xml_all(
    State(state): State<AppState>,
    identity: Identity,
    mode: ResponseMode,
    OriginalUri(uri): OriginalUri,
) -> Response {
    if identity.user().is_none() {
        return login_required(mode, &uri.to_string());
    }
    respond(mode, load(&state, None).await.map(xml_response))
}

/// GET /xml/:id/
pub async fn xml_by_id(
    State(state): State<AppState>,
    identity: Identity,
    mode: ResponseMode,
    OriginalUri(uri): OriginalUri,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    if identity.user().is_none() {
        return login_required(mode, &uri.to_string());
    }
    respond(mode, load_one(&state, path).await.map(xml_response))
}

/// GET /json/
pub async fn json_all(
    State(state): State<AppState>,
    identity: Identity,
    mode: ResponseMode,
    OriginalUri(uri): OriginalUri,
) -> Response {
    if identity.user().is_none() {
        return login_required(mode, &uri.to_string());
    }
    respond(mode, load(&state, None).await.map(json_response))
}

/// GET /json/:id/
pub async fn json_by_id(
    State(state): State<AppState>,
    identity: Identity,
    mode: ResponseMode,
    OriginalUri(uri): OriginalUri,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    if identity.user().is_none() {
        return login_required(mode, &uri.to_string());
    }
    respond(mode, load_one(&state, path).await.map(json_response))
}

/// Every item, or the single item `id` (404 when absent)
async fn load(state: &AppState, id: Option<i64>) -> Result<Vec<Item>, ApiError> {
    match id {
        None => Ok(state.items.list(ItemFilter::All).await?),
        Some(id) => {
            let item = state.items.get(id).await?.ok_or_else(|| item_not_found(id))?;
            Ok(vec![item])
        }
    }
}

async fn load_one(state: &AppState, path: Result<Path<i64>, PathRejection>) -> Result<Vec<Item>, ApiError> {
    let Path(id) = path?;
    load(state, Some(id)).await
}

fn xml_response(items: Vec<Item>) -> Response {
    ([(CONTENT_TYPE, XML_CONTENT_TYPE)], xml::serialize(&items)).into_response()
}

fn json_response(items: Vec<Item>) -> Response {
    Json(envelopes(&items)).into_response()
}
