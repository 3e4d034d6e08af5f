// handlers/protected/api.rs - JSON item API used by the programmatic client
//
// Always JSON. Edit and delete enforce ownership; wrong verbs get a JSON 405.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::handlers::utils::{ensure_owner, item_not_found};
use crate::middleware::{ApiResponse, Identity, Submission};
use crate::state::AppState;
use crate::validation::validate_item;

/// POST /api/create/
///
/// Without a session the body may name its owner in `user_id`; the id must
/// belong to an existing user, otherwise the request is unauthorized.
pub async fn create_item(
    State(state): State<AppState>,
    identity: Identity,
    body: Result<Submission, ApiError>,
) -> ApiResult<Response> {
    let owner = match identity.user() {
        Some(user) => user.id,
        None => {
            let claimed = body
                .as_ref()
                .ok()
                .and_then(|Submission(raw)| raw.get("user_id"))
                .and_then(|v| v.trim().parse::<i64>().ok())
                .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
            match state.users.get_user(claimed).await? {
                Some(user) => {
                    warn!("Creating item for user {} from an unauthenticated request", user.id);
                    user.id
                }
                None => return Err(ApiError::unauthorized("Authentication required")),
            }
        }
    };

    let Submission(raw) = body?;
    let draft = validate_item(&raw).map_err(|errors| ApiError::validation_error("Invalid item data", errors))?;
    let item = state.items.create(Some(owner), draft).await?;
    info!("Created item {} for user {}", item.id, owner);

    Ok(ApiResponse::created("Item created successfully")
        .with("item", &item)
        .into_response())
}

/// POST /api/edit/:id/
pub async fn edit_item(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Submission, ApiError>,
) -> ApiResult<Response> {
    let user = identity.require()?;
    let Path(id) = path?;
    let item = state.items.get(id).await?.ok_or_else(|| item_not_found(id))?;
    ensure_owner(&item, user)?;
    let Submission(raw) = body?;

    let draft = validate_item(&raw).map_err(|errors| ApiError::validation_error("Invalid item data", errors))?;
    let updated = state.items.update(id, draft).await?.ok_or_else(|| item_not_found(id))?;
    info!("User {} updated item {}", user.username, id);

    Ok(ApiResponse::success("Item updated successfully")
        .with("item", &updated)
        .into_response())
}

/// POST|DELETE /api/delete/:id/
pub async fn delete_item(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Response> {
    let user = identity.require()?;
    let Path(id) = path?;
    let item = state.items.get(id).await?.ok_or_else(|| item_not_found(id))?;
    ensure_owner(&item, user)?;

    if !state.items.delete(id).await? {
        return Err(item_not_found(id));
    }
    info!("User {} deleted item {}", user.username, id);

    Ok(ApiResponse::success("Item deleted successfully").into_response())
}

/// Fallback for verbs an API route does not accept
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Method not allowed")
}
