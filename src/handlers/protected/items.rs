// handlers/protected/items.rs - catalog pages (list, create, detail, edit, delete)
//
// Browser routes. Each handler also answers script clients with JSON when the
// request asks for it (see `ResponseMode`).

use std::collections::HashMap;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tera::Context;
use tracing::info;

use crate::database::models::{Item, ItemFilter};
use crate::error::ApiError;
use crate::handlers::utils::{ensure_owner, form_values, item_not_found, login_required, respond, LIST_URL};
use crate::middleware::{ApiResponse, AuthUser, Identity, ResponseMode, Submission, LAST_LOGIN_COOKIE};
use crate::state::AppState;
use crate::validation::{parse_checkbox, validate_item, FieldErrors};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `all` (default) or `mine`
    pub filter: Option<String>,
}

/// GET / - catalog page, or the full-shape JSON array
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    mode: ResponseMode,
    jar: CookieJar,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let Some(user) = identity.user() else {
        return login_required(mode, &uri.to_string());
    };
    let last_login = jar.get(LAST_LOGIN_COOKIE).map(|c| c.value().to_string());
    respond(mode, list_items(&state, user, mode, query, last_login).await)
}

async fn list_items(
    state: &AppState,
    user: &AuthUser,
    mode: ResponseMode,
    query: Result<Query<ListQuery>, QueryRejection>,
    last_login: Option<String>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let mine = query.filter.as_deref() == Some("mine");
    let filter = if mine { ItemFilter::Owner(user.id) } else { ItemFilter::All };

    let items = state.items.list(filter).await?;
    info!("Listing {} items for {} ({:?})", items.len(), user.username, filter);

    if mode.is_json() {
        return Ok(Json(items).into_response());
    }

    let mut ctx = Context::new();
    ctx.insert("username", &user.username);
    ctx.insert("user_id", &user.id);
    ctx.insert("filter", if mine { "mine" } else { "all" });
    ctx.insert("last_login", &last_login);
    ctx.insert("items", &items);
    Ok(state.renderer.render("main.html", &ctx)?.into_response())
}

/// GET /create_football_item/ - empty item form
pub async fn create_form(
    State(state): State<AppState>,
    identity: Identity,
    mode: ResponseMode,
    OriginalUri(uri): OriginalUri,
) -> Response {
    if identity.user().is_none() {
        return login_required(mode, &uri.to_string());
    }
    respond(
        mode,
        render_item_form(&state, "Add Football Item", "/create_football_item/", &HashMap::new(), &FieldErrors::new()),
    )
}

/// POST /create_football_item/ - validate and store a new item owned by the requester
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    mode: ResponseMode,
    OriginalUri(uri): OriginalUri,
    body: Result<Submission, ApiError>,
) -> Response {
    let Some(user) = identity.user() else {
        return login_required(mode, &uri.to_string());
    };
    respond(mode, create_item(&state, user, mode, body).await)
}

async fn create_item(
    state: &AppState,
    user: &AuthUser,
    mode: ResponseMode,
    body: Result<Submission, ApiError>,
) -> Result<Response, ApiError> {
    let Submission(raw) = body?;
    let draft = match validate_item(&raw) {
        Ok(draft) => draft,
        Err(errors) if mode.is_json() => return Err(ApiError::validation_error("Invalid item data", errors)),
        Err(errors) => {
            return render_item_form(state, "Add Football Item", "/create_football_item/", &raw, &errors);
        }
    };

    let item = state.items.create(Some(user.id), draft).await?;
    info!("User {} created item {}", user.username, item.id);

    Ok(match mode {
        ResponseMode::Json => ApiResponse::created("Item created successfully")
            .with("item", &item)
            .into_response(),
        ResponseMode::Page => Redirect::to(LIST_URL).into_response(),
    })
}

/// GET /football_item/:id/ - detail page
pub async fn detail(
    State(state): State<AppState>,
    identity: Identity,
    mode: ResponseMode,
    OriginalUri(uri): OriginalUri,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let Some(user) = identity.user() else {
        return login_required(mode, &uri.to_string());
    };
    respond(mode, show_item(&state, user, mode, path).await)
}

async fn show_item(
    state: &AppState,
    user: &AuthUser,
    mode: ResponseMode,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = path?;
    let item = state.items.get(id).await?.ok_or_else(|| item_not_found(id))?;

    if mode.is_json() {
        return Ok(Json(item).into_response());
    }

    let mut ctx = Context::new();
    ctx.insert("username", &user.username);
    ctx.insert("is_owner", &item.is_owned_by(user.id));
    ctx.insert("item", &item);
    Ok(state.renderer.render("item_detail.html", &ctx)?.into_response())
}

/// GET /edit_football_item/:id/edit - item form pre-filled with the current values
pub async fn edit_form(
    State(state): State<AppState>,
    identity: Identity,
    mode: ResponseMode,
    OriginalUri(uri): OriginalUri,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let Some(user) = identity.user() else {
        return login_required(mode, &uri.to_string());
    };
    respond(mode, show_edit_form(&state, user, path).await)
}

async fn show_edit_form(
    state: &AppState,
    user: &AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = path?;
    let item = load_for_change(state, user, id).await?;
    render_item_form(
        state,
        &format!("Edit {}", item.name),
        &edit_action(id),
        &form_values(&item),
        &FieldErrors::new(),
    )
}

/// POST /edit_football_item/:id/edit - validate and replace the item's fields
pub async fn edit(
    State(state): State<AppState>,
    identity: Identity,
    mode: ResponseMode,
    OriginalUri(uri): OriginalUri,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Submission, ApiError>,
) -> Response {
    let Some(user) = identity.user() else {
        return login_required(mode, &uri.to_string());
    };
    respond(mode, edit_item(&state, user, mode, path, body).await)
}

async fn edit_item(
    state: &AppState,
    user: &AuthUser,
    mode: ResponseMode,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Submission, ApiError>,
) -> Result<Response, ApiError> {
    let Path(id) = path?;
    let item = load_for_change(state, user, id).await?;
    let Submission(raw) = body?;

    let draft = match validate_item(&raw) {
        Ok(draft) => draft,
        Err(errors) if mode.is_json() => return Err(ApiError::validation_error("Invalid item data", errors)),
        Err(errors) => {
            return render_item_form(state, &format!("Edit {}", item.name), &edit_action(id), &raw, &errors);
        }
    };

    let updated = state.items.update(id, draft).await?.ok_or_else(|| item_not_found(id))?;
    info!("User {} edited item {}", user.username, id);

    Ok(match mode {
        ResponseMode::Json => ApiResponse::success("Item updated successfully")
            .with("item", &updated)
            .into_response(),
        ResponseMode::Page => Redirect::to(LIST_URL).into_response(),
    })
}

/// POST /delete_football_item/:id/delete
pub async fn delete(
    State(state): State<AppState>,
    identity: Identity,
    mode: ResponseMode,
    OriginalUri(uri): OriginalUri,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let Some(user) = identity.user() else {
        return login_required(mode, &uri.to_string());
    };
    respond(mode, delete_item(&state, user, mode, path).await)
}

async fn delete_item(
    state: &AppState,
    user: &AuthUser,
    mode: ResponseMode,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = path?;
    load_for_change(state, user, id).await?;

    if !state.items.delete(id).await? {
        return Err(item_not_found(id));
    }
    info!("User {} deleted item {}", user.username, id);

    Ok(match mode {
        ResponseMode::Json => ApiResponse::success("Item deleted successfully").into_response(),
        ResponseMode::Page => Redirect::to(LIST_URL).into_response(),
    })
}

/// Fetches an item for edit/delete. Ownership is enforced unless
/// `security.page_ownership_checks` is turned off.
async fn load_for_change(state: &AppState, user: &AuthUser, id: i64) -> Result<Item, ApiError> {
    let item = state.items.get(id).await?.ok_or_else(|| item_not_found(id))?;
    if state.config.security.page_ownership_checks {
        ensure_owner(&item, user)?;
    }
    Ok(item)
}

fn edit_action(id: i64) -> String {
    format!("/edit_football_item/{}/edit", id)
}

/// One input on the item form, with its current value and any errors.
#[derive(Debug, Serialize)]
struct FormField {
    name: &'static str,
    label: &'static str,
    value: String,
    multiline: bool,
    errors: Vec<String>,
}

const FORM_FIELDS: &[(&str, &str)] = &[
    ("name", "Name"),
    ("price", "Price"),
    ("description", "Description"),
    ("thumbnail", "Thumbnail URL"),
    ("category", "Category"),
    ("brand", "Brand"),
    ("stock", "Stock"),
    ("size", "Size"),
];

fn render_item_form(
    state: &AppState,
    title: &str,
    action: &str,
    values: &HashMap<String, String>,
    errors: &FieldErrors,
) -> Result<Response, ApiError> {
    let fields: Vec<FormField> = FORM_FIELDS
        .iter()
        .map(|&(name, label)| FormField {
            name,
            label,
            value: values.get(name).cloned().unwrap_or_default(),
            multiline: name == "description",
            errors: errors.get(name).map(<[String]>::to_vec).unwrap_or_default(),
        })
        .collect();
    let featured = parse_checkbox(values.get("is_featured").map(String::as_str));

    let mut ctx = Context::new();
    ctx.insert("title", title);
    ctx.insert("action", action);
    ctx.insert("fields", &fields);
    ctx.insert("featured", &featured);

    let page = state.renderer.render("item_form.html", &ctx)?;
    let status = if errors.is_empty() { StatusCode::OK } else { StatusCode::BAD_REQUEST };
    Ok((status, page).into_response())
}
