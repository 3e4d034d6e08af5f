use std::collections::HashMap;

use axum::response::{IntoResponse, Redirect, Response};

use crate::database::models::Item;
use crate::error::{ApiError, PageError};
use crate::middleware::{AuthUser, ResponseMode};

pub const LIST_URL: &str = "/";
pub const LOGIN_URL: &str = "/login/";

/// Turns a handler outcome into a response shaped for the caller: JSON errors for
/// script clients, HTML error pages for browsers.
pub fn respond(mode: ResponseMode, result: Result<Response, ApiError>) -> Response {
    match result {
        Ok(response) => response,
        Err(err) => match mode {
            ResponseMode::Json => err.into_response(),
            ResponseMode::Page => PageError(err).into_response(),
        },
    }
}

/// Browsers are sent to the login page; script clients get a 401.
pub fn login_required(mode: ResponseMode, next: &str) -> Response {
    match mode {
        ResponseMode::Json => ApiError::unauthorized("Authentication required").into_response(),
        ResponseMode::Page => {
            let next: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
            Redirect::to(&format!("{}?next={}", LOGIN_URL, next)).into_response()
        }
    }
}

/// Only local paths are accepted as post-login targets. A `//` or `/\` prefix
/// or a control character falls back to the catalog, and the resolved URL must
/// keep the local host.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) => path,
        _ => LIST_URL,
    }
}

fn is_local_path(path: &str) -> bool {
    let mut chars = path.chars();
    if chars.next() != Some('/') || matches!(chars.next(), Some('/') | Some('\\')) {
        return false;
    }
    if path.chars().any(char::is_control) {
        return false;
    }
    let Ok(base) = url::Url::parse("http://localhost") else {
        return false;
    };
    match base.join(path) {
        Ok(joined) => joined.host_str() == base.host_str() && joined.port() == base.port(),
        Err(_) => false,
    }
}

pub fn ensure_owner(item: &Item, user: &AuthUser) -> Result<(), ApiError> {
    if item.is_owned_by(user.id) {
        Ok(())
    } else {
        tracing::warn!("User {} attempted to modify item {} they do not own", user.id, item.id);
        Err(ApiError::forbidden("You do not have permission to modify this item"))
    }
}

pub fn item_not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("Football item {} not found", id))
}

/// Current item values as form fields, for pre-filling the edit form.
pub fn form_values(item: &Item) -> HashMap<String, String> {
    [
        ("name", item.name.clone()),
        ("price", item.price.to_string()),
        ("description", item.description.clone()),
        ("thumbnail", item.thumbnail.clone()),
        ("category", item.category.clone()),
        ("is_featured", if item.is_featured { "on".to_string() } else { String::new() }),
        ("brand", item.brand.clone().unwrap_or_default()),
        ("stock", item.stock.to_string()),
        ("size", item.size.clone().unwrap_or_default()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::LOCATION, StatusCode};

    #[test]
    fn next_must_be_local() {
        assert_eq!(safe_next(Some("/football_item/3/")), "/football_item/3/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(Some("/\tevil.example")), "/");
        assert_eq!(safe_next(Some("/?filter=mine")), "/?filter=mine");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn login_redirect_keeps_target() {
        let response = login_required(ResponseMode::Page, "/?filter=mine");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/login/?next=%2F%3Ffilter%3Dmine");

        let response = login_required(ResponseMode::Json, "/");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
