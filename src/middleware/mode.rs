use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::ACCEPT, request::Parts, HeaderMap},
};

/// How the caller expects the answer: a rendered page / redirect for browsers,
/// or JSON for script-driven requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Page,
    Json,
}

impl ResponseMode {
    /// `Json` when the request carries `X-Requested-With: XMLHttpRequest` or
    /// accepts JSON but not HTML.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ajax = headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
            .unwrap_or(false);
        if ajax {
            return ResponseMode::Json;
        }

        let accept = headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if accept.contains("application/json") && !accept.contains("text/html") {
            ResponseMode::Json
        } else {
            ResponseMode::Page
        }
    }

    pub fn is_json(self) -> bool {
        self == ResponseMode::Json
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ResponseMode
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ResponseMode::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, value.parse().unwrap());
        }
        map
    }

    #[test]
    fn browsers_get_pages() {
        assert_eq!(ResponseMode::from_headers(&HeaderMap::new()), ResponseMode::Page);
        assert_eq!(
            ResponseMode::from_headers(&headers(&[("accept", "text/html,application/xhtml+xml,application/json;q=0.9")])),
            ResponseMode::Page
        );
    }

    #[test]
    fn scripts_get_json() {
        assert_eq!(
            ResponseMode::from_headers(&headers(&[("x-requested-with", "XMLHttpRequest")])),
            ResponseMode::Json
        );
        assert_eq!(
            ResponseMode::from_headers(&headers(&[("accept", "application/json")])),
            ResponseMode::Json
        );
    }
}
