use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::validation::{submission_from_json, RawSubmission};

/// Submitted fields from either a urlencoded form or a JSON object body.
///
/// Handlers take `Result<Submission, ApiError>` so that a bad body is only
/// reported after the identity and ownership checks have passed, and in the
/// caller's response format.
#[derive(Debug, Clone, Default)]
pub struct Submission(pub RawSubmission);

#[async_trait]
impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| ApiError::invalid_json(e.body_text()))?;
            let fields = submission_from_json(value)
                .ok_or_else(|| ApiError::invalid_json("Expected a JSON object"))?;
            Ok(Submission(fields))
        } else {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(Submission(fields))
        }
    }
}
