use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

/// JSON body of the item API routes: `{"status": "success", "message": ..., ...}`
#[derive(Debug)]
pub struct ApiResponse {
    body: Map<String, Value>,
    status_code: StatusCode,
}

impl ApiResponse {
    /// Create a successful API response with default 200 status
    pub fn success(message: impl Into<String>) -> Self {
        let mut body = Map::new();
        body.insert("status".into(), Value::String("success".into()));
        body.insert("message".into(), Value::String(message.into()));
        Self {
            body,
            status_code: StatusCode::OK,
        }
    }

    /// Create a 201 Created response
    pub fn created(message: impl Into<String>) -> Self {
        Self::success(message).with_status(StatusCode::CREATED)
    }

    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    /// Attach an extra top-level field
    pub fn with(mut self, key: &str, value: &impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize response field '{}': {}", key, e);
            Value::Null
        });
        self.body.insert(key.to_string(), value);
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status_code, Json(Value::Object(self.body))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_has_status_and_message() {
        let response = ApiResponse::created("Item created successfully").with("item", &serde_json::json!({"id": 1}));
        assert_eq!(response.status_code, StatusCode::CREATED);
        assert_eq!(response.body["status"], "success");
        assert_eq!(response.body["message"], "Item created successfully");
        assert_eq!(response.body["item"]["id"], 1);
    }
}
