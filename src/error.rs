// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// Terminal request failure, rendered as `{"error": <message>}` with the
/// matching status code. Gateway failures carry the gateway's raw error
/// object and are passed through verbatim.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request: validation failures, malformed input, store errors
    BadRequest(String),

    // 401 Unauthorized: missing or invalid session token
    Unauthorized(String),

    // 403 Forbidden: authenticated but not allowed
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 500 with the external gateway's error object, unmodified
    Gateway(Value),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg) => msg,
            ApiError::Gateway(_) => "payment gateway error",
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Gateway(raw) => raw.clone(),
            _ => json!({ "error": self.message() }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn gateway(raw: Value) -> Self {
        ApiError::Gateway(raw)
    }
}

impl From<crate::database::pool::DatabaseError> for ApiError {
    fn from(err: crate::database::pool::DatabaseError) -> Self {
        use crate::database::pool::DatabaseError;
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Sqlx(sqlx_err) => {
                // Constraint violations become client-facing messages;
                // anything else is reported generically
                ApiError::bad_request(crate::database::pool::format_store_error(&sqlx_err))
            }
            DatabaseError::QueryError(msg) => {
                tracing::error!("database query error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_is_single_message() {
        let err = ApiError::bad_request("Name is required");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_json(), json!({ "error": "Name is required" }));
    }

    #[test]
    fn gateway_error_passes_raw_body_through() {
        let raw = json!({ "success": false, "message": "Gateway Rejected: fraud" });
        let err = ApiError::gateway(raw.clone());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_json(), raw);
    }
}
