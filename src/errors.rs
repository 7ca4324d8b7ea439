use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum BridgeError {
    #[error("Serialization error: {0}")]
    #[diagnostic(code(prospector_bridge::serde))]
    Serde(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    #[diagnostic(code(prospector_bridge::db))]
    Db(#[from] sea_orm::DbErr),

    #[error("Prospector request failed: {0}")]
    #[diagnostic(code(prospector_bridge::http))]
    Http(#[from] reqwest::Error),

    #[error("Not signed in to Prospector")]
    #[diagnostic(
        code(prospector_bridge::not_signed_in),
        help("Sign in through /prospector_login to store a client id and secret")
    )]
    NotSignedIn,

    #[error("Bad request: {0}")]
    #[diagnostic(code(prospector_bridge::bad_request))]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    #[diagnostic(code(prospector_bridge::unavailable))]
    Unavailable(String),

    #[error("{0}")]
    #[diagnostic(code(prospector_bridge::other))]
    Other(String),
}

impl BridgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::BadRequest(_) => StatusCode::BAD_REQUEST,
            BridgeError::NotSignedIn => StatusCode::UNAUTHORIZED,
            BridgeError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            BridgeError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = json!({
            "jsonrpc": "2.0",
            "id": 0,
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}
