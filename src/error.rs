use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// Request-level failures.
///
/// Most of these are reported to the browser with a 200 status and an
/// `error` field; the frontend inspects the body rather than the status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing or expired token.")]
    MissingSession,

    #[error("User not logged in or token expired.")]
    NotLoggedIn,

    #[error("No recipients found for this email.")]
    NoRecipients,

    #[error("No selected recipients found.")]
    NoSelectedRecipients,

    #[error("Failed to get access token")]
    TokenExchange { details: Value },

    #[error("Unable to retrieve your email from Microsoft. Please check your Microsoft account.")]
    ProfileEmailMissing,

    #[error("{0}")]
    Template(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Attachment error: {0}")]
    Attachment(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingSession => StatusCode::FORBIDDEN,
            AppError::NotLoggedIn
            | AppError::NoRecipients
            | AppError::NoSelectedRecipients
            | AppError::TokenExchange { .. }
            | AppError::ProfileEmailMissing => StatusCode::OK,
            AppError::Template(_)
            | AppError::Spreadsheet(_)
            | AppError::Attachment(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::TokenExchange { details } => json!({
                "error": self.to_string(),
                "details": details,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<calamine::Error> for AppError {
    fn from(err: calamine::Error) -> Self {
        AppError::Spreadsheet(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Spreadsheet(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
