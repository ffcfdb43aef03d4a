pub mod compose;
pub mod graph;

pub use graph::GraphMailer;

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::error::Result;

/// File attached to every invitation, already base64 encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub content_base64: String,
}

/// One rendered invitation addressed to a single recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub subject: String,
    pub html_body: String,
    pub to: String,
    pub attachment: Attachment,
}

/// Mail-sending API, called with the signed-in user's bearer token.
#[async_trait]
pub trait MailClient: Send + Sync {
    /// Submit `mail` and return the provider's status code.
    /// Only transport failures are errors; the caller decides what a status means.
    async fn send_mail(&self, access_token: &str, mail: &OutgoingMail) -> Result<StatusCode>;
}
