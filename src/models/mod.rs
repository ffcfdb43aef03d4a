use serde::{Deserialize, Serialize};

use crate::assignments::Recipient;

/// `?user_email=` on authenticated routes.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_email: String,
}

/// Redirect parameters from the identity provider.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipientsResponse {
    pub sender_name: Option<String>,
    pub recipients: Vec<Recipient>,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub template: String,
}

#[derive(Debug, Deserialize)]
pub struct SendEmailsRequest {
    #[serde(default)]
    pub email_body: String,
    #[serde(default)]
    pub selected_emails: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
