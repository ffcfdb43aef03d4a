//! Rendering of the invitation body.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::Attachment;
use crate::assignments::Recipient;
use crate::error::{AppError, Result};

pub const RECIPIENT_FNAME_PLACEHOLDER: &str = "{recipient_fname}";
pub const RECIPIENT_LNAME_PLACEHOLDER: &str = "{recipient_lname}";
pub const SENDER_NAME_PLACEHOLDER: &str = "{sender_name}";

/// Fill the three placeholders for `recipient`. Everything else is left as is.
pub fn personalise(template: &str, recipient: &Recipient) -> String {
    let sender = if recipient.sender_name.is_empty() {
        "Sender"
    } else {
        recipient.sender_name.as_str()
    };

    template
        .replace(RECIPIENT_FNAME_PLACEHOLDER, &recipient.recipient_fname)
        .replace(RECIPIENT_LNAME_PLACEHOLDER, &recipient.recipient_lname)
        .replace(SENDER_NAME_PLACEHOLDER, sender)
}

/// Blank lines separate paragraphs; single newlines become `<br>`.
pub fn paragraphs_to_html(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    text.split("\n\n")
        .map(|p| format!("<p>{}</p>", p.trim().replace('\n', "<br>")))
        .collect()
}

/// Read and encode the attachment. Called once per message.
pub async fn read_attachment(path: &Path, display_name: &str) -> Result<Attachment> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Attachment(format!("{}: {}", path.display(), e)))?;

    Ok(Attachment {
        name: display_name.to_string(),
        content_base64: STANDARD.encode(bytes),
    })
}
