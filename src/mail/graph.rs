use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::Client;
use serde::Serialize;

use super::{MailClient, OutgoingMail};
use crate::config::Config;
use crate::error::Result;

/// Microsoft Graph `sendMail` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMailRequest<'a> {
    message: GraphMessage<'a>,
    save_to_sent_items: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphMessage<'a> {
    subject: &'a str,
    body: ItemBody<'a>,
    to_recipients: Vec<GraphRecipient<'a>>,
    attachments: Vec<FileAttachment<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemBody<'a> {
    content_type: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphRecipient<'a> {
    email_address: EmailAddress<'a>,
}

#[derive(Debug, Serialize)]
struct EmailAddress<'a> {
    address: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileAttachment<'a> {
    #[serde(rename = "@odata.type")]
    odata_type: &'static str,
    name: &'a str,
    content_bytes: &'a str,
}

impl<'a> From<&'a OutgoingMail> for SendMailRequest<'a> {
    fn from(mail: &'a OutgoingMail) -> Self {
        Self {
            message: GraphMessage {
                subject: &mail.subject,
                body: ItemBody {
                    content_type: "HTML",
                    content: &mail.html_body,
                },
                to_recipients: vec![GraphRecipient {
                    email_address: EmailAddress { address: &mail.to },
                }],
                attachments: vec![FileAttachment {
                    odata_type: "#microsoft.graph.fileAttachment",
                    name: &mail.attachment.name,
                    content_bytes: &mail.attachment.content_base64,
                }],
            },
            save_to_sent_items: "true",
        }
    }
}

/// Sends mail as the signed-in user through Microsoft Graph.
#[derive(Clone)]
pub struct GraphMailer {
    client: Client,
    base_url: String,
}

impl GraphMailer {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.graph_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MailClient for GraphMailer {
    async fn send_mail(&self, access_token: &str, mail: &OutgoingMail) -> Result<StatusCode> {
        let res = self
            .client
            .post(format!("{}/me/sendMail", self.base_url))
            .bearer_auth(access_token)
            .json(&SendMailRequest::from(mail))
            .send()
            .await?;

        let status = res.status();
        if status != StatusCode::ACCEPTED {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(to = %mail.to, status = %status, body = %body, "Graph sendMail rejected message");
        }

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::Attachment;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn request_matches_graph_shape() {
        let mail = OutgoingMail {
            subject: "Invitation to share your views".to_string(),
            html_body: "<p>Hi</p>".to_string(),
            to: "anna@y.com".to_string(),
            attachment: Attachment {
                name: "Invite.pdf".to_string(),
                content_base64: "JVBERg==".to_string(),
            },
        };

        let value = serde_json::to_value(SendMailRequest::from(&mail)).unwrap();
        assert_eq!(
            value,
            json!({
                "message": {
                    "subject": "Invitation to share your views",
                    "body": { "contentType": "HTML", "content": "<p>Hi</p>" },
                    "toRecipients": [ { "emailAddress": { "address": "anna@y.com" } } ],
                    "attachments": [ {
                        "@odata.type": "#microsoft.graph.fileAttachment",
                        "name": "Invite.pdf",
                        "contentBytes": "JVBERg=="
                    } ]
                },
                "saveToSentItems": "true"
            })
        );
    }
}
