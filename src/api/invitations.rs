use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::assignments::Recipient;
use crate::error::{AppError, Result};
use crate::mail::compose::{paragraphs_to_html, personalise, read_attachment};
use crate::mail::OutgoingMail;
use crate::models::{
    MessageResponse, RecipientsResponse, SendEmailsRequest, TemplateResponse, UserQuery,
};
use crate::session::normalize_email;
use crate::state::AppState;

/// Recipient, template and sending routes
pub fn invitation_routes() -> Router<AppState> {
    Router::new()
        .route("/recipients", get(get_recipients))
        .route("/email-template", get(get_email_template))
        .route("/send-emails", post(send_emails))
}

/// GET /recipients - Pending recipients assigned to the signed-in user
async fn get_recipients(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<RecipientsResponse>> {
    let user_email = normalize_email(&query.user_email);

    if state.sessions.get(&user_email).await.is_none() {
        return Err(AppError::MissingSession);
    }

    let recipients = state.assignments.pending_for(&user_email).await;
    let sender_name = recipients.first().map(|r| r.sender_name.clone());
    tracing::debug!(user = %user_email, pending = recipients.len(), "Recipients requested");

    Ok(Json(RecipientsResponse {
        sender_name,
        recipients,
    }))
}

/// GET /email-template - Raw template text
async fn get_email_template(State(state): State<AppState>) -> Result<Json<TemplateResponse>> {
    let template = tokio::fs::read_to_string(&state.config.template_file)
        .await
        .map_err(|e| {
            tracing::error!(path = %state.config.template_file.display(), error = %e, "Template unreadable");
            AppError::Template(e.to_string())
        })?;

    Ok(Json(TemplateResponse { template }))
}

/// POST /send-emails - Personalise and send one message per selected recipient
async fn send_emails(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    Json(request): Json<SendEmailsRequest>,
) -> Result<Json<MessageResponse>> {
    let user_email = normalize_email(&query.user_email);

    let Some(access_token) = state.sessions.get(&user_email).await else {
        tracing::warn!(user = %user_email, "Send attempted without a session");
        return Err(AppError::NotLoggedIn);
    };

    let pending = state.assignments.pending_for(&user_email).await;
    tracing::info!(user = %user_email, pending = pending.len(), "Found recipients");
    if pending.is_empty() {
        return Err(AppError::NoRecipients);
    }

    let selected: Vec<Recipient> = pending
        .into_iter()
        .filter(|r| is_selected(&request.selected_emails, &r.recipient_email))
        .collect();
    if selected.is_empty() {
        return Err(AppError::NoSelectedRecipients);
    }

    let mut sent_rows = Vec::with_capacity(selected.len());
    let outcome = dispatch(
        &state,
        &access_token,
        &request.email_body,
        &selected,
        &mut sent_rows,
    )
    .await;

    // Rows the provider already accepted are persisted even if the batch broke off.
    if !sent_rows.is_empty() {
        state.assignments.mark_sent(&sent_rows).await?;
    }
    outcome?;

    tracing::info!(
        user = %user_email,
        attempted = selected.len(),
        sent = sent_rows.len(),
        "Invitation batch finished"
    );

    Ok(Json(MessageResponse {
        message: format!("{} emails sent!", selected.len()),
    }))
}

fn is_selected(selected: &[String], address: &str) -> bool {
    let address = address.trim();
    selected
        .iter()
        .any(|s| s.trim().eq_ignore_ascii_case(address))
}

/// Send sequentially, recording the row of every message answered with 202.
async fn dispatch(
    state: &AppState,
    access_token: &str,
    template: &str,
    recipients: &[Recipient],
    sent_rows: &mut Vec<usize>,
) -> Result<()> {
    let config = &state.config;

    for person in recipients {
        let html_body = paragraphs_to_html(&personalise(template, person));
        let attachment =
            read_attachment(&config.attachment_file, &config.attachment_display_name).await?;

        let mail = OutgoingMail {
            subject: config.email_subject.clone(),
            html_body,
            to: person.recipient_email.clone(),
            attachment,
        };

        let status = state.mailer.send_mail(access_token, &mail).await?;
        if status == StatusCode::ACCEPTED {
            sent_rows.push(person.row_index);
        } else {
            tracing::warn!(to = %person.recipient_email, status = %status, "Message not accepted");
        }
    }

    Ok(())
}
