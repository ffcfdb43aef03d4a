use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use reqwest::Url;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{CallbackQuery, MessageResponse, UserQuery};
use crate::session::normalize_email;
use crate::state::AppState;

/// Login routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/auth/callback", get(auth_callback))
        .route("/logout", post(logout))
}

/// 302 Found with a `Location` header.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// GET /login - Redirect to the provider consent page
async fn login(State(state): State<AppState>) -> Result<Response> {
    let url = state.identity.authorize_url()?;
    Ok(found(&url))
}

/// GET /auth/callback - Exchange the code, resolve the user, open a session
async fn auth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        tracing::warn!(error = ?query.error, "Callback without authorization code");
        return Err(AppError::TokenExchange {
            details: json!({
                "error": query.error,
                "error_description": query.error_description,
            }),
        });
    };

    let access_token = state.identity.exchange_code(code).await?;
    let profile = state.identity.fetch_profile(&access_token).await?;

    let Some(user_email) = profile.email().map(str::to_string) else {
        tracing::warn!(profile = ?profile, "No email found in profile");
        return Err(AppError::ProfileEmailMissing);
    };

    state.sessions.put(&user_email, access_token).await;
    tracing::info!(user = %normalize_email(&user_email), "User signed in");

    let target = Url::parse_with_params(
        &state.config.frontend_url,
        &[("user_email", user_email.as_str())],
    )
    .map_err(|e| AppError::InternalError(format!("Invalid frontend URL: {}", e)))?;

    Ok(found(target.as_str()))
}

/// POST /logout - Forget the stored token
async fn logout(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<MessageResponse> {
    let user_email = normalize_email(&query.user_email);
    if state.sessions.expire(&user_email).await {
        tracing::info!(user = %user_email, "User signed out");
    }

    Json(MessageResponse {
        message: "Logged out.".to_string(),
    })
}
