use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use super::{IdentityProvider, UserProfile};
use crate::config::Config;
use crate::error::{AppError, Result};

/// Microsoft identity platform (v2.0 endpoints) plus the Graph `/me` profile.
#[derive(Clone)]
pub struct MicrosoftIdentity {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: String,
    tenant_base: String,
    graph_base_url: String,
}

impl MicrosoftIdentity {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
            tenant_base: format!(
                "{}/{}/oauth2/v2.0",
                config.authority_url.trim_end_matches('/'),
                config.tenant_id
            ),
            graph_base_url: config.graph_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for MicrosoftIdentity {
    fn authorize_url(&self) -> Result<String> {
        let url = Url::parse_with_params(
            &format!("{}/authorize", self.tenant_base),
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_mode", "query"),
                ("scope", self.scopes.as_str()),
            ],
        )
        .map_err(|e| AppError::InternalError(format!("Invalid authorize URL: {}", e)))?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<String> {
        let res = self
            .client
            .post(format!("{}/token", self.tenant_base))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("scope", self.scopes.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let token_data: Value = res.json().await?;
        tracing::debug!(status = %status, "Token endpoint responded");

        match token_data.get("access_token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => {
                tracing::warn!(status = %status, "Token response carried no access_token");
                Err(AppError::TokenExchange {
                    details: token_data,
                })
            }
        }
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile> {
        let res = self
            .client
            .get(format!("{}/me", self.graph_base_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        tracing::info!(status = %res.status(), "Graph profile lookup");
        let profile: UserProfile = res.json().await?;
        Ok(profile)
    }
}
