pub mod microsoft;

pub use microsoft::MicrosoftIdentity;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

/// Profile fields used to identify the signed-in user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

impl UserProfile {
    /// `mail`, falling back to the principal name.
    pub fn email(&self) -> Option<&str> {
        [self.mail.as_deref(), self.user_principal_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

/// OAuth2 authorization-code flow against the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent page the browser is sent to on login.
    fn authorize_url(&self) -> Result<String>;

    /// Trade an authorization code for an access token.
    /// A response without `access_token` is `AppError::TokenExchange`.
    async fn exchange_code(&self, code: &str) -> Result<String>;

    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile>;
}
