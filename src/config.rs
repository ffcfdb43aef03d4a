use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_SCOPES: &str =
    "https://graph.microsoft.com/Mail.Send https://graph.microsoft.com/User.Read offline_access";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
    pub redirect_uri: String,
    pub scopes: String,
    pub authority_url: String,
    pub graph_base_url: String,
    pub frontend_url: String,
    pub recipients_file: PathBuf,
    pub template_file: PathBuf,
    pub attachment_file: PathBuf,
    pub attachment_display_name: String,
    pub email_subject: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let attachment_file = PathBuf::from(required("ATTACHMENT_FILE")?);
        let attachment_display_name = env::var("ATTACHMENT_DISPLAY_NAME")
            .unwrap_or_else(|_| display_name_from_path(&attachment_file));

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            tenant_id: required("TENANT_ID")?,
            redirect_uri: required("REDIRECT_URI")?,
            scopes: env::var("OAUTH_SCOPES").unwrap_or_else(|_| DEFAULT_SCOPES.to_string()),
            authority_url: env::var("AUTHORITY_URL")
                .unwrap_or_else(|_| "https://login.microsoftonline.com".to_string()),
            graph_base_url: env::var("GRAPH_BASE_URL")
                .unwrap_or_else(|_| "https://graph.microsoft.com/v1.0".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5500/index.html".to_string()),
            recipients_file: env::var("RECIPIENTS_FILE")
                .unwrap_or_else(|_| "files/recipients.xlsx".to_string())
                .into(),
            template_file: env::var("TEMPLATE_FILE")
                .unwrap_or_else(|_| "files/email_template.txt".to_string())
                .into(),
            attachment_file,
            attachment_display_name,
            email_subject: env::var("EMAIL_SUBJECT")
                .unwrap_or_else(|_| "Invitation to share your views".to_string()),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn display_name_from_path(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server port")]
    InvalidPort,
    #[error("{0} environment variable is required")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_file_name() {
        assert_eq!(
            display_name_from_path(Path::new("files/Invitation Letter.pdf")),
            "Invitation Letter.pdf"
        );
        assert_eq!(display_name_from_path(Path::new("/")), "attachment");
    }

    #[test]
    fn missing_variable_names_the_key() {
        let err = ConfigError::Missing("CLIENT_ID");
        assert_eq!(err.to_string(), "CLIENT_ID environment variable is required");
    }
}
