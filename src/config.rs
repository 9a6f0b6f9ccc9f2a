//! Environment configuration, validated once at startup.

use std::path::PathBuf;

use anyhow::{bail, Context};

/// Everything the server reads from the environment, resolved before it
/// starts serving. Missing required values abort startup instead of
/// surfacing later as per-request failures.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    /// SurrealDB address, e.g. `mem://`, `rocksdb://data/sahyog` or `ws://host:8000`
    pub database_url: String,
    pub database_ns: String,
    pub database_db: String,
    /// The shared admin secret. When unset, every login attempt is rejected.
    pub admin_password: Option<String>,
    /// Key used to sign session cookies
    pub session_secret: String,
    /// Set both to store uploads in the external blob service instead of
    /// the local public directory
    pub blob_api_url: Option<String>,
    pub blob_token: Option<String>,
    pub upload_dir: PathBuf,
    pub upload_prefix: String,
    pub mailgun_token: Option<String>,
    pub mailgun_domain: Option<String>,
    /// Where contact and application form mail is delivered
    pub contact_email: Option<String>,
    /// Frontend endpoint notified when a cached page path becomes stale
    pub revalidate_url: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let required =
            |name: &str| std::env::var(name).with_context(|| format!("`{name}` must be set"));
        let optional = |name: &str| std::env::var(name).ok().filter(|value| !value.is_empty());

        let session_secret = required("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            bail!("`SESSION_SECRET` must be at least 32 characters long");
        }

        let admin_password = optional("ADMIN_PASSWORD");
        if admin_password.is_none() {
            tracing::warn!("`ADMIN_PASSWORD` is not set, all admin logins will be rejected");
        }

        let blob_api_url = optional("BLOB_API_URL");
        let blob_token = optional("BLOB_TOKEN");
        if blob_api_url.is_some() != blob_token.is_some() {
            bail!("`BLOB_API_URL` and `BLOB_TOKEN` must be set together");
        }

        Ok(Self {
            port: optional("PORT")
                .and_then(|port| port.parse().ok())
                .unwrap_or(3000),
            database_url: required("DATABASE_URL")?,
            database_ns: optional("DATABASE_NS").unwrap_or_else(|| "sahyog".to_owned()),
            database_db: optional("DATABASE_DB").unwrap_or_else(|| "site".to_owned()),
            admin_password,
            session_secret,
            blob_api_url,
            blob_token,
            upload_dir: optional("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public/uploads")),
            upload_prefix: optional("UPLOAD_PREFIX").unwrap_or_else(|| "/uploads".to_owned()),
            mailgun_token: optional("MAILGUN_TOKEN"),
            mailgun_domain: optional("MAILGUN_DOMAIN"),
            contact_email: optional("CONTACT_EMAIL"),
            revalidate_url: optional("REVALIDATE_URL"),
        })
    }
}
