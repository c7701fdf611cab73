use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required credentials are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub email_address: String,
    pub email_password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
    pub generation_timeout: Duration,
    pub smtp_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL", "sqlite://resume_requests.db"),
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: optional_env("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            email_address: require_env("EMAIL_ADDRESS")?,
            email_password: require_env("EMAIL_PASSWORD")?,
            smtp_host: optional_env("SMTP_HOST", "smtp.gmail.com"),
            smtp_port: parse_env("SMTP_PORT", "587")?,
            template_path: optional_env("TEMPLATE_PATH", "templates/resume_template.docx").into(),
            output_dir: optional_env("OUTPUT_DIR", "output").into(),
            generation_timeout: Duration::from_secs(parse_env("GENERATION_TIMEOUT_SECS", "120")?),
            smtp_timeout: Duration::from_secs(parse_env("SMTP_TIMEOUT_SECS", "30")?),
            port: parse_env("PORT", "5000")?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: &str) -> Result<T> {
    optional_env(key, default)
        .parse::<T>()
        .map_err(|_| anyhow::anyhow!("{key} must be a valid number"))
}
