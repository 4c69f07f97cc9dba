//! Mail server configuration

use crate::error::{Error, Result};
use crate::mailbox::Provider;
use std::env;
use std::str::FromStr;

/// Number of messages `fetch_latest` retrieves when nothing else is
/// configured.
pub const DEFAULT_FETCH_COUNT: u32 = 100;

/// Connection settings for the retrieval (IMAP) side, plus the
/// sending endpoint so the configuration is complete.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub username: String,
    pub password: String,
    pub imap_host: String,
    pub imap_port: u16,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Connect with TLS from the first byte instead of upgrading a
    /// plaintext connection with STARTTLS.
    pub use_implicit_tls: bool,
    /// Skip certificate verification (self-signed local bridges).
    pub accept_invalid_certs: bool,
    pub provider: Provider,
    pub default_fetch_count: u32,
}

impl MailConfig {
    /// Plain configuration with defaults for everything except the
    /// endpoint and credentials.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let host = host.into();
        Self {
            username: username.into(),
            password: password.into(),
            smtp_host: host.clone(),
            imap_host: host,
            imap_port: port,
            smtp_port: 1025,
            use_implicit_tls: false,
            accept_invalid_certs: false,
            provider: Provider::Generic,
            default_fetch_count: DEFAULT_FETCH_COUNT,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Reads from `.env` file if present. Required variables:
    /// - `IMAP_USERNAME`
    /// - `IMAP_PASSWORD`
    ///
    /// Optional (with defaults):
    /// - `IMAP_HOST` (default: `127.0.0.1`)
    /// - `IMAP_PORT` (default: `1143`)
    /// - `SMTP_HOST` (default: same as `IMAP_HOST`)
    /// - `SMTP_PORT` (default: `1025`)
    /// - `IMAP_IMPLICIT_TLS` (default: `false`)
    /// - `IMAP_ACCEPT_INVALID_CERTS` (default: `false`)
    /// - `MAIL_PROVIDER` (default: `generic`)
    /// - `IMAP_FETCH_COUNT` (default: `100`)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let imap_host = env::var("IMAP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        Ok(Self {
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| imap_host.clone()),
            imap_host,
            imap_port: parse_var("IMAP_PORT", 1143)?,
            smtp_port: parse_var("SMTP_PORT", 1025)?,
            username: env::var("IMAP_USERNAME")
                .map_err(|_| Error::Config("IMAP_USERNAME not set".into()))?,
            password: env::var("IMAP_PASSWORD")
                .map_err(|_| Error::Config("IMAP_PASSWORD not set".into()))?,
            use_implicit_tls: parse_flag("IMAP_IMPLICIT_TLS", env::var("IMAP_IMPLICIT_TLS").ok())?,
            accept_invalid_certs: parse_flag(
                "IMAP_ACCEPT_INVALID_CERTS",
                env::var("IMAP_ACCEPT_INVALID_CERTS").ok(),
            )?,
            provider: env::var("MAIL_PROVIDER")
                .map_or(Ok(Provider::Generic), |tag| Provider::from_str(&tag))?,
            default_fetch_count: parse_var("IMAP_FETCH_COUNT", DEFAULT_FETCH_COUNT)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {name}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn parse_flag(name: &str, raw: Option<String>) -> Result<bool> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config(format!("Invalid {name}: {other:?}"))),
    }
}
