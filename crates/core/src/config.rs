//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handlers and the priority-refresh ticker never read
//! process-wide environment variables; they only see a `CoreConfig`.

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_NAME_STORE_DIR, DEFAULT_PRIORITY_REFRESH_SECS,
    DEFAULT_QUEUE_ASSIGNER_URL, DEFAULT_RECONCILE_DELAY_MS,
};
use crate::{KioskError, KioskResult};
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    queue_assigner_url: Url,
    name_store_dir: PathBuf,
    http_timeout: Duration,
    priority_refresh_interval: Duration,
    reconcile_delay: Duration,
    admin_api_key: Option<String>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The reconcile delay may be zero; the HTTP timeout and refresh interval may not.
    pub fn new(
        queue_assigner_url: Url,
        name_store_dir: PathBuf,
        http_timeout: Duration,
        priority_refresh_interval: Duration,
        reconcile_delay: Duration,
        admin_api_key: Option<String>,
    ) -> KioskResult<Self> {
        if http_timeout.is_zero() {
            return Err(KioskError::Config("HTTP timeout must be positive".into()));
        }
        if priority_refresh_interval.is_zero() {
            return Err(KioskError::Config(
                "priority refresh interval must be positive".into(),
            ));
        }

        Ok(Self {
            queue_assigner_url: with_trailing_slash(queue_assigner_url),
            name_store_dir,
            http_timeout,
            priority_refresh_interval,
            reconcile_delay,
            admin_api_key,
        })
    }

    /// Resolve configuration from the process environment.
    ///
    /// Intended to be called once from a binary's `main`, after `.env` has been loaded.
    ///
    /// # Environment Variables
    /// - `QUEUE_ASSIGNER_URL`: base URL of the external service
    /// - `KIOSK_NAME_STORE_DIR`: directory of the local name store
    /// - `KIOSK_HTTP_TIMEOUT_SECS`: bound on every outbound call
    /// - `KIOSK_PRIORITY_REFRESH_SECS`: period of the priority-refresh ticker
    /// - `KIOSK_RECONCILE_DELAY_MS`: wait between prediction and queue re-fetch
    /// - `KIOSK_ADMIN_API_KEY`: when set, required for the call-next endpoint
    pub fn from_env() -> KioskResult<Self> {
        let var = |name: &str| std::env::var(name).ok();

        Self::new(
            queue_assigner_url_from_env_value(var("QUEUE_ASSIGNER_URL"))?,
            var("KIOSK_NAME_STORE_DIR")
                .and_then(non_blank)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_NAME_STORE_DIR)),
            duration_from_env_value(
                "KIOSK_HTTP_TIMEOUT_SECS",
                var("KIOSK_HTTP_TIMEOUT_SECS"),
                Duration::from_secs,
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?,
            duration_from_env_value(
                "KIOSK_PRIORITY_REFRESH_SECS",
                var("KIOSK_PRIORITY_REFRESH_SECS"),
                Duration::from_secs,
                DEFAULT_PRIORITY_REFRESH_SECS,
            )?,
            duration_from_env_value(
                "KIOSK_RECONCILE_DELAY_MS",
                var("KIOSK_RECONCILE_DELAY_MS"),
                Duration::from_millis,
                DEFAULT_RECONCILE_DELAY_MS,
            )?,
            var("KIOSK_ADMIN_API_KEY").and_then(non_blank),
        )
    }

    /// Base URL of the queue-assigner, always ending in `/`.
    pub fn queue_assigner_url(&self) -> &Url {
        &self.queue_assigner_url
    }

    pub fn name_store_dir(&self) -> &Path {
        &self.name_store_dir
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    pub fn priority_refresh_interval(&self) -> Duration {
        self.priority_refresh_interval
    }

    pub fn reconcile_delay(&self) -> Duration {
        self.reconcile_delay
    }

    /// # Returns
    /// The admin key, or `None` when call-next is open.
    pub fn admin_api_key(&self) -> Option<&str> {
        self.admin_api_key.as_deref()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// Url::join drops the last path segment unless the base ends in '/'.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Parse the queue-assigner base URL from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default public deployment.
pub fn queue_assigner_url_from_env_value(value: Option<String>) -> KioskResult<Url> {
    let raw = value
        .and_then(non_blank)
        .unwrap_or_else(|| DEFAULT_QUEUE_ASSIGNER_URL.to_string());

    let url = Url::parse(&raw)
        .map_err(|e| KioskError::Config(format!("QUEUE_ASSIGNER_URL {raw:?} is not a URL: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(KioskError::Config(format!(
            "QUEUE_ASSIGNER_URL must use http or https, got {}",
            url.scheme()
        )));
    }

    Ok(with_trailing_slash(url))
}

/// Parse a whole-number duration from an optional string value.
///
/// `unit` converts the parsed number (e.g. `Duration::from_secs`). Missing or blank values
/// yield `default`.
pub fn duration_from_env_value(
    name: &str,
    value: Option<String>,
    unit: fn(u64) -> Duration,
    default: u64,
) -> KioskResult<Duration> {
    let Some(raw) = value.and_then(non_blank) else {
        return Ok(unit(default));
    };

    raw.parse::<u64>()
        .map(unit)
        .map_err(|_| KioskError::Config(format!("{name} must be a whole number, got {raw:?}")))
}
