#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::aggregator::WindowErrorPolicy;
use crate::core::ConfigProvider;
use crate::utils::error::{AuditError, Result};
use crate::utils::validation::{self, Validate};
use std::time::Duration;
use self::toml_config::TomlConfig;

pub const DEFAULT_TOKEN_URL: &str = "https://api-eu.syrve.live/api/1/access_token";
pub const DEFAULT_ORGANIZATIONS_URL: &str = "https://api-eu.syrve.live/api/1/organizations";
pub const DEFAULT_DELIVERIES_URL: &str =
    "https://api-eu.syrve.live/api/1/deliveries/by_delivery_date_and_status";
pub const DEFAULT_STATUS: &str = "Closed";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECONDS: u64 = 1;

/// 合併後的執行設定：命令列 > TOML > 預設值
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub login: Option<String>,
    pub from: String,
    pub to: String,
    pub token_url: String,
    pub organizations_url: String,
    pub deliveries_url: String,
    pub statuses: Vec<String>,
    pub organizations: Vec<String>,
    pub on_window_error: String,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
    pub timeout_seconds: u64,
    pub output_path: Option<String>,
    pub show_details: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            login: None,
            from: String::new(),
            to: String::new(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            organizations_url: DEFAULT_ORGANIZATIONS_URL.to_string(),
            deliveries_url: DEFAULT_DELIVERIES_URL.to_string(),
            statuses: vec![DEFAULT_STATUS.to_string()],
            organizations: Vec::new(),
            on_window_error: WindowErrorPolicy::Skip.name().to_string(),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_seconds: DEFAULT_RETRY_DELAY_SECONDS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            output_path: None,
            show_details: true,
        }
    }
}

impl AuditConfig {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Self::default()
        }
    }

    /// Overlays every value the TOML file sets.
    pub fn merge_toml(&mut self, file: &TomlConfig) {
        let api = &file.api;
        if let Some(login) = &api.login {
            self.login = Some(login.clone());
        }
        if let Some(url) = &api.token_url {
            self.token_url = url.clone();
        }
        if let Some(url) = &api.organizations_url {
            self.organizations_url = url.clone();
        }
        if let Some(url) = &api.deliveries_url {
            self.deliveries_url = url.clone();
        }
        if let Some(statuses) = &api.statuses {
            self.statuses = statuses.clone();
        }
        if let Some(orgs) = &api.organizations {
            self.organizations = orgs.clone();
        }
        if let Some(timeout) = api.timeout_seconds {
            self.timeout_seconds = timeout;
        }

        let fetch = &file.fetch;
        if let Some(policy) = &fetch.on_window_error {
            self.on_window_error = policy.clone();
        }
        if let Some(attempts) = fetch.retry_attempts {
            self.retry_attempts = attempts;
        }
        if let Some(delay) = fetch.retry_delay_seconds {
            self.retry_delay_seconds = delay;
        }

        if let Some(path) = &file.report.output_path {
            self.output_path = Some(path.clone());
        }
        if let Some(show) = file.report.show_details {
            self.show_details = show;
        }
    }

    pub fn login(&self) -> Result<&str> {
        validation::validate_required_field("login", &self.login).map(String::as_str)
    }

    pub fn window_error_policy(&self) -> Result<WindowErrorPolicy> {
        let policy = self.on_window_error.parse::<WindowErrorPolicy>()?;
        Ok(match policy {
            WindowErrorPolicy::Retry { .. } => WindowErrorPolicy::Retry {
                attempts: self.retry_attempts,
                delay: Duration::from_secs(self.retry_delay_seconds),
            },
            other => other,
        })
    }
}

impl ConfigProvider for AuditConfig {
    fn token_url(&self) -> &str {
        &self.token_url
    }

    fn organizations_url(&self) -> &str {
        &self.organizations_url
    }

    fn deliveries_url(&self) -> &str {
        &self.deliveries_url
    }

    fn statuses(&self) -> &[String] {
        &self.statuses
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Validate for AuditConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("login", self.login()?)?;
        validation::validate_url("token_url", &self.token_url)?;
        validation::validate_url("organizations_url", &self.organizations_url)?;
        validation::validate_url("deliveries_url", &self.deliveries_url)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        validation::validate_range("retry_attempts", self.retry_attempts, 0, 10)?;

        if self.statuses.is_empty() {
            return Err(AuditError::InvalidConfigValueError {
                field: "statuses".to_string(),
                value: String::new(),
                reason: "At least one order status is required".to_string(),
            });
        }
        if let Some(path) = &self.output_path {
            validation::validate_path("output_path", path)?;
        }

        self.window_error_policy()?;
        crate::core::date_chunker::parse_timestamp(&self.from)?;
        crate::core::date_chunker::parse_timestamp(&self.to)?;
        Ok(())
    }
}
