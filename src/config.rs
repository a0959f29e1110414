use crate::error::{HfError, Result};
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "fofr/sdxl-emoji";
pub const DEFAULT_INFERENCE_URL: &str = "https://router.huggingface.co/hf-inference/models";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7860;

pub const TOKEN_VAR: &str = "HF_TOKEN";

/// Settings for the hosted inference API. Built once at startup and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct HfConfig {
    pub token: SecretString,
    pub model: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub wait_for_model: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl HfConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_INFERENCE_URL.to_string(),
            timeout: None,
            wait_for_model: false,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't have to
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_VAR)
            .filter(|t| !t.trim().is_empty())
            .ok_or(HfError::MissingCredential { name: TOKEN_VAR })?;

        let mut config = Self::new(token);

        if let Some(model) = lookup("HF_MODEL").filter(|m| !m.trim().is_empty()) {
            config = config.with_model(model);
        }

        if let Some(url) = lookup("HF_INFERENCE_URL").filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url);
        }

        if let Some(raw) = lookup("HF_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                HfError::ConfigError(format!("HF_TIMEOUT_SECS must be a whole number, got '{}'", raw))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        config.wait_for_model = lookup("HF_WAIT_FOR_MODEL").map_or(false, |val| parse_flag(&val));

        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_wait_for_model(mut self, enabled: bool) -> Self {
        self.wait_for_model = enabled;
        self
    }

    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            config.host = host;
        }

        if let Some(raw) = lookup("PORT") {
            config.port = raw
                .trim()
                .parse()
                .map_err(|_| HfError::ConfigError(format!("PORT must be a valid port, got '{}'", raw)))?;
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
