//! Client configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.pipedrive.com/v1";
pub const BASE_URL_ENV: &str = "PIPEDRIVE_BASE_URL";
pub const API_TOKEN_ENV: &str = "PIPEDRIVE_API_TOKEN";

/// Where to send requests and how to authenticate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Sent as the `api_token` query parameter on every request.
    pub api_token: Option<String>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            user_agent: concat!("pipedrive-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Defaults overridden by `PIPEDRIVE_BASE_URL` and `PIPEDRIVE_API_TOKEN`.
    /// Empty variables count as unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(base_url) = non_empty_var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        config.api_token = non_empty_var(API_TOKEN_ENV);
        config
    }

    /// Base URL with trailing slashes removed.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
