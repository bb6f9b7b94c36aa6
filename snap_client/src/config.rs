use std::{str::FromStr, time::Duration};

use cps_common::Secret;
use log::*;

/// Which gateway environment the client talks to. The environment picks the default hosts; explicit URL
/// overrides win.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnapEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl SnapEnvironment {
    pub fn default_app_url(&self) -> &'static str {
        match self {
            SnapEnvironment::Sandbox => "https://app.sandbox.midtrans.com",
            SnapEnvironment::Production => "https://app.midtrans.com",
        }
    }

    pub fn default_api_url(&self) -> &'static str {
        match self {
            SnapEnvironment::Sandbox => "https://api.sandbox.midtrans.com",
            SnapEnvironment::Production => "https://api.midtrans.com",
        }
    }
}

impl FromStr for SnapEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sandbox" => Ok(SnapEnvironment::Sandbox),
            "production" => Ok(SnapEnvironment::Production),
            other => Err(format!("Unknown gateway environment: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapConfig {
    pub environment: SnapEnvironment,
    /// Base URL for the Snap (payment session) endpoints.
    pub base_url: String,
    /// Base URL for the core API (status queries).
    pub api_base_url: String,
    pub server_key: Secret<String>,
    pub timeout: Duration,
}

impl Default for SnapConfig {
    fn default() -> Self {
        let environment = SnapEnvironment::default();
        Self {
            environment,
            base_url: environment.default_app_url().to_string(),
            api_base_url: environment.default_api_url().to_string(),
            server_key: Secret::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl SnapConfig {
    pub fn new_from_env_or_default() -> Self {
        let environment = std::env::var("SNAP_ENVIRONMENT")
            .ok()
            .and_then(|v| {
                v.parse::<SnapEnvironment>()
                    .map_err(|e| {
                        warn!("{e}. Using sandbox.");
                    })
                    .ok()
            })
            .unwrap_or_default();
        let base_url = std::env::var("SNAP_BASE_URL").unwrap_or_else(|_| environment.default_app_url().to_string());
        let api_base_url =
            std::env::var("SNAP_API_BASE_URL").unwrap_or_else(|_| environment.default_api_url().to_string());
        let server_key = Secret::new(std::env::var("SNAP_SERVER_KEY").unwrap_or_else(|_| {
            warn!("SNAP_SERVER_KEY not set, using (probably useless) default");
            "SB-Mid-server-00000000000000".to_string()
        }));
        let timeout = std::env::var("SNAP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));
        Self { environment, base_url, api_base_url, server_key, timeout }
    }
}
