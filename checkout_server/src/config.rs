use std::env;

use chrono::Duration;
use cps_common::parse_boolean_flag;
use log::*;
use snap_client::SnapConfig;

const DEFAULT_CPS_HOST: &str = "127.0.0.1";
const DEFAULT_CPS_PORT: u16 = 8330;
const DEFAULT_STATUS_CACHE: Duration = Duration::seconds(30);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// How long a settled order's status is served without re-polling the gateway.
    pub status_cache: Duration,
    /// When true, webhook notifications are verified against the gateway before being applied. Leave this on in
    /// production; turning it off is only useful against local gateway simulators.
    pub verify_notifications: bool,
    /// Payment gateway configuration.
    pub snap: SnapConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CPS_HOST.to_string(),
            port: DEFAULT_CPS_PORT,
            database_url: String::default(),
            status_cache: DEFAULT_STATUS_CACHE,
            verify_notifications: true,
            snap: SnapConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CPS_HOST").ok().unwrap_or_else(|| DEFAULT_CPS_HOST.into());
        let port = env::var("CPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for CPS_PORT. {e} Using the default, {DEFAULT_CPS_PORT}, instead."
                    );
                    DEFAULT_CPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CPS_PORT);
        let database_url = env::var("CPS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ CPS_DATABASE_URL is not set. Please set it to the URL for the order database.");
            String::default()
        });
        let status_cache = env::var("CPS_STATUS_CACHE_SECS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Duration::seconds)
            .unwrap_or(DEFAULT_STATUS_CACHE);
        let verify_notifications = parse_boolean_flag(env::var("CPS_VERIFY_NOTIFICATIONS").ok(), true);
        if !verify_notifications {
            warn!("🪛️ Webhook notification verification is DISABLED. Do not run like this in production.");
        }
        let snap = SnapConfig::new_from_env_or_default();
        Self { host, port, database_url, status_cache, verify_notifications, snap }
    }
}
