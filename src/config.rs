//! Runtime configuration utilities for kn-rate-filter.

use std::{env, path::PathBuf};

use indexmap::IndexMap;

use crate::notify::{Endpoint, Endpoints};

/// Primary channels and the environment entries holding their webhook URLs.
pub const PRIMARY_WEBHOOKS: [(&str, &str); 2] =
    [("internal", "KNWEBHOOK"), ("mirror", "KNWEBHOOK_FINK")];
pub const AMATEUR_WEBHOOK: &str = "KNWEBHOOK_AMA_RATE";

const DEFAULT_PORTAL_URL: &str = "https://fink-portal.org";

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Webhook endpoints notified for accepted candidates.
    pub endpoints: Endpoints,
    /// Base URL of the science portal linked from notifications.
    pub portal_url: String,
    /// Root folder for filter outputs.
    pub outputs_dir: PathBuf,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Resolve settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let primary: IndexMap<String, Endpoint> = PRIMARY_WEBHOOKS
            .iter()
            .map(|(channel, key)| (channel.to_string(), Endpoint::from_setting(lookup(key))))
            .collect();
        let amateur = Endpoint::from_setting(lookup(AMATEUR_WEBHOOK));
        let portal_url = lookup("KN_PORTAL_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PORTAL_URL.to_string());
        let outputs_dir = lookup("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./outputs"));

        Self {
            endpoints: Endpoints { primary, amateur },
            portal_url,
            outputs_dir,
        }
    }
}
