use anyhow::{Context, Result, anyhow};
use std::net::SocketAddr;
use std::time::Duration;

use crate::euler::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::svg::Theme;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TITLE: &str = "Project Euler";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub base_url: String,
    pub upstream_timeout: Duration,
    pub title: String,
    pub theme: Theme,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;

        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .context("UPSTREAM_TIMEOUT_SECS is not a whole number of seconds")?,
            ),
            None => DEFAULT_TIMEOUT,
        };

        let theme = match lookup("BADGE_THEME") {
            Some(name) => Theme::from_name(&name)
                .ok_or_else(|| anyhow!("BADGE_THEME must be `dark` or `light`, got {name:?}"))?,
            None => Theme::Dark,
        };

        Ok(Self {
            bind_addr,
            base_url: lookup("EULER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            upstream_timeout,
            title: lookup("BADGE_TITLE").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            theme,
        })
    }
}
