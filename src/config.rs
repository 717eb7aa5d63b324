//! Runtime configuration.
//!
//! Values come from the environment (after `.env.local` and `.env` are
//! loaded by the binary) and may be overridden from the command line.

use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::http_client::DEFAULT_TIMEOUT_SECS;
use crate::stats::DEFAULT_DIGITS;
use crate::tgs::TGS_API_BASE;

pub const MAX_DIGITS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Root of the TGS API.
    pub api_base: String,
    /// Directory holding the cached reference CSV files.
    pub cache_dir: PathBuf,
    pub request_timeout_secs: u64,
    /// trace, debug, info, warn or error
    pub log_level: String,
    pub digits: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: TGS_API_BASE.to_string(),
            cache_dir: PathBuf::from("."),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: "info".to_string(),
            digits: DEFAULT_DIGITS,
        }
    }
}

/// Command-line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub log_level: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub api_base: Option<String>,
    pub digits: Option<u32>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(base) = lookup("TGS_API_BASE") {
            config.api_base = base.trim().to_string();
        }
        if let Some(dir) = lookup("RATINGS_CACHE_DIR") {
            if !dir.trim().is_empty() {
                config.cache_dir = PathBuf::from(dir.trim());
            }
        }
        if let Some(timeout) = lookup("RATINGS_HTTP_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout
                .trim()
                .parse()
                .map_err(|_| anyhow!("Invalid RATINGS_HTTP_TIMEOUT_SECS value: {}", timeout))?;
        }
        if let Some(level) = lookup("RATINGS_LOG") {
            config.log_level = level.trim().to_string();
        }
        if let Some(digits) = lookup("RATINGS_DIGITS") {
            config.digits = digits
                .trim()
                .parse()
                .map_err(|_| anyhow!("Invalid RATINGS_DIGITS value: {}", digits))?;
        }

        Ok(config)
    }

    /// Applies overrides. Call [`AppConfig::validate`] afterwards so the
    /// overridden values are checked too.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if let Some(dir) = overrides.cache_dir {
            self.cache_dir = dir;
        }
        if let Some(base) = overrides.api_base {
            self.api_base = base;
        }
        if let Some(digits) = overrides.digits {
            self.digits = digits;
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(anyhow!("Invalid log level: {}", self.log_level)),
        }
        if self.api_base.is_empty() {
            return Err(anyhow!("TGS API base URL cannot be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("HTTP timeout must be greater than 0"));
        }
        if self.digits > MAX_DIGITS {
            return Err(anyhow!(
                "Rounding digits must be at most {}, got {}",
                MAX_DIGITS,
                self.digits
            ));
        }
        Ok(())
    }
}
