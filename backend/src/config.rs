use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub admin_password: String,
    pub persist_path: Option<PathBuf>,
    pub gift_budget: u32,
    /// Required email suffix for registration, e.g. `@company.com`.
    pub company_domain: Option<String>,
    pub log_format: LogFormat,
    pub verbose: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            admin_password: "changeme".to_string(),
            persist_path: None,
            gift_budget: 1500,
            company_domain: None,
            log_format: LogFormat::Compact,
            verbose: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let bind_addr: SocketAddr = match get("BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDR",
                value: raw,
            })?,
            None => defaults.bind_addr,
        };

        let gift_budget: u32 = match get("GIFT_BUDGET") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "GIFT_BUDGET",
                value: raw,
            })?,
            None => defaults.gift_budget,
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("compact") => LogFormat::Compact,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        let verbose = match get("VERBOSE").as_deref() {
            None | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "VERBOSE",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            bind_addr,
            admin_password: get("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            persist_path: get("PERSIST_PATH").map(PathBuf::from),
            gift_budget,
            company_domain: get("COMPANY_DOMAIN").map(|d| d.to_lowercase()),
            log_format,
            verbose,
        })
    }
}
