// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the startup loader for the
//! authorization service.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ACCESS_SECRET` | HS256 key shared with the token issuer | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TOKEN_LEEWAY_SECONDS` | Clock skew tolerance for `exp` | `0` |
//! | `LOOKUP_TIMEOUT_MS` | Bound on one owner lookup | `5000` |
//! | `MAX_BODY_BYTES` | Body limit on ownership-gated routes | `1048576` |
//! | `SEED_FILE` | JSON owner table for the in-memory locator | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::auth::VerificationKey;
use crate::state::{DEFAULT_LOOKUP_TIMEOUT, DEFAULT_MAX_BODY_BYTES};

/// Environment variable name for the token verification secret.
///
/// Never logged. An empty value is rejected at startup.
pub const ACCESS_SECRET_ENV: &str = "ACCESS_SECRET";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TOKEN_LEEWAY_SECONDS_ENV: &str = "TOKEN_LEEWAY_SECONDS";
pub const LOOKUP_TIMEOUT_MS_ENV: &str = "LOOKUP_TIMEOUT_MS";
pub const MAX_BODY_BYTES_ENV: &str = "MAX_BODY_BYTES";

/// Environment variable name for the owner seed file.
///
/// See [`crate::store`] for the file format. Without it the service starts
/// with an empty owner table and every lookup is a 404.
pub const SEED_FILE_ENV: &str = "SEED_FILE";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected `json` or `pretty`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub access_secret: VerificationKey,
    pub token_leeway_seconds: u64,
    pub lookup_timeout: Duration,
    pub max_body_bytes: usize,
    pub seed_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let access_secret = var(ACCESS_SECRET_ENV)
            .map(VerificationKey::new)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing(ACCESS_SECRET_ENV))?;

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port: u16 = parse_or(&var, PORT_ENV, DEFAULT_PORT)?;
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: HOST_ENV,
                reason: e.to_string(),
            })?;

        let token_leeway_seconds = parse_or(&var, TOKEN_LEEWAY_SECONDS_ENV, 0u64)?;
        let lookup_timeout_ms = parse_or(
            &var,
            LOOKUP_TIMEOUT_MS_ENV,
            DEFAULT_LOOKUP_TIMEOUT.as_millis() as u64,
        )?;
        if lookup_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: LOOKUP_TIMEOUT_MS_ENV,
                reason: "must be greater than zero".to_string(),
            });
        }
        let max_body_bytes = parse_or(&var, MAX_BODY_BYTES_ENV, DEFAULT_MAX_BODY_BYTES)?;

        let log_format = match var(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                reason,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            addr,
            access_secret,
            token_leeway_seconds,
            lookup_timeout: Duration::from_millis(lookup_timeout_ms),
            max_body_bytes,
            seed_file: var(SEED_FILE_ENV).filter(|s| !s.is_empty()).map(PathBuf::from),
            log_format,
        })
    }
}

fn parse_or<T>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
