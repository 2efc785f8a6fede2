// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into [`Settings`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATABASE_URL` | redb database file (`redb://` prefix allowed) | `data/invitations.redb` |
//! | `AUTH0_DOMAIN` | Auth tenant domain, used for issuer and JWKS | Required |
//! | `API_AUDIENCE` | Expected JWT audience claim | Required |
//! | `JWKS_URL` | Override for the JWKS endpoint | `https://{AUTH0_DOMAIN}/.well-known/jwks.json` |
//! | `JWKS_CACHE_TTL_SECS` | JWKS cache lifetime in seconds | `300` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_LEVEL` | Log filter when `RUST_LOG` is unset | `info` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::jwks::DEFAULT_CACHE_TTL;
use crate::logging::LogFormat;

/// Environment variable name for the database file path.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Default database path, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "data/invitations.redb";

/// Environment variable name for the auth tenant domain.
///
/// The expected issuer is `https://{AUTH0_DOMAIN}/`.
pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";

/// Environment variable name for the expected JWT audience.
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";

/// Environment variable name for the JWKS endpoint override.
pub const JWKS_URL_ENV: &str = "JWKS_URL";

pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";

/// Environment variable name for the server bind host.
pub const HOST_ENV: &str = "HOST";

/// Default bind host (all interfaces).
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8080;

pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable name for the logging format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Configuration errors reported at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub auth0_domain: String,
    pub api_audience: String,
    pub jwks_url: String,
    pub jwks_cache_ttl: Duration,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_path = var(DATABASE_URL_ENV)
            .map(|url| database_path_from_url(&url))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let auth0_domain = var(AUTH0_DOMAIN_ENV)
            .map(|d| normalize_domain(&d))
            .ok_or(ConfigError::Missing(AUTH0_DOMAIN_ENV))?;
        let api_audience = var(API_AUDIENCE_ENV).ok_or(ConfigError::Missing(API_AUDIENCE_ENV))?;

        let jwks_url = var(JWKS_URL_ENV)
            .unwrap_or_else(|| format!("https://{auth0_domain}/.well-known/jwks.json"));

        let jwks_cache_ttl = match var(JWKS_CACHE_TTL_ENV) {
            Some(value) => Duration::from_secs(parse(JWKS_CACHE_TTL_ENV, value)?),
            None => DEFAULT_CACHE_TTL,
        };

        let host: IpAddr = parse(
            HOST_ENV,
            var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
        )?;
        let port = match var(PORT_ENV) {
            Some(value) => parse(PORT_ENV, value)?,
            None => DEFAULT_PORT,
        };

        let log_level = var(LOG_LEVEL_ENV).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let log_format = var(LOG_FORMAT_ENV)
            .map(|f| LogFormat::from_name(&f))
            .unwrap_or_default();

        Ok(Self {
            database_path,
            auth0_domain,
            api_audience,
            jwks_url,
            jwks_cache_ttl,
            host,
            port,
            log_level,
            log_format,
        })
    }

    /// Expected `iss` claim.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.auth0_domain)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

/// Accepts `redb:///abs/path`, `redb://rel/path` or a bare path.
fn database_path_from_url(url: &str) -> PathBuf {
    PathBuf::from(url.strip_prefix("redb://").unwrap_or(url))
}

/// Accepts `tenant.auth0.com`, `https://tenant.auth0.com` or `https://tenant.auth0.com/`.
fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim();
    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain);
    domain.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| map.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        (AUTH0_DOMAIN_ENV, "tenant.example.com"),
        (API_AUDIENCE_ENV, "https://invitations.example.com"),
    ];

    #[test]
    fn defaults_apply_when_only_required_vars_set() {
        let settings = settings_from(&REQUIRED).unwrap();
        assert_eq!(settings.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(
            settings.jwks_url,
            "https://tenant.example.com/.well-known/jwks.json"
        );
        assert_eq!(settings.jwks_cache_ttl, Duration::from_secs(300));
        assert_eq!(settings.bind_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.log_format, LogFormat::Pretty);
    }

    #[test]
    fn issuer_has_trailing_slash() {
        let settings = settings_from(&REQUIRED).unwrap();
        assert_eq!(settings.issuer(), "https://tenant.example.com/");
    }

    #[test]
    fn domain_with_scheme_is_normalized() {
        let settings = settings_from(&[
            (AUTH0_DOMAIN_ENV, "https://tenant.example.com/"),
            (API_AUDIENCE_ENV, "aud"),
        ])
        .unwrap();
        assert_eq!(settings.auth0_domain, "tenant.example.com");
        assert_eq!(settings.issuer(), "https://tenant.example.com/");
    }

    #[test]
    fn missing_domain_is_an_error() {
        let result = settings_from(&[(API_AUDIENCE_ENV, "aud")]);
        assert!(matches!(result, Err(ConfigError::Missing(AUTH0_DOMAIN_ENV))));
    }

    #[test]
    fn blank_audience_counts_as_missing() {
        let result = settings_from(&[(AUTH0_DOMAIN_ENV, "tenant"), (API_AUDIENCE_ENV, "  ")]);
        assert!(matches!(result, Err(ConfigError::Missing(API_AUDIENCE_ENV))));
    }

    #[test]
    fn redb_prefix_is_stripped() {
        let mut vars = REQUIRED.to_vec();
        vars.push((DATABASE_URL_ENV, "redb:///var/lib/invitations.redb"));
        let settings = settings_from(&vars).unwrap();
        assert_eq!(
            settings.database_path,
            PathBuf::from("/var/lib/invitations.redb")
        );
    }

    #[test]
    fn overrides_are_read() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            (JWKS_URL_ENV, "http://127.0.0.1:9000/jwks.json"),
            (JWKS_CACHE_TTL_ENV, "30"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "3000"),
            (LOG_LEVEL_ENV, "debug"),
            (LOG_FORMAT_ENV, "json"),
        ]);
        let settings = settings_from(&vars).unwrap();
        assert_eq!(settings.jwks_url, "http://127.0.0.1:9000/jwks.json");
        assert_eq!(settings.jwks_cache_ttl, Duration::from_secs(30));
        assert_eq!(settings.bind_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let mut vars = REQUIRED.to_vec();
        vars.push((PORT_ENV, "eighty"));
        let result = settings_from(&vars);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: PORT_ENV, .. })
        ));
    }
}
