// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Behavior
//!
//! - Keys are cached with a configurable TTL (default 5 minutes)
//! - A `kid` that is not in the cached set forces one refresh, at most once
//!   every 5 seconds, so rotated keys are picked up without waiting for
//!   the TTL
//! - Stale cache is used on fetch failure
//! - Only RSA keys are accepted

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet, RSAKeyParameters};
use jsonwebtoken::DecodingKey;
use tokio::sync::{Mutex, RwLock};

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Minimum time between two refreshes forced by unknown key ids.
const MIN_FORCED_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Outbound request timeout.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JWKS cache entry.
struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// JWKS manager with caching.
#[derive(Clone)]
pub struct JwksManager {
    /// JWKS endpoint
    jwks_url: String,
    /// Cache TTL
    cache_ttl: Duration,
    min_refresh_interval: Duration,
    /// Cached JWKS
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// When a `kid` miss last forced a refresh
    last_forced_refresh: Arc<Mutex<Option<Instant>>>,
    /// HTTP client
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a new JWKS manager.
    ///
    /// # Arguments
    /// - `jwks_url`: The JWKS endpoint URL (e.g., `https://tenant.auth0.com/.well-known/jwks.json`)
    pub fn new(jwks_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AuthError::JwksUnavailable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            min_refresh_interval: MIN_FORCED_REFRESH_INTERVAL,
            cache: Arc::new(RwLock::new(None)),
            last_forced_refresh: Arc::new(Mutex::new(None)),
            client,
        })
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    #[cfg(test)]
    fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Fetch JWKS (with caching).
    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if entry.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(entry.jwks.clone());
                }
            }
        }

        match self.fetch_jwks().await {
            Ok(jwks) => {
                let mut cache = self.cache.write().await;
                *cache = Some(CacheEntry {
                    jwks: jwks.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(jwks)
            }
            Err(err) => {
                let cache = self.cache.read().await;
                match &*cache {
                    Some(entry) => {
                        tracing::warn!(error = ?err, url = %self.jwks_url, "JWKS refresh failed, using stale keys");
                        Ok(entry.jwks.clone())
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Fetch JWKS from the endpoint.
    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::JwksUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::JwksUnavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::JwksUnavailable(e.to_string()))?;

        tracing::debug!(url = %self.jwks_url, keys = jwks.keys.len(), "Fetched JWKS");
        Ok(jwks)
    }

    /// Get the RSA decoding key for the given key ID.
    ///
    /// A miss against the cached set triggers one rate-limited refresh
    /// before failing with [`AuthError::NoMatchingKey`].
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let jwks = self.get_jwks().await?;
        if let Some(rsa) = find_rsa_key(&jwks, kid) {
            return rsa_decoding_key(rsa);
        }

        if !self.forced_refresh().await {
            return Err(AuthError::NoMatchingKey);
        }

        let jwks = self.get_jwks().await?;
        find_rsa_key(&jwks, kid)
            .ok_or(AuthError::NoMatchingKey)
            .and_then(rsa_decoding_key)
    }

    /// Refresh after a `kid` miss unless one happened recently.
    ///
    /// Returns whether the cache now holds a freshly fetched set.
    async fn forced_refresh(&self) -> bool {
        let mut last = self.last_forced_refresh.lock().await;
        if let Some(at) = *last {
            if at.elapsed() < self.min_refresh_interval {
                return false;
            }
        }
        *last = Some(Instant::now());

        match self.refresh().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = ?err, url = %self.jwks_url, "Forced JWKS refresh failed");
                false
            }
        }
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let jwks = self.fetch_jwks().await?;
        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks,
            fetched_at: Instant::now(),
        });
        Ok(())
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        let cache = self.cache.read().await;
        if let Some(entry) = &*cache {
            entry.fetched_at.elapsed() < self.cache_ttl
        } else {
            false
        }
    }
}

fn find_rsa_key<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a RSAKeyParameters> {
    jwks.keys
        .iter()
        .filter(|k| k.common.key_id.as_deref() == Some(kid))
        .find_map(|k| match &k.algorithm {
            AlgorithmParameters::RSA(rsa) => Some(rsa),
            _ => None,
        })
}

fn rsa_decoding_key(rsa: &RSAKeyParameters) -> Result<DecodingKey, AuthError> {
    DecodingKey::from_rsa_components(&rsa.n, &rsa.e).map_err(|e| {
        tracing::warn!(error = %e, "JWKS entry has unusable RSA components");
        AuthError::NoMatchingKey
    })
}
