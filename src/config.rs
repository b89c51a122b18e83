// ABOUTME: Environment-only server configuration
// ABOUTME: Reads ports, secrets, and policy overrides from the process environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

use std::env;
use std::time::Duration;

use crate::constants::defaults;
use crate::errors::{AppError, AppResult};

/// Server configuration resolved from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port (`STILLPARK_HTTP_PORT`)
    pub http_port: u16,
    /// Database connection string (`DATABASE_URL`)
    pub database_url: String,
    /// HS256 secret validating session tokens (`SESSION_SECRET`)
    pub session_secret: String,
    /// Shared secret verifying billing webhook signatures (`BILLING_WEBHOOK_SECRET`)
    pub webhook_secret: String,
    /// Trial window granted at profile creation (`TRIAL_DURATION_DAYS`)
    pub trial_duration: chrono::Duration,
    /// Gated views allowed to anonymous visitors (`ANON_VIEW_LIMIT`)
    pub anon_view_limit: u32,
    /// TTL of the profile read cache (`PROFILE_CACHE_TTL_SECS`)
    pub profile_cache_ttl: Duration,
    /// Accepted webhook timestamp skew (`WEBHOOK_TOLERANCE_SECS`)
    pub webhook_tolerance_secs: i64,
}

impl ServerConfig {
    /// Load configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A required secret (`SESSION_SECRET`, `BILLING_WEBHOOK_SECRET`) is missing
    /// - A numeric override cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| AppError::config("SESSION_SECRET environment variable is required"))?;
        let webhook_secret = env::var("BILLING_WEBHOOK_SECRET").map_err(|_| {
            AppError::config("BILLING_WEBHOOK_SECRET environment variable is required")
        })?;

        Ok(Self {
            http_port: parse_env("STILLPARK_HTTP_PORT", defaults::HTTP_PORT)?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_owned()),
            session_secret,
            webhook_secret,
            trial_duration: chrono::Duration::days(parse_env(
                "TRIAL_DURATION_DAYS",
                defaults::TRIAL_DURATION_DAYS,
            )?),
            anon_view_limit: parse_env("ANON_VIEW_LIMIT", defaults::ANON_VIEW_LIMIT)?,
            profile_cache_ttl: Duration::from_secs(parse_env(
                "PROFILE_CACHE_TTL_SECS",
                defaults::PROFILE_CACHE_TTL_SECS,
            )?),
            webhook_tolerance_secs: parse_env(
                "WEBHOOK_TOLERANCE_SECS",
                defaults::WEBHOOK_TOLERANCE_SECS,
            )?,
        })
    }

    /// In-memory configuration for tests
    #[must_use]
    pub fn for_testing(session_secret: &str, webhook_secret: &str) -> Self {
        Self {
            http_port: 0,
            database_url: "sqlite::memory:".to_owned(),
            session_secret: session_secret.to_owned(),
            webhook_secret: webhook_secret.to_owned(),
            trial_duration: chrono::Duration::days(defaults::TRIAL_DURATION_DAYS),
            anon_view_limit: defaults::ANON_VIEW_LIMIT,
            profile_cache_ttl: Duration::from_secs(defaults::PROFILE_CACHE_TTL_SECS),
            webhook_tolerance_secs: defaults::WEBHOOK_TOLERANCE_SECS,
        }
    }
}

/// Parse an environment override, falling back to the given default when unset
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("Invalid value for {name}: {raw}"))),
        Err(_) => Ok(default),
    }
}
