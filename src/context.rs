// ABOUTME: Dependency-injected server resources shared across route handlers
// ABOUTME: Explicit construction replaces ambient process-level singletons
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

use std::sync::Arc;

use crate::auth::IdentityResolver;
use crate::billing::{PlanSynchronizer, WebhookVerifier};
use crate::cache::ProfileCache;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::gate::AccessGate;

/// Shared resources handed to every route handler
pub struct ServerResources {
    /// Database connection pool
    pub database: Arc<Database>,
    /// Resolved server configuration
    pub config: ServerConfig,
    /// Credential-to-identity resolver
    pub identity: IdentityResolver,
    /// Short-TTL profile read cache
    pub profile_cache: Arc<ProfileCache>,
    /// Gating composition root
    pub gate: AccessGate,
    /// Billing event applier
    pub plan_sync: PlanSynchronizer,
    /// Billing webhook signature verifier
    pub webhook_verifier: WebhookVerifier,
}

impl ServerResources {
    /// Wire all components from a database handle and configuration
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        let database = Arc::new(database);
        let profile_cache = Arc::new(ProfileCache::new(config.profile_cache_ttl));
        let identity = IdentityResolver::new(&config.session_secret);
        let gate = AccessGate::new(
            identity.clone(),
            database.clone(),
            profile_cache.clone(),
            config.trial_duration,
            config.anon_view_limit,
        );
        let plan_sync = PlanSynchronizer::new(database.clone(), profile_cache.clone());
        let webhook_verifier =
            WebhookVerifier::new(&config.webhook_secret, config.webhook_tolerance_secs);

        Self {
            database,
            config,
            identity,
            profile_cache,
            gate,
            plan_sync,
            webhook_verifier,
        }
    }
}
