// ABOUTME: Trial policy and access gating decisions
// ABOUTME: Pure decision table plus the composition root combining resolver, profile store, and cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

//! # Access Gate
//!
//! Every content request passes through one decision: allow, or redirect to a
//! deterministic target. The policy itself ([`evaluate_access`]) is a pure
//! function over the resolved identity, the profile row, the client-reported
//! anonymous view counter, and the request target, which makes the trial
//! boundary directly testable with an injected clock.
//!
//! The trial is time-boxed from profile creation, not from content-open
//! events, so it cannot be reset by avoiding premium content. Premium status
//! is a permanent override regardless of trial timestamps. An expired trial
//! locks the whole application, including nominally free content.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::auth::IdentityResolver;
use crate::cache::ProfileCache;
use crate::constants::redirects;
use crate::database::Database;
use crate::models::{Identity, Profile, ProfileRole};

/// The content target a request is asking for
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentTarget {
    /// Whether the target requires a premium plan
    pub is_premium_content: bool,
    /// Whether the target belongs to the admin surface
    pub is_admin_route: bool,
}

impl ContentTarget {
    /// A non-premium, non-admin content target
    #[must_use]
    pub const fn public() -> Self {
        Self {
            is_premium_content: false,
            is_admin_route: false,
        }
    }

    /// A premium content target
    #[must_use]
    pub const fn premium() -> Self {
        Self {
            is_premium_content: true,
            is_admin_route: false,
        }
    }

    /// An admin-surface target
    #[must_use]
    pub const fn admin() -> Self {
        Self {
            is_premium_content: false,
            is_admin_route: true,
        }
    }
}

/// Why a subscribe redirect was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// The caller's trial window has closed
    Expired,
}

/// Outcome of a gating decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Serve the content
    Allow,
    /// Send the caller to the login page
    RedirectToLogin,
    /// Send the caller to the home page (admin-route rejection)
    RedirectToHome,
    /// Send the caller to the subscription page
    RedirectToSubscribe {
        /// Optional reason surfaced to the UI as a query parameter
        reason: Option<RedirectReason>,
    },
}

impl AccessDecision {
    /// Redirect target path, or `None` when access is allowed
    #[must_use]
    pub fn redirect_path(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin => Some(redirects::LOGIN.to_owned()),
            Self::RedirectToHome => Some(redirects::HOME.to_owned()),
            Self::RedirectToSubscribe { reason } => Some(match reason {
                Some(RedirectReason::Expired) => {
                    format!("{}?{}", redirects::SUBSCRIBE, redirects::REASON_EXPIRED)
                }
                None => redirects::SUBSCRIBE.to_owned(),
            }),
        }
    }
}

/// Pure gating decision; first matching rule wins
///
/// `profile` is `None` for anonymous callers, and also for authenticated
/// callers whose profile could not be read; the latter degrades to the most
/// conservative safe state: gated content is denied, public content is still
/// served.
#[must_use]
pub fn evaluate_access(
    identity: &Identity,
    profile: Option<&Profile>,
    anonymous_views: u32,
    anon_view_limit: u32,
    target: ContentTarget,
    now: DateTime<Utc>,
) -> AccessDecision {
    if target.is_admin_route {
        let is_admin = profile.is_some_and(|p| p.role == ProfileRole::Admin);
        if !is_admin {
            return AccessDecision::RedirectToHome;
        }
        return AccessDecision::Allow;
    }

    if identity.is_anonymous() {
        if !target.is_premium_content && anonymous_views < anon_view_limit {
            return AccessDecision::Allow;
        }
        return AccessDecision::RedirectToLogin;
    }

    let Some(profile) = profile else {
        // Authenticated caller, profile store unavailable
        if target.is_premium_content {
            return AccessDecision::RedirectToSubscribe { reason: None };
        }
        return AccessDecision::Allow;
    };

    if profile.is_premium {
        return AccessDecision::Allow;
    }

    if profile.trial_expired_at(now) {
        return AccessDecision::RedirectToSubscribe {
            reason: Some(RedirectReason::Expired),
        };
    }

    AccessDecision::Allow
}

/// Result of authorizing one request
#[derive(Debug, Clone)]
pub struct Authorization {
    /// Resolved caller identity
    pub identity: Identity,
    /// Profile row when one could be read
    pub profile: Option<Profile>,
    /// Gating decision for the requested target
    pub decision: AccessDecision,
}

/// Composition root combining resolver, profile store, cache, and policy
pub struct AccessGate {
    resolver: IdentityResolver,
    database: Arc<Database>,
    cache: Arc<ProfileCache>,
    trial_duration: chrono::Duration,
    anon_view_limit: u32,
}

impl AccessGate {
    /// Create an access gate over explicitly-injected collaborators
    #[must_use]
    pub fn new(
        resolver: IdentityResolver,
        database: Arc<Database>,
        cache: Arc<ProfileCache>,
        trial_duration: chrono::Duration,
        anon_view_limit: u32,
    ) -> Self {
        Self {
            resolver,
            database,
            cache,
            trial_duration,
            anon_view_limit,
        }
    }

    /// Authorize a request against a content target
    ///
    /// Never fails: identity resolution fails closed to anonymous, and a
    /// profile store failure degrades the decision rather than erroring.
    pub async fn authorize(
        &self,
        credential: Option<&str>,
        anonymous_views: u32,
        target: ContentTarget,
    ) -> Authorization {
        let identity = self.resolver.resolve(credential);
        let profile = self.load_profile(&identity).await;
        let decision = evaluate_access(
            &identity,
            profile.as_ref(),
            anonymous_views,
            self.anon_view_limit,
            target,
            Utc::now(),
        );

        Authorization {
            identity,
            profile,
            decision,
        }
    }

    /// Get-or-sync the caller's profile through the read cache
    async fn load_profile(&self, identity: &Identity) -> Option<Profile> {
        let Identity::User { id, email } = identity else {
            return None;
        };

        if let Some(cached) = self.cache.get(*id) {
            return Some(cached);
        }

        match self
            .database
            .get_or_create_profile(*id, email, self.trial_duration)
            .await
        {
            Ok(profile) => {
                self.cache.insert(profile.clone());
                Some(profile)
            }
            Err(e) => {
                warn!(user_id = %id, error = %e, "Profile unavailable, gating conservatively");
                None
            }
        }
    }
}
