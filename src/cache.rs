// ABOUTME: Short-TTL read cache for profile lookups
// ABOUTME: Explicitly constructed and dependency-injected; a read optimization, never a consistency mechanism
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

//! # Profile Read Cache
//!
//! Bursts of requests from the same client would otherwise hit the profile
//! store once per request. This cache absorbs those redundant reads behind a
//! bounded TTL of a few seconds. A cold cache must produce the same gating
//! decision as a warm one: entries hold only the profile row, and every
//! time-dependent decision is computed per request. Any plan or role write
//! invalidates the affected entry.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

use crate::models::Profile;

/// TTL-bounded map of profiles keyed by user id
pub struct ProfileCache {
    entries: DashMap<Uuid, CachedProfile>,
    ttl: Duration,
}

struct CachedProfile {
    profile: Profile,
    fetched_at: Instant,
}

impl ProfileCache {
    /// Create a cache with an explicit TTL
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fetch a fresh entry, evicting it when stale
    #[must_use]
    pub fn get(&self, user_id: Uuid) -> Option<Profile> {
        let entry = self.entries.get(&user_id)?;
        if entry.fetched_at.elapsed() > self.ttl {
            drop(entry);
            self.entries.remove(&user_id);
            return None;
        }
        Some(entry.profile.clone())
    }

    /// Store a freshly-read profile
    pub fn insert(&self, profile: Profile) {
        self.entries.insert(
            profile.id,
            CachedProfile {
                profile,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drop the entry for a user after any profile mutation
    pub fn invalidate(&self, user_id: Uuid) {
        self.entries.remove(&user_id);
    }
}
