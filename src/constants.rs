// ABOUTME: Application constants and policy defaults
// ABOUTME: Centralizes trial policy values, redirect targets, and header names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

/// Policy defaults, overridable through `ServerConfig`
pub mod defaults {
    /// Trial window granted at profile creation
    pub const TRIAL_DURATION_DAYS: i64 = 7;
    /// Gated views an anonymous visitor may consume before login is required
    pub const ANON_VIEW_LIMIT: u32 = 2;
    /// TTL for the profile read cache; a read optimization, not a consistency mechanism
    pub const PROFILE_CACHE_TTL_SECS: u64 = 5;
    /// Accepted clock skew for billing webhook signatures
    pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;
    /// Default HTTP listen port
    pub const HTTP_PORT: u16 = 8081;
    /// Default database location
    pub const DATABASE_URL: &str = "sqlite:./data/stillpark.db";
}

/// Redirect targets for gating denials
pub mod redirects {
    /// Login page for anonymous visitors past their trial views
    pub const LOGIN: &str = "/login";
    /// Subscription page for expired trials and premium content
    pub const SUBSCRIBE: &str = "/subscribe";
    /// Home page for rejected admin-route requests
    pub const HOME: &str = "/";
    /// Query parameter appended when a trial has expired
    pub const REASON_EXPIRED: &str = "reason=expired";
}

/// Request header names
pub mod headers {
    /// Client-reported anonymous gated-view counter (advisory, not trusted)
    pub const TRIAL_VIEWS: &str = "x-trial-views";
    /// Billing webhook signature header (`t=<unix>,v1=<hex>`)
    pub const WEBHOOK_SIGNATURE: &str = "webhook-signature";
    /// Session cookie carrying the signed identity token
    pub const SESSION_COOKIE: &str = "session_token";
}
