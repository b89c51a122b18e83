// ABOUTME: Unit tests for the pure trial policy decision table
// ABOUTME: Validates trial boundaries, premium override, admin gate, and anonymous limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::{Duration, Utc};
use uuid::Uuid;

use stillpark_server::gate::{
    evaluate_access, AccessDecision, ContentTarget, RedirectReason,
};
use stillpark_server::models::{Identity, Plan, Profile, ProfileRole};

const ANON_LIMIT: u32 = 2;

fn authed_identity(profile: &Profile) -> Identity {
    Identity::User {
        id: profile.id,
        email: profile.email.clone(),
    }
}

fn free_profile(trial_offset: Duration) -> Profile {
    let mut profile = Profile::new(
        Uuid::new_v4(),
        "member@example.com".to_owned(),
        Duration::days(7),
    );
    profile.trial_expires_at = Some(Utc::now() + trial_offset);
    profile
}

fn premium_profile() -> Profile {
    let mut profile = free_profile(Duration::days(7));
    profile.plan = Plan::Premium;
    profile.is_premium = true;
    profile
}

#[test]
fn test_trial_boundary_allows_just_before_expiry() {
    let now = Utc::now();
    let mut profile = free_profile(Duration::zero());
    profile.trial_expires_at = Some(now + Duration::seconds(1));
    let identity = authed_identity(&profile);

    for target in [ContentTarget::public(), ContentTarget::premium()] {
        let decision = evaluate_access(&identity, Some(&profile), 0, ANON_LIMIT, target, now);
        assert_eq!(decision, AccessDecision::Allow);
    }
}

#[test]
fn test_trial_boundary_redirects_just_after_expiry() {
    let now = Utc::now();
    let mut profile = free_profile(Duration::zero());
    profile.trial_expires_at = Some(now - Duration::seconds(1));
    let identity = authed_identity(&profile);

    // An expired trial locks the whole app, free content included
    for target in [ContentTarget::public(), ContentTarget::premium()] {
        let decision = evaluate_access(&identity, Some(&profile), 0, ANON_LIMIT, target, now);
        assert_eq!(
            decision,
            AccessDecision::RedirectToSubscribe {
                reason: Some(RedirectReason::Expired)
            }
        );
    }
}

#[test]
fn test_premium_overrides_any_trial_timestamp() {
    let now = Utc::now();
    let mut profile = premium_profile();
    profile.trial_expires_at = Some(now - Duration::days(365));
    let identity = authed_identity(&profile);

    for target in [ContentTarget::public(), ContentTarget::premium()] {
        let decision = evaluate_access(&identity, Some(&profile), 0, ANON_LIMIT, target, now);
        assert_eq!(decision, AccessDecision::Allow);
    }
}

#[test]
fn test_null_trial_expiry_never_expires() {
    let now = Utc::now();
    let mut profile = free_profile(Duration::days(7));
    profile.trial_expires_at = None;
    let identity = authed_identity(&profile);

    let decision = evaluate_access(
        &identity,
        Some(&profile),
        0,
        ANON_LIMIT,
        ContentTarget::public(),
        now,
    );
    assert_eq!(decision, AccessDecision::Allow);
}

#[test]
fn test_admin_route_rejects_non_admin_regardless_of_plan() {
    let now = Utc::now();
    let premium = premium_profile();
    let expired = free_profile(Duration::days(-10));

    for profile in [&premium, &expired] {
        let identity = authed_identity(profile);
        let decision = evaluate_access(
            &identity,
            Some(profile),
            0,
            ANON_LIMIT,
            ContentTarget::admin(),
            now,
        );
        assert_eq!(decision, AccessDecision::RedirectToHome);
    }
}

#[test]
fn test_admin_route_rejects_anonymous() {
    let decision = evaluate_access(
        &Identity::Anonymous,
        None,
        0,
        ANON_LIMIT,
        ContentTarget::admin(),
        Utc::now(),
    );
    assert_eq!(decision, AccessDecision::RedirectToHome);
}

#[test]
fn test_admin_route_allows_admin() {
    let now = Utc::now();
    let mut profile = free_profile(Duration::days(7));
    profile.role = ProfileRole::Admin;
    let identity = authed_identity(&profile);

    let decision = evaluate_access(
        &identity,
        Some(&profile),
        0,
        ANON_LIMIT,
        ContentTarget::admin(),
        now,
    );
    assert_eq!(decision, AccessDecision::Allow);
}

#[test]
fn test_anonymous_below_limit_allowed_on_free_content() {
    let decision = evaluate_access(
        &Identity::Anonymous,
        None,
        ANON_LIMIT - 1,
        ANON_LIMIT,
        ContentTarget::public(),
        Utc::now(),
    );
    assert_eq!(decision, AccessDecision::Allow);
}

#[test]
fn test_anonymous_at_limit_denied_free_content() {
    let decision = evaluate_access(
        &Identity::Anonymous,
        None,
        ANON_LIMIT,
        ANON_LIMIT,
        ContentTarget::public(),
        Utc::now(),
    );
    assert_eq!(decision, AccessDecision::RedirectToLogin);
}

#[test]
fn test_anonymous_never_sees_premium_content() {
    let decision = evaluate_access(
        &Identity::Anonymous,
        None,
        0,
        ANON_LIMIT,
        ContentTarget::premium(),
        Utc::now(),
    );
    assert_eq!(decision, AccessDecision::RedirectToLogin);
}

#[test]
fn test_profile_unavailable_fails_closed_for_premium_only() {
    let now = Utc::now();
    let identity = Identity::User {
        id: Uuid::new_v4(),
        email: "member@example.com".to_owned(),
    };

    // Public content still served when the profile store is down
    let decision = evaluate_access(&identity, None, 0, ANON_LIMIT, ContentTarget::public(), now);
    assert_eq!(decision, AccessDecision::Allow);

    // Gated content is denied
    let decision = evaluate_access(&identity, None, 0, ANON_LIMIT, ContentTarget::premium(), now);
    assert_eq!(decision, AccessDecision::RedirectToSubscribe { reason: None });

    let decision = evaluate_access(&identity, None, 0, ANON_LIMIT, ContentTarget::admin(), now);
    assert_eq!(decision, AccessDecision::RedirectToHome);
}

#[test]
fn test_redirect_paths_are_deterministic() {
    assert_eq!(AccessDecision::Allow.redirect_path(), None);
    assert_eq!(
        AccessDecision::RedirectToLogin.redirect_path().as_deref(),
        Some("/login")
    );
    assert_eq!(
        AccessDecision::RedirectToHome.redirect_path().as_deref(),
        Some("/")
    );
    assert_eq!(
        AccessDecision::RedirectToSubscribe { reason: None }
            .redirect_path()
            .as_deref(),
        Some("/subscribe")
    );
    assert_eq!(
        AccessDecision::RedirectToSubscribe {
            reason: Some(RedirectReason::Expired)
        }
        .redirect_path()
        .as_deref(),
        Some("/subscribe?reason=expired")
    );
}
