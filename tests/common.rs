// ABOUTME: Shared test utilities for database and route tests
// ABOUTME: Builds in-memory server resources, session tokens, and seeded content
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code, missing_docs)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header};
use uuid::Uuid;

use stillpark_server::auth::SessionClaims;
use stillpark_server::config::ServerConfig;
use stillpark_server::context::ServerResources;
use stillpark_server::database::{Database, NewExperience, NewStep};
use stillpark_server::models::{Difficulty, Experience, ExperienceStatus, StepType, Visibility};

pub const SESSION_SECRET: &str = "test-session-secret";
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

/// Fresh in-memory database with migrations applied
pub async fn create_test_database() -> Database {
    Database::new("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

/// Fully-wired server resources over an in-memory database
pub async fn create_test_resources() -> Arc<ServerResources> {
    let database = create_test_database().await;
    let config = ServerConfig::for_testing(SESSION_SECRET, WEBHOOK_SECRET);
    Arc::new(ServerResources::new(database, config))
}

/// Bearer header for a session token signed with the test secret
pub fn auth_header(user_id: Uuid, email: &str) -> String {
    format!("Bearer {}", session_token(user_id, email, Utc::now() + chrono::Duration::hours(1)))
}

/// Session token with an explicit expiry
pub fn session_token(user_id: Uuid, email: &str, expires_at: DateTime<Utc>) -> String {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        email: Some(email.to_owned()),
        exp: expires_at.timestamp(),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SESSION_SECRET.as_bytes()),
    )
    .expect("Failed to sign test token")
}

/// Create a profile and promote it to admin directly in the store
pub async fn create_admin_profile(resources: &ServerResources, email: &str) -> Uuid {
    let user_id = Uuid::new_v4();
    resources
        .database
        .get_or_create_profile(user_id, email, resources.config.trial_duration)
        .await
        .expect("Failed to create admin profile");
    resources
        .database
        .update_profile_role(user_id, stillpark_server::models::ProfileRole::Admin)
        .await
        .expect("Failed to promote admin profile");
    user_id
}

/// Force a profile's trial window into the past
pub async fn expire_trial(database: &Database, user_id: Uuid) {
    sqlx::query("UPDATE profiles SET trial_expires_at = ?1 WHERE id = ?2")
        .bind(Utc::now() - chrono::Duration::days(1))
        .bind(user_id.to_string())
        .execute(database.pool())
        .await
        .expect("Failed to expire trial");
}

/// Seed a published experience with the given visibility and step count
pub async fn seed_experience(
    database: &Database,
    visibility: Visibility,
    step_count: usize,
) -> Experience {
    seed_experience_with_status(database, ExperienceStatus::Published, visibility, step_count)
        .await
}

/// Seed an experience with explicit status, visibility, and step count
pub async fn seed_experience_with_status(
    database: &Database,
    status: ExperienceStatus,
    visibility: Visibility,
    step_count: usize,
) -> Experience {
    let experience = database
        .create_experience(&NewExperience {
            title: "Test Experience".to_owned(),
            description: "A seeded experience".to_owned(),
            status: Some(status),
            visibility: Some(visibility),
            difficulty: Some(Difficulty::Easy),
            order_index: None,
            duration_min: Some(5),
            cover_emoji: None,
        })
        .await
        .expect("Failed to seed experience");

    for index in 0..step_count {
        database
            .create_step(
                experience.id,
                &NewStep {
                    order_index: index as i64,
                    title: format!("Step {index}"),
                    content: format!("Content for step {index}"),
                    step_type: Some(StepType::Text),
                    duration_sec: Some(30),
                },
            )
            .await
            .expect("Failed to seed step");
    }

    experience
}
