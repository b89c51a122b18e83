// ABOUTME: Unit tests for progress tracking
// ABOUTME: Validates monotonic advancement, completion pinning, restart, and race behavior
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{create_test_database, seed_experience};
use stillpark_server::models::Visibility;
use uuid::Uuid;

#[tokio::test]
async fn test_ensure_started_creates_fresh_row() {
    let db = create_test_database().await;
    let experience = seed_experience(&db, Visibility::Free, 3).await;
    let user_id = Uuid::new_v4();

    let progress = db
        .ensure_progress_started(user_id, experience.id)
        .await
        .unwrap();
    assert_eq!(progress.current_step, 0);
    assert!(!progress.completed);
}

#[tokio::test]
async fn test_ensure_started_does_not_reset_in_progress_row() {
    let db = create_test_database().await;
    let experience = seed_experience(&db, Visibility::Free, 3).await;
    let user_id = Uuid::new_v4();

    db.ensure_progress_started(user_id, experience.id)
        .await
        .unwrap();
    db.advance_progress(user_id, experience.id, 3).await.unwrap();

    let again = db
        .ensure_progress_started(user_id, experience.id)
        .await
        .unwrap();
    assert_eq!(again.current_step, 1);
    assert!(!again.completed);
}

#[tokio::test]
async fn test_three_step_advancement_sequence() {
    let db = create_test_database().await;
    let experience = seed_experience(&db, Visibility::Free, 3).await;
    let user_id = Uuid::new_v4();

    db.ensure_progress_started(user_id, experience.id)
        .await
        .unwrap();

    let first = db.advance_progress(user_id, experience.id, 3).await.unwrap();
    assert_eq!(first.current_step, 1);
    assert!(!first.completed);

    let second = db.advance_progress(user_id, experience.id, 3).await.unwrap();
    assert_eq!(second.current_step, 2);
    assert!(!second.completed);

    // Third advance completes; current_step stays at the last valid index
    let third = db.advance_progress(user_id, experience.id, 3).await.unwrap();
    assert_eq!(third.current_step, 2);
    assert!(third.completed);

    // Fourth advance is a no-op on a completed row
    let fourth = db.advance_progress(user_id, experience.id, 3).await.unwrap();
    assert_eq!(fourth.current_step, 2);
    assert!(fourth.completed);
}

#[tokio::test]
async fn test_advance_on_single_step_experience() {
    let db = create_test_database().await;
    let experience = seed_experience(&db, Visibility::Free, 1).await;
    let user_id = Uuid::new_v4();

    let progress = db.advance_progress(user_id, experience.id, 1).await.unwrap();
    assert_eq!(progress.current_step, 0);
    assert!(progress.completed);
}

#[tokio::test]
async fn test_advance_rejects_zero_step_count() {
    let db = create_test_database().await;
    let experience = seed_experience(&db, Visibility::Free, 0).await;
    let user_id = Uuid::new_v4();

    let result = db.advance_progress(user_id, experience.id, 0).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_restart_resets_completed_row() {
    let db = create_test_database().await;
    let experience = seed_experience(&db, Visibility::Free, 2).await;
    let user_id = Uuid::new_v4();

    db.advance_progress(user_id, experience.id, 2).await.unwrap();
    let done = db.advance_progress(user_id, experience.id, 2).await.unwrap();
    assert!(done.completed);

    let restarted = db.restart_progress(user_id, experience.id).await.unwrap();
    assert_eq!(restarted.current_step, 0);
    assert!(!restarted.completed);
}

#[tokio::test]
async fn test_restart_is_noop_on_in_progress_row() {
    let db = create_test_database().await;
    let experience = seed_experience(&db, Visibility::Free, 3).await;
    let user_id = Uuid::new_v4();

    db.advance_progress(user_id, experience.id, 3).await.unwrap();

    let result = db.restart_progress(user_id, experience.id).await.unwrap();
    assert_eq!(result.current_step, 1);
    assert!(!result.completed);
}

#[tokio::test]
async fn test_restart_without_progress_errors() {
    let db = create_test_database().await;
    let experience = seed_experience(&db, Visibility::Free, 3).await;

    let result = db.restart_progress(Uuid::new_v4(), experience.id).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_concurrent_advance_moves_one_step() {
    let db = create_test_database().await;
    let experience = seed_experience(&db, Visibility::Free, 5).await;
    let user_id = Uuid::new_v4();

    db.ensure_progress_started(user_id, experience.id)
        .await
        .unwrap();

    // Two racing advances from the same observed state must not both land
    let (a, b) = tokio::join!(
        db.advance_progress(user_id, experience.id, 5),
        db.advance_progress(user_id, experience.id, 5),
    );
    a.unwrap();
    b.unwrap();

    let row = db
        .get_progress(user_id, experience.id)
        .await
        .unwrap()
        .unwrap();
    assert!(
        row.current_step <= 2,
        "two racing advances pushed the row to step {}",
        row.current_step
    );
}

#[tokio::test]
async fn test_progress_isolated_per_experience() {
    let db = create_test_database().await;
    let first = seed_experience(&db, Visibility::Free, 3).await;
    let second = seed_experience(&db, Visibility::Free, 3).await;
    let user_id = Uuid::new_v4();

    db.advance_progress(user_id, first.id, 3).await.unwrap();

    let untouched = db.get_progress(user_id, second.id).await.unwrap();
    assert!(untouched.is_none());
}

#[tokio::test]
async fn test_progress_stats() {
    let db = create_test_database().await;
    let done = seed_experience(&db, Visibility::Free, 1).await;
    let open = seed_experience(&db, Visibility::Free, 3).await;
    let user_id = Uuid::new_v4();

    db.advance_progress(user_id, done.id, 1).await.unwrap();
    db.ensure_progress_started(user_id, open.id).await.unwrap();

    let stats = db.get_progress_stats(user_id).await.unwrap();
    assert_eq!(stats.total_completed, 1);
    assert_eq!(stats.in_progress, 1);
    assert!(stats.last_activity.is_some());
}

#[tokio::test]
async fn test_progress_stats_empty() {
    let db = create_test_database().await;
    let stats = db.get_progress_stats(Uuid::new_v4()).await.unwrap();
    assert_eq!(stats.total_completed, 0);
    assert_eq!(stats.in_progress, 0);
    assert!(stats.last_activity.is_none());
}
