// ABOUTME: Integration tests for the admin surface
// ABOUTME: Validates role gating, content CRUD, reordering, role updates, and bootstrap
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{auth_header, create_admin_profile, create_test_resources, seed_experience};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};
use stillpark_server::models::Visibility;
use stillpark_server::routes;
use uuid::Uuid;

#[tokio::test]
async fn test_admin_routes_reject_anonymous() {
    let resources = create_test_resources().await;
    let router = routes::router(resources);

    let response = AxumTestRequest::get("/api/admin/experiences").send(router).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_regular_members() {
    let resources = create_test_resources().await;
    let router = routes::router(resources);

    let response = AxumTestRequest::get("/api/admin/experiences")
        .header("authorization", &auth_header(Uuid::new_v4(), "member@example.com"))
        .send(router)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bootstrap_promotes_only_first_caller() {
    let resources = create_test_resources().await;
    let router = routes::router(resources.clone());

    let first = Uuid::new_v4();
    let response = AxumTestRequest::post("/api/admin/bootstrap")
        .header("authorization", &auth_header(first, "first@example.com"))
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // The promoted caller can now use the admin surface
    let response = AxumTestRequest::get("/api/admin/experiences")
        .header("authorization", &auth_header(first, "first@example.com"))
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // A second bootstrap attempt is rejected
    let second = Uuid::new_v4();
    let response = AxumTestRequest::post("/api/admin/bootstrap")
        .header("authorization", &auth_header(second, "second@example.com"))
        .send(router)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_experience_crud_lifecycle() {
    let resources = create_test_resources().await;
    let admin_id = create_admin_profile(&resources, "staff@example.com").await;
    let auth = auth_header(admin_id, "staff@example.com");
    let router = routes::router(resources.clone());

    // Create
    let response = AxumTestRequest::post("/api/admin/experiences")
        .header("authorization", &auth)
        .json(&json!({ "title": "New Experience", "description": "Fresh" }))
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    let id = created["id"].as_str().unwrap().to_owned();
    assert_eq!(created["status"], "draft");
    assert_eq!(created["visibility"], "hidden");

    // Update to published
    let response = AxumTestRequest::put(&format!("/api/admin/experiences/{id}"))
        .header("authorization", &auth)
        .json(&json!({
            "title": "New Experience",
            "description": "Fresh",
            "status": "published",
            "visibility": "free",
            "difficulty": "easy",
            "duration_min": 12
        }))
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["status"], "published");

    // Now listed publicly
    let listed = resources.database.list_published_experiences().await.unwrap();
    assert_eq!(listed.len(), 1);

    // Delete
    let response = AxumTestRequest::delete(&format!("/api/admin/experiences/{id}"))
        .header("authorization", &auth)
        .send(router)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert!(resources
        .database
        .list_published_experiences()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_step_crud_and_reorder() {
    let resources = create_test_resources().await;
    let admin_id = create_admin_profile(&resources, "staff@example.com").await;
    let auth = auth_header(admin_id, "staff@example.com");
    let experience = seed_experience(&resources.database, Visibility::Free, 0).await;
    let router = routes::router(resources.clone());

    // Create two steps
    let mut step_ids = Vec::new();
    for index in 0..2 {
        let response = AxumTestRequest::post(&format!(
            "/api/admin/experiences/{}/steps",
            experience.id
        ))
        .header("authorization", &auth)
        .json(&json!({
            "order_index": index,
            "title": format!("Step {index}"),
            "content": "Body",
            "step_type": "prompt",
            "duration_sec": 60
        }))
        .send(router.clone())
        .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let step: Value = response.json();
        step_ids.push(step["id"].as_str().unwrap().to_owned());
    }

    // Duplicate order_index is rejected
    let response = AxumTestRequest::post(&format!(
        "/api/admin/experiences/{}/steps",
        experience.id
    ))
    .header("authorization", &auth)
    .json(&json!({ "order_index": 0, "title": "Clash", "content": "" }))
    .send(router.clone())
    .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Swap the two steps
    let response = AxumTestRequest::patch(&format!(
        "/api/admin/experiences/{}/steps/reorder",
        experience.id
    ))
    .header("authorization", &auth)
    .json(&json!({ "items": [
        { "id": step_ids[0], "order_index": 1 },
        { "id": step_ids[1], "order_index": 0 }
    ]}))
    .send(router.clone())
    .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let steps = resources
        .database
        .get_experience_steps(experience.id)
        .await
        .unwrap();
    assert_eq!(steps[0].id.to_string(), step_ids[1]);

    // Duplicate indices in a reorder batch are rejected
    let response = AxumTestRequest::patch(&format!(
        "/api/admin/experiences/{}/steps/reorder",
        experience.id
    ))
    .header("authorization", &auth)
    .json(&json!({ "items": [
        { "id": step_ids[0], "order_index": 0 },
        { "id": step_ids[1], "order_index": 0 }
    ]}))
    .send(router.clone())
    .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Update and delete one step
    let response = AxumTestRequest::put(&format!("/api/admin/steps/{}", step_ids[0]))
        .header("authorization", &auth)
        .json(&json!({ "title": "Renamed", "content": "New", "step_type": "text" }))
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = AxumTestRequest::delete(&format!("/api/admin/steps/{}", step_ids[0]))
        .header("authorization", &auth)
        .send(router)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_reorder_experiences_rejects_duplicates() {
    let resources = create_test_resources().await;
    let admin_id = create_admin_profile(&resources, "staff@example.com").await;
    let auth = auth_header(admin_id, "staff@example.com");
    let a = seed_experience(&resources.database, Visibility::Free, 0).await;
    let b = seed_experience(&resources.database, Visibility::Free, 0).await;
    let router = routes::router(resources);

    let response = AxumTestRequest::patch("/api/admin/experiences/reorder")
        .header("authorization", &auth)
        .json(&json!({ "items": [
            { "id": a.id, "order_index": 3 },
            { "id": b.id, "order_index": 3 }
        ]}))
        .send(router)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_listing_and_role_update() {
    let resources = create_test_resources().await;
    let admin_id = create_admin_profile(&resources, "staff@example.com").await;
    let auth = auth_header(admin_id, "staff@example.com");

    let member_id = Uuid::new_v4();
    resources
        .database
        .get_or_create_profile(member_id, "member@example.com", chrono::Duration::days(7))
        .await
        .unwrap();

    let router = routes::router(resources.clone());

    let response = AxumTestRequest::get("/api/admin/profiles")
        .header("authorization", &auth)
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["total"], 2);

    // Promote the member
    let response = AxumTestRequest::put(&format!("/api/admin/profiles/{member_id}/role"))
        .header("authorization", &auth)
        .json(&json!({ "role": "admin" }))
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["role"], "admin");

    // The promoted member can now reach the admin surface
    let response = AxumTestRequest::get("/api/admin/experiences")
        .header("authorization", &auth_header(member_id, "member@example.com"))
        .send(router)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}
