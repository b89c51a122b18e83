// ABOUTME: Progress tracking API route handlers
// ABOUTME: Entitlement-checked start/advance/restart plus per-user completion stats
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extract_credential;
use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};
use crate::gate::{AccessDecision, ContentTarget};
use crate::models::ProfileRole;
use crate::routes::{anonymous_views, require_user};

/// Requested progress mutation
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressAction {
    /// Create the row on first entry
    Start,
    /// Move one step forward
    Advance,
    /// Reset a completed experience to its first step
    Restart,
}

/// Progress mutation request
#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    /// Experience being traversed
    pub experience_id: Uuid,
    /// Mutation to apply
    pub action: ProgressAction,
}

/// Progress routes
pub struct ProgressRoutes;

impl ProgressRoutes {
    /// Create all progress routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/progress", post(Self::handle_progress))
            .route("/api/progress/stats", get(Self::handle_stats))
            .with_state(resources)
    }

    /// Apply a progress mutation for the authenticated caller
    ///
    /// The caller must be entitled to the experience: a progress row is only
    /// ever created for content the user could open.
    async fn handle_progress(
        State(resources): State<Arc<ServerResources>>,
        header_map: HeaderMap,
        Json(request): Json<ProgressRequest>,
    ) -> AppResult<Response> {
        let (user_id, _) = require_user(&resources, &header_map)?;

        let experience = resources
            .database
            .get_experience(request.experience_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Experience with id: {}", request.experience_id))
            })?;

        let target = if experience.is_premium() {
            ContentTarget::premium()
        } else {
            ContentTarget::public()
        };
        let credential = extract_credential(&header_map);
        let auth = resources
            .gate
            .authorize(credential.as_deref(), anonymous_views(&header_map), target)
            .await;

        let is_admin = auth
            .profile
            .as_ref()
            .is_some_and(|p| p.role == ProfileRole::Admin);
        if !experience.is_listable() && !is_admin {
            return Err(AppError::not_found(format!(
                "Experience with id: {}",
                request.experience_id
            )));
        }

        match auth.decision {
            AccessDecision::Allow => {}
            AccessDecision::RedirectToSubscribe { .. } => {
                return Err(AppError::permission_denied(
                    "A premium subscription is required for this experience",
                ));
            }
            AccessDecision::RedirectToLogin | AccessDecision::RedirectToHome => {
                return Err(AppError::permission_denied(
                    "Not entitled to this experience",
                ));
            }
        }

        let progress = match request.action {
            ProgressAction::Start => {
                resources
                    .database
                    .ensure_progress_started(user_id, experience.id)
                    .await?
            }
            ProgressAction::Advance => {
                let step_count = resources
                    .database
                    .count_experience_steps(experience.id)
                    .await?;
                resources
                    .database
                    .advance_progress(user_id, experience.id, step_count)
                    .await?
            }
            ProgressAction::Restart => {
                resources
                    .database
                    .restart_progress(user_id, experience.id)
                    .await?
            }
        };

        Ok(Json(progress).into_response())
    }

    /// Aggregate completion stats for the authenticated caller
    async fn handle_stats(
        State(resources): State<Arc<ServerResources>>,
        header_map: HeaderMap,
    ) -> AppResult<Response> {
        let (user_id, _) = require_user(&resources, &header_map)?;
        let stats = resources.database.get_progress_stats(user_id).await?;
        Ok(Json(stats).into_response())
    }
}
