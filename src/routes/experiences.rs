// ABOUTME: Public content route handlers with trial gating
// ABOUTME: Serves the experience catalog and individual experiences with steps and progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

//! Content routes
//!
//! Every content request passes the access gate before anything is served.
//! Denials resolve to deterministic redirects (login, subscribe, home); the
//! catalog itself counts as non-premium content, while an individual
//! experience is gated by its own visibility.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::extract_credential;
use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};
use crate::gate::ContentTarget;
use crate::models::{Experience, ExperienceStep, ProfileRole, UserProgress};
use crate::routes::{anonymous_views, redirect_for};

/// Catalog entry exposed to consumers
#[derive(Debug, Clone, Serialize)]
pub struct ExperienceSummary {
    /// Experience id
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Catalog description
    pub description: String,
    /// Position in the catalog
    pub order_index: i64,
    /// Estimated duration in minutes
    pub duration_min: i64,
    /// Editorial difficulty rating
    pub difficulty: String,
    /// Optional cover emoji
    pub cover_emoji: Option<String>,
    /// Whether a premium plan is required
    pub is_premium: bool,
}

impl From<&Experience> for ExperienceSummary {
    fn from(exp: &Experience) -> Self {
        Self {
            id: exp.id,
            title: exp.title.clone(),
            description: exp.description.clone(),
            order_index: exp.order_index,
            duration_min: exp.duration_min,
            difficulty: exp.difficulty.as_str().to_owned(),
            cover_emoji: exp.cover_emoji.clone(),
            is_premium: exp.is_premium(),
        }
    }
}

/// Catalog listing response
#[derive(Debug, Serialize)]
pub struct ListExperiencesResponse {
    /// Catalog entries in display order
    pub experiences: Vec<ExperienceSummary>,
    /// Entry count
    pub total: usize,
}

/// Single experience response with steps and caller progress
#[derive(Debug, Serialize)]
pub struct ExperienceDetailResponse {
    /// Catalog entry
    pub experience: ExperienceSummary,
    /// Ordered steps
    pub steps: Vec<ExperienceStep>,
    /// Caller's progress, when authenticated and started
    pub progress: Option<UserProgress>,
}

/// Content routes
pub struct ExperienceRoutes;

impl ExperienceRoutes {
    /// Create all content routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/experiences", get(Self::handle_list))
            .route("/api/experiences/:id", get(Self::handle_detail))
            .with_state(resources)
    }

    /// List the published catalog
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        header_map: HeaderMap,
    ) -> AppResult<Response> {
        let credential = extract_credential(&header_map);
        let auth = resources
            .gate
            .authorize(
                credential.as_deref(),
                anonymous_views(&header_map),
                ContentTarget::public(),
            )
            .await;

        if let Some(redirect) = redirect_for(&auth.decision) {
            return Ok(redirect);
        }

        let experiences = resources.database.list_published_experiences().await?;
        let summaries: Vec<ExperienceSummary> =
            experiences.iter().map(ExperienceSummary::from).collect();
        let total = summaries.len();

        Ok(Json(ListExperiencesResponse {
            experiences: summaries,
            total,
        })
        .into_response())
    }

    /// Serve one experience with its steps and the caller's progress
    async fn handle_detail(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<Uuid>,
        header_map: HeaderMap,
    ) -> AppResult<Response> {
        let experience = resources
            .database
            .get_experience(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Experience with id: {id}")))?;

        let credential = extract_credential(&header_map);
        let target = if experience.is_premium() {
            ContentTarget::premium()
        } else {
            ContentTarget::public()
        };
        let auth = resources
            .gate
            .authorize(credential.as_deref(), anonymous_views(&header_map), target)
            .await;

        // Draft, archived, and hidden experiences only exist for content staff
        let is_admin = auth
            .profile
            .as_ref()
            .is_some_and(|p| p.role == ProfileRole::Admin);
        if !experience.is_listable() && !is_admin {
            return Err(AppError::not_found(format!("Experience with id: {id}")));
        }

        if let Some(redirect) = redirect_for(&auth.decision) {
            return Ok(redirect);
        }

        let steps = resources.database.get_experience_steps(id).await?;

        let progress = match auth.identity.user_id() {
            Some(user_id) => resources.database.get_progress(user_id, id).await?,
            None => None,
        };

        Ok(Json(ExperienceDetailResponse {
            experience: ExperienceSummary::from(&experience),
            steps,
            progress,
        })
        .into_response())
    }
}
