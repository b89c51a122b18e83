// ABOUTME: Admin route handlers for content and user management
// ABOUTME: Role-gated CRUD, reordering, role updates, and first-admin bootstrap
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::context::ServerResources;
use crate::database::{NewExperience, NewStep, ReorderItem, UpdateExperience, UpdateStep};
use crate::errors::{AppError, AppResult};
use crate::models::{Profile, ProfileRole};
use crate::routes::require_user;

/// Reorder request body
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    /// Rows and their new positions
    pub items: Vec<ReorderItem>,
}

/// Role update request body
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    /// Role to assign
    pub role: ProfileRole,
}

/// Sanitized profile summary for the admin listing
#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    /// User id
    pub id: Uuid,
    /// Email
    pub email: String,
    /// Display name
    pub full_name: Option<String>,
    /// Assigned role
    pub role: String,
    /// Current billing plan
    pub plan: String,
    /// Whether the user holds a premium plan
    pub is_premium: bool,
    /// End of the trial window
    pub trial_expires_at: Option<String>,
    /// Row creation time
    pub created_at: String,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            role: profile.role.as_str().to_owned(),
            plan: profile.plan.as_str().to_owned(),
            is_premium: profile.is_premium,
            trial_expires_at: profile.trial_expires_at.map(|t| t.to_rfc3339()),
            created_at: profile.created_at.to_rfc3339(),
        }
    }
}

/// Admin routes
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/experiences", get(Self::handle_list_experiences))
            .route("/api/admin/experiences", post(Self::handle_create_experience))
            .route(
                "/api/admin/experiences/reorder",
                patch(Self::handle_reorder_experiences),
            )
            .route(
                "/api/admin/experiences/:id",
                put(Self::handle_update_experience),
            )
            .route(
                "/api/admin/experiences/:id",
                delete(Self::handle_delete_experience),
            )
            .route(
                "/api/admin/experiences/:id/steps",
                post(Self::handle_create_step),
            )
            .route(
                "/api/admin/experiences/:id/steps/reorder",
                patch(Self::handle_reorder_steps),
            )
            .route("/api/admin/steps/:id", put(Self::handle_update_step))
            .route("/api/admin/steps/:id", delete(Self::handle_delete_step))
            .route("/api/admin/profiles", get(Self::handle_list_profiles))
            .route(
                "/api/admin/profiles/:id/role",
                put(Self::handle_update_role),
            )
            .route("/api/admin/bootstrap", post(Self::handle_bootstrap))
            .with_state(resources)
    }

    /// Resolve the caller and require the admin role
    async fn require_admin(
        resources: &ServerResources,
        header_map: &HeaderMap,
    ) -> AppResult<Profile> {
        let (user_id, email) = require_user(resources, header_map)?;

        let profile = resources
            .database
            .get_or_create_profile(user_id, &email, resources.config.trial_duration)
            .await?;

        if profile.role != ProfileRole::Admin {
            return Err(AppError::permission_denied("Admin role required"));
        }

        Ok(profile)
    }

    /// List every experience including drafts and hidden content
    async fn handle_list_experiences(
        State(resources): State<Arc<ServerResources>>,
        header_map: HeaderMap,
    ) -> AppResult<Response> {
        Self::require_admin(&resources, &header_map).await?;
        let experiences = resources.database.list_all_experiences().await?;
        Ok(Json(experiences).into_response())
    }

    /// Create an experience
    async fn handle_create_experience(
        State(resources): State<Arc<ServerResources>>,
        header_map: HeaderMap,
        Json(request): Json<NewExperience>,
    ) -> AppResult<Response> {
        let admin = Self::require_admin(&resources, &header_map).await?;

        let experience = resources.database.create_experience(&request).await?;
        info!(experience_id = %experience.id, "Experience created");
        resources
            .database
            .log_audit(
                "experience_created",
                json!({ "experience_id": experience.id }),
                Some(admin.id),
            )
            .await;

        Ok((StatusCode::CREATED, Json(experience)).into_response())
    }

    /// Update an experience
    async fn handle_update_experience(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<Uuid>,
        header_map: HeaderMap,
        Json(request): Json<UpdateExperience>,
    ) -> AppResult<Response> {
        let admin = Self::require_admin(&resources, &header_map).await?;

        let experience = resources.database.update_experience(id, &request).await?;
        resources
            .database
            .log_audit(
                "experience_updated",
                json!({ "experience_id": id }),
                Some(admin.id),
            )
            .await;

        Ok(Json(experience).into_response())
    }

    /// Delete an experience and its steps
    async fn handle_delete_experience(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<Uuid>,
        header_map: HeaderMap,
    ) -> AppResult<Response> {
        let admin = Self::require_admin(&resources, &header_map).await?;

        resources.database.delete_experience(id).await?;
        info!(experience_id = %id, "Experience deleted");
        resources
            .database
            .log_audit(
                "experience_deleted",
                json!({ "experience_id": id }),
                Some(admin.id),
            )
            .await;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Reposition experiences in the catalog
    async fn handle_reorder_experiences(
        State(resources): State<Arc<ServerResources>>,
        header_map: HeaderMap,
        Json(request): Json<ReorderRequest>,
    ) -> AppResult<Response> {
        let admin = Self::require_admin(&resources, &header_map).await?;

        resources
            .database
            .reorder_experiences(&request.items)
            .await?;
        resources
            .database
            .log_audit(
                "experiences_reordered",
                json!({ "count": request.items.len() }),
                Some(admin.id),
            )
            .await;

        Ok(Json(json!({ "ok": true })).into_response())
    }

    /// Create a step under an experience
    async fn handle_create_step(
        State(resources): State<Arc<ServerResources>>,
        Path(experience_id): Path<Uuid>,
        header_map: HeaderMap,
        Json(request): Json<NewStep>,
    ) -> AppResult<Response> {
        let admin = Self::require_admin(&resources, &header_map).await?;

        let step = resources.database.create_step(experience_id, &request).await?;
        resources
            .database
            .log_audit(
                "step_created",
                json!({ "experience_id": experience_id, "step_id": step.id }),
                Some(admin.id),
            )
            .await;

        Ok((StatusCode::CREATED, Json(step)).into_response())
    }

    /// Update a step
    async fn handle_update_step(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<Uuid>,
        header_map: HeaderMap,
        Json(request): Json<UpdateStep>,
    ) -> AppResult<Response> {
        let admin = Self::require_admin(&resources, &header_map).await?;

        let step = resources.database.update_step(id, &request).await?;
        resources
            .database
            .log_audit("step_updated", json!({ "step_id": id }), Some(admin.id))
            .await;

        Ok(Json(step).into_response())
    }

    /// Delete a step
    async fn handle_delete_step(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<Uuid>,
        header_map: HeaderMap,
    ) -> AppResult<Response> {
        let admin = Self::require_admin(&resources, &header_map).await?;

        resources.database.delete_step(id).await?;
        resources
            .database
            .log_audit("step_deleted", json!({ "step_id": id }), Some(admin.id))
            .await;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Reposition the steps of one experience
    async fn handle_reorder_steps(
        State(resources): State<Arc<ServerResources>>,
        Path(experience_id): Path<Uuid>,
        header_map: HeaderMap,
        Json(request): Json<ReorderRequest>,
    ) -> AppResult<Response> {
        let admin = Self::require_admin(&resources, &header_map).await?;

        resources
            .database
            .reorder_steps(experience_id, &request.items)
            .await?;
        resources
            .database
            .log_audit(
                "steps_reordered",
                json!({ "experience_id": experience_id, "count": request.items.len() }),
                Some(admin.id),
            )
            .await;

        Ok(Json(json!({ "ok": true })).into_response())
    }

    /// List all profiles
    async fn handle_list_profiles(
        State(resources): State<Arc<ServerResources>>,
        header_map: HeaderMap,
    ) -> AppResult<Response> {
        Self::require_admin(&resources, &header_map).await?;

        let profiles = resources.database.list_profiles().await?;
        let summaries: Vec<ProfileSummary> = profiles.iter().map(ProfileSummary::from).collect();

        Ok(Json(json!({ "profiles": summaries, "total": summaries.len() })).into_response())
    }

    /// Assign a role to a profile
    async fn handle_update_role(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<Uuid>,
        header_map: HeaderMap,
        Json(request): Json<UpdateRoleRequest>,
    ) -> AppResult<Response> {
        let admin = Self::require_admin(&resources, &header_map).await?;

        let profile = resources.database.update_profile_role(id, request.role).await?;
        resources.profile_cache.invalidate(id);
        info!(user_id = %id, role = request.role.as_str(), "Profile role updated");
        resources
            .database
            .log_audit(
                "role_updated",
                json!({ "target_user_id": id, "role": request.role.as_str() }),
                Some(admin.id),
            )
            .await;

        Ok(Json(ProfileSummary::from(&profile)).into_response())
    }

    /// Promote the caller to admin iff no admin exists yet
    ///
    /// Open to any authenticated user on a fresh deployment; once one admin
    /// exists this is a no-op rejected with 403.
    async fn handle_bootstrap(
        State(resources): State<Arc<ServerResources>>,
        header_map: HeaderMap,
    ) -> AppResult<Response> {
        let (user_id, email) = require_user(&resources, &header_map)?;

        resources
            .database
            .get_or_create_profile(user_id, &email, resources.config.trial_duration)
            .await?;

        let promoted = resources.database.bootstrap_first_admin(user_id).await?;
        if !promoted {
            return Err(AppError::permission_denied(
                "An admin already exists; ask them to assign roles",
            ));
        }

        resources.profile_cache.invalidate(user_id);
        info!(user_id = %user_id, "First admin bootstrapped");
        resources
            .database
            .log_audit("admin_bootstrapped", json!({}), Some(user_id))
            .await;

        Ok(Json(json!({ "ok": true, "role": "admin" })).into_response())
    }
}
