// ABOUTME: Session probe and profile display updates
// ABOUTME: Exercises the get-or-sync path and reports the caller's access state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ServerResources;
use crate::errors::AppResult;
use crate::models::Profile;
use crate::routes::require_user;

/// Profile fields exposed to the owning user
#[derive(Debug, Serialize)]
pub struct SessionProfile {
    /// User id
    pub id: Uuid,
    /// Email captured at first resolution
    pub email: String,
    /// Optional display name
    pub full_name: Option<String>,
    /// Optional avatar URL
    pub avatar_url: Option<String>,
    /// Assigned role
    pub role: String,
    /// Current billing plan
    pub plan: String,
    /// Whether the caller holds a premium plan
    pub is_premium: bool,
    /// End of the trial window
    pub trial_expires_at: Option<DateTime<Utc>>,
}

impl From<&Profile> for SessionProfile {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            avatar_url: profile.avatar_url.clone(),
            role: profile.role.as_str().to_owned(),
            plan: profile.plan.as_str().to_owned(),
            is_premium: profile.is_premium,
            trial_expires_at: profile.trial_expires_at,
        }
    }
}

/// Session probe response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Whether a valid credential was presented
    pub authenticated: bool,
    /// Profile of the authenticated caller
    pub profile: Option<SessionProfile>,
    /// Whether the caller's trial window has closed
    pub trial_expired: bool,
}

/// Display-field update request
#[derive(Debug, Deserialize)]
pub struct UpdateDisplayRequest {
    /// New display name
    pub full_name: Option<String>,
    /// New avatar URL
    pub avatar_url: Option<String>,
}

/// Session routes
pub struct SessionRoutes;

impl SessionRoutes {
    /// Create all session routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/session", get(Self::handle_session))
            .route("/api/session/profile", put(Self::handle_update_display))
            .with_state(resources)
    }

    /// Report the caller's identity, profile, and access state
    async fn handle_session(
        State(resources): State<Arc<ServerResources>>,
        header_map: HeaderMap,
    ) -> AppResult<Response> {
        let Ok((user_id, email)) = require_user(&resources, &header_map) else {
            return Ok(Json(SessionResponse {
                authenticated: false,
                profile: None,
                trial_expired: false,
            })
            .into_response());
        };

        let profile = resources
            .database
            .get_or_create_profile(user_id, &email, resources.config.trial_duration)
            .await?;

        let trial_expired = !profile.is_premium && profile.trial_expired_at(Utc::now());

        Ok(Json(SessionResponse {
            authenticated: true,
            profile: Some(SessionProfile::from(&profile)),
            trial_expired,
        })
        .into_response())
    }

    /// Update the caller's display fields
    async fn handle_update_display(
        State(resources): State<Arc<ServerResources>>,
        header_map: HeaderMap,
        Json(request): Json<UpdateDisplayRequest>,
    ) -> AppResult<Response> {
        let (user_id, email) = require_user(&resources, &header_map)?;

        // First-time callers may update before any other request created the row
        resources
            .database
            .get_or_create_profile(user_id, &email, resources.config.trial_duration)
            .await?;

        let profile = resources
            .database
            .update_profile_display(
                user_id,
                request.full_name.as_deref(),
                request.avatar_url.as_deref(),
            )
            .await?;
        resources.profile_cache.invalidate(user_id);

        Ok(Json(SessionProfile::from(&profile)).into_response())
    }
}
