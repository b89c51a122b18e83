// ABOUTME: HTTP route assembly and shared request helpers
// ABOUTME: Wires content, session, progress, billing, and admin routers onto one Router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

/// Admin surface: content CRUD, reordering, and role management
pub mod admin;
/// Billing webhook consumption
pub mod billing;
/// Public content routes with gating
pub mod experiences;
/// Progress tracking API
pub mod progress;
/// Session/identity probe
pub mod session;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use uuid::Uuid;

use crate::auth::extract_credential;
use crate::constants::headers;
use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};
use crate::gate::AccessDecision;
use crate::models::Identity;

/// Assemble the full application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(experiences::ExperienceRoutes::routes(resources.clone()))
        .merge(session::SessionRoutes::routes(resources.clone()))
        .merge(progress::ProgressRoutes::routes(resources.clone()))
        .merge(billing::BillingRoutes::routes(resources.clone()))
        .merge(admin::AdminRoutes::routes(resources))
        .route("/health", get(handle_health))
}

/// Liveness probe
async fn handle_health() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

/// Client-reported anonymous gated-view counter; advisory, defaults to zero
pub(crate) fn anonymous_views(header_map: &HeaderMap) -> u32 {
    header_map
        .get(headers::TRIAL_VIEWS)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Translate a gating denial into its deterministic redirect response
///
/// Returns `None` when access is allowed.
pub(crate) fn redirect_for(decision: &AccessDecision) -> Option<Response> {
    decision
        .redirect_path()
        .map(|path| Redirect::to(&path).into_response())
}

/// Resolve the caller to an authenticated user or fail with 401
pub(crate) fn require_user(
    resources: &ServerResources,
    header_map: &HeaderMap,
) -> AppResult<(Uuid, String)> {
    let credential = extract_credential(header_map);
    match resources.identity.resolve(credential.as_deref()) {
        Identity::User { id, email } => Ok((id, email)),
        Identity::Anonymous => Err(AppError::auth_required("Authentication required")),
    }
}
