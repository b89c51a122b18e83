// ABOUTME: Billing webhook route handler
// ABOUTME: Verifies signatures before any state mutation and acknowledges unmatched events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

//! Billing webhook endpoint
//!
//! The provider retries on 5xx, so only a genuine persistence failure is
//! allowed to produce one. A bad signature or malformed payload is the
//! sender's problem (400); an event that simply doesn't apply here is
//! acknowledged (200) so the provider stops redelivering it.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use crate::billing::BillingEvent;
use crate::constants::headers;
use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};

/// Billing routes
pub struct BillingRoutes;

impl BillingRoutes {
    /// Create all billing routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/billing/webhook", post(Self::handle_webhook))
            .with_state(resources)
    }

    /// Consume one billing webhook delivery
    async fn handle_webhook(
        State(resources): State<Arc<ServerResources>>,
        header_map: HeaderMap,
        body: Bytes,
    ) -> AppResult<Response> {
        let signature = header_map
            .get(headers::WEBHOOK_SIGNATURE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::invalid_input("Missing webhook signature header"))?;

        resources
            .webhook_verifier
            .verify(signature, &body, Utc::now())?;

        let payload: Value = serde_json::from_slice(&body)
            .map_err(|e| AppError::invalid_input(format!("Invalid webhook payload: {e}")))?;

        let Some(event) = BillingEvent::from_webhook(&payload)? else {
            debug!("Ignoring webhook event outside the consumed set");
            return Ok(Json(json!({ "received": true })).into_response());
        };

        // Applied and unmatched both acknowledge; only persistence failures
        // propagate as 5xx to trigger provider retry
        let outcome = resources.plan_sync.apply(event).await?;

        Ok(Json(json!({ "received": true, "outcome": format!("{outcome:?}").to_lowercase() }))
            .into_response())
    }
}
