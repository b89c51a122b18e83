// ABOUTME: Billing event synchronization from the external payment provider
// ABOUTME: Applies webhook-driven plan changes idempotently and tolerant of out-of-order delivery
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

//! # Plan Synchronizer
//!
//! The payment provider delivers events at-least-once and without ordering
//! guarantees. Each event kind is a variant of the closed [`BillingEvent`]
//! enum, so adding a new kind is a compile-time-checked exhaustive match
//! rather than a silently-ignored default branch. Application is idempotent:
//! replaying an event leaves the profile in the same state, and an event that
//! matches no profile is logged and dropped, never turned into a new row.

/// Webhook signature verification
pub mod signature;

pub use signature::WebhookVerifier;

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::ProfileCache;
use crate::database::Database;
use crate::errors::{AppError, AppResult};

/// A plan-affecting event emitted by the payment provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingEvent {
    /// A checkout finished; the user paid for a subscription
    CheckoutCompleted {
        /// Our user id, carried through checkout as the client reference
        user_id: Uuid,
        /// Billing-side customer reference
        customer_ref: String,
        /// Billing-side subscription reference
        subscription_ref: String,
    },
    /// A subscription was cancelled or lapsed
    SubscriptionCancelled {
        /// Billing-side customer reference; the event carries no user id
        customer_ref: String,
    },
}

impl BillingEvent {
    /// Decode a verified webhook payload into an event
    ///
    /// Returns `Ok(None)` for event types this core does not consume and for
    /// checkout events missing a client reference; both are acknowledged and
    /// ignored, matching the provider's delivery contract.
    ///
    /// # Errors
    ///
    /// Returns an error when a consumed event type is missing required fields
    pub fn from_webhook(payload: &Value) -> AppResult<Option<Self>> {
        let event_type = payload
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::invalid_input("Webhook payload missing event type"))?;

        let object = payload
            .get("data")
            .and_then(|d| d.get("object"))
            .ok_or_else(|| AppError::invalid_input("Webhook payload missing data.object"))?;

        match event_type {
            "checkout.session.completed" => {
                let Some(reference) = object.get("client_reference_id").and_then(Value::as_str)
                else {
                    warn!("Checkout completion without client reference, ignoring");
                    return Ok(None);
                };
                let user_id = Uuid::parse_str(reference).map_err(|e| {
                    AppError::invalid_input(format!("Invalid client reference: {e}"))
                })?;
                let customer_ref = required_str(object, "customer")?;
                let subscription_ref = required_str(object, "subscription")?;

                Ok(Some(Self::CheckoutCompleted {
                    user_id,
                    customer_ref,
                    subscription_ref,
                }))
            }
            "customer.subscription.deleted" => {
                let customer_ref = required_str(object, "customer")?;
                Ok(Some(Self::SubscriptionCancelled { customer_ref }))
            }
            _ => Ok(None),
        }
    }
}

fn required_str(object: &Value, field: &str) -> AppResult<String> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| AppError::invalid_input(format!("Webhook payload missing {field}")))
}

/// Outcome of applying a billing event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The event mutated a profile
    Applied,
    /// The event referenced no known profile and was dropped
    Unmatched,
}

/// Applies billing events to the profile store
pub struct PlanSynchronizer {
    database: Arc<Database>,
    cache: Arc<ProfileCache>,
}

impl PlanSynchronizer {
    /// Create a synchronizer over the profile store and its read cache
    #[must_use]
    pub fn new(database: Arc<Database>, cache: Arc<ProfileCache>) -> Self {
        Self { database, cache }
    }

    /// Apply one billing event
    ///
    /// # Errors
    ///
    /// Returns an error only when persistence fails; the webhook endpoint
    /// maps that to a 5xx so the provider retries. An unmatched event is a
    /// normal outcome, not an error.
    pub async fn apply(&self, event: BillingEvent) -> AppResult<SyncOutcome> {
        match event {
            BillingEvent::CheckoutCompleted {
                user_id,
                customer_ref,
                subscription_ref,
            } => {
                self.on_checkout_completed(user_id, &customer_ref, &subscription_ref)
                    .await
            }
            BillingEvent::SubscriptionCancelled { customer_ref } => {
                self.on_subscription_cancelled(&customer_ref).await
            }
        }
    }

    async fn on_checkout_completed(
        &self,
        user_id: Uuid,
        customer_ref: &str,
        subscription_ref: &str,
    ) -> AppResult<SyncOutcome> {
        let applied = self
            .database
            .apply_checkout_completed(user_id, customer_ref, subscription_ref)
            .await?;

        match applied {
            Some(id) => {
                self.cache.invalidate(id);
                info!(user_id = %id, "Checkout completed, profile upgraded to premium");
                self.database
                    .log_audit(
                        "checkout_success",
                        json!({ "subscription_ref": subscription_ref }),
                        Some(id),
                    )
                    .await;
                Ok(SyncOutcome::Applied)
            }
            None => {
                warn!(user_id = %user_id, "Checkout completion for unknown profile, dropping");
                Ok(SyncOutcome::Unmatched)
            }
        }
    }

    async fn on_subscription_cancelled(&self, customer_ref: &str) -> AppResult<SyncOutcome> {
        let applied = self
            .database
            .apply_subscription_cancelled(customer_ref)
            .await?;

        match applied {
            Some(id) => {
                self.cache.invalidate(id);
                info!(user_id = %id, "Subscription cancelled, profile downgraded to free");
                self.database
                    .log_audit(
                        "subscription_deleted",
                        json!({ "customer_ref": customer_ref }),
                        Some(id),
                    )
                    .await;
                Ok(SyncOutcome::Applied)
            }
            None => {
                // A reference with no profile is dropped, never materialized
                warn!(customer_ref, "Cancellation for unknown customer reference, dropping");
                Ok(SyncOutcome::Unmatched)
            }
        }
    }
}
