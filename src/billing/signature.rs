// ABOUTME: Billing webhook signature verification
// ABOUTME: HMAC-SHA256 over a timestamped payload with bounded clock skew
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

//! Verifies the payment provider's webhook signature header
//! (`t=<unix>,v1=<hex>`, where `v1 = HMAC-SHA256(secret, "{t}.{body}")`).
//! Verification failure short-circuits the webhook before any state
//! mutation. The timestamp bound rejects replayed deliveries outside the
//! configured tolerance.

use chrono::{DateTime, Utc};
use ring::hmac;

use crate::errors::{AppError, AppResult};

/// Verifies webhook signatures against a shared secret
pub struct WebhookVerifier {
    key: hmac::Key,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    /// Create a verifier with the shared secret and accepted clock skew
    #[must_use]
    pub fn new(secret: &str, tolerance_secs: i64) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()),
            tolerance_secs,
        }
    }

    /// Verify a signature header against the raw request body
    ///
    /// # Errors
    ///
    /// Returns an error if the header is malformed, the timestamp is outside
    /// the accepted skew, or no signature matches.
    pub fn verify(&self, header: &str, payload: &[u8], now: DateTime<Utc>) -> AppResult<()> {
        let mut timestamp: Option<i64> = None;
        let mut signatures: Vec<Vec<u8>> = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => {
                    timestamp = value.parse().ok();
                }
                "v1" => {
                    if let Ok(sig) = hex::decode(value) {
                        signatures.push(sig);
                    }
                }
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| AppError::invalid_input("Webhook signature missing timestamp"))?;
        if signatures.is_empty() {
            return Err(AppError::invalid_input("Webhook signature missing v1"));
        }

        let age = now.timestamp() - timestamp;
        if age.abs() > self.tolerance_secs {
            return Err(AppError::invalid_input(
                "Webhook signature timestamp outside tolerance",
            ));
        }

        let mut signed_payload = Vec::with_capacity(payload.len() + 16);
        signed_payload.extend_from_slice(timestamp.to_string().as_bytes());
        signed_payload.push(b'.');
        signed_payload.extend_from_slice(payload);

        // hmac::verify is constant-time
        let matched = signatures
            .iter()
            .any(|sig| hmac::verify(&self.key, &signed_payload, sig).is_ok());

        if matched {
            Ok(())
        } else {
            Err(AppError::invalid_input("Webhook signature mismatch"))
        }
    }

    /// Produce a signature header for a payload, for tests and local tooling
    #[must_use]
    pub fn sign(&self, payload: &[u8], at: DateTime<Utc>) -> String {
        let timestamp = at.timestamp();
        let mut signed_payload = Vec::with_capacity(payload.len() + 16);
        signed_payload.extend_from_slice(timestamp.to_string().as_bytes());
        signed_payload.push(b'.');
        signed_payload.extend_from_slice(payload);

        let tag = hmac::sign(&self.key, &signed_payload);
        format!("t={timestamp},v1={}", hex::encode(tag.as_ref()))
    }
}
