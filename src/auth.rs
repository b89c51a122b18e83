// ABOUTME: Identity resolution from session credentials
// ABOUTME: Validates signed session tokens locally and fails closed to anonymous
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

//! Identity resolver
//!
//! Session issuance belongs to the external identity provider; this module
//! only consumes its output. Given an opaque credential (bearer token or
//! session cookie), it resolves a stable user identity or anonymous. Every
//! failure mode (missing credential, bad signature, expiry, malformed
//! claims) resolves to [`Identity::Anonymous`], never an error surfaced to
//! the caller. A failed resolution is terminal for the request; the caller
//! must re-authenticate out of band.

use axum::http::{header, HeaderMap};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::constants::headers;
use crate::models::Identity;

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the stable user id
    pub sub: String,
    /// Email associated with the identity
    pub email: Option<String>,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

/// Resolves inbound credentials into identities
#[derive(Clone)]
pub struct IdentityResolver {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl IdentityResolver {
    /// Create a resolver validating HS256 session tokens with the given secret
    #[must_use]
    pub fn new(session_secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(session_secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Resolve a credential into an identity
    ///
    /// Fails closed: any validation problem yields [`Identity::Anonymous`].
    #[must_use]
    pub fn resolve(&self, credential: Option<&str>) -> Identity {
        let Some(token) = credential else {
            return Identity::Anonymous;
        };

        let claims =
            match jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            {
                Ok(data) => data.claims,
                Err(e) => {
                    debug!(error = %e, "Session token validation failed, treating as anonymous");
                    return Identity::Anonymous;
                }
            };

        let Ok(user_id) = Uuid::parse_str(&claims.sub) else {
            debug!(sub = %claims.sub, "Session token subject is not a UUID, treating as anonymous");
            return Identity::Anonymous;
        };

        let Some(email) = claims.email else {
            debug!(user_id = %user_id, "Session token missing email claim, treating as anonymous");
            return Identity::Anonymous;
        };

        Identity::User { id: user_id, email }
    }
}

/// Extract the session credential from an authorization header or cookie
#[must_use]
pub fn extract_credential(header_map: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = header_map
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return Some(token.trim().to_owned());
        }
    }

    get_cookie_value(header_map, headers::SESSION_COOKIE)
}

/// Read a single cookie value from the request headers
#[must_use]
pub fn get_cookie_value(header_map: &HeaderMap, name: &str) -> Option<String> {
    let cookies = header_map.get(header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_owned())
    })
}
