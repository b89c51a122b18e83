// ABOUTME: Main library entry point for the Stillpark content platform
// ABOUTME: Provides trial gating, progress tracking, and billing synchronization over REST
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

#![deny(unsafe_code)]

//! # Stillpark Server
//!
//! Backend for a subscription-gated self-improvement content application.
//! Authenticated users browse a catalog of guided experiences (multi-step
//! text/audio/prompt sequences), track linear progress through them, and are
//! gated into a paid plan after a trial period expires.
//!
//! ## Architecture
//!
//! The server follows a modular architecture:
//! - **Identity Resolver**: maps inbound credentials to a user identity,
//!   failing closed to anonymous
//! - **Profile Store**: lazily-created per-user plan/role/trial state
//! - **Access Gate**: combines identity, profile, and trial policy into a
//!   single allow/redirect decision per request
//! - **Progress Tracker**: monotonic, idempotent per-step advancement
//! - **Plan Synchronizer**: applies external billing webhook events
//!   idempotently
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stillpark_server::config::ServerConfig;
//! use stillpark_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Stillpark configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Identity resolution from bearer tokens and session cookies
pub mod auth;

/// Billing event synchronization and webhook signature verification
pub mod billing;

/// Short-TTL read cache for profile lookups
pub mod cache;

/// Configuration management (environment-only)
pub mod config;

/// Application constants and policy defaults
pub mod constants;

/// Dependency-injected server resources shared across routes
pub mod context;

/// Database access for profiles, experiences, progress, and audit logs
pub mod database;

/// Unified error handling with standard error codes and HTTP responses
pub mod errors;

/// Trial policy and access gating decisions
pub mod gate;

/// Common data models for profiles, experiences, and progress
pub mod models;

/// `HTTP` routes for content, progress, billing, and administration
pub mod routes;
