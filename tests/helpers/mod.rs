// ABOUTME: Test helper modules
// ABOUTME: Exposes the axum request builder used by route tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

#![allow(dead_code, missing_docs)]

pub mod axum_test;
