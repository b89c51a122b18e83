// ABOUTME: Best-effort audit log writes for operator visibility
// ABOUTME: Failures are logged and swallowed, never propagated to the caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

use chrono::Utc;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};

impl Database {
    /// Record an audit entry
    ///
    /// Best-effort: a failed write is logged and swallowed so audit logging
    /// can never fail the operation being audited.
    pub async fn log_audit(&self, action: &str, meta: Value, user_id: Option<Uuid>) {
        if let Err(e) = self.log_audit_impl(action, meta, user_id).await {
            warn!(action, error = %e, "Audit log write failed");
        }
    }

    async fn log_audit_impl(
        &self,
        action: &str,
        meta: Value,
        user_id: Option<Uuid>,
    ) -> AppResult<()> {
        let meta_json = serde_json::to_string(&meta)?;

        sqlx::query(
            r"
            INSERT INTO audit_logs (user_id, action, meta, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(user_id.map(|id| id.to_string()))
        .bind(action)
        .bind(meta_json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert audit entry: {e}")))?;

        Ok(())
    }

    /// Count audit entries for a given action, for tests and diagnostics
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_audit_entries(&self, action: &str) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs WHERE action = ?1")
            .bind(action)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count audit entries: {e}")))?;
        Ok(count)
    }
}
