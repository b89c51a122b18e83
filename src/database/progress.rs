// ABOUTME: Per (user, experience) progress tracking
// ABOUTME: Monotonic, idempotent step advancement with optimistic conditional updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{ProgressStats, UserProgress};

impl Database {
    /// Get progress for a (user, experience) pair
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_progress(
        &self,
        user_id: Uuid,
        experience_id: Uuid,
    ) -> AppResult<Option<UserProgress>> {
        let row = sqlx::query(
            r"
            SELECT user_id, experience_id, current_step, completed, updated_at
            FROM user_progress
            WHERE user_id = ?1 AND experience_id = ?2
            ",
        )
        .bind(user_id.to_string())
        .bind(experience_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get progress: {e}")))?;

        row.map(|r| Self::row_to_progress(&r)).transpose()
    }

    /// Create the progress row on first entry, or return the existing one
    ///
    /// Idempotent: calling twice never resets an in-progress row. The insert
    /// is keyed by the (user, experience) composite primary key, so two
    /// racing first-opens converge on one row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn ensure_progress_started(
        &self,
        user_id: Uuid,
        experience_id: Uuid,
    ) -> AppResult<UserProgress> {
        sqlx::query(
            r"
            INSERT INTO user_progress (user_id, experience_id, current_step, completed, updated_at)
            VALUES (?1, ?2, 0, 0, ?3)
            ON CONFLICT(user_id, experience_id) DO NOTHING
            ",
        )
        .bind(user_id.to_string())
        .bind(experience_id.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to start progress: {e}")))?;

        self.get_progress(user_id, experience_id)
            .await?
            .ok_or_else(|| AppError::database("Progress row missing after start"))
    }

    /// Advance progress by one step
    ///
    /// Reaching the end of the step list sets `completed` and pins
    /// `current_step` to the last valid index. Advancing a completed row is a
    /// no-op returning the existing state, so retried requests cannot
    /// double-advance. The update is conditioned on the observed
    /// `current_step`; a lost race returns the winner's row instead of
    /// applying a second increment.
    ///
    /// # Errors
    ///
    /// Returns an error if `step_count` is not positive or the database
    /// operation fails
    pub async fn advance_progress(
        &self,
        user_id: Uuid,
        experience_id: Uuid,
        step_count: i64,
    ) -> AppResult<UserProgress> {
        if step_count <= 0 {
            return Err(AppError::invalid_input(
                "Cannot advance progress on an experience without steps",
            ));
        }

        let current = self.ensure_progress_started(user_id, experience_id).await?;
        if current.completed {
            return Ok(current);
        }

        let next = current.current_step + 1;
        let (new_step, completed) = if next >= step_count {
            (current.current_step.min(step_count - 1), true)
        } else {
            (next, false)
        };

        let now = Utc::now();
        let result = sqlx::query(
            r"
            UPDATE user_progress SET
                current_step = ?1,
                completed = ?2,
                updated_at = ?3
            WHERE user_id = ?4 AND experience_id = ?5
              AND current_step = ?6 AND completed = 0
            ",
        )
        .bind(new_step)
        .bind(completed)
        .bind(now)
        .bind(user_id.to_string())
        .bind(experience_id.to_string())
        .bind(current.current_step)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to advance progress: {e}")))?;

        if result.rows_affected() == 0 {
            // Lost the conditional update to a concurrent advance
            debug!(
                user_id = %user_id,
                experience_id = %experience_id,
                "Concurrent progress advance detected, returning current row"
            );
            return self
                .get_progress(user_id, experience_id)
                .await?
                .ok_or_else(|| AppError::database("Progress row missing after advance race"));
        }

        Ok(UserProgress {
            user_id,
            experience_id,
            current_step: new_step,
            completed,
            updated_at: now,
        })
    }

    /// Reset a completed experience back to its first step
    ///
    /// The only operation allowed to move `current_step` backward. On an
    /// in-progress row it is a no-op returning the existing state.
    ///
    /// # Errors
    ///
    /// Returns an error if no progress row exists or the database operation
    /// fails
    pub async fn restart_progress(
        &self,
        user_id: Uuid,
        experience_id: Uuid,
    ) -> AppResult<UserProgress> {
        let now = Utc::now();
        let result = sqlx::query(
            r"
            UPDATE user_progress SET
                current_step = 0,
                completed = 0,
                updated_at = ?1
            WHERE user_id = ?2 AND experience_id = ?3 AND completed = 1
            ",
        )
        .bind(now)
        .bind(user_id.to_string())
        .bind(experience_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to restart progress: {e}")))?;

        if result.rows_affected() == 0 {
            return self
                .get_progress(user_id, experience_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found("No progress to restart for this experience")
                });
        }

        Ok(UserProgress {
            user_id,
            experience_id,
            current_step: 0,
            completed: false,
            updated_at: now,
        })
    }

    /// Aggregate progress statistics for one user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_progress_stats(&self, user_id: Uuid) -> AppResult<ProgressStats> {
        let row = sqlx::query(
            r"
            SELECT
                COALESCE(SUM(CASE WHEN completed = 1 THEN 1 ELSE 0 END), 0) AS total_completed,
                COALESCE(SUM(CASE WHEN completed = 0 THEN 1 ELSE 0 END), 0) AS in_progress,
                MAX(updated_at) AS last_activity
            FROM user_progress
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get progress stats: {e}")))?;

        Ok(ProgressStats {
            total_completed: row
                .try_get("total_completed")
                .map_err(|e| AppError::database(format!("Failed to get total_completed: {e}")))?,
            in_progress: row
                .try_get("in_progress")
                .map_err(|e| AppError::database(format!("Failed to get in_progress: {e}")))?,
            last_activity: row
                .try_get("last_activity")
                .map_err(|e| AppError::database(format!("Failed to get last_activity: {e}")))?,
        })
    }

    /// Convert a database row to a UserProgress
    fn row_to_progress(row: &SqliteRow) -> AppResult<UserProgress> {
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| AppError::database(format!("Failed to get user_id: {e}")))?;
        let experience_id: String = row
            .try_get("experience_id")
            .map_err(|e| AppError::database(format!("Failed to get experience_id: {e}")))?;

        Ok(UserProgress {
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::database(format!("Failed to parse user id: {e}")))?,
            experience_id: Uuid::parse_str(&experience_id)
                .map_err(|e| AppError::database(format!("Failed to parse experience id: {e}")))?,
            current_step: row
                .try_get("current_step")
                .map_err(|e| AppError::database(format!("Failed to get current_step: {e}")))?,
            completed: row
                .try_get("completed")
                .map_err(|e| AppError::database(format!("Failed to get completed: {e}")))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(|e| AppError::database(format!("Failed to get updated_at: {e}")))?,
        })
    }
}
