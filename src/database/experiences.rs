// ABOUTME: Experience and step storage with explicit ordering invariants
// ABOUTME: Handles catalog queries, admin CRUD, and duplicate-index-rejecting reorders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

use std::collections::HashSet;

use chrono::Utc;
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Difficulty, Experience, ExperienceStatus, ExperienceStep, StepType, Visibility};

/// Payload for creating an experience
#[derive(Debug, Clone, Deserialize)]
pub struct NewExperience {
    /// Display title
    pub title: String,
    /// Catalog description
    #[serde(default)]
    pub description: String,
    /// Publication state; new experiences default to draft
    pub status: Option<ExperienceStatus>,
    /// Audience gating; new experiences default to hidden
    pub visibility: Option<Visibility>,
    /// Editorial difficulty rating
    pub difficulty: Option<Difficulty>,
    /// Catalog position; appended after the current maximum when absent
    pub order_index: Option<i64>,
    /// Estimated duration in minutes
    pub duration_min: Option<i64>,
    /// Optional cover emoji
    pub cover_emoji: Option<String>,
}

/// Payload for updating an experience
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateExperience {
    /// Display title
    pub title: String,
    /// Catalog description
    #[serde(default)]
    pub description: String,
    /// Publication state
    pub status: ExperienceStatus,
    /// Audience gating
    pub visibility: Visibility,
    /// Editorial difficulty rating
    pub difficulty: Difficulty,
    /// Estimated duration in minutes
    pub duration_min: i64,
    /// Optional cover emoji
    pub cover_emoji: Option<String>,
}

/// Payload for creating a step
#[derive(Debug, Clone, Deserialize)]
pub struct NewStep {
    /// Zero-based position within the experience
    pub order_index: i64,
    /// Step heading
    #[serde(default)]
    pub title: String,
    /// Step body content
    #[serde(default)]
    pub content: String,
    /// Content type; defaults to text
    pub step_type: Option<StepType>,
    /// Suggested duration in seconds
    pub duration_sec: Option<i64>,
}

/// Payload for updating a step
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStep {
    /// Step heading
    #[serde(default)]
    pub title: String,
    /// Step body content
    #[serde(default)]
    pub content: String,
    /// Content type
    pub step_type: StepType,
    /// Suggested duration in seconds
    pub duration_sec: Option<i64>,
}

/// One entry of a reorder batch
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderItem {
    /// Row being repositioned
    pub id: Uuid,
    /// New position
    pub order_index: i64,
}

/// Reject a reorder batch containing duplicate target indices
fn validate_reorder_items(items: &[ReorderItem]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.order_index) {
            return Err(AppError::invalid_input(format!(
                "Duplicate order_index {} in reorder payload",
                item.order_index
            )));
        }
    }
    Ok(())
}

impl Database {
    /// List experiences exposed to non-admin consumers, in catalog order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_published_experiences(&self) -> AppResult<Vec<Experience>> {
        let rows = sqlx::query(
            r"
            SELECT id, title, description, status, visibility, difficulty,
                   order_index, duration_min, cover_emoji, created_at, updated_at
            FROM experiences
            WHERE status = 'published' AND visibility != 'hidden'
            ORDER BY order_index ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list experiences: {e}")))?;

        rows.iter().map(Self::row_to_experience).collect()
    }

    /// List every experience regardless of status, for the admin surface
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_all_experiences(&self) -> AppResult<Vec<Experience>> {
        let rows = sqlx::query(
            r"
            SELECT id, title, description, status, visibility, difficulty,
                   order_index, duration_min, cover_emoji, created_at, updated_at
            FROM experiences
            ORDER BY order_index ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list all experiences: {e}")))?;

        rows.iter().map(Self::row_to_experience).collect()
    }

    /// Get a single experience by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_experience(&self, id: Uuid) -> AppResult<Option<Experience>> {
        let row = sqlx::query(
            r"
            SELECT id, title, description, status, visibility, difficulty,
                   order_index, duration_min, cover_emoji, created_at, updated_at
            FROM experiences WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get experience: {e}")))?;

        row.map(|r| Self::row_to_experience(&r)).transpose()
    }

    /// Create an experience, appending it to the catalog when no position is given
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_experience(&self, new: &NewExperience) -> AppResult<Experience> {
        let order_index = match new.order_index {
            Some(idx) => idx,
            None => self.next_experience_order_index().await?,
        };

        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r"
            INSERT INTO experiences (
                id, title, description, status, visibility, difficulty,
                order_index, duration_min, cover_emoji, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            ",
        )
        .bind(id.to_string())
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.status.unwrap_or(ExperienceStatus::Draft).as_str())
        .bind(new.visibility.unwrap_or(Visibility::Hidden).as_str())
        .bind(new.difficulty.unwrap_or(Difficulty::Medium).as_str())
        .bind(order_index)
        .bind(new.duration_min.unwrap_or(10))
        .bind(&new.cover_emoji)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create experience: {e}")))?;

        self.get_experience(id)
            .await?
            .ok_or_else(|| AppError::database("Experience missing after insert"))
    }

    /// Update an experience's editable fields
    ///
    /// # Errors
    ///
    /// Returns an error if the experience is not found or the update fails
    pub async fn update_experience(
        &self,
        id: Uuid,
        update: &UpdateExperience,
    ) -> AppResult<Experience> {
        let result = sqlx::query(
            r"
            UPDATE experiences SET
                title = ?1,
                description = ?2,
                status = ?3,
                visibility = ?4,
                difficulty = ?5,
                duration_min = ?6,
                cover_emoji = ?7,
                updated_at = ?8
            WHERE id = ?9
            ",
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.status.as_str())
        .bind(update.visibility.as_str())
        .bind(update.difficulty.as_str())
        .bind(update.duration_min)
        .bind(&update.cover_emoji)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update experience: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Experience with id: {id}")));
        }

        self.get_experience(id)
            .await?
            .ok_or_else(|| AppError::not_found("Experience after update"))
    }

    /// Delete an experience and its steps
    ///
    /// Progress rows are left in place; they are append-only history.
    ///
    /// # Errors
    ///
    /// Returns an error if the experience is not found or the delete fails
    pub async fn delete_experience(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM experience_steps WHERE experience_id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete experience steps: {e}")))?;

        let result = sqlx::query("DELETE FROM experiences WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete experience: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Experience with id: {id}")));
        }

        Ok(())
    }

    /// Reposition experiences in the catalog
    ///
    /// The batch must not contain duplicate target indices; applying it is
    /// transactional so a partial reorder never becomes visible.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the database operation fails
    pub async fn reorder_experiences(&self, items: &[ReorderItem]) -> AppResult<()> {
        validate_reorder_items(items)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin reorder: {e}")))?;

        let now = Utc::now();
        for item in items {
            sqlx::query("UPDATE experiences SET order_index = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(item.order_index)
                .bind(now)
                .bind(item.id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to reorder experience: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit reorder: {e}")))?;

        Ok(())
    }

    /// List the steps of an experience in traversal order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_experience_steps(
        &self,
        experience_id: Uuid,
    ) -> AppResult<Vec<ExperienceStep>> {
        let rows = sqlx::query(
            r"
            SELECT id, experience_id, order_index, title, content, step_type,
                   duration_sec, created_at, updated_at
            FROM experience_steps
            WHERE experience_id = ?1
            ORDER BY order_index ASC
            ",
        )
        .bind(experience_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get experience steps: {e}")))?;

        rows.iter().map(Self::row_to_step).collect()
    }

    /// Count the steps of an experience
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_experience_steps(&self, experience_id: Uuid) -> AppResult<i64> {
        let count =
            sqlx::query_scalar("SELECT COUNT(*) FROM experience_steps WHERE experience_id = ?1")
                .bind(experience_id.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to count steps: {e}")))?;
        Ok(count)
    }

    /// Create a step under an experience
    ///
    /// Rejects an `order_index` already taken within the same experience.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the database operation fails
    pub async fn create_step(
        &self,
        experience_id: Uuid,
        new: &NewStep,
    ) -> AppResult<ExperienceStep> {
        self.get_experience(experience_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Experience with id: {experience_id}")))?;

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM experience_steps WHERE experience_id = ?1 AND order_index = ?2)",
        )
        .bind(experience_id.to_string())
        .bind(new.order_index)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check step ordering: {e}")))?;

        if taken {
            return Err(AppError::invalid_input(format!(
                "order_index {} is already taken in this experience",
                new.order_index
            )));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r"
            INSERT INTO experience_steps (
                id, experience_id, order_index, title, content, step_type,
                duration_sec, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            ",
        )
        .bind(id.to_string())
        .bind(experience_id.to_string())
        .bind(new.order_index)
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.step_type.unwrap_or(StepType::Text).as_str())
        .bind(new.duration_sec)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create step: {e}")))?;

        self.get_step(id)
            .await?
            .ok_or_else(|| AppError::database("Step missing after insert"))
    }

    /// Get a single step by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_step(&self, id: Uuid) -> AppResult<Option<ExperienceStep>> {
        let row = sqlx::query(
            r"
            SELECT id, experience_id, order_index, title, content, step_type,
                   duration_sec, created_at, updated_at
            FROM experience_steps WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get step: {e}")))?;

        row.map(|r| Self::row_to_step(&r)).transpose()
    }

    /// Update a step's editable fields
    ///
    /// # Errors
    ///
    /// Returns an error if the step is not found or the update fails
    pub async fn update_step(&self, id: Uuid, update: &UpdateStep) -> AppResult<ExperienceStep> {
        let result = sqlx::query(
            r"
            UPDATE experience_steps SET
                title = ?1,
                content = ?2,
                step_type = ?3,
                duration_sec = ?4,
                updated_at = ?5
            WHERE id = ?6
            ",
        )
        .bind(&update.title)
        .bind(&update.content)
        .bind(update.step_type.as_str())
        .bind(update.duration_sec)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update step: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Step with id: {id}")));
        }

        self.get_step(id)
            .await?
            .ok_or_else(|| AppError::not_found("Step after update"))
    }

    /// Delete a step
    ///
    /// # Errors
    ///
    /// Returns an error if the step is not found or the delete fails
    pub async fn delete_step(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM experience_steps WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete step: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Step with id: {id}")));
        }

        Ok(())
    }

    /// Reposition the steps of one experience
    ///
    /// Same invariant as [`Self::reorder_experiences`]: duplicate target
    /// indices are rejected, and the batch applies transactionally. Items are
    /// matched against the experience so a stray id cannot move another
    /// experience's steps.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the database operation fails
    pub async fn reorder_steps(
        &self,
        experience_id: Uuid,
        items: &[ReorderItem],
    ) -> AppResult<()> {
        validate_reorder_items(items)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin step reorder: {e}")))?;

        let now = Utc::now();
        for item in items {
            sqlx::query(
                r"
                UPDATE experience_steps SET order_index = ?1, updated_at = ?2
                WHERE id = ?3 AND experience_id = ?4
                ",
            )
            .bind(item.order_index)
            .bind(now)
            .bind(item.id.to_string())
            .bind(experience_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to reorder step: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit step reorder: {e}")))?;

        Ok(())
    }

    /// Next free catalog position
    async fn next_experience_order_index(&self) -> AppResult<i64> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(order_index) FROM experiences")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get max order_index: {e}")))?;
        Ok(max.map_or(0, |m| m + 1))
    }

    /// Convert a database row to an Experience
    fn row_to_experience(row: &SqliteRow) -> AppResult<Experience> {
        let id: String = row
            .try_get("id")
            .map_err(|e| AppError::database(format!("Failed to get id: {e}")))?;
        let status_str: String = row
            .try_get("status")
            .map_err(|e| AppError::database(format!("Failed to get status: {e}")))?;
        let visibility_str: String = row
            .try_get("visibility")
            .map_err(|e| AppError::database(format!("Failed to get visibility: {e}")))?;
        let difficulty_str: String = row
            .try_get("difficulty")
            .map_err(|e| AppError::database(format!("Failed to get difficulty: {e}")))?;

        Ok(Experience {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::database(format!("Failed to parse experience id: {e}")))?,
            title: row
                .try_get("title")
                .map_err(|e| AppError::database(format!("Failed to get title: {e}")))?,
            description: row
                .try_get("description")
                .map_err(|e| AppError::database(format!("Failed to get description: {e}")))?,
            status: ExperienceStatus::from_str_lossy(&status_str),
            visibility: Visibility::from_str_lossy(&visibility_str),
            difficulty: Difficulty::from_str_lossy(&difficulty_str),
            order_index: row
                .try_get("order_index")
                .map_err(|e| AppError::database(format!("Failed to get order_index: {e}")))?,
            duration_min: row
                .try_get("duration_min")
                .map_err(|e| AppError::database(format!("Failed to get duration_min: {e}")))?,
            cover_emoji: row
                .try_get("cover_emoji")
                .map_err(|e| AppError::database(format!("Failed to get cover_emoji: {e}")))?,
            created_at: row
                .try_get("created_at")
                .map_err(|e| AppError::database(format!("Failed to get created_at: {e}")))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(|e| AppError::database(format!("Failed to get updated_at: {e}")))?,
        })
    }

    /// Convert a database row to an ExperienceStep
    fn row_to_step(row: &SqliteRow) -> AppResult<ExperienceStep> {
        let id: String = row
            .try_get("id")
            .map_err(|e| AppError::database(format!("Failed to get id: {e}")))?;
        let experience_id: String = row
            .try_get("experience_id")
            .map_err(|e| AppError::database(format!("Failed to get experience_id: {e}")))?;
        let step_type_str: String = row
            .try_get("step_type")
            .map_err(|e| AppError::database(format!("Failed to get step_type: {e}")))?;

        Ok(ExperienceStep {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::database(format!("Failed to parse step id: {e}")))?,
            experience_id: Uuid::parse_str(&experience_id).map_err(|e| {
                AppError::database(format!("Failed to parse step experience id: {e}"))
            })?,
            order_index: row
                .try_get("order_index")
                .map_err(|e| AppError::database(format!("Failed to get order_index: {e}")))?,
            title: row
                .try_get("title")
                .map_err(|e| AppError::database(format!("Failed to get title: {e}")))?,
            content: row
                .try_get("content")
                .map_err(|e| AppError::database(format!("Failed to get content: {e}")))?,
            step_type: StepType::from_str_lossy(&step_type_str),
            duration_sec: row
                .try_get("duration_sec")
                .map_err(|e| AppError::database(format!("Failed to get duration_sec: {e}")))?,
            created_at: row
                .try_get("created_at")
                .map_err(|e| AppError::database(format!("Failed to get created_at: {e}")))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(|e| AppError::database(format!("Failed to get updated_at: {e}")))?,
        })
    }
}
