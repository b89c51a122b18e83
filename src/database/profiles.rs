// ABOUTME: Profile storage with lazy get-or-sync creation
// ABOUTME: Handles plan mutations from billing events and role management
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Plan, Profile, ProfileRole};

impl Database {
    /// Get a profile by user id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let row = sqlx::query(
            r"
            SELECT id, email, full_name, avatar_url, role, plan, is_premium,
                   trial_expires_at, billing_customer_ref, billing_subscription_ref,
                   plan_updated_at, created_at, updated_at
            FROM profiles WHERE id = ?1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get profile: {e}")))?;

        row.map(|r| Self::row_to_profile(&r)).transpose()
    }

    /// Get an existing profile, creating it on first resolution ("get-or-sync")
    ///
    /// A new profile starts on the free plan with its trial window anchored to
    /// creation time. Creation is an insert-or-fetch keyed by the user id, so
    /// two racing first-requests converge on a single row with a single
    /// `trial_expires_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_or_create_profile(
        &self,
        user_id: Uuid,
        email: &str,
        trial_duration: chrono::Duration,
    ) -> AppResult<Profile> {
        let fresh = Profile::new(user_id, email.to_owned(), trial_duration);

        sqlx::query(
            r"
            INSERT INTO profiles (
                id, email, full_name, avatar_url, role, plan, is_premium,
                trial_expires_at, created_at, updated_at
            ) VALUES (?1, ?2, NULL, NULL, ?3, ?4, ?5, ?6, ?7, ?7)
            ON CONFLICT(id) DO NOTHING
            ",
        )
        .bind(user_id.to_string())
        .bind(email)
        .bind(fresh.role.as_str())
        .bind(fresh.plan.as_str())
        .bind(fresh.is_premium)
        .bind(fresh.trial_expires_at)
        .bind(fresh.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create profile: {e}")))?;

        self.get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::database("Profile missing after get-or-sync upsert"))
    }

    /// Update a profile's display fields
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is not found or the update fails
    pub async fn update_profile_display(
        &self,
        user_id: Uuid,
        full_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> AppResult<Profile> {
        let result = sqlx::query(
            r"
            UPDATE profiles SET
                full_name = ?1,
                avatar_url = ?2,
                updated_at = ?3
            WHERE id = ?4
            ",
        )
        .bind(full_name)
        .bind(avatar_url)
        .bind(Utc::now())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update profile display: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Profile with id: {user_id}")));
        }

        self.get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Profile after display update"))
    }

    /// Update a profile's role
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is not found or the update fails
    pub async fn update_profile_role(
        &self,
        user_id: Uuid,
        role: ProfileRole,
    ) -> AppResult<Profile> {
        let result = sqlx::query(
            r"
            UPDATE profiles SET
                role = ?1,
                updated_at = ?2
            WHERE id = ?3
            ",
        )
        .bind(role.as_str())
        .bind(Utc::now())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update profile role: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Profile with id: {user_id}")));
        }

        self.get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Profile after role update"))
    }

    /// Promote the given user to admin iff no admin exists yet
    ///
    /// Used to bootstrap the first administrator of a fresh deployment. The
    /// existence check and the promotion are a single conditional statement,
    /// so two racing bootstrap calls cannot both succeed.
    ///
    /// Returns `true` when the promotion was applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn bootstrap_first_admin(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE profiles SET
                role = 'admin',
                updated_at = ?1
            WHERE id = ?2
              AND NOT EXISTS (SELECT 1 FROM profiles WHERE role = 'admin')
            ",
        )
        .bind(Utc::now())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to bootstrap first admin: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// List all profiles, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        let rows = sqlx::query(
            r"
            SELECT id, email, full_name, avatar_url, role, plan, is_premium,
                   trial_expires_at, billing_customer_ref, billing_subscription_ref,
                   plan_updated_at, created_at, updated_at
            FROM profiles
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list profiles: {e}")))?;

        rows.iter().map(Self::row_to_profile).collect()
    }

    /// Upgrade a profile to premium after a completed checkout
    ///
    /// Idempotent: re-applying the same event writes the same plan and
    /// billing references. Returns the affected user id, or `None` when no
    /// profile matches (the event is unmatched, never creates a row).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn apply_checkout_completed(
        &self,
        user_id: Uuid,
        customer_ref: &str,
        subscription_ref: &str,
    ) -> AppResult<Option<Uuid>> {
        let now = Utc::now();
        let row = sqlx::query(
            r"
            UPDATE profiles SET
                plan = ?1,
                is_premium = 1,
                billing_customer_ref = ?2,
                billing_subscription_ref = ?3,
                plan_updated_at = ?4,
                updated_at = ?4
            WHERE id = ?5
            RETURNING id
            ",
        )
        .bind(Plan::Premium.as_str())
        .bind(customer_ref)
        .bind(subscription_ref)
        .bind(now)
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to apply checkout completion: {e}")))?;

        row.map(|r| Self::row_id(&r)).transpose()
    }

    /// Downgrade the profile owning a billing customer reference to free
    ///
    /// The cancellation event carries only the billing-side reference. A
    /// reference with no matching profile is a no-op returning `None`; it
    /// must never create a free profile, which also makes an out-of-order
    /// cancellation for a reused reference harmless.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn apply_subscription_cancelled(
        &self,
        customer_ref: &str,
    ) -> AppResult<Option<Uuid>> {
        let now = Utc::now();
        let row = sqlx::query(
            r"
            UPDATE profiles SET
                plan = ?1,
                is_premium = 0,
                plan_updated_at = ?2,
                updated_at = ?2
            WHERE billing_customer_ref = ?3
            RETURNING id
            ",
        )
        .bind(Plan::Free.as_str())
        .bind(now)
        .bind(customer_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to apply subscription cancellation: {e}")))?;

        row.map(|r| Self::row_id(&r)).transpose()
    }

    /// Convert a database row to a Profile
    fn row_to_profile(row: &SqliteRow) -> AppResult<Profile> {
        let id: String = row
            .try_get("id")
            .map_err(|e| AppError::database(format!("Failed to get id: {e}")))?;
        let role_str: String = row
            .try_get("role")
            .map_err(|e| AppError::database(format!("Failed to get role: {e}")))?;
        let plan_str: String = row
            .try_get("plan")
            .map_err(|e| AppError::database(format!("Failed to get plan: {e}")))?;

        Ok(Profile {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::database(format!("Failed to parse profile id: {e}")))?,
            email: row
                .try_get("email")
                .map_err(|e| AppError::database(format!("Failed to get email: {e}")))?,
            full_name: row
                .try_get("full_name")
                .map_err(|e| AppError::database(format!("Failed to get full_name: {e}")))?,
            avatar_url: row
                .try_get("avatar_url")
                .map_err(|e| AppError::database(format!("Failed to get avatar_url: {e}")))?,
            role: ProfileRole::from_str_lossy(&role_str),
            plan: Plan::from_str_lossy(&plan_str),
            is_premium: row
                .try_get("is_premium")
                .map_err(|e| AppError::database(format!("Failed to get is_premium: {e}")))?,
            trial_expires_at: row
                .try_get("trial_expires_at")
                .map_err(|e| AppError::database(format!("Failed to get trial_expires_at: {e}")))?,
            billing_customer_ref: row.try_get("billing_customer_ref").map_err(|e| {
                AppError::database(format!("Failed to get billing_customer_ref: {e}"))
            })?,
            billing_subscription_ref: row.try_get("billing_subscription_ref").map_err(|e| {
                AppError::database(format!("Failed to get billing_subscription_ref: {e}"))
            })?,
            plan_updated_at: row
                .try_get("plan_updated_at")
                .map_err(|e| AppError::database(format!("Failed to get plan_updated_at: {e}")))?,
            created_at: row
                .try_get("created_at")
                .map_err(|e| AppError::database(format!("Failed to get created_at: {e}")))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(|e| AppError::database(format!("Failed to get updated_at: {e}")))?,
        })
    }

    /// Read a returned id column as a UUID
    fn row_id(row: &SqliteRow) -> AppResult<Uuid> {
        let id: String = row
            .try_get("id")
            .map_err(|e| AppError::database(format!("Failed to get id: {e}")))?;
        Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Failed to parse returned id: {e}")))
    }
}
