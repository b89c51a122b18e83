// ABOUTME: Common data models for profiles, experiences, steps, and progress
// ABOUTME: Typed records with validating constructors; rows are rejected at the boundary, not propagated
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resolved caller identity for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No valid credential was presented
    Anonymous,
    /// A valid session credential resolved to a stable user
    User {
        /// Stable user id issued by the identity provider
        id: Uuid,
        /// Email associated with the identity
        email: String,
    },
}

impl Identity {
    /// Whether this identity is anonymous
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// User id when authenticated
    #[must_use]
    pub const fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::Anonymous => None,
            Self::User { id, .. } => Some(*id),
        }
    }
}

/// Role assigned to a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileRole {
    /// Regular member
    User,
    /// Content staff with access to the admin surface
    Admin,
}

impl ProfileRole {
    /// String form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse from the stored string, defaulting unknown values to `User`
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

/// Billing plan of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// Trial-limited plan granted at signup
    Free,
    /// Paid plan with unconditional access
    Premium,
}

impl Plan {
    /// String form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
        }
    }

    /// Parse from the stored string, defaulting unknown values to `Free`
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "premium" => Self::Premium,
            _ => Self::Free,
        }
    }
}

/// Per-user plan, role, and trial state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// User identity id (1:1 with the identity provider)
    pub id: Uuid,
    /// Email captured at first resolution
    pub email: String,
    /// Optional display name
    pub full_name: Option<String>,
    /// Optional avatar URL
    pub avatar_url: Option<String>,
    /// Assigned role
    pub role: ProfileRole,
    /// Current billing plan
    pub plan: Plan,
    /// Cached plan check, kept equal to `plan == Premium` on every write
    pub is_premium: bool,
    /// End of the trial window; set once at creation, immutable thereafter
    pub trial_expires_at: Option<DateTime<Utc>>,
    /// Opaque billing-side customer reference
    pub billing_customer_ref: Option<String>,
    /// Opaque billing-side subscription reference
    pub billing_subscription_ref: Option<String>,
    /// Timestamp of the last plan mutation
    pub plan_updated_at: Option<DateTime<Utc>>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last row update time
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a fresh free-plan profile with its trial window starting now
    #[must_use]
    pub fn new(id: Uuid, email: String, trial_duration: Duration) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            full_name: None,
            avatar_url: None,
            role: ProfileRole::User,
            plan: Plan::Free,
            is_premium: false,
            trial_expires_at: Some(now + trial_duration),
            billing_customer_ref: None,
            billing_subscription_ref: None,
            plan_updated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the trial window has closed at the given instant
    #[must_use]
    pub fn trial_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.trial_expires_at.is_some_and(|expires| now > expires)
    }
}

/// Publication state of an experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceStatus {
    /// Not yet published
    Draft,
    /// Live and listable
    Published,
    /// Retired from the catalog
    Archived,
}

impl ExperienceStatus {
    /// String form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    /// Parse from the stored string, defaulting unknown values to `Draft`
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "published" => Self::Published,
            "archived" => Self::Archived,
            _ => Self::Draft,
        }
    }
}

/// Audience an experience is visible to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible to every entitled visitor
    Free,
    /// Requires a premium plan
    Premium,
    /// Never exposed to non-admin consumers
    Hidden,
}

impl Visibility {
    /// String form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
            Self::Hidden => "hidden",
        }
    }

    /// Parse from the stored string, defaulting unknown values to `Hidden`
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "free" => Self::Free,
            "premium" => Self::Premium,
            _ => Self::Hidden,
        }
    }
}

/// Editorial difficulty rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Suitable for first-time visitors
    Easy,
    /// Default rating
    Medium,
    /// Deep-work content
    Hard,
}

impl Difficulty {
    /// String form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Parse from the stored string, defaulting unknown values to `Medium`
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "easy" => Self::Easy,
            "hard" => Self::Hard,
            _ => Self::Medium,
        }
    }
}

/// A multi-step guided content unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    /// Unique experience id
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Catalog description
    pub description: String,
    /// Publication state
    pub status: ExperienceStatus,
    /// Audience gating
    pub visibility: Visibility,
    /// Editorial difficulty rating
    pub difficulty: Difficulty,
    /// Position in the catalog ordering
    pub order_index: i64,
    /// Estimated duration in minutes
    pub duration_min: i64,
    /// Optional cover emoji
    pub cover_emoji: Option<String>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last row update time
    pub updated_at: DateTime<Utc>,
}

impl Experience {
    /// Whether this experience requires a premium plan
    #[must_use]
    pub const fn is_premium(&self) -> bool {
        matches!(self.visibility, Visibility::Premium)
    }

    /// Whether non-admin consumers may see this experience at all
    #[must_use]
    pub const fn is_listable(&self) -> bool {
        matches!(self.status, ExperienceStatus::Published)
            && !matches!(self.visibility, Visibility::Hidden)
    }
}

/// Content type of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    /// Plain reading step
    Text,
    /// Journaling prompt
    Prompt,
    /// Branching choice
    Choice,
    /// Guided breathing exercise
    Breath,
    /// Audio playback
    Audio,
}

impl StepType {
    /// String form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Prompt => "prompt",
            Self::Choice => "choice",
            Self::Breath => "breath",
            Self::Audio => "audio",
        }
    }

    /// Parse from the stored string, defaulting unknown values to `Text`
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "prompt" => Self::Prompt,
            "choice" => Self::Choice,
            "breath" => Self::Breath,
            "audio" => Self::Audio,
            _ => Self::Text,
        }
    }
}

/// One ordered unit within an experience
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceStep {
    /// Unique step id
    pub id: Uuid,
    /// Parent experience
    pub experience_id: Uuid,
    /// Zero-based position within the experience; unique per parent
    pub order_index: i64,
    /// Step heading
    pub title: String,
    /// Step body content
    pub content: String,
    /// Content type
    pub step_type: StepType,
    /// Suggested duration in seconds; absent for untimed types like `choice`
    pub duration_sec: Option<i64>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last row update time
    pub updated_at: DateTime<Utc>,
}

/// Per (user, experience) traversal state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProgress {
    /// Owning user
    pub user_id: Uuid,
    /// Experience being traversed
    pub experience_id: Uuid,
    /// Zero-based index of the current step
    pub current_step: i64,
    /// Whether the final step has been passed
    pub completed: bool,
    /// Last advancement time
    pub updated_at: DateTime<Utc>,
}

/// Aggregate progress statistics for one user
#[derive(Debug, Clone, Serialize)]
pub struct ProgressStats {
    /// Number of completed experiences
    pub total_completed: i64,
    /// Number of experiences started but not finished
    pub in_progress: i64,
    /// Most recent progress activity, if any
    pub last_activity: Option<DateTime<Utc>>,
}
