//! # User Module
//!
//! Platform members: seniors who post help requests and youths who take
//! them on. A user carries its reputation (AURA points, badges, rating),
//! its [`Standing`] and its preference blocks.

use crate::badge::Badge;
use crate::error::{CoreError, CoreResult};
use crate::preferences::{AccessibilitySettings, NotificationSettings, PrivacySettings};
use crate::standing::Standing;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// AURA points per level step.
pub const POINTS_PER_LEVEL: u32 = 250;

/// Stable user identifier, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cohort {
    /// Posts help requests
    Senior,
    /// Accepts help requests
    Youth,
}

impl Cohort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cohort::Senior => "senior",
            Cohort::Youth => "youth",
        }
    }

    pub fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "senior" => Ok(Cohort::Senior),
            "youth" => Ok(Cohort::Youth),
            other => Err(CoreError::unknown("cohort", other)),
        }
    }
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Average rating in [0, 5] and the number of ratings behind it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    pub average: f32,
    pub count: u32,
}

impl Rating {
    pub fn new(average: f32, count: u32) -> Self {
        Self {
            average: average.clamp(0.0, 5.0),
            count,
        }
    }
}

/// A platform member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Stored lowercase; unique across users
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub name: String,
    pub cohort: Cohort,
    pub phone: String,
    pub bio: String,
    pub aura_points: u32,
    /// Ordered by earn date, ids unique
    pub badges: Vec<Badge>,
    pub rating: Rating,
    pub completed_tasks: u32,
    pub joined_date: NaiveDate,
    pub last_active: DateTime<Utc>,
    pub standing: Standing,
    pub accessibility: AccessibilitySettings,
    pub privacy: PrivacySettings,
    pub notifications: NotificationSettings,
    pub skills_teach: Vec<String>,
    pub skills_learn: Vec<String>,
}

impl User {
    /// Fresh active account with cohort-dependent defaults and no points.
    pub fn new(
        id: UserId,
        email: &str,
        password_hash: String,
        name: &str,
        cohort: Cohort,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: normalize_email(email),
            password_hash,
            name: name.trim().to_string(),
            cohort,
            phone: String::new(),
            bio: String::new(),
            aura_points: 0,
            badges: Vec::new(),
            rating: Rating::default(),
            completed_tasks: 0,
            joined_date: now.date_naive(),
            last_active: now,
            standing: Standing::Active,
            accessibility: AccessibilitySettings::for_cohort(cohort),
            privacy: PrivacySettings::default(),
            notifications: NotificationSettings::default(),
            skills_teach: Vec::new(),
            skills_learn: Vec::new(),
        }
    }

    /// Level derived from AURA points, starting at 1
    pub fn level(&self) -> u32 {
        self.aura_points / POINTS_PER_LEVEL + 1
    }

    /// Add AURA points, saturating at the counter maximum
    pub fn credit_points(&mut self, points: u32) {
        self.aura_points = self.aura_points.saturating_add(points);
    }

    /// Add a badge unless one with the same id is already held.
    ///
    /// Keeps the set ordered by earn date. Returns false for a duplicate.
    pub fn add_badge(&mut self, badge: Badge) -> bool {
        if self.badges.iter().any(|b| b.id == badge.id) {
            return false;
        }
        let pos = self
            .badges
            .iter()
            .position(|b| b.earned > badge.earned)
            .unwrap_or(self.badges.len());
        self.badges.insert(pos, badge);
        true
    }

    pub fn timeout_until(&self) -> Option<DateTime<Utc>> {
        self.standing.timeout_until()
    }

    pub fn ban_reason(&self) -> Option<&str> {
        self.standing.reason()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{} - {}, {})", self.name, self.id, self.cohort, self.standing)
    }
}

/// Canonical form of an email address used for lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
