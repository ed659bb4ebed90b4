//! # Request Module
//!
//! Help requests and their lifecycle:
//!
//! ```text
//! Open --accept--> In Progress --complete--> Completed
//! ```
//!
//! Transitions are forward-only. Acceptance fixes `accepted_by` and
//! credits the acceptor with the request's AURA points in one step.

use crate::error::{CoreError, CoreResult};
use crate::user::{User, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points awarded when the difficulty label is not recognized.
pub const DEFAULT_AURA_POINTS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// AURA points awarded for a request of this difficulty
    pub fn aura_points(&self) -> u32 {
        match self {
            Difficulty::Easy => 50,
            Difficulty::Medium => 70,
            Difficulty::Hard => 120,
        }
    }

    /// Parse a free-form label; anything unknown is treated as Easy,
    /// the difficulty worth [`DEFAULT_AURA_POINTS`].
    pub fn from_label(label: &str) -> Self {
        Self::from_str(label).unwrap_or(Difficulty::Easy)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Open => "Open",
            RequestStatus::InProgress => "In Progress",
            RequestStatus::Completed => "Completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(RequestStatus::Open),
            "In Progress" => Some(RequestStatus::InProgress),
            "Completed" => Some(RequestStatus::Completed),
            _ => None,
        }
    }

    /// Whether `self -> to` is a legal single step
    pub fn can_transition_to(&self, to: RequestStatus) -> bool {
        matches!(
            (self, to),
            (RequestStatus::Open, RequestStatus::InProgress)
                | (RequestStatus::InProgress, RequestStatus::Completed)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The `user_type` label of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// One-directional help
    Senior,
    /// Mutual skill exchange
    CareSwap,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Senior => "Senior",
            RequestKind::CareSwap => "CareSwap",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Senior" => Some(RequestKind::Senior),
            "CareSwap" => Some(RequestKind::CareSwap),
            _ => None,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request-creation input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewHelpRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Free-form label; see [`Difficulty::from_label`]
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_swap: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpRequest {
    pub id: RequestId,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Fixed at creation from the difficulty
    pub aura_points: u32,
    pub difficulty: Difficulty,
    pub status: RequestStatus,
    pub user_type: RequestKind,
    pub location: String,
    pub posted_by: UserId,
    pub posted_date: NaiveDate,
    pub accepted_by: Option<UserId>,
}

impl HelpRequest {
    /// Build a new Open request owned by `owner`.
    pub fn create(
        id: RequestId,
        owner: UserId,
        input: NewHelpRequest,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(CoreError::Validation("Request title is required".to_string()));
        }

        let difficulty = Difficulty::from_label(&input.difficulty);
        let category = non_empty_or(input.category, "general");
        let location = non_empty_or(input.location, "Online");

        Ok(Self {
            id,
            title,
            description: input.description.trim().to_string(),
            category,
            aura_points: difficulty.aura_points(),
            difficulty,
            status: RequestStatus::Open,
            user_type: if input.is_swap {
                RequestKind::CareSwap
            } else {
                RequestKind::Senior
            },
            location,
            posted_by: owner,
            posted_date: now.date_naive(),
            accepted_by: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.status == RequestStatus::Open
    }

    /// Accept the request on behalf of `acceptor` and credit the points.
    ///
    /// Only an Open request moves; anything else is left untouched and
    /// returns None. On success returns the points credited.
    pub fn accept(&mut self, acceptor: &mut User) -> Option<u32> {
        if !self.is_open() {
            return None;
        }
        self.status = RequestStatus::InProgress;
        self.accepted_by = Some(acceptor.id);
        acceptor.credit_points(self.aura_points);
        Some(self.aura_points)
    }

    /// Mark an In Progress request as Completed.
    pub fn complete(&mut self) -> CoreResult<()> {
        if !self.status.can_transition_to(RequestStatus::Completed) {
            return Err(CoreError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: RequestStatus::Completed,
            });
        }
        self.status = RequestStatus::Completed;
        Ok(())
    }

    /// Whether `user` is the poster or the acceptor
    pub fn involves(&self, user: UserId) -> bool {
        self.posted_by == user || self.accepted_by == Some(user)
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
