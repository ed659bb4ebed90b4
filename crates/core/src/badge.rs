//! # Badge Module
//!
//! Badges earned by users and the catalog that describes them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Static description of an earnable badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

/// Badge every new account starts with
pub const NEWCOMER: &str = "newcomer";

/// Every badge the platform can award.
pub const CATALOG: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: "newcomer",
        name: "Newcomer",
        icon: "🌱",
        description: "Joined the CareSwap community",
    },
    BadgeDefinition {
        id: "first_helper",
        name: "First Helper",
        icon: "🌟",
        description: "Completed your first help request",
    },
    BadgeDefinition {
        id: "tech_learner",
        name: "Tech Learner",
        icon: "📱",
        description: "Learned 5 tech skills",
    },
    BadgeDefinition {
        id: "tech_guru",
        name: "Tech Guru",
        icon: "💻",
        description: "Taught 10 tech sessions",
    },
    BadgeDefinition {
        id: "wisdom_sharer",
        name: "Wisdom Sharer",
        icon: "📚",
        description: "Shared traditional knowledge",
    },
    BadgeDefinition {
        id: "helper_star",
        name: "Helper Star",
        icon: "⭐",
        description: "Received 5-star ratings 10 times",
    },
    BadgeDefinition {
        id: "community_champion",
        name: "Community Champion",
        icon: "🏆",
        description: "Top helper of the month",
    },
    BadgeDefinition {
        id: "patient_teacher",
        name: "Patient Teacher",
        icon: "🎓",
        description: "Praised for patience 5 times",
    },
    BadgeDefinition {
        id: "super_helper",
        name: "Super Helper",
        icon: "🦸",
        description: "Completed 50 tasks",
    },
    BadgeDefinition {
        id: "first_swap",
        name: "First Swap",
        icon: "🔄",
        description: "Completed first skill swap",
    },
    BadgeDefinition {
        id: "social_butterfly",
        name: "Social Butterfly",
        icon: "🦋",
        description: "Connected with 10 users",
    },
];

/// Look up a catalog entry by badge id
pub fn definition(id: &str) -> Option<&'static BadgeDefinition> {
    CATALOG.iter().find(|b| b.id == id)
}

/// A badge held by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub earned: NaiveDate,
}

impl Badge {
    /// Badge from the catalog, earned on `earned`.
    ///
    /// Returns None for an id the catalog does not know.
    pub fn award(id: &str, earned: NaiveDate) -> Option<Self> {
        definition(id).map(|def| Self {
            id: def.id.to_string(),
            name: def.name.to_string(),
            icon: def.icon.to_string(),
            earned,
        })
    }

    pub fn description(&self) -> Option<&'static str> {
        definition(&self.id).map(|def| def.description)
    }
}
