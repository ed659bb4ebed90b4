//! # Audit Module
//!
//! Append-only record of moderation actions.

use crate::admin::Permission;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of moderation action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Ban,
    Unban,
    Timeout,
    Kick,
    Warn,
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Ban => "ban",
            ModerationAction::Unban => "unban",
            ModerationAction::Timeout => "timeout",
            ModerationAction::Kick => "kick",
            ModerationAction::Warn => "warn",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ban" => Some(ModerationAction::Ban),
            "unban" => Some(ModerationAction::Unban),
            "timeout" => Some(ModerationAction::Timeout),
            "kick" => Some(ModerationAction::Kick),
            "warn" => Some(ModerationAction::Warn),
            _ => None,
        }
    }

    /// Permission an admin needs to perform this action
    pub fn required_permission(&self) -> Permission {
        match self {
            ModerationAction::Ban | ModerationAction::Unban => Permission::Ban,
            ModerationAction::Timeout => Permission::Timeout,
            ModerationAction::Kick => Permission::Kick,
            ModerationAction::Warn => Permission::ManageContent,
        }
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One audit log line. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminLogEntry {
    pub timestamp: DateTime<Utc>,
    /// Acting admin's email
    pub admin: String,
    pub action: ModerationAction,
    /// Target user's email
    pub target: String,
    pub details: String,
}

impl AdminLogEntry {
    pub fn new(
        timestamp: DateTime<Utc>,
        admin: &str,
        action: ModerationAction,
        target: &str,
        details: &str,
    ) -> Self {
        Self {
            timestamp,
            admin: admin.to_string(),
            action,
            target: target.to_string(),
            details: details.to_string(),
        }
    }
}

impl fmt::Display for AdminLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.admin,
            self.action,
            self.target
        )?;
        if !self.details.is_empty() {
            write!(f, " ({})", self.details)?;
        }
        Ok(())
    }
}
