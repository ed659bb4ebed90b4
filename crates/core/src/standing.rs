//! # Standing Module
//!
//! Account standing and the access rules derived from it.
//!
//! The restriction data lives inside the variant, so a deadline can only
//! exist on a timeout and a reason only on a ban or timeout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message shown when a banned account has no stored reason.
pub const GENERIC_BAN_MESSAGE: &str = "Your account has been banned.";

/// Current account-access state of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Standing {
    /// Normal access
    Active,
    /// Permanently blocked until an admin lifts it
    Banned { reason: Option<String> },
    /// Blocked until `until`; a missing deadline blocks nothing
    Timeout {
        until: Option<DateTime<Utc>>,
        reason: Option<String>,
    },
}

/// Outcome of evaluating a standing at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The account may act
    Allowed,
    /// The timeout deadline has passed; the account may act once the
    /// standing is moved back to active
    Expired,
    /// The account may not act
    Denied(String),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed | AccessDecision::Expired)
    }

    pub fn denial_reason(&self) -> Option<&str> {
        match self {
            AccessDecision::Denied(reason) => Some(reason),
            _ => None,
        }
    }
}

impl Standing {
    /// Code string used in storage and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Standing::Active => "active",
            Standing::Banned { .. } => "banned",
            Standing::Timeout { .. } => "timeout",
        }
    }

    /// Rebuild a standing from its stored columns.
    ///
    /// Returns None for an unknown status code.
    pub fn from_parts(
        status: &str,
        until: Option<DateTime<Utc>>,
        reason: Option<String>,
    ) -> Option<Self> {
        match status.to_lowercase().as_str() {
            "active" => Some(Standing::Active),
            "banned" => Some(Standing::Banned { reason }),
            "timeout" => Some(Standing::Timeout { until, reason }),
            _ => None,
        }
    }

    pub fn banned(reason: impl Into<String>) -> Self {
        Standing::Banned {
            reason: Some(reason.into()),
        }
    }

    pub fn timeout(until: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Standing::Timeout {
            until: Some(until),
            reason: Some(reason.into()),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Standing::Active)
    }

    /// Stored explanation for a ban or timeout
    pub fn reason(&self) -> Option<&str> {
        match self {
            Standing::Active => None,
            Standing::Banned { reason } | Standing::Timeout { reason, .. } => reason.as_deref(),
        }
    }

    /// Timeout deadline, present only on a timeout
    pub fn timeout_until(&self) -> Option<DateTime<Utc>> {
        match self {
            Standing::Timeout { until, .. } => *until,
            _ => None,
        }
    }

    /// Decide whether the account may act at `now`.
    ///
    /// Pure: an expired timeout is reported as [`AccessDecision::Expired`]
    /// and left for the caller to persist.
    pub fn evaluate(&self, now: DateTime<Utc>) -> AccessDecision {
        match self {
            Standing::Active => AccessDecision::Allowed,
            Standing::Banned { reason } => AccessDecision::Denied(match reason {
                Some(reason) => format!("{} Reason: {}", GENERIC_BAN_MESSAGE, reason),
                None => GENERIC_BAN_MESSAGE.to_string(),
            }),
            // Only an explicit future deadline blocks.
            Standing::Timeout { until: None, .. } => AccessDecision::Allowed,
            Standing::Timeout {
                until: Some(until),
                reason,
            } => {
                if now < *until {
                    let hours = (*until - now).num_hours();
                    let mut message = format!(
                        "Your account is in timeout. Access will be restored in {} hours.",
                        hours
                    );
                    if let Some(reason) = reason {
                        message.push_str(&format!(" Reason: {}", reason));
                    }
                    AccessDecision::Denied(message)
                } else {
                    AccessDecision::Expired
                }
            }
        }
    }

    /// Move a lapsed timeout back to active.
    ///
    /// Returns true only when a transition happened.
    pub fn lift_expired(&mut self, now: DateTime<Utc>) -> bool {
        if self.evaluate(now) == AccessDecision::Expired {
            *self = Standing::Active;
            true
        } else {
            false
        }
    }
}

impl Default for Standing {
    fn default() -> Self {
        Standing::Active
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_active_is_allowed() {
        assert_eq!(Standing::Active.evaluate(Utc::now()), AccessDecision::Allowed);
    }

    #[test]
    fn test_banned_always_denied() {
        let now = Utc::now();
        let banned = Standing::banned("spam");
        let decision = banned.evaluate(now);
        assert!(!decision.is_allowed());
        assert!(decision.denial_reason().unwrap().contains("spam"));

        // Far future and far past make no difference
        assert!(!banned.evaluate(now + Duration::days(3650)).is_allowed());
        assert!(!banned.evaluate(now - Duration::days(3650)).is_allowed());

        let silent = Standing::Banned { reason: None };
        assert_eq!(
            silent.evaluate(now),
            AccessDecision::Denied(GENERIC_BAN_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_future_timeout_reports_hours() {
        let now = Utc::now();
        let standing = Standing::timeout(now + Duration::hours(5) + Duration::minutes(30), "rude");
        let reason = standing.evaluate(now).denial_reason().unwrap().to_string();
        assert!(reason.contains("restored in 5 hours"));
        assert!(reason.contains("rude"));
    }

    #[test]
    fn test_timeout_over_a_day_counts_all_hours() {
        let now = Utc::now();
        let standing = Standing::timeout(now + Duration::hours(49), "cool off");
        let reason = standing.evaluate(now).denial_reason().unwrap().to_string();
        assert!(reason.contains("restored in 49 hours"));
    }

    #[test]
    fn test_lapsed_timeout_expires_once() {
        let now = Utc::now();
        let mut standing = Standing::timeout(now - Duration::minutes(1), "old");
        assert_eq!(standing.evaluate(now), AccessDecision::Expired);

        assert!(standing.lift_expired(now));
        assert_eq!(standing, Standing::Active);
        assert_eq!(standing.timeout_until(), None);
        assert_eq!(standing.reason(), None);

        // Second check is a no-op
        assert!(!standing.lift_expired(now));
        assert_eq!(standing.evaluate(now), AccessDecision::Allowed);
    }

    #[test]
    fn test_deadline_equal_to_now_has_expired() {
        let now = Utc::now();
        let standing = Standing::timeout(now, "edge");
        assert_eq!(standing.evaluate(now), AccessDecision::Expired);
    }

    #[test]
    fn test_timeout_without_deadline_is_allowed() {
        let standing = Standing::Timeout {
            until: None,
            reason: Some("legacy".into()),
        };
        assert_eq!(standing.evaluate(Utc::now()), AccessDecision::Allowed);
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(Standing::from_parts("ACTIVE", None, None), Some(Standing::Active));
        assert_eq!(
            Standing::from_parts("banned", None, Some("x".into())),
            Some(Standing::banned("x"))
        );
        assert_eq!(Standing::from_parts("frozen", None, None), None);
    }
}
