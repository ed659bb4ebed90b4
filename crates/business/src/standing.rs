//! Standing policy
//!
//! Turns a user's stored standing into an access decision. A lapsed
//! timeout is persisted back to active the first time it is noticed.

use crate::context::ServiceContext;
use crate::error::ServiceResult;
use careswap_core::{AccessDecision, User};
use chrono::{DateTime, Utc};
use tracing::info;

pub struct StandingPolicy<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> StandingPolicy<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Decide access for `user` now
    pub async fn check_access(&self, user: &mut User) -> ServiceResult<AccessDecision> {
        self.check_access_at(user, Utc::now()).await
    }

    /// Decide access for `user` at `now`.
    ///
    /// Returns `Allowed` or `Denied`. An expired timeout is written back as
    /// active (the store only transitions it once) and `user` is updated
    /// to match.
    pub async fn check_access_at(
        &self,
        user: &mut User,
        now: DateTime<Utc>,
    ) -> ServiceResult<AccessDecision> {
        match user.standing.evaluate(now) {
            AccessDecision::Expired => {
                if self.ctx.store().expire_timeout(user.id, now).await? {
                    info!(user_id = %user.id, "Timeout expired, access restored");
                }
                user.standing.lift_expired(now);
                Ok(AccessDecision::Allowed)
            }
            decision => Ok(decision),
        }
    }
}
