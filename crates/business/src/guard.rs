//! Authorization guards
//!
//! [`Guard::with_user`] and [`Guard::with_admin`] wrap an action: they
//! resolve the caller from the [`Session`], run the checks, and only then
//! hand the resolved identity to the action.

use crate::context::ServiceContext;
use crate::error::{ServiceError, ServiceResult};
use crate::session::Session;
use crate::standing::StandingPolicy;
use careswap_core::{AccessDecision, Admin, User};
use std::future::Future;
use tracing::warn;

pub struct Guard<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> Guard<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve the session user and apply the standing policy.
    ///
    /// On a denial the whole session is cleared.
    pub async fn require_user(&self, session: &mut Session) -> ServiceResult<User> {
        let email = session
            .user_email
            .clone()
            .ok_or(ServiceError::AuthenticationRequired)?;

        let mut user = match self.ctx.store().find_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!(email = %email, "Session refers to an unknown user");
                session.clear();
                return Err(ServiceError::AuthenticationRequired);
            }
        };

        match StandingPolicy::new(self.ctx).check_access(&mut user).await? {
            AccessDecision::Denied(reason) => {
                warn!(user_id = %user.id, standing = %user.standing, "Access denied");
                session.clear();
                Err(ServiceError::AccessDenied(reason))
            }
            _ => Ok(user),
        }
    }

    /// Resolve the session admin. Admins have no standing check.
    pub async fn require_admin(&self, session: &Session) -> ServiceResult<Admin> {
        let email = session
            .admin_email
            .as_deref()
            .ok_or(ServiceError::AdminRequired)?;

        self.ctx
            .store()
            .find_admin_by_email(email)
            .await?
            .ok_or(ServiceError::AdminRequired)
    }

    /// Run `action` with the session user once the user guard passes
    pub async fn with_user<F, Fut, T>(&self, session: &mut Session, action: F) -> ServiceResult<T>
    where
        F: FnOnce(User) -> Fut,
        Fut: Future<Output = ServiceResult<T>>,
    {
        let user = self.require_user(session).await?;
        action(user).await
    }

    /// Run `action` with the session admin once the admin guard passes
    pub async fn with_admin<F, Fut, T>(&self, session: &Session, action: F) -> ServiceResult<T>
    where
        F: FnOnce(Admin) -> Fut,
        Fut: Future<Output = ServiceResult<T>>,
    {
        let admin = self.require_admin(session).await?;
        action(admin).await
    }
}
