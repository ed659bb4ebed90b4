//! Moderation engine
//!
//! Every action goes through the admin guard, checks the admin's
//! permission for that action, and writes its standing change together
//! with exactly one audit log entry.

use crate::context::ServiceContext;
use crate::error::{ServiceError, ServiceResult};
use crate::guard::Guard;
use crate::session::Session;
use careswap_core::{
    Admin, AdminLogEntry, Cohort, ModerationAction, Permission, RequestStatus, Standing, User,
    UserId,
};
use careswap_persistence::RequestFilter;
use chrono::{Duration, Utc};
use tracing::{info, warn};

/// Aggregates shown on the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdminStats {
    pub total_users: usize,
    pub seniors: usize,
    pub youths: usize,
    pub active_users: usize,
    pub banned_users: usize,
    pub timeout_users: usize,
    pub total_requests: usize,
    pub open_requests: usize,
    pub completed_requests: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminDashboard {
    pub admin: Admin,
    pub stats: AdminStats,
    pub users: Vec<User>,
    /// Newest first
    pub recent_logs: Vec<AdminLogEntry>,
}

/// Moderation Service - admin-side mutations and reports
pub struct ModerationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ModerationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Ban `target`. A blank reason falls back to the configured default.
    pub async fn ban(&self, session: &Session, target: UserId, reason: Option<&str>) -> ServiceResult<User> {
        let reason = text_or(reason, &self.ctx.config().default_ban_reason);
        self.moderate(
            session,
            ModerationAction::Ban,
            target,
            Some(Standing::banned(reason.clone())),
            reason,
        )
        .await
    }

    /// Restore `target` to active, clearing any ban or timeout
    pub async fn unban(&self, session: &Session, target: UserId) -> ServiceResult<User> {
        self.moderate(
            session,
            ModerationAction::Unban,
            target,
            Some(Standing::Active),
            String::new(),
        )
        .await
    }

    /// Suspend `target` for `hours` (configured default when None)
    pub async fn timeout(
        &self,
        session: &Session,
        target: UserId,
        hours: Option<u32>,
        reason: Option<&str>,
    ) -> ServiceResult<User> {
        let config = self.ctx.config();
        let hours = hours.unwrap_or(config.default_timeout_hours);
        if hours == 0 {
            return Err(ServiceError::validation("Timeout must last at least one hour."));
        }
        let reason = text_or(reason, &config.default_timeout_reason);
        let until = Utc::now()
            .checked_add_signed(Duration::hours(i64::from(hours)))
            .ok_or_else(|| ServiceError::validation("Timeout is too long."))?;

        self.moderate(
            session,
            ModerationAction::Timeout,
            target,
            Some(Standing::timeout(until, reason.clone())),
            format!("{} hours - {}", hours, reason),
        )
        .await
    }

    /// Record a forced logout. Standing and live sessions are untouched.
    pub async fn kick(&self, session: &Session, target: UserId) -> ServiceResult<User> {
        let detail = self.ctx.config().kick_detail.clone();
        self.moderate(session, ModerationAction::Kick, target, None, detail)
            .await
    }

    /// Record a warning message against `target`
    pub async fn warn(&self, session: &Session, target: UserId, message: Option<&str>) -> ServiceResult<User> {
        let message = text_or(message, &self.ctx.config().default_warning);
        self.moderate(session, ModerationAction::Warn, target, None, message)
            .await
    }

    pub async fn dashboard(&self, session: &Session) -> ServiceResult<AdminDashboard> {
        let admin = self.authorize(session, Permission::ViewReports, None).await?;
        let store = self.ctx.store();

        let users = store.list_users().await?;
        let requests = store.list_requests(RequestFilter::All).await?;
        let recent_logs = store.recent_logs(self.ctx.config().recent_log_window).await?;

        let count_standing = |code: &str| users.iter().filter(|u| u.standing.as_str() == code).count();
        let stats = AdminStats {
            total_users: users.len(),
            seniors: users.iter().filter(|u| u.cohort == Cohort::Senior).count(),
            youths: users.iter().filter(|u| u.cohort == Cohort::Youth).count(),
            active_users: count_standing("active"),
            banned_users: count_standing("banned"),
            timeout_users: count_standing("timeout"),
            total_requests: requests.len(),
            open_requests: requests.iter().filter(|r| r.is_open()).count(),
            completed_requests: requests
                .iter()
                .filter(|r| r.status == RequestStatus::Completed)
                .count(),
        };

        Ok(AdminDashboard {
            admin,
            stats,
            users,
            recent_logs,
        })
    }

    /// Full audit log, oldest first
    pub async fn logs(&self, session: &Session) -> ServiceResult<Vec<AdminLogEntry>> {
        self.authorize(session, Permission::ViewReports, None).await?;
        Ok(self.ctx.store().list_logs().await?)
    }

    async fn authorize(
        &self,
        session: &Session,
        permission: Permission,
        action: Option<ModerationAction>,
    ) -> ServiceResult<Admin> {
        Guard::new(self.ctx)
            .with_admin(session, |admin| async move {
                if admin.has_permission(permission) {
                    return Ok(admin);
                }
                warn!(admin = %admin.email, permission = %permission, "Permission denied");
                match action {
                    Some(action) => Err(ServiceError::PermissionDenied { action, permission }),
                    None => Err(ServiceError::access_denied(format!(
                        "Permission denied: '{}' required",
                        permission
                    ))),
                }
            })
            .await
    }

    async fn moderate(
        &self,
        session: &Session,
        action: ModerationAction,
        target: UserId,
        standing: Option<Standing>,
        details: String,
    ) -> ServiceResult<User> {
        let admin = self
            .authorize(session, action.required_permission(), Some(action))
            .await?;
        let store = self.ctx.store();

        let user = store
            .get_user(target)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", target))?;

        let entry = AdminLogEntry::new(Utc::now(), &admin.email, action, &user.email, &details);
        store
            .record_moderation(user.id, standing.as_ref(), &entry)
            .await?;

        info!(
            admin = %admin.email,
            action = %action,
            user_id = %user.id,
            details = %details,
            "Moderation action recorded"
        );

        store
            .get_user(target)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", target))
    }
}

fn text_or(text: Option<&str>, fallback: &str) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => fallback.to_string(),
    }
}
