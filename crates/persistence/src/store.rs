//! Store abstraction
//!
//! Every backend implements [`Store`]. Operations that touch more than one
//! record (accepting a request, recording a moderation action) are atomic:
//! either every change lands or none does.

use crate::error::PersistenceResult;
use async_trait::async_trait;
use careswap_core::{
    Admin, AdminId, AdminLogEntry, HelpRequest, RequestId, RequestStatus, Standing, User, UserId,
};
use chrono::{DateTime, Utc};

/// Which help requests to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFilter {
    All,
    PostedBy(UserId),
    AcceptedBy(UserId),
    Status(RequestStatus),
}

impl RequestFilter {
    pub fn matches(&self, request: &HelpRequest) -> bool {
        match self {
            RequestFilter::All => true,
            RequestFilter::PostedBy(user) => request.posted_by == *user,
            RequestFilter::AcceptedBy(user) => request.accepted_by == Some(*user),
            RequestFilter::Status(status) => request.status == *status,
        }
    }
}

/// Result of an accept attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AcceptOutcome {
    /// The request moved to In Progress and the acceptor was credited
    Accepted {
        request: HelpRequest,
        points: u32,
        balance: u32,
    },
    /// The request was not Open; nothing changed
    Unchanged(HelpRequest),
}

impl AcceptOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AcceptOutcome::Accepted { .. })
    }

    pub fn request(&self) -> &HelpRequest {
        match self {
            AcceptOutcome::Accepted { request, .. } | AcceptOutcome::Unchanged(request) => request,
        }
    }
}

/// Persistent state of the platform
#[async_trait]
pub trait Store: Send + Sync {
    // === Users ===

    /// Reserve the next user id; ids are never reused
    async fn next_user_id(&self) -> PersistenceResult<UserId>;

    /// Insert a new user. Fails with `AlreadyExists` on a taken id or email.
    async fn insert_user(&self, user: &User) -> PersistenceResult<()>;

    async fn get_user(&self, id: UserId) -> PersistenceResult<Option<User>>;

    /// Case-insensitive lookup
    async fn find_user_by_email(&self, email: &str) -> PersistenceResult<Option<User>>;

    /// Write profile, credential and preference fields.
    ///
    /// AURA points and standing are left as stored; they only change
    /// through [`Store::accept_request`], [`Store::expire_timeout`] and
    /// [`Store::record_moderation`].
    async fn update_user_profile(&self, user: &User) -> PersistenceResult<()>;

    /// Record activity at `at` without touching any other field
    async fn touch_last_active(&self, id: UserId, at: DateTime<Utc>) -> PersistenceResult<()>;

    /// All users ordered by id
    async fn list_users(&self) -> PersistenceResult<Vec<User>>;

    /// Move a user whose timeout has lapsed at `now` back to active.
    ///
    /// Returns true only when this call made the transition.
    async fn expire_timeout(&self, id: UserId, now: DateTime<Utc>) -> PersistenceResult<bool>;

    // === Admins ===

    async fn next_admin_id(&self) -> PersistenceResult<AdminId>;

    async fn insert_admin(&self, admin: &Admin) -> PersistenceResult<()>;

    async fn get_admin(&self, id: AdminId) -> PersistenceResult<Option<Admin>>;

    async fn find_admin_by_email(&self, email: &str) -> PersistenceResult<Option<Admin>>;

    async fn update_admin(&self, admin: &Admin) -> PersistenceResult<()>;

    async fn list_admins(&self) -> PersistenceResult<Vec<Admin>>;

    // === Help requests ===

    async fn next_request_id(&self) -> PersistenceResult<RequestId>;

    async fn insert_request(&self, request: &HelpRequest) -> PersistenceResult<()>;

    async fn get_request(&self, id: RequestId) -> PersistenceResult<Option<HelpRequest>>;

    /// Matching requests ordered by id
    async fn list_requests(&self, filter: RequestFilter) -> PersistenceResult<Vec<HelpRequest>>;

    /// Atomically move an Open request to In Progress, record the acceptor
    /// and credit the request's points to them.
    ///
    /// Fails with `NotFound` when the request or the acceptor is missing.
    async fn accept_request(
        &self,
        id: RequestId,
        acceptor: UserId,
    ) -> PersistenceResult<AcceptOutcome>;

    /// Compare-and-set the status of a request.
    ///
    /// Returns false when the stored status is not `from`.
    async fn transition_request(
        &self,
        id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> PersistenceResult<bool>;

    // === Moderation ===

    /// Apply an optional standing change to a user and append the log
    /// entry, as one unit.
    async fn record_moderation(
        &self,
        user: UserId,
        standing: Option<&Standing>,
        entry: &AdminLogEntry,
    ) -> PersistenceResult<()>;

    /// Full audit log in insertion order
    async fn list_logs(&self) -> PersistenceResult<Vec<AdminLogEntry>>;

    /// The latest `limit` entries, newest first
    async fn recent_logs(&self, limit: usize) -> PersistenceResult<Vec<AdminLogEntry>>;
}
