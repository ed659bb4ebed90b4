//! In-memory store
//!
//! All state sits behind one `RwLock`, so every multi-record operation
//! runs under a single write guard.

use crate::error::{PersistenceError, PersistenceResult};
use crate::store::{AcceptOutcome, RequestFilter, Store};
use async_trait::async_trait;
use careswap_core::{
    normalize_email, Admin, AdminId, AdminLogEntry, HelpRequest, RequestId, RequestStatus,
    Standing, User, UserId,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug)]
struct State {
    users: BTreeMap<UserId, User>,
    user_emails: HashMap<String, UserId>,
    admins: BTreeMap<AdminId, Admin>,
    admin_emails: HashMap<String, AdminId>,
    requests: BTreeMap<RequestId, HelpRequest>,
    logs: Vec<AdminLogEntry>,
    next_user: u64,
    next_admin: u64,
    next_request: u64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            user_emails: HashMap::new(),
            admins: BTreeMap::new(),
            admin_emails: HashMap::new(),
            requests: BTreeMap::new(),
            logs: Vec::new(),
            next_user: 1,
            next_admin: 1,
            next_request: 1,
        }
    }
}

/// Volatile [`Store`] for tests and demos
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn next_user_id(&self) -> PersistenceResult<UserId> {
        let mut state = self.state.write().await;
        let id = state.next_user;
        state.next_user += 1;
        Ok(UserId(id))
    }

    async fn insert_user(&self, user: &User) -> PersistenceResult<()> {
        let mut state = self.state.write().await;
        let email = normalize_email(&user.email);
        if state.users.contains_key(&user.id) {
            return Err(PersistenceError::already_exists("User", user.id));
        }
        if state.user_emails.contains_key(&email) {
            return Err(PersistenceError::already_exists("User", &email));
        }
        state.next_user = state.next_user.max(user.id.0 + 1);
        state.user_emails.insert(email, user.id);
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> PersistenceResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> PersistenceResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .user_emails
            .get(&normalize_email(email))
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn update_user_profile(&self, user: &User) -> PersistenceResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .users
            .get(&user.id)
            .ok_or_else(|| PersistenceError::not_found("User", user.id))?;

        let old_email = normalize_email(&stored.email);
        let new_email = normalize_email(&user.email);
        if old_email != new_email {
            if state.user_emails.contains_key(&new_email) {
                return Err(PersistenceError::already_exists("User", &new_email));
            }
            state.user_emails.remove(&old_email);
            state.user_emails.insert(new_email, user.id);
        }

        let stored = state
            .users
            .get_mut(&user.id)
            .ok_or_else(|| PersistenceError::not_found("User", user.id))?;
        let aura_points = stored.aura_points;
        let standing = stored.standing.clone();
        *stored = user.clone();
        stored.aura_points = aura_points;
        stored.standing = standing;
        Ok(())
    }

    async fn touch_last_active(&self, id: UserId, at: DateTime<Utc>) -> PersistenceResult<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::not_found("User", id))?;
        user.last_active = at;
        Ok(())
    }

    async fn list_users(&self) -> PersistenceResult<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn expire_timeout(&self, id: UserId, now: DateTime<Utc>) -> PersistenceResult<bool> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::not_found("User", id))?;
        Ok(user.standing.lift_expired(now))
    }

    async fn next_admin_id(&self) -> PersistenceResult<AdminId> {
        let mut state = self.state.write().await;
        let id = state.next_admin;
        state.next_admin += 1;
        Ok(AdminId(id))
    }

    async fn insert_admin(&self, admin: &Admin) -> PersistenceResult<()> {
        let mut state = self.state.write().await;
        let email = normalize_email(&admin.email);
        if state.admins.contains_key(&admin.id) {
            return Err(PersistenceError::already_exists("Admin", admin.id));
        }
        if state.admin_emails.contains_key(&email) {
            return Err(PersistenceError::already_exists("Admin", &email));
        }
        state.next_admin = state.next_admin.max(admin.id.0 + 1);
        state.admin_emails.insert(email, admin.id);
        state.admins.insert(admin.id, admin.clone());
        Ok(())
    }

    async fn get_admin(&self, id: AdminId) -> PersistenceResult<Option<Admin>> {
        Ok(self.state.read().await.admins.get(&id).cloned())
    }

    async fn find_admin_by_email(&self, email: &str) -> PersistenceResult<Option<Admin>> {
        let state = self.state.read().await;
        Ok(state
            .admin_emails
            .get(&normalize_email(email))
            .and_then(|id| state.admins.get(id))
            .cloned())
    }

    async fn update_admin(&self, admin: &Admin) -> PersistenceResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .admins
            .get_mut(&admin.id)
            .ok_or_else(|| PersistenceError::not_found("Admin", admin.id))?;
        if normalize_email(&stored.email) != normalize_email(&admin.email) {
            return Err(PersistenceError::invalid("admin.email", &admin.email));
        }
        *stored = admin.clone();
        Ok(())
    }

    async fn list_admins(&self) -> PersistenceResult<Vec<Admin>> {
        Ok(self.state.read().await.admins.values().cloned().collect())
    }

    async fn next_request_id(&self) -> PersistenceResult<RequestId> {
        let mut state = self.state.write().await;
        let id = state.next_request;
        state.next_request += 1;
        Ok(RequestId(id))
    }

    async fn insert_request(&self, request: &HelpRequest) -> PersistenceResult<()> {
        let mut state = self.state.write().await;
        if state.requests.contains_key(&request.id) {
            return Err(PersistenceError::already_exists("HelpRequest", request.id));
        }
        state.next_request = state.next_request.max(request.id.0 + 1);
        state.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn get_request(&self, id: RequestId) -> PersistenceResult<Option<HelpRequest>> {
        Ok(self.state.read().await.requests.get(&id).cloned())
    }

    async fn list_requests(&self, filter: RequestFilter) -> PersistenceResult<Vec<HelpRequest>> {
        Ok(self
            .state
            .read()
            .await
            .requests
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn accept_request(
        &self,
        id: RequestId,
        acceptor: UserId,
    ) -> PersistenceResult<AcceptOutcome> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let request = state
            .requests
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::not_found("HelpRequest", id))?;
        let user = state
            .users
            .get_mut(&acceptor)
            .ok_or_else(|| PersistenceError::not_found("User", acceptor))?;

        match request.accept(user) {
            Some(points) => Ok(AcceptOutcome::Accepted {
                request: request.clone(),
                points,
                balance: user.aura_points,
            }),
            None => Ok(AcceptOutcome::Unchanged(request.clone())),
        }
    }

    async fn transition_request(
        &self,
        id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> PersistenceResult<bool> {
        let mut state = self.state.write().await;
        let request = state
            .requests
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::not_found("HelpRequest", id))?;
        if request.status != from {
            return Ok(false);
        }
        request.status = to;
        Ok(true)
    }

    async fn record_moderation(
        &self,
        user: UserId,
        standing: Option<&Standing>,
        entry: &AdminLogEntry,
    ) -> PersistenceResult<()> {
        let mut state = self.state.write().await;
        let target = state
            .users
            .get_mut(&user)
            .ok_or_else(|| PersistenceError::not_found("User", user))?;
        if let Some(standing) = standing {
            target.standing = standing.clone();
        }
        state.logs.push(entry.clone());
        Ok(())
    }

    async fn list_logs(&self) -> PersistenceResult<Vec<AdminLogEntry>> {
        Ok(self.state.read().await.logs.clone())
    }

    async fn recent_logs(&self, limit: usize) -> PersistenceResult<Vec<AdminLogEntry>> {
        Ok(self
            .state
            .read()
            .await
            .logs
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}
