//! SQLite persistence module
//!
//! [`SqliteStore`] implements [`Store`] on top of the table repositories.
//! Multi-record operations run inside a transaction that is rolled back
//! when any step fails.

pub mod repos;
pub mod schema;

pub use repos::{
    create_schema, init_database, init_memory_database, AdminRepo, LogRepo, RequestRepo,
    SequenceRepo, UserRepo,
};
pub use schema::{AdminRow, LogRow, RequestRow, UserRow, SCHEMA};

use crate::error::{PersistenceError, PersistenceResult};
use crate::store::{AcceptOutcome, RequestFilter, Store};
use async_trait::async_trait;
use careswap_core::{
    Admin, AdminId, AdminLogEntry, HelpRequest, RequestId, RequestStatus, Standing, User, UserId,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::Path;

/// Durable [`Store`] backed by SQLite
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open or create the database file at `path`
    pub async fn open(path: &Path) -> PersistenceResult<Self> {
        Ok(Self {
            pool: init_database(path).await?,
        })
    }

    /// Fresh private in-memory database
    pub async fn in_memory() -> PersistenceResult<Self> {
        Ok(Self {
            pool: init_memory_database().await?,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn next_user_id(&self) -> PersistenceResult<UserId> {
        Ok(UserId(SequenceRepo::next(&self.pool, "users").await?))
    }

    async fn insert_user(&self, user: &User) -> PersistenceResult<()> {
        UserRepo::insert(&self.pool, user).await
    }

    async fn get_user(&self, id: UserId) -> PersistenceResult<Option<User>> {
        UserRepo::get(&self.pool, id).await
    }

    async fn find_user_by_email(&self, email: &str) -> PersistenceResult<Option<User>> {
        UserRepo::find_by_email(&self.pool, email).await
    }

    async fn update_user_profile(&self, user: &User) -> PersistenceResult<()> {
        UserRepo::update_profile(&self.pool, user).await
    }

    async fn touch_last_active(&self, id: UserId, at: DateTime<Utc>) -> PersistenceResult<()> {
        UserRepo::touch_last_active(&self.pool, id, at).await
    }

    async fn list_users(&self) -> PersistenceResult<Vec<User>> {
        UserRepo::get_all(&self.pool).await
    }

    async fn expire_timeout(&self, id: UserId, now: DateTime<Utc>) -> PersistenceResult<bool> {
        if UserRepo::expire_timeout(&self.pool, id, now).await? {
            return Ok(true);
        }
        if !UserRepo::exists(&self.pool, id).await? {
            return Err(PersistenceError::not_found("User", id));
        }
        Ok(false)
    }

    async fn next_admin_id(&self) -> PersistenceResult<AdminId> {
        Ok(AdminId(SequenceRepo::next(&self.pool, "admins").await?))
    }

    async fn insert_admin(&self, admin: &Admin) -> PersistenceResult<()> {
        AdminRepo::insert(&self.pool, admin).await
    }

    async fn get_admin(&self, id: AdminId) -> PersistenceResult<Option<Admin>> {
        AdminRepo::get(&self.pool, id).await
    }

    async fn find_admin_by_email(&self, email: &str) -> PersistenceResult<Option<Admin>> {
        AdminRepo::find_by_email(&self.pool, email).await
    }

    async fn update_admin(&self, admin: &Admin) -> PersistenceResult<()> {
        AdminRepo::update(&self.pool, admin).await
    }

    async fn list_admins(&self) -> PersistenceResult<Vec<Admin>> {
        AdminRepo::get_all(&self.pool).await
    }

    async fn next_request_id(&self) -> PersistenceResult<RequestId> {
        Ok(RequestId(SequenceRepo::next(&self.pool, "help_requests").await?))
    }

    async fn insert_request(&self, request: &HelpRequest) -> PersistenceResult<()> {
        RequestRepo::insert(&self.pool, request).await
    }

    async fn get_request(&self, id: RequestId) -> PersistenceResult<Option<HelpRequest>> {
        RequestRepo::get(&self.pool, id).await
    }

    async fn list_requests(&self, filter: RequestFilter) -> PersistenceResult<Vec<HelpRequest>> {
        RequestRepo::list(&self.pool, filter).await
    }

    async fn accept_request(
        &self,
        id: RequestId,
        acceptor: UserId,
    ) -> PersistenceResult<AcceptOutcome> {
        // Users are never deleted, so this holds for the whole transaction.
        if !UserRepo::exists(&self.pool, acceptor).await? {
            return Err(PersistenceError::not_found("User", acceptor));
        }

        let mut tx = self.pool.begin().await?;

        // The conditional update takes the write lock first; only one
        // caller can see the request as Open.
        if !RequestRepo::claim(&mut *tx, id, acceptor).await? {
            let request = RequestRepo::get(&mut *tx, id)
                .await?
                .ok_or_else(|| PersistenceError::not_found("HelpRequest", id))?;
            tx.rollback().await?;
            return Ok(AcceptOutcome::Unchanged(request));
        }

        if !UserRepo::credit_for_request(&mut *tx, acceptor, id).await? {
            tx.rollback().await?;
            return Err(PersistenceError::not_found("User", acceptor));
        }

        let request = RequestRepo::get(&mut *tx, id)
            .await?
            .ok_or_else(|| PersistenceError::not_found("HelpRequest", id))?;
        let balance = UserRepo::get(&mut *tx, acceptor)
            .await?
            .map(|u| u.aura_points)
            .ok_or_else(|| PersistenceError::not_found("User", acceptor))?;
        tx.commit().await?;

        Ok(AcceptOutcome::Accepted {
            points: request.aura_points,
            request,
            balance,
        })
    }

    async fn transition_request(
        &self,
        id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> PersistenceResult<bool> {
        if RequestRepo::set_status_if(&self.pool, id, from, to).await? {
            return Ok(true);
        }
        match RequestRepo::get(&self.pool, id).await? {
            Some(_) => Ok(false),
            None => Err(PersistenceError::not_found("HelpRequest", id)),
        }
    }

    async fn record_moderation(
        &self,
        user: UserId,
        standing: Option<&Standing>,
        entry: &AdminLogEntry,
    ) -> PersistenceResult<()> {
        let mut tx = self.pool.begin().await?;

        LogRepo::append(&mut *tx, entry).await?;
        match standing {
            Some(standing) => UserRepo::set_standing(&mut *tx, user, standing).await?,
            None => {
                if !UserRepo::exists(&mut *tx, user).await? {
                    return Err(PersistenceError::not_found("User", user));
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_logs(&self) -> PersistenceResult<Vec<AdminLogEntry>> {
        LogRepo::get_all(&self.pool).await
    }

    async fn recent_logs(&self, limit: usize) -> PersistenceResult<Vec<AdminLogEntry>> {
        LogRepo::recent(&self.pool, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careswap_core::{Badge, Cohort, ModerationAction, NewHelpRequest, ProfileVisibility};
    use chrono::{Duration, NaiveDate};

    fn user(id: u64, email: &str, cohort: Cohort) -> User {
        User::new(UserId(id), email, "hash".into(), "Test User", cohort, Utc::now())
    }

    fn request(id: u64, owner: UserId, difficulty: &str) -> HelpRequest {
        let input = NewHelpRequest {
            title: "Teach me online banking".into(),
            difficulty: difficulty.into(),
            ..Default::default()
        };
        HelpRequest::create(RequestId(id), owner, input, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_user_round_trip() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut senior = user(1, "senior@test.com", Cohort::Senior);
        senior.aura_points = 550;
        senior.skills_teach = vec!["Cooking".into(), "Mahjong".into()];
        senior.privacy.profile_visibility = ProfileVisibility::Public;
        senior.add_badge(Badge::award("first_helper", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()).unwrap());
        senior.standing = Standing::timeout(Utc::now() + Duration::hours(3), "cool off");
        store.insert_user(&senior).await.unwrap();

        let loaded = store.find_user_by_email("SENIOR@test.com").await.unwrap().unwrap();
        assert_eq!(loaded, senior);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_user(&user(1, "a@test.com", Cohort::Senior)).await.unwrap();
        let err = store.insert_user(&user(2, "A@TEST.com", Cohort::Youth)).await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_sequences_skip_existing_ids() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_user(&user(3, "a@test.com", Cohort::Senior)).await.unwrap();
        assert_eq!(store.next_user_id().await.unwrap(), UserId(4));
        assert_eq!(store.next_user_id().await.unwrap(), UserId(5));
        assert_eq!(store.next_request_id().await.unwrap(), RequestId(1));
    }

    #[tokio::test]
    async fn test_accept_then_reaccept() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_user(&user(1, "s@test.com", Cohort::Senior)).await.unwrap();
        store.insert_user(&user(2, "y@test.com", Cohort::Youth)).await.unwrap();
        store.insert_user(&user(3, "z@test.com", Cohort::Youth)).await.unwrap();
        store.insert_request(&request(1, UserId(1), "Hard")).await.unwrap();

        match store.accept_request(RequestId(1), UserId(2)).await.unwrap() {
            AcceptOutcome::Accepted { request, points, balance } => {
                assert_eq!(points, 120);
                assert_eq!(balance, 120);
                assert_eq!(request.status, RequestStatus::InProgress);
                assert_eq!(request.accepted_by, Some(UserId(2)));
            }
            other => panic!("expected acceptance, got {:?}", other),
        }

        let again = store.accept_request(RequestId(1), UserId(3)).await.unwrap();
        assert!(!again.is_accepted());
        assert_eq!(again.request().accepted_by, Some(UserId(2)));
        let z = store.get_user(UserId(3)).await.unwrap().unwrap();
        assert_eq!(z.aura_points, 0);
    }

    #[tokio::test]
    async fn test_accept_by_missing_user_rolls_back() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_user(&user(1, "s@test.com", Cohort::Senior)).await.unwrap();
        store.insert_request(&request(1, UserId(1), "Easy")).await.unwrap();

        let err = store.accept_request(RequestId(1), UserId(99)).await.unwrap_err();
        assert!(err.is_not_found());
        let stored = store.get_request(RequestId(1)).await.unwrap().unwrap();
        assert!(stored.is_open());
        assert_eq!(stored.accepted_by, None);

        let missing = store.accept_request(RequestId(7), UserId(1)).await.unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_set() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_user(&user(1, "s@test.com", Cohort::Senior)).await.unwrap();
        store.insert_request(&request(1, UserId(1), "Easy")).await.unwrap();

        let moved = store
            .transition_request(RequestId(1), RequestStatus::InProgress, RequestStatus::Completed)
            .await
            .unwrap();
        assert!(!moved);
    }

    #[tokio::test]
    async fn test_touch_last_active_is_narrow() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_user(&user(1, "a@test.com", Cohort::Youth)).await.unwrap();
        let stale = store.get_user(UserId(1)).await.unwrap().unwrap();

        let mut edited = stale.clone();
        edited.password_hash = "new-hash".into();
        edited.privacy.profile_visibility = ProfileVisibility::Private;
        store.update_user_profile(&edited).await.unwrap();

        let at = stale.last_active + Duration::minutes(5);
        store.touch_last_active(UserId(1), at).await.unwrap();

        let stored = store.get_user(UserId(1)).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new-hash");
        assert_eq!(stored.privacy.profile_visibility, ProfileVisibility::Private);
        assert_eq!(stored.last_active, at);
        assert!(store
            .touch_last_active(UserId(2), at)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_expire_timeout_only_when_lapsed() {
        let store = SqliteStore::in_memory().await.unwrap();
        let now = Utc::now();
        let mut lapsed = user(1, "a@test.com", Cohort::Youth);
        lapsed.standing = Standing::timeout(now - Duration::minutes(5), "old");
        let mut pending = user(2, "b@test.com", Cohort::Youth);
        pending.standing = Standing::timeout(now + Duration::hours(2), "new");
        store.insert_user(&lapsed).await.unwrap();
        store.insert_user(&pending).await.unwrap();

        assert!(store.expire_timeout(UserId(1), now).await.unwrap());
        assert!(!store.expire_timeout(UserId(1), now).await.unwrap());
        assert!(!store.expire_timeout(UserId(2), now).await.unwrap());

        let a = store.get_user(UserId(1)).await.unwrap().unwrap();
        assert_eq!(a.standing, Standing::Active);
        let b = store.get_user(UserId(2)).await.unwrap().unwrap();
        assert_eq!(b.ban_reason(), Some("new"));
    }

    #[tokio::test]
    async fn test_moderation_is_atomic() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_user(&user(1, "y@test.com", Cohort::Youth)).await.unwrap();

        let entry = AdminLogEntry::new(Utc::now(), "admin@careswap.sg", ModerationAction::Ban, "ghost@test.com", "spam");
        let err = store
            .record_moderation(UserId(9), Some(&Standing::banned("spam")), &entry)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(store.list_logs().await.unwrap().is_empty());

        let entry = AdminLogEntry::new(Utc::now(), "admin@careswap.sg", ModerationAction::Ban, "y@test.com", "spam");
        store
            .record_moderation(UserId(1), Some(&Standing::banned("spam")), &entry)
            .await
            .unwrap();
        let logs = store.recent_logs(10).await.unwrap();
        assert_eq!(logs, vec![entry]);
        let banned = store.get_user(UserId(1)).await.unwrap().unwrap();
        assert_eq!(banned.ban_reason(), Some("spam"));
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("careswap.db");

        let store = SqliteStore::open(&path).await.unwrap();
        store.insert_user(&user(1, "s@test.com", Cohort::Senior)).await.unwrap();
        store.close().await;

        let reopened = SqliteStore::open(&path).await.unwrap();
        let users = reopened.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "s@test.com");
        reopened.close().await;
    }
}
