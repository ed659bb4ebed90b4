//! Repository implementations for SQLite
//!
//! Query helpers per table. Each takes any SQLite executor, so the same
//! helper runs against the pool or inside a transaction.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;
use crate::store::RequestFilter;
use careswap_core::{
    Admin, AdminId, AdminLogEntry, HelpRequest, RequestId, RequestStatus, Standing, User, UserId,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteExecutor, SqlitePool};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Sequences
// ============================================================================

/// Monotonic id issuance
pub struct SequenceRepo;

impl SequenceRepo {
    /// Issue the next id for `table`, never below its current max id.
    pub async fn next<'e>(executor: impl SqliteExecutor<'e>, table: &str) -> PersistenceResult<u64> {
        let sql = format!(
            "INSERT INTO sequences (name, value) \
             VALUES (?1, (SELECT COALESCE(MAX(id), 0) FROM {table}) + 1) \
             ON CONFLICT(name) DO UPDATE SET \
             value = MAX(value, (SELECT COALESCE(MAX(id), 0) FROM {table})) + 1 \
             RETURNING value"
        );
        let (value,): (i64,) = sqlx::query_as(&sql).bind(table).fetch_one(executor).await?;
        Ok(value as u64)
    }
}

// ============================================================================
// User Repository
// ============================================================================

/// Repository for the users table
pub struct UserRepo;

impl UserRepo {
    pub async fn get<'e>(
        executor: impl SqliteExecutor<'e>,
        id: UserId,
    ) -> PersistenceResult<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id.0 as i64)
            .fetch_optional(executor)
            .await?
            .map(User::try_from)
            .transpose()
    }

    pub async fn find_by_email<'e>(
        executor: impl SqliteExecutor<'e>,
        email: &str,
    ) -> PersistenceResult<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
            .bind(email.trim())
            .fetch_optional(executor)
            .await?
            .map(User::try_from)
            .transpose()
    }

    pub async fn get_all<'e>(executor: impl SqliteExecutor<'e>) -> PersistenceResult<Vec<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY id")
            .fetch_all(executor)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    pub async fn insert<'e>(executor: impl SqliteExecutor<'e>, user: &User) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, name, cohort, phone, bio, aura_points, badges,
                rating_average, rating_count, completed_tasks, joined_date, last_active,
                standing, timeout_until, ban_reason, accessibility, privacy, notifications,
                skills_teach, skills_learn
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.0 as i64)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.cohort.as_str())
        .bind(&user.phone)
        .bind(&user.bio)
        .bind(user.aura_points as i64)
        .bind(serde_json::to_string(&user.badges)?)
        .bind(user.rating.average as f64)
        .bind(user.rating.count as i64)
        .bind(user.completed_tasks as i64)
        .bind(user.joined_date)
        .bind(user.last_active)
        .bind(user.standing.as_str())
        .bind(user.standing.timeout_until())
        .bind(user.standing.reason())
        .bind(serde_json::to_string(&user.accessibility)?)
        .bind(serde_json::to_string(&user.privacy)?)
        .bind(serde_json::to_string(&user.notifications)?)
        .bind(serde_json::to_string(&user.skills_teach)?)
        .bind(serde_json::to_string(&user.skills_learn)?)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Update everything except points and standing
    pub async fn update_profile<'e>(
        executor: impl SqliteExecutor<'e>,
        user: &User,
    ) -> PersistenceResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = ?, password_hash = ?, name = ?, cohort = ?, phone = ?, bio = ?,
                badges = ?, rating_average = ?, rating_count = ?, completed_tasks = ?,
                last_active = ?, accessibility = ?, privacy = ?, notifications = ?,
                skills_teach = ?, skills_learn = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.cohort.as_str())
        .bind(&user.phone)
        .bind(&user.bio)
        .bind(serde_json::to_string(&user.badges)?)
        .bind(user.rating.average as f64)
        .bind(user.rating.count as i64)
        .bind(user.completed_tasks as i64)
        .bind(user.last_active)
        .bind(serde_json::to_string(&user.accessibility)?)
        .bind(serde_json::to_string(&user.privacy)?)
        .bind(serde_json::to_string(&user.notifications)?)
        .bind(serde_json::to_string(&user.skills_teach)?)
        .bind(serde_json::to_string(&user.skills_learn)?)
        .bind(user.id.0 as i64)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("User", user.id));
        }
        Ok(())
    }

    pub async fn touch_last_active<'e>(
        executor: impl SqliteExecutor<'e>,
        id: UserId,
        at: DateTime<Utc>,
    ) -> PersistenceResult<()> {
        let result = sqlx::query("UPDATE users SET last_active = ? WHERE id = ?")
            .bind(at)
            .bind(id.0 as i64)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("User", id));
        }
        Ok(())
    }

    /// Overwrite the standing columns
    pub async fn set_standing<'e>(
        executor: impl SqliteExecutor<'e>,
        id: UserId,
        standing: &Standing,
    ) -> PersistenceResult<()> {
        let result = sqlx::query(
            "UPDATE users SET standing = ?, timeout_until = ?, ban_reason = ? WHERE id = ?",
        )
        .bind(standing.as_str())
        .bind(standing.timeout_until())
        .bind(standing.reason())
        .bind(id.0 as i64)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("User", id));
        }
        Ok(())
    }

    /// Lift a lapsed timeout; false when there was nothing to lift.
    pub async fn expire_timeout<'e>(
        executor: impl SqliteExecutor<'e>,
        id: UserId,
        now: DateTime<Utc>,
    ) -> PersistenceResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET standing = 'active', timeout_until = NULL, ban_reason = NULL
            WHERE id = ? AND standing = 'timeout'
              AND timeout_until IS NOT NULL AND timeout_until <= ?
            "#,
        )
        .bind(id.0 as i64)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add the points of `request` to `user`, saturating at u32::MAX
    pub async fn credit_for_request<'e>(
        executor: impl SqliteExecutor<'e>,
        user: UserId,
        request: RequestId,
    ) -> PersistenceResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET aura_points = MIN(
                aura_points + (SELECT aura_points FROM help_requests WHERE id = ?),
                4294967295
            )
            WHERE id = ?
            "#,
        )
        .bind(request.0 as i64)
        .bind(user.0 as i64)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists<'e>(executor: impl SqliteExecutor<'e>, id: UserId) -> PersistenceResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(id.0 as i64)
            .fetch_optional(executor)
            .await?;
        Ok(row.is_some())
    }

    pub async fn count<'e>(executor: impl SqliteExecutor<'e>) -> PersistenceResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(executor)
            .await?;
        Ok(count)
    }
}

// ============================================================================
// Admin Repository
// ============================================================================

/// Repository for the admins table
pub struct AdminRepo;

impl AdminRepo {
    pub async fn get<'e>(
        executor: impl SqliteExecutor<'e>,
        id: AdminId,
    ) -> PersistenceResult<Option<Admin>> {
        sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE id = ?")
            .bind(id.0 as i64)
            .fetch_optional(executor)
            .await?
            .map(Admin::try_from)
            .transpose()
    }

    pub async fn find_by_email<'e>(
        executor: impl SqliteExecutor<'e>,
        email: &str,
    ) -> PersistenceResult<Option<Admin>> {
        sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE email = ?")
            .bind(email.trim())
            .fetch_optional(executor)
            .await?
            .map(Admin::try_from)
            .transpose()
    }

    pub async fn get_all<'e>(executor: impl SqliteExecutor<'e>) -> PersistenceResult<Vec<Admin>> {
        sqlx::query_as::<_, AdminRow>("SELECT * FROM admins ORDER BY id")
            .fetch_all(executor)
            .await?
            .into_iter()
            .map(Admin::try_from)
            .collect()
    }

    pub async fn insert<'e>(executor: impl SqliteExecutor<'e>, admin: &Admin) -> PersistenceResult<()> {
        sqlx::query(
            "INSERT INTO admins (id, email, password_hash, name, role, permissions, last_login) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(admin.id.0 as i64)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(&admin.name)
        .bind(admin.role.as_str())
        .bind(serde_json::to_string(&admin.permissions)?)
        .bind(admin.last_login)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Update name, credentials, role, permissions and last login
    pub async fn update<'e>(executor: impl SqliteExecutor<'e>, admin: &Admin) -> PersistenceResult<()> {
        let result = sqlx::query(
            "UPDATE admins SET password_hash = ?, name = ?, role = ?, permissions = ?, \
             last_login = ? WHERE id = ?",
        )
        .bind(&admin.password_hash)
        .bind(&admin.name)
        .bind(admin.role.as_str())
        .bind(serde_json::to_string(&admin.permissions)?)
        .bind(admin.last_login)
        .bind(admin.id.0 as i64)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Admin", admin.id));
        }
        Ok(())
    }
}

// ============================================================================
// Help Request Repository
// ============================================================================

/// Repository for the help_requests table
pub struct RequestRepo;

impl RequestRepo {
    pub async fn get<'e>(
        executor: impl SqliteExecutor<'e>,
        id: RequestId,
    ) -> PersistenceResult<Option<HelpRequest>> {
        sqlx::query_as::<_, RequestRow>("SELECT * FROM help_requests WHERE id = ?")
            .bind(id.0 as i64)
            .fetch_optional(executor)
            .await?
            .map(HelpRequest::try_from)
            .transpose()
    }

    pub async fn list<'e>(
        executor: impl SqliteExecutor<'e>,
        filter: RequestFilter,
    ) -> PersistenceResult<Vec<HelpRequest>> {
        let rows = match filter {
            RequestFilter::All => {
                sqlx::query_as::<_, RequestRow>("SELECT * FROM help_requests ORDER BY id")
                    .fetch_all(executor)
                    .await?
            }
            RequestFilter::PostedBy(user) => {
                sqlx::query_as::<_, RequestRow>(
                    "SELECT * FROM help_requests WHERE posted_by = ? ORDER BY id",
                )
                .bind(user.0 as i64)
                .fetch_all(executor)
                .await?
            }
            RequestFilter::AcceptedBy(user) => {
                sqlx::query_as::<_, RequestRow>(
                    "SELECT * FROM help_requests WHERE accepted_by = ? ORDER BY id",
                )
                .bind(user.0 as i64)
                .fetch_all(executor)
                .await?
            }
            RequestFilter::Status(status) => {
                sqlx::query_as::<_, RequestRow>(
                    "SELECT * FROM help_requests WHERE status = ? ORDER BY id",
                )
                .bind(status.as_str())
                .fetch_all(executor)
                .await?
            }
        };
        rows.into_iter().map(HelpRequest::try_from).collect()
    }

    pub async fn insert<'e>(
        executor: impl SqliteExecutor<'e>,
        request: &HelpRequest,
    ) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO help_requests (
                id, title, description, category, aura_points, difficulty, status,
                user_type, location, posted_by, posted_date, accepted_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.id.0 as i64)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.category)
        .bind(request.aura_points as i64)
        .bind(request.difficulty.as_str())
        .bind(request.status.as_str())
        .bind(request.user_type.as_str())
        .bind(&request.location)
        .bind(request.posted_by.0 as i64)
        .bind(request.posted_date)
        .bind(request.accepted_by.map(|id| id.0 as i64))
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Open -> In Progress for `acceptor`; false when not Open
    pub async fn claim<'e>(
        executor: impl SqliteExecutor<'e>,
        id: RequestId,
        acceptor: UserId,
    ) -> PersistenceResult<bool> {
        let result = sqlx::query(
            "UPDATE help_requests SET status = ?, accepted_by = ? WHERE id = ? AND status = ?",
        )
        .bind(RequestStatus::InProgress.as_str())
        .bind(acceptor.0 as i64)
        .bind(id.0 as i64)
        .bind(RequestStatus::Open.as_str())
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Compare-and-set on status
    pub async fn set_status_if<'e>(
        executor: impl SqliteExecutor<'e>,
        id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> PersistenceResult<bool> {
        let result = sqlx::query("UPDATE help_requests SET status = ? WHERE id = ? AND status = ?")
            .bind(to.as_str())
            .bind(id.0 as i64)
            .bind(from.as_str())
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Admin Log Repository
// ============================================================================

/// Repository for the admin_logs table
pub struct LogRepo;

impl LogRepo {
    pub async fn append<'e>(
        executor: impl SqliteExecutor<'e>,
        entry: &AdminLogEntry,
    ) -> PersistenceResult<()> {
        sqlx::query(
            "INSERT INTO admin_logs (timestamp, admin, action, target, details) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.timestamp)
        .bind(&entry.admin)
        .bind(entry.action.as_str())
        .bind(&entry.target)
        .bind(&entry.details)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn get_all<'e>(executor: impl SqliteExecutor<'e>) -> PersistenceResult<Vec<AdminLogEntry>> {
        sqlx::query_as::<_, LogRow>("SELECT * FROM admin_logs ORDER BY seq")
            .fetch_all(executor)
            .await?
            .into_iter()
            .map(AdminLogEntry::try_from)
            .collect()
    }

    /// Newest first
    pub async fn recent<'e>(
        executor: impl SqliteExecutor<'e>,
        limit: usize,
    ) -> PersistenceResult<Vec<AdminLogEntry>> {
        sqlx::query_as::<_, LogRow>("SELECT * FROM admin_logs ORDER BY seq DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(executor)
            .await?
            .into_iter()
            .map(AdminLogEntry::try_from)
            .collect()
    }
}

// ============================================================================
// Database initialization
// ============================================================================

/// Create every table and index
pub async fn create_schema(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

/// Open (creating if needed) a database file and apply the schema
pub async fn init_database(path: &Path) -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Private in-memory database with the schema applied.
///
/// A single connection that is never recycled, so the data lives as long
/// as the pool.
pub async fn init_memory_database() -> PersistenceResult<SqlitePool> {
    let options = "sqlite::memory:"
        .parse::<SqliteConnectOptions>()?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}
