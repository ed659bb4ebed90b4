//! Database schema definitions
//!
//! Table DDL plus the row types sqlx maps them into. Collections and
//! preference blocks are stored as JSON text.

use crate::error::{PersistenceError, PersistenceResult};
use careswap_core::{
    Admin, AdminId, AdminLogEntry, AdminRole, Cohort, Difficulty, HelpRequest, ModerationAction,
    Permission, Rating, RequestId, RequestKind, RequestStatus, Standing, User, UserId,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;

/// Full schema; every statement is idempotent.
pub const SCHEMA: &str = r#"
-- Platform members
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    email TEXT NOT NULL COLLATE NOCASE UNIQUE,
    password_hash TEXT NOT NULL,
    name TEXT NOT NULL,
    cohort TEXT NOT NULL,
    phone TEXT NOT NULL DEFAULT '',
    bio TEXT NOT NULL DEFAULT '',
    aura_points INTEGER NOT NULL DEFAULT 0,
    badges TEXT NOT NULL DEFAULT '[]',
    rating_average REAL NOT NULL DEFAULT 0,
    rating_count INTEGER NOT NULL DEFAULT 0,
    completed_tasks INTEGER NOT NULL DEFAULT 0,
    joined_date TEXT NOT NULL,
    last_active TEXT NOT NULL,
    standing TEXT NOT NULL DEFAULT 'active',
    timeout_until TEXT,
    ban_reason TEXT,
    accessibility TEXT NOT NULL,
    privacy TEXT NOT NULL,
    notifications TEXT NOT NULL,
    skills_teach TEXT NOT NULL DEFAULT '[]',
    skills_learn TEXT NOT NULL DEFAULT '[]'
);

-- Moderators and super admins
CREATE TABLE IF NOT EXISTS admins (
    id INTEGER PRIMARY KEY,
    email TEXT NOT NULL COLLATE NOCASE UNIQUE,
    password_hash TEXT NOT NULL,
    name TEXT NOT NULL,
    role TEXT NOT NULL,
    permissions TEXT NOT NULL DEFAULT '[]',
    last_login TEXT
);

-- Help requests
CREATE TABLE IF NOT EXISTS help_requests (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL,
    aura_points INTEGER NOT NULL,
    difficulty TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Open',
    user_type TEXT NOT NULL,
    location TEXT NOT NULL,
    posted_by INTEGER NOT NULL,
    posted_date TEXT NOT NULL,
    accepted_by INTEGER,
    FOREIGN KEY (posted_by) REFERENCES users(id),
    FOREIGN KEY (accepted_by) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_requests_status ON help_requests(status);
CREATE INDEX IF NOT EXISTS idx_requests_posted_by ON help_requests(posted_by);
CREATE INDEX IF NOT EXISTS idx_requests_accepted_by ON help_requests(accepted_by);

-- Append-only moderation log
CREATE TABLE IF NOT EXISTS admin_logs (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    admin TEXT NOT NULL,
    action TEXT NOT NULL,
    target TEXT NOT NULL,
    details TEXT NOT NULL DEFAULT ''
);

-- Last issued id per entity
CREATE TABLE IF NOT EXISTS sequences (
    name TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
"#;

/// Row type for the `users` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub cohort: String,
    pub phone: String,
    pub bio: String,
    pub aura_points: i64,
    pub badges: String,
    pub rating_average: f64,
    pub rating_count: i64,
    pub completed_tasks: i64,
    pub joined_date: NaiveDate,
    pub last_active: DateTime<Utc>,
    pub standing: String,
    pub timeout_until: Option<DateTime<Utc>>,
    pub ban_reason: Option<String>,
    pub accessibility: String,
    pub privacy: String,
    pub notifications: String,
    pub skills_teach: String,
    pub skills_learn: String,
}

/// Row type for the `admins` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub permissions: String,
    pub last_login: Option<DateTime<Utc>>,
}

/// Row type for the `help_requests` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RequestRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub aura_points: i64,
    pub difficulty: String,
    pub status: String,
    pub user_type: String,
    pub location: String,
    pub posted_by: i64,
    pub posted_date: NaiveDate,
    pub accepted_by: Option<i64>,
}

/// Row type for the `admin_logs` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LogRow {
    pub seq: i64,
    pub timestamp: DateTime<Utc>,
    pub admin: String,
    pub action: String,
    pub target: String,
    pub details: String,
}

// === Conversion implementations ===

impl TryFrom<UserRow> for User {
    type Error = PersistenceError;

    fn try_from(row: UserRow) -> PersistenceResult<Self> {
        let cohort = Cohort::from_str(&row.cohort)
            .map_err(|_| PersistenceError::invalid("users.cohort", &row.cohort))?;
        let standing = Standing::from_parts(&row.standing, row.timeout_until, row.ban_reason)
            .ok_or_else(|| PersistenceError::invalid("users.standing", &row.standing))?;

        Ok(User {
            id: UserId(row.id as u64),
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            cohort,
            phone: row.phone,
            bio: row.bio,
            aura_points: row.aura_points.clamp(0, u32::MAX as i64) as u32,
            badges: serde_json::from_str(&row.badges)?,
            rating: Rating::new(row.rating_average as f32, row.rating_count as u32),
            completed_tasks: row.completed_tasks as u32,
            joined_date: row.joined_date,
            last_active: row.last_active,
            standing,
            accessibility: serde_json::from_str(&row.accessibility)?,
            privacy: serde_json::from_str(&row.privacy)?,
            notifications: serde_json::from_str(&row.notifications)?,
            skills_teach: serde_json::from_str(&row.skills_teach)?,
            skills_learn: serde_json::from_str(&row.skills_learn)?,
        })
    }
}

impl TryFrom<AdminRow> for Admin {
    type Error = PersistenceError;

    fn try_from(row: AdminRow) -> PersistenceResult<Self> {
        let role = AdminRole::from_str(&row.role)
            .map_err(|_| PersistenceError::invalid("admins.role", &row.role))?;
        let permissions: BTreeSet<Permission> = serde_json::from_str(&row.permissions)?;

        Ok(Admin {
            id: AdminId(row.id as u64),
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            role,
            permissions,
            last_login: row.last_login,
        })
    }
}

impl TryFrom<RequestRow> for HelpRequest {
    type Error = PersistenceError;

    fn try_from(row: RequestRow) -> PersistenceResult<Self> {
        let difficulty = Difficulty::from_str(&row.difficulty)
            .ok_or_else(|| PersistenceError::invalid("help_requests.difficulty", &row.difficulty))?;
        let status = RequestStatus::from_str(&row.status)
            .ok_or_else(|| PersistenceError::invalid("help_requests.status", &row.status))?;
        let user_type = RequestKind::from_str(&row.user_type)
            .ok_or_else(|| PersistenceError::invalid("help_requests.user_type", &row.user_type))?;

        Ok(HelpRequest {
            id: RequestId(row.id as u64),
            title: row.title,
            description: row.description,
            category: row.category,
            aura_points: row.aura_points as u32,
            difficulty,
            status,
            user_type,
            location: row.location,
            posted_by: UserId(row.posted_by as u64),
            posted_date: row.posted_date,
            accepted_by: row.accepted_by.map(|id| UserId(id as u64)),
        })
    }
}

impl TryFrom<LogRow> for AdminLogEntry {
    type Error = PersistenceError;

    fn try_from(row: LogRow) -> PersistenceResult<Self> {
        let action = ModerationAction::from_str(&row.action)
            .ok_or_else(|| PersistenceError::invalid("admin_logs.action", &row.action))?;

        Ok(AdminLogEntry {
            timestamp: row.timestamp,
            admin: row.admin,
            action,
            target: row.target,
            details: row.details,
        })
    }
}
