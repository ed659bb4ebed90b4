//! # Admin Module
//!
//! Moderators and super admins. Admins have no standing lifecycle; what
//! they may do is governed by their permission set.

use crate::error::{CoreError, CoreResult};
use crate::user::normalize_email;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminId(pub u64);

impl fmt::Display for AdminId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Holds every permission regardless of the stored set
    SuperAdmin,
    Moderator,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::Moderator => "moderator",
        }
    }

    pub fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "super_admin" => Ok(AdminRole::SuperAdmin),
            "moderator" => Ok(AdminRole::Moderator),
            other => Err(CoreError::unknown("admin role", other)),
        }
    }
}

/// Admin permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Ban,
    Kick,
    Timeout,
    ViewReports,
    ManageContent,
    ManageAdmins,
}

impl Permission {
    pub const ALL: [Permission; 6] = [
        Permission::Ban,
        Permission::Kick,
        Permission::Timeout,
        Permission::ViewReports,
        Permission::ManageContent,
        Permission::ManageAdmins,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Ban => "ban",
            Permission::Kick => "kick",
            Permission::Timeout => "timeout",
            Permission::ViewReports => "view_reports",
            Permission::ManageContent => "manage_content",
            Permission::ManageAdmins => "manage_admins",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    /// Stored lowercase; unique across admins
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub name: String,
    pub role: AdminRole,
    pub permissions: BTreeSet<Permission>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Admin {
    pub fn new(
        id: AdminId,
        email: &str,
        password_hash: String,
        name: &str,
        role: AdminRole,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            id,
            email: normalize_email(email),
            password_hash,
            name: name.to_string(),
            role,
            permissions: permissions.into_iter().collect(),
            last_login: None,
        }
    }

    /// Super admin holding the full permission set
    pub fn super_admin(id: AdminId, email: &str, password_hash: String, name: &str) -> Self {
        Self::new(id, email, password_hash, name, AdminRole::SuperAdmin, Permission::ALL)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role == AdminRole::SuperAdmin || self.permissions.contains(&permission)
    }
}
