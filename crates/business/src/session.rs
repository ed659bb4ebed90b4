//! Caller identity
//!
//! A [`Session`] is passed explicitly to every guarded operation. It holds
//! at most one user identity and at most one admin identity, which are
//! independent of each other.

use careswap_core::{Admin, Cohort, User};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user_email: Option<String>,
    /// Cached display name, kept in sync on account updates
    pub user_name: Option<String>,
    pub user_cohort: Option<Cohort>,
    pub admin_email: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session of an already logged-in user
    pub fn for_user(user: &User) -> Self {
        let mut session = Self::new();
        session.establish_user(user);
        session
    }

    /// Session of an already logged-in admin
    pub fn for_admin(admin: &Admin) -> Self {
        let mut session = Self::new();
        session.establish_admin(admin);
        session
    }

    pub fn establish_user(&mut self, user: &User) {
        self.user_email = Some(user.email.clone());
        self.user_name = Some(user.name.clone());
        self.user_cohort = Some(user.cohort);
    }

    pub fn establish_admin(&mut self, admin: &Admin) {
        self.admin_email = Some(admin.email.clone());
    }

    /// Drop every identity
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Drop only the admin identity
    pub fn clear_admin(&mut self) {
        self.admin_email = None;
    }

    pub fn is_user(&self) -> bool {
        self.user_email.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.admin_email.is_some()
    }
}
