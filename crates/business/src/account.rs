//! Account operations - signup, login, settings
//!
//! AccountService owns everything a member does to their own account,
//! plus the admin login/logout pair.

use crate::context::ServiceContext;
use crate::error::{ServiceError, ServiceResult};
use crate::guard::Guard;
use crate::password::{hash_password, verify_password};
use crate::session::Session;
use crate::standing::StandingPolicy;
use careswap_core::badge::NEWCOMER;
use careswap_core::{
    normalize_email, AccessDecision, AccessibilitySettings, AccessibilityUpdate, Admin, Badge,
    Cohort, FontSize, NotificationSettings, NotificationUpdate, PrivacySettings, PrivacyUpdate,
    User,
};
use careswap_persistence::PersistenceError;
use chrono::Utc;
use tracing::{info, warn};

const DUPLICATE_EMAIL: &str = "Email already exists. Please login instead.";
const BAD_CREDENTIALS: &str = "Invalid email or password";
const BAD_ADMIN_CREDENTIALS: &str = "Invalid admin credentials";

/// Signup input
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub cohort: Cohort,
}

/// Account details edit; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}

/// First-run setup
#[derive(Debug, Clone)]
pub struct Onboarding {
    pub font_size: FontSize,
    pub high_contrast: bool,
    pub voice_enabled: bool,
    pub bio: String,
    pub skills_teach: Vec<String>,
    pub skills_learn: Vec<String>,
}

/// Account Service - handles signup, login and account settings
pub struct AccountService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccountService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new member and log them in
    pub async fn signup(&self, session: &mut Session, request: SignupRequest) -> ServiceResult<User> {
        let config = self.ctx.config();
        let store = self.ctx.store();

        let email = normalize_email(&request.email);
        if email.is_empty() || !email.contains('@') {
            return Err(ServiceError::validation("Please enter a valid email address."));
        }
        if request.name.trim().is_empty() {
            return Err(ServiceError::validation("Name is required."));
        }
        if store.find_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::validation(DUPLICATE_EMAIL));
        }
        self.check_password_length(&request.password)?;

        let now = Utc::now();
        let id = store.next_user_id().await?;
        let hash = hash_password(&request.password)?;

        let mut user = User::new(id, &email, hash, &request.name, request.cohort, now);
        user.credit_points(config.welcome_bonus);
        if let Some(badge) = Badge::award(NEWCOMER, now.date_naive()) {
            user.add_badge(badge);
        }

        match store.insert_user(&user).await {
            Ok(()) => {}
            Err(PersistenceError::AlreadyExists { .. }) => {
                return Err(ServiceError::validation(DUPLICATE_EMAIL));
            }
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %user.id, cohort = %user.cohort, "User signed up");
        session.establish_user(&user);
        Ok(user)
    }

    /// Log a member in.
    ///
    /// Banned or timed-out members are refused before any session state
    /// is written.
    pub async fn login(&self, session: &mut Session, email: &str, password: &str) -> ServiceResult<User> {
        let store = self.ctx.store();

        let mut user = store
            .find_user_by_email(email)
            .await?
            .filter(|u| verify_password(password, &u.password_hash))
            .ok_or_else(|| ServiceError::validation(BAD_CREDENTIALS))?;

        if let AccessDecision::Denied(reason) =
            StandingPolicy::new(self.ctx).check_access(&mut user).await?
        {
            warn!(user_id = %user.id, standing = %user.standing, "Login refused");
            return Err(ServiceError::AccessDenied(reason));
        }

        user.last_active = Utc::now();
        store.touch_last_active(user.id, user.last_active).await?;

        info!(user_id = %user.id, "User logged in");
        session.establish_user(&user);
        Ok(user)
    }

    pub fn logout(&self, session: &mut Session) {
        session.clear();
    }

    pub async fn admin_login(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> ServiceResult<Admin> {
        let store = self.ctx.store();

        let mut admin = store
            .find_admin_by_email(email)
            .await?
            .filter(|a| verify_password(password, &a.password_hash))
            .ok_or_else(|| ServiceError::validation(BAD_ADMIN_CREDENTIALS))?;

        admin.last_login = Some(Utc::now());
        store.update_admin(&admin).await?;

        info!(admin = %admin.email, role = admin.role.as_str(), "Admin logged in");
        session.establish_admin(&admin);
        Ok(admin)
    }

    /// Removes only the admin identity
    pub fn admin_logout(&self, session: &mut Session) {
        session.clear_admin();
    }

    /// The logged-in member
    pub async fn current_user(&self, session: &mut Session) -> ServiceResult<User> {
        Guard::new(self.ctx).require_user(session).await
    }

    pub async fn change_password(
        &self,
        session: &mut Session,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> ServiceResult<()> {
        Guard::new(self.ctx)
            .with_user(session, |mut user| async move {
                if !verify_password(current, &user.password_hash) {
                    return Err(ServiceError::validation("Current password is incorrect."));
                }
                if new != confirm {
                    return Err(ServiceError::validation("New passwords do not match."));
                }
                self.check_password_length(new)?;

                user.password_hash = hash_password(new)?;
                self.ctx.store().update_user_profile(&user).await?;
                info!(user_id = %user.id, "Password changed");
                Ok(())
            })
            .await
    }

    /// Edit name, phone and bio; the session's cached name follows.
    pub async fn update_account(&self, session: &mut Session, update: AccountUpdate) -> ServiceResult<User> {
        let user = Guard::new(self.ctx)
            .with_user(session, |mut user| async move {
                if let Some(name) = update.name {
                    let name = name.trim();
                    if !name.is_empty() {
                        user.name = name.to_string();
                    }
                }
                if let Some(phone) = update.phone {
                    user.phone = phone.trim().to_string();
                }
                if let Some(bio) = update.bio {
                    user.bio = bio.trim().to_string();
                }
                self.ctx.store().update_user_profile(&user).await?;
                Ok(user)
            })
            .await?;

        session.user_name = Some(user.name.clone());
        Ok(user)
    }

    pub async fn complete_onboarding(
        &self,
        session: &mut Session,
        onboarding: Onboarding,
    ) -> ServiceResult<User> {
        Guard::new(self.ctx)
            .with_user(session, |mut user| async move {
                user.accessibility.apply(&AccessibilityUpdate {
                    font_size: Some(onboarding.font_size),
                    high_contrast: Some(onboarding.high_contrast),
                    voice_enabled: Some(onboarding.voice_enabled),
                    reduced_motion: None,
                });
                user.bio = onboarding.bio.trim().to_string();
                user.skills_teach = clean_skills(onboarding.skills_teach);
                user.skills_learn = clean_skills(onboarding.skills_learn);

                self.ctx.store().update_user_profile(&user).await?;
                info!(user_id = %user.id, "Onboarding completed");
                Ok(user)
            })
            .await
    }

    /// Apply a partial accessibility update; absent keys stay unchanged
    pub async fn update_accessibility(
        &self,
        session: &mut Session,
        update: AccessibilityUpdate,
    ) -> ServiceResult<AccessibilitySettings> {
        Guard::new(self.ctx)
            .with_user(session, |mut user| async move {
                user.accessibility.apply(&update);
                self.ctx.store().update_user_profile(&user).await?;
                Ok(user.accessibility)
            })
            .await
    }

    pub async fn update_privacy(
        &self,
        session: &mut Session,
        update: PrivacyUpdate,
    ) -> ServiceResult<PrivacySettings> {
        Guard::new(self.ctx)
            .with_user(session, |mut user| async move {
                user.privacy.apply(&update);
                self.ctx.store().update_user_profile(&user).await?;
                Ok(user.privacy)
            })
            .await
    }

    pub async fn update_notifications(
        &self,
        session: &mut Session,
        update: NotificationUpdate,
    ) -> ServiceResult<NotificationSettings> {
        Guard::new(self.ctx)
            .with_user(session, |mut user| async move {
                user.notifications.apply(&update);
                self.ctx.store().update_user_profile(&user).await?;
                Ok(user.notifications)
            })
            .await
    }

    fn check_password_length(&self, password: &str) -> ServiceResult<()> {
        let min = self.ctx.config().min_password_len;
        if password.chars().count() < min {
            return Err(ServiceError::validation(format!(
                "Password must be at least {} characters.",
                min
            )));
        }
        Ok(())
    }
}

fn clean_skills(skills: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for skill in skills {
        let skill = skill.trim();
        if !skill.is_empty() && !cleaned.iter().any(|s| s == skill) {
            cleaned.push(skill.to_string());
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use careswap_core::{ProfileVisibility, Standing};
    use careswap_persistence::MemoryStore;
    use chrono::Duration;
    use std::sync::Arc;

    fn ctx() -> ServiceContext {
        ServiceContext::new(Arc::new(MemoryStore::new()))
    }

    fn signup_request(email: &str, password: &str, cohort: Cohort) -> SignupRequest {
        SignupRequest {
            email: email.into(),
            password: password.into(),
            name: "New Member".into(),
            cohort,
        }
    }

    #[tokio::test]
    async fn test_signup_defaults() {
        let ctx = ctx();
        let mut session = Session::new();
        let user = AccountService::new(&ctx)
            .signup(&mut session, signup_request(" New@Test.com ", "secret1", Cohort::Senior))
            .await
            .unwrap();

        assert_eq!(user.email, "new@test.com");
        assert_eq!(user.aura_points, 100);
        assert_eq!(user.badges.len(), 1);
        assert_eq!(user.badges[0].id, NEWCOMER);
        assert_eq!(user.accessibility.font_size, FontSize::Large);
        assert!(user.accessibility.high_contrast);
        assert_eq!(user.privacy.profile_visibility, ProfileVisibility::Registered);
        assert!(!user.notifications.email_weekly);
        assert_ne!(user.password_hash, "secret1");

        assert_eq!(session.user_email.as_deref(), Some("new@test.com"));
        assert_eq!(session.user_cohort, Some(Cohort::Senior));
    }

    #[tokio::test]
    async fn test_short_password_creates_nothing() {
        let ctx = ctx();
        let mut session = Session::new();
        let err = AccountService::new(&ctx)
            .signup(&mut session, signup_request("a@test.com", "12345", Cohort::Youth))
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(ctx.store().list_users().await.unwrap().is_empty());
        assert!(!session.is_user());
    }

    #[tokio::test]
    async fn test_duplicate_email_any_case() {
        let ctx = ctx();
        let service = AccountService::new(&ctx);
        service
            .signup(&mut Session::new(), signup_request("a@test.com", "secret1", Cohort::Youth))
            .await
            .unwrap();
        let err = service
            .signup(&mut Session::new(), signup_request("A@TEST.COM", "secret1", Cohort::Senior))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), DUPLICATE_EMAIL);
    }

    #[tokio::test]
    async fn test_login_and_wrong_password() {
        let ctx = ctx();
        let service = AccountService::new(&ctx);
        service
            .signup(&mut Session::new(), signup_request("a@test.com", "secret1", Cohort::Youth))
            .await
            .unwrap();

        let mut session = Session::new();
        let err = service.login(&mut session, "a@test.com", "secret2").await.unwrap_err();
        assert_eq!(err.to_string(), BAD_CREDENTIALS);
        let err = service.login(&mut session, "nobody@test.com", "secret1").await.unwrap_err();
        assert_eq!(err.to_string(), BAD_CREDENTIALS);

        let user = service.login(&mut session, " A@Test.com", "secret1").await.unwrap();
        assert_eq!(session.user_email.as_deref(), Some(user.email.as_str()));
        let stored = ctx.store().get_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.last_active, user.last_active);
    }

    #[tokio::test]
    async fn test_banned_user_cannot_log_in() {
        let ctx = ctx();
        let service = AccountService::new(&ctx);
        let user = service
            .signup(&mut Session::new(), signup_request("a@test.com", "secret1", Cohort::Youth))
            .await
            .unwrap();
        let entry = careswap_core::AdminLogEntry::new(
            Utc::now(),
            "admin@careswap.sg",
            careswap_core::ModerationAction::Ban,
            "a@test.com",
            "spam",
        );
        ctx.store()
            .record_moderation(user.id, Some(&Standing::banned("spam")), &entry)
            .await
            .unwrap();

        let mut session = Session::new();
        let err = service.login(&mut session, "a@test.com", "secret1").await.unwrap_err();
        assert!(err.is_access_denied());
        assert!(err.to_string().contains("spam"));
        assert_eq!(session, Session::default());
    }

    #[tokio::test]
    async fn test_login_after_lapsed_timeout() {
        let ctx = ctx();
        let service = AccountService::new(&ctx);
        let user = service
            .signup(&mut Session::new(), signup_request("a@test.com", "secret1", Cohort::Youth))
            .await
            .unwrap();
        let entry = careswap_core::AdminLogEntry::new(
            Utc::now(),
            "admin@careswap.sg",
            careswap_core::ModerationAction::Timeout,
            "a@test.com",
            "1 hours - rude",
        );
        let lapsed = Standing::timeout(Utc::now() - Duration::minutes(1), "rude");
        ctx.store().record_moderation(user.id, Some(&lapsed), &entry).await.unwrap();

        let logged_in = service.login(&mut Session::new(), "a@test.com", "secret1").await.unwrap();
        assert!(logged_in.standing.is_active());
        let stored = ctx.store().get_user(user.id).await.unwrap().unwrap();
        assert!(stored.standing.is_active());
    }

    #[tokio::test]
    async fn test_change_password_rules() {
        let ctx = ctx();
        let service = AccountService::new(&ctx);
        let mut session = Session::new();
        service
            .signup(&mut session, signup_request("a@test.com", "secret1", Cohort::Youth))
            .await
            .unwrap();

        let wrong = service.change_password(&mut session, "nope", "secret2", "secret2").await;
        assert!(wrong.unwrap_err().is_validation());
        let mismatch = service.change_password(&mut session, "secret1", "secret2", "secret3").await;
        assert!(mismatch.unwrap_err().is_validation());
        let short = service.change_password(&mut session, "secret1", "abc", "abc").await;
        assert!(short.unwrap_err().is_validation());

        service
            .change_password(&mut session, "secret1", "secret2", "secret2")
            .await
            .unwrap();
        assert!(service.login(&mut Session::new(), "a@test.com", "secret2").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_account_syncs_session_name() {
        let ctx = ctx();
        let service = AccountService::new(&ctx);
        let mut session = Session::new();
        service
            .signup(&mut session, signup_request("a@test.com", "secret1", Cohort::Youth))
            .await
            .unwrap();

        let user = service
            .update_account(
                &mut session,
                AccountUpdate {
                    name: Some("Alex Tan".into()),
                    phone: Some("+65 8765 4321".into()),
                    bio: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(user.name, "Alex Tan");
        assert_eq!(session.user_name.as_deref(), Some("Alex Tan"));
        assert_eq!(user.aura_points, 100);
    }

    #[tokio::test]
    async fn test_partial_preference_updates() {
        let ctx = ctx();
        let service = AccountService::new(&ctx);
        let mut session = Session::new();
        service
            .signup(&mut session, signup_request("a@test.com", "secret1", Cohort::Senior))
            .await
            .unwrap();

        let settings = service
            .update_accessibility(
                &mut session,
                AccessibilityUpdate {
                    reduced_motion: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(settings.reduced_motion);
        assert_eq!(settings.font_size, FontSize::Large);

        let privacy = service
            .update_privacy(
                &mut session,
                PrivacyUpdate {
                    profile_visibility: Some(ProfileVisibility::Private),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(privacy.profile_visibility, ProfileVisibility::Private);
        assert!(privacy.allow_contact);

        let notifications = service
            .update_notifications(
                &mut session,
                NotificationUpdate {
                    email_weekly: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(notifications.email_weekly);
        assert!(notifications.app_all);
    }

    #[tokio::test]
    async fn test_onboarding() {
        let ctx = ctx();
        let service = AccountService::new(&ctx);
        let mut session = Session::new();
        service
            .signup(&mut session, signup_request("a@test.com", "secret1", Cohort::Youth))
            .await
            .unwrap();

        let user = service
            .complete_onboarding(
                &mut session,
                Onboarding {
                    font_size: FontSize::Small,
                    high_contrast: true,
                    voice_enabled: false,
                    bio: "NUS student".into(),
                    skills_teach: vec!["Apps".into(), " Apps ".into(), "".into()],
                    skills_learn: vec!["Cooking".into()],
                },
            )
            .await
            .unwrap();
        assert_eq!(user.accessibility.font_size, FontSize::Small);
        assert_eq!(user.skills_teach, vec!["Apps".to_string()]);
        assert_eq!(user.bio, "NUS student");
    }

    #[tokio::test]
    async fn test_admin_logout_keeps_user_session() {
        let ctx = ctx();
        let hash = hash_password("admin123").unwrap();
        let admin = Admin::super_admin(careswap_core::AdminId(100), "admin@careswap.sg", hash, "System Administrator");
        ctx.store().insert_admin(&admin).await.unwrap();

        let service = AccountService::new(&ctx);
        let mut session = Session::new();
        service
            .signup(&mut session, signup_request("a@test.com", "secret1", Cohort::Youth))
            .await
            .unwrap();

        assert!(service.admin_login(&mut session, "admin@careswap.sg", "wrong").await.is_err());
        let admin = service.admin_login(&mut session, "ADMIN@careswap.sg", "admin123").await.unwrap();
        assert!(admin.last_login.is_some());
        assert!(session.is_admin());
        let stored = ctx.store().get_admin(admin.id).await.unwrap().unwrap();
        assert_eq!(stored.last_login, admin.last_login);

        service.admin_logout(&mut session);
        assert!(!session.is_admin());
        assert!(session.is_user());
    }
}
