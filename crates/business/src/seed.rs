//! Demonstration data
//!
//! One senior, one youth, one super admin and three open requests.
//! Seeding twice is a no-op.

use crate::context::ServiceContext;
use crate::error::{ServiceError, ServiceResult};
use crate::password::hash_password;
use careswap_core::{
    Admin, Badge, Cohort, FontSize, HelpRequest, NewHelpRequest, ProfileVisibility, Rating, User,
    UserId,
};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

pub const SENIOR_EMAIL: &str = "senior@test.com";
pub const YOUTH_EMAIL: &str = "youth@test.com";
pub const ADMIN_EMAIL: &str = "admin@careswap.sg";
pub const DEMO_PASSWORD: &str = "password123";
pub const ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub users: usize,
    pub admins: usize,
    pub requests: usize,
}

impl SeedSummary {
    pub fn is_empty(&self) -> bool {
        self.users == 0 && self.admins == 0 && self.requests == 0
    }
}

/// Insert the demonstration accounts and requests unless already present
pub async fn seed_demo_data(ctx: &ServiceContext) -> ServiceResult<SeedSummary> {
    let store = ctx.store();
    let mut summary = SeedSummary::default();

    if store.find_user_by_email(SENIOR_EMAIL).await?.is_some() {
        info!("Demo data already present");
        return Ok(summary);
    }

    let now = Utc::now();
    let password_hash = hash_password(DEMO_PASSWORD)?;

    let senior = demo_senior(store.next_user_id().await?, password_hash.clone(), now)?;
    store.insert_user(&senior).await?;
    summary.users += 1;

    if store.find_user_by_email(YOUTH_EMAIL).await?.is_none() {
        let youth = demo_youth(store.next_user_id().await?, password_hash, now)?;
        store.insert_user(&youth).await?;
        summary.users += 1;
    }

    if store.find_admin_by_email(ADMIN_EMAIL).await?.is_none() {
        let admin = Admin::super_admin(
            store.next_admin_id().await?,
            ADMIN_EMAIL,
            hash_password(ADMIN_PASSWORD)?,
            "System Administrator",
        );
        store.insert_admin(&admin).await?;
        summary.admins += 1;
    }

    let requests = [
        (
            "Help me set up WhatsApp",
            "I want to video call my grandchildren in Australia. Need someone patient to teach me step by step.",
            "technology",
            "Easy",
            "Online / Video Call",
            false,
            (2024, 12, 8),
        ),
        (
            "Need help with heavy groceries",
            "Weekly grocery run at the NTUC near my block. The rice bags are too heavy for me now.",
            "errands",
            "Medium",
            "Blk 123 Tampines Ave 4",
            false,
            (2024, 12, 7),
        ),
        (
            "Teach me basic phone camera + I teach you Hainanese Chicken Rice",
            "I will share my family recipe if you show me how to take nice photos with my phone.",
            "skill_swap",
            "Medium",
            "My Home Kitchen (Bedok)",
            true,
            (2024, 12, 6),
        ),
    ];

    for (title, description, category, difficulty, location, is_swap, posted) in requests {
        let input = NewHelpRequest {
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            difficulty: difficulty.to_string(),
            location: location.to_string(),
            is_swap,
        };
        let mut request = HelpRequest::create(store.next_request_id().await?, senior.id, input, now)?;
        request.posted_date = date(posted)?;
        store.insert_request(&request).await?;
        summary.requests += 1;
    }

    info!(
        users = summary.users,
        admins = summary.admins,
        requests = summary.requests,
        "Demo data seeded"
    );
    Ok(summary)
}

fn demo_senior(id: UserId, password_hash: String, now: DateTime<Utc>) -> ServiceResult<User> {
    let mut user = User::new(id, SENIOR_EMAIL, password_hash, "Mdm Tan Ah Lian", Cohort::Senior, now);
    user.phone = "+65 9123 4567".to_string();
    user.bio = "Retired teacher who loves cooking and sharing stories. Learning to use my smartphone!"
        .to_string();
    user.aura_points = 550;
    user.badges = badges(&[
        ("first_helper", (2024, 1, 15)),
        ("tech_learner", (2024, 2, 20)),
        ("wisdom_sharer", (2024, 3, 10)),
    ])?;
    user.rating = Rating::new(4.8, 12);
    user.completed_tasks = 12;
    user.joined_date = date((2024, 1, 10))?;
    user.accessibility.font_size = FontSize::Large;
    user.accessibility.high_contrast = false;
    user.accessibility.voice_enabled = true;
    user.privacy.profile_visibility = ProfileVisibility::Registered;
    user.skills_teach = strings(&["Cooking", "Dialect", "History"]);
    user.skills_learn = strings(&["Smartphone", "Social Media", "Online Banking"]);
    Ok(user)
}

fn demo_youth(id: UserId, password_hash: String, now: DateTime<Utc>) -> ServiceResult<User> {
    let mut user = User::new(id, YOUTH_EMAIL, password_hash, "Alex Tan Wei Ming", Cohort::Youth, now);
    user.phone = "+65 8765 4321".to_string();
    user.bio = "Poly student passionate about tech and helping the community.".to_string();
    user.aura_points = 1820;
    user.badges = badges(&[
        ("helper_star", (2024, 1, 20)),
        ("tech_guru", (2024, 2, 15)),
        ("community_champion", (2024, 3, 1)),
        ("patient_teacher", (2024, 3, 15)),
    ])?;
    user.rating = Rating::new(4.9, 35);
    user.completed_tasks = 35;
    user.joined_date = date((2024, 1, 5))?;
    user.privacy.profile_visibility = ProfileVisibility::Public;
    user.privacy.show_email = true;
    user.notifications.email_weekly = true;
    user.skills_teach = strings(&["Technology", "English", "Social Media", "Apps"]);
    user.skills_learn = strings(&["Cooking", "Gardening", "Life Skills"]);
    Ok(user)
}

fn badges(entries: &[(&str, (i32, u32, u32))]) -> ServiceResult<Vec<Badge>> {
    let mut badges = Vec::with_capacity(entries.len());
    for (id, earned) in entries {
        let badge = Badge::award(id, date(*earned)?)
            .ok_or_else(|| ServiceError::Internal(format!("Unknown badge '{}'", id)))?;
        badges.push(badge);
    }
    Ok(badges)
}

fn date((year, month, day): (i32, u32, u32)) -> ServiceResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ServiceError::Internal(format!("Invalid date {}-{}-{}", year, month, day)))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountService;
    use crate::session::Session;
    use careswap_persistence::{MemoryStore, RequestFilter};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let ctx = ServiceContext::new(Arc::new(MemoryStore::new()));

        let first = seed_demo_data(&ctx).await.unwrap();
        assert_eq!(
            first,
            SeedSummary {
                users: 2,
                admins: 1,
                requests: 3,
            }
        );
        assert!(seed_demo_data(&ctx).await.unwrap().is_empty());

        let requests = ctx.store().list_requests(RequestFilter::All).await.unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests.iter().map(|r| r.aura_points).collect::<Vec<_>>(),
            vec![50, 70, 70]
        );
        assert!(requests.iter().all(|r| r.is_open()));
    }

    #[tokio::test]
    async fn test_seeded_accounts_can_log_in() {
        let ctx = ServiceContext::new(Arc::new(MemoryStore::new()));
        seed_demo_data(&ctx).await.unwrap();
        let accounts = AccountService::new(&ctx);

        let mut session = Session::new();
        let senior = accounts
            .login(&mut session, SENIOR_EMAIL, DEMO_PASSWORD)
            .await
            .unwrap();
        assert_eq!(senior.aura_points, 550);
        assert_eq!(senior.level(), 3);
        assert_eq!(senior.badges.len(), 3);

        accounts
            .admin_login(&mut session, ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();
        assert!(session.is_admin());
    }
}
