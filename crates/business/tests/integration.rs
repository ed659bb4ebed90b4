//! Integration tests for CareSwap
//!
//! Each scenario runs against the in-memory store and against SQLite, going
//! through the services exactly as a front end would.

use careswap_business::{
    seed_demo_data, AcceptResult, AccountService, ModerationService, ProfileService,
    RequestService, ServiceContext, ServiceError, Session, SignupRequest, StandingPolicy,
};
use careswap_core::{
    AccessDecision, Cohort, ModerationAction, NewHelpRequest, PrivacyUpdate, ProfileVisibility,
    RequestStatus, Standing,
};
use careswap_persistence::{MemoryStore, SqliteStore};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tempfile::TempDir;

fn memory_ctx() -> ServiceContext {
    ServiceContext::new(Arc::new(MemoryStore::new()))
}

async fn sqlite_ctx() -> ServiceContext {
    ServiceContext::new(Arc::new(SqliteStore::in_memory().await.unwrap()))
}

fn signup(email: &str, password: &str, cohort: Cohort) -> SignupRequest {
    SignupRequest {
        email: email.to_string(),
        password: password.to_string(),
        name: email.split('@').next().unwrap_or("member").to_string(),
        cohort,
    }
}

fn medium_request() -> NewHelpRequest {
    NewHelpRequest {
        title: "Need help with heavy groceries".into(),
        description: "Weekly grocery run".into(),
        category: "errands".into(),
        difficulty: "Medium".into(),
        location: "Blk 123 Tampines Ave 4".into(),
        is_swap: false,
    }
}

async fn admin_session(ctx: &ServiceContext) -> Session {
    let mut session = Session::new();
    AccountService::new(ctx)
        .admin_login(&mut session, "admin@careswap.sg", "admin123")
        .await
        .unwrap();
    session
}

/// Seeded senior posts, a fresh youth accepts, the youth alone is paid
async fn accept_pays_acceptor_once(ctx: ServiceContext) {
    seed_demo_data(&ctx).await.unwrap();
    let accounts = AccountService::new(&ctx);
    let requests = RequestService::new(&ctx);

    let mut senior = Session::new();
    let poster = accounts.login(&mut senior, "senior@test.com", "password123").await.unwrap();
    assert_eq!(poster.aura_points, 550);

    let mut youth = Session::new();
    let helper = accounts
        .signup(&mut youth, signup("helper@test.com", "secret1", Cohort::Youth))
        .await
        .unwrap();
    assert_eq!(helper.aura_points, 100);

    let request = requests.create_request(&mut senior, medium_request()).await.unwrap();
    assert_eq!(request.aura_points, 70);

    let accepted = requests.accept_request(&mut youth, request.id).await.unwrap();
    match accepted {
        AcceptResult::Accepted { request, points, balance } => {
            assert_eq!(points, 70);
            assert_eq!(balance, 170);
            assert_eq!(request.status, RequestStatus::InProgress);
            assert_eq!(request.accepted_by, Some(helper.id));
        }
        other => panic!("expected acceptance, got {:?}", other),
    }

    // Accepting again changes nothing
    let again = requests.accept_request(&mut youth, request.id).await.unwrap();
    assert!(!again.is_accepted());
    assert_eq!(accounts.current_user(&mut youth).await.unwrap().aura_points, 170);
    assert_eq!(accounts.current_user(&mut senior).await.unwrap().aura_points, 550);

    let done = requests.complete_request(&mut senior, request.id).await.unwrap();
    assert_eq!(done.status, RequestStatus::Completed);
    let stats = requests.platform_stats().await.unwrap();
    assert_eq!(stats.completed_tasks, 1);
    assert_eq!(stats.open_requests, 3);
}

/// A ban writes one log line and locks the member out everywhere
async fn ban_locks_member_out(ctx: ServiceContext) {
    seed_demo_data(&ctx).await.unwrap();
    let accounts = AccountService::new(&ctx);

    let mut member = Session::new();
    let youth = accounts.login(&mut member, "youth@test.com", "password123").await.unwrap();

    let admin = admin_session(&ctx).await;
    ModerationService::new(&ctx)
        .ban(&admin, youth.id, Some("spam"))
        .await
        .unwrap();

    let logs = ModerationService::new(&ctx).logs(&admin).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, ModerationAction::Ban);
    assert_eq!(logs[0].target, "youth@test.com");

    let err = RequestService::new(&ctx).open_requests(&mut member).await.unwrap_err();
    match err {
        ServiceError::AccessDenied(reason) => assert!(reason.contains("spam")),
        other => panic!("expected denial, got {:?}", other),
    }
    assert_eq!(member, Session::default());

    let err = accounts
        .login(&mut member, "youth@test.com", "password123")
        .await
        .unwrap_err();
    assert!(err.is_access_denied());
    assert!(!member.is_user());
}

/// Short passwords are rejected before anything is stored
async fn short_password_creates_nothing(ctx: ServiceContext) {
    let mut session = Session::new();
    let err = AccountService::new(&ctx)
        .signup(&mut session, signup("new@test.com", "12345", Cohort::Senior))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(!session.is_user());
    assert!(ctx.store().find_user_by_email("new@test.com").await.unwrap().is_none());
    assert_eq!(ctx.store().list_users().await.unwrap().len(), 0);
}

/// Many members race for one request; exactly one is paid
async fn concurrent_accepts_pay_once(ctx: ServiceContext) {
    let accounts = AccountService::new(&ctx);
    let mut poster = Session::new();
    accounts
        .signup(&mut poster, signup("poster@test.com", "secret1", Cohort::Senior))
        .await
        .unwrap();
    let request = RequestService::new(&ctx)
        .create_request(&mut poster, medium_request())
        .await
        .unwrap();

    let mut sessions = Vec::new();
    for i in 0..8 {
        let mut session = Session::new();
        accounts
            .signup(&mut session, signup(&format!("helper{}@test.com", i), "secret1", Cohort::Youth))
            .await
            .unwrap();
        sessions.push(session);
    }

    let mut handles = Vec::new();
    for mut session in sessions {
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            RequestService::new(&ctx)
                .accept_request(&mut session, request.id)
                .await
                .unwrap()
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().is_accepted() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);

    let total: u32 = ctx
        .store()
        .list_users()
        .await
        .unwrap()
        .iter()
        .filter(|u| u.cohort == Cohort::Youth)
        .map(|u| u.aura_points)
        .sum();
    assert_eq!(total, 8 * 100 + 70);
}

/// A lapsed timeout is cleared on the next check, once
async fn timeout_expires_lazily(ctx: ServiceContext) {
    seed_demo_data(&ctx).await.unwrap();
    let mut member = Session::new();
    let youth = AccountService::new(&ctx)
        .login(&mut member, "youth@test.com", "password123")
        .await
        .unwrap();

    let admin = admin_session(&ctx).await;
    ModerationService::new(&ctx)
        .timeout(&admin, youth.id, Some(2), Some("cool off"))
        .await
        .unwrap();

    let err = RequestService::new(&ctx).my_tasks(&mut member).await.unwrap_err();
    assert!(err.to_string().contains("restored in"));
    assert!(!member.is_user());

    let mut stored = ctx.store().get_user(youth.id).await.unwrap().unwrap();
    let later = Utc::now() + Duration::hours(3);
    let decision = StandingPolicy::new(&ctx)
        .check_access_at(&mut stored, later)
        .await
        .unwrap();
    assert_eq!(decision, AccessDecision::Allowed);

    let restored = ctx.store().get_user(youth.id).await.unwrap().unwrap();
    assert_eq!(restored.standing, Standing::Active);
    assert!(!ctx.store().expire_timeout(youth.id, later).await.unwrap());

    AccountService::new(&ctx)
        .login(&mut member, "youth@test.com", "password123")
        .await
        .unwrap();
    assert!(member.is_user());
}

/// A private profile is visible to its owner only
async fn private_profile_stays_private(ctx: ServiceContext) {
    seed_demo_data(&ctx).await.unwrap();
    let accounts = AccountService::new(&ctx);
    let profiles = ProfileService::new(&ctx);

    let mut owner = Session::new();
    let youth = accounts.login(&mut owner, "youth@test.com", "password123").await.unwrap();
    accounts
        .update_privacy(
            &mut owner,
            PrivacyUpdate {
                profile_visibility: Some(ProfileVisibility::Private),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut viewer = Session::new();
    accounts.login(&mut viewer, "senior@test.com", "password123").await.unwrap();
    let err = profiles.view_profile(&mut viewer, Some(youth.id)).await.unwrap_err();
    assert!(err.is_access_denied());
    assert!(viewer.is_user());

    let own = profiles.view_profile(&mut owner, Some(youth.id)).await.unwrap();
    assert!(own.is_own_profile);
    assert_eq!(own.email.as_deref(), Some("youth@test.com"));
}

/// Accept races on a pooled file database, with workers on several threads
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_pay_once_on_file_database() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(&dir.path().join("careswap.db")).await.unwrap();
    concurrent_accepts_pay_once(ServiceContext::new(Arc::new(store.clone()))).await;
    store.close().await;
}

macro_rules! both_stores {
    ($($scenario:ident),* $(,)?) => {
        mod memory {
            use super::*;
            $(
                #[tokio::test]
                async fn $scenario() {
                    super::$scenario(memory_ctx()).await;
                }
            )*
        }

        mod sqlite {
            use super::*;
            $(
                #[tokio::test]
                async fn $scenario() {
                    super::$scenario(sqlite_ctx().await).await;
                }
            )*
        }
    };
}

both_stores!(
    accept_pays_acceptor_once,
    ban_locks_member_out,
    short_password_creates_nothing,
    concurrent_accepts_pay_once,
    timeout_expires_lazily,
    private_profile_stays_private,
);
