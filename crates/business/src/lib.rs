//! # CareSwap Business
//!
//! Business logic layer - guards, accounts, profiles, requests, moderation.
//!
//! Every member-facing operation takes the caller's [`Session`] and runs
//! behind [`Guard`]; admin operations run behind the admin guard and the
//! admin's permission set.

pub mod account;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod moderation;
pub mod password;
pub mod profile;
pub mod requests;
pub mod seed;
pub mod session;
pub mod standing;

pub use account::{AccountService, AccountUpdate, Onboarding, SignupRequest};
pub use config::PlatformConfig;
pub use context::ServiceContext;
pub use error::{ServiceError, ServiceResult};
pub use guard::Guard;
pub use moderation::{AdminDashboard, AdminStats, ModerationService};
pub use profile::ProfileService;
pub use requests::{AcceptResult, Dashboard, PlatformStats, RequestService};
pub use seed::{seed_demo_data, SeedSummary};
pub use session::Session;
pub use standing::StandingPolicy;
