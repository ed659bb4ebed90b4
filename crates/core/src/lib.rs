//! # CareSwap Core
//!
//! Domain types for the CareSwap help-exchange platform.
//!
//! - [`User`] with its [`Standing`], preferences, badges and AURA points
//! - [`Admin`] with role and permission set
//! - [`HelpRequest`] and its forward-only [`RequestStatus`] machine
//! - [`AdminLogEntry`] append-only moderation records
//! - [`render_profile`], the privacy filter over a viewed profile
//!
//! Nothing in this crate performs I/O. Time-dependent rules take `now`
//! as an argument.

pub mod admin;
pub mod audit;
pub mod badge;
pub mod error;
pub mod preferences;
pub mod profile;
pub mod request;
pub mod standing;
pub mod user;

pub use admin::{Admin, AdminId, AdminRole, Permission};
pub use audit::{AdminLogEntry, ModerationAction};
pub use badge::{Badge, BadgeDefinition};
pub use error::{CoreError, CoreResult};
pub use preferences::{
    AccessibilitySettings, AccessibilityUpdate, FontSize, NotificationSettings,
    NotificationUpdate, PrivacySettings, PrivacyUpdate, ProfileVisibility,
};
pub use profile::{render_profile, ActivitySummary, BadgeView, ProfileView};
pub use request::{Difficulty, HelpRequest, NewHelpRequest, RequestId, RequestKind, RequestStatus};
pub use standing::{AccessDecision, Standing};
pub use user::{normalize_email, Cohort, Rating, User, UserId};
