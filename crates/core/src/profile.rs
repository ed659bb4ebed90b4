//! # Profile Module
//!
//! Privacy filter: projects a [`User`] into the [`ProfileView`] a given
//! viewer is allowed to see. Never mutates anything.

use crate::badge::Badge;
use crate::error::{CoreError, CoreResult};
use crate::preferences::ProfileVisibility;
use crate::request::HelpRequest;
use crate::user::{Cohort, Rating, User, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Activity block, shown only when the owner allows it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub completed_tasks: u32,
    pub last_active: DateTime<Utc>,
    /// Filled by the caller from the request store
    pub recent_tasks: Vec<HelpRequest>,
}

/// A held badge with its catalog description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeView {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub earned: NaiveDate,
}

impl From<&Badge> for BadgeView {
    fn from(badge: &Badge) -> Self {
        Self {
            id: badge.id.clone(),
            name: badge.name.clone(),
            icon: badge.icon.clone(),
            description: badge.description().unwrap_or_default().to_string(),
            earned: badge.earned,
        }
    }
}

/// What a viewer gets to see of a profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub id: UserId,
    pub name: String,
    pub cohort: Cohort,
    pub bio: String,
    pub aura_points: u32,
    pub level: u32,
    pub badges: Vec<BadgeView>,
    pub rating: Rating,
    pub skills_teach: Vec<String>,
    pub skills_learn: Vec<String>,
    pub joined_date: NaiveDate,
    pub allow_contact: bool,
    pub is_own_profile: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub activity: Option<ActivitySummary>,
}

/// Render `target` for `viewer`; `None` is an anonymous viewer.
///
/// - owners always see everything
/// - `private` profiles are denied to everyone else
/// - `registered` profiles are denied to anonymous viewers
/// - email, phone and activity follow the owner's show flags
pub fn render_profile(viewer: Option<&User>, target: &User) -> CoreResult<ProfileView> {
    let is_owner = viewer.map_or(false, |v| v.id == target.id);
    let privacy = &target.privacy;

    if !is_owner {
        match privacy.profile_visibility {
            ProfileVisibility::Private => return Err(CoreError::ProfilePrivate),
            ProfileVisibility::Registered if viewer.is_none() => {
                return Err(CoreError::AccessDenied(
                    "Please log in to view this profile.".to_string(),
                ))
            }
            _ => {}
        }
    }

    let email = (is_owner || privacy.show_email).then(|| target.email.clone());
    let phone = (is_owner || privacy.show_phone).then(|| target.phone.clone());
    let activity = (is_owner || privacy.show_activity).then(|| ActivitySummary {
        completed_tasks: target.completed_tasks,
        last_active: target.last_active,
        recent_tasks: Vec::new(),
    });

    Ok(ProfileView {
        id: target.id,
        name: target.name.clone(),
        cohort: target.cohort,
        bio: target.bio.clone(),
        aura_points: target.aura_points,
        level: target.level(),
        badges: target.badges.iter().map(BadgeView::from).collect(),
        rating: target.rating,
        skills_teach: target.skills_teach.clone(),
        skills_learn: target.skills_learn.clone(),
        joined_date: target.joined_date,
        allow_contact: privacy.allow_contact,
        is_own_profile: is_owner,
        email,
        phone,
        activity,
    })
}
