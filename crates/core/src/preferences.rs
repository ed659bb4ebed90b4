//! # Preferences Module
//!
//! Accessibility, privacy and notification settings of a user, plus the
//! partial-update payloads that modify them. An update only touches the
//! keys it carries.

use crate::error::{CoreError, CoreResult};
use crate::user::Cohort;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interface font size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
        }
    }

    pub fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(FontSize::Small),
            "medium" => Ok(FontSize::Medium),
            "large" => Ok(FontSize::Large),
            other => Err(CoreError::unknown("font_size", other)),
        }
    }
}

/// Who may open a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileVisibility {
    /// Anyone
    Public,
    /// Any authenticated user
    #[default]
    Registered,
    /// Only the owner
    Private,
}

impl ProfileVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileVisibility::Public => "public",
            ProfileVisibility::Registered => "registered",
            ProfileVisibility::Private => "private",
        }
    }

    pub fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(ProfileVisibility::Public),
            "registered" => Ok(ProfileVisibility::Registered),
            "private" => Ok(ProfileVisibility::Private),
            other => Err(CoreError::unknown("profile_visibility", other)),
        }
    }
}

impl fmt::Display for ProfileVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilitySettings {
    pub font_size: FontSize,
    pub high_contrast: bool,
    pub voice_enabled: bool,
    pub reduced_motion: bool,
}

impl AccessibilitySettings {
    /// Defaults for a new account; seniors start with large text,
    /// high contrast and voice enabled.
    pub fn for_cohort(cohort: Cohort) -> Self {
        let senior = cohort == Cohort::Senior;
        Self {
            font_size: if senior { FontSize::Large } else { FontSize::Medium },
            high_contrast: senior,
            voice_enabled: senior,
            reduced_motion: false,
        }
    }

    pub fn apply(&mut self, update: &AccessibilityUpdate) {
        if let Some(font_size) = update.font_size {
            self.font_size = font_size;
        }
        if let Some(high_contrast) = update.high_contrast {
            self.high_contrast = high_contrast;
        }
        if let Some(voice_enabled) = update.voice_enabled {
            self.voice_enabled = voice_enabled;
        }
        if let Some(reduced_motion) = update.reduced_motion {
            self.reduced_motion = reduced_motion;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<FontSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_contrast: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced_motion: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacySettings {
    pub profile_visibility: ProfileVisibility,
    pub show_email: bool,
    pub show_phone: bool,
    pub allow_contact: bool,
    pub show_activity: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            profile_visibility: ProfileVisibility::Registered,
            show_email: false,
            show_phone: false,
            allow_contact: true,
            show_activity: true,
        }
    }
}

impl PrivacySettings {
    pub fn apply(&mut self, update: &PrivacyUpdate) {
        if let Some(visibility) = update.profile_visibility {
            self.profile_visibility = visibility;
        }
        if let Some(show_email) = update.show_email {
            self.show_email = show_email;
        }
        if let Some(show_phone) = update.show_phone {
            self.show_phone = show_phone;
        }
        if let Some(allow_contact) = update.allow_contact {
            self.allow_contact = allow_contact;
        }
        if let Some(show_activity) = update.show_activity {
            self.show_activity = show_activity;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacyUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_visibility: Option<ProfileVisibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_phone: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_contact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_activity: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub email_new_match: bool,
    pub email_messages: bool,
    pub email_weekly: bool,
    pub app_all: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_new_match: true,
            email_messages: true,
            email_weekly: false,
            app_all: true,
        }
    }
}

impl NotificationSettings {
    pub fn apply(&mut self, update: &NotificationUpdate) {
        if let Some(v) = update.email_new_match {
            self.email_new_match = v;
        }
        if let Some(v) = update.email_messages {
            self.email_messages = v;
        }
        if let Some(v) = update.email_weekly {
            self.email_weekly = v;
        }
        if let Some(v) = update.app_all {
            self.app_all = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_new_match: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_messages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_weekly: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_all: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cohort_accessibility_defaults() {
        let senior = AccessibilitySettings::for_cohort(Cohort::Senior);
        assert_eq!(senior.font_size, FontSize::Large);
        assert!(senior.high_contrast && senior.voice_enabled);

        let youth = AccessibilitySettings::for_cohort(Cohort::Youth);
        assert_eq!(youth.font_size, FontSize::Medium);
        assert!(!youth.high_contrast && !youth.voice_enabled);
    }

    #[test]
    fn test_partial_accessibility_update() {
        let mut settings = AccessibilitySettings::for_cohort(Cohort::Senior);
        let update: AccessibilityUpdate =
            serde_json::from_str(r#"{"reduced_motion": true}"#).unwrap();
        settings.apply(&update);

        assert!(settings.reduced_motion);
        // Untouched keys are preserved
        assert_eq!(settings.font_size, FontSize::Large);
        assert!(settings.voice_enabled);
    }

    #[test]
    fn test_partial_privacy_update() {
        let mut privacy = PrivacySettings::default();
        privacy.apply(&PrivacyUpdate {
            profile_visibility: Some(ProfileVisibility::Private),
            show_email: Some(true),
            ..Default::default()
        });

        assert_eq!(privacy.profile_visibility, ProfileVisibility::Private);
        assert!(privacy.show_email);
        assert!(!privacy.show_phone);
        assert!(privacy.allow_contact);
    }

    #[test]
    fn test_notification_update_from_json() {
        let mut notifications = NotificationSettings::default();
        let update: NotificationUpdate =
            serde_json::from_str(r#"{"email_weekly": true, "app_all": false}"#).unwrap();
        notifications.apply(&update);

        assert!(notifications.email_weekly);
        assert!(!notifications.app_all);
        assert!(notifications.email_new_match);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!(FontSize::from_str("LARGE"), Ok(FontSize::Large));
        assert!(FontSize::from_str("huge").is_err());
        assert_eq!(
            ProfileVisibility::from_str("private"),
            Ok(ProfileVisibility::Private)
        );
    }
}
