//! Platform configuration

/// Tunable rules and default texts of the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Shortest accepted password, in characters
    pub min_password_len: usize,
    /// AURA points credited on signup
    pub welcome_bonus: u32,
    /// Timeout length when the admin gives none
    pub default_timeout_hours: u32,
    /// Log entries shown on the admin dashboard
    pub recent_log_window: usize,
    /// Recent tasks shown on a profile
    pub recent_task_window: usize,
    pub default_ban_reason: String,
    pub default_timeout_reason: String,
    pub default_warning: String,
    pub kick_detail: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            min_password_len: 6,
            welcome_bonus: 100,
            default_timeout_hours: 24,
            recent_log_window: 10,
            recent_task_window: 5,
            default_ban_reason: "Violation of community guidelines".to_string(),
            default_timeout_reason: "Temporary restriction".to_string(),
            default_warning: "Please follow community guidelines.".to_string(),
            kick_detail: "Force logout".to_string(),
        }
    }
}

impl PlatformConfig {
    pub fn with_min_password_len(mut self, len: usize) -> Self {
        self.min_password_len = len;
        self
    }

    pub fn with_welcome_bonus(mut self, points: u32) -> Self {
        self.welcome_bonus = points;
        self
    }

    pub fn with_default_timeout_hours(mut self, hours: u32) -> Self {
        self.default_timeout_hours = hours;
        self
    }

    pub fn with_recent_log_window(mut self, entries: usize) -> Self {
        self.recent_log_window = entries;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlatformConfig::default();
        assert_eq!(config.min_password_len, 6);
        assert_eq!(config.welcome_bonus, 100);
        assert_eq!(config.default_timeout_hours, 24);
        assert_eq!(config.recent_log_window, 10);
    }

    #[test]
    fn test_builders() {
        let config = PlatformConfig::default()
            .with_welcome_bonus(0)
            .with_min_password_len(12);
        assert_eq!(config.welcome_bonus, 0);
        assert_eq!(config.min_password_len, 12);
    }
}
