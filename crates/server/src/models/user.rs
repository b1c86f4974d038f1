//! Account models shared by auth, profile and admin user management.

use chrono::{DateTime, Utc};
use hemline_core::{Email, Role, UserId};
use serde::{Deserialize, Serialize};

/// A registered account. Password hashes never travel on this type, so it
/// is safe to serialize straight into API responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Email,
    pub phone: Option<String>,
    pub role: Role,
    pub google_id: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name shown on cart rows and order summaries. Falls back to the
    /// email address when both name parts are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        customer_display_name(
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            Some(self.email.as_str()),
        )
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Display-name chain used wherever a customer is shown by name: the
/// trimmed name parts, then the email, then `"Unknown"` when the account
/// itself is gone.
#[must_use]
pub fn customer_display_name(
    first_name: Option<&str>,
    last_name: Option<&str>,
    email: Option<&str>,
) -> String {
    let full = format!("{} {}", first_name.unwrap_or(""), last_name.unwrap_or(""));
    let trimmed = full.trim();
    if !trimmed.is_empty() {
        return trimmed.to_owned();
    }
    match email {
        Some(email) if !email.is_empty() => email.to_owned(),
        _ => "Unknown".to_owned(),
    }
}

/// Bearer token claims. `exp` is a unix timestamp in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

/// Insert payload for a new account, from public registration, the admin
/// user manager or the Google callback.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Email,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub role: Role,
    pub google_id: Option<String>,
    pub profile_image: Option<String>,
}

/// Admin-side account edit. Name parts, phone and role are always
/// written; the password hash only when a new password was supplied.
#[derive(Debug, Clone)]
pub struct AdminUserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub password_hash: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user_with_names(first: Option<&str>, last: Option<&str>) -> User {
        User {
            id: UserId::new(1),
            first_name: first.map(str::to_owned),
            last_name: last.map(str::to_owned),
            email: Email::parse("jo@example.com").unwrap(),
            phone: None,
            role: Role::User,
            google_id: None,
            profile_image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_joins_both_parts() {
        let user = user_with_names(Some("Jo"), Some("Shah"));
        assert_eq!(user.display_name(), "Jo Shah");
    }

    #[test]
    fn test_display_name_trims_single_part() {
        let user = user_with_names(Some("Jo"), None);
        assert_eq!(user.display_name(), "Jo");

        let user = user_with_names(None, Some("Shah"));
        assert_eq!(user.display_name(), "Shah");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = user_with_names(None, None);
        assert_eq!(user.display_name(), "jo@example.com");

        let user = user_with_names(Some("  "), Some(""));
        assert_eq!(user.display_name(), "jo@example.com");
    }

    #[test]
    fn test_customer_display_name_unknown_without_account() {
        assert_eq!(customer_display_name(None, None, None), "Unknown");
        assert_eq!(customer_display_name(Some(" "), None, Some("")), "Unknown");
        assert_eq!(customer_display_name(None, None, Some("a@b.com")), "a@b.com");
    }

    #[test]
    fn test_user_serializes_without_password_fields() {
        let user = user_with_names(Some("Jo"), Some("Shah"));
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains("\"email\":\"jo@example.com\""));
    }
}
