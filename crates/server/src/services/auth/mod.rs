//! Authentication service.
//!
//! Password registration and login, Google sign-in account linking, and
//! the bearer tokens both flows hand out.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use hemline_core::{Email, Role};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::google::GoogleProfile;
use crate::models::{Claims, NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Bearer token lifetime.
const TOKEN_TTL_DAYS: i64 = 7;

/// Lifetime of the anti-forgery state token in the Google redirect.
const OAUTH_STATE_TTL_MINUTES: i64 = 10;

/// Registration payload after route-level extraction.
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: Role,
}

/// Authentication service.
///
/// Handles registration, login and Google sign-in.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    jwt_secret: &'a SecretString,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, jwt_secret: &'a SecretString) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt_secret,
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, registration: Registration) -> Result<(User, String), AuthError> {
        let email = Email::parse(&registration.email)?;
        validate_password(&registration.password)?;
        let password_hash = hash_password(&registration.password)?;

        let new_user = NewUser {
            first_name: registration.first_name,
            last_name: registration.last_name,
            email,
            phone: registration.phone,
            password_hash: Some(password_hash),
            role: registration.role,
            google_id: None,
            profile_image: None,
        };

        let user = self.users.create(&new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        let token = issue_token(self.jwt_secret, &user)?;
        Ok((user, token))
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is
    /// wrong, the account does not exist or it has no password (Google-only
    /// sign-in).
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_for_login(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = issue_token(self.jwt_secret, &user)?;
        Ok((user, token))
    }

    // =========================================================================
    // Google Sign-In
    // =========================================================================

    /// Sign in with a verified Google profile, creating the account on
    /// first contact. An existing password account is linked to Google on
    /// its first Google sign-in and keeps its stored profile image unless
    /// Google supplies one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if Google reports a malformed email.
    /// Returns `AuthError::Repository` if the account cannot be stored.
    pub async fn login_with_google(
        &self,
        profile: &GoogleProfile,
    ) -> Result<(User, String), AuthError> {
        let email = Email::parse(&profile.email)?;

        let user = match self.users.get_by_email(&email).await? {
            Some(user) => {
                if user.google_id.is_none() {
                    self.users
                        .attach_google(user.id, &profile.sub, profile.picture.as_deref())
                        .await?;
                }
                // Re-read so the response carries the linked fields.
                self.users
                    .get_by_email(&email)
                    .await?
                    .ok_or(AuthError::Repository(RepositoryError::NotFound))?
            }
            None => {
                let new_user = NewUser {
                    first_name: profile.given_name.clone(),
                    last_name: profile.family_name.clone(),
                    email,
                    phone: None,
                    password_hash: None,
                    role: Role::User,
                    google_id: Some(profile.sub.clone()),
                    profile_image: profile.picture.clone(),
                };
                self.users.create(&new_user).await.map_err(|e| match e {
                    RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                    other => AuthError::Repository(other),
                })?
            }
        };

        let token = issue_token(self.jwt_secret, &user)?;
        Ok((user, token))
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// Sign a bearer token for a user.
///
/// # Errors
///
/// Returns `AuthError::TokenSigning` if the claims cannot be signed.
pub fn issue_token(secret: &SecretString, user: &User) -> Result<String, AuthError> {
    let exp = Utc::now() + Duration::days(TOKEN_TTL_DAYS);
    let claims = Claims {
        sub: user.id,
        email: user.email.to_string(),
        role: user.role,
        exp: exp.timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|_| AuthError::TokenSigning)
}

/// Decode and verify a bearer token. Returns `None` for anything not
/// signed by us or past its expiry.
#[must_use]
pub fn decode_token(secret: &SecretString, token: &str) -> Option<Claims> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// Anti-forgery state carried through the Google redirect. Signing it
/// keeps the flow stateless; the `jti` makes every token unique.
#[derive(Debug, Serialize, Deserialize)]
struct OauthStateClaims {
    jti: String,
    exp: i64,
}

/// Mint a short-lived state token for the Google authorization redirect.
///
/// # Errors
///
/// Returns `AuthError::TokenSigning` if the claims cannot be signed.
pub fn issue_oauth_state(secret: &SecretString) -> Result<String, AuthError> {
    let exp = Utc::now() + Duration::minutes(OAUTH_STATE_TTL_MINUTES);
    let claims = OauthStateClaims {
        jti: random_token(32),
        exp: exp.timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|_| AuthError::TokenSigning)
}

/// Check a state token returned by the Google callback.
#[must_use]
pub fn verify_oauth_state(secret: &SecretString, state: &str) -> bool {
    jsonwebtoken::decode::<OauthStateClaims>(
        state,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .is_ok()
}

/// Generate a random alphanumeric token.
fn random_token(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();

    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

// =============================================================================
// Password Helpers
// =============================================================================

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use hemline_core::UserId;

    use super::*;

    fn test_secret() -> SecretString {
        SecretString::from("fmR2pqXhV9sWb4Kc7dNzQe5tYa8gJu3L")
    }

    fn test_user() -> User {
        User {
            id: UserId::new(42),
            first_name: Some("Asha".to_owned()),
            last_name: Some("Rao".to_owned()),
            email: Email::parse("asha@example.com").unwrap(),
            phone: None,
            role: Role::Admin,
            google_id: None,
            profile_image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_password_rejects_short() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));

        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_token_round_trip() {
        let secret = test_secret();
        let user = test_user();

        let token = issue_token(&secret, &user).unwrap();
        let claims = decode_token(&secret, &token).expect("token should decode");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "asha@example.com");
        assert!(claims.role.is_admin());
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = issue_token(&test_secret(), &test_user()).unwrap();
        let other_secret = SecretString::from("Dk6pVw2XnY8sRb4Tc7fMzJe5qHa9gLu3");

        assert!(decode_token(&other_secret, &token).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = test_secret();
        let claims = Claims {
            sub: UserId::new(1),
            email: "old@example.com".to_owned(),
            role: Role::User,
            exp: (Utc::now() - Duration::days(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
        )
        .unwrap();

        assert!(decode_token(&secret, &token).is_none());
    }

    #[test]
    fn test_oauth_state_round_trip() {
        let secret = test_secret();
        let state = issue_oauth_state(&secret).unwrap();

        assert!(verify_oauth_state(&secret, &state));
        assert!(!verify_oauth_state(&secret, "tampered.state.token"));

        let other_secret = SecretString::from("Dk6pVw2XnY8sRb4Tc7fMzJe5qHa9gLu3");
        assert!(!verify_oauth_state(&other_secret, &state));
    }

    #[test]
    fn test_random_token_shape() {
        let token = random_token(32);
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));

        // Two draws colliding would mean the generator is broken.
        assert_ne!(random_token(32), token);
    }
}
