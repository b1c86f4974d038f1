//! Authentication route handlers.
//!
//! Email/password registration and login return a bearer token directly.
//! Google sign-in goes through the OAuth redirect dance and hands the token
//! to the frontend via the query string, as the frontend expects.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
};
use hemline_core::Role;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::google::GoogleClient;
use crate::models::User;
use crate::services::auth::{self, AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Registration request body. Field aliases accept the camelCase names
/// older storefront builds send.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for successful registration and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub user: User,
}

/// Query parameters Google appends to the callback redirect.
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Password Handlers
// =============================================================================

/// Create a new account.
///
/// Self-registration always gets the `user` role; elevation happens only
/// through admin user management.
///
/// # Errors
///
/// Returns 400 for duplicate emails, weak passwords or malformed addresses.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let service = AuthService::new(state.pool(), &state.config().jwt_secret);

    let (user, token) = service
        .register(Registration {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            phone: body.phone,
            password: body.password,
            role: Role::User,
        })
        .await?;

    tracing::info!(user_id = %user.id, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully",
            token,
            user,
        }),
    ))
}

/// Log in with email and password.
///
/// # Errors
///
/// Returns 401 for an unknown email or wrong password.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let service = AuthService::new(state.pool(), &state.config().jwt_secret);

    let (user, token) = service.login(&body.email, &body.password).await?;

    Ok(Json(AuthResponse {
        message: "Login successful",
        token,
        user,
    }))
}

// =============================================================================
// Google OAuth Handlers
// =============================================================================

/// Redirect the browser to Google's consent page.
///
/// # Errors
///
/// Returns 404 when Google credentials are not configured.
pub async fn google_login(State(state): State<AppState>) -> Result<Redirect> {
    let google = require_google(&state)?;
    let config = state.config();

    let oauth_state = auth::issue_oauth_state(&config.jwt_secret)?;
    let url = google.authorization_url(&callback_uri(&config.base_url), &oauth_state);

    Ok(Redirect::to(&url))
}

/// Handle the redirect back from Google.
///
/// Every failure path lands on the frontend login page with an error
/// marker; only the token exchange itself distinguishes why in the logs.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
) -> Redirect {
    let config = state.config();
    let failure = format!("{}/login?error=google_login_failed", config.base_url);

    let Ok(google) = require_google(&state) else {
        return Redirect::to(&failure);
    };

    if let Some(error) = query.error {
        tracing::warn!(error = %error, "Google consent denied");
        return Redirect::to(&failure);
    }

    let state_valid = query
        .state
        .as_deref()
        .is_some_and(|s| auth::verify_oauth_state(&config.jwt_secret, s));
    if !state_valid {
        tracing::warn!("Google callback with missing or invalid state");
        return Redirect::to(&failure);
    }

    let Some(code) = query.code else {
        tracing::warn!("Google callback without authorization code");
        return Redirect::to(&failure);
    };

    match complete_google_login(&state, google, &code).await {
        Ok(url) => Redirect::to(&url),
        Err(e) => {
            tracing::error!(error = %e, "Google login failed");
            Redirect::to(&failure)
        }
    }
}

/// Exchange the code, sign the user in and build the frontend redirect.
async fn complete_google_login(
    state: &AppState,
    google: &GoogleClient,
    code: &str,
) -> Result<String> {
    let config = state.config();

    let token = google
        .exchange_code(code, &callback_uri(&config.base_url))
        .await?;
    let profile = google.fetch_profile(&token.access_token).await?;

    let service = AuthService::new(state.pool(), &config.jwt_secret);
    let (user, jwt) = service.login_with_google(&profile).await?;

    tracing::info!(user_id = %user.id, "Google login completed");

    // The frontend reads both values off the query string on first load.
    let user_data = serde_json::json!({
        "id": user.id,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "email": user.email,
        "role": user.role,
        "profile_image": user.profile_image,
    });

    Ok(format!(
        "{}/?token={}&user={}",
        config.base_url,
        urlencoding::encode(&jwt),
        urlencoding::encode(&user_data.to_string())
    ))
}

fn require_google(state: &AppState) -> Result<&GoogleClient> {
    state
        .google()
        .ok_or_else(|| AppError::NotFound("Google login is not configured".to_string()))
}

/// The callback URL registered with Google.
fn callback_uri(base_url: &str) -> String {
    format!("{base_url}/auth/google/callback")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_uri_appends_path() {
        assert_eq!(
            callback_uri("http://localhost:3000"),
            "http://localhost:3000/auth/google/callback"
        );
    }
}
