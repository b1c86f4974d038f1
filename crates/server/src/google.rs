//! Google OAuth 2.0 client for "Sign in with Google".
//!
//! # OAuth Flow
//!
//! 1. Generate the authorization URL with `authorization_url()`
//! 2. Redirect the browser to Google's consent page
//! 3. Google redirects back to our callback with an authorization code
//! 4. Exchange the code for an access token with `exchange_code()`
//! 5. Fetch the user's profile with `fetch_profile()`
//!
//! The client is only constructed when both `GOOGLE_CLIENT_ID` and
//! `GOOGLE_CLIENT_SECRET` are configured.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::GoogleConfig;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Errors that can occur when talking to Google's OAuth endpoints.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Google rejected the authorization code.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// The userinfo endpoint returned an error.
    #[error("profile fetch failed: {0}")]
    Profile(String),
}

/// Access token returned by Google's token endpoint.
#[derive(Debug, Deserialize)]
pub struct GoogleToken {
    /// Bearer token for the userinfo endpoint.
    pub access_token: String,
}

/// `OpenID` Connect profile returned by Google's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Google's stable account identifier.
    pub sub: String,
    /// Verified email address.
    pub email: String,
    /// First name, if the account shares one.
    pub given_name: Option<String>,
    /// Last name, if the account shares one.
    pub family_name: Option<String>,
    /// Profile picture URL.
    pub picture: Option<String>,
}

/// Client for Google's OAuth 2.0 endpoints.
#[derive(Clone)]
pub struct GoogleClient {
    inner: Arc<GoogleClientInner>,
}

struct GoogleClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl GoogleClient {
    /// Create a new Google OAuth client.
    #[must_use]
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            inner: Arc::new(GoogleClientInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
            }),
        }
    }

    /// Generate the authorization URL for Google login.
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - The callback URL Google redirects to after consent
    /// * `state` - A signed random string to prevent CSRF attacks
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{AUTH_ENDPOINT}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20profile&\
            state={}",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Arguments
    ///
    /// * `code` - The authorization code from the OAuth callback
    /// * `redirect_uri` - The same redirect URI used in the authorization request
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<GoogleToken, GoogleError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .inner
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleError::TokenExchange(text));
        }

        Ok(response.json().await?)
    }

    /// Fetch the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the userinfo request fails.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, GoogleError> {
        let response = self
            .inner
            .client
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleError::Profile(format!("({status}): {text}")));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn test_client() -> GoogleClient {
        GoogleClient::new(&GoogleConfig {
            client_id: "test-client-id.apps.googleusercontent.com".to_string(),
            client_secret: SecretString::from("test-client-value"),
        })
    }

    #[test]
    fn test_authorization_url_encodes_parameters() {
        let client = test_client();
        let url =
            client.authorization_url("http://localhost:3000/auth/google/callback", "state-123");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=test-client-id.apps.googleusercontent.com"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("state=state-123"));
        assert!(url.contains("response_type=code"));
    }
}
