//! Identity provider over the hosted auth API

use super::{AuthProvider, AuthUser};
use crate::config::StorefrontConfig;
use crate::error::{Result, StorefrontError};
use crate::store::rest::{ensure_success, http_client};
use crate::store::AccessToken;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use storefront_common::ADMIN_ROLE;
use tracing::{debug, instrument};

/// Password sign-in against `/auth/v1`, sharing its token with the data client
#[derive(Debug, Clone)]
pub struct RestAuth {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    token: AccessToken,
}

impl RestAuth {
    /// # Errors
    /// Returns `Configuration` if the backend settings are incomplete
    pub fn new(config: &StorefrontConfig, token: AccessToken) -> Result<Self> {
        config.validate_remote()?;
        Ok(Self {
            client: http_client(config)?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            token,
        })
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.endpoint(path))
            .header("apikey", &self.api_key)
    }
}

/// Access token and user out of a sign-in or sign-up response
///
/// Sign-up answers with a bare user object when email confirmation is
/// pending, and with a full session otherwise.
#[must_use]
pub fn parse_session(body: &Value) -> (Option<String>, Option<AuthUser>) {
    let token = body
        .get("access_token")
        .and_then(Value::as_str)
        .map(str::to_string);
    let user_value = body.get("user").unwrap_or(body);
    let user = parse_user(user_value);
    (token, user)
}

fn parse_user(value: &Value) -> Option<AuthUser> {
    Some(AuthUser {
        id: value.get("id")?.as_str()?.to_string(),
        email: value
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

#[async_trait]
impl AuthProvider for RestAuth {
    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let response = self
            .post("token?grant_type=password")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED
        ) {
            return Err(StorefrontError::unauthorized("invalid email or password"));
        }
        let body: Value = ensure_success(response).await?.json().await?;
        let (token, user) = parse_session(&body);
        let user = user.ok_or_else(|| StorefrontError::store("sign-in response has no user"))?;
        self.token.set(token);
        debug!(user = %user.email, "session started");
        Ok(user)
    }

    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<Option<AuthUser>> {
        let response = self
            .post("signup")
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "name": name, "role": ADMIN_ROLE },
            }))
            .send()
            .await?;
        let body: Value = ensure_success(response).await?.json().await?;
        let (token, user) = parse_session(&body);
        if token.is_some() {
            self.token.set(token);
            Ok(user)
        } else {
            Ok(None)
        }
    }

    async fn sign_out(&self) -> Result<()> {
        let Some(token) = self.token.get() else {
            return Ok(());
        };
        self.token.set(None);
        let response = self.post("logout").bearer_auth(token).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<AuthUser>> {
        let Some(token) = self.token.get() else {
            return Ok(None);
        };
        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.token.set(None);
            return Ok(None);
        }
        let body: Value = ensure_success(response).await?.json().await?;
        Ok(parse_user(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_with_token() {
        let body = json!({
            "access_token": "jwt",
            "token_type": "bearer",
            "user": {"id": "u-1", "email": "admin@example.com"}
        });
        let (token, user) = parse_session(&body);
        assert_eq!(token.as_deref(), Some("jwt"));
        assert_eq!(
            user,
            Some(AuthUser {
                id: "u-1".into(),
                email: "admin@example.com".into()
            })
        );
    }

    #[test]
    fn test_parse_session_bare_user() {
        let body = json!({"id": "u-2", "email": "new@example.com", "confirmation_sent_at": "2026-01-18T00:00:00Z"});
        let (token, user) = parse_session(&body);
        assert!(token.is_none());
        assert_eq!(user.unwrap().id, "u-2");
    }

    #[test]
    fn test_parse_session_without_user() {
        let (token, user) = parse_session(&json!({"error": "invalid_grant"}));
        assert!(token.is_none());
        assert!(user.is_none());
    }

    #[test]
    fn test_endpoint() {
        let config = StorefrontConfig::new("https://demo.supabase.co/", "anon");
        let auth = RestAuth::new(&config, AccessToken::new()).unwrap();
        assert_eq!(
            auth.endpoint("token?grant_type=password"),
            "https://demo.supabase.co/auth/v1/token?grant_type=password"
        );
    }
}
