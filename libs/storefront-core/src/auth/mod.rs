//! Operator sign-in restricted to administrator profiles
//!
//! An [`AuthProvider`] handles credentials against the hosted identity
//! service. [`AuthService`] layers the admin check on top: a session only
//! counts as signed in once the matching `profiles` row carries the admin
//! role, and any other account is signed straight back out.

pub mod rest;

pub use rest::RestAuth;

use crate::error::{Result, StorefrontError};
use crate::models::{AdminUser, Profile};
use crate::query::RowQuery;
use crate::store::{from_row, tables, RowStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use storefront_common::ADMIN_ROLE;
use tracing::{debug, info, instrument, warn};

/// Shortest password accepted at sign-up
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Identity returned by the provider, before any role check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// Credential operations of the hosted identity service
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Start a session with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Register an account that asks for the admin role
    ///
    /// Returns `None` when the account still has to confirm its email.
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<Option<AuthUser>>;

    /// End the current session; a no-op without one
    async fn sign_out(&self) -> Result<()>;

    /// User of the current session, if any
    async fn current_user(&self) -> Result<Option<AuthUser>>;
}

/// What the dashboard shell knows about the operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<AdminUser>,
}

impl AuthState {
    fn signed_in(user: AdminUser) -> Self {
        Self {
            is_authenticated: true,
            user: Some(user),
        }
    }
}

/// Admin-only session management
pub struct AuthService<A, S> {
    provider: A,
    store: S,
    state: RwLock<AuthState>,
    profile_attempts: u32,
    profile_delay: Duration,
}

impl<A: AuthProvider, S: RowStore> AuthService<A, S> {
    pub fn new(provider: A, store: S) -> Self {
        Self {
            provider,
            store,
            state: RwLock::new(AuthState::default()),
            profile_attempts: 5,
            profile_delay: Duration::from_millis(500),
        }
    }

    /// How often, and how far apart, sign-up looks for the new profile row
    #[must_use]
    pub fn with_profile_polling(mut self, attempts: u32, delay: Duration) -> Self {
        self.profile_attempts = attempts.max(1);
        self.profile_delay = delay;
        self
    }

    /// Snapshot of the current state
    pub fn state(&self) -> AuthState {
        self.state.read().clone()
    }

    pub fn provider(&self) -> &A {
        &self.provider
    }

    /// Pick up an existing session, signing it out if it is not an admin's
    ///
    /// # Errors
    /// Returns an error if the provider or the profile lookup fails
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<AuthState> {
        let Some(user) = self.provider.current_user().await? else {
            return Ok(self.set_state(AuthState::default()));
        };
        match self.admin_profile(&user.id).await? {
            Some(admin) => Ok(self.set_state(AuthState::signed_in(admin))),
            None => {
                warn!(user = %user.email, "existing session is not an admin; signing out");
                self.provider.sign_out().await?;
                Ok(self.set_state(AuthState::default()))
            }
        }
    }

    /// Sign in, admitting administrators only
    ///
    /// # Errors
    /// Returns `Validation` for blank credentials, `Unauthorized` when the
    /// account is not an admin, or the provider's error
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AdminUser> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(StorefrontError::validation("email and password are required"));
        }

        let user = self.provider.sign_in(email, password).await?;
        match self.admin_profile(&user.id).await? {
            Some(admin) => {
                info!(user = %admin.email, "admin signed in");
                self.set_state(AuthState::signed_in(admin.clone()));
                Ok(admin)
            }
            None => {
                self.provider.sign_out().await?;
                self.set_state(AuthState::default());
                Err(StorefrontError::unauthorized(
                    "this account is not an admin; use an admin account",
                ))
            }
        }
    }

    /// Register a new administrator
    ///
    /// The profile row is created by the backend after sign-up, so it is
    /// polled for a bounded number of times. Returns `None` if the account
    /// still needs email confirmation or the profile did not appear in time.
    ///
    /// # Errors
    /// Returns `Validation` for a blank name or email or a short password, or
    /// the provider's error
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<Option<AdminUser>> {
        let email = email.trim();
        let name = name.trim();
        if email.is_empty() || name.is_empty() {
            return Err(StorefrontError::validation("name and email are required"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(StorefrontError::validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let Some(user) = self.provider.sign_up(email, password, name).await? else {
            info!(user = %email, "sign-up awaiting email confirmation");
            return Ok(None);
        };

        for attempt in 1..=self.profile_attempts {
            tokio::time::sleep(self.profile_delay).await;
            if let Some(admin) = self.admin_profile(&user.id).await? {
                info!(user = %admin.email, attempt, "admin registered");
                self.set_state(AuthState::signed_in(admin.clone()));
                return Ok(Some(admin));
            }
            debug!(attempt, "admin profile not yet available");
        }
        warn!(user = %email, "admin profile did not appear after sign-up");
        Ok(None)
    }

    /// # Errors
    /// Returns the provider's error; the local state is cleared regardless
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        self.set_state(AuthState::default());
        self.provider.sign_out().await
    }

    /// The user's profile if it carries the admin role
    async fn admin_profile(&self, user_id: &str) -> Result<Option<AdminUser>> {
        let mut rows = self
            .store
            .select(&RowQuery::table(tables::PROFILES).eq("id", user_id).limit(1))
            .await?;
        let Some(row) = rows.pop() else {
            return Ok(None);
        };
        let profile: Profile = from_row(row)?;
        if profile.role != ADMIN_ROLE {
            debug!(user = %profile.email, role = %profile.role, "profile is not an admin");
            return Ok(None);
        }
        Ok(Some(AdminUser {
            id: profile.id,
            email: profile.email,
            name: profile.name,
            role: profile.role,
        }))
    }

    fn set_state(&self, state: AuthState) -> AuthState {
        *self.state.write() = state.clone();
        state
    }
}
