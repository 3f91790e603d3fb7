use crate::api_client::ApiClient;
use crate::errors::AuthError;
use crate::models::{
    MessageResponse, RegisterRequest, RegisterResponse, TokenPair, TokenResponse, User, UserPatch,
};
use crate::token_store::TokenStore;
use secrecy::ExposeSecret;
use std::sync::Arc;

const LOGIN_ENDPOINT: &str = "/auth/login/";
const REGISTER_ENDPOINT: &str = "/auth/register/";
const LOGOUT_ENDPOINT: &str = "/auth/logout/";
const PROFILE_ENDPOINT: &str = "/auth/profile/";
const CHANGE_PASSWORD_ENDPOINT: &str = "/auth/change-password/";

/// Where the session currently stands. Derived from `(loading, user)`;
/// `Bootstrapping` only exists until `bootstrap` has run once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Bootstrapping,
    Unauthenticated,
    Authenticated,
}

/// Single source of truth for who is logged in.
///
/// Constructed once at application start with its token store and API client
/// injected, then handed to whatever drives the UI. All mutating operations
/// keep the in-memory user and the persisted cache in step.
pub struct SessionManager {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    user: Option<User>,
    loading: bool,
}

impl SessionManager {
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        SessionManager {
            api,
            store,
            user: None,
            loading: true,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.loading {
            SessionState::Bootstrapping
        } else if self.user.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Reconciles persisted tokens with in-memory state. Runs once; later
    /// calls are no-ops.
    ///
    /// A cached user is adopted as-is. Tokens without a cached user trigger a
    /// profile fetch; if that fails the tokens are treated as an invalid
    /// session and cleared rather than retried.
    pub async fn bootstrap(&mut self) {
        if !self.loading {
            return;
        }

        if self.store.tokens().is_some() {
            if let Some(user) = self.store.cached_user() {
                self.user = Some(user);
            } else {
                match self.api.get::<User>(PROFILE_ENDPOINT).await {
                    Ok(user) => {
                        self.store.cache_user(&user);
                        self.user = Some(user);
                    }
                    Err(e) => {
                        tracing::warn!("Stored tokens did not yield a profile: {}", e);
                        self.store.clear();
                    }
                }
            }
        }

        self.loading = false;
        tracing::debug!(state = ?self.state(), "session bootstrap complete");
    }

    /// Exchanges credentials for a token pair, then fetches the profile.
    ///
    /// The two steps succeed or fail as one: if the profile fetch fails the
    /// just-persisted tokens are rolled back, so no half-authenticated state
    /// survives a failure.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        let tokens: TokenResponse = self
            .api
            .post(
                LOGIN_ENDPOINT,
                &serde_json::json!({ "username": username, "password": password }),
            )
            .await?;
        self.store
            .set_tokens(TokenPair::new(tokens.access, tokens.refresh));

        match self.api.get::<User>(PROFILE_ENDPOINT).await {
            Ok(user) => {
                self.store.cache_user(&user);
                tracing::info!(username = %user.username, "logged in");
                self.user = Some(user);
                self.loading = false;
                Ok(())
            }
            Err(e) => {
                self.store.clear();
                self.user = None;
                self.loading = false;
                Err(e.into())
            }
        }
    }

    /// Creates an account. The server returns the user and a token pair in
    /// one response, so no follow-up profile fetch is needed.
    pub async fn register(&mut self, request: &RegisterRequest) -> Result<(), AuthError> {
        let response: RegisterResponse = self.api.post(REGISTER_ENDPOINT, request).await?;

        self.store.set_tokens(TokenPair::new(
            response.tokens.access,
            response.tokens.refresh,
        ));
        self.store.cache_user(&response.user);
        tracing::info!(username = %response.user.username, "registered");
        self.user = Some(response.user);
        self.loading = false;
        Ok(())
    }

    /// Logs out locally, always. The server-side logout call is best-effort;
    /// a network failure there must not keep the user logged in.
    pub async fn logout(&mut self) {
        if let Some(tokens) = self.store.tokens() {
            let body = serde_json::json!({ "refresh_token": tokens.refresh.expose_secret() });
            if let Err(e) = self.api.post_discard(LOGOUT_ENDPOINT, &body).await {
                tracing::warn!("Server logout failed, clearing local session anyway: {}", e);
            }
        }

        self.store.clear();
        self.user = None;
        self.loading = false;
        tracing::info!("logged out");
    }

    /// Merges fields into the in-memory user and re-persists the cache.
    /// Purely local, never fails; a no-op when not authenticated.
    pub fn update_user(&mut self, patch: &UserPatch) {
        if let Some(user) = &mut self.user {
            user.apply(patch);
            self.store.cache_user(user);
        }
    }

    /// Pushes a profile update to the server and adopts the returned record.
    pub async fn update_profile(&mut self, patch: &UserPatch) -> Result<User, AuthError> {
        if self.user.is_none() {
            return Err(AuthError::NotAuthenticated);
        }

        let user: User = self.api.put(PROFILE_ENDPOINT, patch).await?;
        self.store.cache_user(&user);
        self.user = Some(user.clone());
        Ok(user)
    }

    pub async fn change_password(
        &mut self,
        old_password: &str,
        new_password: &str,
    ) -> Result<String, AuthError> {
        if self.user.is_none() {
            return Err(AuthError::NotAuthenticated);
        }

        let response: MessageResponse = self
            .api
            .post(
                CHANGE_PASSWORD_ENDPOINT,
                &serde_json::json!({
                    "old_password": old_password,
                    "new_password": new_password,
                }),
            )
            .await?;
        Ok(response.message)
    }
}
