//! The session store.
//!
//! [`AuthContext`] owns the current user for the lifetime of a client. It is
//! initialized from storage, mutated by login/register/logout, and writes
//! every user change back to storage.

use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info, warn};
use serde_json::Value;

use crate::client::{ApiClient, ClientResult, Credentials, Registration};
use crate::locale::{Locale, Text};

use super::error::AuthError;
use super::navigation::{Navigator, Route};
use super::session::{SESSION_STORAGE_KEY, SessionUser};
use super::shapes::{LoginShape, RegisterShape, classify_login, classify_register};
use super::storage::SessionStorage;

/// Backend calls the session store depends on.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ClientResult<Value>;
    async fn register(&self, registration: &Registration) -> ClientResult<Value>;
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, credentials: &Credentials) -> ClientResult<Value> {
        self.users().login(credentials).await
    }

    async fn register(&self, registration: &Registration) -> ClientResult<Value> {
        self.users().register(registration).await
    }
}

/// Session lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    /// A login or registration is in flight.
    Authenticating,
    Authenticated(SessionUser),
}

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The backend issued a session right away.
    SignedIn(SessionUser),
    /// The account exists; the user has to log in.
    LoginRequired,
}

/// Process-wide store of the signed-in user.
pub struct AuthContext {
    backend: Arc<dyn AuthBackend>,
    storage: Arc<dyn SessionStorage>,
    navigator: Arc<dyn Navigator>,
    locale: Locale,
    state: AuthState,
    is_loading: bool,
    error: Option<String>,
}

impl AuthContext {
    /// Build the store and restore any persisted session.
    ///
    /// A record that does not parse is discarded. Loading is complete when
    /// this returns, whatever was found.
    pub fn init(
        backend: Arc<dyn AuthBackend>,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
        locale: Locale,
    ) -> Self {
        let mut context = Self {
            backend,
            storage,
            navigator,
            locale,
            state: AuthState::Unauthenticated,
            is_loading: true,
            error: None,
        };

        if let Some(user) = context.restore() {
            context.state = AuthState::Authenticated(user);
        }
        context.is_loading = false;
        context
    }

    fn restore(&self) -> Option<SessionUser> {
        let stored = match self.storage.get_item(SESSION_STORAGE_KEY) {
            Ok(stored) => stored?,
            Err(e) => {
                warn!("Failed to read stored session: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<SessionUser>(&stored) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Discarding corrupted session record: {}", e);
                if let Err(e) = self.storage.remove_item(SESSION_STORAGE_KEY) {
                    error!("Failed to remove corrupted session record: {}", e);
                }
                None
            }
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match &self.state {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Message from the last failed login or registration.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Bearer token of the current session, if any.
    pub fn token(&self) -> Option<&str> {
        self.user()
            .map(|user| user.token.as_str())
            .filter(|token| !token.is_empty())
    }

    /// Sign in with username and password.
    ///
    /// On failure any previous session is kept, in memory and in storage.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<SessionUser, AuthError> {
        let previous = self.begin();

        let result = match self.backend.login(credentials).await {
            Ok(response) => match classify_login(&response) {
                Some(LoginShape::Session(user)) => Ok(user),
                Some(LoginShape::Rejected(message)) => Err(AuthError::Rejected(message)),
                None => Err(AuthError::UnrecognizedResponse),
            },
            Err(e) => Err(AuthError::Api(e)),
        };

        match result {
            Ok(user) => {
                info!("Logged in as {}", user.username);
                self.sign_in(user.clone());
                Ok(user)
            }
            Err(e) => {
                warn!("Login failed: {}", e);
                let text = match &e {
                    AuthError::UnrecognizedResponse => Text::InvalidServerResponse,
                    _ => Text::LoginFailed,
                };
                self.fail(previous, self.locale.text(text).to_string());
                Err(e)
            }
        }
    }

    /// Create an account. Depending on the backend answer this either signs
    /// the user in or sends them to the login view.
    pub async fn register(
        &mut self,
        registration: &Registration,
    ) -> Result<RegisterOutcome, AuthError> {
        let previous = self.begin();

        let response = match self.backend.register(registration).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Registration failed: {}", e);
                self.fail(previous, self.locale.text(Text::RegisterFailed).to_string());
                return Err(AuthError::Api(e));
            }
        };

        match classify_register(&response) {
            Some(RegisterShape::Session(user)) => {
                info!("Registered and signed in as {}", user.username);
                self.sign_in(user.clone());
                Ok(RegisterOutcome::SignedIn(user))
            }
            Some(RegisterShape::Confirmation(message) | RegisterShape::Message(message)) => {
                info!("Registration accepted: {}", message);
                self.settle(previous);
                self.navigator.navigate(Route::Login);
                Ok(RegisterOutcome::LoginRequired)
            }
            None => {
                warn!("Unrecognized registration response: {}", response);
                match response {
                    Value::String(message) if !message.trim().is_empty() => {
                        self.fail(previous, message.clone());
                        Err(AuthError::Registration(message))
                    }
                    _ => {
                        self.fail(previous, self.locale.text(Text::RegisterFailed).to_string());
                        Err(AuthError::UnrecognizedResponse)
                    }
                }
            }
        }
    }

    /// End the session and go back to the login view.
    pub fn logout(&mut self) {
        if let Some(user) = self.user() {
            info!("Logging out {}", user.username);
        }
        self.set_user(None);
        self.error = None;
        self.navigator.navigate(Route::Login);
    }

    /// Enter `Authenticating`, handing back the user signed in before.
    fn begin(&mut self) -> Option<SessionUser> {
        self.is_loading = true;
        self.error = None;
        match std::mem::replace(&mut self.state, AuthState::Authenticating) {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Leave `Authenticating` without changing who is signed in. Storage
    /// still holds `previous`, so nothing is written.
    fn settle(&mut self, previous: Option<SessionUser>) {
        self.state = match previous {
            Some(user) => AuthState::Authenticated(user),
            None => AuthState::Unauthenticated,
        };
        self.is_loading = false;
    }

    fn sign_in(&mut self, user: SessionUser) {
        self.set_user(Some(user));
        self.is_loading = false;
        self.navigator.navigate(Route::Home);
    }

    fn fail(&mut self, previous: Option<SessionUser>, message: String) {
        self.settle(previous);
        self.error = Some(message);
    }

    /// Replace the current user and write the change to storage.
    fn set_user(&mut self, user: Option<SessionUser>) {
        let persisted = match &user {
            Some(user) => serde_json::to_string(user)
                .map_err(|e| e.to_string())
                .and_then(|record| {
                    self.storage
                        .set_item(SESSION_STORAGE_KEY, &record)
                        .map_err(|e| e.to_string())
                }),
            None => self
                .storage
                .remove_item(SESSION_STORAGE_KEY)
                .map_err(|e| e.to_string()),
        };
        if let Err(e) = persisted {
            error!("Failed to persist session change: {}", e);
        }

        self.state = match user {
            Some(user) => AuthState::Authenticated(user),
            None => AuthState::Unauthenticated,
        };
    }
}
