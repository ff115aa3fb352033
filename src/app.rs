//! Application state management for the Smart Intercom console.
//!
//! This module contains the core `App` struct that owns the sign-in form
//! state, the shared authentication flag, and the coordination between the
//! UI loop and the remote login/refresh operations running in background
//! tasks.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{strip_bearer, TokenStore};
use crate::config::Config;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the auth event channel.
/// At most one login and one refresh are ever in flight, 8 is plenty.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Automatic refresh retries after a malformed response.
/// A stale token can make the server hand back an HTML error page instead
/// of JSON; dropping the token and refreshing once more recovers that
/// case. The cap keeps a persistently broken endpoint from looping.
const MAX_REFRESH_RETRIES: u8 = 1;

// ============================================================================
// UI State Types
// ============================================================================

/// Which screen the console is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SignIn,
    Home,
    Quitting,
}

/// Sign-in form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInFocus {
    Password,
    Remember,
    Button,
}

/// Completions of background remote operations, delivered to the UI loop
/// over an MPSC channel.
#[derive(Debug)]
pub enum AuthEvent {
    /// The startup (or compensating) token refresh finished
    RefreshCompleted(Result<Option<String>, ApiError>),
    /// A submitted login finished
    LoginCompleted(Result<Option<String>, ApiError>),
}

/// Check whether a character may be appended to the password field.
/// The length cap counts characters, not bytes.
pub fn can_add_password_char(password: &str, c: char) -> bool {
    password.chars().count() < MAX_PASSWORD_LENGTH && !c.is_control()
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    tokens: Arc<TokenStore>,
    api: ApiClient,

    // Screen and sign-in form state
    pub screen: Screen,
    pub focus: SignInFocus,
    pub password: String,
    pub is_remember: bool,
    /// True only while a login call is in flight; the submit control is
    /// replaced by a progress indicator and further submits are no-ops.
    pub loading: bool,

    /// The shared authentication flag. True after any successful token
    /// acquisition, false after any login failure or non-parse refresh
    /// failure. Selects which screen renders.
    pub authenticated: bool,

    // Compensating-retry bookkeeping for the refresh operation
    refresh_retries: u8,

    // Background task channel
    tx: mpsc::Sender<AuthEvent>,
    rx: mpsc::Receiver<AuthEvent>,
}

impl App {
    /// Create a new application instance from persisted configuration
    pub fn new() -> Result<Self> {
        Self::with_config(Config::load()?)
    }

    /// Create an application instance from an explicit configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        debug!(?data_dir, "Data directory configured");

        let tokens = Arc::new(TokenStore::new(data_dir));
        let api = ApiClient::new(config.endpoint.clone(), Arc::clone(&tokens))?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            config,
            tokens,
            api,
            screen: Screen::SignIn,
            focus: SignInFocus::Password,
            password: String::new(),
            is_remember: false,
            loading: false,
            authenticated: false,
            refresh_retries: 0,
            tx,
            rx,
        })
    }

    // =========================================================================
    // Sign-in form mutators
    // =========================================================================

    /// Replace the password field unconditionally. No validation is
    /// enforced client-side.
    pub fn edit_password(&mut self, value: String) {
        self.password = value;
    }

    /// Replace the remember-me flag unconditionally
    pub fn edit_remember(&mut self, value: bool) {
        self.is_remember = value;
    }

    // =========================================================================
    // Remote operations
    // =========================================================================

    /// Submit the current credentials. Returns false without issuing a
    /// call when a login is already in flight.
    pub fn submit(&mut self) -> bool {
        if self.loading {
            debug!("Submit ignored, login already in flight");
            return false;
        }
        self.loading = true;

        let api = self.api.clone();
        let tx = self.tx.clone();
        let is_remember = self.is_remember;
        let password = self.password.clone();

        tokio::spawn(async move {
            let result = api.login(is_remember, &password).await;
            Self::send_event(&tx, AuthEvent::LoginCompleted(result)).await;
        });

        true
    }

    /// Fire the silent token refresh. Called exactly once when the
    /// sign-in flow starts; any further attempt is issued only by the
    /// bounded compensating retry in `apply_event`.
    pub fn start_refresh(&mut self) {
        self.refresh_retries = 0;
        self.spawn_refresh();
    }

    fn spawn_refresh(&self) {
        let api = self.api.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = api.refresh_token().await;
            Self::send_event(&tx, AuthEvent::RefreshCompleted(result)).await;
        });
    }

    async fn send_event(tx: &mpsc::Sender<AuthEvent>, event: AuthEvent) {
        if let Err(e) = tx.send(event).await {
            // Receiver gone means the app is shutting down
            debug!(error = %e, "Auth event dropped, channel closed");
        }
    }

    // =========================================================================
    // Event processing
    // =========================================================================

    /// Drain and apply any completed background operations. Called every
    /// iteration of the UI loop.
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.apply_event(event);
        }
    }

    /// Await the next background completion. Used where blocking on the
    /// channel is acceptable.
    pub async fn next_event(&mut self) -> Option<AuthEvent> {
        self.rx.recv().await
    }

    /// Apply a completed remote operation to the application state
    pub fn apply_event(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::LoginCompleted(result) => {
                self.loading = false;
                match result {
                    Ok(Some(token)) => {
                        info!("Login successful");
                        self.accept_token(&token);
                    }
                    Ok(None) => {
                        // No-op success: the flag stays whatever it was
                        debug!("Login returned no token");
                    }
                    Err(e) => {
                        // Silent failure: the sign-in screen stays up,
                        // no inline error is rendered
                        warn!(error = %e, "Login failed");
                        self.set_auth_state(false);
                    }
                }
            }
            AuthEvent::RefreshCompleted(result) => match result {
                Ok(Some(token)) => {
                    info!("Session refreshed");
                    self.accept_token(&token);
                }
                Ok(None) => {
                    debug!("Refresh returned no token");
                }
                Err(e) if e.is_parse_failure() && self.refresh_retries < MAX_REFRESH_RETRIES => {
                    // The stored token likely made the server answer with
                    // a non-JSON error page. Drop it and refresh once more.
                    warn!(error = %e, "Refresh got a malformed response, clearing token and retrying");
                    self.refresh_retries += 1;
                    if let Err(e) = self.tokens.clear() {
                        warn!(error = %e, "Failed to clear token");
                    }
                    self.spawn_refresh();
                }
                Err(e) => {
                    warn!(error = %e, "Refresh failed");
                    self.set_auth_state(false);
                }
            },
        }
    }

    /// Store a freshly issued token and mark the session authenticated
    fn accept_token(&mut self, raw: &str) {
        let token = strip_bearer(raw);
        if let Err(e) = self.tokens.store(token) {
            warn!(error = %e, "Failed to persist token");
        }
        self.password.clear();
        self.set_auth_state(true);
    }

    /// The single mutator for the shared authentication flag
    pub fn set_auth_state(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
        if self.screen != Screen::Quitting {
            self.screen = if authenticated {
                Screen::Home
            } else {
                Screen::SignIn
            };
        }
    }

    /// Stored token, if any. Exposed for the home screen status line.
    pub fn stored_token(&self) -> Option<String> {
        self.tokens.load()
    }
}
