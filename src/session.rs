//! Session management for vaultbot.
//!
//! Maps a conversation id to an authenticated principal. A single shared
//! username/password pair gates the whole vault; sessions live in memory
//! only and a process restart clears them all.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::AuthConfig;

/// Opaque key identifying one chat conversation.
pub type ConversationId = i64;

/// Session-related errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// Invalid credentials (wrong username or password).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The conversation has no active session.
    #[error("not logged in")]
    NotLoggedIn,
}

/// In-memory session store.
///
/// The map is behind an `RwLock` so handlers for different conversations
/// may run concurrently over one shared store. Construct a fresh store per
/// test for isolation.
#[derive(Debug)]
pub struct SessionStore {
    /// Configured credential pair.
    credentials: AuthConfig,
    /// Active sessions: conversation id -> principal name.
    sessions: RwLock<HashMap<ConversationId, String>>,
}

impl SessionStore {
    /// Create a new session store gated by the given credential pair.
    pub fn new(credentials: AuthConfig) -> Self {
        Self {
            credentials,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Attempt to log in a conversation.
    ///
    /// On success binds the conversation to the username, overwriting any
    /// prior session, and returns the principal name. On failure no session
    /// state changes; the attempted username is logged, the password never.
    pub fn login(
        &self,
        conversation: ConversationId,
        username: &str,
        password: &str,
    ) -> Result<String, SessionError> {
        if username != self.credentials.username || password != self.credentials.password {
            warn!(username = %username, "Failed login attempt");
            return Err(SessionError::InvalidCredentials);
        }

        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(conversation, username.to_string());
        info!(user = %username, "User logged in");
        Ok(username.to_string())
    }

    /// Remove the session for a conversation, returning the removed principal.
    pub fn logout(&self, conversation: ConversationId) -> Result<String, SessionError> {
        let mut sessions = self.sessions.write().unwrap();
        match sessions.remove(&conversation) {
            Some(principal) => {
                info!(user = %principal, "User logged out");
                Ok(principal)
            }
            None => Err(SessionError::NotLoggedIn),
        }
    }

    /// Check whether a conversation has an active session. Pure lookup.
    pub fn is_authenticated(&self, conversation: ConversationId) -> bool {
        self.sessions.read().unwrap().contains_key(&conversation)
    }

    /// Get the principal bound to a conversation, if any.
    pub fn principal(&self, conversation: ConversationId) -> Option<String> {
        self.sessions.read().unwrap().get(&conversation).cloned()
    }

    /// Number of active sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }
}
