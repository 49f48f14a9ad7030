//! Per-conversation command cooldown.
//!
//! Gates the `/upload` prompt so a conversation cannot spam it. This is
//! advisory throttling for one chatty command, not admission control; the
//! attachment handler itself is never gated.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::session::ConversationId;

/// Result of a cooldown check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrottleResult {
    /// The command is allowed; the marker has been updated.
    Allowed,
    /// The command is still cooling down.
    Denied {
        /// Time until the command may be used again.
        retry_after: Duration,
    },
}

impl ThrottleResult {
    /// Check if the command is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, ThrottleResult::Allowed)
    }
}

/// Tracks the last use of a throttled command per conversation.
#[derive(Debug)]
pub struct CommandThrottle {
    /// Minimum interval between uses.
    cooldown: Duration,
    /// Last-use marker per conversation.
    last_used: Mutex<HashMap<ConversationId, Instant>>,
}

impl CommandThrottle {
    /// Create a throttle with the given cooldown.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_used: Mutex::new(HashMap::new()),
        }
    }

    /// Check whether the conversation may use the command now.
    ///
    /// On `Allowed` the marker is updated as a side effect, starting a new
    /// cooldown window.
    pub fn check(&self, conversation: ConversationId) -> ThrottleResult {
        let now = Instant::now();
        let mut last_used = self.last_used.lock().unwrap();

        if let Some(last) = last_used.get(&conversation) {
            let elapsed = now.duration_since(*last);
            if elapsed < self.cooldown {
                return ThrottleResult::Denied {
                    retry_after: self.cooldown - elapsed,
                };
            }
        }

        last_used.insert(conversation, now);
        ThrottleResult::Allowed
    }

    /// Drop markers older than the cooldown to bound memory growth.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let cooldown = self.cooldown;
        self.last_used
            .lock()
            .unwrap()
            .retain(|_, last| now.duration_since(*last) < cooldown);
    }
}
