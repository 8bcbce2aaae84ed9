//! crates/safety_portal_core/src/conversation.rs
//!
//! The assistant widget's conversation log and the single-flight exchange that
//! forwards user turns to a `ChatCompletionService`.

use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::domain::{ChatRole, ChatTurn};
use crate::ports::ChatCompletionService;

pub const GREETING: &str = "Hi! I am the Safety Assistant. How can I help you today?";

/// Shown in place of a reply when the completion service fails.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble connecting right now. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    Sending,
}

/// Why a submission was dropped without touching the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeRejected {
    #[error("Message is empty")]
    EmptyInput,
    #[error("A reply is still pending")]
    Busy,
}

/// What the caller needs to send once a user turn has been accepted.
#[derive(Debug, Clone)]
pub struct PendingExchange {
    pub message: String,
    /// Every turn before the new user turn.
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone)]
pub enum ExchangeOutcome {
    Replied(ChatTurn),
    /// The conversation was closed before the reply arrived.
    Discarded,
}

/// An append-only list of turns that always starts with the assistant greeting.
#[derive(Debug)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
    state: ExchangeState,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            turns: vec![ChatTurn::assistant(GREETING)],
            state: ExchangeState::Idle,
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Appends the user turn and moves to `Sending`.
    pub fn begin_exchange(&mut self, input: &str) -> Result<PendingExchange, ExchangeRejected> {
        if input.trim().is_empty() {
            return Err(ExchangeRejected::EmptyInput);
        }
        if self.state == ExchangeState::Sending {
            return Err(ExchangeRejected::Busy);
        }

        let history = self.turns.clone();
        self.turns.push(ChatTurn::user(input));
        self.state = ExchangeState::Sending;

        Ok(PendingExchange {
            message: input.to_string(),
            history,
        })
    }

    /// Appends the assistant reply and returns to `Idle`.
    pub fn complete_exchange(&mut self, reply: String) -> ChatTurn {
        let turn = ChatTurn::assistant(reply);
        self.turns.push(turn.clone());
        self.state = ExchangeState::Idle;
        turn
    }

    /// Closes out an exchange whose caller went away, so the next message is
    /// accepted. Does nothing unless a reply is pending.
    pub fn abandon_exchange(&mut self) {
        if self.state == ExchangeState::Sending {
            self.complete_exchange(FALLBACK_REPLY.to_string());
        }
    }

    pub fn count(&self, role: ChatRole) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }
}

/// Held while a reply is pending. If the exchange future is dropped before
/// the reply lands, the conversation gets the fallback reply and goes back to
/// `Idle`.
struct InFlight {
    conversation: Weak<Mutex<Conversation>>,
    armed: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Some(conversation) = self.conversation.upgrade() else {
            return;
        };
        warn!("Exchange abandoned while a reply was pending; releasing the conversation.");
        if let Ok(mut guard) = conversation.try_lock() {
            guard.abandon_exchange();
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    conversation.lock().await.abandon_exchange();
                });
            }
            Err(e) => error!("Could not release abandoned conversation: {}", e),
        }
    }
}

/// Runs one user → assistant exchange against `service`.
///
/// The lock is released while the request is in flight. Only a weak handle is
/// kept across the await, so a conversation dropped mid-flight is left alone.
pub async fn exchange(
    conversation: Arc<Mutex<Conversation>>,
    service: &dyn ChatCompletionService,
    input: &str,
) -> Result<ExchangeOutcome, ExchangeRejected> {
    let pending = conversation.lock().await.begin_exchange(input)?;
    let handle = Arc::downgrade(&conversation);
    drop(conversation);
    let mut in_flight = InFlight {
        conversation: handle.clone(),
        armed: true,
    };

    let reply = match service.complete(&pending.message, &pending.history).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Chat completion failed, using fallback reply: {}", e);
            FALLBACK_REPLY.to_string()
        }
    };

    match handle.upgrade() {
        Some(conversation) => {
            let turn = conversation.lock().await.complete_exchange(reply);
            in_flight.armed = false;
            Ok(ExchangeOutcome::Replied(turn))
        }
        None => {
            in_flight.armed = false;
            info!("Conversation closed before the reply arrived; discarding it.");
            Ok(ExchangeOutcome::Discarded)
        }
    }
}
