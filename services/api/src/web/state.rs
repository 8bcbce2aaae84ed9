//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-visitor session state.

use crate::config::Config;
use chrono::{DateTime, Duration, Utc};
use safety_portal_core::{
    checkout::{CheckoutFlow, TrialFlow},
    conversation::Conversation,
    ports::{AuthProvider, ChatCompletionService, SubmissionService},
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

/// Builds a fresh auth provider for each new visitor session.
pub type AuthProviderFactory = Arc<dyn Fn() -> Arc<dyn AuthProvider> + Send + Sync>;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: SessionRegistry,
    pub conversations: ConversationRegistry,
    pub chat_adapter: Arc<dyn ChatCompletionService>,
    pub submission_adapter: Arc<dyn SubmissionService>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        auth_factory: AuthProviderFactory,
        chat_adapter: Arc<dyn ChatCompletionService>,
        submission_adapter: Arc<dyn SubmissionService>,
    ) -> Self {
        let ttl = Duration::days(config.session_ttl_days);
        let idle_ttl = Duration::minutes(config.conversation_idle_minutes);
        Self {
            config,
            sessions: SessionRegistry::new(auth_factory, ttl),
            conversations: ConversationRegistry::new(idle_ttl),
            chat_adapter,
            submission_adapter,
        }
    }
}

//=========================================================================================
// VisitorSession (Specific to One Browser)
//=========================================================================================

/// Everything the landing page remembers about one browser, keyed by the
/// `session` cookie.
pub struct VisitorSession {
    pub id: Uuid,
    pub auth: Arc<dyn AuthProvider>,
    pub checkout: Mutex<CheckoutFlow>,
    pub trial: Mutex<TrialFlow>,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<VisitorSession>>>,
    auth_factory: AuthProviderFactory,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(auth_factory: AuthProviderFactory, ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            auth_factory,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the session if it exists and has not expired.
    pub async fn get(&self, id: Uuid) -> Option<Arc<VisitorSession>> {
        let session = self.sessions.read().await.get(&id).cloned()?;
        if session.expires_at <= Utc::now() {
            self.remove(id).await;
            return None;
        }
        Some(session)
    }

    /// Creates a new anonymous session, dropping any that have expired.
    pub async fn create(&self) -> Arc<VisitorSession> {
        let now = Utc::now();
        let session = Arc::new(VisitorSession {
            id: Uuid::new_v4(),
            auth: (self.auth_factory)(),
            checkout: Mutex::new(CheckoutFlow::new()),
            trial: Mutex::new(TrialFlow::new()),
            expires_at: now + self.ttl,
        });

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session.id, session.clone());
        info!("Created visitor session {}", session.id);
        session
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

//=========================================================================================
// ConversationRegistry
//=========================================================================================

/// Open assistant conversations. Removing one while a reply is in flight
/// makes that reply get discarded. Conversations idle for longer than the
/// idle TTL are dropped the next time one is opened.
pub struct ConversationRegistry {
    conversations: RwLock<HashMap<Uuid, ConversationEntry>>,
    idle_ttl: Duration,
}

struct ConversationEntry {
    conversation: Arc<Mutex<Conversation>>,
    last_active: DateTime<Utc>,
}

impl ConversationRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    pub async fn create(&self) -> (Uuid, Arc<Mutex<Conversation>>) {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let conversation = Arc::new(Mutex::new(Conversation::new()));

        let mut conversations = self.conversations.write().await;
        let before = conversations.len();
        conversations.retain(|_, entry| entry.last_active + self.idle_ttl > now);
        if conversations.len() < before {
            info!("Dropped {} idle conversations", before - conversations.len());
        }
        conversations.insert(
            id,
            ConversationEntry {
                conversation: conversation.clone(),
                last_active: now,
            },
        );
        (id, conversation)
    }

    /// Returns the conversation and marks it active, unless it has gone idle.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<Conversation>>> {
        let now = Utc::now();
        let mut conversations = self.conversations.write().await;
        let entry = conversations.get_mut(&id)?;
        if entry.last_active + self.idle_ttl <= now {
            conversations.remove(&id);
            return None;
        }
        entry.last_active = now;
        Some(entry.conversation.clone())
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.conversations.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }
}
