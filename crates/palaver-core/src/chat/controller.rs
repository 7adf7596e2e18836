//! Session controller: orchestrates submit and clear.
//!
//! Sequences store mutation, persistence, request building, the completion
//! round trip and the merge of the reply, and exposes the Idle/Submitting
//! state machine to the presentation layer.
//!
//! All methods take `&self`. The message store sits behind an async mutex
//! that is held across each append+save pair, so snapshots reach the
//! persisted slot in the same order as the mutations. The in-flight guard is
//! an atomic flag: a submit that arrives while another is outstanding is
//! ignored.

use std::panic::AssertUnwindSafe;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::FutureExt;
use palaver_types::config::ChatConfig;
use palaver_types::event::{SessionEvent, SessionState};
use palaver_types::llm::CompletionResult;
use palaver_types::message::Message;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, error, info, warn};

use crate::event::bus::SessionEventBus;
use crate::history::persistence::HistoryPersistence;
use crate::history::store::MessageStore;
use crate::llm::client::CompletionClient;
use crate::llm::provider::CompletionProvider;
use crate::llm::request::{RequestBuilder, recent};
use crate::memory::name::NameExtractor;
use crate::storage::kv_store::KvStore;

/// Content of the bot message appended when a completion fails.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error processing your request.";

/// What a call to [`SessionController::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty input, or a submission was already in flight. Nothing appended.
    Ignored,
    /// The user message and the bot reply (success or error-marked) were appended.
    Replied { user: Message, reply: Message },
}

impl SubmitOutcome {
    pub fn reply(&self) -> Option<&Message> {
        match self {
            SubmitOutcome::Ignored => None,
            SubmitOutcome::Replied { reply, .. } => Some(reply),
        }
    }
}

/// Owns conversation state for one session.
///
/// Generic over `KvStore` and `CompletionProvider` to maintain clean
/// architecture (palaver-core never depends on palaver-infra).
pub struct SessionController<K: KvStore, P: CompletionProvider> {
    store: Mutex<MessageStore>,
    persistence: HistoryPersistence<K>,
    client: CompletionClient<P>,
    config: ChatConfig,
    submitting: AtomicBool,
    input: StdMutex<String>,
    events: SessionEventBus,
}

impl<K: KvStore, P: CompletionProvider> SessionController<K, P> {
    /// Create a controller with an empty store.
    pub fn new(persistence: HistoryPersistence<K>, client: CompletionClient<P>, config: ChatConfig) -> Self {
        Self {
            store: Mutex::new(MessageStore::new()),
            persistence,
            client,
            config,
            submitting: AtomicBool::new(false),
            input: StdMutex::new(String::new()),
            events: SessionEventBus::default(),
        }
    }

    /// Create a controller and restore the persisted history into it.
    pub async fn open(
        persistence: HistoryPersistence<K>,
        client: CompletionClient<P>,
        config: ChatConfig,
    ) -> Self {
        let controller = Self::new(persistence, client, config);
        controller.restore().await;
        controller
    }

    /// Replace the in-memory store with the persisted history.
    ///
    /// Returns the number of restored messages.
    pub async fn restore(&self) -> usize {
        let messages = self.persistence.load().await;
        let mut store = self.store.lock().await;
        *store = MessageStore::from_messages(messages);
        info!(count = store.len(), "Restored chat history");
        store.len()
    }

    // --- Observation ---

    /// Snapshot of the full ordered history.
    pub async fn messages(&self) -> Vec<Message> {
        self.store.lock().await.snapshot()
    }

    pub fn state(&self) -> SessionState {
        if self.is_submitting() {
            SessionState::Submitting
        } else {
            SessionState::Idle
        }
    }

    /// Whether a submission is in flight (the input affordance should be disabled).
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Receive session events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn persistence(&self) -> &HistoryPersistence<K> {
        &self.persistence
    }

    /// The name the next request would carry.
    pub async fn remembered_name(&self) -> String {
        let store = self.store.lock().await;
        NameExtractor::remembered_name(store.all(), &self.persistence).await
    }

    // --- Input buffer ---

    pub fn input(&self) -> String {
        self.input.lock().map(|i| i.clone()).unwrap_or_default()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        if let Ok(mut input) = self.input.lock() {
            *input = text.into();
        }
    }

    /// Submit whatever is in the input buffer.
    pub async fn submit_input(&self) -> SubmitOutcome {
        let text = self.input();
        self.submit(&text).await
    }

    // --- Operations ---

    /// Send `text` as the next user turn and merge the reply.
    ///
    /// Ignored when `text` is empty after trimming or when a submission is
    /// already in flight. Otherwise exactly one user message and exactly one
    /// bot message (error-marked on failure) are appended.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let content = text.trim();
        if content.is_empty() {
            debug!("Ignoring empty submission");
            return SubmitOutcome::Ignored;
        }

        let Some(_in_flight) = InFlight::acquire(&self.submitting, &self.events) else {
            debug!("Ignoring submission while another is in flight");
            return SubmitOutcome::Ignored;
        };

        // The name slot is written under the store lock so a concurrent
        // clear() always runs entirely before or after it.
        let (user, history, name) = {
            let mut store = self.store.lock().await;
            let user = match store.append(Message::user(content)) {
                Some(user) => user.clone(),
                None => return SubmitOutcome::Ignored,
            };
            self.persistence.save(store.all()).await;
            let name = NameExtractor::remembered_name(store.all(), &self.persistence).await;
            (user, store.snapshot(), name)
        };
        self.set_input(String::new());
        self.events.publish(SessionEvent::MessageAppended {
            message: user.clone(),
        });
        debug!(message_id = %user.id, history = history.len(), "User message appended");

        let instructions = RequestBuilder::build(
            recent(&history, self.config.max_history),
            text,
            self.config.system_prompt_template.as_deref(),
            &name,
        );

        let outcome = AssertUnwindSafe(self.client.complete(instructions, &self.config.model))
            .catch_unwind()
            .await;

        let reply = match outcome {
            Ok(CompletionResult::Success(response)) => Message::bot(&response),
            Ok(CompletionResult::Failure { error }) => {
                warn!(error = %error, "Completion failed, appending fallback reply");
                Message::bot_error(FALLBACK_REPLY)
            }
            Err(_) => {
                error!("Completion client panicked, appending fallback reply");
                Message::bot_error(FALLBACK_REPLY)
            }
        };

        let reply = self.append(reply).await;
        SubmitOutcome::Replied { user, reply }
    }

    /// Empty the store and erase the persisted history and remembered name.
    ///
    /// Allowed while a submission is in flight; that submission's reply is
    /// still appended when it arrives (last write wins).
    pub async fn clear(&self) {
        let mut store = self.store.lock().await;
        store.clear();
        self.persistence.clear().await;
        drop(store);

        if self.is_submitting() {
            warn!("History cleared while a completion is in flight; its reply will still be appended");
        }
        info!("Chat history cleared");
        self.events.publish(SessionEvent::Cleared);
    }

    async fn append(&self, message: Message) -> Message {
        let mut store = self.store.lock().await;
        let stored = match store.append(message.clone()) {
            Some(stored) => stored.clone(),
            None => return message,
        };
        self.persistence.save(store.all()).await;
        drop(store);

        debug!(message_id = %stored.id, is_error = stored.is_error, "Bot message appended");
        self.events.publish(SessionEvent::MessageAppended {
            message: stored.clone(),
        });
        stored
    }
}

/// Holds the Submitting state; returns to Idle when dropped.
struct InFlight<'a> {
    flag: &'a AtomicBool,
    events: &'a SessionEventBus,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, events: &'a SessionEventBus) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        events.publish(SessionEvent::StateChanged {
            state: SessionState::Submitting,
        });
        Some(Self { flag, events })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        self.events.publish(SessionEvent::StateChanged {
            state: SessionState::Idle,
        });
    }
}
