//! ChatSession - owns the message log and user context of one session
//!
//! `send` takes `&mut self`, so a session never has two replies pending at
//! once: the next message can only be sent after the previous reply landed.

use chrono::Utc;
use guide_core::{ConversationPipeline, Message, UserContext};
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::storage::{SessionStore, CONTEXT_KEY, MESSAGES_KEY};
use crate::structs::{Exchange, SessionOptions, SessionStats, SessionSummary};

pub struct ChatSession<S: SessionStore> {
    store: S,
    pipeline: ConversationPipeline,
    options: SessionOptions,
    messages: Vec<Message>,
    context: UserContext,
    last_id: i64,
}

impl<S: SessionStore> ChatSession<S> {
    /// Load the session from `store`, bootstrapping it when nothing usable is
    /// stored. Load failures are logged and never returned.
    pub async fn open(store: S, pipeline: ConversationPipeline, options: SessionOptions) -> Self {
        let id = options.session_id.as_str();
        let stored_messages = load_entry::<S, Vec<Message>>(&store, MESSAGES_KEY, id).await;
        let stored_context = load_entry::<S, UserContext>(&store, CONTEXT_KEY, id).await;

        let mut session = Self {
            store,
            pipeline,
            options,
            messages: Vec::new(),
            context: stored_context.unwrap_or_default(),
            last_id: 0,
        };

        match stored_messages {
            Some(messages) => {
                session.last_id = messages.iter().map(|m| m.id).max().unwrap_or(0);
                session.messages = messages;
                tracing::info!(
                    session_id = %session.options.session_id,
                    messages = session.messages.len(),
                    "Session restored"
                );
            }
            None => {
                session.bootstrap();
                if let Err(e) = session.persist_messages().await {
                    tracing::warn!(
                        session_id = %session.options.session_id,
                        "Failed to persist welcome message: {}",
                        e
                    );
                }
                tracing::info!(session_id = %session.options.session_id, "Session started");
            }
        }

        session
    }

    pub fn session_id(&self) -> &str {
        &self.options.session_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn context(&self) -> &UserContext {
        &self.context
    }

    pub fn pipeline(&self) -> &ConversationPipeline {
        &self.pipeline
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one exchange. Blank input is ignored and yields `Ok(None)`.
    ///
    /// The user turn and the updated context are persisted before the reply
    /// delay; the reply is persisted once it is delivered. A failed save rolls
    /// the whole exchange back in memory and in the store.
    pub async fn send(&mut self, text: &str) -> Result<Option<Exchange>> {
        if text.trim().is_empty() {
            tracing::debug!(session_id = %self.options.session_id, "Ignoring blank message");
            return Ok(None);
        }

        let committed = self.messages.len();
        let context = self.context.clone();

        match self.exchange(text).await {
            Ok(exchange) => Ok(Some(exchange)),
            Err(e) => {
                tracing::warn!(
                    session_id = %self.options.session_id,
                    "Exchange failed, rolling back: {}",
                    e
                );
                self.roll_back(committed, context).await;
                Err(e)
            }
        }
    }

    async fn exchange(&mut self, text: &str) -> Result<Exchange> {
        let user = Message::user(self.next_id(), text);
        self.messages.push(user.clone());
        self.persist_messages().await?;

        let reply = self.pipeline.respond(text);
        self.context.record(&reply.classification);
        self.persist_context().await?;

        tracing::info!(
            session_id = %self.options.session_id,
            topic = %reply.classification.topic,
            emotion = %reply.classification.emotion,
            verse = %reply.verse,
            "Reply composed"
        );

        if !self.options.reply_delay.is_zero() {
            tokio::time::sleep(self.options.reply_delay).await;
        }

        let reply = Message::reply(self.next_id(), reply);
        self.messages.push(reply.clone());
        self.persist_messages().await?;

        Ok(Exchange { user, reply })
    }

    /// Restore the state from before a failed exchange. Memory is
    /// authoritative; a store that still rejects writes is only logged and
    /// catches up with the next successful save.
    async fn roll_back(&mut self, committed: usize, context: UserContext) {
        self.messages.truncate(committed);
        self.context = context;

        if let Err(e) = self.persist_messages().await {
            tracing::warn!(
                session_id = %self.options.session_id,
                "Failed to restore stored messages: {}",
                e
            );
        }
        if let Err(e) = self.persist_context().await {
            tracing::warn!(
                session_id = %self.options.session_id,
                "Failed to restore stored context: {}",
                e
            );
        }
    }

    /// Drop both stored entries and start over with the welcome message and
    /// a fresh context, both written back right away
    pub async fn reset(&mut self) -> Result<()> {
        self.store.remove(MESSAGES_KEY).await?;
        self.store.remove(CONTEXT_KEY).await?;

        self.context = UserContext::new();
        self.bootstrap();
        self.persist_messages().await?;
        self.persist_context().await?;

        tracing::info!(session_id = %self.options.session_id, "Session reset");
        Ok(())
    }

    /// The most recent `limit` messages, oldest first
    pub fn recent(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    /// Recent messages using the configured history limit
    pub fn history(&self) -> &[Message] {
        self.recent(self.options.history_limit)
    }

    /// Suggestions attached to the latest guide reply, if any
    pub fn latest_suggestions(&self) -> &[String] {
        self.messages
            .iter()
            .rev()
            .find(|m| !m.is_user())
            .and_then(|m| m.suggestions.as_deref())
            .unwrap_or(&[])
    }

    pub fn summary(&self) -> SessionSummary {
        let last_activity = self
            .context
            .last_interaction
            .or_else(|| self.messages.last().map(|m| m.timestamp))
            .unwrap_or(self.context.session_start);

        SessionSummary {
            session_id: self.options.session_id.clone(),
            topics_discussed: self.context.topics_discussed.iter().copied().collect(),
            emotional_state: self.context.emotional_state,
            message_count: self.messages.iter().filter(|m| m.is_user()).count(),
            created_at: self.context.session_start,
            last_activity,
        }
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats::from_messages(&self.messages)
    }

    fn bootstrap(&mut self) {
        let welcome = Message::welcome(self.next_id());
        self.messages = vec![welcome];
    }

    /// Millisecond timestamp, bumped past the previous id when needed
    fn next_id(&mut self) -> i64 {
        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id
    }

    async fn persist_messages(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.messages)?;
        self.store.save(MESSAGES_KEY, &blob).await
    }

    async fn persist_context(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.context)?;
        self.store.save(CONTEXT_KEY, &blob).await
    }
}

/// Read and decode one entry. Missing, unreadable or corrupted entries all
/// come back as `None`; the latter two are logged.
pub(crate) async fn load_entry<S, T>(store: &S, key: &str, session_id: &str) -> Option<T>
where
    S: SessionStore,
    T: DeserializeOwned,
{
    let blob = match store.load(key).await {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(
                session_id,
                key,
                "Failed to read stored entry: {}",
                e
            );
            return None;
        }
    };

    match serde_json::from_str(&blob) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                session_id,
                key,
                "Discarding corrupted entry: {}",
                e
            );
            None
        }
    }
}
