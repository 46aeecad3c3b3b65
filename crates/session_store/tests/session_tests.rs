//! Persistence scenarios for chat sessions

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use guide_core::{
    ConversationPipeline, Emotion, FixedPicker, Message, Role, Topic, UserContext, WELCOME_TEXT,
};
use session_store::{
    ChatSession, FileSessionStore, MemorySessionStore, SessionError, SessionOptions, SessionStore,
    CONTEXT_KEY, MESSAGES_KEY,
};
use tempfile::tempdir;

fn options() -> SessionOptions {
    SessionOptions {
        session_id: "it".to_string(),
        reply_delay: Duration::ZERO,
        history_limit: 10,
    }
}

fn pipeline() -> ConversationPipeline {
    ConversationPipeline::with_picker(Box::new(FixedPicker(0)))
}

#[tokio::test]
async fn test_message_log_survives_reopen() {
    let dir = tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("it"));

    let persisted = {
        let mut session = ChatSession::open(store.clone(), pipeline(), options()).await;
        session.send("I worry about the future").await.unwrap();
        session.send("How do I let go?").await.unwrap();
        session.messages().to_vec()
    };

    let reopened = ChatSession::open(store, pipeline(), options()).await;
    assert_eq!(reopened.messages(), persisted.as_slice());
    assert_eq!(
        reopened.context().topics_discussed.iter().copied().collect::<Vec<_>>(),
        vec![Topic::Fear, Topic::Attachment]
    );
    assert_eq!(reopened.context().emotional_state, Emotion::Attached);
}

#[tokio::test]
async fn test_stored_log_round_trips_by_value() {
    let store = MemorySessionStore::new();
    let mut session = ChatSession::open(store.clone(), pipeline(), options()).await;
    session.send("Teach me wisdom").await.unwrap();

    let blob = store.load(MESSAGES_KEY).await.unwrap().unwrap();
    let decoded: Vec<Message> = serde_json::from_str(&blob).unwrap();
    assert_eq!(decoded, session.messages());
}

#[tokio::test]
async fn test_reopen_continues_ids_after_stored_ones() {
    let store = MemorySessionStore::new();
    let future_id = chrono::Utc::now().timestamp_millis() + 60_000;
    let log = vec![Message::welcome(future_id)];
    store
        .save(MESSAGES_KEY, &serde_json::to_string(&log).unwrap())
        .await
        .unwrap();

    let mut session = ChatSession::open(store, pipeline(), options()).await;
    let exchange = session.send("hello").await.unwrap().unwrap();
    assert!(exchange.user.id > future_id);
}

#[tokio::test]
async fn test_reset_returns_to_welcome_state() {
    let store = MemorySessionStore::new();
    let mut session = ChatSession::open(store.clone(), pipeline(), options()).await;
    let start_before = session.context().session_start;

    session.send("I must do my duty").await.unwrap();
    session.send("I am afraid").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    session.reset().await.unwrap();

    assert_eq!(session.messages().len(), 1);
    let welcome = &session.messages()[0];
    assert!(welcome.same_content(&Message::welcome(0)));
    assert_eq!(welcome.role, Role::Guide);
    assert!(session.context().topics_discussed.is_empty());
    assert_eq!(session.context().emotional_state, Emotion::Neutral);
    assert!(session.context().session_start > start_before);

    // The fresh context and welcome log are both stored
    let context: UserContext =
        serde_json::from_str(&store.load(CONTEXT_KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(&context, session.context());
    let stored: Vec<Message> =
        serde_json::from_str(&store.load(MESSAGES_KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].text, WELCOME_TEXT);
}

#[tokio::test]
async fn test_reset_session_start_survives_reopen() {
    let dir = tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("it"));

    let created_at = {
        let mut session = ChatSession::open(store.clone(), pipeline(), options()).await;
        session.send("I am lost").await.unwrap();
        session.reset().await.unwrap();
        session.summary().created_at
    };

    let reopened = ChatSession::open(store, pipeline(), options()).await;
    assert_eq!(reopened.summary().created_at, created_at);
    assert_eq!(reopened.messages().len(), 1);
}

#[tokio::test]
async fn test_corrupted_entries_degrade_to_bootstrap() {
    let store = MemorySessionStore::new();
    store.save(MESSAGES_KEY, "[{broken").await.unwrap();
    store.save(CONTEXT_KEY, "not json").await.unwrap();

    let session = ChatSession::open(store.clone(), pipeline(), options()).await;

    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.messages()[0].text, WELCOME_TEXT);
    assert_eq!(session.context().emotional_state, Emotion::Neutral);

    // The bootstrap log replaced the corrupted one
    let stored = store.load(MESSAGES_KEY).await.unwrap().unwrap();
    assert!(serde_json::from_str::<Vec<Message>>(&stored).is_ok());
}

#[tokio::test]
async fn test_topics_stay_unique_across_session() {
    let mut session = ChatSession::open(MemorySessionStore::new(), pipeline(), options()).await;
    for _ in 0..4 {
        session.send("so much stress").await.unwrap();
    }
    session.send("random words").await.unwrap();

    let topics: Vec<Topic> = session.context().topics_discussed.iter().copied().collect();
    assert_eq!(topics, vec![Topic::Duty, Topic::Peace]);
    assert_eq!(session.context().emotional_state, Emotion::Neutral);

    let stats = session.stats();
    assert_eq!(stats.exchanges, 5);
    assert_eq!(stats.topic_counts.get(&Topic::Peace), Some(&4));
}

#[tokio::test]
async fn test_guide_reply_verse_matches_analysis() {
    let mut session = ChatSession::open(MemorySessionStore::new(), pipeline(), options()).await;
    for text in ["my work", "scared", "should I", "holding on", "learn", "calm", "hi"] {
        let exchange = session.send(text).await.unwrap().unwrap();
        let verse = exchange.reply.verse.unwrap();
        let analysis = exchange.reply.analysis.unwrap();
        assert_eq!(verse.topic, analysis.topic, "{text}");
    }
}

/// Store whose reads fail and whose writes can be switched off
#[derive(Default)]
struct FlakyStore {
    inner: MemorySessionStore,
    reject_writes: AtomicBool,
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn load(&self, _key: &str) -> session_store::Result<Option<String>> {
        Err(SessionError::StorageError("storage unavailable".to_string()))
    }

    async fn save(&self, key: &str, blob: &str) -> session_store::Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(SessionError::StorageError("quota exceeded".to_string()));
        }
        self.inner.save(key, blob).await
    }

    async fn remove(&self, key: &str) -> session_store::Result<()> {
        self.inner.remove(key).await
    }
}

#[tokio::test]
async fn test_unreadable_store_still_opens() {
    let session = ChatSession::open(FlakyStore::default(), pipeline(), options()).await;
    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.store().inner.len().await, 1);
}

#[tokio::test]
async fn test_failed_save_is_reported() {
    let mut session = ChatSession::open(FlakyStore::default(), pipeline(), options()).await;
    session.store().reject_writes.store(true, Ordering::SeqCst);

    let err = session.send("I am anxious").await.unwrap_err();
    assert!(matches!(err, SessionError::StorageError(_)));

    // Nothing from the failed exchange is kept
    assert_eq!(session.messages().len(), 1);
    assert!(session.context().topics_discussed.is_empty());
    let stored = session.store().inner.load(MESSAGES_KEY).await.unwrap().unwrap();
    assert_eq!(serde_json::from_str::<Vec<Message>>(&stored).unwrap().len(), 1);
}

/// Store that fails a single save of `key`: the `nth` one, counted from zero
struct FailOnceStore {
    inner: MemorySessionStore,
    key: &'static str,
    nth: usize,
    seen: AtomicUsize,
}

impl FailOnceStore {
    fn new(key: &'static str, nth: usize) -> Self {
        Self {
            inner: MemorySessionStore::new(),
            key,
            nth,
            seen: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SessionStore for FailOnceStore {
    async fn load(&self, key: &str) -> session_store::Result<Option<String>> {
        self.inner.load(key).await
    }

    async fn save(&self, key: &str, blob: &str) -> session_store::Result<()> {
        if key == self.key && self.seen.fetch_add(1, Ordering::SeqCst) == self.nth {
            return Err(SessionError::StorageError("disk full".to_string()));
        }
        self.inner.save(key, blob).await
    }

    async fn remove(&self, key: &str) -> session_store::Result<()> {
        self.inner.remove(key).await
    }
}

async fn stored_state(store: &FailOnceStore) -> (Vec<Message>, UserContext) {
    let messages = store.inner.load(MESSAGES_KEY).await.unwrap().unwrap();
    let context = store.inner.load(CONTEXT_KEY).await.unwrap().unwrap();
    (
        serde_json::from_str(&messages).unwrap(),
        serde_json::from_str(&context).unwrap(),
    )
}

#[tokio::test]
async fn test_failed_context_save_rolls_back_exchange() {
    let store = FailOnceStore::new(CONTEXT_KEY, 0);
    let mut session = ChatSession::open(store, pipeline(), options()).await;

    let err = session.send("I am afraid").await.unwrap_err();
    assert!(matches!(err, SessionError::StorageError(_)));

    let roles: Vec<Role> = session.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::Guide]);
    assert!(session.context().topics_discussed.is_empty());
    assert_eq!(session.context().emotional_state, Emotion::Neutral);

    let (messages, context) = stored_state(session.store()).await;
    assert_eq!(messages, session.messages());
    assert_eq!(&context, session.context());

    // A retry records the message once
    session.send("I am afraid").await.unwrap().unwrap();
    let users: Vec<&str> = session
        .messages()
        .iter()
        .filter(|m| m.is_user())
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(users, vec!["I am afraid"]);
    assert_eq!(session.messages().len(), 3);
    let (messages, context) = stored_state(session.store()).await;
    assert_eq!(messages, session.messages());
    assert_eq!(context.topics_discussed.iter().copied().collect::<Vec<_>>(), vec![Topic::Fear]);
}

#[tokio::test]
async fn test_failed_reply_save_rolls_back_exchange() {
    // Saves of the message log: welcome, user turn, then the reply
    let store = FailOnceStore::new(MESSAGES_KEY, 2);
    let mut session = ChatSession::open(store, pipeline(), options()).await;

    assert!(session.send("What is my duty?").await.is_err());

    assert_eq!(session.messages().len(), 1);
    assert!(session.context().topics_discussed.is_empty());
    assert!(session.context().last_interaction.is_none());

    // The context stored before the reply failed was written back
    let (messages, context) = stored_state(session.store()).await;
    assert_eq!(messages, session.messages());
    assert!(context.topics_discussed.is_empty());
}
