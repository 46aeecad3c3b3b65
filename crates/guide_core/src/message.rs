//! Message log entries and the per-session user context

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::Classification;
use crate::pipeline::ReplyRecord;
use crate::topic::{Emotion, Topic};
use crate::verse::VerseRecord;

/// Greeting that opens every fresh session
pub const WELCOME_TEXT: &str =
    "Namaste, dear soul. I am here as your friend and guide. Share what troubles your heart.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Guide,
}

/// One entry in the message log. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Creation time in milliseconds, bumped to stay strictly increasing
    pub id: i64,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse: Option<VerseRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    /// Classification behind a guide reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Classification>,
}

impl Message {
    pub fn user(id: i64, text: impl Into<String>) -> Self {
        Self::plain(id, Role::User, text)
    }

    pub fn guide(id: i64, text: impl Into<String>) -> Self {
        Self::plain(id, Role::Guide, text)
    }

    pub fn welcome(id: i64) -> Self {
        Self::guide(id, WELCOME_TEXT)
    }

    /// Guide message carrying a pipeline reply
    pub fn reply(id: i64, reply: ReplyRecord) -> Self {
        Self {
            id,
            role: Role::Guide,
            text: reply.text,
            timestamp: Utc::now(),
            verse: Some(reply.verse),
            suggestions: Some(reply.suggestions),
            analysis: Some(reply.classification),
        }
    }

    fn plain(id: i64, role: Role, text: impl Into<String>) -> Self {
        Self {
            id,
            role,
            text: text.into(),
            timestamp: Utc::now(),
            verse: None,
            suggestions: None,
            analysis: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Same text and attachments, ignoring id and timestamp
    pub fn same_content(&self, other: &Message) -> bool {
        self.role == other.role
            && self.text == other.text
            && self.verse == other.verse
            && self.suggestions == other.suggestions
            && self.analysis == other.analysis
    }
}

/// Running summary of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    #[serde(default)]
    pub topics_discussed: BTreeSet<Topic>,
    #[serde(default)]
    pub emotional_state: Emotion,
    pub session_start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_interaction: Option<DateTime<Utc>>,
}

impl Default for UserContext {
    fn default() -> Self {
        Self::new()
    }
}

impl UserContext {
    pub fn new() -> Self {
        Self {
            topics_discussed: BTreeSet::new(),
            emotional_state: Emotion::Neutral,
            session_start: Utc::now(),
            last_interaction: None,
        }
    }

    /// Fold a finished exchange into the context
    pub fn record(&mut self, classification: &Classification) {
        self.topics_discussed.insert(classification.topic);
        self.emotional_state = classification.emotion;
        self.last_interaction = Some(Utc::now());
    }
}
