//! Session data structures

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use guide_core::{Emotion, Message, Topic};
use serde::{Deserialize, Serialize};

use crate::config::GuideConfig;

/// Per-session settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub session_id: String,
    /// Pause between storing the user turn and delivering the reply
    pub reply_delay: Duration,
    /// Default number of messages returned by `history`
    pub history_limit: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&GuideConfig::default())
    }
}

impl From<&GuideConfig> for SessionOptions {
    fn from(config: &GuideConfig) -> Self {
        Self {
            session_id: config.session_id.clone(),
            reply_delay: config.reply_delay(),
            history_limit: config.history_limit,
        }
    }
}

/// A user message and the guide reply it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub user: Message,
    pub reply: Message,
}

/// Overview of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub topics_discussed: Vec<Topic>,
    pub emotional_state: Emotion,
    /// Number of user messages
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// One stored session and the length of its message log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionListing {
    pub session_id: String,
    pub total_messages: usize,
}

/// Totals across every session under a data directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionsOverview {
    pub total_sessions: usize,
    pub total_messages: usize,
    pub sessions: Vec<SessionListing>,
}

/// Counters over the message log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_messages: usize,
    pub exchanges: usize,
    pub topic_counts: BTreeMap<Topic, usize>,
}

impl SessionStats {
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut stats = Self {
            total_messages: messages.len(),
            ..Self::default()
        };

        for message in messages {
            if let Some(analysis) = &message.analysis {
                stats.exchanges += 1;
                *stats.topic_counts.entry(analysis.topic).or_insert(0) += 1;
            }
        }

        stats
    }
}
