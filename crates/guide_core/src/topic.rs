//! Topic, emotion and category tags
//!
//! These are the fixed vocabularies the classifier produces and the catalogs
//! are keyed by. None of them is extended at runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Thematic topic driving verse and reply selection
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    #[default]
    Duty,
    Fear,
    Confusion,
    Attachment,
    Knowledge,
    Peace,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Duty,
        Topic::Fear,
        Topic::Confusion,
        Topic::Attachment,
        Topic::Knowledge,
        Topic::Peace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Duty => "duty",
            Topic::Fear => "fear",
            Topic::Confusion => "confusion",
            Topic::Attachment => "attachment",
            Topic::Knowledge => "knowledge",
            Topic::Peace => "peace",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Topic::ALL
            .iter()
            .copied()
            .find(|topic| topic.as_str() == key)
            .ok_or_else(|| CatalogError::UnknownTopic(s.to_string()))
    }
}

/// Emotional state attributed to a message
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Confused,
    Fearful,
    Burdened,
    Attached,
    Curious,
    Stressed,
    #[default]
    Neutral,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Confused => "confused",
            Emotion::Fearful => "fearful",
            Emotion::Burdened => "burdened",
            Emotion::Attached => "attached",
            Emotion::Curious => "curious",
            Emotion::Stressed => "stressed",
            Emotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suggestion category a classification falls into
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    LifeDecision,
    Emotional,
    Dharma,
    Spiritual,
    Learning,
    #[default]
    General,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::LifeDecision,
        Category::Emotional,
        Category::Dharma,
        Category::Spiritual,
        Category::Learning,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::LifeDecision => "life_decision",
            Category::Emotional => "emotional",
            Category::Dharma => "dharma",
            Category::Spiritual => "spiritual",
            Category::Learning => "learning",
            Category::General => "general",
        }
    }

    /// Resolve a raw category key, falling back to `general`
    pub fn from_key(key: &str) -> Self {
        let key = key.trim().to_ascii_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == key)
            .unwrap_or(Category::General)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
