//! InputClassifier - ordered keyword rules
//!
//! Rules are tested in list order against the lowercased message and the first
//! match wins. The order is the tie-break for messages that hit several rules,
//! so the rules live in a `Vec` and are never reordered.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::topic::{Category, Emotion, Topic};

/// Result of classifying one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub topic: Topic,
    pub emotion: Emotion,
    pub category: Category,
}

impl Classification {
    pub const fn new(topic: Topic, emotion: Emotion, category: Category) -> Self {
        Self {
            topic,
            emotion,
            category,
        }
    }

    /// Classification used when no rule matches
    pub const fn fallback() -> Self {
        Self::new(Topic::Duty, Emotion::Neutral, Category::General)
    }
}

/// A keyword alternation and the classification it produces
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    keywords: Vec<String>,
    pattern: Regex,
    result: Classification,
}

impl ClassificationRule {
    /// Build a rule matching any of `keywords` as a substring.
    ///
    /// Keywords are escaped, so the resulting pattern always compiles.
    pub fn new(keywords: &[&str], result: Classification) -> Self {
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(&k.to_lowercase()))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&alternation).expect("Failed to compile escaped keyword pattern");

        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            pattern,
            result,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn result(&self) -> Classification {
        self.result
    }

    /// `lowered` must already be lowercase
    fn matches(&self, lowered: &str) -> bool {
        self.pattern.is_match(lowered)
    }
}

#[derive(Debug, Clone)]
pub struct InputClassifier {
    rules: Vec<ClassificationRule>,
    fallback: Classification,
}

impl Default for InputClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl InputClassifier {
    /// Classifier with the built-in rule list
    pub fn new() -> Self {
        let rules = vec![
            ClassificationRule::new(
                &["career", "job", "work", "profession", "confusion", "choice"],
                Classification::new(Topic::Confusion, Emotion::Confused, Category::LifeDecision),
            ),
            ClassificationRule::new(
                &["fear", "afraid", "scared", "worry", "anxious"],
                Classification::new(Topic::Fear, Emotion::Fearful, Category::Emotional),
            ),
            ClassificationRule::new(
                &["duty", "responsibility", "should", "must", "obligation"],
                Classification::new(Topic::Duty, Emotion::Burdened, Category::Dharma),
            ),
            ClassificationRule::new(
                &["attached", "attachment", "let go", "holding"],
                Classification::new(Topic::Attachment, Emotion::Attached, Category::Spiritual),
            ),
            ClassificationRule::new(
                &["learn", "knowledge", "wisdom", "understand"],
                Classification::new(Topic::Knowledge, Emotion::Curious, Category::Learning),
            ),
            ClassificationRule::new(
                &["stress", "peace", "calm", "overwhelm"],
                Classification::new(Topic::Peace, Emotion::Stressed, Category::Emotional),
            ),
        ];
        Self::with_rules(rules)
    }

    /// Classifier with a custom rule list, tested in the given order
    pub fn with_rules(rules: Vec<ClassificationRule>) -> Self {
        Self {
            rules,
            fallback: Classification::fallback(),
        }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn classify(&self, text: &str) -> Classification {
        let lowered = text.to_lowercase();

        let result = self
            .rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(ClassificationRule::result)
            .unwrap_or(self.fallback);

        log::debug!(
            "Classified message as {} ({}, {})",
            result.topic,
            result.emotion,
            result.category
        );
        result
    }
}
