//! ConversationPipeline - classify, look up, compose
//!
//! The pipeline holds no session state. Callers own the message log and the
//! user context, and are expected to drop blank input before calling
//! [`ConversationPipeline::respond`].

use serde::{Deserialize, Serialize};

use crate::classifier::{Classification, InputClassifier};
use crate::composer::{ReplyPicker, ResponseComposer};
use crate::suggestion::SuggestionCatalog;
use crate::verse::{VerseCatalog, VerseRecord};

/// Everything produced for one user message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyRecord {
    pub text: String,
    pub verse: VerseRecord,
    pub suggestions: Vec<String>,
    pub classification: Classification,
}

#[derive(Debug, Default)]
pub struct ConversationPipeline {
    classifier: InputClassifier,
    composer: ResponseComposer,
}

impl ConversationPipeline {
    pub fn new(classifier: InputClassifier, composer: ResponseComposer) -> Self {
        Self {
            classifier,
            composer,
        }
    }

    /// Built-in catalogs with the given reply picker
    pub fn with_picker(picker: Box<dyn ReplyPicker>) -> Self {
        Self::new(
            InputClassifier::new(),
            ResponseComposer::new(VerseCatalog::builtin(), SuggestionCatalog::builtin(), picker),
        )
    }

    pub fn classifier(&self) -> &InputClassifier {
        &self.classifier
    }

    pub fn verses(&self) -> &VerseCatalog {
        self.composer.verses()
    }

    pub fn classify(&self, text: &str) -> Classification {
        self.classifier.classify(text)
    }

    pub fn respond(&mut self, text: &str) -> ReplyRecord {
        let classification = self.classifier.classify(text);
        let composed = self.composer.compose(classification.topic, &classification);

        log::info!(
            "Replying on {} with {}",
            classification.topic,
            composed.verse.reference()
        );

        ReplyRecord {
            text: composed.text,
            verse: composed.verse,
            suggestions: composed.suggestions,
            classification,
        }
    }
}
