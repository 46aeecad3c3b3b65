//! guide_core - message classification and response composition
//!
//! This crate provides the pure part of the guide:
//! - `classifier` - ordered keyword rules producing a Classification
//! - `verse` / `suggestion` - static catalogs keyed by topic and category
//! - `composer` - canned replies with an injectable picker
//! - `pipeline` - classify, look up and compose in one call
//! - `message` - message log entries and the user context

pub mod classifier;
pub mod composer;
pub mod error;
pub mod message;
pub mod pipeline;
pub mod suggestion;
pub mod topic;
pub mod verse;

// Re-export commonly used types
pub use classifier::{Classification, ClassificationRule, InputClassifier};
pub use composer::{ComposedReply, FixedPicker, RandomPicker, ReplyPicker, ResponseComposer};
pub use error::CatalogError;
pub use message::{Message, Role, UserContext, WELCOME_TEXT};
pub use pipeline::{ConversationPipeline, ReplyRecord};
pub use suggestion::SuggestionCatalog;
pub use topic::{Category, Emotion, Topic};
pub use verse::{VerseCatalog, VerseRecord};
