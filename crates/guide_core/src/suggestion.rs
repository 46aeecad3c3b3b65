//! SuggestionCatalog - follow-up prompts per category

use std::collections::HashMap;

use crate::topic::Category;

#[derive(Debug, Clone)]
pub struct SuggestionCatalog {
    prompts: HashMap<Category, Vec<String>>,
}

impl Default for SuggestionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SuggestionCatalog {
    pub fn builtin() -> Self {
        let table: [(Category, [&str; 3]); 6] = [
            (
                Category::LifeDecision,
                [
                    "Tell me more about your situation",
                    "What does your intuition say?",
                    "What are you most afraid of?",
                ],
            ),
            (
                Category::Emotional,
                [
                    "How long have you felt this way?",
                    "What would help you feel safe?",
                    "Share more about this feeling",
                ],
            ),
            (
                Category::Dharma,
                [
                    "What feels like your calling?",
                    "How can you serve better?",
                    "What brings you joy?",
                ],
            ),
            (
                Category::Spiritual,
                [
                    "What are you ready to release?",
                    "How can I support your journey?",
                    "What does your soul need?",
                ],
            ),
            (
                Category::Learning,
                [
                    "What interests you most?",
                    "How will you apply this?",
                    "What questions remain?",
                ],
            ),
            (
                Category::General,
                [
                    "What's on your mind today?",
                    "How can I guide you?",
                    "Share your heart with me",
                ],
            ),
        ];

        let prompts = table
            .into_iter()
            .map(|(category, items)| (category, items.iter().map(|s| s.to_string()).collect()))
            .collect();

        Self { prompts }
    }

    /// Prompts for `category`, in fixed order
    pub fn suggestions(&self, category: Category) -> &[String] {
        self.prompts
            .get(&category)
            .or_else(|| self.prompts.get(&Category::General))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Prompts for a raw category key; unknown keys get the `general` prompts
    pub fn suggestions_for_key(&self, key: &str) -> &[String] {
        self.suggestions(Category::from_key(key))
    }
}
