//! ResponseComposer - canned replies with the verse translation interpolated
//!
//! Reply selection is the only nondeterminism in the pipeline. It goes through
//! a [`ReplyPicker`] so tests can pin which candidate is chosen.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::classifier::Classification;
use crate::suggestion::SuggestionCatalog;
use crate::topic::Topic;
use crate::verse::{VerseCatalog, VerseRecord};

/// Placeholder replaced by the verse translation in reply templates
pub const TRANSLATION_PLACEHOLDER: &str = "{translation}";

/// Chooses one of `len` candidates
pub trait ReplyPicker: Send {
    /// Must return an index below `len`; `len` is never zero
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform random selection backed by a seedable generator
#[derive(Debug, Clone)]
pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplyPicker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Always picks the same index, clamped to the candidate count
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPicker(pub usize);

impl ReplyPicker for FixedPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}

/// Reply text plus the verse and follow-up prompts that go with it
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedReply {
    pub text: String,
    pub verse: VerseRecord,
    pub suggestions: Vec<String>,
}

/// Reply templates for a topic
pub fn reply_templates(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::Confusion => &[
            "Dear friend, I sense the confusion in your heart. The Gita teaches us: \"{translation}\". Focus on action, not results.",
            "Every soul faces crossroads. Remember: \"{translation}\". Let your inner voice guide your choice.",
        ],
        Topic::Fear => &[
            "Fear is natural. \"{translation}\". Breathe, name your fear, take one small step.",
            "Fear whispers lies, but courage speaks truth. \"{translation}\". You are stronger than you know.",
        ],
        Topic::Duty => &[
            "Dharma is your path. \"{translation}\". Act with love, not attachment to results.",
            "Duty is sacred. \"{translation}\". Offer your efforts to something greater.",
        ],
        Topic::Attachment => &[
            "Attachment causes suffering. \"{translation}\". Appreciate what you have and let go.",
            "Seek peace within. \"{translation}\". Softening your grip creates space for blessings.",
        ],
        Topic::Knowledge => &[
            "Thirst for knowledge is beautiful. \"{translation}\". Learn, apply, and share.",
            "Knowledge is realization. \"{translation}\". Meditate and let wisdom guide your actions.",
        ],
        Topic::Peace => &[
            "Peace dwells within. \"{translation}\". Respond, don't react, cultivate calm.",
            "Stress is resistance. \"{translation}\". Accept the moment and flow with life.",
        ],
    }
}

/// Templates for a raw topic key; unknown keys get the `duty` templates
pub fn reply_templates_for_key(key: &str) -> &'static [&'static str] {
    reply_templates(key.parse::<Topic>().unwrap_or(Topic::Duty))
}

pub struct ResponseComposer {
    verses: VerseCatalog,
    suggestions: SuggestionCatalog,
    picker: Box<dyn ReplyPicker>,
}

impl ResponseComposer {
    pub fn new(
        verses: VerseCatalog,
        suggestions: SuggestionCatalog,
        picker: Box<dyn ReplyPicker>,
    ) -> Self {
        Self {
            verses,
            suggestions,
            picker,
        }
    }

    pub fn verses(&self) -> &VerseCatalog {
        &self.verses
    }

    pub fn suggestions(&self) -> &SuggestionCatalog {
        &self.suggestions
    }

    pub fn compose(&mut self, topic: Topic, classification: &Classification) -> ComposedReply {
        let verse = self.verses.lookup(topic).clone();
        let templates = reply_templates(topic);
        let index = self.picker.pick(templates.len()).min(templates.len() - 1);
        let text = templates[index].replace(TRANSLATION_PLACEHOLDER, &verse.translation);
        let suggestions = self.suggestions.suggestions(classification.category).to_vec();

        log::debug!(
            "Composed reply {} for topic {} with {} ({} category)",
            index,
            topic,
            verse.reference(),
            classification.category
        );

        ComposedReply {
            text,
            verse,
            suggestions,
        }
    }
}

impl Default for ResponseComposer {
    fn default() -> Self {
        Self::new(
            VerseCatalog::builtin(),
            SuggestionCatalog::builtin(),
            Box::new(RandomPicker::new()),
        )
    }
}

impl std::fmt::Debug for ResponseComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseComposer")
            .field("verses", &self.verses.len())
            .finish_non_exhaustive()
    }
}
