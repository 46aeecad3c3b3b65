//! VerseCatalog - devotional verses keyed by topic
//!
//! The catalog is a total function from [`Topic`] to [`VerseRecord`]: any
//! topic without its own entry resolves to the `duty` verse.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::topic::Topic;

/// A verse with its translation and citation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    pub topic: Topic,
    /// Sanskrit text in Devanagari
    pub original_text: String,
    pub translation: String,
    pub chapter: u32,
    pub verse_number: u32,
}

impl VerseRecord {
    pub fn new(
        topic: Topic,
        original_text: impl Into<String>,
        translation: impl Into<String>,
        chapter: u32,
        verse_number: u32,
    ) -> Self {
        Self {
            topic,
            original_text: original_text.into(),
            translation: translation.into(),
            chapter,
            verse_number,
        }
    }

    /// Citation in the `BG <chapter>.<verse>` form
    pub fn reference(&self) -> String {
        format!("BG {}.{}", self.chapter, self.verse_number)
    }
}

impl fmt::Display for VerseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BG {}.{}", self.chapter, self.verse_number)
    }
}

/// On-disk shape of a verse entry; the topic comes from the object key.
#[derive(Debug, Deserialize)]
struct VerseEntry {
    #[serde(alias = "verse")]
    original_text: String,
    translation: String,
    chapter: u32,
    #[serde(alias = "verse_num")]
    verse_number: u32,
}

#[derive(Debug, Clone)]
pub struct VerseCatalog {
    verses: HashMap<Topic, VerseRecord>,
    fallback: VerseRecord,
}

impl Default for VerseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl VerseCatalog {
    /// The six built-in verses, one per topic
    pub fn builtin() -> Self {
        let duty = VerseRecord::new(
            Topic::Duty,
            "कर्मण्येवाधिकारस्ते मा फलेषु कदाचन",
            "You have the right to perform your duty, but not to the fruits of action",
            2,
            47,
        );
        let others = [
            VerseRecord::new(
                Topic::Fear,
                "यदा यदा हि धर्मस्य ग्लानिर्भवति भारत",
                "Whenever there is a decline in righteousness and rise in unrighteousness, I manifest myself",
                4,
                7,
            ),
            VerseRecord::new(
                Topic::Confusion,
                "बुद्धियुक्तो जहातीह उभे सुकृतदुष्कृते",
                "One who is united in intelligence abandons both good and bad deeds",
                2,
                50,
            ),
            VerseRecord::new(
                Topic::Attachment,
                "योगस्थः कुरु कर्माणि सङ्गं त्यक्त्वा धनञ्जय",
                "Perform your duty with equipoise, abandoning attachment to success or failure",
                2,
                48,
            ),
            VerseRecord::new(
                Topic::Knowledge,
                "तद्विद्धि प्रणिपातेन परिप्रश्नेन सेवया",
                "Learn the truth by approaching a spiritual master, inquire with humility and render service",
                4,
                34,
            ),
            VerseRecord::new(
                Topic::Peace,
                "सुखदुःखे समे कृत्वा लाभालाभौ जयाजयौ",
                "Treating pleasure and pain, gain and loss, victory and defeat alike, engage in battle",
                2,
                38,
            ),
        ];

        let mut verses: HashMap<Topic, VerseRecord> =
            others.into_iter().map(|v| (v.topic, v)).collect();
        verses.insert(Topic::Duty, duty.clone());

        Self {
            verses,
            fallback: duty,
        }
    }

    /// Build a catalog from a JSON object keyed by topic name.
    ///
    /// Entries accept both `original_text`/`verse_number` and the shorter
    /// `verse`/`verse_num` field names. Keys that are not known topics are
    /// skipped. The `duty` entry is mandatory since it backs every lookup miss.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, VerseEntry> = serde_json::from_str(json)?;

        let mut verses = HashMap::new();
        for (key, entry) in raw {
            let topic = match key.parse::<Topic>() {
                Ok(topic) => topic,
                Err(_) => {
                    log::warn!("Skipping verse entry with unknown topic '{}'", key);
                    continue;
                }
            };
            verses.insert(
                topic,
                VerseRecord {
                    topic,
                    original_text: entry.original_text,
                    translation: entry.translation,
                    chapter: entry.chapter,
                    verse_number: entry.verse_number,
                },
            );
        }

        let fallback = verses
            .get(&Topic::Duty)
            .cloned()
            .ok_or(CatalogError::MissingFallback(Topic::Duty.as_str()))?;

        log::debug!("Loaded verse catalog with {} entries", verses.len());
        Ok(Self { verses, fallback })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Verse for `topic`, or the `duty` verse when the catalog has none
    pub fn lookup(&self, topic: Topic) -> &VerseRecord {
        self.verses.get(&topic).unwrap_or(&self.fallback)
    }

    /// Verse for a raw topic key; unrecognized keys resolve to `duty`
    pub fn lookup_key(&self, key: &str) -> &VerseRecord {
        match key.parse::<Topic>() {
            Ok(topic) => self.lookup(topic),
            Err(_) => &self.fallback,
        }
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }
}
