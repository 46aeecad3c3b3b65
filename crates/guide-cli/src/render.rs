//! Terminal rendering of messages

use colored::Colorize;
use guide_core::{Message, Role, VerseRecord};

pub fn verse_block(verse: &VerseRecord) -> String {
    format!(
        "  {} {}\n  {}",
        format!("📖 {}", verse.reference()).yellow().bold(),
        verse.original_text.italic(),
        verse.translation.dimmed()
    )
}

pub fn suggestion_lines(suggestions: &[String]) -> Vec<String> {
    suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| format!("  {} {}", format!("[{}]", i + 1).cyan(), s))
        .collect()
}

pub fn message(message: &Message) -> String {
    let speaker = match message.role {
        Role::User => "You:".cyan().bold(),
        Role::Guide => "Guide:".green().bold(),
    };
    let time = message.timestamp.format("%H:%M").to_string();

    let mut out = format!("{} {} {}", speaker, time.dimmed(), message.text);
    if let Some(verse) = &message.verse {
        out.push('\n');
        out.push_str(&verse_block(verse));
    }
    if let Some(suggestions) = &message.suggestions {
        for line in suggestion_lines(suggestions) {
            out.push('\n');
            out.push_str(&line);
        }
    }
    out
}

/// Map a numeric shortcut (`1`..) to the matching suggestion
pub fn pick_suggestion<'a>(input: &str, suggestions: &'a [String]) -> Option<&'a str> {
    let index: usize = input.trim().parse().ok()?;
    suggestions.get(index.checked_sub(1)?).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use guide_core::{Classification, ReplyRecord, Topic, VerseCatalog};

    #[test]
    fn pick_suggestion_is_one_based() {
        let suggestions = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(pick_suggestion("1", &suggestions), Some("a"));
        assert_eq!(pick_suggestion(" 3 ", &suggestions), Some("c"));
        assert_eq!(pick_suggestion("0", &suggestions), None);
        assert_eq!(pick_suggestion("4", &suggestions), None);
        assert_eq!(pick_suggestion("hello", &suggestions), None);
    }

    #[test]
    fn message_includes_verse_reference() {
        colored::control::set_override(false);
        let verse = VerseCatalog::builtin().lookup(Topic::Peace).clone();
        let msg = Message::reply(
            1,
            ReplyRecord {
                text: "Peace dwells within.".to_string(),
                verse,
                suggestions: vec!["How can I guide you?".to_string()],
                classification: Classification::fallback(),
            },
        );

        let rendered = message(&msg);
        assert!(rendered.starts_with("Guide: "));
        assert!(rendered.contains("BG 2.38"));
        assert!(rendered.contains("[1] How can I guide you?"));
    }
}
