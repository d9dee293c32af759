//! Terminal rendering of practice feedback

use std::io::IsTerminal;

use crate::diff::{Annotation, WordStatus};
use crate::session::{FeedbackSink, FeedbackView};

/// Commentary shown when the service offers none
const DEFAULT_PRONUNCIATION_FEEDBACK: &str = "Well done!";

/// Width of the pronunciation score meter
const METER_WIDTH: usize = 20;

const RESET: &str = "\x1b[0m";
/// Strikethrough + dim, for words the learner should drop
const REMOVAL_STYLE: &str = "\x1b[9;2m";
/// Green underline, for words the correction adds
const ADDITION_STYLE: &str = "\x1b[4;32m";

/// How exclusive words in an annotation should read
#[derive(Clone, Copy)]
enum Marking {
    /// Words present in the utterance but not the correction
    Removal,
    /// Words present in the correction but not the utterance
    Addition,
}

/// Renders feedback to stdout
pub struct TerminalRenderer {
    color: bool,
}

impl TerminalRenderer {
    /// Renderer with color when stdout is a terminal (and `NO_COLOR` unset)
    #[must_use]
    pub fn new() -> Self {
        Self {
            color: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Renderer without ANSI styling; exclusive words get wdiff-style markers
    #[must_use]
    pub const fn plain() -> Self {
        Self { color: false }
    }

    /// Render an annotated sentence, highlighting its exclusive words
    fn format_annotation(&self, annotation: &Annotation, marking: Marking) -> String {
        let words: Vec<String> = annotation
            .words
            .iter()
            .map(|mark| match mark.status {
                WordStatus::Unchanged => mark.word.clone(),
                WordStatus::Exclusive => match (self.color, marking) {
                    (true, Marking::Removal) => format!("{REMOVAL_STYLE}{}{RESET}", mark.word),
                    (true, Marking::Addition) => format!("{ADDITION_STYLE}{}{RESET}", mark.word),
                    (false, Marking::Removal) => format!("[-{}-]", mark.word),
                    (false, Marking::Addition) => format!("{{+{}+}}", mark.word),
                },
            })
            .collect();

        words.join(" ")
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackSink for TerminalRenderer {
    fn feedback(&mut self, view: &FeedbackView) {
        let result = &view.result;

        println!();
        println!("=== Feedback ===");
        println!();

        if result.transcript.is_empty() {
            println!("(nothing transcribed)");
        } else {
            println!("You said: \"{}\"", result.transcript);
        }
        println!();

        let score = usize::from(result.pronunciation_score.min(100));
        let filled = score * METER_WIDTH / 100;
        let meter = "█".repeat(filled) + &"░".repeat(METER_WIDTH - filled);
        println!("Pronunciation  {score:>3}/100  [{meter}]");
        println!(
            "  {}",
            result
                .pronunciation_feedback
                .as_deref()
                .unwrap_or(DEFAULT_PRONUNCIATION_FEEDBACK)
        );
        println!();

        if let Some(diff) = &view.diff {
            println!("Grammar");
            println!(
                "  you said:    \"{}\"",
                self.format_annotation(&diff.reference, Marking::Removal)
            );
            println!(
                "  correction:  \"{}\"",
                self.format_annotation(&diff.comparand, Marking::Addition)
            );
            if let Some(note) = &result.grammar_feedback {
                println!("  {note}");
            }
            println!();
        }

        if let Some(alternative) = &result.better_alternative {
            println!("More natural: \"{alternative}\"");
            println!();
        }

        if let Some(level) = &result.cefr_level {
            match &result.cefr_feedback {
                Some(note) => println!("Level: {level} — {note}"),
                None => println!("Level: {level}"),
            }
            println!();
        }

        if let Some(response) = &result.response {
            println!("Coach: \"{response}\"");
            println!();
        }

        if view.playback_phrase.is_some() {
            println!("(playing response...)");
        }
    }

    fn failure(&mut self, message: &str) {
        println!();
        println!("=== Analysis failed ===");
        println!();
        println!("  {message}");
        println!("  Check the service configuration or try again.");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::annotate;

    #[test]
    fn test_plain_markers() {
        let renderer = TerminalRenderer::plain();
        // "shop" is a substring of "shopping", so only "go" reads as a removal
        let diff = annotate("I go shop", "I went shopping");

        assert_eq!(
            renderer.format_annotation(&diff.reference, Marking::Removal),
            "I [-go-] shop"
        );
        assert_eq!(
            renderer.format_annotation(&diff.comparand, Marking::Addition),
            "I {+went+} {+shopping+}"
        );
    }

    #[test]
    fn test_clean_annotation_renders_verbatim() {
        let renderer = TerminalRenderer::plain();
        let diff = annotate("hello there", "Hello there.");

        assert_eq!(
            renderer.format_annotation(&diff.reference, Marking::Removal),
            "hello there"
        );
    }
}
