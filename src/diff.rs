//! Word-level annotation of a spoken sentence against its correction
//!
//! Marks each word of both sentences as unchanged or exclusive to its side.
//! This is a single-pass membership heuristic, not a sequence-alignment
//! algorithm: a word counts as shared when its bare form occurs anywhere in
//! the other sentence as a case-insensitive substring. The resulting
//! highlighting matches what learners see, so the heuristic must stay as-is.

/// Punctuation stripped from a word before the exclusivity comparison
const STRIP_CHARS: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')',
];

/// Classification of one word within an annotated sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordStatus {
    /// Word (or its bare form) also occurs in the other sentence
    Unchanged,
    /// Word occurs only on this side; rendered as a removal or addition
    Exclusive,
}

/// One word of an annotated sentence, in original case and segmentation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordMark {
    /// The original token, punctuation and case preserved
    pub word: String,
    /// Whether the word is shared with the other sentence
    pub status: WordStatus,
}

/// Ordered word annotation for one sentence
///
/// Preserves the sentence's whitespace segmentation exactly; punctuation
/// stays attached to its word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    /// Words in sentence order
    pub words: Vec<WordMark>,
}

impl Annotation {
    /// Annotation with every word left unchanged
    fn unchanged(sentence: &str) -> Self {
        Self {
            words: sentence
                .split_whitespace()
                .map(|word| WordMark {
                    word: word.to_string(),
                    status: WordStatus::Unchanged,
                })
                .collect(),
        }
    }

    /// Words marked exclusive, in sentence order
    pub fn exclusive_words(&self) -> impl Iterator<Item = &str> {
        self.words
            .iter()
            .filter(|m| m.status == WordStatus::Exclusive)
            .map(|m| m.word.as_str())
    }

    /// True when no word is marked exclusive
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.words.iter().all(|m| m.status == WordStatus::Unchanged)
    }
}

/// Word annotations for a sentence pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceDiff {
    /// Annotation of the reference sentence (exclusive words are removals)
    pub reference: Annotation,
    /// Annotation of the comparand sentence (exclusive words are additions)
    pub comparand: Annotation,
}

/// Annotate a sentence pair, marking the words exclusive to each side.
///
/// Pure and idempotent: identical inputs always produce identical output.
/// If either sentence is empty there is nothing to compare and both sides
/// come back fully unchanged.
#[must_use]
pub fn annotate(reference: &str, comparand: &str) -> SentenceDiff {
    if reference.is_empty() || comparand.is_empty() {
        return SentenceDiff {
            reference: Annotation::unchanged(reference),
            comparand: Annotation::unchanged(comparand),
        };
    }

    SentenceDiff {
        reference: mark_exclusive(reference, comparand),
        comparand: mark_exclusive(comparand, reference),
    }
}

/// Mark the words of `sentence` that have no match anywhere in `other`.
///
/// A repeated token is only marked at its first position: marking locates
/// the first occurrence of the exact token per pass, so later duplicates
/// keep their unchanged status. Known limitation, kept for parity with the
/// rendered highlighting.
fn mark_exclusive(sentence: &str, other: &str) -> Annotation {
    let other_lower = other.to_lowercase();
    let mut annotation = Annotation::unchanged(sentence);

    // Tokens are collected up front so marking cannot affect the iteration.
    let tokens: Vec<String> = annotation.words.iter().map(|m| m.word.clone()).collect();

    for token in &tokens {
        let bare = strip_punctuation(token);
        if bare.is_empty() || other_lower.contains(&bare.to_lowercase()) {
            continue;
        }

        if let Some(mark) = annotation.words.iter_mut().find(|m| m.word == *token) {
            mark.status = WordStatus::Exclusive;
        }
    }

    annotation
}

/// Remove the fixed punctuation set from a token, keeping case
fn strip_punctuation(word: &str) -> String {
    word.chars().filter(|c| !STRIP_CHARS.contains(c)).collect()
}
