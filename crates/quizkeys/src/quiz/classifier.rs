// Quiz Classifier
//
// Decides whether a frame "looks like a quiz" from its scanned candidates.
// Best-effort heuristic, pure function of the labels.
//
// Known asymmetry: "next"/"previous" match case-insensitively, while "Hint"
// and "Explain" only match with that exact capitalization. Kept as observed;
// widgets labelled "HINT" will not classify through that branch.

use crate::quiz::scanner::Candidate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Answer slot addressed by the digit keys 1-4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    pub const ALL: [AnswerLetter; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }

    fn pattern(self) -> &'static Regex {
        &ANSWER_PATTERNS[self as usize]
    }
}

impl fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

static ANSWER_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    AnswerLetter::ALL.map(|letter| {
        Regex::new(&format!(r"(?i)^\s*{}[.):\s]", letter.as_char()))
            .expect("answer pattern is a valid regex")
    })
});

/// `label` starts with the answer letter followed by `.`, `)`, `:` or whitespace.
pub fn label_starts_with_answer(label: &str, letter: AnswerLetter) -> bool {
    letter.pattern().is_match(label)
}

/// Lower-cases `label` and checks for `needle`, which must itself be lower-case
/// to ever match.
pub fn label_includes_ignore_case(label: &str, needle: &str) -> bool {
    label.to_lowercase().contains(needle)
}

/// Exact-case substring check
pub fn label_includes_exact(label: &str, needle: &str) -> bool {
    label.contains(needle)
}

/// Case-insensitive "next"
pub fn is_next_label(label: &str) -> bool {
    label_includes_ignore_case(label, "next")
}

/// Case-insensitive "previous"
pub fn is_previous_label(label: &str) -> bool {
    label_includes_ignore_case(label, "previous")
}

/// Exact-case "Hint"
pub fn is_hint_label(label: &str) -> bool {
    label_includes_exact(label, "Hint")
}

/// Exact-case "Explain"
pub fn is_explain_label(label: &str) -> bool {
    label_includes_exact(label, "Explain")
}

/// True when the candidates look like quiz controls.
///
/// Any answer-letter label decides immediately; otherwise a navigation or
/// hint/explain keyword is enough.
pub fn is_quiz_context(candidates: &[Candidate]) -> bool {
    let has_answer = candidates.iter().any(|c| {
        AnswerLetter::ALL
            .iter()
            .any(|&letter| label_starts_with_answer(&c.label, letter))
    });
    if has_answer {
        return true;
    }

    candidates.iter().any(|c| {
        is_next_label(&c.label)
            || is_previous_label(&c.label)
            || is_hint_label(&c.label)
            || is_explain_label(&c.label)
    })
}
