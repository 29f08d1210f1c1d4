// Detection memo - per-frame state that survives between events
//
// Owned by exactly one frame's dispatcher and dropped with it; a frame reload
// builds a fresh agent and therefore a fresh memo.

use crate::quiz::Candidate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionMemo {
    detected: bool,
    last_fingerprint: Option<String>,
    logged_keydown: bool,
    focus_prepared: bool,
}

impl DetectionMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records quiz-context entry; true only the first time.
    pub fn mark_detected(&mut self) -> bool {
        !std::mem::replace(&mut self.detected, true)
    }

    /// Stores `fingerprint`; true on the first call and whenever it differs
    /// from the previous one.
    pub fn note_fingerprint(&mut self, fingerprint: String) -> bool {
        if self.last_fingerprint.as_deref() == Some(fingerprint.as_str()) {
            return false;
        }
        self.last_fingerprint = Some(fingerprint);
        true
    }

    /// True only for the first keydown this frame sees
    pub fn mark_keydown_logged(&mut self) -> bool {
        !std::mem::replace(&mut self.logged_keydown, true)
    }

    /// True only the first time focus preparation is requested
    pub fn mark_focus_prepared(&mut self) -> bool {
        !std::mem::replace(&mut self.focus_prepared, true)
    }

    pub fn detected(&self) -> bool {
        self.detected
    }

    pub fn focus_prepared(&self) -> bool {
        self.focus_prepared
    }

    pub fn last_fingerprint(&self) -> Option<&str> {
        self.last_fingerprint.as_deref()
    }
}

/// First `limit` labels joined with `|`
pub fn fingerprint(candidates: &[Candidate], limit: usize) -> String {
    candidates
        .iter()
        .take(limit)
        .map(|c| c.label.as_str())
        .collect::<Vec<_>>()
        .join("|")
}
