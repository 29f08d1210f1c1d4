// Key input and logical intents
//
// A physical keydown becomes a `KeyEvent`; the transportable part of it
// (`KeyInput`) is what crosses frame boundaries. `Intent` is the logical
// action a key maps to once a frame has decided it is quiz context.

use crate::dom::NodeId;
use crate::quiz::AnswerLetter;
use serde::{Deserialize, Serialize};

/// Key, code and shift state of one keystroke
///
/// # Example
///
/// ```ignore
/// use quizkeys::protocol::KeyInput;
///
/// let space = KeyInput::new(" ", "Space");
/// let back = KeyInput::new(" ", "Space").with_shift(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInput {
    pub key: String,
    pub code: String,
    pub shift_key: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
            shift_key: false,
        }
    }

    /// Digit key in the main row, e.g. `KeyInput::digit(1)` is "1"/"Digit1"
    pub fn digit(digit: u8) -> Self {
        Self::new(digit.to_string(), format!("Digit{}", digit))
    }

    pub fn space() -> Self {
        Self::new(" ", "Space")
    }

    pub fn with_shift(mut self, shift_key: bool) -> Self {
        self.shift_key = shift_key;
        self
    }

    pub fn is_space(&self) -> bool {
        self.code == "Space" || self.key == " "
    }
}

/// A keydown as seen by one frame's listener
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub input: KeyInput,
    /// Element the event was dispatched to, if it targeted an element
    pub target: Option<NodeId>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl KeyEvent {
    pub fn new(input: KeyInput, target: Option<NodeId>) -> Self {
        Self {
            input,
            target,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Logical action requested by a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    /// Space
    Next,
    /// Shift + Space
    Previous,
    /// Digits 1-4
    Answer(AnswerLetter),
    /// Digit 5: "Hint", falling back to "Explain"
    HintOrExplain,
}

impl Intent {
    /// Maps a keystroke to an intent; `None` for keys the widget does not use.
    pub fn from_key(input: &KeyInput) -> Option<Self> {
        if input.is_space() {
            return Some(if input.shift_key {
                Self::Previous
            } else {
                Self::Next
            });
        }
        match input.key.as_str() {
            "1" => Some(Self::Answer(AnswerLetter::A)),
            "2" => Some(Self::Answer(AnswerLetter::B)),
            "3" => Some(Self::Answer(AnswerLetter::C)),
            "4" => Some(Self::Answer(AnswerLetter::D)),
            "5" => Some(Self::HintOrExplain),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_maps_by_shift() {
        assert_eq!(Intent::from_key(&KeyInput::space()), Some(Intent::Next));
        assert_eq!(
            Intent::from_key(&KeyInput::space().with_shift(true)),
            Some(Intent::Previous)
        );
        // Some layouts report only the code
        assert_eq!(
            Intent::from_key(&KeyInput::new("Spacebar", "Space")),
            Some(Intent::Next)
        );
    }

    #[test]
    fn test_digits_map_to_answers_and_hint() {
        assert_eq!(
            Intent::from_key(&KeyInput::digit(3)),
            Some(Intent::Answer(AnswerLetter::C))
        );
        assert_eq!(
            Intent::from_key(&KeyInput::digit(5)),
            Some(Intent::HintOrExplain)
        );
        assert_eq!(Intent::from_key(&KeyInput::digit(6)), None);
        assert_eq!(Intent::from_key(&KeyInput::new("a", "KeyA")), None);
    }

    #[test]
    fn test_key_input_wire_names() {
        let json = serde_json::to_value(KeyInput::space().with_shift(true)).unwrap();
        assert_eq!(json["key"], " ");
        assert_eq!(json["code"], "Space");
        assert_eq!(json["shiftKey"], true);
    }
}
