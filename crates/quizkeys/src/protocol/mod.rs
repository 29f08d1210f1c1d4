// Protocol types - keystrokes, intents and the cross-frame envelope
//
// These are the values that move between the environment and a frame agent,
// and between frame agents.

pub mod envelope;
pub mod keys;

pub use envelope::{FrameId, KEY_EVENT_TYPE, RelayMessage};
pub use keys::{Intent, KeyEvent, KeyInput};
