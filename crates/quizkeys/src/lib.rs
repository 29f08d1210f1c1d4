//! quizkeys: keyboard control for quiz widgets across frames and shadow DOM
//!
//! Drives answer choices, next/previous and hint/explain controls from the
//! keyboard, even when the widget lives in nested iframes or shadow roots the
//! top page cannot see into.
//!
//! Each frame runs a [`FrameAgent`]. On a keydown the agent scans its document
//! for visible, labeled, interactive elements, decides whether the frame looks
//! like a quiz, and either clicks the best matching control or relays the key
//! to other frames until one of them can use it.
//!
//! | Key           | Action                       |
//! |---------------|------------------------------|
//! | Space         | Next                         |
//! | Shift + Space | Previous                     |
//! | 1 - 4         | Answer A - D                 |
//! | 5             | Hint, falling back to Explain|
//!
//! # Examples
//!
//! ## One frame
//!
//! ```ignore
//! use quizkeys::{AgentOptions, FrameAgent, KeyEvent, KeyInput};
//! use quizkeys::dom::{ElementSpec, MemoryDocument};
//! use quizkeys::runtime::MailboxPort;
//!
//! let mut doc = MemoryDocument::parse("https://quiz.example/")?;
//! let body = doc.body();
//! let paris = doc.append(body, ElementSpec::button("A. Paris"))?;
//! doc.append(body, ElementSpec::button("B. Lyon"))?;
//! doc.append(body, ElementSpec::button("Next"))?;
//!
//! let mut agent = FrameAgent::new(doc, MailboxPort::for_top(), AgentOptions::default());
//! let mut event = KeyEvent::new(KeyInput::digit(1), None);
//! assert!(agent.on_keydown(&mut event).is_handled());
//! assert!(event.default_prevented());
//! assert_eq!(agent.dom().clicks(), &[paris]);
//! ```
//!
//! ## Nested frames
//!
//! ```ignore
//! use quizkeys::runtime::FrameTree;
//!
//! let mut tree = FrameTree::new(AgentOptions::default());
//! let top = tree.add_top(MemoryDocument::parse("https://host.example/")?)?;
//! let quiz = tree.add_child(top, quiz_document)?;
//! tree.press(top, KeyInput::space())?;
//! tree.settle();
//! assert_eq!(tree.document(quiz)?.clicks().len(), 1);
//! ```

pub mod api;
pub mod dom;
mod error;
pub mod frame;
pub mod protocol;
pub mod quiz;
pub mod runtime;

// Re-export error types
pub use error::{Error, Result};

// Re-export configuration
pub use api::AgentOptions;

// Re-export the frame entry points
pub use frame::{FrameAgent, KeyOutcome, MessageOutcome, MessagePort};

// Re-export DOM seam
pub use dom::{DomSurface, NodeId};

// Re-export key and envelope types
pub use protocol::{FrameId, Intent, KeyEvent, KeyInput, RelayMessage};

// Re-export detection primitives
pub use quiz::{AnswerLetter, Candidate, is_quiz_context, scan, select};
