// Error types for quizkeys
//
// Nothing in this crate is fatal. The frame agent catches every variant below,
// logs it, and degrades (alternate focus method, skipped element, skipped child
// frame) instead of aborting the keystroke.

use crate::dom::NodeId;
use thiserror::Error;

/// Result type alias for quizkeys operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the DOM surface, the message channel and configuration
#[derive(Debug, Error)]
pub enum Error {
    /// The node is no longer connected to its document
    ///
    /// Style and rectangle queries on a detached node fail this way. The
    /// scanner treats such nodes as invisible.
    #[error("Node {0} is detached from the document")]
    Detached(NodeId),

    /// The node exists but is not an element (document, text or shadow root)
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    /// Focus was refused by the DOM
    ///
    /// Hidden elements refuse focus, and some hosts refuse the
    /// `preventScroll` form of focus. Callers fall back to plain focus.
    #[error("Focus rejected for node {node}: {reason}")]
    FocusRejected { node: NodeId, reason: String },

    /// Generic DOM failure reported by a `DomSurface` implementation
    #[error("DOM error: {0}")]
    Dom(String),

    /// The receiving frame's mailbox is gone (frame torn down or cross-origin)
    #[error("Message channel closed for frame '{0}'")]
    ChannelClosed(String),

    /// A cross-frame message did not carry a valid key relay envelope
    #[error("Invalid relay envelope: {0}")]
    InvalidEnvelope(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid argument or configuration value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }
}
