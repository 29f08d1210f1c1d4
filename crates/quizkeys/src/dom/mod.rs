// DOM surface - the read/write view of one frame's document
//
// The core never talks to a browser directly. Everything it needs from the
// page goes through `DomSurface`: tree traversal (including shadow roots),
// style and geometry queries for visibility, label reads, focus state, and the
// two write operations it performs (click and focus).
//
// Architecture:
// - A binding to a real browser implements `DomSurface` for its frame handle
// - `MemoryDocument` is the in-process arena implementation used by the
//   frame runtime, tests, benches and demos

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub mod memory;

pub use memory::{ElementSpec, MemoryDocument};

/// Opaque handle to a node within one frame's document.
///
/// Handles are only meaningful for the document that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The subset of computed style the visibility check reads
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    /// Raw CSS value; parsed leniently by the scanner
    pub opacity: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: "1".to_string(),
        }
    }
}

/// One client rectangle of an element's box
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the rectangle has no area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Options for programmatic focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusOptions {
    /// Ask the host not to scroll the element into view
    pub prevent_scroll: bool,
}

/// Read and write access to one frame's document.
///
/// Queries that can fail in a browser (style and rect reads on disconnected
/// nodes, focus on hidden nodes) return `Result`; the callers in this crate
/// treat every failure as recoverable.
pub trait DomSurface {
    /// URL of the frame this document belongs to
    fn url(&self) -> &Url;

    /// The document node, root of the light tree
    fn document(&self) -> NodeId;

    /// Descendant elements of `root` in document order.
    ///
    /// Does not cross into shadow roots; callers descend explicitly via
    /// [`DomSurface::shadow_root`].
    fn descendants(&self, root: NodeId) -> Vec<NodeId>;

    /// Shadow root attached to `node`, if any
    fn shadow_root(&self, node: NodeId) -> Option<NodeId>;

    /// Lower-cased tag name, `None` for non-element nodes
    fn tag_name(&self, node: NodeId) -> Option<String>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Rendered text of the node's light subtree
    fn text_content(&self, node: NodeId) -> String;

    fn computed_style(&self, node: NodeId) -> Result<ComputedStyle>;

    fn client_rects(&self, node: NodeId) -> Result<Vec<Rect>>;

    /// Whether the element exposes a script click handler
    fn has_click_handler(&self, node: NodeId) -> bool;

    fn is_content_editable(&self, node: NodeId) -> bool;

    /// Whether the element exposes a focus method at all
    fn is_focusable(&self, node: NodeId) -> bool;

    /// Whether this frame's document currently holds input focus
    fn has_focus(&self) -> bool;

    /// Tab index of the body element, if the document has a body
    fn body_tab_index(&self) -> Option<i32>;

    fn set_body_tab_index(&mut self, index: i32) -> Result<()>;

    /// Dispatch a synthetic click on `node`
    fn click(&mut self, node: NodeId) -> Result<()>;

    /// Move focus to `node`
    fn focus(&mut self, node: NodeId, options: Option<FocusOptions>) -> Result<()>;

    /// Focus the frame's window itself
    fn focus_frame(&mut self) -> Result<()>;
}
