// SharedDocument - a MemoryDocument the page can keep mutating
//
// The agent running inside a `FrameEventLoop` owns its `DomSurface`. Pages
// re-render underneath scripts, so this handle lets the host side edit the
// same document while the loop runs. Each call takes the lock for the
// duration of that single query.

use crate::dom::{ComputedStyle, DomSurface, FocusOptions, MemoryDocument, NodeId, Rect};
use crate::error::Result;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone)]
pub struct SharedDocument {
    url: Url,
    inner: Arc<Mutex<MemoryDocument>>,
}

impl SharedDocument {
    pub fn new(document: MemoryDocument) -> Self {
        Self {
            url: document.url().clone(),
            inner: Arc::new(Mutex::new(document)),
        }
    }

    /// Locks the document for direct inspection or mutation
    pub fn lock(&self) -> MutexGuard<'_, MemoryDocument> {
        self.inner.lock()
    }
}

impl DomSurface for SharedDocument {
    fn url(&self) -> &Url {
        &self.url
    }

    fn document(&self) -> NodeId {
        self.inner.lock().document()
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        self.inner.lock().descendants(root)
    }

    fn shadow_root(&self, node: NodeId) -> Option<NodeId> {
        self.inner.lock().shadow_root(node)
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.inner.lock().tag_name(node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner.lock().attribute(node, name)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.inner.lock().text_content(node)
    }

    fn computed_style(&self, node: NodeId) -> Result<ComputedStyle> {
        self.inner.lock().computed_style(node)
    }

    fn client_rects(&self, node: NodeId) -> Result<Vec<Rect>> {
        self.inner.lock().client_rects(node)
    }

    fn has_click_handler(&self, node: NodeId) -> bool {
        self.inner.lock().has_click_handler(node)
    }

    fn is_content_editable(&self, node: NodeId) -> bool {
        self.inner.lock().is_content_editable(node)
    }

    fn is_focusable(&self, node: NodeId) -> bool {
        self.inner.lock().is_focusable(node)
    }

    fn has_focus(&self) -> bool {
        self.inner.lock().has_focus()
    }

    fn body_tab_index(&self) -> Option<i32> {
        self.inner.lock().body_tab_index()
    }

    fn set_body_tab_index(&mut self, index: i32) -> Result<()> {
        self.inner.lock().set_body_tab_index(index)
    }

    fn click(&mut self, node: NodeId) -> Result<()> {
        self.inner.lock().click(node)
    }

    fn focus(&mut self, node: NodeId, options: Option<FocusOptions>) -> Result<()> {
        self.inner.lock().focus(node, options)
    }

    fn focus_frame(&mut self) -> Result<()> {
        self.inner.lock().focus_frame()
    }
}
