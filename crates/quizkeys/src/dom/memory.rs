// MemoryDocument - arena-backed in-process document
//
// Implements `DomSurface` without a browser. Nodes live in a flat arena and
// refer to each other by `NodeId`. Shadow roots are arena nodes with no light
// parent; their host points at them, so ordinary traversal never reaches
// shadow content unless it asks for it.
//
// Writes (clicks, focus moves) are recorded so callers can observe what the
// agent did to the page.

use crate::dom::{ComputedStyle, DomSurface, FocusOptions, NodeId, Rect};
use crate::error::{Error, Result};
use std::collections::HashMap;
use url::Url;

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    ShadowRoot { host: NodeId },
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attrs: HashMap<String, String>,
    style: ComputedStyle,
    rects: Vec<Rect>,
    click_handler: bool,
    content_editable: bool,
    focusable: bool,
    shadow_root: Option<NodeId>,
}

/// Description of an element to append to a [`MemoryDocument`].
///
/// # Example
///
/// ```ignore
/// use quizkeys::dom::{ElementSpec, MemoryDocument};
///
/// let mut doc = MemoryDocument::parse("https://quiz.example/")?;
/// let body = doc.body();
/// let next = doc.append(body, ElementSpec::button("Next"))?;
/// let hint = doc.append(body, ElementSpec::new("div").attr("role", "button").text("Hint"))?;
/// ```
#[derive(Debug, Clone)]
pub struct ElementSpec {
    tag: String,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    style: ComputedStyle,
    rects: Vec<Rect>,
    click_handler: bool,
    content_editable: bool,
    focusable: bool,
}

impl ElementSpec {
    /// A visible element with a default 120x32 box
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            text: None,
            style: ComputedStyle::default(),
            rects: vec![Rect::new(0.0, 0.0, 120.0, 32.0)],
            click_handler: false,
            content_editable: false,
            focusable: true,
        }
    }

    /// `<button>` whose text is `label`
    pub fn button(label: impl Into<String>) -> Self {
        Self::new("button").text(label)
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    /// Text node appended as the element's first child
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn style(mut self, style: ComputedStyle) -> Self {
        self.style = style;
        self
    }

    /// `display: none`
    pub fn hidden(mut self) -> Self {
        self.style.display = "none".to_string();
        self.rects.clear();
        self
    }

    /// `visibility: hidden`
    pub fn invisible(mut self) -> Self {
        self.style.visibility = "hidden".to_string();
        self
    }

    /// `opacity: 0`
    pub fn transparent(mut self) -> Self {
        self.style.opacity = "0".to_string();
        self
    }

    pub fn rects(mut self, rects: Vec<Rect>) -> Self {
        self.rects = rects;
        self
    }

    /// Collapse the box to zero size while keeping styles visible
    pub fn zero_size(mut self) -> Self {
        self.rects = vec![Rect::new(0.0, 0.0, 0.0, 0.0)];
        self
    }

    pub fn on_click(mut self) -> Self {
        self.click_handler = true;
        self
    }

    pub fn content_editable(mut self) -> Self {
        self.content_editable = true;
        self
    }

    /// Element without a focus method
    pub fn not_focusable(mut self) -> Self {
        self.focusable = false;
        self
    }
}

/// In-memory document for one frame.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    url: Url,
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    has_focus: bool,
    focused: Option<NodeId>,
    reject_focus_options: bool,
    clicks: Vec<NodeId>,
    frame_focus_count: usize,
}

impl MemoryDocument {
    /// Creates an empty document with a `<body>` at `url`
    pub fn new(url: Url) -> Self {
        let mut doc = Self {
            url,
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            body: NodeId(0),
            has_focus: false,
            focused: None,
            reject_focus_options: false,
            clicks: Vec::new(),
            frame_focus_count: 0,
        };
        // Body has no focus method; focus lands on the first focusable control
        let mut body = ElementSpec::new("body").not_focusable();
        body.rects = vec![Rect::new(0.0, 0.0, 1280.0, 720.0)];
        doc.body = doc.create_element(Some(doc.root), body);
        doc
    }

    /// Creates an empty document, parsing `url` first
    pub fn parse(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| Error::InvalidArgument(format!("invalid frame URL '{}': {}", url, e)))?;
        Ok(Self::new(url))
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Appends an element under `parent` (an element, the document or a shadow root)
    pub fn append(&mut self, parent: NodeId, spec: ElementSpec) -> Result<NodeId> {
        match self.node(parent)?.kind {
            NodeKind::Text(_) => Err(Error::NotAnElement(parent)),
            _ => Ok(self.create_element(Some(parent), spec)),
        }
    }

    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> Result<NodeId> {
        match self.node(parent)?.kind {
            NodeKind::Text(_) => Err(Error::NotAnElement(parent)),
            _ => Ok(self.create_node(Some(parent), NodeKind::Text(text.into()))),
        }
    }

    /// Attaches an open shadow root to `host` and returns it.
    ///
    /// Attaching twice returns the existing root.
    pub fn attach_shadow(&mut self, host: NodeId) -> Result<NodeId> {
        if let Some(existing) = self.element(host)?.shadow_root {
            return Ok(existing);
        }
        let shadow = self.create_node(None, NodeKind::ShadowRoot { host });
        self.element_mut(host)?.shadow_root = Some(shadow);
        Ok(shadow)
    }

    /// Removes `node` from its parent; the subtree stays in the arena but is
    /// no longer connected.
    pub fn detach(&mut self, node: NodeId) -> Result<()> {
        let parent = self.node(node)?.parent;
        if let Some(parent) = parent {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
        self.nodes[node.0].parent = None;
        if self.focused == Some(node) {
            self.focused = None;
        }
        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        self.element_mut(node)?
            .attrs
            .insert(name.to_ascii_lowercase(), value.into());
        Ok(())
    }

    pub fn set_style(&mut self, node: NodeId, style: ComputedStyle) -> Result<()> {
        self.element_mut(node)?.style = style;
        Ok(())
    }

    /// Simulates the user focusing or leaving this frame
    pub fn set_has_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    /// Makes `focus(node, Some(options))` fail so callers must retry plainly
    pub fn set_reject_focus_options(&mut self, reject: bool) {
        self.reject_focus_options = reject;
    }

    /// Elements clicked so far, oldest first
    pub fn clicks(&self) -> &[NodeId] {
        &self.clicks
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// How many times the frame window itself was focused
    pub fn frame_focus_count(&self) -> usize {
        self.frame_focus_count
    }

    fn create_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    fn create_element(&mut self, parent: Option<NodeId>, spec: ElementSpec) -> NodeId {
        let data = ElementData {
            tag: spec.tag,
            attrs: spec.attrs.into_iter().collect(),
            style: spec.style,
            rects: spec.rects,
            click_handler: spec.click_handler,
            content_editable: spec.content_editable,
            focusable: spec.focusable,
            shadow_root: None,
        };
        let id = self.create_node(parent, NodeKind::Element(data));
        if let Some(text) = spec.text {
            self.create_node(Some(id), NodeKind::Text(text));
        }
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| Error::Dom(format!("unknown node {}", id)))
    }

    fn element(&self, id: NodeId) -> Result<&ElementData> {
        match &self.node(id)?.kind {
            NodeKind::Element(data) => Ok(data),
            _ => Err(Error::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData> {
        self.node(id)?;
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(data) => Ok(data),
            _ => Err(Error::NotAnElement(id)),
        }
    }

    /// Light parent, or the host when `id` is a shadow root
    fn composed_parent(&self, id: NodeId) -> Option<NodeId> {
        let node = self.nodes.get(id.0)?;
        match node.kind {
            NodeKind::ShadowRoot { host } => Some(host),
            _ => node.parent,
        }
    }

    fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.composed_parent(node);
        }
        false
    }

    /// True when `id` or any composed ancestor is `display: none`
    fn in_undisplayed_subtree(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(Node {
                kind: NodeKind::Element(data),
                ..
            }) = self.nodes.get(node.0)
                && data.style.display == "none"
            {
                return true;
            }
            current = self.composed_parent(node);
        }
        false
    }

    fn connected_element(&self, id: NodeId) -> Result<&ElementData> {
        let data = self.element(id)?;
        if !self.is_connected(id) {
            return Err(Error::Detached(id));
        }
        Ok(data)
    }
}

impl DomSurface for MemoryDocument {
    fn url(&self) -> &Url {
        &self.url
    }

    fn document(&self) -> NodeId {
        self.root
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(node) = self.nodes.get(root.0) else {
            return out;
        };
        let mut stack: Vec<NodeId> = node.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if matches!(node.kind, NodeKind::Element(_)) {
                out.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    fn shadow_root(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).ok()?.shadow_root
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.element(node).ok().map(|data| data.tag.clone())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)
            .ok()?
            .attrs
            .get(&name.to_ascii_lowercase())
            .cloned()
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(current) = self.nodes.get(id.0) else {
                continue;
            };
            if let NodeKind::Text(value) = &current.kind {
                text.push_str(value);
            }
            stack.extend(current.children.iter().rev().copied());
        }
        text
    }

    fn computed_style(&self, node: NodeId) -> Result<ComputedStyle> {
        Ok(self.connected_element(node)?.style.clone())
    }

    fn client_rects(&self, node: NodeId) -> Result<Vec<Rect>> {
        let data = self.connected_element(node)?;
        if self.in_undisplayed_subtree(node) {
            return Ok(Vec::new());
        }
        Ok(data.rects.clone())
    }

    fn has_click_handler(&self, node: NodeId) -> bool {
        self.element(node).is_ok_and(|data| data.click_handler)
    }

    fn is_content_editable(&self, node: NodeId) -> bool {
        // Editability is inherited until an ancestor says "false"
        let mut current = Some(node);
        while let Some(id) = current {
            if let Ok(data) = self.element(id) {
                if data.content_editable {
                    return true;
                }
                match data.attrs.get("contenteditable") {
                    Some(v) if v.is_empty() || v.eq_ignore_ascii_case("true") => return true,
                    Some(v) if v.eq_ignore_ascii_case("false") => return false,
                    _ => {}
                }
            }
            current = self.composed_parent(id);
        }
        false
    }

    fn is_focusable(&self, node: NodeId) -> bool {
        self.element(node).is_ok_and(|data| data.focusable)
    }

    fn has_focus(&self) -> bool {
        self.has_focus
    }

    fn body_tab_index(&self) -> Option<i32> {
        let body = self.element(self.body).ok()?;
        Some(
            body.attrs
                .get("tabindex")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(-1),
        )
    }

    fn set_body_tab_index(&mut self, index: i32) -> Result<()> {
        let body = self.body;
        self.set_attribute(body, "tabindex", index.to_string())
    }

    fn click(&mut self, node: NodeId) -> Result<()> {
        self.connected_element(node)?;
        tracing::debug!("click on {} in {}", node, self.url);
        self.clicks.push(node);
        Ok(())
    }

    fn focus(&mut self, node: NodeId, options: Option<FocusOptions>) -> Result<()> {
        let data = self.connected_element(node)?;
        if !data.focusable {
            return Err(Error::FocusRejected {
                node,
                reason: "element has no focus method".to_string(),
            });
        }
        if self.in_undisplayed_subtree(node) || data.style.visibility == "hidden" {
            return Err(Error::FocusRejected {
                node,
                reason: "element is not rendered".to_string(),
            });
        }
        if options.is_some() && self.reject_focus_options {
            return Err(Error::FocusRejected {
                node,
                reason: "focus options are not supported".to_string(),
            });
        }
        self.focused = Some(node);
        self.has_focus = true;
        Ok(())
    }

    fn focus_frame(&mut self) -> Result<()> {
        self.frame_focus_count += 1;
        self.has_focus = true;
        Ok(())
    }
}
