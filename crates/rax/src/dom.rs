//! Arena-backed host document.
//!
//! The binding engine only needs a narrow view of the page: ordered
//! attributes, document-order traversal, parent links for bubbling, and the
//! field set a form would submit. [`Document`] provides exactly that over a
//! flat node arena addressed by [`NodeId`]. Detached nodes stay in the arena
//! and can be re-attached.

use crate::{Error, Result};

/// Tag names treated as form controls by [`Document::field_set`].
const INPUT: &str = "INPUT";
/// Multi-line text control.
const TEXTAREA: &str = "TEXTAREA";
/// Option list control.
const SELECT: &str = "SELECT";
/// Entry of a SELECT control.
const OPTION: &str = "OPTION";

/// Input types that never contribute to a form's field set.
const BUTTON_LIKE_INPUTS: &[&str] = &["button", "file", "image", "reset", "submit"];

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element payload: upper-case tag plus attributes in declaration order.
#[derive(Debug, Clone)]
struct Element {
    /// Upper-case tag name, as reported by `tagName`.
    tag: String,
    /// Attributes in the order they were first set.
    attrs: Vec<(String, String)>,
}

/// Node payload.
#[derive(Debug, Clone)]
enum NodeKind {
    /// An element with a tag and attributes.
    Element(Element),
    /// A text node.
    Text(String),
}

/// One arena slot.
#[derive(Debug, Clone)]
struct Node {
    /// Parent link; `None` for the body and for detached nodes.
    parent: Option<NodeId>,
    /// Children in document order.
    children: Vec<NodeId>,
    /// Element or text payload.
    kind: NodeKind,
}

/// Ordered `(name, value)` entries a form submits.
///
/// Names may repeat; entry order is tree order of the contributing controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    /// Entries in submission order.
    entries: Vec<(String, String)>,
}

impl FieldSet {
    /// Create an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Entries in submission order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// True when no control contributed a value.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

/// A page: a BODY element, everything attached beneath it, and the viewport scroll offset.
#[derive(Debug, Clone)]
pub struct Document {
    /// Node arena; ids index into it.
    nodes: Vec<Node>,
    /// The BODY element, root of the connected tree.
    body: NodeId,
    /// Viewport scroll offset `(x, y)`.
    scroll: (f64, f64),
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only an empty BODY.
    pub fn new() -> Self {
        let body = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element(Element {
                tag: "BODY".to_string(),
                attrs: Vec::new(),
            }),
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            scroll: (0.0, 0.0),
        }
    }

    /// The BODY element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Look up a node slot.
    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(Error::UnknownNode(id))
    }

    /// Look up an element payload.
    fn element(&self, id: NodeId) -> Result<&Element> {
        match &self.node(id)?.kind {
            NodeKind::Element(e) => Ok(e),
            NodeKind::Text(_) => Err(Error::NotAnElement(id)),
        }
    }

    /// Look up an element payload mutably.
    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        let node = self.nodes.get_mut(id.0).ok_or(Error::UnknownNode(id))?;
        match &mut node.kind {
            NodeKind::Element(e) => Ok(e),
            NodeKind::Text(_) => Err(Error::NotAnElement(id)),
        }
    }

    /// Push a detached node into the arena.
    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Create a detached element. The tag is normalised to upper case.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeKind::Element(Element {
            tag: tag.to_ascii_uppercase(),
            attrs: Vec::new(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Text(text.to_string()))
    }

    /// Append `child` as the last child of `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.element(parent)?;
        self.node(child)?;
        if self.contains(child, parent) {
            return Err(Error::Cycle { parent, child });
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Create an element with attributes and append it under `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId> {
        let id = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attribute(id, name, value)?;
        }
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Create a text node and append it under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        let id = self.create_text(text);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Unlink a node from its parent, if any.
    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Detach `node` (and its subtree) from the document.
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        self.node(node)?;
        self.detach(node);
        Ok(())
    }

    /// Parent of `node`, if attached.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    /// Children of `node` in document order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// True when `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// True when `node` is attached beneath BODY.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.body, node)
    }

    /// Upper-case tag name, or `None` for text and unknown nodes.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).ok().map(|e| e.tag.as_str())
    }

    /// Value of attribute `name`.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .ok()?
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All attributes of `node` in declaration order.
    pub fn attributes(&self, node: NodeId) -> &[(String, String)] {
        self.element(node)
            .map(|e| e.attrs.as_slice())
            .unwrap_or_default()
    }

    /// Set attribute `name`, keeping its original position if it already exists.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let element = self.element_mut(node)?;
        let name = name.to_ascii_lowercase();
        match element.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => element.attrs.push((name, value.to_string())),
        }
        Ok(())
    }

    /// Remove attribute `name`; returns whether it was present.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<bool> {
        let element = self.element_mut(node)?;
        let before = element.attrs.len();
        element.attrs.retain(|(n, _)| n != name);
        Ok(element.attrs.len() != before)
    }

    /// True when the `class` attribute lists `class`.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }

    /// Add `class` to the class list (no-op when already present).
    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        if self.has_class(node, class) {
            return Ok(());
        }
        let list = match self.attribute(node, "class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {}", existing.trim(), class)
            }
            _ => class.to_string(),
        };
        self.set_attribute(node, "class", &list)
    }

    /// Remove `class` from the class list; returns whether it was present.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<bool> {
        if !self.has_class(node, class) {
            return Ok(false);
        }
        let list: Vec<&str> = self
            .attribute(node, "class")
            .unwrap_or_default()
            .split_whitespace()
            .filter(|c| *c != class)
            .collect();
        let list = list.join(" ");
        self.set_attribute(node, "class", &list)?;
        Ok(true)
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    /// Recursive helper for [`Self::text_content`].
    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node.0) else {
            return;
        };
        match &n.kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element(_) => {
                for child in &n.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Elements at or beneath `root`, in document (pre-)order.
    pub fn elements_inclusive(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id.0) else {
                continue;
            };
            if let NodeKind::Element(_) = node.kind {
                out.push(id);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// First connected element whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements_inclusive(self.body)
            .into_iter()
            .find(|n| self.attribute(*n, "id") == Some(id))
    }

    /// The element an interaction at `node` is delivered to: `node` itself,
    /// or the parent element of a text node.
    pub fn event_target(&self, node: NodeId) -> NodeId {
        match self.nodes.get(node.0) {
            Some(Node {
                kind: NodeKind::Text(_),
                parent: Some(parent),
                ..
            }) => *parent,
            _ => node,
        }
    }

    /// Bubbling path: `target` followed by each ancestor up to the root.
    pub fn propagation_path(&self, target: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = self.nodes.get(target.0).map(|_| target);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.parent(current);
        }
        path
    }

    /// Scroll the viewport to `(x, y)`.
    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll = (x, y);
    }

    /// Current viewport scroll offset.
    pub fn scroll_position(&self) -> (f64, f64) {
        self.scroll
    }

    /// The entries `form` would submit: named, enabled controls beneath it in tree order.
    pub fn field_set(&self, form: NodeId) -> FieldSet {
        let mut set = FieldSet::new();
        for id in self.elements_inclusive(form) {
            if id == form || self.attribute(id, "disabled").is_some() {
                continue;
            }
            let Some(name) = self.attribute(id, "name").filter(|n| !n.is_empty()) else {
                continue;
            };
            match self.tag_name(id).unwrap_or_default() {
                INPUT => {
                    if let Some(value) = self.input_value(id) {
                        set.push(name, value);
                    }
                }
                TEXTAREA => set.push(name, self.text_content(id)),
                SELECT => {
                    for value in self.selected_values(id) {
                        set.push(name, value);
                    }
                }
                _ => {}
            }
        }
        set
    }

    /// Submitted value of an INPUT, or `None` when it does not contribute.
    fn input_value(&self, input: NodeId) -> Option<String> {
        let ty = self
            .attribute(input, "type")
            .unwrap_or("text")
            .to_ascii_lowercase();
        if BUTTON_LIKE_INPUTS.contains(&ty.as_str()) {
            return None;
        }
        let value = self.attribute(input, "value");
        if ty == "checkbox" || ty == "radio" {
            self.attribute(input, "checked")?;
            return Some(value.unwrap_or("on").to_string());
        }
        Some(value.unwrap_or_default().to_string())
    }

    /// Values of the selected OPTIONs of a SELECT.
    fn selected_values(&self, select: NodeId) -> Vec<String> {
        let options: Vec<NodeId> = self
            .elements_inclusive(select)
            .into_iter()
            .filter(|id| self.tag_name(*id) == Some(OPTION))
            .collect();
        let mut chosen: Vec<NodeId> = options
            .iter()
            .copied()
            .filter(|id| self.attribute(*id, "selected").is_some())
            .collect();
        if chosen.is_empty() && self.attribute(select, "multiple").is_none() {
            chosen.extend(options.first());
        }
        chosen
            .into_iter()
            .map(|id| match self.attribute(id, "value") {
                Some(v) => v.to_string(),
                None => self.text_content(id),
            })
            .collect()
    }
}
