//! Page fixtures: a document tree plus a script of interactions to replay.
//!
//! ```ron
//! (
//!     body: [
//!         (tag: "div", attrs: [("id", "hello"), ("data-rax", "click (notify-clicked)")]),
//!     ],
//!     steps: [Click("hello")],
//! )
//! ```

use std::{fs, path::Path};

use rax::{Document, EventData, NodeId};
use ron::{Options, extensions::Extensions};
use serde::Deserialize;

use crate::error::{Error, Result};

/// One element and its subtree.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    /// Tag name.
    pub tag: String,
    /// Attributes in declaration order.
    #[serde(default)]
    pub attrs: Vec<(String, String)>,
    /// Text appended before the children.
    #[serde(default)]
    pub text: Option<String>,
    /// Child elements.
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Create this subtree detached from the document.
    pub fn build(&self, doc: &mut Document) -> Result<NodeId> {
        let node = doc.create_element(&self.tag);
        for (name, value) in &self.attrs {
            doc.set_attribute(node, name, value)?;
        }
        if let Some(text) = &self.text {
            doc.append_text(node, text)?;
        }
        for child in &self.children {
            let c = child.build(doc)?;
            doc.append_child(node, c)?;
        }
        Ok(node)
    }
}

/// A step of the replay script. Elements are addressed by their `id` attribute.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub enum Step {
    /// Primary-button click at the origin.
    Click(String),
    /// Arbitrary interaction with explicit data.
    Event {
        /// Target element id.
        target: String,
        /// Interaction kind.
        kind: String,
        /// Interaction data.
        #[serde(default)]
        data: EventData,
    },
    /// Form submission.
    Submit(String),
    /// Host signal that a form's submit action completed.
    Complete(String),
    /// Append a subtree under an element and install it.
    Insert {
        /// Parent element id.
        parent: String,
        /// Subtree to insert.
        node: NodeSpec,
    },
    /// Detach an element.
    Remove(String),
    /// Forward a raw expression.
    Evaluate(String),
}

/// A page and its replay script.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    /// Children of BODY.
    #[serde(default)]
    pub body: Vec<NodeSpec>,
    /// Steps replayed after install.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Fixture {
    /// Parse a fixture from RON text.
    ///
    /// Optional fields may be written bare, e.g. `(key: "a")` for event data.
    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(text)?)
    }

    /// Read and parse a fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_ron(&fs::read_to_string(path)?)
    }

    /// Build the document described by `body`.
    pub fn document(&self) -> Result<Document> {
        let mut doc = Document::new();
        let body = doc.body();
        for spec in &self.body {
            let node = spec.build(&mut doc)?;
            doc.append_child(body, node)?;
        }
        Ok(doc)
    }
}

/// Resolve an element id.
pub fn lookup(doc: &Document, id: &str) -> Result<NodeId> {
    doc.find_by_id(id)
        .ok_or_else(|| Error::UnknownTarget(id.to_string()))
}
