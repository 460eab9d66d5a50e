use std::{io, result::Result as StdResult};

use thiserror::Error;

use crate::dom::NodeId;

/// Convenient result type for the rax crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for binding installation and the host document.
#[derive(Debug, Error)]
pub enum Error {
    /// A binding value has no whitespace separating the interaction kind from the expression.
    #[error("Binding spec '{spec}' has no whitespace after its interaction kind")]
    MissingSeparator {
        /// The offending attribute value.
        spec: String,
    },

    /// A binding value starts with whitespace, so no interaction kind precedes it.
    #[error("Binding spec '{spec}' does not start with an interaction kind")]
    EmptyKind {
        /// The offending attribute value.
        spec: String,
    },

    /// A binding value names a kind but nothing to evaluate.
    #[error("Binding spec '{spec}' has an empty expression")]
    EmptyExpression {
        /// The offending attribute value.
        spec: String,
    },

    /// The node id does not belong to this document.
    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    /// The node exists but is a text node.
    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// Appending would make a node its own ancestor.
    #[error("Cannot append {child:?} under {parent:?}: would create a cycle")]
    Cycle {
        /// Intended parent.
        parent: NodeId,
        /// Node being appended.
        child: NodeId,
    },

    /// Settings text could not be parsed.
    #[error("Settings error: {0}")]
    Settings(String),

    /// I/O failure while reading settings.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// True for the errors produced by binding spec parsing.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            Self::MissingSeparator { .. } | Self::EmptyKind { .. } | Self::EmptyExpression { .. }
        )
    }
}
