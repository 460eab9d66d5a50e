//! The textual evaluation boundary.
//!
//! An [`Evaluator`] takes one fully-built call text and returns a result or
//! fails. [`Bridge`] wraps an optional evaluator (it may be attached after the
//! page is built) and turns every outcome into an [`Evaluation`]; nothing an
//! evaluator does propagates past it.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;

/// Failure raised by an evaluator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct EvalError {
    /// Human-readable reason.
    pub message: String,
}

impl EvalError {
    /// Build an error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Host side of the boundary.
pub trait Evaluator: Send + Sync {
    /// Evaluate `call` and return its textual result.
    fn eval(&self, call: &str) -> Result<String, EvalError>;
}

impl<F> Evaluator for F
where
    F: Fn(&str) -> Result<String, EvalError> + Send + Sync,
{
    fn eval(&self, call: &str) -> Result<String, EvalError> {
        self(call)
    }
}

/// Outcome of one call across the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The evaluator returned a result.
    Value(String),
    /// The evaluator raised.
    Failed(String),
    /// No evaluator is attached.
    Unavailable,
}

impl Evaluation {
    /// Text shown for this outcome.
    pub fn display_text(&self, settings: &Settings) -> String {
        match self {
            Self::Value(v) => v.clone(),
            Self::Failed(msg) => format!("{}{}", settings.error_prefix, msg),
            Self::Unavailable => settings.unavailable_message.clone(),
        }
    }

    /// True when the evaluator produced a value.
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

/// Shared, late-bindable handle on the evaluator.
#[derive(Clone, Default)]
pub struct Bridge {
    /// Attached evaluator, if the host has initialised one.
    evaluator: Arc<RwLock<Option<Arc<dyn Evaluator>>>>,
}

impl Bridge {
    /// A bridge with nothing attached yet.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// A bridge forwarding to `evaluator`.
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        let bridge = Self::default();
        bridge.attach(evaluator);
        bridge
    }

    /// Attach (or replace) the evaluator.
    pub fn attach(&self, evaluator: Arc<dyn Evaluator>) {
        *self.evaluator.write() = Some(evaluator);
    }

    /// Whether an evaluator is attached.
    pub fn is_available(&self) -> bool {
        self.evaluator.read().is_some()
    }

    /// Forward `call`. The evaluator runs without any bridge lock held, so it may
    /// re-enter the page.
    pub fn evaluate(&self, call: &str) -> Evaluation {
        let Some(evaluator) = self.evaluator.read().clone() else {
            debug!(call, "bridge_unavailable");
            return Evaluation::Unavailable;
        };
        match evaluator.eval(call) {
            Ok(value) => Evaluation::Value(value),
            Err(err) => {
                warn!(call, error = %err, "evaluation_failed");
                Evaluation::Failed(err.message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_evaluator_is_unavailable() {
        let bridge = Bridge::unavailable();
        let out = bridge.evaluate("(+ 1 2)");
        assert_eq!(out, Evaluation::Unavailable);
        assert_eq!(
            out.display_text(&Settings::default()),
            "Scheme bridge not available."
        );
    }

    #[test]
    fn failures_become_prefixed_text() {
        let bridge = Bridge::new(Arc::new(|_: &str| -> Result<String, EvalError> {
            Err(EvalError::new("division by zero"))
        }));
        let out = bridge.evaluate("(/ 1 0)");
        assert_eq!(out, Evaluation::Failed("division by zero".into()));
        assert_eq!(
            out.display_text(&Settings::default()),
            "Error: division by zero"
        );
    }

    #[test]
    fn attach_late() {
        let bridge = Bridge::unavailable();
        assert!(!bridge.is_available());
        bridge.attach(Arc::new(|call: &str| -> Result<String, EvalError> {
            Ok(call.len().to_string())
        }));
        assert_eq!(bridge.evaluate("(x)"), Evaluation::Value("3".into()));
    }
}
