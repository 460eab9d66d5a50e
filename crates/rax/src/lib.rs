//! rax: declarative interaction bindings dispatched across a textual evaluation bridge.
//!
//! Elements declare what should happen on an interaction with attributes of the form
//! `data-rax="<kind> <expression>"` (or `data-rax-<name>` for several bindings on one
//! element). Installing a subtree wires each binding:
//! - generic kinds call `(<expression> "<escaped JSON payload>")` with the allow-listed
//!   fields of the interaction, guarded against re-entering themselves
//! - `submit` bindings serialize the form's fields and call the form's `action`, with at
//!   most one submission in flight per page
//! - `stray` bindings run for clicks that land on plain, unbound content
//!
//! The main entry point is [`Page`]. The evaluator behind the bridge is supplied by the
//! host through the [`Evaluator`] trait.

pub mod allow_list;
pub mod bridge;
pub mod config;
pub mod dom;
mod error;
pub mod escape;
mod guard;
mod install;
pub mod interaction;
mod invoke;
mod page;
pub mod payload;
pub mod scan;
pub mod spec;
pub mod stray;
pub mod transcript;

pub use bridge::{Bridge, EvalError, Evaluation, Evaluator};
pub use config::Settings;
pub use dom::{Document, FieldSet, NodeId};
pub use error::{Error, Result};
pub use guard::{ExclusivityState, ReentrancyGuard, ReentrancyToken};
pub use install::{Diagnostic, InstallReport};
pub use interaction::{EventData, Interaction};
pub use invoke::{ActionInvoker, GuardedAction, build_call};
pub use page::Page;
pub use spec::{BindingSpec, parse_spec};
pub use transcript::{Entry, EntryState, Source, Status, Transcript};
