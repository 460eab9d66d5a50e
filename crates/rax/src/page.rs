use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{
    Result,
    bridge::{Bridge, Evaluation, Evaluator},
    config::Settings,
    dom::{Document, NodeId},
    guard::ExclusivityState,
    install::{Diagnostic, Fire, InstallReport, Registry},
    interaction::Interaction,
    invoke::{ActionInvoker, GuardedAction},
    spec::BindingSpec,
    stray::{is_stray_target, stray_specs},
    transcript::{Source, Transcript},
};

/// Interaction kind that triggers the stray broadcast.
const STRAY_EVENT: &str = "click";

/// Interaction kind that clears a form's executing mark.
const RESET_EVENT: &str = "reset";

/// A document with installed bindings, dispatching interactions to an evaluator.
///
/// `Page` is a cheap handle: clones share the document, the listeners, the
/// exclusivity flag and the transcript. No internal lock is held while the
/// evaluator runs, so an evaluator may dispatch back into the page; the
/// reentrancy locks turn such nested dispatches of the same binding into no-ops.
#[derive(Clone)]
pub struct Page {
    /// The host document.
    document: Arc<Mutex<Document>>,
    /// Installed listeners.
    registry: Arc<Mutex<Registry>>,
    /// Page-wide submit exclusivity.
    exclusivity: ExclusivityState,
    /// Forwards calls and records them.
    invoker: ActionInvoker,
    /// Names and texts in use.
    settings: Arc<Settings>,
}

impl Page {
    /// Create a page over an empty document.
    pub fn new(settings: Settings, bridge: Bridge) -> Self {
        Self::with_document(settings, bridge, Document::new())
    }

    /// Create a page over an existing document. Nothing is installed yet.
    pub fn with_document(settings: Settings, bridge: Bridge, document: Document) -> Self {
        let settings = Arc::new(settings);
        Self {
            document: Arc::new(Mutex::new(document)),
            registry: Arc::new(Mutex::new(Registry::default())),
            exclusivity: ExclusivityState::new(),
            invoker: ActionInvoker::new(bridge, Transcript::new(), settings.clone()),
            settings,
        }
    }

    /// Settings in use.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Attach the evaluator once the host bridge is ready.
    pub fn attach_evaluator(&self, evaluator: Arc<dyn Evaluator>) {
        self.invoker.bridge().attach(evaluator);
    }

    /// The transcript of calls made by this page.
    pub fn transcript(&self) -> Transcript {
        self.invoker.transcript().clone()
    }

    /// The page-wide exclusivity flag.
    pub fn exclusivity(&self) -> &ExclusivityState {
        &self.exclusivity
    }

    /// The BODY element.
    pub fn body(&self) -> NodeId {
        self.document.lock().body()
    }

    /// Read the document.
    pub fn document<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.document.lock())
    }

    /// Mutate the document. Bindings are not updated until the next [`Self::install`].
    pub fn edit<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.document.lock())
    }

    /// Scan `root` (inclusive) and wire its bindings.
    pub fn install(&self, root: NodeId) -> InstallReport {
        let doc = self.document.lock();
        self.registry.lock().install(&doc, root, &self.settings)
    }

    /// Append `child` under `parent` and install the inserted subtree.
    pub fn insert(&self, parent: NodeId, child: NodeId) -> Result<InstallReport> {
        self.document.lock().append_child(parent, child)?;
        Ok(self.install(child))
    }

    /// Detach `node`, discarding the bindings of its subtree.
    ///
    /// Removing the element whose submit action is executing clears the exclusivity flag.
    pub fn remove(&self, node: NodeId) -> Result<()> {
        let removed = {
            let mut doc = self.document.lock();
            doc.remove(node)?;
            doc.elements_inclusive(node)
        };
        let dropped = self.registry.lock().forget(&removed);
        debug!(?node, dropped, "subtree_removed");
        if let Some(holder) = self.exclusivity.finish_if(|h| removed.contains(&h)) {
            self.clear_executing_mark(holder);
        }
        Ok(())
    }

    /// Bindings wired on `node`, in wiring order.
    pub fn bindings(&self, node: NodeId) -> Vec<BindingSpec> {
        self.registry.lock().bindings(node)
    }

    /// Whether the page-level stray click handler is installed.
    pub fn stray_handler_installed(&self) -> bool {
        self.registry.lock().stray_handler()
    }

    /// Binding attributes that currently fail to parse.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.registry.lock().diagnostics()
    }

    /// Dispatch `interaction` at `target`, bubbling to the root.
    ///
    /// A target that is a text node is retargeted to its parent element.
    /// Returns the interaction as it ended up, so the host can honour
    /// `default_prevented`.
    pub fn dispatch(&self, target: NodeId, mut interaction: Interaction) -> Interaction {
        let (target, path, body) = {
            let doc = self.document.lock();
            let target = doc.event_target(target);
            (target, doc.propagation_path(target), doc.body())
        };
        interaction.set_target(target);
        trace!(kind = interaction.kind(), ?target, "dispatch");
        for node in path {
            let fires = self.registry.lock().listeners(node, interaction.kind());
            for fire in fires {
                match fire {
                    Fire::Read(action) => {
                        self.invoker.read_and_execute(&action, &interaction);
                    }
                    Fire::Submit(fallback) => {
                        self.submit_and_execute(node, &fallback, &mut interaction);
                    }
                }
            }
            if node == body && interaction.kind() == STRAY_EVENT && self.stray_handler_installed() {
                self.broadcast_stray(&interaction);
            }
            if interaction.propagation_stopped() {
                break;
            }
        }
        if interaction.kind() == RESET_EVENT && self.exclusivity.finish(target) {
            self.clear_executing_mark(target);
        }
        interaction
    }

    /// Dispatch a primary-button click at `(x, y)`.
    pub fn click(&self, target: NodeId, x: f64, y: f64) -> Interaction {
        self.dispatch(target, Interaction::click(x, y))
    }

    /// Dispatch a form submission at `form`.
    pub fn submit(&self, form: NodeId) -> Interaction {
        self.dispatch(form, Interaction::submit())
    }

    /// Host signal that the submit action started by `form` has completed.
    pub fn complete_submission(&self, form: NodeId) -> bool {
        if !self.exclusivity.finish(form) {
            return false;
        }
        self.clear_executing_mark(form);
        true
    }

    /// Forward a raw expression, as a button in the host UI would.
    pub fn evaluate(&self, expression: &str) -> Evaluation {
        self.invoker.invoke(expression)
    }

    /// Forward an expression received from a remote peer.
    pub fn evaluate_remote(&self, expression: &str) -> Evaluation {
        self.invoker.invoke_from(expression, Source::Remote)
    }

    /// Forward the text of every inline script of the configured type, in document order.
    pub fn run_inline_scripts(&self) -> Vec<Evaluation> {
        let scripts: Vec<String> = {
            let doc = self.document.lock();
            doc.elements_inclusive(doc.body())
                .into_iter()
                .filter(|id| {
                    doc.tag_name(*id) == Some("SCRIPT")
                        && doc.attribute(*id, "type") == Some(self.settings.script_type.as_str())
                })
                .map(|id| doc.text_content(id))
                .collect()
        };
        debug!(count = scripts.len(), "inline_scripts");
        scripts.iter().map(|s| self.invoker.invoke(s)).collect()
    }

    /// Exclusivity-guarded submission of `form`.
    fn submit_and_execute(&self, form: NodeId, fallback: &str, interaction: &mut Interaction) {
        interaction.prevent_default();
        if !self.exclusivity.try_begin(form) {
            debug!(?form, "submit_suppressed");
            return;
        }
        interaction.stop_propagation();
        let (action, fields) = {
            let mut doc = self.document.lock();
            if let Err(err) = doc.add_class(form, &self.settings.executing_class) {
                warn!(?form, error = %err, "executing_mark_failed");
            }
            let action = match doc.attribute(form, &self.settings.action_attribute) {
                Some(a) if !a.trim().is_empty() => a.to_string(),
                _ => {
                    warn!(?form, fallback, "submit_without_action");
                    fallback.to_string()
                }
            };
            (action, doc.field_set(form))
        };
        self.invoker.submit(&action, &fields);
    }

    /// Run every current stray binding once for a click that landed on plain content.
    fn broadcast_stray(&self, interaction: &Interaction) {
        let Some(target) = interaction.target() else {
            return;
        };
        let specs = {
            let mut doc = self.document.lock();
            if !is_stray_target(&doc, target, &self.settings) {
                return;
            }
            doc.scroll_to(0.0, 0.0);
            stray_specs(&doc, &self.settings)
        };
        let actions: Vec<Arc<GuardedAction>> = {
            let mut registry = self.registry.lock();
            specs
                .iter()
                .map(|spec| registry.stray_actions.resolve(spec, interaction.kind()))
                .collect()
        };
        trace!(?target, count = actions.len(), "stray_broadcast");
        for action in actions {
            self.invoker.read_and_execute(&action, interaction);
        }
    }

    /// Remove the executing marker class from `element`.
    fn clear_executing_mark(&self, element: NodeId) {
        let mut doc = self.document.lock();
        if let Err(err) = doc.remove_class(element, &self.settings.executing_class) {
            warn!(?element, error = %err, "executing_mark_clear_failed");
        }
    }
}
