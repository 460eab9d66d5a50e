//! Wiring discovered bindings to listeners.
//!
//! Installing is incremental, in the manner of a rebind: for each bound
//! element the desired `(attribute, value)` pairs are diffed against what is
//! already wired. Unchanged bindings keep their listener (and its lock),
//! changed or new ones are wired, vanished ones are dropped. Installing the
//! same subtree twice therefore never duplicates a listener.

use std::{collections::HashMap, sync::Arc};

use tracing::{debug, trace, warn};

use crate::{
    config::Settings,
    dom::{Document, NodeId},
    invoke::GuardedAction,
    scan::{binding_attributes, binding_elements},
    spec::BindingSpec,
    stray::StrayActions,
};

/// DOM interaction name submit bindings listen for.
pub(crate) const SUBMIT_EVENT: &str = "submit";

/// A binding attribute that could not be wired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Element carrying the attribute.
    pub element: NodeId,
    /// Attribute name.
    pub attribute: String,
    /// Attribute value as found.
    pub value: String,
    /// Why it was rejected.
    pub message: String,
}

/// Summary of one install pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Bindings wired by this pass.
    pub wired: usize,
    /// Bindings already wired and left untouched.
    pub kept: usize,
    /// Previously wired bindings removed because their attribute changed or vanished.
    pub dropped: usize,
    /// Attributes that failed to parse and were not already diagnosed.
    pub diagnostics: Vec<Diagnostic>,
}

/// How an installed binding reacts.
#[derive(Debug, Clone)]
pub(crate) enum Wiring {
    /// Listener running a reentrancy-guarded call.
    Listener(Arc<GuardedAction>),
    /// Listener running the exclusivity-guarded submit flow.
    Submit,
    /// No element listener; served by the page-level stray handler.
    Stray,
}

/// A wired binding.
#[derive(Debug, Clone)]
pub(crate) struct InstalledBinding {
    /// Parsed binding.
    spec: BindingSpec,
    /// Attribute value it was parsed from.
    value: String,
    /// What fires.
    wiring: Wiring,
}

/// What a listener does for one interaction, detached from the registry lock.
#[derive(Debug, Clone)]
pub(crate) enum Fire {
    /// Guarded call with the interaction payload.
    Read(Arc<GuardedAction>),
    /// Submit flow; carries the parsed expression as fallback action.
    Submit(String),
}

/// All listeners installed on a page.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    /// Bindings per element, in wiring order.
    bindings: HashMap<NodeId, Vec<InstalledBinding>>,
    /// Whether the page-level stray click handler exists.
    stray_handler: bool,
    /// Current parse failures per element, in attribute order.
    diagnostics: HashMap<NodeId, Vec<Diagnostic>>,
    /// Locks for stray expressions.
    pub(crate) stray_actions: StrayActions,
}

impl Registry {
    /// Scan `root` and wire every binding found.
    pub(crate) fn install(
        &mut self,
        doc: &Document,
        root: NodeId,
        settings: &Settings,
    ) -> InstallReport {
        let mut report = InstallReport::default();
        let elements = binding_elements(doc, root, settings);

        // Elements under root that lost all their binding attributes, and
        // elements detached from the document.
        let is_stale =
            |n: NodeId| (doc.contains(root, n) || !doc.is_connected(n)) && !elements.contains(&n);
        let stale: Vec<NodeId> = self
            .bindings
            .keys()
            .chain(self.diagnostics.keys())
            .copied()
            .filter(|n| is_stale(*n))
            .collect();
        report.dropped += self.forget(&stale);

        for element in elements {
            let existing = self.bindings.remove(&element).unwrap_or_default();
            let previous = self.diagnostics.remove(&element).unwrap_or_default();
            let (wired, diagnostics) =
                self.wire_element(doc, element, existing, &previous, settings, &mut report);
            if !wired.is_empty() {
                self.bindings.insert(element, wired);
            }
            if !diagnostics.is_empty() {
                self.diagnostics.insert(element, diagnostics);
            }
        }
        debug!(
            ?root,
            wired = report.wired,
            kept = report.kept,
            dropped = report.dropped,
            diagnostics = report.diagnostics.len(),
            "install"
        );
        report
    }

    /// Diff one element's binding attributes against `existing` and wire the result.
    ///
    /// Returns the wired bindings and the element's current diagnostics; only
    /// diagnostics absent from `previous` are logged and reported.
    fn wire_element(
        &mut self,
        doc: &Document,
        element: NodeId,
        mut existing: Vec<InstalledBinding>,
        previous: &[Diagnostic],
        settings: &Settings,
        report: &mut InstallReport,
    ) -> (Vec<InstalledBinding>, Vec<Diagnostic>) {
        let mut wired = Vec::new();
        let mut diagnostics = Vec::new();
        for (name, value) in binding_attributes(doc, element, settings) {
            if let Some(pos) = existing
                .iter()
                .position(|b| b.spec.attribute() == name && b.value == value)
            {
                wired.push(existing.remove(pos));
                report.kept += 1;
                continue;
            }
            let spec = match BindingSpec::parse(element, &name, &value) {
                Ok(spec) => spec,
                Err(err) => {
                    let diagnostic = Diagnostic {
                        element,
                        attribute: name,
                        value,
                        message: err.to_string(),
                    };
                    if !previous.contains(&diagnostic) {
                        warn!(
                            ?element,
                            attribute = %diagnostic.attribute,
                            value = %diagnostic.value,
                            error = %err,
                            "binding_not_wired"
                        );
                        report.diagnostics.push(diagnostic.clone());
                    }
                    diagnostics.push(diagnostic);
                    continue;
                }
            };
            let wiring = self.wiring_for(&spec, settings);
            trace!(?element, binding = %spec, "binding_wired");
            wired.push(InstalledBinding {
                spec,
                value,
                wiring,
            });
            report.wired += 1;
        }
        report.dropped += existing.len();
        for gone in existing {
            if matches!(gone.wiring, Wiring::Stray) {
                self.stray_actions.forget_attribute(element, gone.spec.attribute());
            }
        }
        (wired, diagnostics)
    }

    /// Choose the wiring strategy for a parsed binding.
    fn wiring_for(&mut self, spec: &BindingSpec, settings: &Settings) -> Wiring {
        if spec.kind() == settings.submit_kind {
            Wiring::Submit
        } else if spec.kind() == settings.stray_kind {
            if !self.stray_handler {
                debug!("stray_handler_installed");
                self.stray_handler = true;
            }
            Wiring::Stray
        } else {
            Wiring::Listener(Arc::new(GuardedAction::new(spec.kind(), spec.expression())))
        }
    }

    /// Listeners on `node` for interactions of `kind`, in wiring order.
    pub(crate) fn listeners(&self, node: NodeId, kind: &str) -> Vec<Fire> {
        let Some(bindings) = self.bindings.get(&node) else {
            return Vec::new();
        };
        bindings
            .iter()
            .filter_map(|b| match &b.wiring {
                Wiring::Listener(action) if b.spec.kind() == kind => {
                    Some(Fire::Read(action.clone()))
                }
                Wiring::Submit if kind == SUBMIT_EVENT => {
                    Some(Fire::Submit(b.spec.expression().to_string()))
                }
                _ => None,
            })
            .collect()
    }

    /// Whether the page-level stray handler is installed.
    pub(crate) fn stray_handler(&self) -> bool {
        self.stray_handler
    }

    /// Parsed bindings wired on `node`, in wiring order.
    pub(crate) fn bindings(&self, node: NodeId) -> Vec<BindingSpec> {
        self.bindings
            .get(&node)
            .map(|b| b.iter().map(|ib| ib.spec.clone()).collect())
            .unwrap_or_default()
    }

    /// Current diagnostics, in element creation then attribute order.
    pub(crate) fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut elements: Vec<&NodeId> = self.diagnostics.keys().collect();
        elements.sort();
        elements
            .into_iter()
            .flat_map(|n| self.diagnostics[n].iter().cloned())
            .collect()
    }

    /// Discard everything wired or diagnosed on `nodes`.
    pub(crate) fn forget(&mut self, nodes: &[NodeId]) -> usize {
        let mut dropped = 0;
        for node in nodes {
            if let Some(old) = self.bindings.remove(node) {
                dropped += old.len();
            }
            self.diagnostics.remove(node);
        }
        self.stray_actions.forget(nodes);
        dropped
    }
}
