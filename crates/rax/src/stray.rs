//! Stray clicks: clicks on plain content, broadcast to every `stray` binding.
//!
//! The set of stray bindings is re-read from the document on every qualifying
//! click and never cached, so bindings added or removed between clicks take
//! effect on the next one.

use std::{collections::HashMap, sync::Arc};

use crate::{
    config::Settings,
    dom::{Document, NodeId},
    invoke::GuardedAction,
    scan::{binding_attributes, binding_elements, has_binding},
    spec::BindingSpec,
};

/// Whether a click on `target` is stray: not a form control and not itself bound.
pub fn is_stray_target(doc: &Document, target: NodeId, settings: &Settings) -> bool {
    let Some(tag) = doc.tag_name(target) else {
        return false;
    };
    !settings.is_stray_exempt(tag) && !has_binding(doc, target, settings)
}

/// Current stray bindings of the connected document, in document order.
pub fn stray_specs(doc: &Document, settings: &Settings) -> Vec<BindingSpec> {
    let mut specs = Vec::new();
    for element in binding_elements(doc, doc.body(), settings) {
        for (name, value) in binding_attributes(doc, element, settings) {
            if let Ok(spec) = BindingSpec::parse(element, &name, &value)
                && spec.kind() == settings.stray_kind
            {
                specs.push(spec);
            }
        }
    }
    specs
}

/// One reentrancy lock per declaring (element, attribute), kept across clicks.
#[derive(Debug, Default)]
pub(crate) struct StrayActions {
    /// Actions keyed by declaring element and attribute name.
    actions: HashMap<(NodeId, String), Arc<GuardedAction>>,
}

impl StrayActions {
    /// The action for `spec`, rebuilt when its expression changed since the last click.
    pub(crate) fn resolve(&mut self, spec: &BindingSpec, kind: &str) -> Arc<GuardedAction> {
        let key = (spec.element(), spec.attribute().to_string());
        match self.actions.get(&key) {
            Some(action) if action.expression() == spec.expression() => action.clone(),
            _ => {
                let action = Arc::new(GuardedAction::new(kind, spec.expression()));
                self.actions.insert(key, action.clone());
                action
            }
        }
    }

    /// Drop the actions declared by `nodes`.
    pub(crate) fn forget(&mut self, nodes: &[NodeId]) {
        self.actions.retain(|(node, _), _| !nodes.contains(node));
    }

    /// Drop the action declared by one attribute of `node`.
    pub(crate) fn forget_attribute(&mut self, node: NodeId, attribute: &str) {
        self.actions.retain(|(n, a), _| !(*n == node && a == attribute));
    }

    /// Number of live actions.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.actions.len()
    }
}
