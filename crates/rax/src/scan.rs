//! Discovering binding attributes in a subtree.

use crate::{config::Settings, dom::Document, dom::NodeId};

/// Elements at or beneath `root` that carry at least one binding attribute, in document order.
pub fn binding_elements(doc: &Document, root: NodeId, settings: &Settings) -> Vec<NodeId> {
    doc.elements_inclusive(root)
        .into_iter()
        .filter(|id| has_binding(doc, *id, settings))
        .collect()
}

/// Whether `node` declares any binding attribute.
pub fn has_binding(doc: &Document, node: NodeId, settings: &Settings) -> bool {
    doc.attributes(node)
        .iter()
        .any(|(name, _)| settings.is_binding_attribute(name))
}

/// Binding attributes of `node` as `(name, value)`, sorted by name.
///
/// The order is independent of declaration order, so several bindings on one
/// element always fire in the same sequence.
pub fn binding_attributes(
    doc: &Document,
    node: NodeId,
    settings: &Settings,
) -> Vec<(String, String)> {
    let mut attrs: Vec<(String, String)> = doc
        .attributes(node)
        .iter()
        .filter(|(name, _)| settings.is_binding_attribute(name))
        .cloned()
        .collect();
    attrs.sort_by(|a, b| a.0.cmp(&b.0));
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_root_and_descendants_in_order() {
        let mut doc = Document::new();
        let s = Settings::default();
        let list = doc
            .append_element(doc.body(), "ul", &[("data-rax", "click (a)")])
            .unwrap();
        let plain = doc.append_element(list, "li", &[]).unwrap();
        let item = doc
            .append_element(list, "li", &[("data-rax-x", "click (b)")])
            .unwrap();
        doc.append_element(plain, "span", &[("data-other", "x")]).unwrap();
        assert_eq!(binding_elements(&doc, list, &s), vec![list, item]);
        assert_eq!(binding_elements(&doc, item, &s), vec![item]);
        assert!(binding_elements(&doc, plain, &s).is_empty());
    }

    #[test]
    fn attributes_sort_lexicographically() {
        let mut doc = Document::new();
        let s = Settings::default();
        let el = doc
            .append_element(
                doc.body(),
                "div",
                &[
                    ("data-rax-b", "keyup (b)"),
                    ("id", "x"),
                    ("data-rax", "click (root)"),
                    ("data-rax-a", "click (a)"),
                ],
            )
            .unwrap();
        let names: Vec<String> = binding_attributes(&doc, el, &s)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["data-rax", "data-rax-a", "data-rax-b"]);
    }
}
