//! Binding specifications: `"<interaction-kind> <expression-template>"`.

use std::fmt;

use crate::{Error, Result, dom::NodeId};

/// Split a binding value into `(kind, expression)` at its first run of whitespace.
///
/// The expression is everything after that run, interior whitespace included.
pub fn parse_spec(value: &str) -> Result<(&str, &str)> {
    let Some((kind, rest)) = value.split_once(char::is_whitespace) else {
        return Err(Error::MissingSeparator {
            spec: value.to_string(),
        });
    };
    if kind.is_empty() {
        return Err(Error::EmptyKind {
            spec: value.to_string(),
        });
    }
    let expression = rest.trim_start();
    if expression.is_empty() {
        return Err(Error::EmptyExpression {
            spec: value.to_string(),
        });
    }
    Ok((kind, expression))
}

/// One parsed binding attribute of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSpec {
    /// Element declaring the binding.
    element: NodeId,
    /// Attribute name, e.g. `data-rax` or `data-rax-save`.
    attribute: String,
    /// Interaction kind the binding listens for.
    kind: String,
    /// Expression template forwarded to the evaluator.
    expression: String,
}

impl BindingSpec {
    /// Parse attribute `attribute` with `value` on `element`.
    pub fn parse(element: NodeId, attribute: &str, value: &str) -> Result<Self> {
        let (kind, expression) = parse_spec(value)?;
        Ok(Self {
            element,
            attribute: attribute.to_string(),
            kind: kind.to_string(),
            expression: expression.to_string(),
        })
    }

    /// Element declaring the binding.
    pub fn element(&self) -> NodeId {
        self.element
    }

    /// Attribute the binding was read from.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Interaction kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Expression template.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl fmt::Display for BindingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{} {}\"", self.attribute, self.kind, self.expression)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn splits_kind_from_expression() {
        assert_eq!(
            parse_spec("click (notify-clicked)").unwrap(),
            ("click", "(notify-clicked)")
        );
    }

    #[test]
    fn expression_keeps_interior_whitespace() {
        assert_eq!(
            parse_spec("keydown (handle  key\t\"a b\")").unwrap(),
            ("keydown", "(handle  key\t\"a b\")")
        );
    }

    #[test]
    fn separator_run_is_consumed() {
        assert_eq!(parse_spec("input \t (x)").unwrap(), ("input", "(x)"));
    }

    #[test]
    fn multi_line_expressions_are_accepted() {
        assert_eq!(
            parse_spec("click (begin\n  (a)\n  (b))").unwrap(),
            ("click", "(begin\n  (a)\n  (b))")
        );
    }

    #[test]
    fn rejects_values_without_separator() {
        assert!(matches!(
            parse_spec("click"),
            Err(Error::MissingSeparator { .. })
        ));
        assert!(matches!(parse_spec(""), Err(Error::MissingSeparator { .. })));
    }

    #[test]
    fn rejects_missing_kind_or_expression() {
        assert!(matches!(parse_spec(" (x)"), Err(Error::EmptyKind { .. })));
        assert!(matches!(
            parse_spec("click   "),
            Err(Error::EmptyExpression { .. })
        ));
        assert!(parse_spec("click ").unwrap_err().is_parse());
    }

    #[test]
    fn binding_spec_display() {
        let doc = crate::dom::Document::new();
        let spec = BindingSpec::parse(doc.body(), "data-rax", "stray (reset)").unwrap();
        assert_eq!(spec.to_string(), "data-rax=\"stray (reset)\"");
        assert_eq!(spec.kind(), "stray");
        assert_eq!(spec.element(), doc.body());
    }

    proptest! {
        #[test]
        fn kind_and_rest_survive(
            kind in "[a-z]{1,12}",
            sep in "[ \t\n]{1,3}",
            rest in "[(][a-z]{1,5}([ \t]{1,3}[a-z]{1,5}){0,4}[)]",
        ) {
            let value = format!("{kind}{sep}{rest}");
            let (k, e) = parse_spec(&value).unwrap();
            prop_assert_eq!(k, kind.as_str());
            prop_assert_eq!(e, rest.as_str());
        }
    }
}
