//! Building call texts and forwarding them across the bridge.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    allow_list::{Field, fields_for},
    bridge::{Bridge, Evaluation},
    config::Settings,
    dom::FieldSet,
    escape::escape,
    guard::ReentrancyGuard,
    interaction::Interaction,
    payload,
    transcript::{Source, Transcript},
};

/// Build the call text passing the escaped payload as a string literal.
///
/// A single parenthesized form gets the payload appended as its last argument,
/// so `(notify-clicked)` becomes `(notify-clicked "<payload>")` and
/// `(log 'click)` becomes `(log 'click "<payload>")`. Any other expression is
/// applied to it: `save-form` becomes `(save-form "<payload>")`.
pub fn build_call(expression: &str, payload: &str) -> String {
    let arg = format!("\"{}\"", escape(payload));
    match open_form(expression) {
        Some((inner, false)) => format!("({} {})", inner, arg),
        Some((inner, true)) => format!("({}\n {})", inner, arg),
        None => format!("({} {})", expression, arg),
    }
}

/// Inner text of `expression` when it is exactly one non-empty list form.
///
/// The flag is set when the form contains a line comment, which the
/// appended argument must not follow on the same line.
fn open_form(expression: &str) -> Option<(&str, bool)> {
    let trimmed = expression.trim();
    let body = trimmed.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0usize;
    let mut comment = false;
    let mut in_string = false;
    let mut in_comment = false;
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        if in_string {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            ';' => {
                comment = true;
                in_comment = true;
            }
            '#' if chars.as_str().starts_with('\\') => {
                chars.next();
                chars.next();
            }
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    let inner = body.trim_end();
    (depth == 0 && !in_string && !inner.trim_start().is_empty()).then_some((inner, comment))
}

/// An expression bound to one interaction kind, with its own reentrancy lock.
///
/// The allow-list for the kind is resolved once, when the action is built.
#[derive(Debug)]
pub struct GuardedAction {
    /// Expression template to call.
    expression: String,
    /// Fields serialized from each triggering interaction.
    fields: &'static [Field],
    /// Lock held while this action's call is in flight.
    guard: ReentrancyGuard,
}

impl GuardedAction {
    /// Build an action for `expression` triggered by interactions of `kind`.
    pub fn new(kind: &str, expression: &str) -> Self {
        Self {
            expression: expression.to_string(),
            fields: fields_for(kind),
            guard: ReentrancyGuard::new(),
        }
    }

    /// Expression template.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

/// Forwards call texts and records them in the transcript.
#[derive(Clone)]
pub struct ActionInvoker {
    /// Evaluation boundary.
    bridge: Bridge,
    /// Where calls and results are recorded.
    transcript: Transcript,
    /// Display texts for failures.
    settings: Arc<Settings>,
}

impl ActionInvoker {
    /// Create an invoker over `bridge`.
    pub fn new(bridge: Bridge, transcript: Transcript, settings: Arc<Settings>) -> Self {
        Self {
            bridge,
            transcript,
            settings,
        }
    }

    /// The bridge calls are forwarded to.
    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// The transcript calls are recorded in.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Forward `call` as a local expression.
    pub fn invoke(&self, call: &str) -> Evaluation {
        self.invoke_from(call, Source::Local)
    }

    /// Forward `call`, recording it under `source`. Failures are converted, never raised.
    pub fn invoke_from(&self, call: &str, source: Source) -> Evaluation {
        let id = self.transcript.begin(call, source);
        let outcome = self.bridge.evaluate(call);
        let text = outcome.display_text(&self.settings);
        self.transcript.complete(id, &text, !outcome.is_value());
        outcome
    }

    /// Run `action` for `interaction` unless that action is already in flight.
    ///
    /// The lock is released as soon as the bridge call returns.
    pub fn read_and_execute(
        &self,
        action: &GuardedAction,
        interaction: &Interaction,
    ) -> Option<Evaluation> {
        let Some(token) = action.guard.try_acquire() else {
            trace!(expression = %action.expression, "reentrant_dispatch_ignored");
            return None;
        };
        let payload = payload::from_fields(action.fields, interaction.data());
        let call = build_call(&action.expression, &payload);
        debug!(kind = interaction.kind(), %call, "dispatch_call");
        let outcome = self.invoke(&call);
        token.release();
        Some(outcome)
    }

    /// Forward a form submission. Exclusivity is the caller's responsibility.
    pub fn submit(&self, action: &str, fields: &FieldSet) -> Evaluation {
        let call = build_call(action, &payload::from_field_set(fields));
        debug!(%call, "submit_call");
        self.invoke(&call)
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::{bridge::EvalError, transcript::EntryState};

    /// Invoker whose evaluator records every call.
    fn recording() -> (ActionInvoker, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let bridge = Bridge::new(Arc::new(move |call: &str| -> Result<String, EvalError> {
            sink.lock().push(call.to_string());
            Ok("ok".to_string())
        }));
        let invoker = ActionInvoker::new(bridge, Transcript::new(), Arc::new(Settings::default()));
        (invoker, calls)
    }

    #[test]
    fn call_text_wraps_escaped_payload() {
        assert_eq!(
            build_call("save-form", r#"{"name":["Alice"]}"#),
            r#"(save-form "{\"name\":[\"Alice\"]}")"#
        );
    }

    #[test]
    fn payload_is_appended_to_a_single_form() {
        assert_eq!(build_call("(notify-clicked)", "{}"), r#"(notify-clicked "{}")"#);
        assert_eq!(build_call("(log 'click)", "{}"), r#"(log 'click "{}")"#);
        assert_eq!(
            build_call("(show \")\" #\\( (f x))", "{}"),
            r#"(show ")" #\( (f x) "{}")"#
        );
        assert_eq!(build_call("(f ; tail\n)", "{}"), "(f ; tail\n \"{}\")");
    }

    #[test]
    fn other_expressions_are_applied_to_the_payload() {
        assert_eq!(build_call("(a) (b)", "{}"), r#"((a) (b) "{}")"#);
        assert_eq!(build_call("()", "{}"), r#"(() "{}")"#);
        assert_eq!(build_call("(lambda (e) e", "{}"), r#"((lambda (e) e "{}")"#);
    }

    #[test]
    fn read_and_execute_forwards_allow_listed_payload() {
        let (invoker, calls) = recording();
        let action = GuardedAction::new("click", "(notify-clicked)");
        let out = invoker.read_and_execute(&action, &Interaction::click(10.0, 20.0));
        assert_eq!(out, Some(Evaluation::Value("ok".into())));
        assert_eq!(
            calls.lock().as_slice(),
            [r#"(notify-clicked "{\"altKey\":false,\"button\":0,\"clientX\":10,\"clientY\":20,\"ctrlKey\":false,\"metaKey\":false,\"shiftKey\":false}")"#]
        );
        assert!(!action.guard.is_held());
    }

    #[test]
    fn held_lock_swallows_the_interaction() {
        let (invoker, calls) = recording();
        let action = GuardedAction::new("click", "f");
        let token = action.guard.try_acquire().unwrap();
        assert_eq!(invoker.read_and_execute(&action, &Interaction::click(0.0, 0.0)), None);
        drop(token);
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn failures_are_recorded_not_raised() {
        let bridge = Bridge::new(Arc::new(|_: &str| -> Result<String, EvalError> {
            Err(EvalError::new("unbound variable: f"))
        }));
        let invoker = ActionInvoker::new(bridge, Transcript::new(), Arc::new(Settings::default()));
        let out = invoker.invoke("(f)");
        assert_eq!(out, Evaluation::Failed("unbound variable: f".into()));
        let entry = invoker.transcript().last().unwrap();
        assert_eq!(entry.result.as_deref(), Some("Error: unbound variable: f"));
        assert_eq!(entry.state, EntryState::Failed);
    }

    #[test]
    fn submit_serializes_the_field_set() {
        let (invoker, calls) = recording();
        let fields: FieldSet = [("name", "Alice"), ("tag", "x"), ("tag", "y")]
            .into_iter()
            .collect();
        invoker.submit("save-form", &fields);
        assert_eq!(
            calls.lock().as_slice(),
            [r#"(save-form "{\"name\":[\"Alice\"],\"tag\":[\"x\",\"y\"]}")"#]
        );
    }
}
