use std::sync::Arc;

use parking_lot::Mutex;
use rax::{Bridge, EntryState, EvalError, Interaction, NodeId, Page, Settings, Status};

/// Shared log of every call text that reached the evaluator.
type Calls = Arc<Mutex<Vec<String>>>;

/// Page whose evaluator records calls and answers "ok".
fn recording_page() -> (Page, Calls) {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    let bridge = Bridge::new(Arc::new(move |call: &str| -> Result<String, EvalError> {
        sink.lock().push(call.to_string());
        Ok("ok".to_string())
    }));
    (Page::new(Settings::default(), bridge), calls)
}

/// Append an element under BODY.
fn add(page: &Page, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    page.edit(|d| {
        let body = d.body();
        d.append_element(body, tag, attrs)
    })
    .expect("append element")
}

#[test]
fn click_binding_produces_escaped_call_text() {
    let (page, calls) = recording_page();
    let div = add(&page, "div", &[("data-rax", "click (notify-clicked)")]);
    page.install(page.body());

    let out = page.click(div, 10.0, 20.0);
    assert!(!out.default_prevented());
    assert_eq!(
        calls.lock().as_slice(),
        [r#"(notify-clicked "{\"altKey\":false,\"button\":0,\"clientX\":10,\"clientY\":20,\"ctrlKey\":false,\"metaKey\":false,\"shiftKey\":false}")"#]
    );
    assert_eq!(page.transcript().status(), Status::Ready);
    assert_eq!(page.transcript().last().unwrap().result.as_deref(), Some("ok"));
}

#[test]
fn form_submission_gathers_repeated_fields() {
    let (page, calls) = recording_page();
    let form = add(
        &page,
        "form",
        &[("action", "save-form"), ("data-rax", "submit (reserved)")],
    );
    page.edit(|d| {
        d.append_element(form, "input", &[("name", "name"), ("value", "Alice")])?;
        d.append_element(form, "input", &[("name", "tag"), ("value", "x")])?;
        d.append_element(form, "input", &[("name", "tag"), ("value", "y")])
    })
    .unwrap();
    page.install(page.body());

    let out = page.submit(form);
    assert!(out.default_prevented());
    assert!(out.propagation_stopped());
    assert_eq!(
        calls.lock().as_slice(),
        [r#"(save-form "{\"name\":[\"Alice\"],\"tag\":[\"x\",\"y\"]}")"#]
    );
    assert!(page.document(|d| d.has_class(form, "rax-executing")));
    assert_eq!(page.exclusivity().executing(), Some(form));
}

#[test]
fn submit_without_action_falls_back_to_expression() {
    let (page, calls) = recording_page();
    let form = add(&page, "form", &[("data-rax", "submit save-it")]);
    page.install(page.body());
    page.submit(form);
    assert_eq!(calls.lock().as_slice(), [r#"(save-it "{}")"#]);
}

#[test]
fn binding_cannot_reenter_itself() {
    let (page, calls) = recording_page();
    let div = add(&page, "div", &[("data-rax", "click (again)")]);
    page.install(page.body());

    let inner = page.clone();
    let sink = calls.clone();
    page.attach_evaluator(Arc::new(move |call: &str| -> Result<String, EvalError> {
        sink.lock().push(call.to_string());
        inner.click(div, 1.0, 1.0);
        Ok(String::new())
    }));

    page.click(div, 5.0, 5.0);
    assert_eq!(calls.lock().len(), 1);
    // Lock released after the call returned, so the next click goes through.
    page.click(div, 5.0, 5.0);
    assert_eq!(calls.lock().len(), 2);
}

#[test]
fn second_submit_is_suppressed_while_first_executes() {
    let (page, calls) = recording_page();
    let f1 = add(&page, "form", &[("action", "first"), ("data-rax", "submit x")]);
    let f2 = add(&page, "form", &[("action", "second"), ("data-rax", "submit x")]);
    page.install(page.body());

    assert!(page.submit(f1).default_prevented());
    let second = page.submit(f2);
    assert!(second.default_prevented());
    assert!(!second.propagation_stopped());
    assert_eq!(calls.lock().as_slice(), [r#"(first "{}")"#]);
    assert!(!page.document(|d| d.has_class(f2, "rax-executing")));

    assert!(page.complete_submission(f1));
    assert!(!page.document(|d| d.has_class(f1, "rax-executing")));
    page.submit(f2);
    assert_eq!(calls.lock().len(), 2);
    assert!(!page.complete_submission(f1));
}

#[test]
fn submit_during_submit_evaluation_is_suppressed() {
    let (page, calls) = recording_page();
    let f1 = add(&page, "form", &[("action", "first"), ("data-rax", "submit x")]);
    let f2 = add(&page, "form", &[("action", "second"), ("data-rax", "submit x")]);
    page.install(page.body());

    let inner = page.clone();
    let sink = calls.clone();
    page.attach_evaluator(Arc::new(move |call: &str| -> Result<String, EvalError> {
        sink.lock().push(call.to_string());
        assert!(inner.submit(f2).default_prevented());
        Ok(String::new())
    }));
    page.submit(f1);
    assert_eq!(calls.lock().as_slice(), [r#"(first "{}")"#]);
}

#[test]
fn reset_and_removal_clear_exclusivity() {
    let (page, _calls) = recording_page();
    let form = add(&page, "form", &[("action", "a"), ("data-rax", "submit x")]);
    page.install(page.body());

    page.submit(form);
    assert!(page.exclusivity().is_executing());
    page.dispatch(form, Interaction::reset());
    assert!(!page.exclusivity().is_executing());

    page.submit(form);
    assert!(page.exclusivity().is_executing());
    page.remove(form).unwrap();
    assert!(!page.exclusivity().is_executing());
    assert!(page.bindings(form).is_empty());
}

#[test]
fn stray_clicks_broadcast_in_document_order() {
    let (page, calls) = recording_page();
    let outer = add(&page, "section", &[("data-rax", "stray (first)")]);
    page.edit(|d| d.append_element(outer, "p", &[("data-rax", "stray (second)")]))
        .unwrap();
    let plain = add(&page, "div", &[]);
    let button = add(&page, "button", &[]);
    page.install(page.body());
    assert!(page.stray_handler_installed());

    page.edit(|d| d.scroll_to(0.0, 480.0));
    page.click(plain, 3.0, 4.0);
    let seen: Vec<String> = calls.lock().drain(..).collect();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].starts_with("(first \""));
    assert!(seen[1].starts_with("(second \""));
    assert_eq!(page.document(|d| d.scroll_position()), (0.0, 0.0));

    page.click(button, 3.0, 4.0);
    assert!(calls.lock().is_empty());

    // Clicking an element that declares a binding is never stray.
    page.click(outer, 3.0, 4.0);
    assert!(calls.lock().is_empty());
}

#[test]
fn clicks_on_text_are_delivered_to_the_enclosing_element() {
    let (page, calls) = recording_page();
    add(&page, "div", &[("data-rax", "stray (close)")]);
    let para = add(&page, "p", &[]);
    let words = page.edit(|d| d.append_text(para, "plain words")).unwrap();
    let label = add(&page, "span", &[("data-rax", "click (pick)")]);
    let caption = page.edit(|d| d.append_text(label, "caption")).unwrap();
    page.install(page.body());

    let out = page.click(words, 0.0, 0.0);
    assert_eq!(out.target(), Some(para));
    assert_eq!(calls.lock().len(), 1);
    assert!(calls.lock()[0].starts_with("(close \""));

    page.click(caption, 0.0, 0.0);
    assert_eq!(calls.lock().len(), 2);
    assert!(calls.lock()[1].starts_with("(pick \""));
}

#[test]
fn stray_set_is_reread_on_every_click() {
    let (page, calls) = recording_page();
    add(&page, "div", &[("data-rax", "stray (one)")]);
    let plain = add(&page, "div", &[]);
    page.install(page.body());

    page.click(plain, 0.0, 0.0);
    assert_eq!(calls.lock().len(), 1);

    // Added without reinstalling: still picked up, because the set is not cached.
    add(&page, "div", &[("data-rax", "stray (two)")]);
    page.click(plain, 0.0, 0.0);
    assert_eq!(calls.lock().len(), 3);
    assert!(calls.lock()[2].starts_with("(two \""));
}

#[test]
fn stray_action_cannot_recurse() {
    let (page, calls) = recording_page();
    add(&page, "div", &[("data-rax", "stray (a)")]);
    add(&page, "div", &[("data-rax", "stray (b)")]);
    let plain = add(&page, "div", &[]);
    page.install(page.body());

    let inner = page.clone();
    let sink = calls.clone();
    page.attach_evaluator(Arc::new(move |call: &str| -> Result<String, EvalError> {
        sink.lock().push(call.to_string());
        inner.click(plain, 0.0, 0.0);
        Ok(String::new())
    }));
    page.click(plain, 0.0, 0.0);
    // Nested broadcasts only reach actions that are not currently in flight:
    // (a) nests (b); then the outer (b) nests (a), released by then.
    let seen: Vec<String> = calls.lock().clone();
    let heads: Vec<&str> = seen.iter().map(|c| &c[..4]).collect();
    assert_eq!(heads, vec!["(a \"", "(b \"", "(b \"", "(a \""]);
}

#[test]
fn multiple_bindings_fire_in_attribute_name_order() {
    let (page, calls) = recording_page();
    let el = add(
        &page,
        "div",
        &[("data-rax-b", "click (second)"), ("data-rax-a", "click (first)")],
    );
    page.install(page.body());

    let attrs: Vec<String> = page
        .bindings(el)
        .iter()
        .map(|b| b.attribute().to_string())
        .collect();
    assert_eq!(attrs, vec!["data-rax-a", "data-rax-b"]);

    page.click(el, 0.0, 0.0);
    let seen = calls.lock().clone();
    assert!(seen[0].starts_with("(first \""));
    assert!(seen[1].starts_with("(second \""));
}

#[test]
fn clicks_bubble_to_bound_ancestors() {
    let (page, calls) = recording_page();
    let list = add(&page, "ul", &[("data-rax", "click (pick)")]);
    let item = page
        .edit(|d| d.append_element(list, "li", &[]))
        .unwrap();
    page.install(page.body());
    let out = page.click(item, 1.0, 2.0);
    assert_eq!(out.target(), Some(item));
    assert_eq!(calls.lock().len(), 1);
}

#[test]
fn keyboard_payload_uses_keyboard_fields() {
    let (page, calls) = recording_page();
    let input = add(&page, "input", &[("data-rax", "keydown (on-key)")]);
    page.install(page.body());
    page.dispatch(input, Interaction::key("keydown", "Enter", "Enter", 13));
    assert_eq!(
        calls.lock().as_slice(),
        [r#"(on-key "{\"altKey\":false,\"code\":\"Enter\",\"ctrlKey\":false,\"key\":\"Enter\",\"keyCode\":13,\"metaKey\":false,\"repeat\":false,\"shiftKey\":false}")"#]
    );
    // A click on the same element has no listener.
    page.click(input, 0.0, 0.0);
    assert_eq!(calls.lock().len(), 1);
}

#[test]
fn reinstall_does_not_duplicate_listeners() {
    let (page, calls) = recording_page();
    let div = add(&page, "div", &[("data-rax", "click (once)")]);
    page.install(page.body());
    let again = page.install(page.body());
    assert_eq!((again.wired, again.kept), (0, 1));
    page.install(div);
    page.click(div, 0.0, 0.0);
    assert_eq!(calls.lock().len(), 1);
}

#[test]
fn inserted_subtree_is_wired_without_touching_others() {
    let (page, calls) = recording_page();
    let existing = add(&page, "div", &[("data-rax", "click (old)")]);
    page.install(page.body());

    let fragment = page.edit(|d| {
        let wrap = d.create_element("div");
        d.append_element(wrap, "span", &[("data-rax", "click (new)")])
            .map(|span| (wrap, span))
    });
    let (wrap, span) = fragment.unwrap();
    let report = page.insert(page.body(), wrap).unwrap();
    assert_eq!((report.wired, report.kept), (1, 0));
    assert_eq!(page.bindings(existing).len(), 1);

    page.click(span, 0.0, 0.0);
    page.click(existing, 0.0, 0.0);
    let seen = calls.lock().clone();
    assert!(seen[0].starts_with("(new \""));
    assert!(seen[1].starts_with("(old \""));
}

#[test]
fn malformed_bindings_are_diagnosed_not_fatal() {
    let (page, calls) = recording_page();
    let el = add(
        &page,
        "div",
        &[("data-rax", "click"), ("data-rax-ok", "click (fine)")],
    );
    let report = page.install(page.body());
    assert_eq!(report.wired, 1);
    let diags = page.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].element, el);
    assert_eq!(diags[0].value, "click");
    page.click(el, 0.0, 0.0);
    assert_eq!(calls.lock().len(), 1);

    let again = page.install(page.body());
    assert!(again.diagnostics.is_empty());
    assert_eq!(page.diagnostics(), diags);

    page.edit(|d| d.remove_attribute(el, "data-rax")).unwrap();
    page.install(page.body());
    assert!(page.diagnostics().is_empty());
}

#[test]
fn unavailable_bridge_and_failures_are_displayed() {
    let page = Page::new(Settings::default(), Bridge::unavailable());
    let div = add(&page, "div", &[("data-rax", "click (f)")]);
    page.install(page.body());
    page.click(div, 0.0, 0.0);
    let entry = page.transcript().last().unwrap();
    assert_eq!(entry.result.as_deref(), Some("Scheme bridge not available."));
    assert_eq!(entry.state, EntryState::Failed);

    page.attach_evaluator(Arc::new(|_: &str| -> Result<String, EvalError> {
        Err(EvalError::new("boom"))
    }));
    page.click(div, 0.0, 0.0);
    let entry = page.transcript().last().unwrap();
    assert_eq!(entry.result.as_deref(), Some("Error: boom"));
}

#[test]
fn inline_scripts_run_in_document_order() {
    let (page, calls) = recording_page();
    page.edit(|d| -> rax::Result<()> {
        let body = d.body();
        let a = d.append_element(body, "script", &[("type", "application/x-scheme")])?;
        d.append_text(a, "(define x 1)")?;
        let js = d.append_element(body, "script", &[("type", "text/javascript")])?;
        d.append_text(js, "ignored()")?;
        let b = d.append_element(body, "script", &[("type", "application/x-scheme")])?;
        d.append_text(b, "(+ x 1)")?;
        Ok(())
    })
    .unwrap();
    let results = page.run_inline_scripts();
    assert_eq!(results.len(), 2);
    assert_eq!(calls.lock().as_slice(), ["(define x 1)", "(+ x 1)"]);
}
