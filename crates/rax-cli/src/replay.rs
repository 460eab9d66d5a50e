//! Replaying a fixture against a page and rendering what crossed the bridge.

use std::{result, sync::Arc};

use rax::{
    Bridge, EntryState, EvalError, Evaluator, Interaction, Page, Settings, Transcript,
};
use tracing::{debug, info};

use crate::{
    error::Result,
    fixture::{Fixture, Step, lookup},
};

/// Options for one replay.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Leave the bridge without an evaluator.
    pub unavailable: bool,
    /// Forward inline scripts before the steps.
    pub scripts: bool,
}

/// Evaluator that accepts every call and returns nothing.
fn accept_all() -> Arc<dyn Evaluator> {
    Arc::new(|_: &str| -> result::Result<String, EvalError> { Ok(String::new()) })
}

/// Build the page, install it, replay every step and return the rendered log.
pub fn replay(fixture: &Fixture, settings: Settings, opts: &ReplayOptions) -> Result<Vec<String>> {
    let bridge = if opts.unavailable {
        Bridge::unavailable()
    } else {
        Bridge::new(accept_all())
    };
    let page = Page::with_document(settings, bridge, fixture.document()?);
    let report = page.install(page.body());
    info!(wired = report.wired, diagnostics = report.diagnostics.len(), "installed");

    let mut out = Vec::new();
    for d in &report.diagnostics {
        out.push(format!("! {}={:?}: {}", d.attribute, d.value, d.message));
    }
    let transcript = page.transcript();
    let mut seen = 0;
    if opts.scripts {
        out.push("# scripts".to_string());
        page.run_inline_scripts();
        seen = render_new(&transcript, seen, &mut out);
    }
    for step in &fixture.steps {
        out.push(format!("# {}", run_step(&page, step)?));
        seen = render_new(&transcript, seen, &mut out);
    }
    Ok(out)
}

/// Apply one step and describe it.
fn run_step(page: &Page, step: &Step) -> Result<String> {
    debug!(?step, "step");
    let target = |id: &str| page.document(|d| lookup(d, id));
    Ok(match step {
        Step::Click(id) => {
            page.click(target(id)?, 0.0, 0.0);
            format!("click {id}")
        }
        Step::Event { target: id, kind, data } => {
            let ev = page.dispatch(target(id)?, Interaction::new(kind.as_str(), data.clone()));
            format!("{kind} {id}{}", prevented(&ev))
        }
        Step::Submit(id) => {
            let ev = page.submit(target(id)?);
            let suppressed = !ev.propagation_stopped() && ev.default_prevented();
            format!(
                "submit {id}{}{}",
                prevented(&ev),
                if suppressed { " (suppressed)" } else { "" }
            )
        }
        Step::Complete(id) => {
            let done = page.complete_submission(target(id)?);
            format!("complete {id}{}", if done { "" } else { " (not executing)" })
        }
        Step::Insert { parent, node } => {
            let p = target(parent)?;
            let child = page.edit(|d| node.build(d))?;
            let report = page.insert(p, child)?;
            format!("insert into {parent} (wired {})", report.wired)
        }
        Step::Remove(id) => {
            page.remove(target(id)?)?;
            format!("remove {id}")
        }
        Step::Evaluate(expr) => {
            page.evaluate(expr);
            "evaluate".to_string()
        }
    })
}

/// Suffix noting a suppressed default.
fn prevented(ev: &Interaction) -> &'static str {
    if ev.default_prevented() {
        " (default prevented)"
    } else {
        ""
    }
}

/// Render transcript entries after the first `seen`; returns the new count.
fn render_new(transcript: &Transcript, seen: usize, out: &mut Vec<String>) -> usize {
    let entries = transcript.entries();
    for entry in entries.iter().skip(seen) {
        out.push(format!("> {}", entry.expression));
        match (entry.state, entry.result.as_deref()) {
            (EntryState::Failed, Some(r)) => out.push(format!("! {r}")),
            (_, Some(r)) if !r.is_empty() => out.push(format!("= {r}")),
            _ => {}
        }
    }
    entries.len()
}
