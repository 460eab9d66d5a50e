//! Visible record of calls made across the boundary, plus the status line.

use std::sync::Arc;

use parking_lot::Mutex;

/// Identifier of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

/// Where an expression came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Issued by this page (bindings, inline scripts).
    Local,
    /// Received from a remote peer and evaluated on its behalf.
    Remote,
}

/// Lifecycle of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Call issued, no result yet.
    Queued,
    /// Result available.
    Done,
    /// The call failed or the bridge was unavailable.
    Failed,
}

/// One expression and what became of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry id.
    pub id: EntryId,
    /// Expression text as issued.
    pub expression: String,
    /// Origin of the expression.
    pub source: Source,
    /// Current state.
    pub state: EntryState,
    /// Output the evaluator printed while running, if any.
    pub output: Option<String>,
    /// Displayed result once complete.
    pub result: Option<String>,
}

/// Status line shown while calls run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Nothing local in flight.
    Ready,
    /// A local call is in flight; holds its expression.
    Evaluating(String),
}

/// Mutable transcript state.
#[derive(Debug, Default)]
struct Inner {
    /// Entries in issue order.
    entries: Vec<Entry>,
    /// Local entries still queued, innermost last.
    in_flight: Vec<EntryId>,
    /// Next id to hand out.
    next_id: u64,
}

impl Inner {
    /// Find an entry by id.
    fn entry_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}

/// Shared transcript handle; clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    /// Shared state.
    inner: Arc<Mutex<Inner>>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a queued expression and return its id.
    pub fn begin(&self, expression: &str, source: Source) -> EntryId {
        let mut inner = self.inner.lock();
        let id = EntryId(inner.next_id);
        inner.next_id += 1;
        inner.entries.push(Entry {
            id,
            expression: expression.to_string(),
            source,
            state: EntryState::Queued,
            output: None,
            result: None,
        });
        if source == Source::Local {
            inner.in_flight.push(id);
        }
        id
    }

    /// Complete entry `id` with its displayed result; false when it is unknown.
    pub fn complete(&self, id: EntryId, result: &str, failed: bool) -> bool {
        let mut inner = self.inner.lock();
        inner.in_flight.retain(|e| *e != id);
        let Some(entry) = inner.entry_mut(id) else {
            return false;
        };
        entry.result = Some(result.to_string());
        entry.state = if failed {
            EntryState::Failed
        } else {
            EntryState::Done
        };
        true
    }

    /// Attach captured output to entry `id`. Blank output is ignored.
    pub fn capture_output(&self, id: EntryId, output: &str) -> bool {
        if output.trim().is_empty() {
            return false;
        }
        let mut inner = self.inner.lock();
        match inner.entry_mut(id) {
            Some(entry) => {
                entry.output = Some(output.to_string());
                true
            }
            None => false,
        }
    }

    /// Record a result that arrived without a preceding expression.
    pub fn push_result(&self, text: &str, source: Source) -> EntryId {
        let id = self.begin("", source);
        self.complete(id, text, false);
        id
    }

    /// Current status line.
    pub fn status(&self) -> Status {
        let inner = self.inner.lock();
        inner
            .in_flight
            .last()
            .and_then(|id| inner.entries.iter().find(|e| e.id == *id))
            .map_or(Status::Ready, |e| Status::Evaluating(e.expression.clone()))
    }

    /// Snapshot of all entries.
    pub fn entries(&self) -> Vec<Entry> {
        self.inner.lock().entries.clone()
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<Entry> {
        self.inner.lock().entries.last().cloned()
    }

    /// Remove every entry. Calls still in flight complete into nothing.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.in_flight.clear();
    }
}
