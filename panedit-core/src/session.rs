//! Editing session
//!
//! [`Editor`] owns the live [`EditorState`] and is the single place edits are
//! committed. Every transaction, whether it comes from the visual engine, a
//! command, a dialog, or normalization, goes through the maintenance
//! [`Pipeline`]; the committed result (user steps plus repairs) is one undo
//! entry.
//!
//! The session is single threaded. State lives in `RefCell`s and no borrow is
//! held across an `await`: [`Editor::run_command`] takes the dialog request
//! out, awaits the host, and only then looks at the state again, so the result
//! applies to whatever the document is by the time the dialog closes.

use crate::commands::dialogs::{apply_result, ask};
use crate::commands::{CommandContext, CommandOutcome, CommandState, DialogHost, DialogRequest, DialogResult};
use crate::doc::{Node, BODY_PATH};
use crate::edit::{EditorState, Origin, Selection, Transaction};
use crate::error::EditorError;
use crate::pandoc::{ApiVersion, PandocAst};
use crate::reader::read_document;
use crate::registry::ConstructRegistry;
use crate::transforms::{Outcome, Pipeline};
use crate::writer::write_document;
use std::cell::{Ref, RefCell};
use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of undo entries kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Notification sent to subscribers after a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    DocumentUpdated,
    SelectionChanged,
}

pub type Subscriber = Box<dyn Fn(EditorEvent, &EditorState)>;

/// What happened to a dispatched transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Committed,
    /// A filter refused the edit; nothing changed.
    Rejected { filter: String },
    /// Nothing to do (cancelled dialog, stale target, empty transaction).
    Unchanged,
}

/// Result of executing a command by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Executed {
    /// The command does not apply to the current selection.
    Disabled,
    Done(Dispatched),
    /// The command waits on a dialog; finish with [`Editor::complete_dialog`].
    Dialog(DialogRequest),
}

#[derive(Debug, Clone)]
struct HistoryEntry {
    before: EditorState,
    after: EditorState,
}

/// Bounded undo/redo of committed states.
#[derive(Debug)]
struct History {
    undo: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    limit: usize,
}

impl History {
    fn new(limit: usize) -> Self {
        History {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    fn record(&mut self, before: EditorState, after: EditorState) {
        if self.limit == 0 {
            return;
        }
        self.undo.push_back(HistoryEntry { before, after });
        if self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        self.redo.clear();
    }
}

pub struct Editor {
    registry: Arc<ConstructRegistry>,
    pipeline: Pipeline,
    api_version: ApiVersion,
    state: RefCell<EditorState>,
    history: RefCell<History>,
    subscribers: RefCell<Vec<Subscriber>>,
}

impl Editor {
    /// Start a session on `doc`, normalizing it first.
    pub fn new(
        registry: Arc<ConstructRegistry>,
        doc: Node,
        api_version: ApiVersion,
    ) -> Result<Self, EditorError> {
        let selection = Selection::at_start(registry.schema(), &doc, &BODY_PATH).unwrap_or_default();
        let pipeline = Pipeline::with_defaults();
        let state = EditorState::new(doc, selection);
        let state = match pipeline.normalize(registry.schema(), &state)? {
            Outcome::Committed { doc, selection, .. } => EditorState::new(doc, selection),
            Outcome::Rejected { .. } => state,
        };
        Ok(Editor {
            registry,
            pipeline,
            api_version,
            state: RefCell::new(state),
            history: RefCell::new(History::new(DEFAULT_HISTORY_LIMIT)),
            subscribers: RefCell::new(Vec::new()),
        })
    }

    /// Start a session on a freshly read interchange tree.
    pub fn from_interchange(registry: Arc<ConstructRegistry>, ast: &PandocAst) -> Result<Self, EditorError> {
        let doc = read_document(&registry, ast)?;
        Self::new(registry, doc, ast.api_version.clone())
    }

    pub fn with_history_limit(self, limit: usize) -> Self {
        self.history.replace(History::new(limit));
        self
    }

    pub fn registry(&self) -> &ConstructRegistry {
        &self.registry
    }

    pub fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    pub fn state(&self) -> Ref<'_, EditorState> {
        self.state.borrow()
    }

    pub fn doc(&self) -> Node {
        self.state.borrow().doc.clone()
    }

    /// Register a callback for commits. Callbacks must not edit the session.
    pub fn subscribe<F>(&self, subscriber: F)
    where
        F: Fn(EditorEvent, &EditorState) + 'static,
    {
        self.subscribers.borrow_mut().push(Box::new(subscriber));
    }

    fn notify(&self, events: &[EditorEvent]) {
        if events.is_empty() {
            return;
        }
        let state = self.state.borrow().clone();
        for subscriber in self.subscribers.borrow().iter() {
            for &event in events {
                subscriber(event, &state);
            }
        }
    }

    /// Swap in a new state, recording history and notifying subscribers.
    fn commit(&self, next: EditorState, record: bool) {
        let previous = self.state.replace(next.clone());
        let mut events = Vec::new();
        if previous.doc != next.doc {
            events.push(EditorEvent::DocumentUpdated);
            if record {
                self.history.borrow_mut().record(previous.clone(), next.clone());
            }
        }
        if previous.selection != next.selection {
            events.push(EditorEvent::SelectionChanged);
        }
        self.notify(&events);
    }

    /// Run `tr` through the pipeline and commit the result.
    pub fn dispatch(&self, tr: Transaction) -> Result<Dispatched, EditorError> {
        if tr.is_empty() {
            return Ok(Dispatched::Unchanged);
        }
        let stored_marks = tr.stored_marks.clone();
        let doc_changed = tr.doc_changed();
        let outcome = {
            let state = self.state.borrow();
            self.pipeline.run(self.registry.schema(), &state, tr)?
        };
        match outcome {
            Outcome::Rejected { filter } => Ok(Dispatched::Rejected { filter }),
            Outcome::Committed { doc, selection, .. } => {
                let stored_marks = match stored_marks {
                    Some(marks) => Some(marks),
                    None if doc_changed => None,
                    None => self.state.borrow().stored_marks.clone(),
                };
                tracing::debug!(doc_changed, "transaction committed");
                self.commit(
                    EditorState {
                        doc,
                        selection,
                        stored_marks,
                    },
                    true,
                );
                Ok(Dispatched::Committed)
            }
        }
    }

    /// Move the selection without editing.
    pub fn set_selection(&self, selection: Selection) {
        let next = {
            let state = self.state.borrow();
            EditorState {
                doc: state.doc.clone(),
                selection: selection.clamped(self.registry.schema(), &state.doc),
                stored_marks: None,
            }
        };
        self.commit(next, false);
    }

    /// Enabled and active state of every command at the current selection.
    pub fn command_states(&self) -> Vec<CommandState> {
        let state = self.state.borrow();
        self.registry
            .command_states(&CommandContext::new(self.registry.schema(), &state))
    }

    /// Execute a command by name against the current state.
    pub fn execute(&self, name: &str) -> Result<Executed, EditorError> {
        let command = self
            .registry
            .command(name)
            .ok_or_else(|| EditorError::CommandNotFound(name.to_string()))?;
        let outcome = {
            let state = self.state.borrow();
            command.run(&CommandContext::new(self.registry.schema(), &state))
        };
        match outcome {
            None => Ok(Executed::Disabled),
            Some(CommandOutcome::Edit(tr)) => {
                let tr = match tr.origin {
                    Origin::User => tr.with_origin(Origin::Command),
                    _ => tr,
                };
                self.dispatch(tr).map(Executed::Done)
            }
            Some(CommandOutcome::Dialog(request)) => Ok(Executed::Dialog(request)),
        }
    }

    /// Apply a dialog's answer to the state current now.
    pub fn complete_dialog(
        &self,
        request: &DialogRequest,
        result: Option<DialogResult>,
    ) -> Result<Dispatched, EditorError> {
        let tr = {
            let state = self.state.borrow();
            apply_result(self.registry.schema(), &state, request, result)
        };
        match tr {
            Some(tr) => self.dispatch(tr),
            None => Ok(Dispatched::Unchanged),
        }
    }

    /// Execute a command, taking dialog commands through `host`.
    pub async fn run_command(&self, name: &str, host: &dyn DialogHost) -> Result<Dispatched, EditorError> {
        match self.execute(name)? {
            Executed::Disabled => Ok(Dispatched::Unchanged),
            Executed::Done(dispatched) => Ok(dispatched),
            Executed::Dialog(request) => {
                let result = ask(host, request.props.clone()).await;
                self.complete_dialog(&request, result)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.history.borrow().undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.history.borrow().redo.is_empty()
    }

    /// Revert the last commit, repairs included.
    pub fn undo(&self) -> bool {
        let entry = self.history.borrow_mut().undo.pop_back();
        let Some(entry) = entry else {
            return false;
        };
        let target = entry.before.clone();
        self.history.borrow_mut().redo.push(entry);
        self.commit(target, false);
        true
    }

    pub fn redo(&self) -> bool {
        let entry = self.history.borrow_mut().redo.pop();
        let Some(entry) = entry else {
            return false;
        };
        let target = entry.after.clone();
        self.history.borrow_mut().undo.push_back(entry);
        self.commit(target, false);
        true
    }

    /// Run every repair over the whole document.
    pub fn normalize(&self) -> Result<Dispatched, EditorError> {
        let outcome = {
            let state = self.state.borrow();
            self.pipeline.normalize(self.registry.schema(), &state)?
        };
        match outcome {
            Outcome::Rejected { filter } => Ok(Dispatched::Rejected { filter }),
            Outcome::Committed { transaction, .. } if transaction.steps.is_empty() => {
                Ok(Dispatched::Unchanged)
            }
            Outcome::Committed { doc, selection, .. } => {
                self.commit(EditorState::new(doc, selection), true);
                Ok(Dispatched::Committed)
            }
        }
    }

    /// The current document as an interchange tree at the loaded version.
    pub fn to_interchange(&self) -> Result<PandocAst, EditorError> {
        let state = self.state.borrow();
        Ok(write_document(&self.registry, &state.doc, &self.api_version)?)
    }
}
