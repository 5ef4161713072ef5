//! Editing commands and their selection-derived state
//!
//! There is one concrete [`Command`] type. What it does is a closure that
//! either produces a transaction, opens a dialog round trip, or declines
//! (`None`) when the command does not apply to the current selection. Running
//! that closure without dispatching its result is exactly what
//! [`Command::is_enabled`] does, so enabled state can never drift from what
//! execution would actually do.
//!
//! The per-kind behaviours constructs share live in the submodules:
//!
//!     marks.rs    toggle a mark over the selection (or the stored marks)
//!     blocks.rs   set block type, wrap in / lift out of a container, insert
//!     lists.rs    toggle, convert, or wrap lists
//!     dialogs.rs  dialog requests, the host trait, and result application

pub mod blocks;
pub mod context;
pub mod dialogs;
pub mod lists;
pub mod marks;

pub use context::CommandContext;
pub use dialogs::{DialogHost, DialogProps, DialogRequest, DialogResult, DialogTarget};

use crate::edit::Transaction;
use std::fmt;
use std::sync::Arc;

/// Broad family of a command; informs toolbars how to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Mark,
    Node,
    List,
    Wrap,
    Insert,
    Dialog,
    Custom,
}

/// What running a command yields.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Edit(Transaction),
    /// A round trip through the dialog host is needed before editing.
    Dialog(DialogRequest),
}

pub type RunFn = Arc<dyn Fn(&CommandContext<'_>) -> Option<CommandOutcome> + Send + Sync>;
pub type ActiveFn = Arc<dyn Fn(&CommandContext<'_>) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct Command {
    name: String,
    kind: CommandKind,
    keys: Vec<String>,
    run: RunFn,
    active: Option<ActiveFn>,
}

impl Command {
    pub fn new<F>(name: &str, kind: CommandKind, run: F) -> Self
    where
        F: Fn(&CommandContext<'_>) -> Option<CommandOutcome> + Send + Sync + 'static,
    {
        Command {
            name: name.to_string(),
            kind,
            keys: Vec::new(),
            run: Arc::new(run),
            active: None,
        }
    }

    /// Informational key bindings, e.g. `Mod-b`.
    pub fn with_keys(mut self, keys: &[&str]) -> Self {
        self.keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn with_active<F>(mut self, active: F) -> Self
    where
        F: Fn(&CommandContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.active = Some(Arc::new(active));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Whether running the command would do anything. Never mutates state.
    pub fn is_enabled(&self, ctx: &CommandContext<'_>) -> bool {
        (self.run)(ctx).is_some()
    }

    /// Whether the selection already sits in what this command governs.
    pub fn is_active(&self, ctx: &CommandContext<'_>) -> bool {
        self.active.as_ref().is_some_and(|active| active(ctx))
    }

    /// Run the command and hand its outcome to `dispatch`.
    ///
    /// Returns false, without calling `dispatch`, when the command is disabled.
    pub fn execute<D>(&self, ctx: &CommandContext<'_>, dispatch: D) -> bool
    where
        D: FnOnce(CommandOutcome),
    {
        match (self.run)(ctx) {
            Some(outcome) => {
                dispatch(outcome);
                true
            }
            None => false,
        }
    }

    /// The outcome without dispatching it.
    pub fn run(&self, ctx: &CommandContext<'_>) -> Option<CommandOutcome> {
        (self.run)(ctx)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("keys", &self.keys)
            .finish()
    }
}

/// Toolbar-facing state of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandState {
    pub name: String,
    pub enabled: bool,
    pub active: bool,
}

/// Wrap a transaction-producing closure result as an edit outcome.
pub(crate) fn edit(tr: Option<Transaction>) -> Option<CommandOutcome> {
    tr.map(CommandOutcome::Edit)
}
