use super::selection::Selection;
use super::step::{ChangeRegion, Step};
use crate::doc::{Mark, Node, Schema};
use crate::error::StepError;

/// Who produced a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    #[default]
    User,
    Command,
    Dialog,
    History,
    Normalize,
}

/// Ordered steps committed as one unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transaction {
    pub steps: Vec<Step>,
    pub selection: Option<Selection>,
    /// Marks the next typed text receives (`Some(vec![])` clears them).
    pub stored_marks: Option<Vec<Mark>>,
    pub origin: Origin,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_stored_marks(mut self, marks: Vec<Mark>) -> Self {
        self.stored_marks = Some(marks);
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.selection.is_none() && self.stored_marks.is_none()
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Apply every step in order, collecting the change regions.
    pub fn apply(&self, schema: &Schema, doc: &Node) -> Result<(Node, Vec<ChangeRegion>), StepError> {
        apply_steps(schema, doc, &self.steps)
    }
}

pub(crate) fn apply_steps(
    schema: &Schema,
    doc: &Node,
    steps: &[Step],
) -> Result<(Node, Vec<ChangeRegion>), StepError> {
    let mut current = doc.clone();
    let mut regions = Vec::with_capacity(steps.len());
    for step in steps {
        regions.push(step.region(&current));
        current = step.apply(schema, &current)?;
    }
    Ok((current, regions))
}
