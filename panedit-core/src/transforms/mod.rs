//! Invariant maintenance
//!
//! # The High-Level Concept
//!
//! Some properties of a document cannot be kept by individual commands:
//! footnote numbers follow anchor order, pasted anchors may duplicate or lose
//! their note, example lists share one counter, and every editing root ends in
//! an empty paragraph. After each transaction the [`Pipeline`] looks at what
//! changed and appends the corrective steps to that same transaction, so the
//! user edit and its repairs commit (and undo) as one.
//!
//! # The Algorithm
//!
//! 1. Apply the transaction's steps to the prior document, collecting one
//!    [`ChangeRegion`] per step.
//! 2. Run every [`EditFilter`]. A rejection discards the transaction; the
//!    state is left exactly as it was.
//! 3. Run every [`Repair`] whose relevance test matches the regions. Each one
//!    compares the new document against the prior one and returns the steps
//!    it needs, if any. Those steps are applied and appended.
//! 4. Repeat step 3 until a pass produces nothing, bounded by
//!    [`MAX_PASSES`]. Repairs are idempotent, so the loop settles as soon as
//!    the invariants hold.
//!
//! The pipeline is a pure function of the prior state and the transaction.
//!
//!     footnotes.rs           numbering, dedup, snapshot sync, note synthesis
//!     example_lists.rs       shared counter for example-style ordered lists
//!     trailing_paragraph.rs  empty paragraph at the end of every editing root

pub mod example_lists;
pub mod footnotes;
pub mod trailing_paragraph;

pub use example_lists::ExampleLists;
pub use footnotes::{FootnoteRepair, NoFootnoteInNote};
pub use trailing_paragraph::TrailingParagraph;

use crate::doc::{Node, Schema, DOC};
use crate::edit::transaction::apply_steps;
use crate::edit::{ChangeRegion, EditorState, Origin, Selection, Step, Transaction};
use crate::error::StepError;

/// Upper bound on repair passes per transaction.
pub const MAX_PASSES: usize = 4;

/// What a filter or repair gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct RepairContext<'a> {
    pub schema: &'a Schema,
    /// The document before the transaction.
    pub old_doc: &'a Node,
    /// The document with every step so far applied.
    pub doc: &'a Node,
    pub regions: &'a [ChangeRegion],
    pub selection: &'a Selection,
}

impl RepairContext<'_> {
    /// Whether any region touched a node of the given type.
    pub fn touches(&self, node_type: &str) -> bool {
        self.regions.iter().any(|r| r.touches(node_type))
    }
}

/// Corrective steps, plus an optional selection override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fix {
    pub steps: Vec<Step>,
    pub selection: Option<Selection>,
}

impl Fix {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.selection.is_none()
    }
}

/// A hard structural constraint checked before any repair runs.
pub trait EditFilter: Send + Sync {
    fn name(&self) -> &str;

    /// `false` rejects the whole transaction.
    fn accepts(&self, ctx: &RepairContext<'_>) -> bool;
}

/// A post-edit correction.
pub trait Repair: Send + Sync {
    fn name(&self) -> &str;

    /// Cheap test on the change regions; irrelevant edits skip [`Repair::repair`].
    fn is_relevant(&self, ctx: &RepairContext<'_>) -> bool;

    /// The steps restoring the invariant, or `None` when it already holds.
    fn repair(&self, ctx: &RepairContext<'_>) -> Option<Fix>;
}

/// Result of running a transaction through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A filter refused the edit.
    Rejected { filter: String },
    Committed {
        doc: Node,
        selection: Selection,
        /// The user transaction with the repair steps appended.
        transaction: Transaction,
    },
}

/// Ordered filters and repairs.
pub struct Pipeline {
    filters: Vec<Box<dyn EditFilter>>,
    repairs: Vec<Box<dyn Repair>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline {
            filters: Vec::new(),
            repairs: Vec::new(),
        }
    }

    /// The built-in filter and repairs.
    pub fn with_defaults() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_filter(NoFootnoteInNote);
        pipeline.add_repair(FootnoteRepair);
        pipeline.add_repair(ExampleLists);
        pipeline.add_repair(TrailingParagraph);
        pipeline
    }

    pub fn add_filter<F: EditFilter + 'static>(&mut self, filter: F) {
        self.filters.push(Box::new(filter));
    }

    pub fn add_repair<R: Repair + 'static>(&mut self, repair: R) {
        self.repairs.push(Box::new(repair));
    }

    /// Apply `tr` to `state`, filter it, and append repairs.
    pub fn run(
        &self,
        schema: &Schema,
        state: &EditorState,
        tr: Transaction,
    ) -> Result<Outcome, StepError> {
        let (doc, regions) = tr.apply(schema, &state.doc)?;
        self.settle(schema, &state.doc, &state.selection, doc, regions, tr)
    }

    /// Run every repair as if the whole document had changed.
    ///
    /// The prior document is taken to be empty, so every note counts as new.
    pub fn normalize(&self, schema: &Schema, state: &EditorState) -> Result<Outcome, StepError> {
        let regions = vec![ChangeRegion::whole(&state.doc)];
        let tr = Transaction::new().with_origin(Origin::Normalize);
        let nothing = Node::new(DOC);
        self.settle(schema, &nothing, &state.selection, state.doc.clone(), regions, tr)
    }

    fn settle(
        &self,
        schema: &Schema,
        old_doc: &Node,
        old_selection: &Selection,
        mut doc: Node,
        mut regions: Vec<ChangeRegion>,
        mut tr: Transaction,
    ) -> Result<Outcome, StepError> {
        let mut selection = tr
            .selection
            .clone()
            .unwrap_or_else(|| old_selection.clone());

        {
            let ctx = RepairContext {
                schema,
                old_doc,
                doc: &doc,
                regions: &regions,
                selection: &selection,
            };
            if let Some(filter) = self.filters.iter().find(|f| !f.accepts(&ctx)) {
                tracing::warn!(filter = filter.name(), "edit rejected");
                return Ok(Outcome::Rejected {
                    filter: filter.name().to_string(),
                });
            }
        }

        for pass in 0..MAX_PASSES {
            let mut changed = false;
            for repair in &self.repairs {
                let ctx = RepairContext {
                    schema,
                    old_doc,
                    doc: &doc,
                    regions: &regions,
                    selection: &selection,
                };
                if !repair.is_relevant(&ctx) {
                    continue;
                }
                let Some(fix) = repair.repair(&ctx).filter(|fix| !fix.is_empty()) else {
                    continue;
                };
                tracing::debug!(
                    repair = repair.name(),
                    pass,
                    steps = fix.steps.len(),
                    "repair applied"
                );
                let (next, fix_regions) = apply_steps(schema, &doc, &fix.steps)?;
                doc = next;
                regions.extend(fix_regions);
                changed |= !fix.steps.is_empty();
                tr.steps.extend(fix.steps);
                if let Some(moved) = fix.selection {
                    selection = moved;
                }
            }
            if !changed {
                break;
            }
        }

        let selection = selection.clamped(schema, &doc);
        tr.selection = Some(selection.clone());
        Ok(Outcome::Committed {
            doc,
            selection,
            transaction: tr,
        })
    }
}
