//! Example list numbering
//!
//! Ordered lists with the `Example` number style continue one another across
//! the whole document: the second example list starts where the first one
//! stopped. Only lists whose start is off get a step.

use super::{Fix, Repair, RepairContext};
use crate::constructs::lists::{is_example_list, ATTR_ORDER, ORDERED_LIST};
use crate::edit::Step;

pub struct ExampleLists;

impl Repair for ExampleLists {
    fn name(&self) -> &str {
        "example_lists"
    }

    fn is_relevant(&self, ctx: &RepairContext<'_>) -> bool {
        ctx.touches(ORDERED_LIST)
    }

    fn repair(&self, ctx: &RepairContext<'_>) -> Option<Fix> {
        let mut next = 1;
        let mut steps = Vec::new();
        for (path, list) in ctx.doc.descendants() {
            if !is_example_list(list) {
                continue;
            }
            if list.attrs.get_i64(ATTR_ORDER) != Some(next) {
                let mut attrs = list.attrs.clone();
                attrs.set(ATTR_ORDER, next);
                steps.push(Step::SetAttrs { path, attrs });
            }
            next += list.content.len() as i64;
        }
        (!steps.is_empty()).then(|| Fix {
            steps,
            selection: None,
        })
    }
}
