//! Textual dump of an operation tree.
//!
//! The format is a test contract and must stay byte-stable:
//!
//! ```text
//! <name>[ {<attr>, ...}] (<operand>, ...) -> (<result>, ...)[ [<inward>, ...]]
//! ```
//!
//! One line per operation, two spaces of indent per nesting level. Value
//! references print as `#<id> : <type>`, with ids assigned in encounter
//! order across a single dump: results and inwards take fresh ids, operands
//! refer back to previously assigned ones.

use std::collections::HashMap;
use std::fmt::Write;

use crate::operation::{OpId, OpTree};
use crate::value::ValueId;

impl OpTree {
    /// Renders `root` and its descendants in the stable dump format.
    pub fn dump(&self, root: OpId) -> String {
        let mut out = String::new();
        let mut ids = HashMap::new();
        let mut next_id = 0usize;
        self.dump_rec(root, 0, &mut ids, &mut next_id, &mut out);
        out
    }

    fn dump_rec(
        &self,
        op: OpId,
        depth: usize,
        ids: &mut HashMap<ValueId, usize>,
        next_id: &mut usize,
        out: &mut String,
    ) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        let node = self.op(op);
        out.push_str(node.name());
        if !node.attributes.is_empty() {
            out.push_str(" {");
            for (i, attr) in node.attributes.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{attr}");
            }
            out.push('}');
        }
        out.push_str(" (");
        for (i, &operand) in node.operands.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.dump_value(operand, ids, next_id, out);
        }
        out.push_str(") -> (");
        for (i, &result) in node.results.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.dump_own_value(result, ids, next_id, out);
        }
        out.push(')');
        if !node.inwards.is_empty() {
            out.push_str(" [");
            for (i, &inward) in node.inwards.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                self.dump_own_value(inward, ids, next_id, out);
            }
            out.push(']');
        }
        out.push('\n');
        for index in 0..self.op(op).body.len() {
            let child = self.op(op).body[index];
            self.dump_rec(child, depth + 1, ids, next_id, out);
        }
    }

    /// Prints an operand reference; an unseen value takes a fresh id, which
    /// only happens on trees that violate dominance.
    fn dump_value(
        &self,
        value: ValueId,
        ids: &mut HashMap<ValueId, usize>,
        next_id: &mut usize,
        out: &mut String,
    ) {
        let id = *ids.entry(value).or_insert_with(|| {
            let id = *next_id;
            *next_id += 1;
            id
        });
        let _ = write!(out, "#{id} : {}", self.value_type(value));
    }

    fn dump_own_value(
        &self,
        value: ValueId,
        ids: &mut HashMap<ValueId, usize>,
        next_id: &mut usize,
        out: &mut String,
    ) {
        let id = *next_id;
        *next_id += 1;
        ids.insert(value, id);
        let _ = write!(out, "#{id} : {}", self.value_type(value));
    }
}
