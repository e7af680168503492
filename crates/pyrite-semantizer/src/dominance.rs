//! Structural dominance over nested operation bodies.
//!
//! Dominance is derived from the tree shape alone. Inside an SSA body each
//! child is dominated by the siblings before it, so the dominance parent of
//! a child is the previous sibling (or the body owner for the first child).
//! `Module` and `If` bodies are not SSA regions: their children hang off
//! the owner directly, so sibling branches never dominate each other. A
//! `Condition` header does not dominate the loop body that follows it.

use std::collections::HashMap;

use pyrite_core::{ErrorBuffer, OpId, OpKind, OpTree};

use crate::error::SemantizerError;

/// Dominance relation over one subtree, built once and queried many times.
#[derive(Debug)]
pub struct DominanceTree {
    /// Immediate dominator of every operation below the root.
    parents: HashMap<OpId, OpId>,
    root: OpId,
}

impl DominanceTree {
    pub fn new(tree: &OpTree, root: OpId) -> DominanceTree {
        let mut dom = DominanceTree {
            parents: HashMap::new(),
            root,
        };
        dom.traverse(tree, root);
        dom
    }

    fn traverse(&mut self, tree: &OpTree, op: OpId) {
        let is_ssa = !matches!(tree.op(op).kind, OpKind::Module | OpKind::If);
        let mut parent = op;
        for &child in &tree.op(op).body {
            self.parents.insert(child, parent);
            self.traverse(tree, child);
            if is_ssa && tree.op(child).kind != OpKind::Condition {
                parent = child;
            }
        }
    }

    pub fn dominates(&self, dominator: OpId, dominated: OpId) -> bool {
        dominator == dominated || self.properly_dominates(dominator, dominated)
    }

    pub fn properly_dominates(&self, dominator: OpId, dominated: OpId) -> bool {
        if dominated == self.root {
            return false;
        }
        let mut current = self.parents.get(&dominated);
        while let Some(&ancestor) = current {
            if ancestor == dominator {
                return true;
            }
            current = self.parents.get(&ancestor);
        }
        false
    }
}

/// Checks that every operand refers to a value whose owner dominates the
/// using operation (invariant 5 of the data model).
pub fn verify_dominance(tree: &OpTree, root: OpId) -> Result<(), ErrorBuffer<SemantizerError>> {
    let dom = DominanceTree::new(tree, root);
    let mut errors = ErrorBuffer::new();
    tree.walk_post_order(root, &mut |op| {
        for (index, &operand) in tree.op(op).operands.iter().enumerate() {
            let owner = tree.value_owner(operand);
            if !dom.dominates(owner, op) {
                errors.push(SemantizerError::new(
                    op,
                    tree.op(op).name(),
                    format!("operand #{index} refers to a value whose owner does not dominate it"),
                ));
            }
        }
    });
    errors.into_result()
}
