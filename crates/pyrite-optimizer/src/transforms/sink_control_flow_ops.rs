//! Sinking of single-result operations into the one branch that uses them.
//!
//! An operation moves when every use lies strictly inside the same branch
//! region (`Then` or `Else`) of an `If` that sits in the operation's own
//! region. Uses split across sibling branches keep the operation in place,
//! as do uses in the operation's own region or in non-branch bodies
//! (loops).

use pyrite_core::{Inserter, OpId, OpKind, OpTree};

use crate::opt_builder::OptBuilder;
use crate::transform::Transform;

pub struct SinkControlFlowOps;

impl Transform for SinkControlFlowOps {
    fn name(&self) -> &'static str {
        "SinkControlFlowOps"
    }

    fn can_run(&self, tree: &OpTree, op: OpId) -> bool {
        tree.op(op).kind == OpKind::Function
    }

    fn run(&self, op: OpId, builder: &mut OptBuilder) {
        let mut candidates = Vec::new();
        collect_candidates(builder.tree(), op, &mut candidates);
        for candidate in candidates {
            if builder.tree().is_live(candidate) {
                sink_operation(candidate, builder);
            }
        }
    }
}

/// Post-order over the function body; deeper operations sink first so
/// chains move one link per sweep.
fn collect_candidates(tree: &OpTree, op: OpId, out: &mut Vec<OpId>) {
    for &child in &tree.op(op).body {
        collect_candidates(tree, child, out);
        out.push(child);
    }
}

/// The branch of an `If` in `home` that transitively contains `user`, if
/// any.
fn enclosing_branch(tree: &OpTree, user: OpId, home: OpId) -> Option<OpId> {
    let mut chain = user;
    loop {
        let parent = tree.op(chain).parent?;
        if parent == home {
            break;
        }
        chain = parent;
    }
    // `chain` is the home-level ancestor; `user` must be deeper than home,
    // inside a branch of an If.
    if chain == user {
        return None;
    }
    if tree.op(chain).kind != OpKind::If {
        return None;
    }
    let mut branch = user;
    while let Some(parent) = tree.op(branch).parent {
        if parent == chain {
            break;
        }
        branch = parent;
    }
    matches!(tree.op(branch).kind, OpKind::Then | OpKind::Else).then_some(branch)
}

fn sink_operation(op: OpId, builder: &mut OptBuilder) {
    let tree = builder.tree();
    if tree.op(op).results.len() != 1 {
        return;
    }
    let Some(home) = tree.op(op).parent else {
        return;
    };
    let result = tree.op(op).results[0];
    let uses = tree.uses(result);
    if uses.is_empty() {
        return;
    }
    let mut target = None;
    for entry in uses {
        match enclosing_branch(tree, entry.user, home) {
            Some(branch) if target.is_none() || target == Some(branch) => {
                target = Some(branch);
            }
            // A use in the home region, a non-branch body, or a sibling
            // branch pins the operation where it is.
            _ => return,
        }
    }
    let Some(branch) = target else {
        return;
    };
    builder.set_insert_point_at_body_front(branch);
    let cloned = builder.clone_op(op);
    builder.replace(op, cloned);
}
