//! Fixed-point rewrite driver.
//!
//! Each sweep rebuilds the worklist by post-order traversal and pops in
//! FIFO order, so deeper operations are examined before their parents.
//! Transforms run in registration order against every popped operation;
//! mutation notifications push affected operations back onto the worklist
//! within the same sweep, and sweeps repeat until a full one causes no
//! mutation or the iteration limit is reached.

use std::collections::{HashSet, VecDeque};

use pyrite_core::{OpId, OpTree, Program};

use crate::opt_builder::{OptBuilder, RewriteListener};
use crate::transform::{Transform, DEFAULT_ITER_LIMIT};

/// Insertion-ordered set of pending operations. Erased entries are dropped
/// lazily on pop.
#[derive(Debug, Default)]
struct Worklist {
    queue: VecDeque<OpId>,
    members: HashSet<OpId>,
}

impl Worklist {
    fn push(&mut self, op: OpId) {
        if self.members.insert(op) {
            self.queue.push_back(op);
        }
    }

    fn pop(&mut self) -> Option<OpId> {
        while let Some(op) = self.queue.pop_front() {
            if self.members.remove(&op) {
                return Some(op);
            }
        }
        None
    }

    fn remove(&mut self, op: OpId) {
        self.members.remove(&op);
    }
}

/// Listener wired to one popped operation: feeds the worklist and tracks
/// whether the tracked operation was updated or erased mid-rewrite.
struct SweepListener<'w> {
    worklist: &'w mut Worklist,
    mutated: &'w mut bool,
    tracked: OpId,
    erased: bool,
}

impl RewriteListener for SweepListener<'_> {
    fn on_insert(&mut self, op: OpId) {
        self.worklist.push(op);
        *self.mutated = true;
    }

    fn on_update(&mut self, op: OpId) {
        self.worklist.push(op);
        *self.mutated = true;
    }

    fn on_erase(&mut self, op: OpId) {
        self.worklist.remove(op);
        *self.mutated = true;
        if op == self.tracked {
            self.erased = true;
        }
    }
}

/// Drives `transforms` over the subtree under `root` until a full sweep
/// mutates nothing, bounded by `iter_limit` sweeps. Returns whether any
/// mutation happened at all.
pub fn run_to_fixpoint(
    tree: &mut OpTree,
    root: OpId,
    transforms: &[Box<dyn Transform>],
    iter_limit: usize,
) -> bool {
    let mut any_mutation = false;
    for _ in 0..iter_limit {
        let mut mutated = false;
        let mut worklist = Worklist::default();
        tree.walk_post_order(root, &mut |op| worklist.push(op));
        while let Some(op) = worklist.pop() {
            if !tree.is_live(op) {
                continue;
            }
            let mut listener = SweepListener {
                worklist: &mut worklist,
                mutated: &mut mutated,
                tracked: op,
                erased: false,
            };
            for transform in transforms {
                if listener.erased {
                    break;
                }
                if !transform.recurse() && op != root {
                    continue;
                }
                if !transform.can_run(tree, op) {
                    continue;
                }
                tracing::debug!(transform = transform.name(), op = %op, "run");
                // The root (typically the module) has no parent to place a
                // cursor in; transforms targeting it position themselves.
                let mut builder = if tree.op(op).parent.is_some() {
                    OptBuilder::before(tree, &mut listener, op)
                } else {
                    OptBuilder::at_body_end(tree, &mut listener, op)
                };
                transform.run(op, &mut builder);
            }
        }
        any_mutation |= mutated;
        if !mutated {
            break;
        }
    }
    any_mutation
}

/// The pass manager: an ordered collection of transforms driven to a fixed
/// point over a program.
pub struct Optimizer {
    transforms: Vec<Box<dyn Transform>>,
    iter_limit: usize,
}

impl Optimizer {
    pub fn new() -> Optimizer {
        Optimizer {
            transforms: Vec::new(),
            iter_limit: DEFAULT_ITER_LIMIT,
        }
    }

    pub fn with_iter_limit(iter_limit: usize) -> Optimizer {
        Optimizer {
            transforms: Vec::new(),
            iter_limit,
        }
    }

    pub fn add(&mut self, transform: Box<dyn Transform>) -> &mut Optimizer {
        self.transforms.push(transform);
        self
    }

    pub fn process(&self, program: &mut Program) {
        self.process_op(&mut program.tree, program.root);
    }

    pub fn process_op(&self, tree: &mut OpTree, root: OpId) {
        run_to_fixpoint(tree, root, &self.transforms, self.iter_limit);
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Optimizer::new()
    }
}
