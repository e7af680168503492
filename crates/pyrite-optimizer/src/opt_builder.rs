//! Builder with mutation notifications.
//!
//! [`OptBuilder`] is the cursor the rewrite driver hands to transforms. It
//! behaves like the plain core builder but reports every mutation to a
//! [`RewriteListener`], which the driver uses to feed its worklist and to
//! detect when the operation currently being rewritten disappears.

use pyrite_core::{InsertPoint, Inserter, OpId, OpTree, ValueId};

/// Callbacks fired on every tree mutation. All default to no-ops, so a
/// listener implements only what it cares about.
pub trait RewriteListener {
    fn on_insert(&mut self, _op: OpId) {}
    fn on_update(&mut self, _op: OpId) {}
    fn on_erase(&mut self, _op: OpId) {}
}

/// Listener that ignores everything; handy outside the driver.
#[derive(Debug, Default)]
pub struct NullListener;

impl RewriteListener for NullListener {}

/// Notifying builder over a borrowed tree.
pub struct OptBuilder<'t, 'l> {
    tree: &'t mut OpTree,
    listener: &'l mut dyn RewriteListener,
    point: InsertPoint,
}

impl<'t, 'l> OptBuilder<'t, 'l> {
    /// Builder with the cursor immediately before `op`.
    pub fn before(
        tree: &'t mut OpTree,
        listener: &'l mut dyn RewriteListener,
        op: OpId,
    ) -> OptBuilder<'t, 'l> {
        let point = InsertPoint::before(tree, op);
        OptBuilder { tree, listener, point }
    }

    pub fn at_body_end(
        tree: &'t mut OpTree,
        listener: &'l mut dyn RewriteListener,
        op: OpId,
    ) -> OptBuilder<'t, 'l> {
        let point = InsertPoint::at_body_end(tree, op);
        OptBuilder { tree, listener, point }
    }

    pub fn set_insert_point_before(&mut self, op: OpId) {
        self.point = InsertPoint::before(self.tree, op);
    }

    pub fn set_insert_point_after(&mut self, op: OpId) {
        self.point = InsertPoint::after(self.tree, op);
    }

    pub fn set_insert_point_at_body_begin(&mut self, op: OpId) {
        self.point = InsertPoint::at_body_begin(self.tree, op);
    }

    pub fn set_insert_point_at_body_end(&mut self, op: OpId) {
        self.point = InsertPoint::at_body_end(self.tree, op);
    }

    /// Cursor before the first operation of a body, not skipping structural
    /// headers; used when filling branch bodies from the top.
    pub fn set_insert_point_at_body_front(&mut self, op: OpId) {
        self.point = InsertPoint { parent: op, index: 0 };
    }

    /// Deep-clones `op` (with its body) and inserts the clone at the
    /// cursor. Insert notifications fire for every cloned operation,
    /// children first.
    pub fn clone_op(&mut self, op: OpId) -> OpId {
        tracing::debug!(op = %op, name = self.tree.op(op).name(), "clone");
        let clone = self.tree.clone_subtree(op);
        self.notify_insert_recursively(clone);
        self.insert_op(clone);
        clone
    }

    fn notify_insert_recursively(&mut self, op: OpId) {
        let children = self.tree.op(op).body.clone();
        for child in children {
            self.notify_insert_recursively(child);
            self.listener.on_insert(child);
        }
    }

    /// Erases `op` and its body, children first. The cursor lands on the
    /// slot `op` occupied, so follow-up inserts go where it used to be.
    pub fn erase(&mut self, op: OpId) {
        if let Some(parent) = self.tree.op(op).parent {
            if let Some(index) = self.tree.position_in_parent(op) {
                self.point = InsertPoint { parent, index };
            }
        }
        self.erase_rec(op);
    }

    fn erase_rec(&mut self, op: OpId) {
        while let Some(&last) = self.tree.op(op).body.last() {
            self.erase_rec(last);
        }
        tracing::debug!(op = %op, name = self.tree.op(op).name(), "erase");
        self.listener.on_erase(op);
        self.tree.erase_single(op);
    }

    /// Runs an arbitrary mutation of `op` that preserves the tree
    /// invariants, then notifies the update.
    pub fn update(&mut self, op: OpId, actor: impl FnOnce(&mut OpTree)) {
        tracing::debug!(op = %op, name = self.tree.op(op).name(), "update");
        actor(self.tree);
        self.listener.on_update(op);
    }

    /// Rewires every use of `old` to `new`, updating (and re-queueing) each
    /// user.
    pub fn replace_all_uses(&mut self, old: ValueId, new: ValueId) {
        let uses: Vec<_> = self.tree.uses(old).to_vec();
        for entry in uses {
            self.update(entry.user, |tree| {
                tree.set_operand(entry.user, entry.operand_number, new);
            });
        }
    }

    /// Replaces `op` with `new_op`: result values are rewired pairwise,
    /// then `op` is erased.
    pub fn replace(&mut self, op: OpId, new_op: OpId) {
        tracing::debug!(op = %op, name = self.tree.op(op).name(), "replace");
        let pairs: Vec<(ValueId, ValueId)> = self
            .tree
            .op(op)
            .results
            .iter()
            .copied()
            .zip(self.tree.op(new_op).results.iter().copied())
            .collect();
        for (old, new) in pairs {
            self.replace_all_uses(old, new);
        }
        self.erase(op);
    }
}

impl Inserter for OptBuilder<'_, '_> {
    fn tree(&self) -> &OpTree {
        self.tree
    }

    fn tree_mut(&mut self) -> &mut OpTree {
        self.tree
    }

    fn insert_op(&mut self, op: OpId) {
        tracing::debug!(op = %op, name = self.tree.op(op).name(), "insert");
        self.tree
            .insert_into_body(self.point.parent, self.point.index, op);
        self.point.index += 1;
        self.listener.on_insert(op);
    }
}
