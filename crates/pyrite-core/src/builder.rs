//! Insertion-point cursor over operation bodies.
//!
//! A [`Builder`] holds a cursor, `(parent operation, index into its body)`,
//! constructs operations through the typed adaptor constructors and links
//! them at the cursor. The optimizer extends this with mutation
//! notifications; construction surfaces (the converter, the declarative
//! module) implement [`Inserter`] directly over their own trees.

use crate::operation::{OpId, OpTree};

/// A cursor position: insert before `index` within the body of `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertPoint {
    pub parent: OpId,
    pub index: usize,
}

impl InsertPoint {
    /// Cursor immediately before `op` in its parent's body.
    ///
    /// # Panics
    ///
    /// Panics if `op` is detached.
    pub fn before(tree: &OpTree, op: OpId) -> InsertPoint {
        let parent = tree
            .op(op)
            .parent
            .unwrap_or_else(|| panic!("cannot place a cursor around a detached {}", tree.op(op).name()));
        let index = tree
            .position_in_parent(op)
            .expect("attached operation must appear in its parent body");
        InsertPoint { parent, index }
    }

    /// Cursor immediately after `op` in its parent's body.
    pub fn after(tree: &OpTree, op: OpId) -> InsertPoint {
        let point = InsertPoint::before(tree, op);
        InsertPoint {
            parent: point.parent,
            index: point.index + 1,
        }
    }

    /// Cursor at the start of the body of `op`, skipping a structural
    /// header child when one exists (the `Then` of an `If`, the `Condition`
    /// of a `While`). Empty bodies behave like [`InsertPoint::at_body_end`].
    pub fn at_body_begin(tree: &OpTree, op: OpId) -> InsertPoint {
        if tree.op(op).body.is_empty() {
            InsertPoint::at_body_end(tree, op)
        } else {
            InsertPoint { parent: op, index: 1 }
        }
    }

    /// Cursor at the end of the body of `op`.
    pub fn at_body_end(tree: &OpTree, op: OpId) -> InsertPoint {
        InsertPoint {
            parent: op,
            index: tree.op(op).body.len(),
        }
    }
}

/// Anything operations can be built into: owns access to a tree and an
/// insertion cursor. The adaptor constructors accept `&mut dyn Inserter`,
/// so the same `init` code serves the plain builder, the notifying
/// optimizer builder, the converter, and the declarative module.
pub trait Inserter {
    fn tree(&self) -> &OpTree;
    fn tree_mut(&mut self) -> &mut OpTree;

    /// Attaches a detached operation at the cursor and advances the cursor
    /// past it.
    fn insert_op(&mut self, op: OpId);
}

/// Plain builder over a borrowed tree.
#[derive(Debug)]
pub struct Builder<'t> {
    tree: &'t mut OpTree,
    point: InsertPoint,
}

impl<'t> Builder<'t> {
    pub fn new(tree: &'t mut OpTree, point: InsertPoint) -> Self {
        Builder { tree, point }
    }

    pub fn before(tree: &'t mut OpTree, op: OpId) -> Self {
        let point = InsertPoint::before(tree, op);
        Builder { tree, point }
    }

    pub fn after(tree: &'t mut OpTree, op: OpId) -> Self {
        let point = InsertPoint::after(tree, op);
        Builder { tree, point }
    }

    pub fn at_body_begin(tree: &'t mut OpTree, op: OpId) -> Self {
        let point = InsertPoint::at_body_begin(tree, op);
        Builder { tree, point }
    }

    pub fn at_body_end(tree: &'t mut OpTree, op: OpId) -> Self {
        let point = InsertPoint::at_body_end(tree, op);
        Builder { tree, point }
    }

    pub fn insert_point(&self) -> InsertPoint {
        self.point
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
}

impl Inserter for Builder<'_> {
    fn tree(&self) -> &OpTree {
        self.tree
    }

    fn tree_mut(&mut self) -> &mut OpTree {
        self.tree
    }

    fn insert_op(&mut self, op: OpId) {
        self.tree
            .insert_into_body(self.point.parent, self.point.index, op);
        self.point.index += 1;
    }
}
