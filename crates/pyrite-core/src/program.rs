//! Program: an operation tree rooted at a module.

use crate::adaptors::{ModuleOp, OpAdaptor};
use crate::operation::{OpId, OpTree};

/// Owns one operation arena and its root `Module` operation.
///
/// Dropping a program drops the arena, which releases every operation and
/// value at once; there is no per-operation teardown to sequence, so the
/// deferred-destruction concerns of a shared-pointer representation do not
/// arise here. Within the program's lifetime, erased operations leave
/// tombstone slots (see [`OpTree::is_live`]).
#[derive(Debug)]
pub struct Program {
    pub tree: OpTree,
    pub root: OpId,
}

impl Program {
    /// Creates a program holding an empty root module.
    pub fn new() -> Program {
        let mut tree = OpTree::new();
        let root = ModuleOp::build_detached(&mut tree).op_id();
        Program { tree, root }
    }

    /// Wraps an existing tree rooted at `root`.
    pub fn from_parts(tree: OpTree, root: OpId) -> Program {
        Program { tree, root }
    }

    pub fn root_module(&self) -> ModuleOp {
        ModuleOp::wrap(self.root)
    }

    pub fn dump(&self) -> String {
        self.tree.dump(self.root)
    }
}

impl Default for Program {
    fn default() -> Self {
        Program::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_program_is_an_empty_module() {
        let program = Program::new();
        assert_eq!(program.dump(), "Module () -> ()\n");
        assert!(program.tree.is_live(program.root));
    }
}
