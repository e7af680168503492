//! Generic operations and the arena that owns them.
//!
//! [`OpTree`] is the single owner of every operation and value of one
//! program. Handles ([`OpId`], [`ValueId`]) are indices into the arena;
//! erased entities leave tombstone slots behind, which are never reused
//! within one tree, so a stale handle held by an optimizer worklist is
//! detectable with [`OpTree::is_live`] instead of dangling. All mutations
//! go through `OpTree` methods so the def-use invariants hold after every
//! step:
//!
//! - an operand slot `(user, k)` referring to value `v` is mirrored by
//!   exactly one `Use { user, k }` entry on `v`;
//! - results and inwards are owned by their operation and must be unused
//!   before the operation can be erased;
//! - children carry a `parent` back-reference consistent with their
//!   position in the parent's body.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::attribute::Attribute;
use crate::ops::OpKind;
use crate::types::Type;
use crate::value::{Use, Value, ValueId, ValueOrigin};

/// Stable operation handle into an operation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpId(pub u32);

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A generic operation node.
///
/// Carries the spec id ([`OpKind`]), the operand references, the owned
/// result and inward values, the attribute list, the parent back-reference,
/// and the ordered body of child operations.
#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OpKind,
    pub operands: SmallVec<[ValueId; 2]>,
    pub results: SmallVec<[ValueId; 1]>,
    pub inwards: SmallVec<[ValueId; 1]>,
    pub attributes: SmallVec<[Attribute; 2]>,
    pub parent: Option<OpId>,
    pub body: Vec<OpId>,
}

impl Operation {
    fn new(kind: OpKind) -> Self {
        Operation {
            kind,
            operands: SmallVec::new(),
            results: SmallVec::new(),
            inwards: SmallVec::new(),
            attributes: SmallVec::new(),
            parent: None,
            body: Vec::new(),
        }
    }

    /// Stable operation name used by the textual dump.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Arena owning every operation and value of one program.
#[derive(Debug, Default)]
pub struct OpTree {
    ops: Vec<Option<Operation>>,
    values: Vec<Option<Value>>,
}

impl OpTree {
    pub fn new() -> Self {
        OpTree::default()
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Creates a detached operation of the given kind. Attach it with
    /// [`OpTree::add_to_body`] or through a builder cursor.
    pub fn new_op(&mut self, kind: OpKind) -> OpId {
        let id = OpId(self.ops.len() as u32);
        self.ops.push(Some(Operation::new(kind)));
        id
    }

    /// Creates a new result value on `op` and returns it.
    pub fn add_result(&mut self, op: OpId, ty: Type) -> ValueId {
        let index = self.op(op).results.len();
        let value = self.new_value(Value::new(ty, op, ValueOrigin::Result(index)));
        self.op_mut(op).results.push(value);
        value
    }

    /// Creates a new inward (block argument) value on `op` and returns it.
    pub fn add_inward(&mut self, op: OpId, ty: Type) -> ValueId {
        let index = self.op(op).inwards.len();
        let value = self.new_value(Value::new(ty, op, ValueOrigin::Inward(index)));
        self.op_mut(op).inwards.push(value);
        value
    }

    fn new_value(&mut self, value: Value) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(Some(value));
        id
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    /// `true` while the operation has not been erased.
    pub fn is_live(&self, op: OpId) -> bool {
        self.ops
            .get(op.0 as usize)
            .is_some_and(|slot| slot.is_some())
    }

    pub fn op(&self, op: OpId) -> &Operation {
        self.ops[op.0 as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("operation #{op} accessed after erasure"))
    }

    pub fn op_mut(&mut self, op: OpId) -> &mut Operation {
        self.ops[op.0 as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("operation #{op} accessed after erasure"))
    }

    pub fn value(&self, value: ValueId) -> &Value {
        self.values[value.0 as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("value #{value} accessed after erasure"))
    }

    fn value_mut(&mut self, value: ValueId) -> &mut Value {
        self.values[value.0 as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("value #{value} accessed after erasure"))
    }

    pub fn value_type(&self, value: ValueId) -> &Type {
        &self.value(value).ty
    }

    pub fn value_owner(&self, value: ValueId) -> OpId {
        self.value(value).owner
    }

    pub fn uses(&self, value: ValueId) -> &[Use] {
        &self.value(value).uses
    }

    pub fn value_has_type(&self, value: ValueId, ty: &Type) -> bool {
        self.value_type(value) == ty
    }

    pub fn values_same_type(&self, a: ValueId, b: ValueId) -> bool {
        self.value_type(a) == self.value_type(b)
    }

    /// `true` if `pointer` has a pointer type whose pointee equals the type
    /// of `pointee`.
    pub fn value_can_point_to(&self, pointer: ValueId, pointee: ValueId) -> bool {
        self.value_type(pointer).can_point_to(self.value_type(pointee))
    }

    pub fn operand(&self, op: OpId, index: usize) -> ValueId {
        self.op(op).operands[index]
    }

    pub fn result(&self, op: OpId, index: usize) -> ValueId {
        self.op(op).results[index]
    }

    pub fn inward(&self, op: OpId, index: usize) -> ValueId {
        self.op(op).inwards[index]
    }

    pub fn attr(&self, op: OpId, index: usize) -> &Attribute {
        &self.op(op).attributes[index]
    }

    /// Index of `op` in its parent's body, if attached.
    pub fn position_in_parent(&self, op: OpId) -> Option<usize> {
        let parent = self.op(op).parent?;
        self.op(parent).body.iter().position(|&child| child == op)
    }

    // -----------------------------------------------------------------------
    // Operand and body mutation
    // -----------------------------------------------------------------------

    /// Appends an operand and installs the matching use entry on `value`.
    pub fn add_operand(&mut self, op: OpId, value: ValueId) {
        let operand_number = self.op(op).operands.len();
        self.op_mut(op).operands.push(value);
        self.value_mut(value).uses.push(Use {
            user: op,
            operand_number,
        });
    }

    /// Reassigns operand `index` of `op`: the use entry moves from the old
    /// value to the new one.
    pub fn set_operand(&mut self, op: OpId, index: usize, value: ValueId) {
        let old = self.op(op).operands[index];
        if old == value {
            return;
        }
        self.remove_use(old, op, index);
        self.op_mut(op).operands[index] = value;
        self.value_mut(value).uses.push(Use {
            user: op,
            operand_number: index,
        });
    }

    /// Removes operand `index` of `op`, compacting the operand list and
    /// renumbering the use entries of the operands that follow it.
    pub fn erase_operand(&mut self, op: OpId, index: usize) {
        let value = self.op(op).operands[index];
        self.remove_use(value, op, index);
        self.op_mut(op).operands.remove(index);
        let followers: Vec<(usize, ValueId)> = self.op(op).operands[index..]
            .iter()
            .copied()
            .enumerate()
            .map(|(offset, v)| (index + offset, v))
            .collect();
        for (new_number, follower) in followers {
            for entry in &mut self.value_mut(follower).uses {
                if entry.user == op && entry.operand_number == new_number + 1 {
                    entry.operand_number = new_number;
                    break;
                }
            }
        }
    }

    fn remove_use(&mut self, value: ValueId, user: OpId, operand_number: usize) {
        let uses = &mut self.value_mut(value).uses;
        if let Some(position) = uses
            .iter()
            .position(|entry| entry.user == user && entry.operand_number == operand_number)
        {
            uses.swap_remove(position);
        }
    }

    /// Appends `child` to the body of `parent` and wires its back-reference.
    pub fn add_to_body(&mut self, parent: OpId, child: OpId) {
        self.op_mut(parent).body.push(child);
        self.op_mut(child).parent = Some(parent);
    }

    /// Inserts `child` into the body of `parent` before position `index`.
    pub fn insert_into_body(&mut self, parent: OpId, index: usize, child: OpId) {
        self.op_mut(parent).body.insert(index, child);
        self.op_mut(child).parent = Some(parent);
    }

    /// Unlinks `op` from its parent's body without destroying it.
    pub fn detach(&mut self, op: OpId) {
        if let Some(position) = self.position_in_parent(op) {
            let parent = self.op(op).parent.unwrap();
            self.op_mut(parent).body.remove(position);
            self.op_mut(op).parent = None;
        }
    }

    // -----------------------------------------------------------------------
    // Erasure
    // -----------------------------------------------------------------------

    /// Recursively erases `op`: children first (in reverse order), then the
    /// operation itself. Outbound operand uses are revoked before the slot
    /// becomes a tombstone.
    ///
    /// # Panics
    ///
    /// Panics if any result or inward of an erased operation still has
    /// uses; callers must rewire or erase the users first.
    pub fn erase_op(&mut self, op: OpId) {
        let children: Vec<OpId> = self.op(op).body.iter().rev().copied().collect();
        for child in children {
            self.erase_op(child);
        }
        self.erase_single(op);
    }

    /// Erases a single operation whose body is already empty; rewrite
    /// drivers that erase children themselves (to observe each erasure) end
    /// with this.
    pub fn erase_single(&mut self, op: OpId) {
        assert!(
            self.op(op).body.is_empty(),
            "{} operation erased with a non-empty body",
            self.op(op).name()
        );
        for index in 0..self.op(op).results.len() {
            let result = self.op(op).results[index];
            if !self.uses(result).is_empty() {
                panic!(
                    "{} operation cannot be erased: its results still have uses",
                    self.op(op).name()
                );
            }
        }
        for index in 0..self.op(op).inwards.len() {
            let inward = self.op(op).inwards[index];
            if !self.uses(inward).is_empty() {
                panic!(
                    "{} operation cannot be erased: its inwards still have uses",
                    self.op(op).name()
                );
            }
        }
        let operands: Vec<ValueId> = self.op(op).operands.iter().copied().collect();
        for (index, operand) in operands.into_iter().enumerate() {
            self.remove_use(operand, op, index);
        }
        self.detach(op);
        let owned: Vec<ValueId> = self
            .op(op)
            .results
            .iter()
            .chain(self.op(op).inwards.iter())
            .copied()
            .collect();
        for value in owned {
            self.values[value.0 as usize] = None;
        }
        self.ops[op.0 as usize] = None;
    }

    // -----------------------------------------------------------------------
    // Cloning and traversal
    // -----------------------------------------------------------------------

    /// Deep-clones `source` and its body. The clone is detached; operand
    /// references into the cloned subtree are remapped onto the fresh
    /// values, references to outside values gain new use entries.
    pub fn clone_subtree(&mut self, source: OpId) -> OpId {
        let mut value_map = HashMap::new();
        self.clone_rec(source, &mut value_map)
    }

    fn clone_rec(&mut self, source: OpId, value_map: &mut HashMap<ValueId, ValueId>) -> OpId {
        let template = self.op(source).clone();
        let clone = self.new_op(template.kind);
        self.op_mut(clone).attributes = template.attributes.clone();
        for &result in &template.results {
            let ty = self.value_type(result).clone();
            let fresh = self.add_result(clone, ty);
            value_map.insert(result, fresh);
        }
        for &inward in &template.inwards {
            let ty = self.value_type(inward).clone();
            let fresh = self.add_inward(clone, ty);
            value_map.insert(inward, fresh);
        }
        for &operand in &template.operands {
            let target = value_map.get(&operand).copied().unwrap_or(operand);
            self.add_operand(clone, target);
        }
        for &child in &template.body {
            let child_clone = self.clone_rec(child, value_map);
            self.add_to_body(clone, child_clone);
        }
        clone
    }

    /// Post-order walk over `root` and its descendants: children before
    /// their parent, siblings in body order.
    pub fn walk_post_order(&self, root: OpId, visit: &mut impl FnMut(OpId)) {
        let children: Vec<OpId> = self.op(root).body.clone();
        for child in children {
            self.walk_post_order(child, visit);
        }
        visit(root);
    }

    /// Checks the def-use and parent-link invariants over `root` and its
    /// descendants.
    ///
    /// # Panics
    ///
    /// Panics on the first violated invariant; meant for tests and for
    /// debug builds of the pass driver.
    pub fn assert_consistency(&self, root: OpId) {
        self.walk_post_order(root, &mut |op| {
            let node = self.op(op);
            for (index, &operand) in node.operands.iter().enumerate() {
                let matching = self
                    .uses(operand)
                    .iter()
                    .filter(|entry| entry.user == op && entry.operand_number == index)
                    .count();
                assert_eq!(
                    matching, 1,
                    "operand {index} of {} #{op} must have exactly one matching use entry",
                    node.name()
                );
            }
            for &value in node.results.iter().chain(node.inwards.iter()) {
                assert_eq!(
                    self.value_owner(value),
                    op,
                    "owned value of {} #{op} must point back at its owner",
                    node.name()
                );
                for entry in self.uses(value) {
                    let user = self.op(entry.user);
                    assert!(
                        user.operands.get(entry.operand_number) == Some(&value),
                        "use entry of a value owned by {} #{op} must point at an operand slot holding it",
                        node.name()
                    );
                }
            }
            for &child in &node.body {
                assert_eq!(
                    self.op(child).parent,
                    Some(op),
                    "child of {} #{op} must carry it as parent",
                    node.name()
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Use;

    fn small_tree() -> (OpTree, OpId, OpId, OpId) {
        let mut tree = OpTree::new();
        let module = tree.new_op(OpKind::Module);
        let func = tree.new_op(OpKind::Function);
        tree.add_to_body(module, func);
        let constant = tree.new_op(OpKind::Constant);
        tree.add_result(constant, Type::int64());
        tree.add_to_body(func, constant);
        (tree, module, func, constant)
    }

    #[test]
    fn add_operand_installs_use() {
        let (mut tree, _, func, constant) = small_tree();
        let user = tree.new_op(OpKind::Return);
        tree.add_to_body(func, user);
        let value = tree.result(constant, 0);
        tree.add_operand(user, value);
        assert_eq!(
            tree.uses(value),
            &[Use {
                user,
                operand_number: 0
            }]
        );
    }

    #[test]
    fn set_operand_moves_use() {
        let (mut tree, _, func, constant) = small_tree();
        let other = tree.new_op(OpKind::Constant);
        tree.add_result(other, Type::int64());
        tree.add_to_body(func, other);
        let user = tree.new_op(OpKind::Return);
        tree.add_to_body(func, user);

        let first = tree.result(constant, 0);
        let second = tree.result(other, 0);
        tree.add_operand(user, first);
        tree.set_operand(user, 0, second);

        assert!(tree.uses(first).is_empty());
        assert_eq!(
            tree.uses(second),
            &[Use {
                user,
                operand_number: 0
            }]
        );
        assert_eq!(tree.operand(user, 0), second);
    }

    #[test]
    fn erase_operand_renumbers_following_uses() {
        let (mut tree, _, func, constant) = small_tree();
        let other = tree.new_op(OpKind::Constant);
        tree.add_result(other, Type::int64());
        tree.add_to_body(func, other);
        let user = tree.new_op(OpKind::Print);
        tree.add_to_body(func, user);

        let first = tree.result(constant, 0);
        let second = tree.result(other, 0);
        tree.add_operand(user, first);
        tree.add_operand(user, second);
        tree.erase_operand(user, 0);

        assert!(tree.uses(first).is_empty());
        assert_eq!(
            tree.uses(second),
            &[Use {
                user,
                operand_number: 0
            }]
        );
        assert_eq!(tree.op(user).operands.len(), 1);
        assert_eq!(tree.operand(user, 0), second);
    }

    #[test]
    fn children_know_their_position() {
        let (tree, module, func, constant) = small_tree();
        assert_eq!(tree.position_in_parent(func), Some(0));
        assert_eq!(tree.position_in_parent(constant), Some(0));
        assert_eq!(tree.position_in_parent(module), None);
        assert_eq!(tree.op(constant).parent, Some(func));
    }

    #[test]
    fn erase_is_recursive_and_revokes_outbound_uses() {
        let (mut tree, _, func, constant) = small_tree();
        let user = tree.new_op(OpKind::Print);
        tree.add_to_body(func, user);
        let value = tree.result(constant, 0);
        tree.add_operand(user, value);

        // Erasing the whole function erases the print first, which revokes
        // the use on the constant's result, letting the constant go too.
        tree.erase_op(func);
        assert!(!tree.is_live(func));
        assert!(!tree.is_live(constant));
        assert!(!tree.is_live(user));
    }

    #[test]
    #[should_panic(expected = "results still have uses")]
    fn erase_with_live_uses_is_rejected() {
        let (mut tree, _, func, constant) = small_tree();
        let user = tree.new_op(OpKind::Return);
        tree.add_to_body(func, user);
        tree.add_operand(user, tree.result(constant, 0));
        tree.erase_op(constant);
    }

    #[test]
    fn clone_subtree_remaps_internal_references() {
        let (mut tree, _, func, constant) = small_tree();
        let user = tree.new_op(OpKind::Return);
        tree.add_to_body(func, user);
        tree.add_operand(user, tree.result(constant, 0));

        let clone = tree.clone_subtree(func);
        let cloned_constant = tree.op(clone).body[0];
        let cloned_user = tree.op(clone).body[1];
        assert_eq!(
            tree.operand(cloned_user, 0),
            tree.result(cloned_constant, 0)
        );
        // The original constant picked up no extra uses.
        assert_eq!(tree.uses(tree.result(constant, 0)).len(), 1);
    }

    #[test]
    fn clone_subtree_preserves_external_references() {
        let (mut tree, _, func, constant) = small_tree();
        let user = tree.new_op(OpKind::Return);
        tree.add_to_body(func, user);
        let external = tree.result(constant, 0);
        tree.add_operand(user, external);

        let clone = tree.clone_subtree(user);
        assert_eq!(tree.operand(clone, 0), external);
        assert_eq!(tree.uses(external).len(), 2);
    }

    #[test]
    fn post_order_visits_children_first() {
        let (tree, module, func, constant) = small_tree();
        let mut order = Vec::new();
        tree.walk_post_order(module, &mut |op| order.push(op));
        assert_eq!(order, vec![constant, func, module]);
    }

    #[test]
    fn tombstones_are_observable() {
        let (mut tree, _, func, _) = small_tree();
        assert!(tree.is_live(func));
        tree.erase_op(func);
        assert!(!tree.is_live(func));
    }
}
