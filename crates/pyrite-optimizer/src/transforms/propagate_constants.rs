//! Store-to-load constant forwarding within nested scopes.
//!
//! Each scoped operation (`Function`, `If`, `Then`, `Else`, `For`, `While`)
//! opens a map from address to the latest stored constant value. A `Store`
//! of a constant records the binding; a `Store` of anything else drops the
//! address everywhere. A `Load` from a recorded address rewires every use
//! of its result to the constant directly. When a scope closes, addresses
//! it stored to are invalidated in the outer scopes too: the store may have
//! run conditionally.

use std::collections::{HashMap, HashSet};

use pyrite_core::{
    ConstantOp, Inserter, LoadOp, OpAdaptor, OpId, OpKind, OpTree, StoreOp, ValueId,
};

use crate::opt_builder::OptBuilder;
use crate::transform::Transform;

pub struct PropagateConstants;

impl Transform for PropagateConstants {
    fn name(&self) -> &'static str {
        "PropagateConstants"
    }

    fn can_run(&self, tree: &OpTree, op: OpId) -> bool {
        tree.op(op).kind == OpKind::Function
    }

    fn run(&self, op: OpId, builder: &mut OptBuilder) {
        let mut ctx = PropagationContext {
            builder,
            scopes: Vec::new(),
        };
        ctx.traverse(op);
    }
}

fn is_scoped(kind: OpKind) -> bool {
    matches!(
        kind,
        OpKind::Function | OpKind::If | OpKind::Then | OpKind::Else | OpKind::For | OpKind::While
    )
}

struct Scope {
    /// Address → latest stored constant value.
    bindings: HashMap<ValueId, ValueId>,
    /// Every address this scope stored to, constant or not.
    stored: HashSet<ValueId>,
}

struct PropagationContext<'a, 't, 'l> {
    builder: &'a mut OptBuilder<'t, 'l>,
    scopes: Vec<Scope>,
}

impl PropagationContext<'_, '_, '_> {
    fn traverse(&mut self, op: OpId) {
        if !is_scoped(self.builder.tree().op(op).kind) {
            return;
        }
        self.scopes.push(Scope {
            bindings: HashMap::new(),
            stored: HashSet::new(),
        });
        let children: Vec<OpId> = self.builder.tree().op(op).body.clone();
        for child in children {
            if !self.builder.tree().is_live(child) {
                continue;
            }
            match self.builder.tree().op(child).kind {
                OpKind::Store => {
                    self.record_store(StoreOp::wrap(child));
                    continue;
                }
                OpKind::Load => {
                    self.forward_load(LoadOp::wrap(child));
                }
                _ => {}
            }
            self.traverse(child);
        }
        if let Some(closed) = self.scopes.pop() {
            for address in closed.stored {
                for scope in &mut self.scopes {
                    scope.bindings.remove(&address);
                }
            }
        }
    }

    fn record_store(&mut self, store: StoreOp) {
        let tree = self.builder.tree();
        let address = store.dst(tree);
        let value = store.value(tree);
        let is_constant = tree.value_owner_as::<ConstantOp>(value).is_some();
        if is_constant {
            if let Some(scope) = self.scopes.last_mut() {
                scope.bindings.insert(address, value);
            }
        } else {
            for scope in &mut self.scopes {
                scope.bindings.remove(&address);
            }
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.stored.insert(address);
        }
    }

    fn forward_load(&mut self, load: LoadOp) {
        let tree = self.builder.tree();
        let address = load.src(tree);
        let Some(constant) = self
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(&address).copied())
        else {
            return;
        };
        let result = load.result(tree);
        self.builder.replace_all_uses(result, constant);
    }
}
