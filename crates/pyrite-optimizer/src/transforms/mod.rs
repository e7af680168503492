//! Concrete rewrite transforms and their factories.

mod erase_unused_functions;
mod erase_unused_ops;
mod fold_constants;
mod fold_control_flow_ops;
mod hoist_loop_invariants;
mod join_conditions_branches;
mod minimize_bool_expression;
mod ordering_commutativity_ops;
mod propagate_constants;
mod sink_control_flow_ops;
mod unswitch_loops;

use crate::transform::{CascadeTransform, Transform};

pub use erase_unused_functions::EraseUnusedFunctions;
pub use erase_unused_ops::EraseUnusedOps;
pub use fold_constants::FoldConstants;
pub use fold_control_flow_ops::FoldControlFlowOps;
pub use hoist_loop_invariants::HoistLoopInvariants;
pub use join_conditions_branches::JoinConditionsBranches;
pub use minimize_bool_expression::MinimizeBoolExpression;
pub use ordering_commutativity_ops::OrderingCommutativityOps;
pub use propagate_constants::PropagateConstants;
pub use sink_control_flow_ops::SinkControlFlowOps;
pub use unswitch_loops::UnswitchLoops;

pub fn create_fold_constants() -> Box<dyn Transform> {
    Box::new(FoldConstants)
}

pub fn create_erase_unused_ops() -> Box<dyn Transform> {
    Box::new(EraseUnusedOps)
}

pub fn create_fold_control_flow_ops() -> Box<dyn Transform> {
    Box::new(FoldControlFlowOps)
}

pub fn create_minimize_bool_expression() -> Box<dyn Transform> {
    Box::new(MinimizeBoolExpression)
}

pub fn create_ordering_commutativity_ops() -> Box<dyn Transform> {
    Box::new(OrderingCommutativityOps)
}

pub fn create_propagate_constants() -> Box<dyn Transform> {
    Box::new(PropagateConstants)
}

pub fn create_sink_control_flow_ops() -> Box<dyn Transform> {
    Box::new(SinkControlFlowOps)
}

pub fn create_join_conditions_branches() -> Box<dyn Transform> {
    Box::new(JoinConditionsBranches)
}

pub fn create_hoist_loop_invariants() -> Box<dyn Transform> {
    Box::new(HoistLoopInvariants)
}

pub fn create_unswitch_loops() -> Box<dyn Transform> {
    Box::new(UnswitchLoops)
}

pub fn create_erase_unused_functions() -> Box<dyn Transform> {
    Box::new(EraseUnusedFunctions)
}

/// The default pipeline: a canonicalizer cascade (folding, boolean
/// minimization, operand normalization, control-flow folding, dead-op
/// erasure) followed by call-graph pruning.
pub fn create_canonicalizer() -> Box<dyn Transform> {
    Box::new(
        CascadeTransform::new("Canonicalizer")
            .add(create_fold_constants())
            .add(create_minimize_bool_expression())
            .add(create_ordering_commutativity_ops())
            .add(create_propagate_constants())
            .add(create_fold_control_flow_ops())
            .add(create_join_conditions_branches())
            .add(create_erase_unused_ops()),
    )
}
