pub mod driver;
pub mod opt_builder;
pub mod transform;
pub mod transforms;

// Re-export commonly used types
pub use driver::{run_to_fixpoint, Optimizer};
pub use opt_builder::{NullListener, OptBuilder, RewriteListener};
pub use transform::{CascadeTransform, Transform, DEFAULT_ITER_LIMIT};
pub use transforms::{
    create_canonicalizer, create_erase_unused_functions, create_erase_unused_ops,
    create_fold_constants, create_fold_control_flow_ops, create_hoist_loop_invariants,
    create_join_conditions_branches, create_minimize_bool_expression,
    create_ordering_commutativity_ops, create_propagate_constants, create_sink_control_flow_ops,
    create_unswitch_loops,
};
