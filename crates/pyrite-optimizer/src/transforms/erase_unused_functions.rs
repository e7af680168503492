//! Call-graph pruning: functions unreachable from `main` are erased.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;

use pyrite_core::{FunctionCallOp, FunctionOp, Inserter, OpId, OpKind, OpTree};

use crate::opt_builder::OptBuilder;
use crate::transform::Transform;

pub struct EraseUnusedFunctions;

impl Transform for EraseUnusedFunctions {
    fn name(&self) -> &'static str {
        "EraseUnusedFunctions"
    }

    fn can_run(&self, tree: &OpTree, op: OpId) -> bool {
        tree.op(op).kind == OpKind::Module
    }

    fn run(&self, op: OpId, builder: &mut OptBuilder) {
        let tree = builder.tree();
        let mut call_graph: DiGraph<String, ()> = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
        let mut node_of = |graph: &mut DiGraph<String, ()>, name: &str| {
            *nodes
                .entry(name.to_owned())
                .or_insert_with(|| graph.add_node(name.to_owned()))
        };

        for &child in &tree.op(op).body {
            let Some(func) = tree.cast::<FunctionOp>(child) else {
                continue;
            };
            let caller = node_of(&mut call_graph, func.name(tree));
            collect_callees(tree, child, caller, &mut call_graph, &mut node_of);
        }

        let mut used: Vec<bool> = vec![false; call_graph.node_count()];
        if let Some(&main) = nodes.get("main") {
            let mut bfs = Bfs::new(&call_graph, main);
            while let Some(node) = bfs.next(&call_graph) {
                used[node.index()] = true;
            }
        }

        let children: Vec<OpId> = builder.tree().op(op).body.clone();
        for child in children {
            let Some(func) = builder.tree().cast::<FunctionOp>(child) else {
                continue;
            };
            let name = func.name(builder.tree()).to_owned();
            let reachable = nodes
                .get(&name)
                .is_some_and(|&node| used[node.index()]);
            if !reachable {
                builder.erase(child);
            }
        }
    }
}

fn collect_callees(
    tree: &OpTree,
    op: OpId,
    caller: NodeIndex,
    graph: &mut DiGraph<String, ()>,
    node_of: &mut impl FnMut(&mut DiGraph<String, ()>, &str) -> NodeIndex,
) {
    for &child in &tree.op(op).body {
        if let Some(call) = tree.cast::<FunctionCallOp>(child) {
            let callee = node_of(graph, call.callee_name(tree));
            graph.update_edge(caller, callee, ());
        }
        collect_callees(tree, child, caller, graph, node_of);
    }
}
