//! Lowering of the syntax tree into the operation tree.
//!
//! The converter walks the surface tree and emits operations into a fresh
//! module. Functions are registered in a first pass so calls may refer
//! forward; each function then lowers with a scope stack of named
//! variables. Local variables live behind `Allocate`d pointers and are
//! marked *needs-load*: reading one emits a `Load`, assigning one stores
//! through the pointer. Function parameters bind their inward value
//! directly and cannot be assigned.
//!
//! Numeric promotion inserts `ArithCast`s so binary operations always see
//! equal operand types; in assignments the cast is directed at the target
//! variable's type.
//!
//! Errors accumulate in a buffer; unrecoverable ones (an undeclared name in
//! value position, a type error) abort the walk, and the buffer is raised
//! either way.

use indexmap::IndexMap;

use pyrite_core::{
    deduce_target_cast_type, insert_numeric_cast, AllocateOp, ArithBinOpKind, ArithBinaryOp,
    Attribute, ConstantOp, ErrorBuffer, FunctionCallOp, FunctionOp, IfOp, InputOp, InsertPoint,
    Inserter, LoadOp, LogicBinOpKind, LogicBinaryOp, ModuleOp, OpAdaptor, OpId, OpKind, OpTree,
    PrintOp, Program, ReturnOp, StoreOp, Type, ValueId, WhileOp,
};

use crate::ast::{BinaryOpKind, Node, NodeKind, SyntaxTree};
use crate::error::ConverterError;
use crate::language;

/// The syntax-tree → operation-tree pass.
pub struct Converter;

impl Converter {
    pub fn process(syntax_tree: &SyntaxTree) -> Result<Program, ErrorBuffer<ConverterError>> {
        let mut ctx = ConverterContext::new();
        let walked = process_node(&syntax_tree.root, &mut ctx);
        if walked.is_err() || !ctx.errors.is_empty() {
            return Err(ctx.errors);
        }
        Ok(Program::from_parts(ctx.tree, ctx.root))
    }
}

/// Signals that the walk cannot continue; the real diagnostics are already
/// in the context's buffer.
struct Abort;

type Converted<T> = Result<T, Abort>;

#[derive(Debug, Clone, Copy)]
struct LocalVariable {
    value: ValueId,
    needs_load: bool,
}

struct ConverterContext {
    tree: OpTree,
    root: OpId,
    current: OpId,
    point: InsertPoint,
    functions: IndexMap<String, Type>,
    scopes: Vec<IndexMap<String, LocalVariable>>,
    errors: ErrorBuffer<ConverterError>,
}

impl Inserter for ConverterContext {
    fn tree(&self) -> &OpTree {
        &self.tree
    }

    fn tree_mut(&mut self) -> &mut OpTree {
        &mut self.tree
    }

    fn insert_op(&mut self, op: OpId) {
        self.tree
            .insert_into_body(self.point.parent, self.point.index, op);
        self.point.index += 1;
    }
}

impl ConverterContext {
    fn new() -> ConverterContext {
        let mut tree = OpTree::new();
        let root = ModuleOp::build_detached(&mut tree).op_id();
        let point = InsertPoint::at_body_end(&tree, root);
        ConverterContext {
            tree,
            root,
            current: root,
            point,
            functions: IndexMap::new(),
            scopes: Vec::new(),
            errors: ErrorBuffer::new(),
        }
    }

    fn go_into(&mut self, op: OpId) {
        self.current = op;
        self.point = InsertPoint::at_body_end(&self.tree, op);
    }

    fn go_parent(&mut self) {
        if let Some(parent) = self.tree.op(self.current).parent {
            self.go_into(parent);
        }
    }

    fn enter_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    fn save_variable(&mut self, name: &str, value: ValueId, needs_load: bool) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_owned(), LocalVariable { value, needs_load });
        }
    }

    fn find_variable(&self, name: &str) -> Option<LocalVariable> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn would_be_redeclaration(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(name))
    }

    fn push_error(&mut self, node: &Node, message: impl Into<String>) {
        self.errors
            .push(ConverterError::new(node.source_ref, message));
    }
}

fn pretty_type_name(ty: &Type) -> &'static str {
    if ty.is_none() {
        "None"
    } else if ty.is_bool() {
        "bool"
    } else if ty.is_integer() {
        "int"
    } else if ty.is_float() {
        "float"
    } else if ty.is_str() {
        "str"
    } else if ty.is_function() {
        "<internal-function-type>"
    } else if let Some(pointee) = ty.pointee() {
        pretty_type_name(pointee)
    } else {
        "<undefined-type>"
    }
}

fn is_input_call(node: &Node) -> bool {
    node.kind == NodeKind::FunctionCall
        && node
            .first_child()
            .and_then(Node::str)
            .is_some_and(|name| name == language::FUNC_INPUT)
}

/// Helpers that report malformed nodes (missing payloads or children)
/// instead of panicking; a malformed tree is a converter error too.
fn expect_str<'n>(node: &'n Node, ctx: &mut ConverterContext) -> Converted<&'n str> {
    match node.str() {
        Some(value) => Ok(value),
        None => {
            ctx.push_error(node, "unsupported expression type");
            Err(Abort)
        }
    }
}

fn expect_child<'n>(node: &'n Node, index: usize, ctx: &mut ConverterContext) -> Converted<&'n Node> {
    match node.children.get(index) {
        Some(child) => Ok(child),
        None => {
            ctx.push_error(node, "unsupported expression type");
            Err(Abort)
        }
    }
}

fn expect_type(node: &Node, ctx: &mut ConverterContext) -> Converted<Type> {
    match node.type_name() {
        Some(name) => Ok(name.to_type()),
        None => {
            ctx.push_error(node, "unsupported expression type");
            Err(Abort)
        }
    }
}

fn create_input_op(var_name_node: &Node, ctx: &mut ConverterContext) {
    let Some(name) = var_name_node.str() else {
        ctx.push_error(var_name_node, "unsupported expression type");
        return;
    };
    let name = name.to_owned();
    let Some(var) = ctx.find_variable(&name) else {
        ctx.push_error(
            var_name_node,
            format!("variable was not declared in this scope: {name}"),
        );
        return;
    };
    if !var.needs_load {
        ctx.push_error(var_name_node, format!("variable cannot be modified: {name}"));
        return;
    }
    InputOp::build(ctx, var.value);
}

fn process_program_root(node: &Node, ctx: &mut ConverterContext) -> Converted<()> {
    // First pass: register every function's return type so calls may refer
    // forward.
    for child in &node.children {
        let name = expect_str(expect_child(child, 0, ctx)?, ctx)?.to_owned();
        let return_type = expect_type(expect_child(child, 2, ctx)?, ctx)?;
        ctx.functions.insert(name, return_type);
    }
    for child in &node.children {
        process_node(child, ctx)?;
    }
    Ok(())
}

fn process_function_definition(node: &Node, ctx: &mut ConverterContext) -> Converted<()> {
    let name = expect_str(expect_child(node, 0, ctx)?, ctx)?.to_owned();
    let mut argument_types = Vec::new();
    let mut argument_names = Vec::new();
    for arg_node in &expect_child(node, 1, ctx)?.children {
        argument_types.push(expect_type(expect_child(arg_node, 0, ctx)?, ctx)?);
        argument_names.push(expect_str(expect_child(arg_node, 1, ctx)?, ctx)?.to_owned());
    }
    let return_type = expect_type(expect_child(node, 2, ctx)?, ctx)?;
    let func_type = Type::function(argument_types, return_type.clone());
    let func = FunctionOp::build(ctx, &name, func_type);
    ctx.go_into(func.op_id());
    ctx.enter_scope();
    for (index, arg_name) in argument_names.iter().enumerate() {
        let inward = func.inward(&ctx.tree, index);
        ctx.save_variable(arg_name, inward, false);
    }
    process_node(expect_child(node, 3, ctx)?, ctx)?;
    // Append the implicit return when control falls off the end.
    let falls_off = ctx
        .tree
        .op(func.op_id())
        .body
        .last()
        .map_or(true, |&last| ctx.tree.op(last).kind != OpKind::Return);
    if falls_off && return_type.is_none() {
        ReturnOp::build(ctx);
    }
    ctx.exit_scope();
    ctx.go_parent();
    Ok(())
}

fn process_branch_root(node: &Node, ctx: &mut ConverterContext) -> Converted<()> {
    ctx.enter_scope();
    for child in &node.children {
        process_node(child, ctx)?;
    }
    ctx.exit_scope();
    Ok(())
}

fn process_variable_declaration(node: &Node, ctx: &mut ConverterContext) -> Converted<()> {
    let name_node = expect_child(node, 1, ctx)?;
    let name = expect_str(name_node, ctx)?.to_owned();
    if ctx.would_be_redeclaration(&name) {
        ctx.push_error(node, format!("variable is already declared: {name}"));
        return Ok(());
    }
    let ty = expect_type(expect_child(node, 0, ctx)?, ctx)?;
    let alloc = AllocateOp::build(ctx, Type::pointer(ty.clone()));
    let pointer = alloc.result(&ctx.tree);
    ctx.save_variable(&name, pointer, true);
    if node.children.len() == 3 {
        let def_node = expect_child(node, 2, ctx)?;
        if def_node.kind == NodeKind::Expression
            && def_node.first_child().is_some_and(is_input_call)
        {
            create_input_op(name_node, ctx);
            return Ok(());
        }
        let mut value = visit_operand(def_node, ctx)?;
        if !ctx.tree.value_has_type(value, &ty) {
            if let Some(cast) = insert_numeric_cast(ctx, &ty, value) {
                value = cast.result(&ctx.tree);
            }
        }
        StoreOp::build(ctx, pointer, value);
    }
    Ok(())
}

fn process_return_statement(node: &Node, ctx: &mut ConverterContext) -> Converted<()> {
    if node.children.is_empty() {
        ReturnOp::build(ctx);
    } else {
        let value = visit_operand(expect_child(node, 0, ctx)?, ctx)?;
        ReturnOp::build_value(ctx, value);
    }
    Ok(())
}

fn process_while_statement(node: &Node, ctx: &mut ConverterContext) -> Converted<()> {
    let while_op = WhileOp::build(ctx);
    let condition = while_op
        .condition_op(&ctx.tree)
        .expect("While is created with its Condition header");
    ctx.go_into(condition.op_id());
    visit_operand(expect_child(node, 0, ctx)?, ctx)?;
    ctx.go_parent();
    process_node(expect_child(node, 1, ctx)?, ctx)?;
    ctx.go_parent();
    Ok(())
}

fn process_if_statement(node: &Node, ctx: &mut ConverterContext) -> Converted<()> {
    let cond = visit_operand(expect_child(node, 0, ctx)?, ctx)?;
    let with_else = node.children.len() > 2;
    let mut if_op = IfOp::build(ctx, cond, with_else);
    let then_op = if_op
        .then_op(&ctx.tree)
        .expect("If is created with its Then branch");
    ctx.go_into(then_op.op_id());
    process_node(expect_child(node, 1, ctx)?, ctx)?;
    ctx.go_parent();
    let mut depth = 0usize;
    let total = node.children.len();
    for (index, el_node) in node.children.iter().enumerate().skip(2) {
        depth += 1;
        let else_op = if_op
            .else_op(&ctx.tree)
            .expect("elif/else lowering requires the enclosing If to carry an Else");
        ctx.go_into(else_op.op_id());
        match el_node.kind {
            NodeKind::ElseStatement => {
                process_node(expect_child(el_node, 0, ctx)?, ctx)?;
            }
            NodeKind::ElifStatement => {
                let elif_cond = visit_operand(expect_child(el_node, 0, ctx)?, ctx)?;
                let with_else = index + 1 < total;
                if_op = IfOp::build(ctx, elif_cond, with_else);
                depth += 1;
                let then_op = if_op
                    .then_op(&ctx.tree)
                    .expect("If is created with its Then branch");
                ctx.go_into(then_op.op_id());
                process_node(expect_child(el_node, 1, ctx)?, ctx)?;
                ctx.go_parent();
            }
            _ => {
                ctx.push_error(el_node, "unsupported expression type");
                return Err(Abort);
            }
        }
    }
    for _ in 0..depth {
        ctx.go_parent();
    }
    ctx.go_parent();
    Ok(())
}

fn visit_binary_operation(
    node: &Node,
    ctx: &mut ConverterContext,
    is_statement: bool,
) -> Converted<Option<ValueId>> {
    let Some(bin_op) = node.bin_op() else {
        ctx.push_error(node, "unsupported expression type");
        return Err(Abort);
    };
    let lhs_node = expect_child(node, 0, ctx)?;
    let rhs_node = expect_child(node, 1, ctx)?;

    // `x = input()` lowers to an Input on the variable's pointer; it is
    // only legal as an isolated statement.
    if is_statement
        && bin_op.is_assignment()
        && lhs_node.kind == NodeKind::VariableName
        && is_input_call(rhs_node)
    {
        create_input_op(lhs_node, ctx);
        return Ok(None);
    }

    let mut lhs = if bin_op.is_assignment() && lhs_node.kind == NodeKind::VariableName {
        // L-value position: the variable's pointer, no load.
        let name = expect_str(lhs_node, ctx)?.to_owned();
        match ctx.find_variable(&name) {
            Some(var) => var.value,
            None => {
                ctx.push_error(
                    lhs_node,
                    format!("variable was not declared in this scope: {name}"),
                );
                return Err(Abort);
            }
        }
    } else {
        visit_operand(lhs_node, ctx)?
    };
    let mut rhs = visit_operand(rhs_node, ctx)?;

    let mut lhs_type = ctx.tree.value_type(lhs).clone();
    let rhs_type = ctx.tree.value_type(rhs).clone();
    if bin_op.is_assignment() {
        match lhs_type.pointee() {
            Some(pointee) => lhs_type = pointee.clone(),
            None => ctx.push_error(
                node,
                "left-handed operand of an assignment expression must be a variable name",
            ),
        }
    }
    let type_error = |ty: &Type| {
        format!(
            "unexpected expression type: {}, supported types are: int, bool, float",
            pretty_type_name(ty)
        )
    };
    if !lhs_type.is_numeric() {
        let message = type_error(&lhs_type);
        ctx.push_error(node, message);
        return Err(Abort);
    }
    if !rhs_type.is_numeric() {
        let message = type_error(&rhs_type);
        ctx.push_error(node, message);
        return Err(Abort);
    }
    if lhs_type != rhs_type {
        if let Some(target) =
            deduce_target_cast_type(&lhs_type, &rhs_type, bin_op.is_assignment())
        {
            if let Some(cast) = insert_numeric_cast(ctx, &target, lhs) {
                lhs = cast.result(&ctx.tree);
            }
            if let Some(cast) = insert_numeric_cast(ctx, &target, rhs) {
                rhs = cast.result(&ctx.tree);
            }
        }
    }

    let arith = |ctx: &mut ConverterContext, kind_i: ArithBinOpKind, kind_f: ArithBinOpKind, lhs, rhs| {
        let kind = if ctx.tree.value_type(lhs).is_integer() {
            kind_i
        } else {
            kind_f
        };
        Some(ArithBinaryOp::build_infer(ctx, kind, lhs, rhs).result(&ctx.tree))
    };
    let logic = |ctx: &mut ConverterContext, kind_i: LogicBinOpKind, kind_f: LogicBinOpKind, lhs, rhs| {
        let kind = if ctx.tree.value_type(lhs).is_integer() {
            kind_i
        } else {
            kind_f
        };
        Some(LogicBinaryOp::build(ctx, kind, lhs, rhs).result(&ctx.tree))
    };

    let result = match bin_op {
        BinaryOpKind::Add => arith(ctx, ArithBinOpKind::AddI, ArithBinOpKind::AddF, lhs, rhs),
        BinaryOpKind::Sub => arith(ctx, ArithBinOpKind::SubI, ArithBinOpKind::SubF, lhs, rhs),
        BinaryOpKind::Mult => arith(ctx, ArithBinOpKind::MulI, ArithBinOpKind::MulF, lhs, rhs),
        BinaryOpKind::Div => arith(ctx, ArithBinOpKind::DivI, ArithBinOpKind::DivF, lhs, rhs),
        BinaryOpKind::Equal => logic(ctx, LogicBinOpKind::Equal, LogicBinOpKind::Equal, lhs, rhs),
        BinaryOpKind::NotEqual => logic(
            ctx,
            LogicBinOpKind::NotEqual,
            LogicBinOpKind::NotEqual,
            lhs,
            rhs,
        ),
        BinaryOpKind::Less => logic(ctx, LogicBinOpKind::LessI, LogicBinOpKind::LessF, lhs, rhs),
        BinaryOpKind::Greater => logic(
            ctx,
            LogicBinOpKind::GreaterI,
            LogicBinOpKind::GreaterF,
            lhs,
            rhs,
        ),
        BinaryOpKind::LessEqual => logic(
            ctx,
            LogicBinOpKind::LessEqualI,
            LogicBinOpKind::LessEqualF,
            lhs,
            rhs,
        ),
        BinaryOpKind::GreaterEqual => logic(
            ctx,
            LogicBinOpKind::GreaterEqualI,
            LogicBinOpKind::GreaterEqualF,
            lhs,
            rhs,
        ),
        BinaryOpKind::And => logic(ctx, LogicBinOpKind::AndI, LogicBinOpKind::AndI, lhs, rhs),
        BinaryOpKind::Or => logic(ctx, LogicBinOpKind::OrI, LogicBinOpKind::OrI, lhs, rhs),
        BinaryOpKind::Assign => {
            StoreOp::build(ctx, lhs, rhs);
            Some(rhs)
        }
    };
    Ok(result)
}

fn visit_variable_name(node: &Node, ctx: &mut ConverterContext) -> Converted<ValueId> {
    let name = expect_str(node, ctx)?.to_owned();
    let Some(var) = ctx.find_variable(&name) else {
        ctx.push_error(
            node,
            format!("variable was not declared in this scope: {name}"),
        );
        return Err(Abort);
    };
    if !var.needs_load {
        return Ok(var.value);
    }
    Ok(LoadOp::build(ctx, var.value).result(&ctx.tree))
}

fn visit_function_call(
    node: &Node,
    ctx: &mut ConverterContext,
    is_statement: bool,
) -> Converted<Option<ValueId>> {
    let name = expect_str(expect_child(node, 0, ctx)?, ctx)?.to_owned();
    if name == language::FUNC_PRINT {
        if !is_statement {
            ctx.push_error(node, "print() statement cannot be within an expression context");
            return Err(Abort);
        }
        let arg_nodes: Vec<&Node> = expect_child(node, 1, ctx)?.children.iter().collect();
        let mut arguments = Vec::new();
        for arg_node in arg_nodes {
            arguments.push(visit_operand(arg_node, ctx)?);
        }
        PrintOp::build(ctx, &arguments);
        return Ok(None);
    }
    if name == language::FUNC_INPUT {
        ctx.push_error(
            node,
            "input() statement must be a right-handed operand of an isolated assignment expression",
        );
        return Err(Abort);
    }
    let Some(return_type) = ctx.functions.get(&name).cloned() else {
        ctx.push_error(node, format!("call to undefined function: {name}"));
        return Err(Abort);
    };
    let arg_nodes: Vec<&Node> = expect_child(node, 1, ctx)?.children.iter().collect();
    let mut arguments = Vec::new();
    for arg_node in arg_nodes {
        arguments.push(visit_operand(arg_node, ctx)?);
    }
    let call = FunctionCallOp::build(ctx, &name, return_type, &arguments);
    Ok(Some(call.result(&ctx.tree)))
}

/// Visits a node in operand position: a value is required.
fn visit_operand(node: &Node, ctx: &mut ConverterContext) -> Converted<ValueId> {
    match visit_node(node, ctx, false)? {
        Some(value) => Ok(value),
        None => {
            ctx.push_error(node, "unsupported expression type");
            Err(Abort)
        }
    }
}

fn visit_node(node: &Node, ctx: &mut ConverterContext, is_statement: bool) -> Converted<Option<ValueId>> {
    match node.kind {
        NodeKind::Expression => {
            let child = expect_child(node, 0, ctx)?;
            visit_node(child, ctx, is_statement)
        }
        NodeKind::IntegerLiteralValue => {
            let Some(value) = node.int_num() else {
                ctx.push_error(node, "unsupported expression type");
                return Err(Abort);
            };
            let constant = ConstantOp::build(ctx, Type::int64(), Attribute::Int(value));
            Ok(Some(constant.result(&ctx.tree)))
        }
        NodeKind::FloatingPointLiteralValue => {
            let Some(value) = node.fp_num() else {
                ctx.push_error(node, "unsupported expression type");
                return Err(Abort);
            };
            let constant = ConstantOp::build(ctx, Type::float64(), Attribute::Float(value));
            Ok(Some(constant.result(&ctx.tree)))
        }
        NodeKind::BooleanLiteralValue => {
            let Some(value) = node.boolean() else {
                ctx.push_error(node, "unsupported expression type");
                return Err(Abort);
            };
            let constant = ConstantOp::build(ctx, Type::boolean(), Attribute::Bool(value));
            Ok(Some(constant.result(&ctx.tree)))
        }
        NodeKind::StringLiteralValue => {
            let Some(value) = node.str() else {
                ctx.push_error(node, "unsupported expression type");
                return Err(Abort);
            };
            let constant = ConstantOp::build(ctx, Type::str8(), Attribute::Str(value.to_owned()));
            Ok(Some(constant.result(&ctx.tree)))
        }
        NodeKind::BinaryOperation => visit_binary_operation(node, ctx, is_statement),
        NodeKind::VariableName => visit_variable_name(node, ctx).map(Some),
        NodeKind::FunctionCall => visit_function_call(node, ctx, is_statement),
        _ => {
            ctx.push_error(node, "unsupported expression type");
            Err(Abort)
        }
    }
}

fn process_node(node: &Node, ctx: &mut ConverterContext) -> Converted<()> {
    match node.kind {
        NodeKind::ProgramRoot => process_program_root(node, ctx),
        NodeKind::FunctionDefinition => process_function_definition(node, ctx),
        NodeKind::BranchRoot => process_branch_root(node, ctx),
        NodeKind::VariableDeclaration => process_variable_declaration(node, ctx),
        NodeKind::Expression => {
            let child = expect_child(node, 0, ctx)?;
            visit_node(child, ctx, true)?;
            Ok(())
        }
        NodeKind::ReturnStatement => process_return_statement(node, ctx),
        NodeKind::WhileStatement => process_while_statement(node, ctx),
        NodeKind::IfStatement => process_if_statement(node, ctx),
        _ => {
            ctx.push_error(node, "unsupported expression type");
            Err(Abort)
        }
    }
}
