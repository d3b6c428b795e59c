use inkwell::{
    intrinsics::Intrinsic,
    values::{FunctionValue, IntValue},
    IntPredicate,
};

use crate::{
    ast::ast::{Block, ForStmt, IfStmt, RepeatStmt, Stmt, WhileStmt},
    errors::errors::{Error, ErrorImpl},
};

use super::{
    compiler::{BuilderResultExt, Compiler},
    expr::{gen_condition, gen_expression, gen_int},
};

pub fn gen_block<'a>(
    compiler: &mut Compiler<'a>,
    block: &Block,
    function: FunctionValue<'a>,
) -> Result<(), Error> {
    for statement in block.body.iter() {
        gen_statement(compiler, statement, function)?;
    }

    Ok(())
}

pub fn gen_statement<'a>(
    compiler: &mut Compiler<'a>,
    statement: &Stmt,
    function: FunctionValue<'a>,
) -> Result<(), Error> {
    compiler.position = statement.get_span().start.clone();

    match statement {
        Stmt::Expression(stmt) => {
            gen_expression(compiler, &stmt.expression)?;
        }
        Stmt::Assignment(stmt) => {
            let value = gen_int(compiler, &stmt.value)?;

            let Some(variable) = stmt.variable.as_variable() else {
                return Err(Error::new(
                    ErrorImpl::InvalidAssignmentTarget,
                    stmt.variable.span.start.clone(),
                ));
            };
            let slot = compiler.variable_pointer(variable, &stmt.variable.span.start)?;

            compiler
                .builder
                .build_store(slot, value)
                .at(&compiler.position)?;
        }
        Stmt::If(stmt) => gen_if(compiler, stmt, function)?,
        Stmt::For(stmt) => gen_for(compiler, stmt, function)?,
        Stmt::While(stmt) => gen_while(compiler, stmt, function)?,
        Stmt::Repeat(stmt) => gen_repeat(compiler, stmt, function)?,
    }

    Ok(())
}

fn gen_if<'a>(
    compiler: &mut Compiler<'a>,
    stmt: &IfStmt,
    function: FunctionValue<'a>,
) -> Result<(), Error> {
    let position = compiler.position.clone();
    let condition = gen_condition(compiler, &stmt.condition)?;

    let then_block = compiler.create_basic_block("then", function);
    let else_block = stmt
        .else_body
        .as_ref()
        .map(|_| compiler.create_basic_block("else", function));
    let merge_block = compiler.create_basic_block("ifcont", function);

    compiler
        .builder
        .build_conditional_branch(condition, then_block, else_block.unwrap_or(merge_block))
        .at(&position)?;

    compiler.builder.position_at_end(then_block);
    gen_block(compiler, &stmt.then_body, function)?;
    compiler
        .builder
        .build_unconditional_branch(merge_block)
        .at(&position)?;

    if let (Some(else_block), Some(else_body)) = (else_block, &stmt.else_body) {
        compiler.builder.position_at_end(else_block);
        gen_block(compiler, else_body, function)?;
        compiler
            .builder
            .build_unconditional_branch(merge_block)
            .at(&position)?;
    }

    compiler.builder.position_at_end(merge_block);
    Ok(())
}

fn gen_while<'a>(
    compiler: &mut Compiler<'a>,
    stmt: &WhileStmt,
    function: FunctionValue<'a>,
) -> Result<(), Error> {
    let position = compiler.position.clone();

    let condition_block = compiler.create_basic_block("whilecond", function);
    let body_block = compiler.create_basic_block("whilebody", function);
    let end_block = compiler.create_basic_block("whileend", function);

    compiler
        .builder
        .build_unconditional_branch(condition_block)
        .at(&position)?;

    compiler.builder.position_at_end(condition_block);
    let condition = gen_condition(compiler, &stmt.condition)?;
    compiler
        .builder
        .build_conditional_branch(condition, body_block, end_block)
        .at(&position)?;

    compiler.builder.position_at_end(body_block);
    gen_block(compiler, &stmt.body, function)?;
    compiler
        .builder
        .build_unconditional_branch(condition_block)
        .at(&position)?;

    compiler.builder.position_at_end(end_block);
    Ok(())
}

/// The body runs first; a true condition leaves the loop.
fn gen_repeat<'a>(
    compiler: &mut Compiler<'a>,
    stmt: &RepeatStmt,
    function: FunctionValue<'a>,
) -> Result<(), Error> {
    let position = compiler.position.clone();

    let body_block = compiler.create_basic_block("repeatbody", function);
    let end_block = compiler.create_basic_block("repeatend", function);

    compiler
        .builder
        .build_unconditional_branch(body_block)
        .at(&position)?;

    compiler.builder.position_at_end(body_block);
    gen_block(compiler, &stmt.body, function)?;
    let condition = gen_condition(compiler, &stmt.condition)?;
    compiler
        .builder
        .build_conditional_branch(condition, end_block, body_block)
        .at(&position)?;

    compiler.builder.position_at_end(end_block);
    Ok(())
}

/// `for(var; begin; end[; step])`
///
/// The bounds and the step are evaluated once, in the init block. The loop
/// counts up while `var <= end` when `end > begin`, and down while
/// `var >= end` otherwise. Without a step it moves by one toward `end`.
fn gen_for<'a>(
    compiler: &mut Compiler<'a>,
    stmt: &ForStmt,
    function: FunctionValue<'a>,
) -> Result<(), Error> {
    let position = compiler.position.clone();
    let int_type = compiler.int_type();

    let Some(variable) = stmt.variable.as_variable() else {
        return Err(Error::new(
            ErrorImpl::InvalidAssignmentTarget,
            stmt.variable.span.start.clone(),
        ));
    };
    let slot = compiler.variable_pointer(variable, &stmt.variable.span.start)?;

    let init_block = compiler.create_basic_block("forinit", function);
    let condition_block = compiler.create_basic_block("forcond", function);
    let body_block = compiler.create_basic_block("forbody", function);
    let step_block = compiler.create_basic_block("forstep", function);
    let end_block = compiler.create_basic_block("forend", function);

    compiler
        .builder
        .build_unconditional_branch(init_block)
        .at(&position)?;

    // init
    compiler.builder.position_at_end(init_block);
    let begin = gen_int(compiler, &stmt.begin)?;
    compiler.builder.build_store(slot, begin).at(&position)?;
    let end = gen_int(compiler, &stmt.end)?;
    let ascending = compiler
        .builder
        .build_int_compare(IntPredicate::SGT, end, begin, "ascending")
        .at(&position)?;
    let step = match &stmt.increment {
        Some(increment) => gen_int(compiler, increment)?,
        None => compiler
            .builder
            .build_select(
                ascending,
                int_type.const_int(1, true),
                int_type.const_all_ones(),
                "step",
            )
            .at(&position)?
            .into_int_value(),
    };
    compiler
        .builder
        .build_unconditional_branch(condition_block)
        .at(&position)?;

    // condition
    compiler.builder.position_at_end(condition_block);
    let current = compiler
        .builder
        .build_load(slot, &variable.name)
        .at(&position)?
        .into_int_value();
    let below = compiler
        .builder
        .build_int_compare(IntPredicate::SLE, current, end, "below")
        .at(&position)?;
    let above = compiler
        .builder
        .build_int_compare(IntPredicate::SGE, current, end, "above")
        .at(&position)?;
    let condition = compiler
        .builder
        .build_select(ascending, below, above, "forcond")
        .at(&position)?
        .into_int_value();
    compiler
        .builder
        .build_conditional_branch(condition, body_block, end_block)
        .at(&position)?;

    // body
    compiler.builder.position_at_end(body_block);
    gen_block(compiler, &stmt.body, function)?;
    compiler
        .builder
        .build_unconditional_branch(step_block)
        .at(&position)?;

    // step
    compiler.builder.position_at_end(step_block);
    let current = compiler
        .builder
        .build_load(slot, &variable.name)
        .at(&position)?
        .into_int_value();
    let (next, overflow) = gen_checked_add(compiler, current, step)?;
    // a step past the i32 range ends the loop
    let next = compiler
        .builder
        .build_select(overflow, current, next, "next")
        .at(&position)?;
    compiler.builder.build_store(slot, next).at(&position)?;
    compiler
        .builder
        .build_conditional_branch(overflow, end_block, condition_block)
        .at(&position)?;

    compiler.builder.position_at_end(end_block);
    Ok(())
}

/// Adds with `llvm.sadd.with.overflow`, returning the sum and the overflow bit.
fn gen_checked_add<'a>(
    compiler: &Compiler<'a>,
    left: IntValue<'a>,
    right: IntValue<'a>,
) -> Result<(IntValue<'a>, IntValue<'a>), Error> {
    let position = &compiler.position;
    let backend_error = || {
        Error::new(
            ErrorImpl::BackendError {
                message: String::from("llvm.sadd.with.overflow is not available"),
            },
            position.clone(),
        )
    };

    let intrinsic = Intrinsic::find("llvm.sadd.with.overflow").ok_or_else(backend_error)?;
    let declaration = intrinsic
        .get_declaration(&compiler.module, &[compiler.int_type().into()])
        .ok_or_else(backend_error)?;

    let result = compiler
        .builder
        .build_call(declaration, &[left.into(), right.into()], "checked")
        .at(position)?
        .try_as_basic_value()
        .left()
        .ok_or_else(backend_error)?
        .into_struct_value();

    let sum = compiler
        .builder
        .build_extract_value(result, 0, "sum")
        .at(position)?
        .into_int_value();
    let overflow = compiler
        .builder
        .build_extract_value(result, 1, "overflow")
        .at(position)?
        .into_int_value();

    Ok((sum, overflow))
}
