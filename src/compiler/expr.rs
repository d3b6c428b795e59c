use inkwell::{
    values::{BasicMetadataValueEnum, IntValue},
    IntPredicate,
};

use crate::{
    ast::{
        ast::{Expr, ExprKind},
        types::VarType,
    },
    errors::errors::{Error, ErrorImpl},
};

use super::compiler::{BuilderResultExt, Compiler};

/// Parses the integer part of a number literal the way `strtol` does with
/// base 0: a leading `0` selects octal, parsing stops at the first digit
/// outside the base, and the fractional part is dropped.
///
/// Returns `None` when the value does not fit in 32 bits.
pub fn parse_number_literal(text: &str) -> Option<i32> {
    let integer = text.split('.').next().unwrap_or_default();

    let (digits, radix) = if integer.len() > 1 && integer.starts_with('0') {
        (&integer[1..], 8)
    } else {
        (integer, 10)
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return Some(0);
    }

    i32::from_str_radix(&digits[..end], radix).ok()
}

/// Generates LLVM IR for the given expression.
///
/// Comparisons produce `i1` values, everything else `i32`.
pub fn gen_expression<'a>(compiler: &Compiler<'a>, expr: &Expr) -> Result<IntValue<'a>, Error> {
    let position = &expr.span.start;

    match &expr.kind {
        ExprKind::Literal(value) => {
            if expr.var_type == VarType::String {
                return Err(Error::new(
                    ErrorImpl::UnsupportedType {
                        type_: expr.var_type.to_string(),
                    },
                    position.clone(),
                ));
            }

            let number = parse_number_literal(value).ok_or_else(|| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: value.clone(),
                    },
                    position.clone(),
                )
            })?;

            Ok(compiler.int_type().const_int(number as u64, true))
        }
        ExprKind::Variable(variable) => {
            let slot = compiler.variable_pointer(variable, position)?;

            Ok(compiler
                .builder
                .build_load(slot, &variable.name)
                .at(position)?
                .into_int_value())
        }
        ExprKind::Unary { operator, operand } => {
            let value = gen_int(compiler, operand)?;

            match operator.as_str() {
                "+" => Ok(value),
                "-" => compiler.builder.build_int_neg(value, "negtmp").at(position),
                _ => Err(Error::new(
                    ErrorImpl::InvalidOperator {
                        operator: operator.clone(),
                    },
                    position.clone(),
                )),
            }
        }
        ExprKind::Binary {
            operator,
            left,
            right,
        } => {
            let left = gen_expression(compiler, left)?;
            let right = gen_expression(compiler, right)?;

            gen_binary(compiler, operator, left, right, expr)
        }
        ExprKind::Call { name, arguments } => {
            let signature = compiler.signatures.get(name).ok_or_else(|| {
                Error::new(
                    ErrorImpl::UnknownFunction {
                        function: name.clone(),
                    },
                    position.clone(),
                )
            })?;

            if !signature.accepts(arguments.len()) {
                return Err(Error::new(
                    ErrorImpl::ArgumentCountMismatch {
                        function: name.clone(),
                        expected: signature.args_type.len(),
                        received: arguments.len(),
                    },
                    position.clone(),
                ));
            }

            let function = compiler
                .module
                .get_function(&signature.name)
                .ok_or_else(|| {
                    Error::new(
                        ErrorImpl::UnknownFunction {
                            function: name.clone(),
                        },
                        position.clone(),
                    )
                })?;

            let args = arguments
                .iter()
                .map(|argument| gen_int(compiler, argument).map(BasicMetadataValueEnum::from))
                .collect::<Result<Vec<BasicMetadataValueEnum<'a>>, Error>>()?;

            Ok(compiler
                .builder
                .build_call(function, &args[..], "calltmp")
                .at(position)?
                .try_as_basic_value()
                .left()
                .map(|value| value.into_int_value())
                .unwrap_or(compiler.int_type().const_zero()))
        }
    }
}

fn gen_binary<'a>(
    compiler: &Compiler<'a>,
    operator: &str,
    left: IntValue<'a>,
    right: IntValue<'a>,
    expr: &Expr,
) -> Result<IntValue<'a>, Error> {
    let position = &expr.span.start;
    let builder = &compiler.builder;

    let predicate = match operator {
        "<" => Some(IntPredicate::SLT),
        "<=" => Some(IntPredicate::SLE),
        ">" => Some(IntPredicate::SGT),
        ">=" => Some(IntPredicate::SGE),
        "=" => Some(IntPredicate::EQ),
        "#" | "!=" => Some(IntPredicate::NE),
        _ => None,
    };
    if let Some(predicate) = predicate {
        let left = widen(compiler, left, expr)?;
        let right = widen(compiler, right, expr)?;
        return builder
            .build_int_compare(predicate, left, right, "cmptmp")
            .at(position);
    }

    // Two truth values stay a truth value
    if matches!(operator, "&" | "|") && is_bool(left) && is_bool(right) {
        return match operator {
            "&" => builder.build_and(left, right, "andtmp"),
            _ => builder.build_or(left, right, "ortmp"),
        }
        .at(position);
    }

    let left = widen(compiler, left, expr)?;
    let right = widen(compiler, right, expr)?;

    match operator {
        "+" => builder.build_int_add(left, right, "addtmp"),
        "-" => builder.build_int_sub(left, right, "subtmp"),
        "*" => builder.build_int_mul(left, right, "multmp"),
        "/" => builder.build_int_signed_div(left, right, "divtmp"),
        "&" => builder.build_and(left, right, "andtmp"),
        "|" => builder.build_or(left, right, "ortmp"),
        "^" => builder.build_xor(left, right, "xortmp"),
        _ => {
            return Err(Error::new(
                ErrorImpl::InvalidOperator {
                    operator: String::from(operator),
                },
                position.clone(),
            ))
        }
    }
    .at(position)
}

fn is_bool(value: IntValue) -> bool {
    value.get_type().get_bit_width() == 1
}

fn widen<'a>(compiler: &Compiler<'a>, value: IntValue<'a>, expr: &Expr) -> Result<IntValue<'a>, Error> {
    if !is_bool(value) {
        return Ok(value);
    }

    compiler
        .builder
        .build_int_z_extend(value, compiler.int_type(), "booltmp")
        .at(&expr.span.start)
}

/// Generates `expr` as an `i32`.
pub fn gen_int<'a>(compiler: &Compiler<'a>, expr: &Expr) -> Result<IntValue<'a>, Error> {
    let value = gen_expression(compiler, expr)?;
    widen(compiler, value, expr)
}

/// Generates `expr` as an `i1`, comparing integers against zero.
pub fn gen_condition<'a>(compiler: &Compiler<'a>, expr: &Expr) -> Result<IntValue<'a>, Error> {
    let value = gen_expression(compiler, expr)?;
    if is_bool(value) {
        return Ok(value);
    }

    compiler
        .builder
        .build_int_compare(
            IntPredicate::NE,
            value,
            compiler.int_type().const_zero(),
            "condtmp",
        )
        .at(&expr.span.start)
}
