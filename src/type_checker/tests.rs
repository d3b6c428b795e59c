use std::rc::Rc;

use indoc::indoc;
use pretty_assertions::assert_eq;

use super::{scope::ScopeContext, type_checker::TypeChecker};
use crate::{
    ast::{
        ast::{ExprKind, Function, Stmt},
        types::VarType,
    },
    errors::errors::ErrorImpl,
    lexer::lexer::tokenize,
    parser::parser::parse,
};

fn tagged(source: &str) -> (Function, ScopeContext, TypeChecker) {
    let tokens = tokenize(source.to_string(), Some("unit".to_string())).unwrap();
    let (_, result) = parse(tokens, Rc::new("unit".to_string()));
    let mut function = Function::new("unit", result.unwrap());

    let mut scope = ScopeContext::new();
    let mut checker = TypeChecker::new();
    checker.tag_function(&mut function, &mut scope);

    (function, scope, checker)
}

#[test]
fn test_for_bounds_coerce_to_int() {
    let (function, scope, checker) = tagged(indoc! {"
        for ($i; 1; 10)
            alert($i)
        end for
    "});

    assert!(checker.errors.is_empty());
    assert_eq!(checker.warnings.len(), 2);
    assert!(matches!(
        checker.warnings[0].get_internal_error(),
        ErrorImpl::NumberCoercion { context } if context == "for begin"
    ));

    let Stmt::For(stmt) = &function.body.body[0] else {
        panic!("expected a for statement");
    };
    assert_eq!(stmt.variable.var_type, VarType::Int);
    assert_eq!(stmt.begin.var_type, VarType::Int);
    assert_eq!(stmt.end.var_type, VarType::Int);
    assert_eq!(scope.locals.get("i"), Some(&VarType::Int));
}

#[test]
fn test_string_for_bound_is_an_error() {
    let (_, _, checker) = tagged("for ($i; \"x\"; 10)\nend for");

    assert_eq!(checker.errors.len(), 1);
    assert_eq!(
        checker.errors[0].get_internal_error(),
        &ErrorImpl::TypeMatchError {
            context: String::from("for begin"),
            expected: String::from("int"),
            received: String::from("string"),
        }
    );
}

#[test]
fn test_undetermined_condition_becomes_boolean() {
    let (function, scope, checker) = tagged("while (done)\nend while");

    assert!(checker.errors.is_empty());
    let Stmt::While(stmt) = &function.body.body[0] else {
        panic!("expected a while statement");
    };
    assert_eq!(stmt.condition.var_type, VarType::Boolean);
    assert_eq!(scope.globals.get("done"), Some(&VarType::Boolean));
}

#[test]
fn test_number_condition_is_an_error() {
    let (_, _, checker) = tagged("if (1)\nend if");

    assert!(checker.has_errors());
    assert!(matches!(
        checker.errors[0].get_internal_error(),
        ErrorImpl::TypeMatchError { context, .. } if context == "if condition"
    ));
}

#[test]
fn test_comparisons_are_boolean() {
    let (function, _, checker) = tagged("repeat\nuntil ($a # \"x\")");

    assert!(checker.errors.is_empty());
    let Stmt::Repeat(stmt) = &function.body.body[0] else {
        panic!("expected a repeat statement");
    };
    assert_eq!(stmt.condition.var_type, VarType::Boolean);
}

#[test]
fn test_assignment_propagates_type() {
    let (function, scope, _) = tagged("<>name := \"x\"\ncount := 1 + 2");

    assert_eq!(scope.persistents.get("name"), Some(&VarType::String));
    assert_eq!(scope.globals.get("count"), Some(&VarType::Number));

    let Stmt::Assignment(stmt) = &function.body.body[1] else {
        panic!("expected an assignment");
    };
    assert_eq!(stmt.variable.var_type, VarType::Number);
}

#[test]
fn test_operand_conflict_is_not_fatal() {
    let (function, _, checker) = tagged("$a := 1 + \"x\"");

    assert_eq!(checker.errors.len(), 1);
    assert!(matches!(
        checker.errors[0].get_internal_error(),
        ErrorImpl::ImplicitCast { .. }
    ));

    let Stmt::Assignment(stmt) = &function.body.body[0] else {
        panic!("expected an assignment");
    };
    assert_eq!(stmt.value.var_type, VarType::Number);
}

#[test]
fn test_unary_takes_operand_type() {
    let (function, _, _) = tagged("-1");

    let Stmt::Expression(stmt) = &function.body.body[0] else {
        panic!("expected an expression");
    };
    assert!(matches!(stmt.expression.kind, ExprKind::Unary { .. }));
    assert_eq!(stmt.expression.var_type, VarType::Number);
}

#[test]
fn test_positional_arguments_define_params() {
    let (function, scope, _) = tagged("$0 := $1 + $3");

    assert_eq!(function.prototype.params, vec!["1", "2", "3"]);
    assert_eq!(scope.arg_count(), 3);
    assert!(scope.uses_return_slot());
    assert_eq!(scope.args.keys().copied().collect::<Vec<u32>>(), vec![0, 1, 3]);
}

#[test]
fn test_no_return_slot() {
    let (function, scope, _) = tagged("alert(1)");

    assert!(function.prototype.params.is_empty());
    assert!(!scope.uses_return_slot());
}

#[test]
fn test_tagging_is_idempotent() {
    let (mut function, _, _) = tagged(indoc! {"
        $a := 1
        for ($i; 1; $a; 2)
            if ($i < 5)
                $b := $i + $a
            end if
        end for
        while (<>flag)
        end while
    "});

    let first = function.clone();

    let mut scope = ScopeContext::new();
    let mut checker = TypeChecker::new();
    checker.tag_function(&mut function, &mut scope);

    assert_eq!(function, first);
    assert!(checker.warnings.is_empty());
}

#[test]
fn test_module_variables_are_shared() {
    let (_, first, _) = tagged("shared := 1\n<>kept := 2\n$mine := 3");

    let mut module = ScopeContext::new();
    module.absorb_module_variables(&first);

    let next = module.for_function();
    assert_eq!(next.globals.get("shared"), Some(&VarType::Number));
    assert_eq!(next.persistents.get("kept"), Some(&VarType::Number));
    assert!(next.locals.is_empty());
}
