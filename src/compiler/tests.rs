//! Unit tests for code generation.
//!
//! Programs are built and run through the JIT. `alert` is replaced by a
//! native function that records its argument instead of printing it.

use std::cell::RefCell;

use indoc::indoc;
use inkwell::context::Context;
use pretty_assertions::assert_eq;

use super::{
    builtins::{Builtin, BuiltinRegistry, NativeFn1},
    expr::parse_number_literal,
    program::{analyze_units, build_program, lower_units, SourceUnit},
};
use crate::{
    ast::types::{FunctionSignature, VarType},
    errors::errors::{Error, ErrorImpl},
    type_checker::type_checker::TypeChecker,
    CompileOptions,
};

thread_local! {
    static ALERTS: RefCell<Vec<i32>> = const { RefCell::new(vec![]) };
}

extern "C" fn record_alert(value: i32) -> i32 {
    ALERTS.with(|alerts| alerts.borrow_mut().push(value));
    0
}

fn recording_registry() -> BuiltinRegistry {
    let mut registry = BuiltinRegistry::with_defaults();
    registry.register(
        "alert",
        Builtin::new(
            FunctionSignature::new("BUILTINalert", VarType::Int, vec![VarType::Int]),
            record_alert as NativeFn1 as usize,
        ),
    );
    registry
}

fn build_error(units: &[SourceUnit]) -> Error {
    let context = Context::create();
    let error = match build_program(
        &context,
        units,
        &recording_registry(),
        &CompileOptions::default(),
    ) {
        Ok(_) => panic!("expected the build to fail"),
        Err(error) => error,
    };
    error
}

fn run_units(units: &[SourceUnit], options: &CompileOptions) -> (i32, Vec<i32>) {
    ALERTS.with(|alerts| alerts.borrow_mut().clear());

    let context = Context::create();
    let program = build_program(&context, units, &recording_registry(), options).unwrap();
    let result = program.execute().unwrap();

    (result, ALERTS.with(|alerts| alerts.borrow().clone()))
}

fn run(source: &str) -> (i32, Vec<i32>) {
    let units = [SourceUnit::new("test", source)];

    let unoptimized = run_units(&units, &CompileOptions { optimize: false });
    let optimized = run_units(&units, &CompileOptions::default());
    assert_eq!(unoptimized, optimized);

    optimized
}

#[test]
fn test_parse_number_literal() {
    assert_eq!(parse_number_literal("42"), Some(42));
    assert_eq!(parse_number_literal("0"), Some(0));
    assert_eq!(parse_number_literal("010"), Some(8));
    assert_eq!(parse_number_literal("08"), Some(0));
    assert_eq!(parse_number_literal("3.99"), Some(3));
    assert_eq!(parse_number_literal("2147483647"), Some(i32::MAX));
    assert_eq!(parse_number_literal("2147483648"), None);
}

#[test]
fn test_alert_receives_sum() {
    assert_eq!(run("alert(3+4)"), (0, vec![7]));
}

#[test]
fn test_return_slot() {
    assert_eq!(run("$0 := 6 * 7").0, 42);
}

#[test]
fn test_operators_associate_to_the_right() {
    // 10 - (2 + 3)
    assert_eq!(run("$0 := 10 - 2 + 3").0, 5);
    // 2 * (3 + 4)
    assert_eq!(run("$0 := 2 * 3 + 4").0, 14);
}

#[test]
fn test_unary_and_bitwise_operators() {
    let (_, alerts) = run(indoc! {"
        alert(-5 + 2)
        alert(+3)
        alert(6 ^ 3)
        alert(6 & 3)
        alert(6 | 3)
        alert(7 / 2)
    "});

    assert_eq!(alerts, vec![-3, 3, 5, 2, 7, 3]);
}

#[test]
fn test_comparisons_as_values() {
    let (_, alerts) = run(indoc! {"
        alert(1 < 2)
        alert(2 <= 1)
        alert(3 = 3)
        alert(3 # 3)
        alert(3 != 4)
        alert((1 < 2) & (2 < 3))
    "});

    assert_eq!(alerts, vec![1, 0, 1, 0, 1, 1]);
}

#[test]
fn test_if_else() {
    let (_, alerts) = run(indoc! {"
        $a := 5
        if ($a > 3)
            alert(1)
        else
            alert(2)
        end if
        if ($a < 3)
            alert(3)
        end if
        if ($a)
            alert(4)
        end if
    "});

    assert_eq!(alerts, vec![1, 4]);
}

#[test]
fn test_while_loop() {
    let (result, alerts) = run(indoc! {"
        $i := 0
        while ($i < 4)
            $0 := $0 + $i
            $i := $i + 1
        end while
        alert($i)
    "});

    assert_eq!(result, 6);
    assert_eq!(alerts, vec![4]);
}

#[test]
fn test_repeat_runs_body_first() {
    let (_, alerts) = run(indoc! {"
        repeat
            alert(1)
        until (1 = 1)
        $n := 3
        repeat
            alert($n)
            $n := $n - 1
        until ($n = 0)
    "});

    assert_eq!(alerts, vec![1, 3, 2, 1]);
}

#[test]
fn test_for_direction_is_chosen_at_runtime() {
    let (_, up) = run("for ($i; 1; 5)\nalert($i)\nend for");
    assert_eq!(up, vec![1, 2, 3, 4, 5]);

    let (_, down) = run("for ($i; 5; 1)\nalert($i)\nend for");
    assert_eq!(down, vec![5, 4, 3, 2, 1]);

    let (_, single) = run("for ($i; 2; 2)\nalert($i)\nend for");
    assert_eq!(single, vec![2]);
}

#[test]
fn test_for_with_step() {
    let (_, alerts) = run(indoc! {"
        for ($i; 0; 10; 4)
            alert($i)
        end for
        for ($j; 9; 0; -3)
            alert($j)
        end for
    "});

    assert_eq!(alerts, vec![0, 4, 8, 9, 6, 3, 0]);
}

#[test]
fn test_for_stops_at_the_edge_of_the_int_range() {
    let (_, up) = run("for ($i; 2147483646; 2147483647)\nalert($i)\nend for");
    assert_eq!(up, vec![2147483646, 2147483647]);

    let (_, down) = run("for ($j; -2147483647; -2147483647; -5)\nalert($j)\nend for");
    assert_eq!(down, vec![-2147483647]);
}

#[test]
fn test_locals_start_at_zero() {
    assert_eq!(run("$0 := $never + 1").0, 1);
}

#[test]
fn test_missing_return_slot_returns_zero() {
    assert_eq!(run("$a := 12").0, 0);
}

#[test]
fn test_octal_literal() {
    assert_eq!(run("$0 := 017").0, 15);
}

#[test]
fn test_same_ir_for_same_source() {
    let units = [SourceUnit::new("test", "for ($i; 1; 3)\nalert($i * 2)\nend for")];
    let options = CompileOptions { optimize: false };

    let first_context = Context::create();
    let first = build_program(&first_context, &units, &recording_registry(), &options).unwrap();
    let second_context = Context::create();
    let second = build_program(&second_context, &units, &recording_registry(), &options).unwrap();

    assert_eq!(first.print_ir(), second.print_ir());
}

#[test]
fn test_retagged_units_lower_to_same_ir() {
    let units = [SourceUnit::new(
        "test",
        indoc! {"
            $n := 3
            repeat
                total := total + $n * 2
                $n := $n - 1
            until ($n = 0)
            for ($i; 1; 3)
                alert($i)
            end for
        "},
    )];
    let registry = recording_registry();
    let options = CompileOptions { optimize: false };

    let mut checker = TypeChecker::new();
    let (mut tagged, module_scope) = analyze_units(&units, &mut checker).unwrap();
    let errors = checker.errors.len();
    let warnings = checker.warnings.len();

    let first_context = Context::create();
    let (first, _) = lower_units(&first_context, &tagged, &module_scope, &registry, &options).unwrap();

    let before = tagged.clone();
    for unit in tagged.iter_mut() {
        checker.tag_function(&mut unit.function, &mut unit.scope);
    }

    assert_eq!(checker.errors.len(), errors);
    assert_eq!(checker.warnings.len(), warnings);
    for (retagged, original) in tagged.iter().zip(before.iter()) {
        assert_eq!(retagged.function, original.function);
        assert_eq!(retagged.scope, original.scope);
    }

    let second_context = Context::create();
    let (second, _) =
        lower_units(&second_context, &tagged, &module_scope, &registry, &options).unwrap();

    assert_eq!(
        first.print_to_string().to_string(),
        second.print_to_string().to_string()
    );
}

#[test]
fn test_module_layout() {
    let context = Context::create();
    let units = [SourceUnit::new("test", "<>kept := 1\nshared := 2\nalert(1)")];
    let program = build_program(
        &context,
        &units,
        &recording_registry(),
        &CompileOptions { optimize: false },
    )
    .unwrap();

    let ir = program.print_ir();
    assert_eq!(program.main_name, "main");
    assert!(ir.contains("<>kept"));
    assert!(ir.contains("@shared = global i32 0"));
    assert!(ir.contains("declare i32 @BUILTINalert(i32)"));
    assert!(ir.contains("declare i32 @BUILTINabort()"));
    assert!(ir.contains("define i32 @test()"));
    assert!(ir.contains("define i32 @main()"));
}

#[test]
fn test_unit_named_main() {
    let context = Context::create();
    let units = [SourceUnit::new("main", "$0 := 1")];
    let program = build_program(
        &context,
        &units,
        &recording_registry(),
        &CompileOptions::default(),
    )
    .unwrap();

    assert_eq!(program.main_name, "__main");
    assert_eq!(program.execute().unwrap(), 1);
}

#[test]
fn test_builtin_wins_over_unit_of_same_name() {
    let units = [
        SourceUnit::new("alert", "$0 := $1 + $2"),
        SourceUnit::new("test", "alert(5)"),
    ];

    let (result, alerts) = run_units(&units, &CompileOptions::default());
    assert_eq!(result, 0);
    assert_eq!(alerts, vec![5]);
}

#[test]
fn test_argument_count_mismatch() {
    let error = build_error(&[SourceUnit::new("test", "abort(1)")]);

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::ArgumentCountMismatch {
            function: String::from("abort"),
            expected: 0,
            received: 1,
        }
    );
    assert_eq!(error.get_position().0, 1);
}

#[test]
fn test_unknown_function() {
    let error = build_error(&[SourceUnit::new("test", "\nmissing(1)")]);

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::UnknownFunction {
            function: String::from("missing"),
        }
    );
    assert_eq!(error.get_position().0, 2);
}

#[test]
fn test_string_values_are_unsupported() {
    let error = build_error(&[SourceUnit::new("test", "alert(\"hello\")")]);

    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::UnsupportedType { .. }
    ));
}

#[test]
fn test_invalid_operator() {
    let error = build_error(&[SourceUnit::new("test", "alert(5 % 2)")]);

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::InvalidOperator {
            operator: String::from("%"),
        }
    );
}

#[test]
fn test_number_out_of_range() {
    let error = build_error(&[SourceUnit::new("test", "alert(99999999999)")]);

    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::NumberParseError { token } if token == "99999999999"
    ));
}

#[test]
fn test_entry_unit_cannot_take_arguments() {
    let error = build_error(&[SourceUnit::new("test", "$0 := $1")]);

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::MainTakesArguments {
            function: String::from("test"),
            count: 1,
        }
    );
}

#[test]
fn test_duplicate_unit() {
    let error = build_error(&[
        SourceUnit::new("twice", "alert(1)"),
        SourceUnit::new("twice", "alert(2)"),
    ]);

    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::FunctionAlreadyDeclared { function } if function == "twice"
    ));
}

#[test]
fn test_no_unit() {
    let error = build_error(&[]);

    assert_eq!(error.get_internal_error(), &ErrorImpl::NoCompilationUnit);
}
