//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::Position;
use std::rc::Rc;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: ")".to_string(),
        },
        Position(10, Rc::new("test.4dm".to_string())),
    );

    assert_eq!(error.get_error_name(), "UnexpectedToken");
    assert_eq!(error.get_position().0, 10);
    assert_eq!(error.get_position().1.as_str(), "test.4dm");
}

#[test]
fn test_unterminated_string_is_fatal() {
    let error = Error::new(
        ErrorImpl::UnterminatedString,
        Position(1, Rc::new("test.4dm".to_string())),
    );

    assert!(error.is_fatal());
    assert_eq!(error.get_error_name(), "UnterminatedString");
}

#[test]
fn test_parse_and_codegen_errors_are_not_fatal() {
    let parse_error = Error::new(
        ErrorImpl::InvalidAssignmentTarget,
        Position(2, Rc::new("test.4dm".to_string())),
    );
    let codegen_error = Error::new(
        ErrorImpl::UnknownFunction {
            function: "foo".to_string(),
        },
        Position(3, Rc::new("test.4dm".to_string())),
    );

    assert!(!parse_error.is_fatal());
    assert!(!codegen_error.is_fatal());
}

#[test]
fn test_argument_count_tip_names_function() {
    let error = Error::new(
        ErrorImpl::ArgumentCountMismatch {
            function: "abort".to_string(),
            expected: 0,
            received: 1,
        },
        Position(1, Rc::new("test.4dm".to_string())),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(message) => {
            assert_eq!(message, "Function `abort` expects 0 arguments, received 1");
        }
        ErrorTip::None => panic!("Expected a suggestion"),
    }
}

#[test]
fn test_type_match_error_message() {
    let error = ErrorImpl::TypeMatchError {
        context: "condition of 'if'".to_string(),
        expected: "boolean".to_string(),
        received: "string".to_string(),
    };

    assert_eq!(
        error.to_string(),
        "the condition of 'if' must be a boolean, not a string"
    );
}

#[test]
fn test_error_display_includes_location() {
    let error = Error::new(
        ErrorImpl::UnknownFunction {
            function: "foo".to_string(),
        },
        Position(7, Rc::new("main".to_string())),
    );

    assert_eq!(error.to_string(), "main:7: unknown function \"foo\"");
}

#[test]
fn test_no_compilation_unit_has_no_tip() {
    let error = Error::new(ErrorImpl::NoCompilationUnit, Position::null());

    assert!(matches!(error.get_tip(), ErrorTip::None));
    assert_eq!(error.get_tip().to_string(), "");
}
