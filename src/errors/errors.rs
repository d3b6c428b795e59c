use std::fmt::Display;

use inkwell::builder::BuilderError;
use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// Lex errors stop the whole process before anything else runs.
    pub fn is_fatal(&self) -> bool {
        matches!(self.internal_error, ErrorImpl::UnterminatedString)
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::ImplicitCast { .. } => "ImplicitCast",
            ErrorImpl::NumberCoercion { .. } => "NumberCoercion",
            ErrorImpl::UnknownVariable { .. } => "UnknownVariable",
            ErrorImpl::UnknownFunction { .. } => "UnknownFunction",
            ErrorImpl::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::InvalidOperator { .. } => "InvalidOperator",
            ErrorImpl::UnsupportedType { .. } => "UnsupportedType",
            ErrorImpl::MainTakesArguments { .. } => "MainTakesArguments",
            ErrorImpl::InvalidFunction { .. } => "InvalidFunction",
            ErrorImpl::NoCompilationUnit => "NoCompilationUnit",
            ErrorImpl::BackendError { .. } => "BackendError",
            ErrorImpl::ExecutionError { .. } => "ExecutionError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnterminatedString => ErrorTip::Suggestion(String::from(
                "String literal is never closed, did you miss a `\"`?",
            )),
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::InvalidAssignmentTarget => ErrorTip::Suggestion(String::from(
                "Only `$local`, `<>persistent` or global variables can be assigned with `:=`",
            )),
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::TypeMatchError {
                context,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "The {} must be a {}, not a {}",
                context, expected, received
            )),
            ErrorImpl::ImplicitCast { from, to } => {
                ErrorTip::Suggestion(format!("Implicit cast of {} in {}", from, to))
            }
            ErrorImpl::NumberCoercion { context } => {
                ErrorTip::Suggestion(format!("The {} number is used as an int", context))
            }
            ErrorImpl::UnknownVariable { variable, storage } => {
                ErrorTip::Suggestion(format!("Unknown {} variable `{}`", storage, variable))
            }
            ErrorImpl::UnknownFunction { function } => {
                ErrorTip::Suggestion(format!("Function `{}` is not declared", function))
            }
            ErrorImpl::ArgumentCountMismatch {
                function,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "Function `{}` expects {} arguments, received {}",
                function, expected, received
            )),
            ErrorImpl::FunctionAlreadyDeclared { function } => {
                ErrorTip::Suggestion(format!("Function `{}` already declared", function))
            }
            ErrorImpl::InvalidOperator { operator } => {
                ErrorTip::Suggestion(format!("Operator `{}` is not supported here", operator))
            }
            ErrorImpl::UnsupportedType { type_ } => ErrorTip::Suggestion(format!(
                "Values of type {} cannot be lowered to machine code",
                type_
            )),
            ErrorImpl::MainTakesArguments { function, count } => ErrorTip::Suggestion(format!(
                "The last unit `{}` is the entry point and cannot take arguments (uses {})",
                function, count
            )),
            ErrorImpl::InvalidFunction { function } => {
                ErrorTip::Suggestion(format!("Generated code for `{}` is invalid", function))
            }
            ErrorImpl::NoCompilationUnit => ErrorTip::None,
            ErrorImpl::BackendError { message } => ErrorTip::Suggestion(message.clone()),
            ErrorImpl::ExecutionError { message } => ErrorTip::Suggestion(message.clone()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.position.1, self.position.0, self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("left hand side of `:=` is not a variable")]
    InvalidAssignmentTarget,
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("the {context} must be a {expected}, not a {received}")]
    TypeMatchError {
        context: String,
        expected: String,
        received: String,
    },
    #[error("implicit cast of {from} in {to}")]
    ImplicitCast { from: String, to: String },
    #[error("the {context} is a number, used as an int")]
    NumberCoercion { context: String },
    #[error("unknown {storage} variable {variable:?}")]
    UnknownVariable { variable: String, storage: String },
    #[error("unknown function {function:?}")]
    UnknownFunction { function: String },
    #[error("function {function:?} expects {expected} arguments, received {received}")]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("function {function:?} already declared")]
    FunctionAlreadyDeclared { function: String },
    #[error("invalid operator {operator:?}")]
    InvalidOperator { operator: String },
    #[error("unsupported type {type_}")]
    UnsupportedType { type_: String },
    #[error("entry function {function:?} takes {count} arguments")]
    MainTakesArguments { function: String, count: usize },
    #[error("function {function:?} failed verification")]
    InvalidFunction { function: String },
    #[error("no compilation unit was given")]
    NoCompilationUnit,
    #[error("backend error: {message}")]
    BackendError { message: String },
    #[error("execution error: {message}")]
    ExecutionError { message: String },
}

impl From<BuilderError> for ErrorImpl {
    fn from(error: BuilderError) -> Self {
        ErrorImpl::BackendError {
            message: format!("{:?}", error),
        }
    }
}
