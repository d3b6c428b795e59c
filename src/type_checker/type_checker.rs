use tracing::{debug, error, warn};

use crate::{
    ast::{
        ast::{Block, Expr, ExprKind, Function, Stmt},
        types::VarType,
    },
    errors::errors::{Error, ErrorImpl},
};

use super::scope::ScopeContext;

/// Operators whose result is a truth value whatever their operands are.
pub const BOOLEAN_OPERATORS: [&str; 9] = ["<", ">", "=", "<=", ">=", "#", "!=", "&", "|"];

/// Infers the type of every expression and collects variables into a
/// [`ScopeContext`].
///
/// Diagnostics never stop the walk. They are logged as they are found and
/// kept in `errors` and `warnings` for the caller to inspect.
#[derive(Debug, Default)]
pub struct TypeChecker {
    pub errors: Vec<Error>,
    pub warnings: Vec<Error>,
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn report_error(&mut self, error: Error) {
        error!("{}", error);
        self.errors.push(error);
    }

    fn report_warning(&mut self, warning: Error) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Tags a whole unit, then derives its parameters from the highest `$n` used.
    pub fn tag_function(&mut self, function: &mut Function, scope: &mut ScopeContext) {
        self.tag_block(&mut function.body, scope);

        function.prototype.params = (1..=scope.arg_count()).map(|i| i.to_string()).collect();

        debug!(
            function = %function.prototype.name,
            params = function.prototype.params.len(),
            locals = scope.locals.len(),
            "Tagged"
        );
    }

    pub fn tag_block(&mut self, block: &mut Block, scope: &mut ScopeContext) {
        for stmt in block.body.iter_mut() {
            self.tag_statement(stmt, scope);
        }
    }

    pub fn tag_statement(&mut self, stmt: &mut Stmt, scope: &mut ScopeContext) {
        match stmt {
            Stmt::Expression(stmt) => {
                self.tag_expression(&mut stmt.expression, scope);
            }
            Stmt::Assignment(stmt) => {
                self.tag_expression(&mut stmt.variable, scope);
                let value_type = self.tag_expression(&mut stmt.value, scope);

                if value_type.is_defined() {
                    define(&mut stmt.variable, value_type, scope);
                }
            }
            Stmt::If(stmt) => {
                self.tag_condition(&mut stmt.condition, "if condition", scope);
                self.tag_block(&mut stmt.then_body, scope);
                if let Some(else_body) = &mut stmt.else_body {
                    self.tag_block(else_body, scope);
                }
            }
            Stmt::For(stmt) => {
                self.tag_int(&mut stmt.variable, "for variable", scope);
                self.tag_int(&mut stmt.begin, "for begin", scope);
                self.tag_int(&mut stmt.end, "for end", scope);
                if let Some(increment) = &mut stmt.increment {
                    self.tag_int(increment, "for increment", scope);
                }
                self.tag_block(&mut stmt.body, scope);
            }
            Stmt::While(stmt) => {
                self.tag_condition(&mut stmt.condition, "while condition", scope);
                self.tag_block(&mut stmt.body, scope);
            }
            Stmt::Repeat(stmt) => {
                self.tag_block(&mut stmt.body, scope);
                self.tag_condition(&mut stmt.condition, "until condition", scope);
            }
        }
    }

    /// Tags `expr` and returns its type.
    ///
    /// A variable reference keeps the type already on the node; it does not
    /// pick up what other occurrences of the same name were inferred to be.
    pub fn tag_expression(&mut self, expr: &mut Expr, scope: &mut ScopeContext) -> VarType {
        match &mut expr.kind {
            ExprKind::Literal(_) => {}
            ExprKind::Variable(variable) => {
                scope.record(variable, expr.var_type);
            }
            ExprKind::Unary { operand, .. } => {
                expr.var_type = self.tag_expression(operand, scope);
            }
            ExprKind::Binary {
                operator,
                left,
                right,
            } => {
                let left_type = self.tag_expression(left, scope);
                let right_type = self.tag_expression(right, scope);

                if left_type.is_defined() && right_type.is_defined() && left_type != right_type {
                    self.report_error(Error::new(
                        ErrorImpl::ImplicitCast {
                            from: right_type.to_string(),
                            to: format!("`{}` with a {} operand", operator, left_type),
                        },
                        expr.span.start.clone(),
                    ));
                }

                expr.var_type = if BOOLEAN_OPERATORS.contains(&operator.as_str()) {
                    VarType::Boolean
                } else if left_type.is_defined() {
                    left_type
                } else {
                    right_type
                };
            }
            ExprKind::Call { arguments, .. } => {
                for argument in arguments.iter_mut() {
                    self.tag_expression(argument, scope);
                }
            }
        }

        expr.var_type
    }

    fn tag_condition(&mut self, condition: &mut Expr, context: &str, scope: &mut ScopeContext) {
        match self.tag_expression(condition, scope) {
            VarType::Boolean => {}
            VarType::Undetermined => define(condition, VarType::Boolean, scope),
            other => self.report_error(Error::new(
                ErrorImpl::TypeMatchError {
                    context: String::from(context),
                    expected: VarType::Boolean.to_string(),
                    received: other.to_string(),
                },
                condition.span.start.clone(),
            )),
        }
    }

    fn tag_int(&mut self, expr: &mut Expr, context: &str, scope: &mut ScopeContext) {
        match self.tag_expression(expr, scope) {
            VarType::Int => {}
            VarType::Undetermined => define(expr, VarType::Int, scope),
            VarType::Number => {
                self.report_warning(Error::new(
                    ErrorImpl::NumberCoercion {
                        context: String::from(context),
                    },
                    expr.span.start.clone(),
                ));
                define(expr, VarType::Int, scope);
            }
            other => self.report_error(Error::new(
                ErrorImpl::TypeMatchError {
                    context: String::from(context),
                    expected: VarType::Int.to_string(),
                    received: other.to_string(),
                },
                expr.span.start.clone(),
            )),
        }
    }
}

/// Gives `expr` a known type, and to the variable it names if it is one.
fn define(expr: &mut Expr, var_type: VarType, scope: &mut ScopeContext) {
    expr.var_type = var_type;
    if let ExprKind::Variable(variable) = &expr.kind {
        scope.record(variable, var_type);
    }
}
