use crate::Span;

use super::types::{StorageClass, VarType};

/// Ordered sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Statement kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(ExpressionStmt),
    Assignment(AssignmentStmt),
    If(IfStmt),
    For(ForStmt),
    While(WhileStmt),
    Repeat(RepeatStmt),
}

impl Stmt {
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::Expression(stmt) => &stmt.span,
            Stmt::Assignment(stmt) => &stmt.span,
            Stmt::If(stmt) => &stmt.span,
            Stmt::For(stmt) => &stmt.span,
            Stmt::While(stmt) => &stmt.span,
            Stmt::Repeat(stmt) => &stmt.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub span: Span,
}

/// `variable := value`. The target is always an `ExprKind::Variable`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStmt {
    pub variable: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Block,
    pub else_body: Option<Block>,
    pub span: Span,
}

/// `for(variable; begin; end[; increment])`.
///
/// Without an increment the loop steps by one toward `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub variable: Expr,
    pub begin: Expr,
    pub end: Expr,
    pub increment: Option<Expr>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

/// `repeat body until(condition)`, the body runs at least once.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatStmt {
    pub body: Block,
    pub condition: Expr,
    pub span: Span,
}

/// An expression node and its type slot, written by the tagging pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub var_type: VarType,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Raw literal text; its type is set at construction.
    Literal(String),
    Variable(VariableRef),
    Unary {
        operator: String,
        operand: Box<Expr>,
    },
    Binary {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        name: String,
        arguments: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRef {
    pub name: String,
    pub storage: StorageClass,
}

impl VariableRef {
    /// Index of a positional argument (`$1`, `$2`, ...), `0` being the return slot.
    pub fn argument_index(&self) -> Option<u32> {
        if self.storage != StorageClass::Local {
            return None;
        }

        if self.name.is_empty() || !self.name.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        self.name.parse::<u32>().ok()
    }
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            kind,
            var_type: VarType::Undetermined,
            span,
        }
    }

    pub fn literal(value: String, var_type: VarType, span: Span) -> Self {
        Expr {
            kind: ExprKind::Literal(value),
            var_type,
            span,
        }
    }

    pub fn variable(name: String, storage: StorageClass, span: Span) -> Self {
        Expr::new(ExprKind::Variable(VariableRef { name, storage }), span)
    }

    /// Whether this node may appear on the left of `:=`.
    pub fn is_var(&self) -> bool {
        matches!(self.kind, ExprKind::Variable(_))
    }

    pub fn as_variable(&self) -> Option<&VariableRef> {
        match &self.kind {
            ExprKind::Variable(variable) => Some(variable),
            _ => None,
        }
    }
}

/// Name and ordered parameter names of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
}

/// One compilation unit: a prototype and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub prototype: Prototype,
    pub body: Block,
}

impl Function {
    pub fn new(name: &str, body: Block) -> Self {
        Function {
            prototype: Prototype {
                name: String::from(name),
                params: vec![],
            },
            body,
        }
    }
}
