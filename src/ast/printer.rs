//! Debug rendering of the AST as an indented tree.
//!
//! ```text
//! Statement::If
//! +[IF]> BinaryOp < : boolean
//! |      +> Variable $i : undetermined
//! |      +> Literal 3 : number
//! +[THEN]> Block
//!          +> Statement::Expression
//! ```

use std::fmt::Display;

use super::ast::{Block, Expr, ExprKind, Function, Stmt};

trait TreeNode {
    fn label(&self) -> String;
    fn children(&self) -> Vec<(Option<&'static str>, &dyn TreeNode)>;
}

fn child<'n>(
    name: Option<&'static str>,
    node: &'n dyn TreeNode,
) -> (Option<&'static str>, &'n dyn TreeNode) {
    (name, node)
}

fn render(node: &dyn TreeNode, first_prefix: &str, prefix: &str, out: &mut String) {
    out.push_str(first_prefix);
    out.push_str(&node.label());
    out.push('\n');

    let children = node.children();
    let count = children.len();

    for (i, (name, child)) in children.into_iter().enumerate() {
        let branch = match name {
            Some(name) => format!("+[{}]> ", name),
            None => String::from("+> "),
        };
        let rail = if i + 1 == count { ' ' } else { '|' };
        let continuation = format!("{}{}", rail, " ".repeat(branch.len() - 1));

        render(
            child,
            &format!("{}{}", prefix, branch),
            &format!("{}{}", prefix, continuation),
            out,
        );
    }
}

impl TreeNode for Block {
    fn label(&self) -> String {
        String::from("Block")
    }

    fn children(&self) -> Vec<(Option<&'static str>, &dyn TreeNode)> {
        self.body
            .iter()
            .map(|stmt| child(None, stmt))
            .collect()
    }
}

impl TreeNode for Stmt {
    fn label(&self) -> String {
        match self {
            Stmt::Expression(_) => String::from("Statement::Expression"),
            Stmt::Assignment(_) => String::from("Statement::Assignment"),
            Stmt::If(_) => String::from("Statement::If"),
            Stmt::For(_) => String::from("Statement::For"),
            Stmt::While(_) => String::from("Statement::While"),
            Stmt::Repeat(_) => String::from("Statement::Repeat"),
        }
    }

    fn children(&self) -> Vec<(Option<&'static str>, &dyn TreeNode)> {
        match self {
            Stmt::Expression(stmt) => vec![child(None, &stmt.expression)],
            Stmt::Assignment(stmt) => vec![
                child(Some("Variable"), &stmt.variable),
                child(Some("EXPR"), &stmt.value),
            ],
            Stmt::If(stmt) => {
                let mut children = vec![
                    child(Some("IF"), &stmt.condition),
                    child(Some("THEN"), &stmt.then_body),
                ];
                if let Some(else_body) = &stmt.else_body {
                    children.push(child(Some("ELSE"), else_body));
                }
                children
            }
            Stmt::For(stmt) => {
                let mut children = vec![
                    child(Some("VAR"), &stmt.variable),
                    child(Some("BEGIN"), &stmt.begin),
                    child(Some("END"), &stmt.end),
                ];
                if let Some(increment) = &stmt.increment {
                    children.push(child(Some("STEP"), increment));
                }
                children.push(child(Some("DO"), &stmt.body));
                children
            }
            Stmt::While(stmt) => vec![
                child(Some("WHILE"), &stmt.condition),
                child(Some("DO"), &stmt.body),
            ],
            Stmt::Repeat(stmt) => vec![
                child(Some("REPEAT"), &stmt.body),
                child(Some("UNTIL"), &stmt.condition),
            ],
        }
    }
}

impl TreeNode for Expr {
    fn label(&self) -> String {
        let head = match &self.kind {
            ExprKind::Literal(value) => format!("Literal {}", value),
            ExprKind::Variable(variable) => {
                format!("Variable {}{}", variable.storage.sigil(), variable.name)
            }
            ExprKind::Unary { operator, .. } => format!("UnaryOp {}", operator),
            ExprKind::Binary { operator, .. } => format!("BinaryOp {}", operator),
            ExprKind::Call { name, .. } => format!("Call {}", name),
        };

        format!("{} : {}", head, self.var_type)
    }

    fn children(&self) -> Vec<(Option<&'static str>, &dyn TreeNode)> {
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Variable(_) => vec![],
            ExprKind::Unary { operand, .. } => vec![child(None, operand.as_ref())],
            ExprKind::Binary { left, right, .. } => {
                vec![child(None, left.as_ref()), child(None, right.as_ref())]
            }
            ExprKind::Call { arguments, .. } => arguments
                .iter()
                .map(|argument| child(None, argument))
                .collect(),
        }
    }
}

impl TreeNode for Function {
    fn label(&self) -> String {
        format!(
            "Function {}({})",
            self.prototype.name,
            self.prototype.params.join(", ")
        )
    }

    fn children(&self) -> Vec<(Option<&'static str>, &dyn TreeNode)> {
        vec![child(None, &self.body)]
    }
}

macro_rules! impl_display_tree {
    ($($node:ty),*) => {
        $(
            impl Display for $node {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    let mut out = String::new();
                    render(self, "", "", &mut out);
                    write!(f, "{}", out)
                }
            }
        )*
    };
}

impl_display_tree!(Block, Stmt, Expr, Function);
