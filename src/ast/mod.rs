/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Statement, expression and definition nodes
/// - printer: Tree rendering used for `--print-ast` and tests
/// - types: Value types, storage classes and function signatures
pub mod ast;
pub mod printer;
pub mod types;
