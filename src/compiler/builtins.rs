//! Native functions callable from scripts.
//!
//! A builtin is known to scripts by a surface name (`alert`) and lives in
//! the module under its implementation name (`BUILTINalert`). The JIT maps
//! that declaration onto the native address stored here.

use std::collections::BTreeMap;

use crate::ast::types::{FunctionSignature, VarType};

/// Native entry point taking no argument.
pub type NativeFn0 = extern "C" fn() -> i32;
/// Native entry point taking one `int` argument.
pub type NativeFn1 = extern "C" fn(i32) -> i32;

#[derive(Debug, Clone, PartialEq)]
pub struct Builtin {
    /// Signature under the implementation name
    pub signature: FunctionSignature,
    /// Address of the native function
    pub address: usize,
}

impl Builtin {
    pub fn new(signature: FunctionSignature, address: usize) -> Self {
        Builtin { signature, address }
    }

    pub fn get_name(&self) -> &str {
        &self.signature.name
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuiltinRegistry {
    builtins: BTreeMap<String, Builtin>,
}

impl BuiltinRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        BuiltinRegistry::default()
    }

    /// `alert(int)` and `abort()`.
    pub fn with_defaults() -> Self {
        let mut registry = BuiltinRegistry::new();

        registry.register(
            "alert",
            Builtin::new(
                FunctionSignature::new("BUILTINalert", VarType::Int, vec![VarType::Int]),
                builtin_alert as NativeFn1 as usize,
            ),
        );
        registry.register(
            "abort",
            Builtin::new(
                FunctionSignature::new("BUILTINabort", VarType::Int, vec![]),
                builtin_abort as NativeFn0 as usize,
            ),
        );

        registry
    }

    /// Adds a builtin, replacing any previous one with the same surface name.
    pub fn register(&mut self, name: &str, builtin: Builtin) -> Option<Builtin> {
        self.builtins.insert(String::from(name), builtin)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Builtin)> {
        self.builtins.iter()
    }
}

extern "C" fn builtin_alert(value: i32) -> i32 {
    println!("{}", value);
    0
}

extern "C" fn builtin_abort() -> i32 {
    std::process::abort()
}
