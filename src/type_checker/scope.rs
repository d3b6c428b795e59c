use std::collections::BTreeMap;

use crate::ast::{ast::VariableRef, types::{StorageClass, VarType}};

/// Name of the local slot holding the value returned by a unit.
pub const RETURN_SLOT: &str = "0";

/// Variables discovered while tagging one function.
///
/// Locals and positional arguments belong to the function. Globals and
/// persistents are shared by every unit of a program and are carried from
/// one function to the next with [`ScopeContext::for_function`] and
/// [`ScopeContext::absorb_module_variables`].
///
/// Ordered maps keep slot creation, and therefore the emitted IR, stable
/// between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeContext {
    pub args: BTreeMap<u32, VarType>,
    pub locals: BTreeMap<String, VarType>,
    pub globals: BTreeMap<String, VarType>,
    pub persistents: BTreeMap<String, VarType>,
}

impl ScopeContext {
    pub fn new() -> Self {
        ScopeContext::default()
    }

    /// Fresh function scope that starts from the module variables known so far.
    pub fn for_function(&self) -> Self {
        ScopeContext {
            args: BTreeMap::new(),
            locals: BTreeMap::new(),
            globals: self.globals.clone(),
            persistents: self.persistents.clone(),
        }
    }

    pub fn absorb_module_variables(&mut self, other: &ScopeContext) {
        for (name, var_type) in &other.globals {
            upgrade(&mut self.globals, name, *var_type);
        }
        for (name, var_type) in &other.persistents {
            upgrade(&mut self.persistents, name, *var_type);
        }
    }

    /// Registers a variable. A defined type replaces whatever was recorded;
    /// an undetermined one never erases a known type.
    pub fn record(&mut self, variable: &VariableRef, var_type: VarType) {
        match variable.storage {
            StorageClass::Local => {
                if let Some(index) = variable.argument_index() {
                    let entry = self.args.entry(index).or_insert(VarType::Undetermined);
                    if var_type.is_defined() {
                        *entry = var_type;
                    }
                }
                upgrade(&mut self.locals, &variable.name, var_type);
            }
            StorageClass::Global => upgrade(&mut self.globals, &variable.name, var_type),
            StorageClass::Persistent => upgrade(&mut self.persistents, &variable.name, var_type),
        }
    }

    /// Number of positional parameters, the highest `$n` referenced with `n >= 1`.
    pub fn arg_count(&self) -> u32 {
        self.args.keys().copied().filter(|index| *index > 0).max().unwrap_or(0)
    }

    /// Whether `$0` is referenced, in which case it is the return value.
    pub fn uses_return_slot(&self) -> bool {
        self.locals.contains_key(RETURN_SLOT)
    }
}

fn upgrade(map: &mut BTreeMap<String, VarType>, name: &str, var_type: VarType) {
    let entry = map.entry(name.to_string()).or_insert(VarType::Undetermined);
    if var_type.is_defined() {
        *entry = var_type;
    }
}
