//! Main compiler module.
//!
//! This module contains the core Compiler structure. It owns the LLVM module
//! and builder for a whole program and provides the pieces the program
//! builder assembles: builtin declarations, module globals, unit prototypes
//! and bodies, the synthesized entry point and the optimizer pipeline.

use std::{collections::HashMap, rc::Rc};

use inkwell::{
    basic_block::BasicBlock,
    builder::{Builder, BuilderError},
    context::Context,
    module::{Linkage, Module},
    passes::PassManager,
    types::{BasicMetadataTypeEnum, IntType},
    values::{FunctionValue, PointerValue},
    AddressSpace,
};
use tracing::debug;

use crate::{
    ast::{
        ast::{Function, VariableRef},
        types::{FunctionSignature, StorageClass, VarType},
    },
    errors::errors::{Error, ErrorImpl},
    type_checker::scope::{ScopeContext, RETURN_SLOT},
    Position,
};

use super::{builtins::BuiltinRegistry, stmt::gen_block};

/// Attaches a source position to errors coming out of the LLVM builder.
pub trait BuilderResultExt<T> {
    fn at(self, position: &Position) -> Result<T, Error>;
}

impl<T> BuilderResultExt<T> for Result<T, BuilderError> {
    fn at(self, position: &Position) -> Result<T, Error> {
        self.map_err(|error| Error::new(ErrorImpl::from(error), position.clone()))
    }
}

/// The main compiler structure that holds the state of the code generation.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the LLVM context
pub struct Compiler<'a> {
    /// Reference to the LLVM context
    pub context: &'a Context,
    /// The LLVM module being built
    pub module: Module<'a>,
    /// The LLVM IR builder
    pub builder: Builder<'a>,

    /// Stack slots of the function being lowered
    pub named_allocas: HashMap<String, PointerValue<'a>>,
    /// Module slots of global variables
    pub globals: HashMap<String, PointerValue<'a>>,
    /// Module slots of persistent variables
    pub persistents: HashMap<String, PointerValue<'a>>,
    /// Callable functions by surface name. A builtin's signature carries
    /// its implementation name.
    pub signatures: HashMap<String, FunctionSignature>,

    /// Where the statement being lowered starts
    pub position: Position,
}

impl<'a> Compiler<'a> {
    pub fn new(context: &'a Context, module_name: &str) -> Self {
        Compiler {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            named_allocas: HashMap::new(),
            globals: HashMap::new(),
            persistents: HashMap::new(),
            signatures: HashMap::new(),
            position: Position(0, Rc::new(String::from(module_name))),
        }
    }

    /// Every value of the language is a 32 bit signed integer.
    pub fn int_type(&self) -> IntType<'a> {
        self.context.i32_type()
    }

    /// Declares every builtin of the registry under its implementation name.
    pub fn declare_builtins(&mut self, registry: &BuiltinRegistry) {
        for (name, builtin) in registry.iter() {
            let params: Vec<BasicMetadataTypeEnum> = builtin
                .signature
                .args_type
                .iter()
                .map(|_| self.int_type().into())
                .collect();
            let function_type = self
                .int_type()
                .fn_type(&params, builtin.signature.is_variadic());

            if self.module.get_function(builtin.get_name()).is_none() {
                self.module
                    .add_function(builtin.get_name(), function_type, Some(Linkage::External));
            }
            self.signatures
                .insert(name.clone(), builtin.signature.clone());

            debug!(builtin = %name, signature = %builtin.signature, "Declared builtin");
        }
    }

    /// Creates the zero initialised module slots of every global and
    /// persistent variable. Persistent slots are prefixed with `<>`.
    pub fn create_globals(&mut self, scope: &ScopeContext) {
        for name in scope.globals.keys() {
            if !self.globals.contains_key(name) {
                let slot = self.create_global(name);
                self.globals.insert(name.clone(), slot);
            }
        }

        for name in scope.persistents.keys() {
            if !self.persistents.contains_key(name) {
                let slot = self.create_global(&format!("<>{}", name));
                self.persistents.insert(name.clone(), slot);
            }
        }

        debug!(
            globals = self.globals.len(),
            persistents = self.persistents.len(),
            "Created module variables"
        );
    }

    fn create_global(&self, name: &str) -> PointerValue<'a> {
        let global = self
            .module
            .add_global(self.int_type(), Some(AddressSpace::default()), name);
        global.set_initializer(&self.int_type().const_zero());
        global.as_pointer_value()
    }

    /// Declares `int name(int, ...)` with one parameter per positional argument.
    ///
    /// A builtin with the same surface name keeps precedence for calls.
    pub fn create_function_proto(
        &mut self,
        function: &Function,
        position: &Position,
    ) -> Result<FunctionValue<'a>, Error> {
        let name = &function.prototype.name;
        if self.module.get_function(name).is_some() {
            return Err(Error::new(
                ErrorImpl::FunctionAlreadyDeclared {
                    function: name.clone(),
                },
                position.clone(),
            ));
        }

        let params: Vec<BasicMetadataTypeEnum> = function
            .prototype
            .params
            .iter()
            .map(|_| self.int_type().into())
            .collect();
        let function_value = self.module.add_function(
            name,
            self.int_type().fn_type(&params, false),
            Some(Linkage::External),
        );

        for (param, param_name) in function_value
            .get_param_iter()
            .zip(function.prototype.params.iter())
        {
            param.into_int_value().set_name(param_name);
        }

        self.signatures.entry(name.clone()).or_insert_with(|| {
            FunctionSignature::new(
                name,
                VarType::Int,
                vec![VarType::Int; function.prototype.params.len()],
            )
        });

        Ok(function_value)
    }

    /// Lowers the body of a unit whose prototype is already declared.
    ///
    /// Every local found by tagging gets a zeroed stack slot in the entry
    /// block, incoming arguments are stored into the slot named by their
    /// index, and falling off the end returns `$0`, or 0 when `$0` is
    /// never used.
    pub fn compile_function(
        &mut self,
        function: &Function,
        scope: &ScopeContext,
    ) -> Result<FunctionValue<'a>, Error> {
        let name = &function.prototype.name;
        let position = function.body.span.start.clone();
        self.position = position.clone();

        let function_value = self.module.get_function(name).ok_or_else(|| {
            Error::new(
                ErrorImpl::UnknownFunction {
                    function: name.clone(),
                },
                position.clone(),
            )
        })?;

        let entry = self.create_basic_block("entry", function_value);
        self.builder.position_at_end(entry);

        self.named_allocas.clear();
        for local in scope.locals.keys() {
            let slot = self.builder.build_alloca(self.int_type(), local).at(&position)?;
            self.builder
                .build_store(slot, self.int_type().const_zero())
                .at(&position)?;
            self.named_allocas.insert(local.clone(), slot);
        }

        for (index, param) in function_value.get_param_iter().enumerate() {
            let slot_name = (index + 1).to_string();
            if let Some(slot) = self.named_allocas.get(&slot_name) {
                self.builder.build_store(*slot, param).at(&position)?;
            }
        }

        gen_block(self, &function.body, function_value)?;

        let return_value = if scope.uses_return_slot() {
            let slot = self.local_slot(RETURN_SLOT, &position)?;
            self.builder
                .build_load(slot, "return")
                .at(&self.position)?
                .into_int_value()
        } else {
            self.int_type().const_zero()
        };
        self.builder
            .build_return(Some(&return_value))
            .at(&self.position)?;

        if !function_value.verify(false) {
            return Err(Error::new(
                ErrorImpl::InvalidFunction {
                    function: name.clone(),
                },
                position,
            ));
        }

        debug!(
            function = %name,
            params = function.prototype.params.len(),
            locals = self.named_allocas.len(),
            "Lowered"
        );

        Ok(function_value)
    }

    /// Synthesizes the entry point, which calls `entry` and returns its result.
    ///
    /// It is named `main`, or `__main` when a unit already took that name.
    pub fn create_main(
        &mut self,
        entry: FunctionValue<'a>,
        position: &Position,
    ) -> Result<FunctionValue<'a>, Error> {
        let entry_name = entry.get_name().to_string_lossy().into_owned();
        if entry.count_params() != 0 {
            return Err(Error::new(
                ErrorImpl::MainTakesArguments {
                    function: entry_name,
                    count: entry.count_params() as usize,
                },
                position.clone(),
            ));
        }

        let name = if self.module.get_function("main").is_some() {
            "__main"
        } else {
            "main"
        };

        let main = self.module.add_function(
            name,
            self.int_type().fn_type(&[], false),
            Some(Linkage::External),
        );
        let block = self.create_basic_block("entry", main);
        self.builder.position_at_end(block);

        let result = self
            .builder
            .build_call(entry, &[], "calltmp")
            .at(position)?
            .try_as_basic_value()
            .left()
            .map(|value| value.into_int_value())
            .unwrap_or(self.int_type().const_zero());
        self.builder.build_return(Some(&result)).at(position)?;

        debug!(main = name, calls = %entry_name, "Created entry point");

        Ok(main)
    }

    /// Checks the whole module.
    pub fn verify(&self) -> Result<(), Error> {
        self.module.verify().map_err(|message| {
            Error::new(
                ErrorImpl::BackendError {
                    message: message.to_string(),
                },
                self.position.clone(),
            )
        })
    }

    /// Runs the optimization pipeline over the module.
    pub fn run_passes(&self) {
        let pass_manager = PassManager::create(());

        pass_manager.add_basic_alias_analysis_pass();
        pass_manager.add_promote_memory_to_register_pass();
        pass_manager.add_instruction_combining_pass();
        pass_manager.add_reassociate_pass();
        pass_manager.add_gvn_pass();
        pass_manager.add_cfg_simplification_pass();
        pass_manager.add_verifier_pass();

        pass_manager.run_on(&self.module);
        debug!("Optimized module");
    }

    /// Creates a new basic block at the end of `function`.
    pub fn create_basic_block(&self, name: &str, function: FunctionValue<'a>) -> BasicBlock<'a> {
        self.context.append_basic_block(function, name)
    }

    fn local_slot(&self, name: &str, position: &Position) -> Result<PointerValue<'a>, Error> {
        self.named_allocas.get(name).copied().ok_or_else(|| {
            Error::new(
                ErrorImpl::UnknownVariable {
                    variable: String::from(name),
                    storage: StorageClass::Local.to_string(),
                },
                position.clone(),
            )
        })
    }

    /// Slot of a variable, looked up in the table of its storage class.
    pub fn variable_pointer(
        &self,
        variable: &VariableRef,
        position: &Position,
    ) -> Result<PointerValue<'a>, Error> {
        let slot = match variable.storage {
            StorageClass::Local => self.named_allocas.get(&variable.name),
            StorageClass::Global => self.globals.get(&variable.name),
            StorageClass::Persistent => self.persistents.get(&variable.name),
        };

        slot.copied().ok_or_else(|| {
            Error::new(
                ErrorImpl::UnknownVariable {
                    variable: variable.name.clone(),
                    storage: variable.storage.to_string(),
                },
                position.clone(),
            )
        })
    }
}
