//! Whole program build and execution.
//!
//! Every source unit becomes one function named after it. The last unit is
//! the entry point: a synthesized `main` calls it and returns its result.

use std::{path::Path, rc::Rc};

use inkwell::{
    context::Context,
    execution_engine::JitFunction,
    module::Module,
    targets::{InitializationConfig, Target},
    OptimizationLevel,
};
use tracing::{debug, info};

use crate::{
    ast::ast::Function,
    errors::errors::{Error, ErrorImpl},
    lexer::{lexer::tokenize, tokens::normalize_identifier},
    parser::parser::parse,
    type_checker::{scope::ScopeContext, type_checker::TypeChecker},
    CompileOptions, Position,
};

use super::{builtins::BuiltinRegistry, compiler::Compiler};

type MainFn = unsafe extern "C" fn() -> i32;

/// One input of a program: a name and its text.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub name: String,
    pub source: String,
}

impl SourceUnit {
    pub fn new(name: &str, source: &str) -> Self {
        SourceUnit {
            name: String::from(name),
            source: String::from(source),
        }
    }

    /// Names a unit after its file stem, normalized like an identifier so
    /// other units can call it.
    pub fn from_path(path: &Path, source: String) -> Self {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        SourceUnit {
            name: normalize_identifier(&stem),
            source,
        }
    }

    /// The unit read from standard input.
    pub fn stdin(source: String) -> Self {
        SourceUnit {
            name: String::from("stdin"),
            source,
        }
    }
}

/// A parsed and tagged unit.
#[derive(Debug, Clone)]
pub struct TaggedUnit {
    pub function: Function,
    pub scope: ScopeContext,
}

/// Lexes, parses and tags every unit.
///
/// Globals and persistents found in one unit are visible to the units
/// tagged after it; the returned context holds all of them.
pub fn analyze_units(
    units: &[SourceUnit],
    checker: &mut TypeChecker,
) -> Result<(Vec<TaggedUnit>, ScopeContext), Error> {
    let mut module_scope = ScopeContext::new();
    let mut tagged = Vec::with_capacity(units.len());

    for unit in units {
        let tokens = tokenize(unit.source.clone(), Some(unit.name.clone()))?;
        let (_, block) = parse(tokens, Rc::new(unit.name.clone()));

        let mut function = Function::new(&unit.name, block?);
        let mut scope = module_scope.for_function();
        checker.tag_function(&mut function, &mut scope);
        module_scope.absorb_module_variables(&scope);

        debug!(unit = %unit.name, "Parsed and tagged");
        tagged.push(TaggedUnit { function, scope });
    }

    Ok((tagged, module_scope))
}

/// A finished LLVM module and what is needed to run it.
pub struct Program<'ctx> {
    pub module: Module<'ctx>,
    /// Name of the synthesized entry point
    pub main_name: String,
    /// The tagged units, in input order
    pub units: Vec<TaggedUnit>,
    /// Diagnostics of the tagging pass
    pub type_checker: TypeChecker,
    builtins: Vec<(String, usize)>,
}

/// Builds a whole program from its units.
///
/// Every unit is parsed and tagged first, then lowered with [`lower_units`].
pub fn build_program<'ctx>(
    context: &'ctx Context,
    units: &[SourceUnit],
    registry: &BuiltinRegistry,
    options: &CompileOptions,
) -> Result<Program<'ctx>, Error> {
    if units.is_empty() {
        return Err(Error::new(ErrorImpl::NoCompilationUnit, Position::null()));
    }

    let mut type_checker = TypeChecker::new();
    let (tagged, module_scope) = analyze_units(units, &mut type_checker)?;
    let (module, main_name) = lower_units(context, &tagged, &module_scope, registry, options)?;

    debug!(
        units = tagged.len(),
        errors = type_checker.errors.len(),
        warnings = type_checker.warnings.len(),
        "Built program"
    );

    Ok(Program {
        module,
        main_name,
        units: tagged,
        type_checker,
        builtins: registry
            .iter()
            .map(|(_, builtin)| (String::from(builtin.get_name()), builtin.address))
            .collect(),
    })
}

/// Lowers tagged units into a verified module and returns it with the name
/// of its synthesized entry point.
///
/// Code generation declares the builtins, the module variables and every
/// unit prototype before lowering any body, so units may call each other in
/// any order. The units are only read, so the same units can be lowered
/// again into another context.
pub fn lower_units<'ctx>(
    context: &'ctx Context,
    units: &[TaggedUnit],
    module_scope: &ScopeContext,
    registry: &BuiltinRegistry,
    options: &CompileOptions,
) -> Result<(Module<'ctx>, String), Error> {
    let Some(last) = units.last() else {
        return Err(Error::new(ErrorImpl::NoCompilationUnit, Position::null()));
    };
    let last_name = &last.function.prototype.name;

    let mut compiler = Compiler::new(context, last_name);
    compiler.declare_builtins(registry);
    compiler.create_globals(module_scope);

    let mut functions = Vec::with_capacity(units.len());
    for unit in units.iter() {
        functions.push(
            compiler.create_function_proto(&unit.function, &unit.function.body.span.start)?,
        );
    }

    for unit in units.iter() {
        compiler.compile_function(&unit.function, &unit.scope)?;
    }

    let entry_position = Position(1, Rc::new(last_name.clone()));
    let entry = functions.last().copied().ok_or_else(|| {
        Error::new(ErrorImpl::NoCompilationUnit, entry_position.clone())
    })?;
    let main = compiler.create_main(entry, &entry_position)?;
    let main_name = main.get_name().to_string_lossy().into_owned();

    compiler.verify()?;
    if options.optimize {
        compiler.run_passes();
    }

    Ok((compiler.module, main_name))
}

impl<'ctx> Program<'ctx> {
    /// Textual LLVM IR of the module.
    pub fn print_ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    pub fn save_ir(&self, path: &Path) -> Result<(), Error> {
        self.module.print_to_file(path).map_err(|message| {
            Error::new(
                ErrorImpl::BackendError {
                    message: message.to_string(),
                },
                Position::null(),
            )
        })
    }

    /// JIT compiles the module and runs the entry point.
    ///
    /// The execution engine takes the module over, so a program runs once.
    pub fn execute(self) -> Result<i32, Error> {
        let execution_error = |message: String| {
            Error::new(ErrorImpl::ExecutionError { message }, Position::null())
        };

        Target::initialize_native(&InitializationConfig::default()).map_err(execution_error)?;

        let engine = self
            .module
            .create_jit_execution_engine(OptimizationLevel::None)
            .map_err(|message| execution_error(message.to_string()))?;

        for (name, address) in self.builtins.iter() {
            if let Some(function) = self.module.get_function(name) {
                engine.add_global_mapping(&function, *address);
            }
        }

        let main: JitFunction<MainFn> = unsafe { engine.get_function(&self.main_name) }
            .map_err(|error| execution_error(error.to_string()))?;

        info!(main = %self.main_name, "Executing");
        let result = unsafe { main.call() };

        Ok(result)
    }
}
