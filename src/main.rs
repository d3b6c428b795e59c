use std::{
    fs::read_to_string,
    io::{self, Read},
    path::PathBuf,
    process::exit,
};

use clap::Parser;
use fourdc::{
    compiler::{
        builtins::BuiltinRegistry,
        program::{build_program, SourceUnit},
    },
    display_error,
    errors::errors::Error,
    CompileOptions,
};
use inkwell::context::Context;
use tracing::{debug, error};

/// Compiles script units to native code and runs the last one.
#[derive(Parser, Debug)]
#[command(name = "fourdc", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Source files, one unit each, the last being the entry point. Reads stdin when empty or `-`
    files: Vec<PathBuf>,

    /// Write the LLVM IR of the program to a file
    #[arg(long, value_name = "PATH")]
    emit_ir: Option<PathBuf>,

    /// Print the LLVM IR of the program
    #[arg(long)]
    print_ir: bool,

    /// Print the tagged syntax tree of every unit
    #[arg(long)]
    print_ast: bool,

    /// Skip the optimization passes
    #[arg(long)]
    no_opt: bool,

    /// Build without running
    #[arg(long)]
    no_run: bool,

    /// Enable verbose logging (use multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn setup_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let formatter = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_level(true);

    tracing_subscriber::registry()
        .with(formatter)
        .with(filter)
        .init();
}

fn read_units(files: &[PathBuf]) -> io::Result<Vec<SourceUnit>> {
    if files.is_empty() {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return Ok(vec![SourceUnit::stdin(source)]);
    }

    let mut units = Vec::with_capacity(files.len());
    for file in files {
        if file.as_os_str() == "-" {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            units.push(SourceUnit::stdin(source));
        } else {
            debug!(file = %file.display(), "Reading");
            units.push(SourceUnit::from_path(file, read_to_string(file)?));
        }
    }

    Ok(units)
}

fn report(error: &Error, units: &[SourceUnit]) -> ! {
    let source = units
        .iter()
        .find(|unit| unit.name == *error.get_position().1)
        .map(|unit| unit.source.as_str())
        .unwrap_or_default();

    display_error(error, source);
    exit(1)
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let units = match read_units(&cli.files) {
        Ok(units) => units,
        Err(err) => {
            error!("Cannot read input: {}", err);
            exit(1)
        }
    };

    let context = Context::create();
    let options = CompileOptions {
        optimize: !cli.no_opt,
    };

    let program = match build_program(
        &context,
        &units,
        &BuiltinRegistry::with_defaults(),
        &options,
    ) {
        Ok(program) => program,
        Err(error) => report(&error, &units),
    };

    if cli.print_ast {
        for unit in program.units.iter() {
            println!("{}", unit.function);
        }
    }

    if cli.print_ir {
        print!("{}", program.print_ir());
    }

    if let Some(path) = &cli.emit_ir {
        if let Err(error) = program.save_ir(path) {
            report(&error, &units);
        }
    }

    if cli.no_run {
        return;
    }

    match program.execute() {
        Ok(result) => println!("=> {}", result),
        Err(error) => report(&error, &units),
    }
}
