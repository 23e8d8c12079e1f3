//! Driver entry point (spec §6): parses flags, wires up logging (and,
//! when asked, the `trace-inference` tracer), hands the input off to the
//! front-end boundary, runs the constraint system and mandatory IR passes,
//! and emits the requested artifact kind. Exit codes follow spec §6: zero
//! on success, non-zero on diagnostic error.

mod cli;
mod emit;
mod frontend;
mod trace;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use cli::{Cli, EmitKind};
use frontend::{DemoFrontend, Frontend};
use marrow_ir::{run_mandatory_passes, Module};
use marrow_solve::ConstraintSystem;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    let tracer = cli.trace_inference.is_some().then(|| Arc::new(trace::TraceLayer::new()));
    let registry = tracing_subscriber::registry().with(fmt::layer().with_filter(filter));
    match &tracer {
        Some(tracer) => registry.with(tracer.clone()).init(),
        None => registry.init(),
    }

    match run(&cli) {
        Ok(()) => {
            if let Some(tracer) = &tracer {
                print!("{}", tracer.render());
            }
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let frontend = DemoFrontend;
    let lowered = frontend.load(&cli.input)?;

    let system = ConstraintSystem::construct(
        &lowered.program,
        &lowered.relations,
        lowered.resolver.as_ref(),
        lowered.var_gen,
        lowered.goals,
        frontend::initial_bindings(),
        lowered.site,
    );
    let solution = system.solve();
    for diagnostic in solution.diagnostics.iter() {
        eprintln!("{diagnostic}");
    }
    if !solution.is_sound() {
        return Err("typecheck failed".to_string());
    }
    if cli.typecheck_only {
        return Ok(());
    }

    let mut module = Module::new();
    let mut sink = marrow_program::DiagnosticSink::new();
    run_mandatory_passes(&mut module, &mut sink);
    for diagnostic in sink.iter() {
        eprintln!("{diagnostic}");
    }
    if sink.has_errors() {
        return Err("IR legalization failed".to_string());
    }

    match cli.emit {
        EmitKind::RawAst | EmitKind::RawIr | EmitKind::Ir => {
            let rendered = emit::render_module(&module);
            match &cli.output {
                Some(path) => std::fs::write(path, rendered).map_err(|e| e.to_string())?,
                None => print!("{rendered}"),
            }
        }
        EmitKind::Llvm | EmitKind::Binary => {
            return Err(format!("{:?} emission is not implemented by this driver", cli.emit));
        }
    }
    Ok(())
}
