//! Command-line surface (spec §6 "Driver surface"): flags map one-to-one
//! onto the spec's recognized flag set. Modeled on `chalk-repl`'s `Args`
//! struct, ported from docopt to `clap`'s derive API (docopt is effectively
//! unmaintained; clap is what the rest of the retrieved pack reaches for).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Artifact kinds a `--emit` flag can request (spec §6 "Commands produce
/// artifacts of kinds: raw-ast, raw-ir, ir, llvm, binary").
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum EmitKind {
    RawAst,
    RawIr,
    Ir,
    Llvm,
    Binary,
}

/// A `file:line` trace-inference target (spec §6). Stored unparsed beyond
/// splitting the two halves; the driver does not validate that `line`
/// exists in `file`, since it has no AST of its own to check it against.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TracePoint {
    pub file: String,
    pub line: u32,
}

impl std::str::FromStr for TracePoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (file, line) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected file:line, got {s:?}"))?;
        let line: u32 = line
            .parse()
            .map_err(|_| format!("expected a line number after ':', got {line:?}"))?;
        Ok(TracePoint { file: file.to_string(), line })
    }
}

#[derive(Parser, Debug)]
#[command(name = "marrow", about = "The marrow semantic core driver")]
pub struct Cli {
    /// Source file to compile (interpreted by the front end; the driver
    /// itself does not parse it, per spec §1's external-collaborator split).
    pub input: PathBuf,

    /// Treat each top-level source file as its own module rather than one
    /// flat module.
    #[arg(long = "compile-as-modules")]
    pub compile_as_modules: bool,

    /// Import the built-in module (numeric types, `movable`, etc.) before
    /// resolving names.
    #[arg(long = "import-builtin")]
    pub import_builtin: bool,

    /// Do not link against the standard library.
    #[arg(long = "no-std")]
    pub no_std: bool,

    /// Run the constraint system and mandatory passes, then stop; skip
    /// codegen/emission entirely.
    #[arg(long = "typecheck-only")]
    pub typecheck_only: bool,

    /// Render the indented `trace-inference` tree for goals raised at
    /// `file:line` (spec §6 "Trace format").
    #[arg(long = "trace-inference", value_name = "FILE:LINE")]
    pub trace_inference: Option<TracePoint>,

    /// Artifact kind to emit.
    #[arg(long, value_enum, default_value = "binary")]
    pub emit: EmitKind,

    /// Named IR-level transforms to run in addition to the mandatory
    /// passes, in the order given.
    #[arg(long = "transform", value_name = "NAME")]
    pub transform: Vec<String>,

    /// Additional library search directories (repeatable).
    #[arg(short = 'L', long = "library-search-path", value_name = "DIR")]
    pub library_search_path: Vec<PathBuf>,

    /// Additional libraries to link against (repeatable).
    #[arg(short = 'l', long = "link-library", value_name = "NAME")]
    pub link_library: Vec<String>,

    /// Output path; defaults to the input file's stem with an
    /// emit-kind-appropriate extension.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Emit `debug`-level tracing to stderr in addition to any
    /// `trace-inference` rendering.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Run IR-level optimizations beyond the mandatory passes.
    #[arg(long = "optimize")]
    pub optimize: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn trace_point_splits_on_last_colon() {
        let point = TracePoint::from_str("src/main.rs:42").unwrap();
        assert_eq!(point.file, "src/main.rs");
        assert_eq!(point.line, 42);
    }

    #[test]
    fn trace_point_rejects_missing_line() {
        assert!(TracePoint::from_str("no-colon-here").is_err());
        assert!(TracePoint::from_str("src/main.rs:not-a-number").is_err());
    }

    #[test]
    fn cli_parses_minimal_invocation_with_defaults() {
        let cli = Cli::parse_from(["marrow", "demo.mw"]);
        assert_eq!(cli.input, PathBuf::from("demo.mw"));
        assert_eq!(cli.emit, EmitKind::Binary);
        assert!(!cli.typecheck_only);
        assert!(cli.trace_inference.is_none());
    }

    #[test]
    fn cli_parses_repeated_library_flags_and_trace_point() {
        let cli = Cli::parse_from([
            "marrow",
            "demo.mw",
            "--emit",
            "ir",
            "-L",
            "vendor/a",
            "-L",
            "vendor/b",
            "-l",
            "foo",
            "--trace-inference",
            "demo.mw:7",
        ]);
        assert_eq!(cli.emit, EmitKind::Ir);
        assert_eq!(cli.library_search_path, vec![PathBuf::from("vendor/a"), PathBuf::from("vendor/b")]);
        assert_eq!(cli.link_library, vec!["foo".to_string()]);
        assert_eq!(cli.trace_inference, Some(TracePoint { file: "demo.mw".to_string(), line: 7 }));
    }
}
