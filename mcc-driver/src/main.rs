//! Mini C Compiler Driver
//!
//! Command-line front door: reads a source file, runs the compiler and
//! writes assembly, or dumps the token stream or typed AST as JSON.

use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use mcc_codegen::{compile_with_options, CodegenOptions};
use mcc_common::{CompilerError, Diagnostic, ErrorKind, Interner};
use mcc_frontend::Frontend;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mcc")]
#[command(about = "Mini C compiler targeting x86-64 assembly")]
#[command(version)]
struct Cli {
    /// Log compiler phases to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source file to assembly
    Compile {
        input: PathBuf,

        /// Output assembly file, `-` for stdout [default: input with .s extension]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Annotate functions and globals with comments
        #[arg(long)]
        comments: bool,
    },

    /// Dump the token stream as JSON
    Tokens { input: PathBuf },

    /// Dump the typed syntax tree as JSON
    Ast { input: PathBuf },
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compile {
            input,
            output,
            comments,
        } => compile_file(&input, output, CodegenOptions { emit_comments: comments }),
        Commands::Tokens { input } => dump_tokens(&input),
        Commands::Ast { input } => dump_ast(&input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn exit_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Source => 1,
        ErrorKind::Io => 2,
        ErrorKind::Internal => 101,
    }
}

/// Print a fatal error and pick the exit status for it
fn report(err: &CompilerError) -> ExitCode {
    eprintln!("{err}");
    if err.is_internal() {
        eprintln!("note: this is a bug in the compiler, please report it");
    }
    ExitCode::from(exit_status(err.kind()))
}

fn read_source(input: &Path) -> Result<(String, String), CompilerError> {
    let source = fs::read_to_string(input)
        .map_err(|err| CompilerError::from(io::Error::new(err.kind(), format!("{}: {err}", input.display()))))?;
    Ok((source, input.display().to_string()))
}

fn print_warnings(warnings: &[Diagnostic]) {
    for warning in warnings {
        eprintln!("{warning}");
    }
}

/// `foo.c` becomes `foo.s`
fn default_output(input: &Path) -> PathBuf {
    input.with_extension("s")
}

fn write_output(path: &Path, text: &str) -> Result<(), CompilerError> {
    if path == Path::new("-") {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
    } else {
        fs::write(path, text)?;
        debug!("wrote {}", path.display());
    }
    Ok(())
}

fn compile_file(input: &Path, output: Option<PathBuf>, options: CodegenOptions) -> Result<(), CompilerError> {
    let (source, filename) = read_source(input)?;
    let compiled = compile_with_options(&source, &filename, options)?;
    print_warnings(&compiled.warnings);

    let output = output.unwrap_or_else(|| default_output(input));
    write_output(&output, &compiled.assembly)
}

/// Pretty JSON with identifiers written as their text
fn to_json<T: serde::Serialize>(value: &T, interner: &Interner) -> Result<String, CompilerError> {
    interner
        .with_resolved_names(|| serde_json::to_string_pretty(value))
        .map_err(|err| CompilerError::internal_error(format!("JSON serialization failed: {err}")))
}

fn dump_tokens(input: &Path) -> Result<(), CompilerError> {
    let (source, filename) = read_source(input)?;
    let (tokens, interner) = Frontend::tokenize(&source, &filename)?;
    println!("{}", to_json(&tokens, &interner)?);
    Ok(())
}

fn dump_ast(input: &Path) -> Result<(), CompilerError> {
    let (source, filename) = read_source(input)?;
    let compilation = Frontend::compile(&source, &filename)?;
    print_warnings(&compilation.warnings);
    println!("{}", to_json(&compilation.unit, &compilation.interner)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_output_replaces_extension() {
        assert_eq!(default_output(Path::new("dir/prog.c")), PathBuf::from("dir/prog.s"));
        assert_eq!(default_output(Path::new("prog")), PathBuf::from("prog.s"));
    }

    #[test]
    fn test_cli_parses_compile() {
        let cli = Cli::try_parse_from(["mcc", "-v", "compile", "a.c", "-o", "-"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Compile { input, output, comments } => {
                assert_eq!(input, PathBuf::from("a.c"));
                assert_eq!(output, Some(PathBuf::from("-")));
                assert!(!comments);
            }
            _ => panic!("expected compile"),
        }
    }

    #[test]
    fn test_token_dump_names_identifiers() {
        let (tokens, interner) = Frontend::tokenize("int count;", "a.c").unwrap();
        let json = to_json(&tokens, &interner).unwrap();
        assert!(json.contains("\"Identifier\": \"count\""), "{json}");
    }

    #[test]
    fn test_ast_dump_names_variables_and_functions() {
        let compilation = Frontend::compile("int total; int main() { total = 1; }", "a.c").unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&to_json(&compilation.unit, &compilation.interner).unwrap()).unwrap();

        let items = json["items"].as_array().unwrap();
        assert_eq!(items[0]["Variable"]["name"], "total");
        assert_eq!(items[1]["Function"]["name"], "main");
    }

    #[test]
    fn test_exit_codes_follow_error_kind() {
        let source = CompilerError::semantic_error("bad", mcc_common::SourceLocation::new("a.c", 1, 1));
        let io_err = CompilerError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let internal = CompilerError::internal_error("broken");
        assert_eq!(exit_status(source.kind()), 1);
        assert_eq!(exit_status(io_err.kind()), 2);
        assert_eq!(exit_status(internal.kind()), 101);
    }
}
