use std::{
    error::Error,
    fmt::Write as _,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, ValueEnum};
use coral::{
    lexer::{Lexer, TokenSource},
    parser, CompileError,
    util::{fmt::tree, intern::Interner},
};

#[derive(Parser)]
#[command(name = "coralc")]
#[command(about = "Compiles Coral source files into a textual IR module")]
struct Args {
    /// Path to the source file to compile
    file: PathBuf,

    /// What to produce
    #[arg(long, value_enum, default_value_t = Emit::Ir)]
    emit: Emit,

    /// Output path. Defaults to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Name of the emitted module. Defaults to the file stem
    #[arg(long)]
    module_name: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Emit {
    Tokens,
    Ast,
    Ir,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error} (in {})", args.file.display());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let src = fs::read_to_string(&args.file)?;
    let output = match args.emit {
        Emit::Tokens => emit_tokens(&src),
        Emit::Ast => emit_ast(&src)?,
        Emit::Ir => {
            let module_name = args
                .module_name
                .clone()
                .unwrap_or_else(|| file_stem(&args.file));
            coral::compile(&src, &module_name)?.to_string()
        }
    };

    // Nothing is written unless the whole compilation succeeded.
    match &args.output {
        Some(path) => fs::write(path, output)?,
        None => io::stdout().lock().write_all(output.as_bytes())?,
    }
    Ok(())
}

fn emit_tokens(src: &str) -> String {
    let mut out = String::with_capacity(src.len() * 4);
    let mut lexer = Lexer::new(src);
    loop {
        let token = lexer.next_token();
        if token.kind.is_trivia() {
            continue;
        }
        writeln!(out, "{token:?}").expect("writing to a string");
        if token.is_eof() {
            break out;
        }
    }
}

fn emit_ast(src: &str) -> Result<String, CompileError> {
    let mut idents = Interner::with_capacity(128);
    let program = parser::parse_program(src, &mut idents)
        .map_err(|error| CompileError::from_parse(&idents, &error))?;
    Ok(tree::print_program_string(&idents, &program))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "main".to_owned(), |stem| stem.to_string_lossy().into_owned())
}
