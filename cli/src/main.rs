mod config;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use config::Config;
use mbasic_hal::{ConsoleIo, NativeFileSystem};
use mbasic_lexer::tokenize;
use mbasic_parser::Parser;
use mbasic_runtime::{Interpreter, Program};

/// mbasic: an interpreter for a classic dialect of Microsoft BASIC
#[derive(ClapParser)]
#[command(name = "mbasic")]
#[command(about = "An interpreter for a classic dialect of Microsoft BASIC")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and run a BASIC program
    Run {
        /// Path to the program's source file
        file: PathBuf,
    },

    /// Tokenize a program and print its tokens
    Tokenize {
        /// Path to the program's source file
        file: PathBuf,
    },

    /// Parse a program and print its statement list
    Parse {
        /// Path to the program's source file
        file: PathBuf,
    },

    /// Check a program for syntax errors without running it
    Check {
        /// Path to the program's source file
        file: PathBuf,
    },

    /// Show the resolved configuration
    Config,

    /// Start the interactive immediate-mode shell
    Repl,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().unwrap_or_default();

    if let Err(e) = run_command(cli.command, config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("mbasic={default_level}")));

    fmt().with_env_filter(filter).with_target(false).without_time().init();
}

fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Run { file } => run_file(&file, &config),
        Commands::Tokenize { file } => tokenize_file(&file),
        Commands::Parse { file } => parse_file(&file),
        Commands::Check { file } => check_file(&file),
        Commands::Config => show_config(&config),
        Commands::Repl => run_repl(&config),
    }
}

/// Parses the on-disk line-number program format: a leading integer, a
/// single space, then the source text; blank lines are ignored.
fn load_program(source: &str) -> Result<Program> {
    let mut program = Program::new();
    for raw in source.lines() {
        if raw.trim().is_empty() {
            continue;
        }
        let (number, text) = split_numbered_line(raw)
            .with_context(|| format!("malformed program line: {raw:?}"))?;
        program.set_line(number, text.to_string());
    }
    Ok(program)
}

fn split_numbered_line(raw: &str) -> Option<(u32, &str)> {
    let trimmed = raw.trim_start();
    let split_at = trimmed.find(|c: char| !c.is_ascii_digit())?;
    let number: u32 = trimmed[..split_at].parse().ok()?;
    Some((number, trimmed[split_at..].trim_start()))
}

fn run_file(file: &PathBuf, config: &Config) -> Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("failed to read file: {}", file.display()))?;

    tracing::debug!("loading program");
    let program = load_program(&source)?;

    tracing::debug!("compiling program");
    let mut parser = Parser::new();
    let compiled = program
        .compile(&mut parser)
        .map_err(|e| anyhow::anyhow!("{}", e.display_with_line()))?;

    let mut console = ConsoleIo::new();
    let mut fs_backend = NativeFileSystem::new();
    let mut interpreter = Interpreter::new(&compiled, &mut console, &mut fs_backend);
    if let Some(seed) = config.interpreter.rng_seed {
        interpreter.seed_rng(seed);
    }

    tracing::debug!("running program");
    interpreter
        .run()
        .map_err(|e| anyhow::anyhow!("{}", e.display_with_line()))?;

    Ok(())
}

fn tokenize_file(file: &PathBuf) -> Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("failed to read file: {}", file.display()))?;

    for raw in source.lines() {
        if raw.trim().is_empty() {
            continue;
        }
        let (number, text) = split_numbered_line(raw)
            .with_context(|| format!("malformed program line: {raw:?}"))?;
        let tokens = tokenize(text, number as usize)?;
        println!("{number}:");
        for token in &tokens {
            println!("  col {:3}: {:?}", token.column, token.kind);
        }
    }

    Ok(())
}

fn parse_file(file: &PathBuf) -> Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("failed to read file: {}", file.display()))?;

    let program = load_program(&source)?;
    let mut parser = Parser::new();
    let compiled = program
        .compile(&mut parser)
        .map_err(|e| anyhow::anyhow!("{}", e.display_with_line()))?;

    for line in &compiled.lines {
        println!("{}: {:#?}", line.number, line.statements);
    }

    Ok(())
}

fn check_file(file: &PathBuf) -> Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("failed to read file: {}", file.display()))?;

    let program = load_program(&source)?;
    let mut parser = Parser::new();
    program
        .compile(&mut parser)
        .map_err(|e| anyhow::anyhow!("{}", e.display_with_line()))?;

    println!("No errors found.");
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn run_repl(config: &Config) -> Result<()> {
    println!("mbasic interactive shell");
    println!("Commands: RUN, LIST, NEW, CLEAR, LOAD <path>, SAVE [<path>], BYE");
    println!();

    let mut program = Program::new();
    let mut parser = Parser::new();
    let mut path: Option<PathBuf> = None;
    let stdin = io::stdin();

    print!("Ok\n> ");
    io::stdout().flush()?;

    for line in stdin.lock().lines() {
        let input = line?;
        let trimmed = input.trim();

        if trimmed.eq_ignore_ascii_case("bye")
            || trimmed.eq_ignore_ascii_case("exit")
            || trimmed.eq_ignore_ascii_case("quit")
        {
            break;
        } else if trimmed.eq_ignore_ascii_case("new") {
            program.clear();
            parser.reset();
            println!("Ok");
        } else if trimmed.eq_ignore_ascii_case("clear") {
            program.clear();
            println!("Ok");
        } else if trimmed.eq_ignore_ascii_case("list") {
            for (number, text) in program.iter() {
                println!("{number} {text}");
            }
            println!("Ok");
        } else if trimmed.eq_ignore_ascii_case("run") {
            repl_run(&program, &mut parser, config);
            println!("Ok");
        } else if let Some(rest) = strip_ci_prefix(trimmed, "load ") {
            path = Some(PathBuf::from(rest.trim()));
            match fs::read_to_string(path.as_ref().unwrap()) {
                Ok(source) => match load_program(&source) {
                    Ok(loaded) => {
                        program = loaded;
                        println!("Ok");
                    }
                    Err(e) => println!("?{e}"),
                },
                Err(e) => println!("?{e}"),
            }
        } else if trimmed.eq_ignore_ascii_case("save") || strip_ci_prefix(trimmed, "save ").is_some() {
            let target = strip_ci_prefix(trimmed, "save ")
                .map(|p| PathBuf::from(p.trim()))
                .or_else(|| path.clone());
            match target {
                Some(target) => {
                    let mut text = String::new();
                    for (number, line) in program.iter() {
                        text.push_str(&format!("{number} {line}\n"));
                    }
                    match fs::write(&target, text) {
                        Ok(()) => {
                            path = Some(target);
                            println!("Ok");
                        }
                        Err(e) => println!("?{e}"),
                    }
                }
                None => println!("?No file name"),
            }
        } else if !trimmed.is_empty() {
            if let Some((number, text)) = split_numbered_line(trimmed) {
                program.set_line(number, text.to_string());
            } else {
                println!("?Line must start with a line number");
            }
        }

        print!("> ");
        io::stdout().flush()?;
    }

    println!("\nGoodbye!");
    Ok(())
}

fn repl_run(program: &Program, parser: &mut Parser, config: &Config) {
    let compiled = match program.compile(parser) {
        Ok(compiled) => compiled,
        Err(e) => {
            println!("{}", e.display_with_line());
            return;
        }
    };

    let mut console = ConsoleIo::new();
    let mut fs_backend = NativeFileSystem::new();
    let mut interpreter = Interpreter::new(&compiled, &mut console, &mut fs_backend);
    if let Some(seed) = config.interpreter.rng_seed {
        interpreter.seed_rng(seed);
    }
    if let Err(e) = interpreter.run() {
        println!("{}", e.display_with_line());
    }
}

fn strip_ci_prefix<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len() && s[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}
