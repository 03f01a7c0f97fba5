use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shader_debugger::parser::types::ShaderType;
use shader_debugger::{server, InstrumentOptions, Instrumenter, LoopCaps};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Rewrite a GLSL shader so its output color shows a variable's value.
#[derive(Debug, Parser)]
#[command(name = "shader-debugger", version, about)]
struct Cli {
    /// JSON file with instrumentation options.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Append logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Instrument one line of a shader file and print the result.
    Instrument {
        file: PathBuf,
        /// 0-based target line.
        #[arg(long)]
        line: usize,
        /// Editor text of the target line, used to correct line drift.
        #[arg(long, default_value = "")]
        text: String,
        /// Loop iteration cap as LOOP_INDEX=MAX, repeatable.
        #[arg(long = "cap", value_parser = parse_cap)]
        caps: Vec<(usize, u32)>,
    },
    /// Wrap a single statement into a minimal entry point.
    Snippet {
        statement: String,
        /// Type of the assigned variable when the statement is not a declaration.
        #[arg(long = "type")]
        ty: Option<String>,
    },
    /// Answer Content-Length framed JSON requests on stdin.
    Serve,
}

fn parse_cap(s: &str) -> Result<(usize, u32), String> {
    let (index, max) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LOOP_INDEX=MAX, got `{}`", s))?;
    let index = index
        .trim()
        .parse()
        .map_err(|e| format!("bad loop index `{}`: {}", index, e))?;
    let max = max
        .trim()
        .parse()
        .map_err(|e| format!("bad cap `{}`: {}", max, e))?;
    Ok((index, max))
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_env("SHADER_DEBUGGER_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_options(path: Option<&Path>) -> Result<InstrumentOptions> {
    match path {
        Some(path) => InstrumentOptions::load(path)
            .with_context(|| format!("cannot load config {}", path.display())),
        None => Ok(InstrumentOptions::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;
    let instrumenter = Instrumenter::new(load_options(cli.config.as_deref())?);

    match cli.command {
        Command::Instrument {
            file,
            line,
            text,
            caps,
        } => {
            let source = fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let caps: LoopCaps = caps.into_iter().collect();
            match instrumenter.try_instrument(&source, line, &text, &caps) {
                Ok(out) => {
                    let mut stdout = io::stdout().lock();
                    stdout.write_all(out.as_bytes())?;
                    stdout.flush()?;
                }
                Err(e) => {
                    eprintln!("{}: {}", file.display(), e);
                    std::process::exit(2);
                }
            }
        }
        Command::Snippet { statement, ty } => {
            let ty = ty.as_deref().map(ShaderType::parse);
            match instrumenter.instrument_snippet(&statement, ty) {
                Some(out) => println!("{}", out),
                None => {
                    eprintln!("`{}` has no visualizable value", statement.trim());
                    std::process::exit(2);
                }
            }
        }
        Command::Serve => {
            let stdin = io::stdin();
            server::serve(instrumenter, stdin.lock(), io::stdout().lock())
                .context("server failed")?;
        }
    }

    Ok(())
}
