use std::fs;
use std::process;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use clifile::emit::EmitterType;
use clifile::interpreter::Interpreter;
use clifile::parser;

#[derive(Parser)]
#[command(name = "clifile")]
#[command(about = "Compiler for Clifile command definitions", version)]
struct Cli {
    /// Source file
    #[arg(short, long, global = true, default_value = "Clifile")]
    file: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tokens of the source
    Tokens,

    /// Compile the source and print the program
    Parse {
        /// Output format
        #[arg(long, default_value = "tree")]
        format: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List output formats
    Formats,

    /// List flag definitions
    Flags,

    /// Print the script of a rule after substitution
    Render {
        /// Rule path, outermost first
        #[arg(required = true)]
        rule: Vec<String>,

        /// Value for a variable or flag
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
    },
}

/// Filter built from `RUST_LOG`-style directives, `warn` when there are none.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives.unwrap_or(""))
}

fn main() {
    let directives = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(directives.as_deref()))
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Tokens => {
            let source = fs::read_to_string(&cli.file)?;
            for token in parser::lexer::tokenize(&source)? {
                let kind = format!("{:?}", token.kind);
                println!("{:<10} {:<22} {:?}", kind, token.span.to_string(), token.captures);
            }
        }
        Commands::Parse { format, output } => {
            let Some(emitter_type) = EmitterType::from_name(&format) else {
                return Err(format!("unknown format '{format}'").into());
            };
            let program = parser::parse_file(&cli.file)?;
            let text = emitter_type.create().emit(&program)?;

            match output {
                Some(path) => {
                    fs::write(&path, &text)?;
                    println!("Written to: {path}");
                }
                None => print!("{text}"),
            }
        }
        Commands::Formats => {
            println!("Supported formats:");
            for emitter in EmitterType::all() {
                println!("  {:8} - {}", emitter.name(), emitter.description());
            }
        }
        Commands::Flags => {
            let interpreter = Interpreter::new(parser::parse_file(&cli.file)?);
            for flag in interpreter.flags()? {
                println!(
                    "  --{:<16} {:<12} {}",
                    flag.cli_name(),
                    flag.kind().name(),
                    flag.doc()
                );
            }
        }
        Commands::Render { rule, set } => {
            let mut interpreter = Interpreter::new(parser::parse_file(&cli.file)?);
            for assignment in &set {
                let Some((name, value)) = assignment.split_once('=') else {
                    return Err(format!("expected NAME=VALUE, got '{assignment}'").into());
                };
                interpreter.bind(name, value)?;
            }
            print!("{}", interpreter.resolve(rule.as_slice())?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_defaults_to_warn() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(Some("")).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_log_filter_honours_global_level() {
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(Some("trace")).max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_log_filter_with_target() {
        let filter = log_filter(Some("clifile=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
