mod schema;

use anyhow::{Result, bail};
use argdecode::{ArgIndex, normalize};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

use crate::schema::{DEFAULT_SCHEMA_NAME, Schema};

#[derive(Parser)]
#[command(name = "argdecode")]
#[command(version, about = "Inspect how an argument list is normalized and decoded", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show normalized name/value pairs and positional arguments
    Tokens(TokensArgs),

    /// Show the argument index as JSON
    Index(IndexArgs),

    /// Decode arguments against a field schema
    Check(CheckArgs),
}

#[derive(Parser)]
struct TokensArgs {
    /// Print JSON instead of one pair per line
    #[arg(long)]
    json: bool,

    /// Arguments to normalize
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Parser)]
struct IndexArgs {
    /// Arguments to index
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to the field schema
    #[arg(short, long, default_value = DEFAULT_SCHEMA_NAME, value_name = "FILE")]
    schema: PathBuf,

    /// Print errors as JSON
    #[arg(long)]
    json: bool,

    /// Arguments to decode
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Tokens(args) => tokens(args),
        Commands::Index(args) => index(args),
        Commands::Check(args) => check(args),
    }
}

fn tokens(args: TokensArgs) -> Result<()> {
    tracing::debug!("executing tokens command");

    let normalized = normalize(&args.args);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&normalized)?);
        return Ok(());
    }

    for (name, value) in &normalized.pairs {
        println!("{name}\t{value}");
    }
    for value in &normalized.positionals {
        println!("{}\t{value}", argdecode::POSITIONAL_KEY);
    }
    Ok(())
}

fn index(args: IndexArgs) -> Result<()> {
    tracing::debug!("executing index command");

    let index = ArgIndex::build(&normalize(&args.args));
    println!("{}", serde_json::to_string_pretty(&index)?);
    Ok(())
}

fn check(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let schema = Schema::from_file(&args.schema)?;
    let decoder = schema.decoder();

    match argdecode::decode(&args.args, &decoder) {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(errors) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&errors)?);
            } else {
                for err in &errors {
                    eprintln!("error: {err}");
                }
            }
            bail!("{} argument error(s)", errors.len());
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
