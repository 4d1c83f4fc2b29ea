use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use crate::{
    baseline::BaselineArgs, evaluate::EvaluateArgs, generate::GenerateArgs, schema::SchemaArgs,
};

mod baseline;
mod evaluate;
mod file_utils;
mod generate;
mod network;
mod schema;
mod table;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generates a batch of instances from a generation config
    #[command(visible_alias = "g")]
    Generate {
        #[command(flatten)]
        args: GenerateArgs,
    },
    /// Scores solutions, exits with an error when one of them is infeasible
    #[command(visible_alias = "e")]
    Evaluate {
        #[command(flatten)]
        args: EvaluateArgs,
    },
    /// Solves instances with a reference baseline
    Baseline {
        #[command(flatten)]
        args: BaselineArgs,
    },
    /// Writes the JSON schema of a file format
    Schema {
        #[command(flatten)]
        args: SchemaArgs,
    },
}

fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Some(Commands::Generate { args }) => generate::run(args)?,
        Some(Commands::Evaluate { args }) => evaluate::run(args)?,
        Some(Commands::Baseline { args }) => baseline::run(args)?,
        Some(Commands::Schema { args }) => schema::run(args)?,
        None => {}
    }

    Ok(())
}
