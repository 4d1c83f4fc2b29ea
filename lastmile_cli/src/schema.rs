use std::path::PathBuf;

use clap::{Args, ValueEnum};
use lastmile_bench::json::schema::{SchemaKind, generate_json_schema};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SchemaKindArg {
    Instance,
    Solution,
    Region,
    Config,
    Network,
}

impl From<SchemaKindArg> for SchemaKind {
    fn from(kind: SchemaKindArg) -> Self {
        match kind {
            SchemaKindArg::Instance => SchemaKind::Instance,
            SchemaKindArg::Solution => SchemaKind::Solution,
            SchemaKindArg::Region => SchemaKind::Region,
            SchemaKindArg::Config => SchemaKind::GenerationConfig,
            SchemaKindArg::Network => SchemaKind::RoadNetwork,
        }
    }
}

#[derive(Args)]
pub struct SchemaArgs {
    #[arg(short, long, value_enum)]
    kind: SchemaKindArg,

    /// Schema file to write
    #[arg(long, short = 'o')]
    out: PathBuf,
}

pub fn run(args: SchemaArgs) -> Result<(), anyhow::Error> {
    let schema = generate_json_schema(args.kind.into())?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(args.out, schema)?;

    Ok(())
}
