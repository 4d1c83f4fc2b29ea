use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use lastmile_bench::{
    generation::{
        config::{GenerationConfig, generate_instances},
        region::Region,
    },
    json::instance_file::save_instance,
};
use tracing::info;

use crate::{file_utils::output_path, network::load_oracle};

#[derive(Args)]
pub struct GenerateArgs {
    /// Generation config file
    #[arg(short, long)]
    config: PathBuf,

    /// Folder the instance files are written to
    #[arg(short, long)]
    output: PathBuf,
}

pub fn run(args: GenerateArgs) -> Result<(), anyhow::Error> {
    let config = GenerationConfig::from_file(&args.config)?;
    let region = Region::from_file(&config.region)?;

    let oracle = match &config.network {
        Some(network) => Some(load_oracle(network, config.oracle)?),
        None => None,
    };

    info!(
        name = %config.name,
        instances = config.num_instances,
        deliveries = config.deliveries_per_instance,
        "Generating instances"
    );

    let generated = generate_instances(&config, &region, oracle.as_ref());

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let bar = ProgressBar::new(generated.len() as u64);
    bar.set_style(ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} {msg}")?);

    let mut failed = 0;
    for instance in &generated {
        bar.set_message(instance.name.clone());

        match &instance.result {
            Ok(generated) => save_instance(output_path(&args.output, &instance.name), generated)?,
            Err(_) => failed += 1,
        }

        bar.inc(1);
    }
    bar.finish_and_clear();

    if failed == generated.len() && failed > 0 {
        anyhow::bail!("Every instance of {} failed to generate", config.name);
    }

    info!(
        written = generated.len() - failed,
        failed,
        output = %args.output.display(),
        "Wrote instances"
    );

    Ok(())
}
