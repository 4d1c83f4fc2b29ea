use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;

use crate::problem::solution::Solution;

pub fn load_solution<P: AsRef<Path>>(path: P) -> Result<Solution, anyhow::Error> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open solution {}", path.display()))?;

    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse solution {}", path.display()))
}

pub fn save_solution<P: AsRef<Path>>(path: P, solution: &Solution) -> Result<(), anyhow::Error> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, solution)?;
    writer.flush()?;

    Ok(())
}
