use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use tcpx_inject::cli::Cli;
use tcpx_inject::logging;
use tcpx_inject::output::{next_steps, tcpx_output_path};
use tcpx_manifest::JobManifest;

fn main() -> Result<()> {
    logging::init();

    let options = Cli::parse().resolve()?;

    let input = fs::read_to_string(&options.file)
        .with_context(|| format!("read job template {}", options.file.display()))?;
    let mut manifest: JobManifest = input
        .parse()
        .with_context(|| format!("parse job template {}", options.file.display()))?;

    tcpx_manifest::enable_tcpx(&mut manifest, &options.rxdm);

    let output_path = tcpx_output_path(&options.file);
    let patched = manifest
        .to_yaml()
        .context("serialize patched manifest")?;
    fs::write(&output_path, patched)
        .with_context(|| format!("write patched manifest {}", output_path.display()))?;

    tracing::info!("wrote patched manifest to {}", output_path.display());

    print!("{}", next_steps(&output_path, &options.nccl));
    Ok(())
}
