use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Patch a Kubernetes Job manifest to run over GPUDirect-TCPX.
#[derive(Parser)]
#[command(about, version)]
pub struct Cli {
    #[arg(
        short,
        long,
        help = "Path to your job template YAML file",
        value_hint = clap::ValueHint::FilePath
    )]
    pub file: Option<PathBuf>,

    #[arg(short, long, help = "NCCL plugin version")]
    pub nccl: Option<String>,

    #[arg(short, long, help = "RxDM version")]
    pub rxdm: Option<String>,
}

/// A fully resolved invocation; any argument omitted on the command line
/// has been prompted for.
pub struct InjectOptions {
    pub file: PathBuf,
    pub nccl: String,
    pub rxdm: String,
}

impl Cli {
    /// Fill in missing arguments interactively.
    pub fn resolve(self) -> Result<InjectOptions> {
        let file = match self.file {
            Some(file) => file,
            None => prompt("Please provide the path to your job template YAML file: ")?.into(),
        };
        let nccl = match self.nccl {
            Some(nccl) => nccl,
            None => prompt("Enter the NCCL plugin version: ")?,
        };
        let rxdm = match self.rxdm {
            Some(rxdm) => rxdm,
            None => prompt("Enter the RxDM version: ")?,
        };
        Ok(InjectOptions { file, nccl, rxdm })
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().context("flush prompt to stdout")?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("read answer from stdin")?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn resolve_passes_provided_arguments_through() {
        let cli = Cli::parse_from([
            "tcpx-inject",
            "--file",
            "job.yaml",
            "--nccl",
            "v3.1.7",
            "--rxdm",
            "v2.0.12",
        ]);
        let options = cli.resolve().unwrap();
        assert_eq!(options.file, PathBuf::from("job.yaml"));
        assert_eq!(options.nccl, "v3.1.7");
        assert_eq!(options.rxdm, "v2.0.12");
    }
}
