use std::path::PathBuf;

use clap::Parser;
use resnet_graph::extract::RawSource;
use resnet_graph::{config, run_stages, PipelineContext, Stage, StageOptions};

/// resnet-graph - Normalize ResNet extracts for graph bulk import
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Stages to run, in order
    #[arg(long = "stage", value_enum, required = true, num_args = 1..)]
    stages: Vec<Stage>,

    /// Directory for raw extracts, intermediate snapshots and outputs
    #[arg(long)]
    base_path: Option<PathBuf>,

    /// Output file name override (only with a single stage)
    #[arg(long)]
    file_name: Option<String>,

    /// YAML configuration file (environment variables otherwise)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raw extract location for register-raw, as <source>=<path>
    #[arg(long = "raw", value_parser = parse_raw_entry)]
    raw: Vec<(RawSource, PathBuf)>,
}

impl From<&Cli> for config::CliConfig {
    fn from(cli: &Cli) -> Self {
        config::CliConfig {
            base_path: cli.base_path.clone(),
            config_file: cli.config.clone(),
        }
    }
}

fn parse_raw_entry(entry: &str) -> Result<(RawSource, PathBuf), String> {
    let (source, path) = entry
        .split_once('=')
        .ok_or_else(|| format!("expected <source>=<path>, got `{}`", entry))?;
    if path.is_empty() {
        return Err(format!("empty path for raw source `{}`", source));
    }
    Ok((source.parse()?, PathBuf::from(path)))
}

fn main() {
    dotenvy::dotenv().ok();
    // Defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let options = StageOptions {
        file_name: cli.file_name.clone(),
        raw: cli.raw.clone(),
    };
    if let Err(e) = options.validate(&cli.stages) {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let config = match config::PipelineConfig::from_cli((&cli).into()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let result = PipelineContext::open(config)
        .and_then(|mut ctx| run_stages(&mut ctx, &cli.stages, &options));
    if let Err(e) = result {
        eprintln!("{}", e.report());
        std::process::exit(1);
    }
}
