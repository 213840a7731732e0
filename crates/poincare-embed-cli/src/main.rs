//! # poincare-embed
//!
//! Train Poincaré ball embeddings for a tab-separated edge list.
//!
//! ```text
//! poincare-embed --graph mammals.tsv --output-vectors mammals.vec \
//!     --dimension 10 --epochs 50 --threads 8 --checkpoint-interval 10
//! ```
//!
//! Flags override values from `--config <file.json>`, which in turn override
//! the built-in defaults. Results are deterministic only with `--threads 1`.
//! Set `RUST_LOG=poincare_embed=debug` for per-batch progress.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use poincare_embed::{TrainConfig, Trainer};

#[derive(Parser, Debug)]
#[command(name = "poincare-embed", version)]
#[command(about = "Learn hyperbolic (Poincaré ball) embeddings of a directed graph")]
struct Cli {
    /// JSON file with a training configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Training graph: one `source<TAB>target` edge per line
    #[arg(long)]
    graph: Option<PathBuf>,

    /// File path for the trained vectors
    #[arg(long)]
    output_vectors: Option<PathBuf>,

    /// File path for initial vectors (optional)
    #[arg(long)]
    input_vectors: Option<PathBuf>,

    /// Learning rate at the start of training [0.5]
    #[arg(long)]
    start_lr: Option<f64>,

    /// Learning rate at the end of training [0.5]
    #[arg(long)]
    end_lr: Option<f64>,

    /// Dimension of the Poincaré ball [10]
    #[arg(long)]
    dimension: Option<usize>,

    /// Range of coordinates for uniform initialisation [1e-4]
    #[arg(long)]
    init_range: Option<f64>,

    /// Number of epochs [5]
    #[arg(long)]
    epochs: Option<usize>,

    /// Number of negatives sampled per edge [10]
    #[arg(long)]
    number_negatives: Option<usize>,

    /// Exponent applied to target counts for negative sampling [1]
    #[arg(long)]
    distribution_power: Option<f64>,

    /// Save vectors every this many epochs [disabled]
    #[arg(long)]
    checkpoint_interval: Option<usize>,

    /// Number of worker threads [4]
    #[arg(long)]
    threads: Option<usize>,

    /// Seed for the random number generators [1]; only deterministic with one thread
    #[arg(long)]
    seed: Option<u64>,

    /// Capacity of the negative sampling table [100000000]
    #[arg(long)]
    negative_table_size: Option<usize>,
}

impl Cli {
    fn into_config(self) -> poincare_embed::Result<TrainConfig> {
        let mut cfg = match &self.config {
            Some(path) => TrainConfig::from_json_file(path)?,
            None => TrainConfig::default(),
        };

        if let Some(v) = self.graph {
            cfg.graph = v;
        }
        if let Some(v) = self.output_vectors {
            cfg.output_vectors = v;
        }
        if let Some(v) = self.input_vectors {
            cfg.input_vectors = Some(v);
        }
        if let Some(v) = self.start_lr {
            cfg.start_lr = v;
        }
        if let Some(v) = self.end_lr {
            cfg.end_lr = v;
        }
        if let Some(v) = self.dimension {
            cfg.dimension = v;
        }
        if let Some(v) = self.init_range {
            cfg.init_range = v;
        }
        if let Some(v) = self.epochs {
            cfg.epochs = v;
        }
        if let Some(v) = self.number_negatives {
            cfg.number_negatives = v;
        }
        if let Some(v) = self.distribution_power {
            cfg.distribution_power = v;
        }
        if let Some(v) = self.checkpoint_interval {
            cfg.checkpoint_interval = Some(v);
        }
        if let Some(v) = self.threads {
            cfg.threads = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
        if let Some(v) = self.negative_table_size {
            cfg.negative_table_size = v;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("poincare_embed=info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let config = match Cli::parse().into_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        graph = %config.graph.display(),
        dimension = config.dimension,
        epochs = config.epochs,
        threads = config.threads,
        "poincare-embed starting"
    );

    match Trainer::run(config) {
        Ok(report) => {
            info!(
                epochs = report.epochs,
                edges_per_epoch = report.edges_per_epoch,
                checkpoints = report.checkpoints.len(),
                "Training complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
