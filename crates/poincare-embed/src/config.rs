//! Training configuration record.
//!
//! | Field                 | Default       | Description                                         |
//! |-----------------------|---------------|-----------------------------------------------------|
//! | `graph`               | —             | tab-separated edge list (required)                  |
//! | `output_vectors`      | —             | path for the trained vectors (required)             |
//! | `input_vectors`       | none          | vectors to initialise from                          |
//! | `start_lr`/`end_lr`   | `0.5`/`0.5`   | learning-rate endpoints, linearly interpolated      |
//! | `dimension`           | `10`          | dimension of the Poincaré ball                      |
//! | `init_range`          | `1e-4`        | coordinates drawn from `[-init_range, init_range]`  |
//! | `epochs`              | `5`           | passes over the edge list                           |
//! | `number_negatives`    | `10`          | negatives drawn per edge                            |
//! | `distribution_power`  | `1.0`         | exponent applied to target counts before sampling   |
//! | `checkpoint_interval` | disabled      | write a snapshot every this many epochs             |
//! | `threads`             | `4`           | worker threads per epoch                            |
//! | `seed`                | `1`           | base seed (deterministic only with one thread)      |
//! | `negative_table_size` | `100_000_000` | capacity of the negative sampling table             |
//! | `report_interval`     | `50`          | edges between progress reports on thread 0          |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EmbedError, Result};

/// Immutable once training starts; every component reads from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub graph: PathBuf,
    pub output_vectors: PathBuf,
    pub input_vectors: Option<PathBuf>,
    pub start_lr: f64,
    pub end_lr: f64,
    pub dimension: usize,
    pub init_range: f64,
    pub epochs: usize,
    pub number_negatives: usize,
    pub distribution_power: f64,
    /// `None` or `Some(0)` disables checkpointing.
    pub checkpoint_interval: Option<usize>,
    pub threads: usize,
    pub seed: u64,
    pub negative_table_size: usize,
    pub report_interval: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            graph: PathBuf::new(),
            output_vectors: PathBuf::new(),
            input_vectors: None,
            start_lr: 0.5,
            end_lr: 0.5,
            dimension: 10,
            init_range: 1e-4,
            epochs: 5,
            number_negatives: 10,
            distribution_power: 1.0,
            checkpoint_interval: None,
            threads: 4,
            seed: 1,
            negative_table_size: 100_000_000,
            report_interval: 50,
        }
    }
}

impl TrainConfig {
    /// Load a record from a JSON file. Absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| EmbedError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| EmbedError::Config(format!("{}: {e}", path.display())))
    }

    /// Positive checkpoint interval, if checkpointing is enabled.
    pub fn checkpoint_every(&self) -> Option<usize> {
        self.checkpoint_interval.filter(|&k| k > 0)
    }

    /// Reject records that cannot drive a training run.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(EmbedError::Config(msg.to_string()));

        if self.graph.as_os_str().is_empty() {
            return fail("graph path is required");
        }
        if self.output_vectors.as_os_str().is_empty() {
            return fail("output-vectors path is required");
        }
        if self.dimension == 0 {
            return fail("dimension must be at least 1");
        }
        if self.threads == 0 {
            return fail("threads must be at least 1");
        }
        if self.number_negatives == 0 {
            return fail("number-negatives must be at least 1");
        }
        if self.negative_table_size == 0 {
            return fail("negative-table-size must be at least 1");
        }
        if !self.init_range.is_finite() || self.init_range < 0.0 {
            return fail("init-range must be a finite non-negative number");
        }
        if !self.start_lr.is_finite() || !self.end_lr.is_finite() {
            return fail("learning rates must be finite");
        }
        if !self.distribution_power.is_finite() || self.distribution_power < 0.0 {
            return fail("distribution-power must be a finite non-negative number");
        }
        Ok(())
    }
}
