//! Multi-threaded training orchestration.
//!
//! ## Lifecycle
//!
//! ```text
//! load      graph file → Digraph → Sampler(target counts)
//!           table ← uniform(±init_range, seed)  [← input vectors, by name]
//! epochs    for e in 0..epochs:
//!             lr bounds for e (linear across all epochs)
//!             spawn `threads` workers; worker t takes edges i ≡ t (mod threads)
//!             join all workers
//!             checkpoint if due
//! finalize  write the table to the output path
//! ```
//!
//! Workers share the embedding table without locks (see [`crate::table`]);
//! results are reproducible only with a single thread. Each worker owns its
//! own [`Model`] and its own RNG seeded from `(seed, epoch, thread)`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::TrainConfig;
use crate::digraph::Digraph;
use crate::error::{EmbedError, Result};
use crate::model::Model;
use crate::persist::{checkpoint_path, load_vectors, save_vectors};
use crate::sampler::Sampler;
use crate::table::EmbeddingTable;

// ─────────────────────────────────────────────
// Learning-rate schedule
// ─────────────────────────────────────────────

/// Linear decay from `start` to `end` over `epochs` epochs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningRateSchedule {
    pub start: f64,
    pub end: f64,
    pub epochs: usize,
}

impl LearningRateSchedule {
    pub fn new(start: f64, end: f64, epochs: usize) -> Self {
        Self { start, end, epochs }
    }

    /// `(rate at the start of epoch, rate at its end)`.
    pub fn epoch_bounds(&self, epoch: usize) -> (f64, f64) {
        if self.epochs == 0 {
            return (self.start, self.start);
        }
        let delta = (self.start - self.end) / self.epochs as f64;
        (
            self.start - epoch as f64 * delta,
            self.start - (epoch + 1) as f64 * delta,
        )
    }
}

/// `start · (1 − progress) + end · progress`
#[inline]
pub fn interpolate(start: f64, end: f64, progress: f64) -> f64 {
    start * (1.0 - progress) + end * progress
}

/// Seed for worker `thread_id` in `epoch`. Offset by one so that the
/// first worker of the first epoch does not reuse the initialisation seed.
pub fn worker_seed(seed: u64, epoch: usize, threads: usize, thread_id: usize) -> u64 {
    seed.wrapping_add((epoch * threads + thread_id) as u64)
        .wrapping_add(1)
}

/// Number of edges `i < total` with `i ≡ thread_id (mod threads)`.
pub fn edges_assigned(total: usize, threads: usize, thread_id: usize) -> usize {
    if thread_id >= total {
        0
    } else {
        (total - thread_id).div_ceil(threads)
    }
}

// ─────────────────────────────────────────────
// Reports
// ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub epochs: usize,
    pub edges_per_epoch: usize,
    /// Checkpoint files written, in order.
    pub checkpoints: Vec<PathBuf>,
    /// Mean positive activation over thread 0's last reporting window.
    pub final_performance: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct WorkerReport {
    edges: usize,
    performance: f64,
}

/// Read-only state handed to every worker of one epoch.
struct EpochContext<'a> {
    config: &'a TrainConfig,
    graph: &'a Digraph,
    sampler: &'a Sampler,
    vectors: &'a EmbeddingTable,
    start_lr: f64,
    end_lr: f64,
}

// ─────────────────────────────────────────────
// Trainer
// ─────────────────────────────────────────────

pub struct Trainer {
    config: TrainConfig,
    graph: Digraph,
    /// `None` for a graph without edges: there is nothing to sample for.
    sampler: Option<Sampler>,
    vectors: EmbeddingTable,
}

impl Trainer {
    /// Validate `config`, read the graph and prepare sampler and table.
    pub fn load(config: TrainConfig) -> Result<Self> {
        config.validate()?;
        let graph = Digraph::from_path(&config.graph)?;
        Self::from_graph(config, graph)
    }

    /// Like [`Trainer::load`] for a graph already in memory.
    ///
    /// Negative sampling never gives up on its own, so every source node is
    /// checked here for at least `number_negatives` sampleable nodes outside
    /// its out-neighbours; a graph failing that is refused with
    /// [`EmbedError::SamplerExhaustion`] instead of stalling during training.
    /// A graph without edges builds no sampler and trains nothing.
    pub fn from_graph(config: TrainConfig, graph: Digraph) -> Result<Self> {
        config.validate()?;

        let sampler = if graph.edge_count() == 0 {
            tracing::warn!("Graph has no edges; vectors keep their initial values");
            None
        } else {
            let sampler = Sampler::new(
                config.distribution_power,
                &graph.target_counts(),
                config.negative_table_size,
            )?;
            check_negative_pools(&graph, &sampler, config.number_negatives)?;
            Some(sampler)
        };

        let mut rng = StdRng::seed_from_u64(config.seed);
        let vectors = EmbeddingTable::random_uniform(
            graph.node_count(),
            config.dimension,
            config.init_range,
            &mut rng,
        );

        let trainer = Self { config, graph, sampler, vectors };
        if let Some(path) = &trainer.config.input_vectors {
            trainer.load_vectors(path)?;
        }
        Ok(trainer)
    }

    /// Load, train and write the final vectors to `config.output_vectors`.
    pub fn run(config: TrainConfig) -> Result<TrainReport> {
        let mut trainer = Self::load(config)?;
        let report = trainer.train()?;
        trainer.save_vectors(&trainer.config.output_vectors)?;
        tracing::info!(path = %trainer.config.output_vectors.display(), "Vectors saved");
        Ok(report)
    }

    /// Run every epoch, writing checkpoints as configured.
    pub fn train(&mut self) -> Result<TrainReport> {
        let epochs = self.config.epochs;
        let schedule =
            LearningRateSchedule::new(self.config.start_lr, self.config.end_lr, epochs);

        let mut checkpoints = Vec::new();
        let mut final_performance = None;

        for epoch in 0..epochs {
            let (start_lr, end_lr) = schedule.epoch_bounds(epoch);
            tracing::info!(epoch = epoch + 1, epochs, start_lr, end_lr, "Epoch started");

            let reports = match &self.sampler {
                Some(sampler) => self.run_epoch(sampler, epoch, start_lr, end_lr),
                None => Vec::new(),
            };

            let processed: usize = reports.iter().map(|r| r.edges).sum();
            debug_assert_eq!(processed, self.graph.edge_count());
            final_performance = reports.first().map(|r| r.performance);

            let done = epoch + 1;
            if let Some(path) = self.checkpoint_due(done) {
                self.save_vectors(&path)?;
                tracing::info!(path = %path.display(), epochs = done, "Checkpoint written");
                checkpoints.push(path);
            }
        }

        Ok(TrainReport {
            epochs,
            edges_per_epoch: self.graph.edge_count(),
            checkpoints,
            final_performance,
        })
    }

    /// Spawn one worker per thread over interleaved edge slices and join them.
    fn run_epoch(
        &self,
        sampler: &Sampler,
        epoch: usize,
        start_lr: f64,
        end_lr: f64,
    ) -> Vec<WorkerReport> {
        let threads = self.config.threads;
        let ctx = EpochContext {
            config: &self.config,
            graph: &self.graph,
            sampler,
            vectors: &self.vectors,
            start_lr,
            end_lr,
        };

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|thread_id| {
                    let ctx = &ctx;
                    let seed = worker_seed(self.config.seed, epoch, threads, thread_id);
                    s.spawn(move || run_worker(ctx, thread_id, seed))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(report) => report,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }

    /// Checkpoint path if one is due after `done` completed epochs.
    fn checkpoint_due(&self, done: usize) -> Option<PathBuf> {
        let every = self.config.checkpoint_every()?;
        if done > 0 && (done % every == 0 || done == self.config.epochs) {
            Some(checkpoint_path(&self.config.output_vectors, done))
        } else {
            None
        }
    }

    pub fn save_vectors(&self, path: &Path) -> Result<()> {
        save_vectors(&self.graph, &self.vectors, path)
    }

    pub fn load_vectors(&self, path: &Path) -> Result<usize> {
        load_vectors(&self.graph, &self.vectors, path)
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn graph(&self) -> &Digraph {
        &self.graph
    }

    /// `None` when the graph has no edges.
    pub fn sampler(&self) -> Option<&Sampler> {
        self.sampler.as_ref()
    }

    pub fn vectors(&self) -> &EmbeddingTable {
        &self.vectors
    }
}

/// Refuse graphs on which negative sampling would never terminate: every
/// source needs `required` distinct sampleable nodes outside its own
/// out-neighbour set.
fn check_negative_pools(graph: &Digraph, sampler: &Sampler, required: usize) -> Result<()> {
    let support = sampler.support_size();
    for node in graph.nodes().iter().filter(|n| n.count_as_source > 0) {
        let excluded: HashSet<usize> = node
            .target_enums
            .iter()
            .copied()
            .filter(|&t| sampler.in_support(t))
            .collect();
        let available = support - excluded.len();
        if available < required {
            return Err(EmbedError::SamplerExhaustion {
                node: node.name.clone(),
                available,
                required,
            });
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Worker
// ─────────────────────────────────────────────

fn run_worker(ctx: &EpochContext<'_>, thread_id: usize, seed: u64) -> WorkerReport {
    let config = ctx.config;
    let threads = config.threads;
    let edges = ctx.graph.edges();
    let assigned = edges_assigned(edges.len(), threads, thread_id);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut model = Model::new(ctx.vectors, config.number_negatives);
    let mut samples: Vec<usize> = Vec::with_capacity(config.number_negatives + 1);

    let started = Instant::now();
    let mut done = 0usize;
    let mut lr = ctx.start_lr;
    let mut progress = 0.0;

    for edge in edges.iter().skip(thread_id).step_by(threads) {
        done += 1;
        progress = done as f64 / assigned as f64;
        lr = interpolate(ctx.start_lr, ctx.end_lr, progress);

        let exclude = &ctx.graph.node(edge.source).target_enums;
        samples.clear();
        samples.push(edge.target);
        while samples.len() < config.number_negatives + 1 {
            let negative = ctx.sampler.sample(exclude, &mut rng);
            if !samples.contains(&negative) {
                samples.push(negative);
            }
        }

        model.objective(edge.source, &samples, lr);

        if thread_id == 0 && config.report_interval > 0 && done % config.report_interval == 0 {
            tracing::debug!(
                progress,
                edges_per_thread_per_sec = throughput(done, started),
                lr,
                performance = model.performance(),
                "Training progress"
            );
        }
    }

    let performance = model.performance();
    if thread_id == 0 {
        tracing::info!(
            progress,
            edges_per_thread_per_sec = throughput(done, started),
            lr,
            performance,
            "Epoch finished"
        );
    }
    WorkerReport { edges: done, performance }
}

fn throughput(edges: usize, started: Instant) -> f64 {
    let secs = started.elapsed().as_secs_f64();
    if secs > 0.0 {
        edges as f64 / secs
    } else {
        0.0
    }
}
