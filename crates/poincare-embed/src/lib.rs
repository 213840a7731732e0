//! # poincare-embed
//!
//! Embeds the nodes of a directed graph in the Poincaré ball so that
//! connected nodes end up closer (in hyperbolic distance) than unconnected
//! ones. Training follows Nickel & Kiela: every edge is a positive example
//! contrasted against sampled negatives, and embeddings move by Riemannian
//! SGD steps that are retracted into the open unit ball.
//!
//! ## Modules
//!
//! - [`vector`]     — fixed-length dense vector and its kernels
//! - [`digraph`]    — edge-list ingestion and node enumeration
//! - [`sampler`]    — O(1) frequency-biased negative sampling
//! - [`table`]      — embedding table shared lock-free across workers
//! - [`riemannian`] — distance gradient and in-ball update rule
//! - [`model`]      — per-example objective and performance meter
//! - [`trainer`]    — epochs, learning-rate schedule, threads, checkpoints
//! - [`persist`]    — embedding file format
//! - [`geometry`]   — distance and hyperboloid helpers for analysis
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use poincare_embed::{TrainConfig, Trainer};
//!
//! let config = TrainConfig {
//!     graph: "mammals.tsv".into(),
//!     output_vectors: "mammals.vec".into(),
//!     ..Default::default()
//! };
//! let report = Trainer::run(config)?;
//! println!("{} epochs, performance {:?}", report.epochs, report.final_performance);
//! ```

pub mod config;
pub mod digraph;
pub mod error;
pub mod geometry;
pub mod model;
pub mod persist;
pub mod riemannian;
pub mod sampler;
pub mod table;
pub mod trainer;
pub mod vector;

pub use config::TrainConfig;
pub use digraph::{Digraph, Edge, Node};
pub use error::{EmbedError, Result};
pub use geometry::{hyperboloid_distance, minkowski_dot, poincare_distance, pull_back, to_hyperboloid};
pub use model::{Model, PerformanceMeter};
pub use persist::{checkpoint_path, load_vectors, read_vectors, save_vectors};
pub use sampler::Sampler;
pub use table::EmbeddingTable;
pub use trainer::{interpolate, LearningRateSchedule, TrainReport, Trainer};
pub use vector::{dot, squared_distance, squared_norm, Vector};
