//! Contrastive Poincaré objective (Nickel & Kiela) for one training example.
//!
//! For a source `u`, positive `v₀` and negatives `v₁ … v_k` the activation of
//! sample `n` is `exp(−d(u, vₙ))`, normalised over all samples. Since
//! `d = arccosh γ` and `exp(−arccosh γ) = 1/(γ + √(γ²−1))`, the model uses the
//! cheaper `1/γ` as the unnormalised activation; `γ ≥ 1` holds by
//! construction so the normalisation is well defined.
//!
//! Each sample row is updated immediately; the source gradient is accumulated
//! over all samples and applied once at the end.

use crate::riemannian::{arccosh_argument, clip, distance_gradient, retract, BOUNDARY};
use crate::table::EmbeddingTable;
use crate::vector::{squared_distance, Vector};

// ─────────────────────────────────────────────
// PerformanceMeter
// ─────────────────────────────────────────────

/// Running mean of the positive sample's normalised activation.
///
/// [`sample_and_reset`](Self::sample_and_reset) is **not idempotent**: it
/// returns the mean since the previous call and starts a new window. A fresh
/// window counts one phantom example, so an empty window reads `0.0` and
/// averages are slightly biased towards zero.
#[derive(Debug, Clone)]
pub struct PerformanceMeter {
    sum: f64,
    examples: u64,
}

impl Default for PerformanceMeter {
    fn default() -> Self {
        Self { sum: 0.0, examples: 1 }
    }
}

impl PerformanceMeter {
    pub fn record(&mut self, value: f64) {
        self.sum += value;
        self.examples += 1;
    }

    pub fn sample_and_reset(&mut self) -> f64 {
        let mean = self.sum / self.examples as f64;
        *self = Self::default();
        mean
    }
}

// ─────────────────────────────────────────────
// Model
// ─────────────────────────────────────────────

/// One per worker thread. Borrows the shared table; owns all scratch space so
/// [`objective`](Self::objective) never allocates.
pub struct Model<'a> {
    vectors: &'a EmbeddingTable,
    performance: PerformanceMeter,

    sample_sq_norms: Vec<f64>,
    sample_sq_dists: Vec<f64>,
    arccosh_args: Vec<f64>,
    activations: Vec<f64>,

    source: Vector,
    sample: Vector,
    acc_source_gradient: Vector,
    tmp_gradient: Vector,
}

impl<'a> Model<'a> {
    pub fn new(vectors: &'a EmbeddingTable, number_negatives: usize) -> Self {
        let samples = number_negatives + 1;
        let dim = vectors.dimension();
        Self {
            vectors,
            performance: PerformanceMeter::default(),
            sample_sq_norms: vec![0.0; samples],
            sample_sq_dists: vec![0.0; samples],
            arccosh_args: vec![0.0; samples],
            activations: vec![0.0; samples],
            source: Vector::new(dim),
            sample: Vector::new(dim),
            acc_source_gradient: Vector::new(dim),
            tmp_gradient: Vector::new(dim),
        }
    }

    fn ensure_capacity(&mut self, samples: usize) {
        if self.activations.len() < samples {
            self.sample_sq_norms.resize(samples, 0.0);
            self.sample_sq_dists.resize(samples, 0.0);
            self.arccosh_args.resize(samples, 0.0);
            self.activations.resize(samples, 0.0);
        }
    }

    /// One SGD step for `source` against `samples` (`samples[0]` is the
    /// positive, the rest are negatives), mutating the table in place.
    pub fn objective(&mut self, source: usize, samples: &[usize], lr: f64) {
        if samples.is_empty() {
            return;
        }
        self.ensure_capacity(samples.len());

        self.vectors.read_row(source, &mut self.source);
        let source_sq_norm = clip(self.source.squared_norm(), 0.0, BOUNDARY);

        let mut z = 0.0;
        for (n, &s) in samples.iter().enumerate() {
            self.vectors.read_row(s, &mut self.sample);
            self.sample_sq_dists[n] = squared_distance(&self.source, &self.sample);
            self.sample_sq_norms[n] = clip(self.sample.squared_norm(), 0.0, BOUNDARY);
            self.arccosh_args[n] =
                arccosh_argument(self.sample_sq_norms[n], source_sq_norm, self.sample_sq_dists[n]);
            let unnormed = 1.0 / self.arccosh_args[n];
            self.activations[n] = unnormed;
            z += unnormed;
        }
        for a in &mut self.activations[..samples.len()] {
            *a /= z;
        }
        self.performance.record(self.activations[0]);

        self.acc_source_gradient.zero();
        for (n, &s) in samples.iter().enumerate() {
            let label = if n == 0 { 1.0 } else { 0.0 };
            let weight = self.activations[n] - label;

            // rows are re-read: an earlier step may have moved them
            self.vectors.read_row(source, &mut self.source);
            self.vectors.read_row(s, &mut self.sample);

            distance_gradient(
                &mut self.tmp_gradient,
                &self.source,
                &self.sample,
                source_sq_norm,
                self.sample_sq_norms[n],
                self.arccosh_args[n],
            );
            self.acc_source_gradient.add_scaled(&self.tmp_gradient, weight);

            distance_gradient(
                &mut self.tmp_gradient,
                &self.sample,
                &self.source,
                self.sample_sq_norms[n],
                source_sq_norm,
                self.arccosh_args[n],
            );
            self.tmp_gradient.multiply(lr * weight);
            retract(&mut self.sample, &self.tmp_gradient);
            self.vectors.write_row(s, &self.sample);
        }

        self.acc_source_gradient.multiply(lr);
        self.vectors.read_row(source, &mut self.source);
        retract(&mut self.source, &self.acc_source_gradient);
        self.vectors.write_row(source, &self.source);
    }

    /// Mean positive activation since the previous call; resets the window.
    pub fn performance(&mut self) -> f64 {
        self.performance.sample_and_reset()
    }
}
