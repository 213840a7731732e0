//! Frequency-biased negative sampling in O(1) per draw.
//!
//! Node `i` occupies `floor(count(i)^p · T / Z)` slots of a flat table,
//! `Z = Σ count(j)^p`. A draw picks a uniform slot. Because of the floor the
//! table usually holds a little fewer than `T` entries; [`Sampler::len`] is
//! the effective sampling universe.
//!
//! `p = 0` gives uniform sampling over all nodes (including nodes never seen
//! as a target, since `0^0 = 1`); `p = 1` samples proportionally to counts.

use rand::Rng;

use crate::error::{EmbedError, Result};

#[derive(Debug, Clone)]
pub struct Sampler {
    table: Vec<u32>,
    /// `in_support[i]` iff node `i` owns at least one slot.
    in_support: Vec<bool>,
    distribution_power: f64,
}

impl Sampler {
    pub fn new(distribution_power: f64, counts: &[u64], table_size: usize) -> Result<Self> {
        let weights: Vec<f64> = counts
            .iter()
            .map(|&c| (c as f64).powf(distribution_power))
            .collect();
        let z: f64 = weights.iter().sum();
        if z <= 0.0 {
            return Err(EmbedError::EmptyDistribution);
        }

        let mut table = Vec::with_capacity(table_size);
        let mut in_support = vec![false; weights.len()];
        for (enumeration, &w) in weights.iter().enumerate() {
            let slots = (w * table_size as f64 / z).floor() as usize;
            in_support[enumeration] = slots > 0;
            table.extend(std::iter::repeat(enumeration as u32).take(slots));
        }
        if table.is_empty() {
            return Err(EmbedError::EmptyDistribution);
        }

        tracing::info!(entries = table.len(), capacity = table_size, "Negative sampling table built");
        Ok(Self { table, in_support, distribution_power })
    }

    /// Draw a node not contained in `exclude`.
    ///
    /// Rejection loop without an attempt bound: if every table entry is in
    /// `exclude` this never returns. Callers keep the exclusion set well
    /// below the number of distinct nodes in the table.
    pub fn sample(&self, exclude: &[usize], rng: &mut impl Rng) -> usize {
        loop {
            let candidate = self.table[rng.gen_range(0..self.table.len())] as usize;
            if !exclude.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// Effective number of entries (≤ requested capacity).
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Whether `enumeration` can ever be drawn.
    pub fn in_support(&self, enumeration: usize) -> bool {
        self.in_support.get(enumeration).copied().unwrap_or(false)
    }

    /// Number of distinct nodes that can be drawn.
    pub fn support_size(&self) -> usize {
        self.in_support.iter().filter(|&&s| s).count()
    }

    pub fn distribution_power(&self) -> f64 {
        self.distribution_power
    }
}
