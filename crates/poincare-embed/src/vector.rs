//! Fixed-length dense vector with in-place arithmetic.
//!
//! Every row of the embedding table and every scratch buffer of a
//! [`Model`](crate::model::Model) is a `Vector`. The length is fixed at
//! construction; operands of binary operations must share it (checked in
//! debug builds only — a mismatch is a programming error).

use std::fmt;
use std::ops::{Index, IndexMut};

use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    data: Box<[f64]>,
}

impl Vector {
    /// The zero vector of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { data: vec![0.0; dimension].into_boxed_slice() }
    }

    pub fn from_vec(coords: Vec<f64>) -> Self {
        Self { data: coords.into_boxed_slice() }
    }

    /// Uniform random coordinates in `[-max_value, max_value]`.
    pub fn random_uniform(dimension: usize, max_value: f64, rng: &mut impl Rng) -> Self {
        let mut v = Self::new(dimension);
        v.fill_uniform(max_value, rng);
        v
    }

    pub fn fill_uniform(&mut self, max_value: f64, rng: &mut impl Rng) {
        for x in self.data.iter_mut() {
            *x = rng.gen_range(-max_value..=max_value);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    // ── In-place arithmetic ────────────────────────────

    pub fn zero(&mut self) {
        self.data.iter_mut().for_each(|x| *x = 0.0);
    }

    pub fn multiply(&mut self, scalar: f64) {
        self.data.iter_mut().for_each(|x| *x *= scalar);
    }

    pub fn add(&mut self, other: &Vector) {
        debug_assert_eq!(self.len(), other.len(), "dimension mismatch in add");
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
    }

    /// `self += scalar · other`
    pub fn add_scaled(&mut self, other: &Vector, scalar: f64) {
        debug_assert_eq!(self.len(), other.len(), "dimension mismatch in add_scaled");
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += scalar * b;
        }
    }

    pub fn copy_from(&mut self, other: &Vector) {
        self.data.copy_from_slice(&other.data);
    }

    #[inline]
    pub fn squared_norm(&self) -> f64 {
        self.data.iter().map(|x| x * x).sum()
    }
}

// ─────────────────────────────────────────────
// Free-standing kernels
// ─────────────────────────────────────────────

#[inline]
pub fn dot(a: &Vector, b: &Vector) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "dimension mismatch in dot");
    a.data.iter().zip(b.data.iter()).map(|(x, y)| x * y).sum()
}

/// Sum of squared coordinate differences.
#[inline]
pub fn squared_distance(a: &Vector, b: &Vector) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "dimension mismatch in squared_distance");
    a.data
        .iter()
        .zip(b.data.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[inline]
pub fn squared_norm(v: &Vector) -> f64 {
    v.squared_norm()
}

impl Index<usize> for Vector {
    type Output = f64;

    #[inline]
    fn index(&self, i: usize) -> &f64 {
        &self.data[i]
    }
}

impl IndexMut<usize> for Vector {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.data[i]
    }
}

/// Space-separated coordinates in shortest round-trip form.
impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, x) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{x}")?;
        }
        Ok(())
    }
}
