//! Embedding table shared by all training workers.
//!
//! ## Consistency
//!
//! Workers read and write rows concurrently **without locks** (Hogwild):
//! a node may be the source in one worker's slice and a negative in another's,
//! so two workers can interleave read-modify-write cycles on the same row.
//! Lost or partially applied updates are accepted in exchange for throughput.
//!
//! Coordinates are stored as `f64` bit patterns in `AtomicU64` cells accessed
//! with `Ordering::Relaxed` only. Relaxed loads and stores compile to plain
//! moves on mainstream targets, so this adds no synchronisation; it only makes
//! the racy access well-defined. There is no read-modify-write on a cell:
//! a row update is "load row, compute, store row", last writer wins.
//!
//! With a single worker the table behaves like a plain `Vec<Vector>`.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

use crate::vector::Vector;

#[derive(Debug)]
pub struct EmbeddingTable {
    rows: usize,
    dimension: usize,
    cells: Box<[AtomicU64]>,
}

impl EmbeddingTable {
    /// `rows × dimension` table of zeros.
    pub fn zeros(rows: usize, dimension: usize) -> Self {
        let cells = (0..rows * dimension)
            .map(|_| AtomicU64::new(0.0f64.to_bits()))
            .collect();
        Self { rows, dimension, cells }
    }

    /// Rows filled in order with uniform coordinates in `[-init_range, init_range]`.
    pub fn random_uniform(rows: usize, dimension: usize, init_range: f64, rng: &mut impl Rng) -> Self {
        let table = Self::zeros(rows, dimension);
        let mut scratch = Vector::new(dimension);
        for row in 0..rows {
            scratch.fill_uniform(init_range, rng);
            table.write_row(row, &scratch);
        }
        table
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    fn row_cells(&self, row: usize) -> &[AtomicU64] {
        let start = row * self.dimension;
        &self.cells[start..start + self.dimension]
    }

    /// Copy row `row` into `out`.
    #[inline]
    pub fn read_row(&self, row: usize, out: &mut Vector) {
        debug_assert_eq!(out.len(), self.dimension, "dimension mismatch in read_row");
        for (dst, cell) in out.as_mut_slice().iter_mut().zip(self.row_cells(row)) {
            *dst = f64::from_bits(cell.load(Ordering::Relaxed));
        }
    }

    /// Overwrite row `row` with `values`.
    #[inline]
    pub fn write_row(&self, row: usize, values: &Vector) {
        debug_assert_eq!(values.len(), self.dimension, "dimension mismatch in write_row");
        for (cell, &x) in self.row_cells(row).iter().zip(values.as_slice()) {
            cell.store(x.to_bits(), Ordering::Relaxed);
        }
    }

    /// Owned snapshot of one row.
    pub fn row(&self, row: usize) -> Vector {
        let mut v = Vector::new(self.dimension);
        self.read_row(row, &mut v);
        v
    }

    pub fn set(&self, row: usize, column: usize, value: f64) {
        self.row_cells(row)[column].store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        f64::from_bits(self.row_cells(row)[column].load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn write_then_read_row() {
        let table = EmbeddingTable::zeros(3, 2);
        table.write_row(1, &Vector::from_vec(vec![0.25, -0.5]));
        assert_eq!(table.row(1).as_slice(), &[0.25, -0.5]);
        assert_eq!(table.row(0).as_slice(), &[0.0, 0.0]);
        assert_eq!(table.get(1, 1), -0.5);
        table.set(2, 0, 0.125);
        assert_eq!(table.row(2).as_slice(), &[0.125, 0.0]);
    }

    #[test]
    fn random_uniform_is_seeded_and_bounded() {
        let a = EmbeddingTable::random_uniform(10, 4, 1e-3, &mut StdRng::seed_from_u64(5));
        let b = EmbeddingTable::random_uniform(10, 4, 1e-3, &mut StdRng::seed_from_u64(5));
        for r in 0..10 {
            assert_eq!(a.row(r), b.row(r));
            assert!(a.row(r).as_slice().iter().all(|c| c.abs() <= 1e-3));
        }
    }

    #[test]
    fn concurrent_writers_leave_whole_values() {
        let table = EmbeddingTable::zeros(1, 8);
        std::thread::scope(|s| {
            for t in 0..4 {
                let table = &table;
                s.spawn(move || {
                    let v = Vector::from_vec(vec![t as f64; 8]);
                    for _ in 0..1_000 {
                        table.write_row(0, &v);
                    }
                });
            }
        });
        // each coordinate is one of the written values, never a torn mixture
        for c in table.row(0).as_slice() {
            assert!([0.0, 1.0, 2.0, 3.0].contains(c), "unexpected {c}");
        }
    }
}
