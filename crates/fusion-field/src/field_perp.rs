// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — FieldPerp
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! One x-z plane at a fixed y index.

use std::ops::{Index, IndexMut};

use ndarray::{Array2, ArrayView1};

/// Values `[nx, nz]` of a perpendicular slice at y = `index`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPerp {
    data: Array2<f64>,
    index: usize,
}

impl FieldPerp {
    pub fn new(nx: usize, nz: usize, index: usize) -> Self {
        Self {
            data: Array2::zeros((nx, nz)),
            index,
        }
    }

    pub fn from_array(index: usize, data: Array2<f64>) -> Self {
        Self { data, index }
    }

    pub fn from_fn<F>(nx: usize, nz: usize, index: usize, f: F) -> Self
    where
        F: FnMut((usize, usize)) -> f64,
    {
        Self {
            data: Array2::from_shape_fn((nx, nz), f),
            index,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn nx(&self) -> usize {
        self.data.nrows()
    }

    pub fn nz(&self) -> usize {
        self.data.ncols()
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array2<f64> {
        &mut self.data
    }

    pub fn into_array(self) -> Array2<f64> {
        self.data
    }

    /// The z row at x index `ix`.
    pub fn row(&self, ix: usize) -> ArrayView1<'_, f64> {
        self.data.row(ix)
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl Index<[usize; 2]> for FieldPerp {
    type Output = f64;

    fn index(&self, idx: [usize; 2]) -> &f64 {
        &self.data[idx]
    }
}

impl IndexMut<[usize; 2]> for FieldPerp {
    fn index_mut(&mut self, idx: [usize; 2]) -> &mut f64 {
        &mut self.data[idx]
    }
}
