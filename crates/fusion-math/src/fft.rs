// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — FFT
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Real-to-complex periodic transforms along z, built on rustfft.
//!
//! Convention:
//! - Forward (rfft): normalized by 1/nz, so mode 0 is the mean of the row
//! - Inverse (irfft): unnormalized, assumes a conjugate-symmetric spectrum

use std::fmt;
use std::sync::Arc;

use fusion_types::error::{FusionError, FusionResult};
use ndarray::{ArrayView1, ArrayViewMut1};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

/// Planned forward/inverse transform pair for rows of `nz` periodic samples.
///
/// Only wavenumbers `0..=maxmode` are ever produced or consumed; every
/// higher index is treated as exactly zero.
#[derive(Clone)]
pub struct ModeTransform {
    nz: usize,
    maxmode: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for ModeTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeTransform")
            .field("nz", &self.nz)
            .field("maxmode", &self.maxmode)
            .finish()
    }
}

impl ModeTransform {
    pub fn new(nz: usize, maxmode: usize) -> FusionResult<Self> {
        if nz == 0 {
            return Err(FusionError::ConfigError(
                "transform length must be > 0".into(),
            ));
        }
        if maxmode > nz / 2 {
            return Err(FusionError::ConfigError(format!(
                "maxmode={maxmode} exceeds nz/2={}",
                nz / 2
            )));
        }
        let mut planner = FftPlanner::new();
        Ok(Self {
            nz,
            maxmode,
            forward: planner.plan_fft_forward(nz),
            inverse: planner.plan_fft_inverse(nz),
        })
    }

    pub fn nz(&self) -> usize {
        self.nz
    }

    pub fn maxmode(&self) -> usize {
        self.maxmode
    }

    /// Number of non-redundant coefficients, nz/2 + 1.
    pub fn nmodes(&self) -> usize {
        self.nz / 2 + 1
    }

    /// Forward transform of one real row. Writes `modes[0..=maxmode]` only.
    pub fn forward(
        &self,
        row: ArrayView1<'_, f64>,
        mut modes: ArrayViewMut1<'_, Complex64>,
    ) -> FusionResult<()> {
        self.check_lengths(row.len(), modes.len())?;

        let mut buffer: Vec<Complex64> = row.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        self.forward.process(&mut buffer);

        let norm = 1.0 / self.nz as f64;
        for (out, value) in modes.iter_mut().zip(&buffer).take(self.maxmode + 1) {
            *out = value * norm;
        }
        Ok(())
    }

    /// Inverse transform into one real row. Entries above `maxmode` are ignored.
    pub fn inverse(
        &self,
        modes: ArrayView1<'_, Complex64>,
        mut row: ArrayViewMut1<'_, f64>,
    ) -> FusionResult<()> {
        self.check_lengths(row.len(), modes.len())?;

        let n = self.nz;
        let mut buffer = vec![Complex64::new(0.0, 0.0); n];
        // DC and Nyquist of a real signal carry no imaginary part
        buffer[0] = Complex64::new(modes[0].re, 0.0);
        for k in 1..=self.maxmode {
            let c = modes[k];
            if 2 * k == n {
                buffer[k] = Complex64::new(c.re, 0.0);
            } else {
                buffer[k] = c;
                buffer[n - k] = c.conj();
            }
        }
        self.inverse.process(&mut buffer);

        for (out, value) in row.iter_mut().zip(&buffer) {
            *out = value.re;
        }
        Ok(())
    }

    fn check_lengths(&self, row_len: usize, modes_len: usize) -> FusionResult<()> {
        if row_len != self.nz || modes_len != self.nmodes() {
            return Err(FusionError::LinAlg(format!(
                "transform length mismatch: row={row_len} (expected {}), modes={modes_len} (expected {})",
                self.nz,
                self.nmodes()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use std::f64::consts::TAU;

    fn roundtrip(nz: usize) {
        let transform = ModeTransform::new(nz, nz / 2).unwrap();
        let row = Array1::from_shape_fn(nz, |j| (j as f64 * 0.7).sin() + 0.1 * j as f64);
        let mut modes = Array1::<Complex64>::zeros(transform.nmodes());
        let mut back = Array1::<f64>::zeros(nz);

        transform.forward(row.view(), modes.view_mut()).unwrap();
        transform.inverse(modes.view(), back.view_mut()).unwrap();

        for j in 0..nz {
            assert!(
                (back[j] - row[j]).abs() < 1e-12,
                "Roundtrip failed at {j} (nz={nz}): {} vs {}",
                back[j],
                row[j]
            );
        }
    }

    #[test]
    fn test_roundtrip_even() {
        roundtrip(16);
    }

    #[test]
    fn test_roundtrip_odd() {
        roundtrip(15);
    }

    #[test]
    fn test_roundtrip_single_point() {
        roundtrip(1);
    }

    #[test]
    fn test_dc_is_row_mean() {
        let nz = 8;
        let transform = ModeTransform::new(nz, 4).unwrap();
        let row = Array1::from_elem(nz, 3.0);
        let mut modes = Array1::<Complex64>::zeros(transform.nmodes());
        transform.forward(row.view(), modes.view_mut()).unwrap();

        assert!((modes[0].re - 3.0).abs() < 1e-12, "DC: {}", modes[0].re);
        assert!(modes[0].im.abs() < 1e-12, "DC imaginary should be zero");
        for k in 1..modes.len() {
            assert!(modes[k].norm() < 1e-12, "mode {k} should vanish");
        }
    }

    #[test]
    fn test_single_harmonic() {
        // cos(2z) -> modes[2] = 1/2
        let nz = 16;
        let transform = ModeTransform::new(nz, 8).unwrap();
        let row = Array1::from_shape_fn(nz, |j| (2.0 * TAU * j as f64 / nz as f64).cos());
        let mut modes = Array1::<Complex64>::zeros(transform.nmodes());
        transform.forward(row.view(), modes.view_mut()).unwrap();
        assert!((modes[2].re - 0.5).abs() < 1e-12);
        assert!(modes[2].im.abs() < 1e-12);
    }

    #[test]
    fn test_forward_leaves_truncated_modes_untouched() {
        let nz = 16;
        let transform = ModeTransform::new(nz, 3).unwrap();
        let row = Array1::from_shape_fn(nz, |j| j as f64);
        let sentinel = Complex64::new(42.0, -1.0);
        let mut modes = Array1::from_elem(transform.nmodes(), sentinel);
        transform.forward(row.view(), modes.view_mut()).unwrap();
        for k in 4..modes.len() {
            assert_eq!(modes[k], sentinel);
        }
    }

    #[test]
    fn test_inverse_ignores_modes_above_maxmode() {
        let nz = 16;
        let transform = ModeTransform::new(nz, 3).unwrap();
        let mut clean = Array1::<Complex64>::zeros(transform.nmodes());
        clean[1] = Complex64::new(0.25, 0.5);
        clean[3] = Complex64::new(-1.0, 0.0);
        let mut dirty = clean.clone();
        for k in 4..dirty.len() {
            dirty[k] = Complex64::new(1e6, -3e5);
        }

        let mut a = Array1::<f64>::zeros(nz);
        let mut b = Array1::<f64>::zeros(nz);
        transform.inverse(clean.view(), a.view_mut()).unwrap();
        transform.inverse(dirty.view(), b.view_mut()).unwrap();
        assert_eq!(a, b, "truncated modes must contribute exactly zero");
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let transform = ModeTransform::new(8, 4).unwrap();
        let row = Array1::<f64>::zeros(7);
        let mut modes = Array1::<Complex64>::zeros(5);
        assert!(transform.forward(row.view(), modes.view_mut()).is_err());
    }

    #[test]
    fn test_maxmode_above_nyquist_rejected() {
        assert!(ModeTransform::new(8, 5).is_err());
        assert!(ModeTransform::new(0, 0).is_err());
    }
}
