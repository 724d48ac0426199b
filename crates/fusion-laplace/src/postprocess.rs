// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Post-processing
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fix-ups applied to mode solutions before the inverse transform.

use ndarray::{Array2, Axis};
use num_complex::Complex64;

/// Subtract the mean of `xk1d[xstart..=xend]` from those same points.
///
/// Removes the free constant of a kz = 0 solve. Guard points are untouched.
pub fn remove_null_space_offset(xk1d: &mut [Complex64], xstart: usize, xend: usize) {
    if xstart > xend || xend >= xk1d.len() {
        return;
    }
    let interior = &mut xk1d[xstart..=xend];
    let offset = interior.iter().sum::<Complex64>() / interior.len() as f64;
    for value in interior.iter_mut() {
        *value -= offset;
    }
}

/// Zero the kz = 0 coefficient at every x point of `xk` (`[nx, nmodes]`).
pub fn zero_dc(xk: &mut Array2<Complex64>) {
    xk.index_axis_mut(Axis(1), 0).fill(Complex64::new(0.0, 0.0));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_removed_over_inclusive_interior() {
        let mut xk: Vec<Complex64> = [9.0, 1.0, 2.0, 3.0, 9.0]
            .iter()
            .map(|&v| Complex64::new(v, 1.0))
            .collect();
        remove_null_space_offset(&mut xk, 1, 3);

        assert_eq!(xk[0], Complex64::new(9.0, 1.0));
        assert_eq!(xk[4], Complex64::new(9.0, 1.0));
        assert!((xk[1] - Complex64::new(-1.0, 0.0)).norm() < 1e-15);
        assert!(xk[2].norm() < 1e-15);
        assert!((xk[3] - Complex64::new(1.0, 0.0)).norm() < 1e-15);
    }

    #[test]
    fn test_zero_dc_only_touches_mode_zero() {
        let mut xk = Array2::from_elem((4, 3), Complex64::new(1.0, -1.0));
        zero_dc(&mut xk);
        for ix in 0..4 {
            assert_eq!(xk[[ix, 0]], Complex64::new(0.0, 0.0));
            assert_eq!(xk[[ix, 1]], Complex64::new(1.0, -1.0));
            assert_eq!(xk[[ix, 2]], Complex64::new(1.0, -1.0));
        }
    }
}
