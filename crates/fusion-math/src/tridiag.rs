// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Tridiag
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Thomas algorithm for complex tridiagonal systems.
//!
//! Used by the FFT Laplacian inversion, one system per Fourier mode.

use fusion_types::error::{FusionError, FusionResult};
use num_complex::Complex64;

/// Solve tridiagonal system Ax = d using the Thomas algorithm.
///
/// - `a`: sub-diagonal \[n\] (a\[0\] unused)
/// - `b`: main diagonal \[n\]
/// - `c`: super-diagonal \[n\] (c\[n-1\] unused)
/// - `d`: right-hand side \[n\]
/// - `x`: solution vector \[n\], overwritten
///
/// No pivoting is done. Returns `FusionError::SingularPivot` when a pivot vanishes
/// relative to its row, which covers structurally singular systems such as
/// pure Neumann operators with no Helmholtz term.
pub fn thomas_solve(
    a: &[Complex64],
    b: &[Complex64],
    c: &[Complex64],
    d: &[Complex64],
    x: &mut [Complex64],
) -> FusionResult<()> {
    let n = d.len();
    if n == 0 {
        return Err(FusionError::LinAlg("System size must be > 0".into()));
    }
    if a.len() != n || b.len() != n || c.len() != n || x.len() != n {
        return Err(FusionError::LinAlg(format!(
            "tridiagonal length mismatch: a={}, b={}, c={}, d={n}, x={}",
            a.len(),
            b.len(),
            c.len(),
            x.len()
        )));
    }

    let zero = Complex64::new(0.0, 0.0);
    let mut c_prime = vec![zero; n];
    let mut d_prime = vec![zero; n];

    // Forward sweep
    check_pivot(b[0], b[0].norm(), 0)?;
    c_prime[0] = c[0] / b[0];
    d_prime[0] = d[0] / b[0];

    for i in 1..n {
        let coupling = a[i] * c_prime[i - 1];
        let den = b[i] - coupling;
        check_pivot(den, b[i].norm() + coupling.norm(), i)?;
        if i < n - 1 {
            c_prime[i] = c[i] / den;
        }
        d_prime[i] = (d[i] - a[i] * d_prime[i - 1]) / den;
    }

    // Back substitution
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }

    Ok(())
}

fn check_pivot(pivot: Complex64, scale: f64, row: usize) -> FusionResult<()> {
    let mag = pivot.norm();
    if !mag.is_finite() || mag <= f64::EPSILON * scale {
        return Err(FusionError::SingularPivot {
            row,
            magnitude: mag,
        });
    }
    Ok(())
}
