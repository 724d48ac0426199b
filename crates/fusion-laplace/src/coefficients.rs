// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Coefficients
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Operator coefficients and construction of the per-mode tridiagonal systems.
//!
//! The operator is `D (∂²x − k²) x + (∂x C / C) ∂x x + A x` with second-order
//! central differences in x. Boundary rows are either Dirichlet or
//! zero-gradient, chosen per side and per mode by the boundary flags.

use fusion_types::config::{BoundaryFlags, LaplaceConfig};
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::PerpMesh;
use ndarray::Array2;
use num_complex::Complex64;

use crate::boundary::BoundaryWidths;

/// Coefficient fields A, C, D, each indexed `[x, y]`.
#[derive(Debug, Clone)]
pub struct Coefficients {
    pub a: Array2<f64>,
    pub c: Array2<f64>,
    pub d: Array2<f64>,
}

impl Coefficients {
    /// A = 0, C = 1, D = 1: the plain perpendicular Laplacian.
    pub fn new(mesh: &PerpMesh) -> Self {
        Self::uniform(mesh, 0.0, 1.0, 1.0)
    }

    pub fn uniform(mesh: &PerpMesh, a: f64, c: f64, d: f64) -> Self {
        let shape = (mesh.local_nx, mesh.local_ny);
        Self {
            a: Array2::from_elem(shape, a),
            c: Array2::from_elem(shape, c),
            d: Array2::from_elem(shape, d),
        }
    }

    pub fn validate(&self, mesh: &PerpMesh) -> FusionResult<()> {
        let expected = (mesh.local_nx, mesh.local_ny);
        for (name, field) in [("A", &self.a), ("C", &self.c), ("D", &self.d)] {
            if field.dim() != expected {
                return Err(FusionError::Precondition(format!(
                    "coefficient {name} has shape {:?}, expected {expected:?}",
                    field.dim()
                )));
            }
            if field.iter().any(|v| !v.is_finite()) {
                return Err(FusionError::Precondition(format!(
                    "coefficient {name} contains non-finite values"
                )));
            }
        }
        if self.c.iter().any(|&v| v == 0.0) {
            return Err(FusionError::Precondition(
                "coefficient C must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// One mode's tridiagonal system: sub-diagonal `a`, diagonal `b`,
/// super-diagonal `c` and right-hand side `rhs`, all of length nx.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeSystem {
    pub a: Vec<Complex64>,
    pub b: Vec<Complex64>,
    pub c: Vec<Complex64>,
    pub rhs: Vec<Complex64>,
}

impl ModeSystem {
    pub fn new(nx: usize) -> Self {
        let zero = Complex64::new(0.0, 0.0);
        Self {
            a: vec![zero; nx],
            b: vec![zero; nx],
            c: vec![zero; nx],
            rhs: vec![zero; nx],
        }
    }

    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }
}

/// Everything a builder may read for one (y, mode) pair.
#[derive(Debug, Clone, Copy)]
pub struct ModeContext<'a> {
    pub jy: usize,
    pub kz: usize,
    /// Physical wavenumber `kz · 2π / zlength`.
    pub kwave: f64,
    pub mesh: &'a PerpMesh,
    pub coefs: &'a Coefficients,
    pub config: &'a LaplaceConfig,
    pub widths: BoundaryWidths,
}

/// Fills the diagonals of a mode system. `sys.rhs` arrives holding the
/// transformed right-hand side and may be rewritten on boundary rows.
pub trait SystemBuilder: Sync {
    fn build(&self, ctx: &ModeContext<'_>, sys: &mut ModeSystem) -> FusionResult<()>;
}

/// Second-order finite-difference discretisation in x.
#[derive(Debug, Clone, Copy, Default)]
pub struct FiniteDifferenceBuilder;

impl FiniteDifferenceBuilder {
    fn boundary_row(
        sys: &mut ModeSystem,
        ix: usize,
        flags: &BoundaryFlags,
        kz: usize,
        inner_side: bool,
    ) {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        sys.b[ix] = one;
        sys.a[ix] = zero;
        sys.c[ix] = zero;
        if flags.is_gradient(kz) {
            // x[ix] - x[neighbour] = rhs
            if inner_side {
                sys.c[ix] = -one;
            } else {
                sys.a[ix] = -one;
            }
        }
        if !flags.set_from_auxiliary {
            sys.rhs[ix] = zero;
        }
    }
}

impl SystemBuilder for FiniteDifferenceBuilder {
    fn build(&self, ctx: &ModeContext<'_>, sys: &mut ModeSystem) -> FusionResult<()> {
        let nx = ctx.mesh.local_nx;
        if sys.len() != nx || sys.a.len() != nx || sys.b.len() != nx || sys.c.len() != nx {
            return Err(FusionError::LinAlg(format!(
                "mode system length {} does not match nx={nx}",
                sys.len()
            )));
        }

        let jy = ctx.jy;
        let k2 = ctx.kwave * ctx.kwave;
        let inner = ctx.widths.inner;
        let outer = ctx.widths.outer;
        let coefs = ctx.coefs;

        for ix in 0..nx {
            if ix < inner {
                Self::boundary_row(sys, ix, &ctx.config.inner, ctx.kz, true);
            } else if ix + outer >= nx {
                Self::boundary_row(sys, ix, &ctx.config.outer, ctx.kz, false);
            } else {
                let dx = ctx.mesh.dx[[ix, jy]];
                let d = coefs.d[[ix, jy]];
                let coef1 = d / (dx * dx);
                let dlog_c = (coefs.c[[ix + 1, jy]] - coefs.c[[ix - 1, jy]])
                    / (2.0 * dx * coefs.c[[ix, jy]]);
                let coef4 = dlog_c / (2.0 * dx);

                sys.a[ix] = Complex64::new(coef1 - coef4, 0.0);
                sys.b[ix] = Complex64::new(-2.0 * coef1 - k2 * d + coefs.a[[ix, jy]], 0.0);
                sys.c[ix] = Complex64::new(coef1 + coef4, 0.0);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_types::config::bits;
    use std::f64::consts::TAU;

    fn context<'a>(
        mesh: &'a PerpMesh,
        coefs: &'a Coefficients,
        config: &'a LaplaceConfig,
        kz: usize,
    ) -> ModeContext<'a> {
        ModeContext {
            jy: 0,
            kz,
            kwave: kz as f64 * TAU / mesh.zlength,
            mesh,
            coefs,
            config,
            widths: BoundaryWidths::resolve(&config.global, &config.inner, &config.outer),
        }
    }

    #[test]
    fn test_interior_rows_plain_laplacian() {
        let mesh = PerpMesh::new(9, 1, 8, 2, 1.0, TAU);
        let coefs = Coefficients::new(&mesh);
        let config = LaplaceConfig::default();
        let mut sys = ModeSystem::new(9);
        FiniteDifferenceBuilder
            .build(&context(&mesh, &coefs, &config, 3), &mut sys)
            .unwrap();

        let h = 1.0 / (0.125 * 0.125);
        for ix in 2..7 {
            assert!((sys.a[ix].re - h).abs() < 1e-9);
            assert!((sys.c[ix].re - h).abs() < 1e-9);
            assert!((sys.b[ix].re - (-2.0 * h - 9.0)).abs() < 1e-9, "b = {}", sys.b[ix]);
        }
    }

    #[test]
    fn test_dirichlet_rows_zero_rhs_without_set() {
        let mesh = PerpMesh::new(8, 1, 4, 2, 1.0, TAU);
        let coefs = Coefficients::new(&mesh);
        let config = LaplaceConfig::default();
        let mut sys = ModeSystem::new(8);
        sys.rhs.iter_mut().for_each(|r| *r = Complex64::new(5.0, 1.0));
        FiniteDifferenceBuilder
            .build(&context(&mesh, &coefs, &config, 0), &mut sys)
            .unwrap();

        for ix in [0, 1, 6, 7] {
            assert_eq!(sys.b[ix], Complex64::new(1.0, 0.0));
            assert_eq!(sys.a[ix], Complex64::new(0.0, 0.0));
            assert_eq!(sys.c[ix], Complex64::new(0.0, 0.0));
            assert_eq!(sys.rhs[ix], Complex64::new(0.0, 0.0));
        }
        assert_eq!(sys.rhs[3], Complex64::new(5.0, 1.0));
    }

    #[test]
    fn test_set_flag_keeps_boundary_rhs() {
        let mesh = PerpMesh::new(8, 1, 4, 2, 1.0, TAU);
        let coefs = Coefficients::new(&mesh);
        let config = LaplaceConfig::from_bits(0, bits::INVERT_SET, 0).unwrap();
        let mut sys = ModeSystem::new(8);
        sys.rhs.iter_mut().for_each(|r| *r = Complex64::new(2.0, 0.0));
        FiniteDifferenceBuilder
            .build(&context(&mesh, &coefs, &config, 1), &mut sys)
            .unwrap();
        assert_eq!(sys.rhs[0], Complex64::new(2.0, 0.0));
        assert_eq!(sys.rhs[7], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_gradient_rows_by_mode() {
        let mesh = PerpMesh::new(8, 1, 4, 1, 1.0, TAU);
        let coefs = Coefficients::new(&mesh);
        let config = LaplaceConfig::from_bits(
            bits::INVERT_BOTH_BNDRY_ONE,
            bits::INVERT_DC_GRAD,
            bits::INVERT_AC_GRAD,
        )
        .unwrap();

        let mut dc = ModeSystem::new(8);
        FiniteDifferenceBuilder
            .build(&context(&mesh, &coefs, &config, 0), &mut dc)
            .unwrap();
        assert_eq!(dc.c[0], Complex64::new(-1.0, 0.0));
        assert_eq!(dc.a[7], Complex64::new(0.0, 0.0), "outer is Dirichlet for kz=0");

        let mut ac = ModeSystem::new(8);
        FiniteDifferenceBuilder
            .build(&context(&mesh, &coefs, &config, 2), &mut ac)
            .unwrap();
        assert_eq!(ac.c[0], Complex64::new(0.0, 0.0), "inner is Dirichlet for kz>0");
        assert_eq!(ac.a[7], Complex64::new(-1.0, 0.0));
    }

    #[test]
    fn test_c_gradient_term() {
        let mesh = PerpMesh::new(5, 1, 4, 1, 4.0, TAU);
        let mut coefs = Coefficients::new(&mesh);
        coefs.c = Array2::from_shape_fn((5, 1), |(ix, _)| 1.0 + ix as f64);
        let config = LaplaceConfig::from_bits(bits::INVERT_BOTH_BNDRY_ONE, 0, 0).unwrap();
        let mut sys = ModeSystem::new(5);
        FiniteDifferenceBuilder
            .build(&context(&mesh, &coefs, &config, 0), &mut sys)
            .unwrap();

        // dx = 1, C' / C at ix=2 is 1/3, first-derivative weight 1/6
        assert!((sys.a[2].re - (1.0 - 1.0 / 6.0)).abs() < 1e-12);
        assert!((sys.c[2].re - (1.0 + 1.0 / 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_coefficient_validation() {
        let mesh = PerpMesh::new(6, 2, 4, 1, 1.0, TAU);
        assert!(Coefficients::new(&mesh).validate(&mesh).is_ok());

        let mut bad = Coefficients::new(&mesh);
        bad.c[[3, 1]] = 0.0;
        assert!(matches!(bad.validate(&mesh), Err(FusionError::Precondition(_))));

        let other = PerpMesh::new(7, 2, 4, 1, 1.0, TAU);
        assert!(Coefficients::new(&other).validate(&mesh).is_err());
    }
}
