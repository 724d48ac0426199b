// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Tridiagonal Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use fusion_math::tridiag::thomas_solve;
use fusion_types::error::FusionResult;
use num_complex::Complex64;

use crate::coefficients::ModeSystem;

/// Direct solve of one mode system into `x` (length nx).
pub trait TridiagonalSolver: Sync {
    fn solve(&self, sys: &ModeSystem, x: &mut [Complex64]) -> FusionResult<()>;
}

/// Thomas elimination without pivoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThomasSolver;

impl TridiagonalSolver for ThomasSolver {
    fn solve(&self, sys: &ModeSystem, x: &mut [Complex64]) -> FusionResult<()> {
        thomas_solve(&sys.a, &sys.b, &sys.c, &sys.rhs, x)
    }
}
