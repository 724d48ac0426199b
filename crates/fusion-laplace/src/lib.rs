// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Fusion Laplace
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Perpendicular Laplacian inversion by FFT in z and tridiagonal solves in x.
//!
//! Solves `D ∇⊥²x + (1/C) ∇⊥C · ∇⊥x + A x = b` one x-z slice at a time. Each
//! z Fourier mode gives an independent complex tridiagonal system in x; the
//! modes are solved in parallel and transformed back.

pub mod boundary;
pub mod coefficients;
pub mod postprocess;
pub mod scheduler;
pub mod serial_tri;
pub mod solver;

pub use boundary::{BoundaryPolicy, BoundaryWidths};
pub use coefficients::{Coefficients, FiniteDifferenceBuilder, ModeContext, ModeSystem, SystemBuilder};
pub use scheduler::ModeScheduler;
pub use serial_tri::LaplaceSerialTri;
pub use solver::{ThomasSolver, TridiagonalSolver};
