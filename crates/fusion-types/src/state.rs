// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::Array2;

use crate::error::{FusionError, FusionResult};

/// Local x-y-z mesh seen by the perpendicular Laplacian solvers.
///
/// x is the inverted (radial) direction, z is periodic with length `zlength`.
/// Guard points occupy `0..xstart` and `xend+1..local_nx` in x.
#[derive(Debug, Clone)]
pub struct PerpMesh {
    pub local_nx: usize,
    pub local_ny: usize,
    pub local_nz: usize,
    pub xstart: usize, // first interior x index
    pub xend: usize,   // last interior x index (inclusive)
    pub ystart: usize,
    pub yend: usize,
    pub dx: Array2<f64>, // [local_nx, local_ny]
    pub zlength: f64,
    pub periodic_x: bool,
    pub nxpe: usize, // processors along x
}

impl PerpMesh {
    /// Uniform mesh on x in [0, lx] with `mxg` guard points per side.
    ///
    /// `nx` counts every x point including guards; the first and last points
    /// sit exactly on x = 0 and x = lx.
    pub fn new(nx: usize, ny: usize, nz: usize, mxg: usize, lx: f64, zlength: f64) -> Self {
        let dx = if nx > 1 { lx / (nx - 1) as f64 } else { lx };
        PerpMesh {
            local_nx: nx,
            local_ny: ny,
            local_nz: nz,
            xstart: mxg,
            xend: nx.saturating_sub(mxg + 1),
            ystart: 0,
            yend: ny.saturating_sub(1),
            dx: Array2::from_elem((nx, ny), dx),
            zlength,
            periodic_x: false,
            nxpe: 1,
        }
    }

    pub fn x_coord(&self, ix: usize, jy: usize) -> f64 {
        self.dx.column(jy).iter().take(ix).sum()
    }

    pub fn z_coord(&self, iz: usize) -> f64 {
        iz as f64 * self.zlength / self.local_nz as f64
    }

    /// True when the whole x extent is held by this process.
    pub fn is_x_local(&self) -> bool {
        self.nxpe == 1
    }

    pub fn validate(&self) -> FusionResult<()> {
        if self.local_nx < 3 || self.local_ny == 0 || self.local_nz == 0 {
            return Err(FusionError::Precondition(format!(
                "mesh extents too small: nx={}, ny={}, nz={}",
                self.local_nx, self.local_ny, self.local_nz
            )));
        }
        if self.xstart == 0 || self.xstart > self.xend || self.xend + 1 >= self.local_nx {
            return Err(FusionError::Precondition(format!(
                "invalid interior x range [{}, {}] for nx={}",
                self.xstart, self.xend, self.local_nx
            )));
        }
        if self.ystart > self.yend || self.yend >= self.local_ny {
            return Err(FusionError::Precondition(format!(
                "invalid y range [{}, {}] for ny={}",
                self.ystart, self.yend, self.local_ny
            )));
        }
        if self.dx.dim() != (self.local_nx, self.local_ny) {
            return Err(FusionError::Precondition(format!(
                "dx has shape {:?}, expected ({}, {})",
                self.dx.dim(),
                self.local_nx,
                self.local_ny
            )));
        }
        if self.dx.iter().any(|&d| !(d > 0.0 && d.is_finite())) {
            return Err(FusionError::Precondition(
                "dx must be positive and finite".into(),
            ));
        }
        if !(self.zlength > 0.0 && self.zlength.is_finite()) {
            return Err(FusionError::Precondition(format!(
                "zlength must be positive, got {}",
                self.zlength
            )));
        }
        Ok(())
    }
}
