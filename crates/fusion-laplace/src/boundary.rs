// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Boundary Policy
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Guard widths and right-hand-side source selection at the x boundaries.

use fusion_types::config::{BoundaryFlags, GlobalFlags, LaplaceConfig};

/// Number of boundary rows on each x side, each 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryWidths {
    pub inner: usize,
    pub outer: usize,
}

impl Default for BoundaryWidths {
    fn default() -> Self {
        Self { inner: 2, outer: 2 }
    }
}

impl BoundaryWidths {
    /// Default 2/2. The global width-one flag sets both sides, then each
    /// side's own width-one flag applies to that side.
    pub fn resolve(global: &GlobalFlags, inner: &BoundaryFlags, outer: &BoundaryFlags) -> Self {
        let mut widths = Self::default();
        if global.both_boundary_width_one {
            widths.inner = 1;
            widths.outer = 1;
        }
        if inner.boundary_width_one {
            widths.inner = 1;
        }
        if outer.boundary_width_one {
            widths.outer = 1;
        }
        widths
    }
}

/// Resolved boundary handling for one x extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPolicy {
    widths: BoundaryWidths,
    inner_set: bool,
    outer_set: bool,
    nx: usize,
}

impl BoundaryPolicy {
    pub fn new(config: &LaplaceConfig, nx: usize) -> Self {
        Self {
            widths: BoundaryWidths::resolve(&config.global, &config.inner, &config.outer),
            inner_set: config.inner.set_from_auxiliary,
            outer_set: config.outer.set_from_auxiliary,
            nx,
        }
    }

    pub fn widths(&self) -> BoundaryWidths {
        self.widths
    }

    /// Whether row `ix` takes its right-hand side from the auxiliary input.
    pub fn use_auxiliary(&self, ix: usize) -> bool {
        let from_outer = self.nx - 1 - ix;
        (ix < self.widths.inner && self.inner_set) || (from_outer < self.widths.outer && self.outer_set)
    }
}
