// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Laplacian inversion configuration.
//!
//! Boundary behaviour is described by three flag records: one global and one
//! per x boundary. They replace the legacy `INVERT_*` bit sets, which can
//! still be decoded with `from_bits`.

use serde::{Deserialize, Serialize};

use crate::error::{FusionError, FusionResult};

/// Legacy bit values, kept for callers that still pass integer flag sets.
pub mod bits {
    // Global flags
    pub const INVERT_ZERO_DC: u32 = 1;
    pub const INVERT_BOTH_BNDRY_ONE: u32 = 4;
    pub const INVERT_KX_ZERO: u32 = 16;

    // Inner / outer boundary flags
    pub const INVERT_DC_GRAD: u32 = 1;
    pub const INVERT_AC_GRAD: u32 = 2;
    pub const INVERT_SET: u32 = 16;
    pub const INVERT_BNDRY_ONE: u32 = 128;

    pub const GLOBAL_MASK: u32 = INVERT_ZERO_DC | INVERT_BOTH_BNDRY_ONE | INVERT_KX_ZERO;
    pub const BOUNDARY_MASK: u32 = INVERT_DC_GRAD | INVERT_AC_GRAD | INVERT_SET | INVERT_BNDRY_ONE;
}

/// Flags that apply to the whole inversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalFlags {
    /// Use a single guard point on both x boundaries.
    pub both_boundary_width_one: bool,
    /// Subtract the interior mean of the kz = 0 solution.
    pub remove_kx_zero_offset: bool,
    /// Zero the DC component of the solution at every x point.
    pub force_dc_zero: bool,
}

impl GlobalFlags {
    pub fn from_bits(flags: u32) -> FusionResult<Self> {
        let unknown = flags & !bits::GLOBAL_MASK;
        if unknown != 0 {
            return Err(FusionError::ConfigError(format!(
                "unsupported global inversion flags: {unknown:#x}"
            )));
        }
        Ok(Self {
            both_boundary_width_one: flags & bits::INVERT_BOTH_BNDRY_ONE != 0,
            remove_kx_zero_offset: flags & bits::INVERT_KX_ZERO != 0,
            force_dc_zero: flags & bits::INVERT_ZERO_DC != 0,
        })
    }

    pub fn to_bits(&self) -> u32 {
        let mut out = 0;
        if self.both_boundary_width_one {
            out |= bits::INVERT_BOTH_BNDRY_ONE;
        }
        if self.remove_kx_zero_offset {
            out |= bits::INVERT_KX_ZERO;
        }
        if self.force_dc_zero {
            out |= bits::INVERT_ZERO_DC;
        }
        out
    }
}

/// Flags for one x boundary (inner or outer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryFlags {
    /// Take boundary values from the auxiliary row `x0` instead of zero.
    pub set_from_auxiliary: bool,
    /// Use a single guard point on this side. Overrides the global width.
    pub boundary_width_one: bool,
    /// Zero-gradient condition for the kz = 0 mode.
    pub dc_gradient: bool,
    /// Zero-gradient condition for the kz > 0 modes.
    pub ac_gradient: bool,
}

impl BoundaryFlags {
    pub fn from_bits(flags: u32) -> FusionResult<Self> {
        let unknown = flags & !bits::BOUNDARY_MASK;
        if unknown != 0 {
            return Err(FusionError::ConfigError(format!(
                "unsupported boundary inversion flags: {unknown:#x}"
            )));
        }
        Ok(Self {
            set_from_auxiliary: flags & bits::INVERT_SET != 0,
            boundary_width_one: flags & bits::INVERT_BNDRY_ONE != 0,
            dc_gradient: flags & bits::INVERT_DC_GRAD != 0,
            ac_gradient: flags & bits::INVERT_AC_GRAD != 0,
        })
    }

    pub fn to_bits(&self) -> u32 {
        let mut out = 0;
        if self.set_from_auxiliary {
            out |= bits::INVERT_SET;
        }
        if self.boundary_width_one {
            out |= bits::INVERT_BNDRY_ONE;
        }
        if self.dc_gradient {
            out |= bits::INVERT_DC_GRAD;
        }
        if self.ac_gradient {
            out |= bits::INVERT_AC_GRAD;
        }
        out
    }

    /// Zero-gradient condition selected for wavenumber index `kz`.
    pub fn is_gradient(&self, kz: usize) -> bool {
        if kz == 0 {
            self.dc_gradient
        } else {
            self.ac_gradient
        }
    }
}

/// How the per-mode solves are dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeSchedule {
    #[default]
    Parallel,
    Serial,
}

/// Complete inversion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaplaceConfig {
    pub global: GlobalFlags,
    pub inner: BoundaryFlags,
    pub outer: BoundaryFlags,
    /// Highest retained wavenumber index. `None` keeps every mode up to nz/2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxmode: Option<usize>,
    /// Reject non-finite output values.
    pub check_finite: bool,
    pub schedule: ModeSchedule,
    /// Worker threads for the mode loop. `None` uses the global rayon pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<usize>,
}

impl Default for LaplaceConfig {
    fn default() -> Self {
        Self {
            global: GlobalFlags::default(),
            inner: BoundaryFlags::default(),
            outer: BoundaryFlags::default(),
            maxmode: None,
            check_finite: cfg!(debug_assertions),
            schedule: ModeSchedule::default(),
            num_threads: None,
        }
    }
}

impl LaplaceConfig {
    /// Build a config from legacy (global, inner, outer) bit sets.
    pub fn from_bits(global: u32, inner: u32, outer: u32) -> FusionResult<Self> {
        Ok(Self {
            global: GlobalFlags::from_bits(global)?,
            inner: BoundaryFlags::from_bits(inner)?,
            outer: BoundaryFlags::from_bits(outer)?,
            ..Self::default()
        })
    }

    /// Load from a JSON file.
    pub fn from_file(path: &str) -> FusionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> FusionResult<Self> {
        let config: Self = serde_json::from_str(contents)?;
        Ok(config)
    }

    /// Check the config against the periodic extent and return the resolved
    /// maximum mode index.
    pub fn validate(&self, nz: usize) -> FusionResult<usize> {
        if nz == 0 {
            return Err(FusionError::ConfigError(
                "periodic direction must have at least one point".into(),
            ));
        }
        let limit = nz / 2;
        let maxmode = self.maxmode.unwrap_or(limit);
        if maxmode > limit {
            return Err(FusionError::ConfigError(format!(
                "maxmode={maxmode} exceeds nz/2={limit}"
            )));
        }
        if self.num_threads == Some(0) {
            return Err(FusionError::ConfigError(
                "num_threads must be >= 1 when set".into(),
            ));
        }
        Ok(maxmode)
    }
}
