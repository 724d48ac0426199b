// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Fusion Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Field storage for the Laplacian solvers.
//!
//! 3D fields hold shared, pool-recycled blocks with copy-on-write semantics;
//! x-z slices are plain owned arrays.

pub mod companions;
pub mod field3d;
pub mod field_perp;
pub mod pool;

pub use companions::{CompanionGuard, CompanionId, CompanionRegistry, Direction};
pub use field3d::{CellLocation, Companion, Field3D};
pub use field_perp::FieldPerp;
pub use pool::{Block, BlockPool, PoolStats};
