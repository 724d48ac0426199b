// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Field3D
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! 3D x-y-z scalar field backed by pooled, shared blocks.
//!
//! Cloning or assigning a field shares its block; the first mutation of a
//! shared block takes a private copy from the pool. Values therefore always
//! behave as if each field owned its own array.

use std::ops::{Deref, Index, IndexMut};
use std::sync::Arc;

use fusion_types::error::{FusionError, FusionResult};
use ndarray::{Array3, Axis};

use crate::companions::{CompanionGuard, CompanionId, CompanionRegistry};
use crate::field_perp::FieldPerp;
use crate::pool::{Block, BlockPool, BlockShape};

/// Staggered-grid location of a field's values within a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellLocation {
    #[default]
    Centre,
    XLow,
    YLow,
    ZLow,
}

#[derive(Debug, Default)]
enum Companions {
    /// yup / ydown are the field itself.
    #[default]
    Merged,
    Split {
        registry: CompanionRegistry,
        up: CompanionId,
        down: CompanionId,
    },
}

/// A resolved yup/ydown: the field itself when merged, otherwise its locked
/// companion.
pub enum Companion<'a> {
    Own(&'a Field3D),
    Registered(CompanionGuard<'a>),
}

impl Deref for Companion<'_> {
    type Target = Field3D;

    fn deref(&self) -> &Field3D {
        match self {
            Companion::Own(field) => field,
            Companion::Registered(guard) => &**guard,
        }
    }
}

#[derive(Debug)]
pub struct Field3D {
    pool: Arc<BlockPool>,
    block: Option<Arc<Block>>,
    location: CellLocation,
    deriv: Option<Box<Field3D>>,
    companions: Companions,
    bounds_check: bool,
}

impl Field3D {
    /// Unallocated field drawing its storage from `pool`.
    pub fn new(pool: &Arc<BlockPool>) -> Self {
        Field3D {
            pool: Arc::clone(pool),
            block: None,
            location: CellLocation::default(),
            deriv: None,
            companions: Companions::default(),
            bounds_check: cfg!(feature = "bounds-check"),
        }
    }

    pub fn filled(pool: &Arc<BlockPool>, value: f64) -> Self {
        let mut field = Self::new(pool);
        field.fill(value);
        field
    }

    /// Field with values `f((x, y, z))`.
    pub fn from_fn<F>(pool: &Arc<BlockPool>, mut f: F) -> Self
    where
        F: FnMut((usize, usize, usize)) -> f64,
    {
        let mut field = Self::new(pool);
        for (idx, value) in field.data_mut().indexed_iter_mut() {
            *value = f(idx);
        }
        field
    }

    pub fn pool(&self) -> &Arc<BlockPool> {
        &self.pool
    }

    pub fn shape(&self) -> BlockShape {
        self.pool.shape()
    }

    /// Make sure a block is held. Idempotent.
    pub fn allocate(&mut self) {
        if self.block.is_none() {
            self.block = Some(self.pool.acquire());
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.block.is_some()
    }

    /// Number of fields sharing this field's block (0 when unallocated).
    pub fn ref_count(&self) -> usize {
        self.block.as_ref().map_or(0, Arc::strong_count)
    }

    pub fn shares_block_with(&self, other: &Field3D) -> bool {
        match (&self.block, &other.block) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Share `other`'s values. The previously held block is released.
    pub fn assign(&mut self, other: &Field3D) {
        self.pool = Arc::clone(&other.pool);
        self.block = other.block.clone();
        self.location = other.location;
    }

    /// Set every value to `value`, on a block private to this field.
    pub fn fill(&mut self, value: f64) {
        if self.ref_count() != 1 {
            // Shared or missing: the old contents are irrelevant, skip the copy
            self.block = Some(self.pool.acquire());
        }
        self.data_mut().fill(value);
    }

    /// Read-only view of the values, if allocated.
    pub fn data(&self) -> Option<&Array3<f64>> {
        self.block.as_ref().map(|b| b.data())
    }

    /// Mutable view of the values. Allocates if needed and copies a shared
    /// block so that the returned array belongs to this field alone.
    pub fn data_mut(&mut self) -> &mut Array3<f64> {
        let pool = &self.pool;
        let block = self.block.get_or_insert_with(|| pool.acquire());
        Arc::make_mut(block).data_mut()
    }

    pub fn bounds_checking(&self) -> bool {
        self.bounds_check
    }

    pub fn set_bounds_checking(&mut self, enabled: bool) {
        self.bounds_check = enabled;
    }

    fn check_range(&self, x: usize, y: usize, z: usize) -> FusionResult<()> {
        let [nx, ny, nz] = self.shape();
        if x >= nx || y >= ny || z >= nz {
            return Err(FusionError::IndexOutOfBounds {
                x,
                y,
                z,
                nx,
                ny,
                nz,
            });
        }
        Ok(())
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> FusionResult<f64> {
        let data = self.data().ok_or(FusionError::Unallocated)?;
        if self.bounds_check {
            self.check_range(x, y, z)?;
        }
        Ok(data[[x, y, z]])
    }

    /// Write one value, allocating or unsharing the block first.
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: f64) -> FusionResult<()> {
        if self.bounds_check {
            self.check_range(x, y, z)?;
        }
        self.data_mut()[[x, y, z]] = value;
        Ok(())
    }

    /// False when unallocated or any value is NaN/inf.
    pub fn is_finite(&self) -> bool {
        self.data().is_some_and(|d| d.iter().all(|v| v.is_finite()))
    }

    pub fn location(&self) -> CellLocation {
        self.location
    }

    pub fn set_location(&mut self, location: CellLocation) {
        self.location = location;
    }

    /// The field's time derivative, created on first use.
    pub fn time_derivative(&mut self) -> &mut Field3D {
        let pool = &self.pool;
        let location = self.location;
        self.deriv.get_or_insert_with(|| {
            let mut deriv = Field3D::new(pool);
            deriv.location = location;
            Box::new(deriv)
        })
    }

    pub fn has_time_derivative(&self) -> bool {
        self.deriv.is_some()
    }

    /// Give this field separate yup/ydown companions held in `registry`.
    /// Does nothing if they already exist. The pair is removed from the
    /// registry when this field is merged or dropped.
    pub fn split_directional_companions(&mut self, registry: &CompanionRegistry) {
        if let Companions::Split { .. } = self.companions {
            return;
        }
        let mut up = Field3D::new(&self.pool);
        up.location = self.location;
        let mut down = Field3D::new(&self.pool);
        down.location = self.location;
        let (up, down) = registry.insert_pair(up, down);
        self.companions = Companions::Split {
            registry: registry.clone(),
            up,
            down,
        };
    }

    /// Drop the companions so that yup/ydown refer to this field again.
    pub fn merge_directional_companions(&mut self) {
        if let Companions::Split { registry, up, down } = std::mem::take(&mut self.companions) {
            registry.remove_pair(up, down);
        }
    }

    pub fn has_split_companions(&self) -> bool {
        matches!(self.companions, Companions::Split { .. })
    }

    /// Companion ids `(up, down)` when split.
    pub fn companion_ids(&self) -> Option<(CompanionId, CompanionId)> {
        match &self.companions {
            Companions::Merged => None,
            Companions::Split { up, down, .. } => Some((*up, *down)),
        }
    }

    /// Registry holding the companions, when split.
    pub fn companion_registry(&self) -> Option<&CompanionRegistry> {
        match &self.companions {
            Companions::Merged => None,
            Companions::Split { registry, .. } => Some(registry),
        }
    }

    pub fn yup(&self) -> Option<Companion<'_>> {
        match &self.companions {
            Companions::Merged => Some(Companion::Own(self)),
            Companions::Split { registry, up, .. } => registry.get(*up).map(Companion::Registered),
        }
    }

    pub fn ydown(&self) -> Option<Companion<'_>> {
        match &self.companions {
            Companions::Merged => Some(Companion::Own(self)),
            Companions::Split { registry, down, .. } => {
                registry.get(*down).map(Companion::Registered)
            }
        }
    }

    /// Copy of the x-z plane at `y`.
    pub fn slice(&self, y: usize) -> FusionResult<FieldPerp> {
        let data = self.data().ok_or(FusionError::Unallocated)?;
        let [nx, ny, nz] = self.shape();
        if y >= ny {
            return Err(FusionError::IndexOutOfBounds {
                x: 0,
                y,
                z: 0,
                nx,
                ny,
                nz,
            });
        }
        Ok(FieldPerp::from_array(
            y,
            data.index_axis(Axis(1), y).to_owned(),
        ))
    }

    /// Overwrite the x-z plane at `perp.index()`.
    pub fn set_slice(&mut self, perp: &FieldPerp) -> FusionResult<()> {
        let [nx, ny, nz] = self.shape();
        let y = perp.index();
        if y >= ny || perp.data().dim() != (nx, nz) {
            return Err(FusionError::Precondition(format!(
                "slice y={y} of shape {:?} does not fit field of shape ({nx}, {ny}, {nz})",
                perp.data().dim()
            )));
        }
        self.data_mut()
            .index_axis_mut(Axis(1), y)
            .assign(perp.data());
        Ok(())
    }
}

impl Clone for Field3D {
    /// Shares the block. The time derivative and companions stay with the
    /// original.
    fn clone(&self) -> Self {
        Field3D {
            pool: Arc::clone(&self.pool),
            block: self.block.clone(),
            location: self.location,
            deriv: None,
            companions: Companions::Merged,
            bounds_check: self.bounds_check,
        }
    }
}

impl Drop for Field3D {
    fn drop(&mut self) {
        self.merge_directional_companions();
    }
}

impl Index<[usize; 3]> for Field3D {
    type Output = f64;

    fn index(&self, idx: [usize; 3]) -> &f64 {
        match self.data() {
            Some(data) => &data[idx],
            None => panic!("Field3D: indexing unallocated data"),
        }
    }
}

impl IndexMut<[usize; 3]> for Field3D {
    fn index_mut(&mut self, idx: [usize; 3]) -> &mut f64 {
        &mut self.data_mut()[idx]
    }
}
