// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Block Pool
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Recycling pool of fixed-shape 3D value blocks.
//!
//! A block handed out by [`BlockPool::acquire`] is an `Arc<Block>`; the
//! strong count is the block's reference count. When the last handle drops,
//! the backing array goes back on the free list instead of being freed.
//! Buffers are only released for good by [`BlockPool::cleanup`] or when the
//! pool itself is dropped.

use std::sync::{Arc, Weak};

use ndarray::Array3;
use parking_lot::Mutex;

/// Block extents `[nx, ny, nz]`.
pub type BlockShape = [usize; 3];

/// Snapshot of pool occupancy. `created == live + free` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub created: usize,
    pub live: usize,
    pub free: usize,
}

#[derive(Debug, Default)]
struct PoolState {
    free: Vec<Array3<f64>>,
    live: usize,
    created: usize,
}

/// Pool for one block shape.
#[derive(Debug)]
pub struct BlockPool {
    shape: BlockShape,
    state: Mutex<PoolState>,
}

impl BlockPool {
    pub fn new(shape: BlockShape) -> Arc<Self> {
        Arc::new(Self {
            shape,
            state: Mutex::new(PoolState::default()),
        })
    }

    pub fn shape(&self) -> BlockShape {
        self.shape
    }

    /// Hand out a block with unspecified contents and a reference count of 1.
    /// Free blocks are reused before anything new is allocated.
    pub fn acquire(self: &Arc<Self>) -> Arc<Block> {
        Arc::new(self.take_block())
    }

    fn take_block(self: &Arc<Self>) -> Block {
        let recycled = {
            let mut state = self.state.lock();
            state.live += 1;
            let recycled = state.free.pop();
            if recycled.is_none() {
                state.created += 1;
            }
            recycled
        };
        let data = recycled.unwrap_or_else(|| {
            log::trace!("BlockPool: allocating new {:?} block", self.shape);
            Array3::zeros(self.shape)
        });
        Block {
            data,
            pool: Arc::downgrade(self),
        }
    }

    fn release(&self, data: Array3<f64>) {
        let mut state = self.state.lock();
        state.live -= 1;
        state.free.push(data);
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        PoolStats {
            created: state.created,
            live: state.live,
            free: state.free.len(),
        }
    }

    /// Free every block on the free list. Returns how many were released.
    pub fn cleanup(&self) -> usize {
        let released = {
            let mut state = self.state.lock();
            let n = state.free.len();
            state.free.clear();
            state.created -= n;
            n
        };
        log::debug!("BlockPool: released {released} free {:?} blocks", self.shape);
        released
    }
}

/// One 3D value buffer owned by a pool.
///
/// Cloning draws a fresh buffer from the same pool, so `Arc::make_mut` on a
/// shared block performs the copy-on-write through the pool.
#[derive(Debug)]
pub struct Block {
    data: Array3<f64>,
    pool: Weak<BlockPool>,
}

impl Block {
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array3<f64> {
        &mut self.data
    }
}

impl Clone for Block {
    fn clone(&self) -> Self {
        match self.pool.upgrade() {
            Some(pool) => {
                let mut block = pool.take_block();
                block.data.assign(&self.data);
                block
            }
            None => Block {
                data: self.data.clone(),
                pool: Weak::new(),
            },
        }
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.upgrade() {
            pool.release(std::mem::take(&mut self.data));
        }
    }
}
