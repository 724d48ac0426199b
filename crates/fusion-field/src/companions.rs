// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Directional Companions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Arena for the yup/ydown companion fields of split fields.
//!
//! Companions refer to each other through ids rather than pointers. Ids carry
//! the owning registry and a generation, so an id never resolves in another
//! registry or in a reused slot.
//!
//! `CompanionRegistry` is a shared handle: clones refer to the same arena. A
//! split field keeps a handle and removes its pair when merged or dropped.
//! Holding a [`CompanionGuard`] locks the arena, so the guarded companion must
//! not be split, merged or dropped through another handle meanwhile.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::field3d::Field3D;

static NEXT_REGISTRY: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompanionId {
    registry: u64,
    index: usize,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Locked access to one companion field.
pub type CompanionGuard<'a> = MappedMutexGuard<'a, Field3D>;

#[derive(Debug)]
struct Entry {
    field: Field3D,
    direction: Direction,
    partner: CompanionId,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    entry: Option<Entry>,
}

#[derive(Debug, Default)]
struct Arena {
    slots: Vec<Slot>,
    vacant: Vec<usize>,
}

impl Arena {
    fn reserve(&mut self, registry: u64) -> CompanionId {
        let index = match self.vacant.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        CompanionId {
            registry,
            index,
            generation: self.slots[index].generation,
        }
    }

    fn slot_mut(&mut self, id: CompanionId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
    }

    fn entry(&self, id: CompanionId) -> Option<&Entry> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn remove(&mut self, id: CompanionId) -> Option<Field3D> {
        let slot = self.slot_mut(id)?;
        let entry = slot.entry.take()?;
        slot.generation += 1;
        self.vacant.push(id.index);
        Some(entry.field)
    }
}

#[derive(Clone)]
pub struct CompanionRegistry {
    id: u64,
    arena: Arc<Mutex<Arena>>,
}

impl Default for CompanionRegistry {
    fn default() -> Self {
        Self {
            id: NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed),
            arena: Arc::new(Mutex::new(Arena::default())),
        }
    }
}

impl fmt::Debug for CompanionRegistry {
    // Printing the arena would lock it, which can deadlock while a guard is held
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompanionRegistry").field("id", &self.id).finish()
    }
}

impl CompanionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when both handles refer to the same arena.
    pub fn same_registry(&self, other: &CompanionRegistry) -> bool {
        Arc::ptr_eq(&self.arena, &other.arena)
    }

    fn owns(&self, id: CompanionId) -> bool {
        id.registry == self.id
    }

    /// Store an up/down pair, each pointing at the other.
    pub(crate) fn insert_pair(&self, up: Field3D, down: Field3D) -> (CompanionId, CompanionId) {
        let mut arena = self.arena.lock();
        let up_id = arena.reserve(self.id);
        let down_id = arena.reserve(self.id);
        arena.slots[up_id.index].entry = Some(Entry {
            field: up,
            direction: Direction::Up,
            partner: down_id,
        });
        arena.slots[down_id.index].entry = Some(Entry {
            field: down,
            direction: Direction::Down,
            partner: up_id,
        });
        (up_id, down_id)
    }

    /// Remove both members of a pair. The fields are dropped after the arena
    /// is unlocked.
    pub(crate) fn remove_pair(&self, up: CompanionId, down: CompanionId) {
        if !self.owns(up) || !self.owns(down) {
            return;
        }
        let removed = {
            let mut arena = self.arena.lock();
            (arena.remove(up), arena.remove(down))
        };
        drop(removed);
    }

    /// Lock the arena and borrow one companion. Stale or foreign ids yield `None`.
    pub fn get(&self, id: CompanionId) -> Option<CompanionGuard<'_>> {
        if !self.owns(id) {
            return None;
        }
        MutexGuard::try_map(self.arena.lock(), |arena| {
            arena
                .slot_mut(id)
                .and_then(|slot| slot.entry.as_mut())
                .map(|e| &mut e.field)
        })
        .ok()
    }

    pub fn partner(&self, id: CompanionId) -> Option<CompanionId> {
        if !self.owns(id) {
            return None;
        }
        self.arena.lock().entry(id).map(|e| e.partner)
    }

    pub fn direction(&self, id: CompanionId) -> Option<Direction> {
        if !self.owns(id) {
            return None;
        }
        self.arena.lock().entry(id).map(|e| e.direction)
    }

    pub fn len(&self) -> usize {
        let arena = self.arena.lock();
        arena.slots.len() - arena.vacant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
