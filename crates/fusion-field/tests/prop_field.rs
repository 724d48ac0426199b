// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Property-Based Tests (proptest) for fusion-field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for fusion-field using proptest.
//!
//! Covers: copy-on-write value semantics, pool accounting.

use fusion_field::{BlockPool, Field3D};
use proptest::prelude::*;

fn shape() -> impl Strategy<Value = [usize; 3]> {
    (1usize..6, 1usize..4, 1usize..6).prop_map(|(x, y, z)| [x, y, z])
}

// ── Copy-on-Write Properties ─────────────────────────────────────────

proptest! {
    /// After a.assign(b) and any sequence of writes to a, b is unchanged.
    #[test]
    fn assign_then_write_preserves_source(
        dims in shape(),
        writes in prop::collection::vec((0usize..64, -5.0f64..5.0), 1..20),
    ) {
        let pool = BlockPool::new(dims);
        let b = Field3D::from_fn(&pool, |(x, y, z)| (x + 7 * y + 31 * z) as f64);
        let snapshot = b.data().unwrap().clone();

        let mut a = Field3D::new(&pool);
        a.assign(&b);
        let [nx, ny, nz] = dims;
        for (flat, value) in writes {
            let flat = flat % (nx * ny * nz);
            a[[flat / (ny * nz), (flat / nz) % ny, flat % nz]] = value;
        }

        prop_assert_eq!(b.data().unwrap(), &snapshot);
        prop_assert!(!a.shares_block_with(&b));
        prop_assert_eq!(b.ref_count(), 1);
    }

    /// Independently allocated fields never share a block.
    #[test]
    fn independent_allocations_never_share(dims in shape(), n in 2usize..8) {
        let pool = BlockPool::new(dims);
        let mut fields: Vec<Field3D> = (0..n).map(|_| Field3D::new(&pool)).collect();
        for f in fields.iter_mut() {
            f.allocate();
        }
        for i in 0..n {
            for j in (i + 1)..n {
                prop_assert!(!fields[i].shares_block_with(&fields[j]));
            }
        }
    }
}

// ── Pool Accounting Properties ───────────────────────────────────────

proptest! {
    /// created == live + free after any mix of clones, writes and drops.
    #[test]
    fn pool_counts_stay_consistent(
        ops in prop::collection::vec(0u8..4, 1..40),
    ) {
        let pool = BlockPool::new([3, 2, 4]);
        let mut fields: Vec<Field3D> = vec![Field3D::filled(&pool, 0.0)];
        for op in ops {
            match op {
                0 => fields.push(Field3D::filled(&pool, 1.0)),
                1 => {
                    let copy = fields[fields.len() - 1].clone();
                    fields.push(copy);
                }
                2 => {
                    let last = fields.len() - 1;
                    fields[last][[0, 0, 0]] = 2.0;
                }
                _ => {
                    if fields.len() > 1 {
                        fields.remove(0);
                    }
                }
            }
            let stats = pool.stats();
            prop_assert_eq!(stats.created, stats.live + stats.free);
        }

        let live = pool.stats().live;
        drop(fields);
        prop_assert_eq!(pool.stats().live, 0);
        prop_assert!(pool.stats().free >= live);
    }
}
