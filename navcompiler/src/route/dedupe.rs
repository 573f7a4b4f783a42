//! Removal of degenerate and redundant fragments.
//!
//! Route data is often scanned from several overlapping source files, which
//! produces fragments that only retrace part of another fragment. A fragment
//! whose waypoint set is contained in another fragment's waypoint set adds no
//! coverage and is dropped.

use serde::Serialize;
use tracing::trace;

use super::fragment::Fragment;

/// Counters from a pruning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneStats {
    /// Fragments with fewer than two distinct waypoints.
    pub degenerate: u64,
    /// Fragments contained in another fragment.
    pub contained: u64,
}

impl PruneStats {
    pub fn add(&mut self, other: PruneStats) {
        self.degenerate += other.degenerate;
        self.contained += other.contained;
    }
}

/// Drop degenerate and contained fragments.
///
/// For each ordered pair `(f1, f2)` of distinct fragments, `f2` is marked when
/// its waypoint set is a subset of `f1`'s. A fragment that is already marked
/// does not mark others, so of two fragments with equal waypoint sets the
/// earlier one survives. Survivors keep their relative order and are
/// renumbered from 1.
///
/// O(F²) set comparisons; F is small per route.
pub fn prune(fragments: Vec<Fragment>) -> (Vec<Fragment>, PruneStats) {
    let mut stats = PruneStats::default();

    let candidates: Vec<Fragment> = fragments
        .into_iter()
        .filter(|f| {
            let keep = !f.is_degenerate();
            if !keep {
                stats.degenerate += 1;
            }
            keep
        })
        .collect();

    let mut marked = vec![false; candidates.len()];
    for i in 0..candidates.len() {
        if marked[i] {
            continue;
        }
        for j in 0..candidates.len() {
            if i == j || marked[j] {
                continue;
            }
            if candidates[j].is_contained_in(&candidates[i]) {
                trace!(
                    kept = candidates[i].number(),
                    removed = candidates[j].number(),
                    "Fragment contained in another fragment"
                );
                marked[j] = true;
                stats.contained += 1;
            }
        }
    }

    let survivors = candidates
        .into_iter()
        .zip(marked)
        .filter(|(_, removed)| !removed)
        .enumerate()
        .map(|(i, (mut fragment, _))| {
            fragment.renumber(i as u32 + 1);
            fragment
        })
        .collect();

    (survivors, stats)
}
