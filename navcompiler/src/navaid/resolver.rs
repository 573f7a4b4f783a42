//! Position-biased navaid resolution.

use serde::Serialize;
use tracing::trace;

use super::{NavaidCandidate, NavaidLookup, WaypointId, WaypointRef};
use crate::error::StoreResult;
use crate::geo::Pos;

/// A navaid reference resolved to a concrete waypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedNavaid {
    pub id: WaypointId,
    pub pos: Pos,
    /// Number of waypoints that matched the lookup.
    pub matches: usize,
}

/// Lookup counters for the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    pub lookups: u64,
    pub resolved: u64,
    /// Lookups with more than one match.
    pub ambiguous: u64,
    /// Ambiguous lookups decided by the bias position.
    pub biased: u64,
    pub not_found: u64,
    /// References with a blank ident or an unknown type code, never looked up.
    pub invalid: u64,
}

/// Resolves `(ident, region, type)` references to waypoint ids.
#[derive(Debug)]
pub struct NavaidResolver<L> {
    lookup: L,
    stats: ResolverStats,
}

impl<L: NavaidLookup> NavaidResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            stats: ResolverStats::default(),
        }
    }

    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    /// Resolve a single reference.
    ///
    /// With several matches and a bias position the match nearest to the bias
    /// wins; without a bias the first match (lowest id) wins. Returns `None`
    /// when nothing matches or the reference is not valid.
    pub fn resolve(
        &mut self,
        waypoint: &WaypointRef,
        bias: Option<Pos>,
    ) -> StoreResult<Option<ResolvedNavaid>> {
        let kind = match waypoint.kind {
            Some(kind) if waypoint.is_valid() => kind,
            _ => {
                self.stats.invalid += 1;
                trace!(waypoint = %waypoint, "Skipping invalid navaid reference");
                return Ok(None);
            }
        };
        self.stats.lookups += 1;

        let candidates = self
            .lookup
            .lookup(&waypoint.ident, &waypoint.region, kind)?;

        let chosen = match (candidates.len(), bias) {
            (0, _) => None,
            (1, _) => candidates.first().copied(),
            (_, Some(bias)) => {
                self.stats.biased += 1;
                nearest(&candidates, &bias)
            }
            (_, None) => candidates.first().copied(),
        };

        if candidates.len() > 1 {
            self.stats.ambiguous += 1;
            trace!(
                waypoint = %waypoint,
                matches = candidates.len(),
                chosen = ?chosen.map(|c| c.id),
                "Ambiguous navaid reference"
            );
        }

        match chosen {
            Some(c) => {
                self.stats.resolved += 1;
                Ok(Some(ResolvedNavaid {
                    id: c.id,
                    pos: c.pos,
                    matches: candidates.len(),
                }))
            }
            None => {
                self.stats.not_found += 1;
                Ok(None)
            }
        }
    }

    /// Resolve the points of one record in traversal order.
    ///
    /// Each resolved position becomes the bias for the next point. An
    /// unresolved point yields `None` in its slot and leaves the bias as it
    /// was.
    pub fn resolve_path(
        &mut self,
        points: &[WaypointRef],
        initial_bias: Option<Pos>,
    ) -> StoreResult<Vec<Option<ResolvedNavaid>>> {
        let mut bias = initial_bias;
        let mut resolved = Vec::with_capacity(points.len());

        for point in points {
            let navaid = self.resolve(point, bias)?;
            if let Some(n) = navaid {
                bias = Some(n.pos);
            }
            resolved.push(navaid);
        }

        Ok(resolved)
    }
}

/// Candidate closest to `bias` by great-circle distance; first wins ties.
fn nearest(candidates: &[NavaidCandidate], bias: &Pos) -> Option<NavaidCandidate> {
    candidates
        .iter()
        .map(|c| (c, c.pos.distance_meters(bias)))
        .fold(None, |best: Option<(&NavaidCandidate, f64)>, (c, d)| match best {
            Some((_, best_d)) if best_d <= d => best,
            _ => Some((c, d)),
        })
        .map(|(c, _)| *c)
}
