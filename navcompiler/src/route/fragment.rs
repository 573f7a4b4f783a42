//! Ordered chains of connected segments.

use std::collections::BTreeSet;

use super::segment::Segment;
use crate::navaid::WaypointId;

/// A maximal chain of connected segments within one route.
///
/// Consecutive segments share an endpoint: `segments[i].to_id ==
/// segments[i + 1].from_id`. The waypoint set is derived from the segments and
/// is only used for containment checks between fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    number: u32,
    segments: Vec<Segment>,
    waypoints: BTreeSet<WaypointId>,
}

impl Fragment {
    /// Create a fragment from segments already in chain order.
    pub fn new(number: u32, segments: Vec<Segment>) -> Self {
        let waypoints = segments
            .iter()
            .flat_map(|s| [s.from_id, s.to_id])
            .collect();

        Self {
            number,
            segments,
            waypoints,
        }
    }

    /// 1-based fragment number within the route.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub(crate) fn renumber(&mut self, number: u32) {
        self.number = number;
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn waypoints(&self) -> &BTreeSet<WaypointId> {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Fewer than two distinct waypoints.
    pub fn is_degenerate(&self) -> bool {
        self.waypoints.len() < 2
    }

    /// Whether every waypoint of this fragment also appears in `other`.
    pub fn is_contained_in(&self, other: &Fragment) -> bool {
        self.waypoints.is_subset(&other.waypoints)
    }

    /// Check the chain invariant.
    pub fn is_connected(&self) -> bool {
        self.segments.windows(2).all(|w| w[0].to_id == w[1].from_id)
    }

    /// Waypoint ids in traversal order, from the first origin to the last
    /// destination.
    pub fn path(&self) -> Vec<WaypointId> {
        let mut path = Vec::with_capacity(self.segments.len() + 1);
        if let Some(first) = self.segments.first() {
            path.push(first.from_id);
        }
        path.extend(self.segments.iter().map(|s| s.to_id));
        path
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{chain, seg};
    use super::*;

    #[test]
    fn test_waypoints_and_path() {
        let fragment = chain(1, &[1, 2, 3, 4]);
        assert_eq!(fragment.len(), 3);
        assert_eq!(fragment.path(), vec![1, 2, 3, 4]);
        assert_eq!(
            fragment.waypoints().iter().copied().collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert!(fragment.is_connected());
        assert!(!fragment.is_degenerate());
    }

    #[test]
    fn test_degenerate_fragment() {
        let fragment = Fragment::new(1, vec![seg(5, 5)]);
        assert!(fragment.is_degenerate());
        assert!(Fragment::new(2, Vec::new()).is_degenerate());
    }

    #[test]
    fn test_containment() {
        let long = chain(1, &[1, 2, 3]);
        let short = chain(2, &[2, 1]);
        assert!(short.is_contained_in(&long));
        assert!(!long.is_contained_in(&short));
    }

    #[test]
    fn test_disconnected_is_detected() {
        let fragment = Fragment::new(1, vec![seg(1, 2), seg(3, 4)]);
        assert!(!fragment.is_connected());
    }
}
