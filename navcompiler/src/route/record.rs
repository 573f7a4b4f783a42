//! Raw segment candidates as produced by the format readers.

use super::segment::{LegAttributes, RouteType};
use crate::navaid::WaypointRef;

/// One record of the candidate stream.
///
/// Airway sources list a point with its previous and next neighbours, direct
/// route sources list a plain from/to pair. Both become an ordered list of
/// points and the leg attributes between adjacent points: `legs[i]` joins
/// `points[i]` to `points[i + 1]`.
///
/// A leg whose source values could not be decoded carries a defect and
/// produces no segment; the rest of the record stays usable.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub name: String,
    pub route_type: RouteType,
    points: Vec<WaypointRef>,
    legs: Vec<LegAttributes>,
    defects: Vec<Option<String>>,
}

impl CandidateRecord {
    /// A from/to record.
    pub fn pair(
        name: impl Into<String>,
        route_type: RouteType,
        from: WaypointRef,
        to: WaypointRef,
        leg: LegAttributes,
    ) -> Self {
        Self {
            name: name.into(),
            route_type,
            points: vec![from, to],
            legs: vec![leg],
            defects: vec![None],
        }
    }

    /// A previous/mid/next record. Missing neighbours are skipped along with
    /// their leg.
    pub fn triple(
        name: impl Into<String>,
        route_type: RouteType,
        previous: Option<(WaypointRef, LegAttributes)>,
        mid: WaypointRef,
        next: Option<(WaypointRef, LegAttributes)>,
    ) -> Self {
        let mut points = Vec::with_capacity(3);
        let mut legs = Vec::with_capacity(2);

        if let Some((waypoint, leg)) = previous {
            points.push(waypoint);
            legs.push(leg);
        }
        points.push(mid);
        if let Some((waypoint, leg)) = next {
            points.push(waypoint);
            legs.push(leg);
        }

        Self {
            name: name.into(),
            route_type,
            points,
            defects: vec![None; legs.len()],
            legs,
        }
    }

    /// Mark leg `index` as undecodable.
    pub fn with_leg_defect(mut self, index: usize, reason: impl Into<String>) -> Self {
        if let Some(slot) = self.defects.get_mut(index) {
            *slot = Some(reason.into());
        }
        self
    }

    /// Mark every leg as undecodable.
    pub fn with_defect(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        for slot in &mut self.defects {
            *slot = Some(reason.clone());
        }
        self
    }

    /// Why leg `index` cannot become a segment, if it cannot.
    pub fn leg_defect(&self, index: usize) -> Option<&str> {
        self.defects.get(index).and_then(|d| d.as_deref())
    }

    /// Points in traversal order.
    pub fn points(&self) -> &[WaypointRef] {
        &self.points
    }

    pub fn legs(&self) -> &[LegAttributes] {
        &self.legs
    }

    /// Number of segments this record can produce.
    pub fn segment_count(&self) -> usize {
        self.legs.len()
    }
}
