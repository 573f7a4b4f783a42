//! Directed route segments and their coded attributes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::geo::Pos;
use crate::navaid::WaypointId;

/// Direction restriction of a route segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Usable in both directions.
    #[default]
    Both,
    /// Usable only from `from` to `to`.
    Forward,
    /// Usable only from `to` to `from`.
    Backward,
}

impl Direction {
    pub fn code(self) -> &'static str {
        match self {
            Direction::Both => "N",
            Direction::Forward => "F",
            Direction::Backward => "B",
        }
    }

    /// Parse a stored code. An empty code means no restriction.
    pub fn from_code(code: &str) -> StoreResult<Self> {
        match code.trim() {
            "" | "N" => Ok(Direction::Both),
            "F" => Ok(Direction::Forward),
            "B" => Ok(Direction::Backward),
            other => Err(StoreError::invalid_code("direction", other)),
        }
    }
}

/// Published route category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteType {
    /// Low altitude airway.
    Victor,
    /// High altitude airway.
    Jet,
    /// Airway published for both altitude structures.
    Both,
    /// Direct route between two waypoints.
    Direct,
}

impl RouteType {
    pub fn code(self) -> &'static str {
        match self {
            RouteType::Victor => "V",
            RouteType::Jet => "J",
            RouteType::Both => "B",
            RouteType::Direct => "D",
        }
    }

    pub fn from_code(code: &str) -> StoreResult<Self> {
        match code.trim() {
            "V" => Ok(RouteType::Victor),
            "J" => Ok(RouteType::Jet),
            "B" => Ok(RouteType::Both),
            "D" => Ok(RouteType::Direct),
            other => Err(StoreError::invalid_code("route type", other)),
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Altitude and direction attributes of one leg between adjacent points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegAttributes {
    pub direction: Direction,
    /// Minimum altitude in feet, 0 when unpublished.
    pub min_alt: i32,
    /// Maximum altitude in feet, 0 when unpublished.
    pub max_alt: i32,
}

impl LegAttributes {
    pub fn new(direction: Direction, min_alt: i32, max_alt: i32) -> Self {
        Self {
            direction,
            min_alt,
            max_alt,
        }
    }
}

/// Identity of a segment: the ordered endpoint pair.
pub type SegmentKey = (WaypointId, WaypointId);

/// One directed leg of a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from_id: WaypointId,
    pub to_id: WaypointId,
    pub direction: Direction,
    pub min_alt: i32,
    pub max_alt: i32,
    pub route_type: RouteType,
    pub from_pos: Pos,
    pub to_pos: Pos,
}

impl Segment {
    pub fn key(&self) -> SegmentKey {
        (self.from_id, self.to_id)
    }

    /// Great-circle length in nautical miles.
    pub fn length_nm(&self) -> f64 {
        self.from_pos.distance_nm(&self.to_pos)
    }

    /// A segment that starts and ends at the same waypoint.
    pub fn is_degenerate(&self) -> bool {
        self.from_id == self.to_id
    }
}
