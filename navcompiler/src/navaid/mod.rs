//! Navaid lookup and disambiguation.
//!
//! Route data names its endpoints by ident, ICAO region and waypoint type.
//! Idents are not globally unique, so the same `(ident, region, type)` triple
//! can match several waypoints. [`NavaidResolver`] picks one of them using a
//! bias position: the coordinate of the previously resolved point of the same
//! record.
//!
//! # Bias threading
//!
//! ```text
//! previous ──► mid ──► next
//!    │          ▲ │      ▲
//!    └─ bias ───┘ └ bias ┘
//! ```
//!
//! The bias is passed explicitly through [`NavaidResolver::resolve_path`];
//! there is no hidden "last position" state on the resolver.

mod memory;
mod resolver;

pub use memory::MemoryNavaids;
pub use resolver::{NavaidResolver, ResolvedNavaid, ResolverStats};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::geo::Pos;

/// Opaque id of a waypoint row in the navaid store.
pub type WaypointId = i64;

/// Type filter applied to navaid lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaypointKind {
    /// Named fix or intersection.
    Waypoint,
    /// VHF omnidirectional range.
    Vor,
    /// Non-directional beacon.
    Ndb,
}

impl WaypointKind {
    /// Single-character code stored in the database.
    pub fn code(self) -> &'static str {
        match self {
            WaypointKind::Waypoint => "W",
            WaypointKind::Vor => "V",
            WaypointKind::Ndb => "N",
        }
    }

    /// Parse a stored code.
    pub fn from_code(code: &str) -> StoreResult<Self> {
        match code.trim() {
            "W" => Ok(WaypointKind::Waypoint),
            "V" => Ok(WaypointKind::Vor),
            "N" => Ok(WaypointKind::Ndb),
            other => Err(StoreError::invalid_code("waypoint type", other)),
        }
    }
}

impl fmt::Display for WaypointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Reference to a waypoint as written in route source data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WaypointRef {
    pub ident: String,
    /// ICAO region; empty when the source omits it.
    pub region: String,
    /// `None` when the source type code could not be decoded.
    pub kind: Option<WaypointKind>,
}

impl WaypointRef {
    pub fn new(ident: impl Into<String>, region: impl Into<String>, kind: WaypointKind) -> Self {
        Self {
            ident: ident.into(),
            region: region.into(),
            kind: Some(kind),
        }
    }

    /// A reference whose type code is unknown. It never resolves.
    pub fn with_unknown_kind(ident: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            region: region.into(),
            kind: None,
        }
    }

    /// Whether the reference can be looked up at all.
    pub fn is_valid(&self) -> bool {
        self.kind.is_some() && !self.ident.trim().is_empty()
    }
}

impl fmt::Display for WaypointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind.map_or("?", WaypointKind::code);
        if self.region.is_empty() {
            write!(f, "{}/{}", self.ident, kind)
        } else {
            write!(f, "{}/{}/{}", self.ident, self.region, kind)
        }
    }
}

/// A waypoint matching a lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavaidCandidate {
    pub id: WaypointId,
    pub pos: Pos,
}

impl NavaidCandidate {
    pub fn new(id: WaypointId, pos: Pos) -> Self {
        Self { id, pos }
    }
}

/// Source of navaid candidates.
///
/// Implementations return every waypoint whose ident and type match exactly
/// and whose region matches exactly, or any region when `region` is empty.
/// Results must be ordered by waypoint id so that "first match" is stable.
pub trait NavaidLookup {
    fn lookup(
        &self,
        ident: &str,
        region: &str,
        kind: WaypointKind,
    ) -> StoreResult<Vec<NavaidCandidate>>;
}

impl<T: NavaidLookup + ?Sized> NavaidLookup for &T {
    fn lookup(
        &self,
        ident: &str,
        region: &str,
        kind: WaypointKind,
    ) -> StoreResult<Vec<NavaidCandidate>> {
        (**self).lookup(ident, region, kind)
    }
}
