//! Schema bindings for the route tables.
//!
//! The resolver algorithm is shared; a schema only decides where candidates
//! come from, where rows go and how the run is labelled.

use std::fmt;

use serde::Serialize;

/// Default maximum airway segment length in nautical miles.
pub const DEFAULT_MAX_AIRWAY_SEGMENT_NM: f64 = 1000.0;

/// Default maximum direct route segment length in nautical miles.
pub const DEFAULT_MAX_DIRECT_SEGMENT_NM: f64 = 2000.0;

/// Route table family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RouteSchema {
    /// Victor and jet airways; candidates list previous/mid/next points.
    Airway,
    /// Direct routes; candidates list from/to pairs.
    DirectRoute,
}

impl RouteSchema {
    pub const ALL: [RouteSchema; 2] = [RouteSchema::Airway, RouteSchema::DirectRoute];

    /// Human readable label for logs and progress messages.
    pub fn label(self) -> &'static str {
        match self {
            RouteSchema::Airway => "airway",
            RouteSchema::DirectRoute => "direct route",
        }
    }

    /// Table the resolved rows are written to.
    pub fn output_table(self) -> &'static str {
        match self {
            RouteSchema::Airway => "airway",
            RouteSchema::DirectRoute => "direct_route",
        }
    }

    /// Staging table filled by the format readers.
    pub fn candidate_table(self) -> &'static str {
        match self {
            RouteSchema::Airway => "tmp_airway_point",
            RouteSchema::DirectRoute => "tmp_direct_route",
        }
    }

    pub fn default_max_segment_nm(self) -> f64 {
        match self {
            RouteSchema::Airway => DEFAULT_MAX_AIRWAY_SEGMENT_NM,
            RouteSchema::DirectRoute => DEFAULT_MAX_DIRECT_SEGMENT_NM,
        }
    }
}

impl fmt::Display for RouteSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
