//! Route segment resolution.
//!
//! Turns the staged candidate rows of one route schema into ordered,
//! numbered route segments:
//!
//! 1. [`NavaidResolver`](crate::navaid::NavaidResolver) maps waypoint
//!    references to concrete ids
//! 2. [`RouteGroup`] collects the unique segments of one route name
//! 3. [`ChainBuilder`] links them into maximal connected [`Fragment`]s
//! 4. [`prune`] drops fragments covered by another fragment of the name
//! 5. [`SequenceWriter`] numbers the survivors and hands rows to a
//!    [`RouteSink`]
//!
//! [`ResolveDriver`] runs the whole sequence one route name at a time inside
//! a single transaction.
//!
//! # Example
//!
//! ```
//! use navcompiler::geo::Pos;
//! use navcompiler::navaid::{MemoryNavaids, WaypointKind, WaypointRef};
//! use navcompiler::progress::NoProgress;
//! use navcompiler::route::{
//!     CandidateRecord, LegAttributes, MemorySink, ResolveDriver, ResolverConfig, RouteSchema,
//!     RouteType,
//! };
//!
//! let mut navaids = MemoryNavaids::new();
//! navaids
//!     .insert(1, "ALPHA", "ED", WaypointKind::Waypoint, Pos::new(8.0, 50.0))
//!     .insert(2, "BRAVO", "ED", WaypointKind::Waypoint, Pos::new(9.0, 50.0));
//!
//! let record = CandidateRecord::pair(
//!     "T1",
//!     RouteType::Jet,
//!     WaypointRef::new("ALPHA", "ED", WaypointKind::Waypoint),
//!     WaypointRef::new("BRAVO", "ED", WaypointKind::Waypoint),
//!     LegAttributes::default(),
//! );
//!
//! let config = ResolverConfig::for_schema(RouteSchema::Airway);
//! let mut driver = ResolveDriver::new(config, navaids, MemorySink::new(), NoProgress);
//! let aborted = driver.run(vec![Ok(record)], 100).unwrap();
//!
//! assert!(!aborted);
//! assert_eq!(driver.sink().rows.len(), 1);
//! ```

mod chain;
mod config;
mod dedupe;
mod driver;
mod fragment;
mod group;
mod record;
mod schema;
mod segment;
mod writer;

pub use chain::ChainBuilder;
pub use config::ResolverConfig;
pub use dedupe::{prune, PruneStats};
pub use driver::{ResolveDriver, ResolveStats, RunSummary};
pub use fragment::Fragment;
pub use group::RouteGroup;
pub use record::CandidateRecord;
pub use schema::{RouteSchema, DEFAULT_MAX_AIRWAY_SEGMENT_NM, DEFAULT_MAX_DIRECT_SEGMENT_NM};
pub use segment::{Direction, LegAttributes, RouteType, Segment, SegmentKey};
pub use writer::{LongestSegment, MemorySink, RouteRow, RouteSink, SequenceWriter, WriterStats};
