//! Sequence numbering and persistence of resolved fragments.

use serde::Serialize;
use tracing::debug;

use super::fragment::Fragment;
use super::segment::{Direction, RouteType, Segment};
use crate::error::StoreResult;
use crate::geo::Rect;
use crate::navaid::WaypointId;

/// One persisted route segment.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRow {
    /// Run-wide id, strictly increasing from 1.
    pub id: i64,
    pub name: String,
    pub route_type: RouteType,
    /// 1-based fragment number within the route name.
    pub fragment_no: u32,
    /// 1-based position within the fragment.
    pub sequence_no: u32,
    pub from_id: WaypointId,
    pub to_id: WaypointId,
    pub direction: Direction,
    pub min_alt: i32,
    pub max_alt: i32,
    pub from_lon: f64,
    pub from_lat: f64,
    pub to_lon: f64,
    pub to_lat: f64,
    pub bbox: Rect,
}

/// Destination of resolved route rows.
///
/// The driver calls `begin` and `delete_all` once at the start of a run,
/// `insert` for every row, and `commit` only when the run completes. An
/// aborted run leaves the transaction open for the caller to resolve.
pub trait RouteSink {
    fn begin(&mut self) -> StoreResult<()>;

    /// Delete every previously stored row; returns the number removed.
    fn delete_all(&mut self) -> StoreResult<u64>;

    fn insert(&mut self, row: &RouteRow) -> StoreResult<()>;

    fn commit(&mut self) -> StoreResult<()>;
}

impl<T: RouteSink + ?Sized> RouteSink for &mut T {
    fn begin(&mut self) -> StoreResult<()> {
        (**self).begin()
    }

    fn delete_all(&mut self) -> StoreResult<u64> {
        (**self).delete_all()
    }

    fn insert(&mut self, row: &RouteRow) -> StoreResult<()> {
        (**self).insert(row)
    }

    fn commit(&mut self) -> StoreResult<()> {
        (**self).commit()
    }
}

/// The longest accepted segment of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongestSegment {
    pub name: String,
    pub from_id: WaypointId,
    pub to_id: WaypointId,
    pub length_nm: f64,
}

/// Counters kept by the writer across all groups of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WriterStats {
    pub groups: u64,
    pub fragments: u64,
    pub rows: u64,
    pub longest_segment: Option<LongestSegment>,
}

/// Numbers fragment segments and writes them to a sink.
///
/// The id counter belongs to the writer instance, so independent writers (one
/// per route schema) never share ids.
#[derive(Debug)]
pub struct SequenceWriter<S> {
    sink: S,
    next_id: i64,
    stats: WriterStats,
}

impl<S: RouteSink> SequenceWriter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            next_id: 1,
            stats: WriterStats::default(),
        }
    }

    /// Write the surviving fragments of one route name.
    pub fn write(&mut self, name: &str, fragments: &[Fragment]) -> StoreResult<()> {
        let mut rows = 0;

        for fragment in fragments {
            for (i, segment) in fragment.segments().iter().enumerate() {
                let row = RouteRow {
                    id: self.next_id,
                    name: name.to_string(),
                    route_type: segment.route_type,
                    fragment_no: fragment.number(),
                    sequence_no: i as u32 + 1,
                    from_id: segment.from_id,
                    to_id: segment.to_id,
                    direction: segment.direction,
                    min_alt: segment.min_alt,
                    max_alt: segment.max_alt,
                    from_lon: segment.from_pos.lon,
                    from_lat: segment.from_pos.lat,
                    to_lon: segment.to_pos.lon,
                    to_lat: segment.to_pos.lat,
                    bbox: Rect::from_segment(&segment.from_pos, &segment.to_pos),
                };
                self.sink.insert(&row)?;
                self.next_id += 1;
                rows += 1;
            }
        }

        self.stats.groups += 1;
        self.stats.fragments += fragments.len() as u64;
        self.stats.rows += rows;

        debug!(
            name = name,
            fragments = fragments.len(),
            rows = rows,
            "Wrote route"
        );
        Ok(())
    }

    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Record a segment that passed the candidate filters.
    ///
    /// The longest segment is tracked over accepted segments, whether or not
    /// their fragment survives pruning.
    pub fn observe_accepted(&mut self, name: &str, segment: &Segment, length_nm: f64) {
        let longer = self
            .stats
            .longest_segment
            .as_ref()
            .map_or(true, |longest| length_nm > longest.length_nm);

        if longer {
            self.stats.longest_segment = Some(LongestSegment {
                name: name.to_string(),
                from_id: segment.from_id,
                to_id: segment.to_id,
                length_nm,
            });
        }
    }
}

/// Sink that keeps rows in memory with a single-level transaction.
///
/// `rows` is the working view including uncommitted inserts; `committed` is
/// what a rollback returns to.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub rows: Vec<RouteRow>,
    pub committed: Vec<RouteRow>,
    pub in_transaction: bool,
    pub commits: u32,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard uncommitted changes.
    pub fn rollback(&mut self) {
        self.rows = self.committed.clone();
        self.in_transaction = false;
    }
}

impl RouteSink for MemorySink {
    fn begin(&mut self) -> StoreResult<()> {
        self.rows = self.committed.clone();
        self.in_transaction = true;
        Ok(())
    }

    fn delete_all(&mut self) -> StoreResult<u64> {
        let removed = self.rows.len() as u64;
        self.rows.clear();
        Ok(removed)
    }

    fn insert(&mut self, row: &RouteRow) -> StoreResult<()> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.committed = self.rows.clone();
        self.in_transaction = false;
        self.commits += 1;
        Ok(())
    }
}
