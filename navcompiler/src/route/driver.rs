//! Streaming resolver run over a candidate source.
//!
//! ```text
//! candidates (sorted by name)
//!     │
//!     ▼
//! NavaidResolver ──► RouteGroup ──(name changes)──► ChainBuilder
//!                                                      │
//!                        SequenceWriter ◄── prune ◄────┘
//! ```
//!
//! Only one route group is held in memory at a time. The writer's id counter,
//! the run statistics and the set of names already read are the only state
//! that outlives a group. A name coming back after another name fails the
//! run, since its fragments are already numbered and written.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::chain::ChainBuilder;
use super::config::ResolverConfig;
use super::dedupe::{prune, PruneStats};
use super::group::RouteGroup;
use super::record::CandidateRecord;
use super::schema::RouteSchema;
use super::segment::Segment;
use super::writer::{RouteSink, SequenceWriter, WriterStats};
use crate::error::{ResolveError, ResolveResult, StoreResult};
use crate::navaid::{NavaidLookup, NavaidResolver, ResolverStats};
use crate::progress::{ProgressReporter, ReportThrottle};

/// Counters for candidate handling during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolveStats {
    /// Rows removed from the output table before the run.
    pub deleted_rows: u64,
    pub records: u64,
    /// Route groups read from the source, including the aborted one.
    pub groups_read: u64,
    pub segments_accepted: u64,
    /// Segments with a key already present in their group.
    pub duplicate_segments: u64,
    /// Segments dropped because an endpoint did not resolve.
    pub unresolved_segments: u64,
    /// Segments dropped because a direction or route type code was unknown.
    pub invalid_segments: u64,
    /// Segments dropped by the maximum length filter.
    pub too_long_segments: u64,
    /// Segments that start and end at the same waypoint.
    pub degenerate_segments: u64,
    pub pruned: PruneStats,
}

/// Report of a finished or aborted run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub schema: RouteSchema,
    pub aborted: bool,
    pub max_segment_length_nm: f64,
    pub elapsed_ms: u128,
    /// Local time the run ended, RFC 3339.
    pub finished_at: String,
    pub candidates: ResolveStats,
    pub navaids: ResolverStats,
    pub output: WriterStats,
}

/// Drives one resolver run for one schema.
#[derive(Debug)]
pub struct ResolveDriver<L, S, P> {
    config: ResolverConfig,
    resolver: NavaidResolver<L>,
    writer: SequenceWriter<S>,
    progress: P,
    stats: ResolveStats,
    aborted: bool,
    elapsed: Duration,
}

impl<L, S, P> ResolveDriver<L, S, P>
where
    L: NavaidLookup,
    S: RouteSink,
    P: ProgressReporter,
{
    pub fn new(config: ResolverConfig, lookup: L, sink: S, progress: P) -> Self {
        Self {
            config,
            resolver: NavaidResolver::new(lookup),
            writer: SequenceWriter::new(sink),
            progress,
            stats: ResolveStats::default(),
            aborted: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Rebuild the output table from `candidates`.
    ///
    /// `candidates` must be grouped by route name. `max_report_steps` is the
    /// number of progress steps this run may consume; unused steps are
    /// credited to the reporter at the end.
    ///
    /// Returns `Ok(true)` if the reporter cancelled the run. In that case the
    /// group being read is discarded and the transaction is left open with
    /// the groups written so far; rolling back is up to the caller. Storage
    /// failures and a route name that reappears after another name are
    /// returned as errors, also with the transaction left open.
    pub fn run<I>(&mut self, candidates: I, max_report_steps: u64) -> ResolveResult<bool>
    where
        I: IntoIterator<Item = StoreResult<CandidateRecord>>,
    {
        let started = Instant::now();
        let schema = self.config.schema;

        let sink = self.writer.sink_mut();
        sink.begin()
            .map_err(|e| ResolveError::store("begin transaction", e))?;
        let deleted = sink
            .delete_all()
            .map_err(|e| ResolveError::store("delete previous rows", e))?;
        self.stats.deleted_rows += deleted;
        info!(
            table = schema.output_table(),
            deleted = deleted,
            "Deleted previous {} rows",
            schema.label()
        );

        let mut throttle = ReportThrottle::new(self.config.batch_rows, self.config.report_interval);
        let mut steps_used: u64 = 0;
        let mut last_reported: Option<String> = None;
        let mut group: Option<RouteGroup> = None;
        let mut seen_names: HashSet<String> = HashSet::new();
        let mut aborted = false;

        for record in candidates {
            let record = record.map_err(|e| ResolveError::store("read candidates", e))?;

            let name_changed = group.as_ref().map_or(true, |g| g.name() != record.name);
            if name_changed {
                if !seen_names.insert(record.name.clone()) {
                    warn!(name = %record.name, "Route name reappears in candidate stream");
                    return Err(ResolveError::UngroupedInput {
                        name: record.name.clone(),
                    });
                }
                self.stats.groups_read += 1;
                if let Some(done) = group.replace(RouteGroup::new(record.name.clone())) {
                    self.flush(done)?;
                }
            }

            if let Some(current) = group.as_mut() {
                self.add_record(current, &record)?;
            }

            if throttle.tick() {
                steps_used = (steps_used + 1).min(max_report_steps);
                let silent = last_reported.as_deref() == Some(record.name.as_str());
                let message = format!("Resolving {} {}", schema.label(), record.name);
                if self.progress.report_progress(&message, silent) {
                    aborted = true;
                    break;
                }
                last_reported = Some(record.name.clone());
            }
        }

        if aborted {
            if let Some(dropped) = group.take() {
                info!(
                    name = dropped.name(),
                    segments = dropped.len(),
                    "Discarding route group of cancelled run"
                );
            }
        } else {
            if let Some(done) = group.take() {
                self.flush(done)?;
            }
            self.writer
                .sink_mut()
                .commit()
                .map_err(|e| ResolveError::store("commit", e))?;
        }

        self.progress
            .increase_current(max_report_steps.saturating_sub(steps_used));
        self.aborted = aborted;
        self.elapsed = started.elapsed();

        let output = self.writer.stats();
        info!(
            schema = schema.label(),
            aborted = aborted,
            routes = output.groups,
            fragments = output.fragments,
            rows = output.rows,
            unresolved = self.stats.unresolved_segments,
            too_long = self.stats.too_long_segments,
            contained = self.stats.pruned.contained,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "Resolver run finished"
        );
        if let Some(longest) = &output.longest_segment {
            info!(
                name = %longest.name,
                from_id = longest.from_id,
                to_id = longest.to_id,
                length_nm = longest.length_nm,
                "Longest {} segment",
                schema.label()
            );
        }

        Ok(aborted)
    }

    /// Resolve a record's points and add its segments to the group.
    fn add_record(
        &mut self,
        group: &mut RouteGroup,
        record: &CandidateRecord,
    ) -> ResolveResult<()> {
        self.stats.records += 1;

        let points = record.points();
        let resolved = self
            .resolver
            .resolve_path(points, None)
            .map_err(|e| ResolveError::store("navaid lookup", e))?;

        for (i, leg) in record.legs().iter().enumerate() {
            if let Some(defect) = record.leg_defect(i) {
                self.stats.invalid_segments += 1;
                warn!(
                    name = %record.name,
                    from = %points[i],
                    to = %points[i + 1],
                    defect = defect,
                    "Dropping segment with undecodable attributes"
                );
                continue;
            }

            let (Some(from), Some(to)) = (resolved[i], resolved[i + 1]) else {
                self.stats.unresolved_segments += 1;
                warn!(
                    name = %record.name,
                    from = %points[i],
                    to = %points[i + 1],
                    "Dropping segment with unresolved navaid"
                );
                continue;
            };

            let segment = Segment {
                from_id: from.id,
                to_id: to.id,
                direction: leg.direction,
                min_alt: leg.min_alt,
                max_alt: leg.max_alt,
                route_type: record.route_type,
                from_pos: from.pos,
                to_pos: to.pos,
            };

            if segment.is_degenerate() {
                self.stats.degenerate_segments += 1;
                debug!(name = %record.name, id = from.id, "Dropping zero-length segment");
                continue;
            }

            let length_nm = segment.length_nm();
            if length_nm > self.config.max_segment_length_nm {
                self.stats.too_long_segments += 1;
                debug!(
                    name = %record.name,
                    from = %points[i],
                    to = %points[i + 1],
                    length_nm = length_nm,
                    "Dropping segment exceeding maximum length"
                );
                continue;
            }

            if group.insert(segment) {
                self.stats.segments_accepted += 1;
                self.writer.observe_accepted(&record.name, &segment, length_nm);
            } else {
                self.stats.duplicate_segments += 1;
            }
        }

        Ok(())
    }

    /// Build, prune and write a completed group.
    fn flush(&mut self, group: RouteGroup) -> ResolveResult<()> {
        let name = group.name().to_string();
        if group.is_empty() {
            debug!(name = %name, "No usable segments");
            return Ok(());
        }

        let fragments = ChainBuilder::new(group.into_segments()).build();
        let built = fragments.len();
        let (fragments, pruned) = prune(fragments);
        self.stats.pruned.add(pruned);

        if built != fragments.len() {
            debug!(
                name = %name,
                built = built,
                kept = fragments.len(),
                "Pruned fragments"
            );
        }

        self.writer
            .write(&name, &fragments)
            .map_err(|e| ResolveError::store("insert route rows", e))
    }

    pub fn stats(&self) -> &ResolveStats {
        &self.stats
    }

    pub fn writer_stats(&self) -> &WriterStats {
        self.writer.stats()
    }

    pub fn navaid_stats(&self) -> ResolverStats {
        self.resolver.stats()
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        self.writer.sink()
    }

    pub fn progress(&self) -> &P {
        &self.progress
    }

    /// Summary of the last run.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            schema: self.config.schema,
            aborted: self.aborted,
            max_segment_length_nm: self.config.max_segment_length_nm,
            elapsed_ms: self.elapsed.as_millis(),
            finished_at: chrono::Local::now().to_rfc3339(),
            candidates: self.stats.clone(),
            navaids: self.resolver.stats(),
            output: self.writer.stats().clone(),
        }
    }

    pub fn into_sink(self) -> S {
        self.writer.into_sink()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::geo::Pos;
    use crate::navaid::{MemoryNavaids, WaypointKind, WaypointRef};
    use crate::progress::{CancelOnFlag, CancellationToken, NoProgress};
    use crate::route::segment::{Direction, LegAttributes, RouteType};
    use crate::route::writer::MemorySink;

    /// Waypoints `P1..=P20` spaced 0.1 degrees apart along 45N.
    fn navaids() -> MemoryNavaids {
        let mut navaids = MemoryNavaids::new();
        for id in 1..=20 {
            navaids.insert(
                id,
                &format!("P{id}"),
                "ED",
                WaypointKind::Waypoint,
                Pos::new(id as f64 * 0.1, 45.0),
            );
        }
        navaids.insert(99, "FAR", "ED", WaypointKind::Waypoint, Pos::new(30.0, 45.0));
        navaids
    }

    fn pt(id: i64) -> WaypointRef {
        WaypointRef::new(format!("P{id}"), "ED", WaypointKind::Waypoint)
    }

    fn pair(name: &str, from: WaypointRef, to: WaypointRef) -> StoreResult<CandidateRecord> {
        Ok(CandidateRecord::pair(
            name,
            RouteType::Jet,
            from,
            to,
            LegAttributes::new(Direction::Both, 5000, 45000),
        ))
    }

    fn config() -> ResolverConfig {
        ResolverConfig::for_schema(RouteSchema::Airway)
            .with_batch_rows(1)
            .with_report_interval(Duration::ZERO)
    }

    fn edges(sink: &MemorySink, name: &str) -> Vec<(u32, u32, i64, i64)> {
        sink.rows
            .iter()
            .filter(|r| r.name == name)
            .map(|r| (r.fragment_no, r.sequence_no, r.from_id, r.to_id))
            .collect()
    }

    /// Reporter that aborts on the given report.
    struct AbortOnReport {
        abort_at: u64,
        reports: u64,
        credited: u64,
    }

    impl ProgressReporter for AbortOnReport {
        fn report_progress(&mut self, _message: &str, _silent: bool) -> bool {
            self.reports += 1;
            self.reports >= self.abort_at
        }

        fn increase_current(&mut self, steps: u64) {
            self.credited += steps;
        }
    }

    #[test]
    fn test_duplicate_candidates_form_one_chain() {
        let candidates = vec![
            pair("B1", pt(1), pt(2)),
            pair("B1", pt(2), pt(3)),
            pair("B1", pt(3), pt(4)),
            pair("B1", pt(2), pt(3)),
        ];

        let mut driver = ResolveDriver::new(config(), navaids(), MemorySink::new(), NoProgress);
        assert!(!driver.run(candidates, 10).unwrap());

        let sink = driver.sink();
        assert_eq!(
            edges(sink, "B1"),
            vec![(1, 1, 1, 2), (1, 2, 2, 3), (1, 3, 3, 4)]
        );
        assert_eq!(driver.stats().duplicate_segments, 1);
        assert_eq!(sink.commits, 1);
        assert_eq!(sink.committed, sink.rows);
    }

    #[test]
    fn test_disjoint_chains_become_two_fragments() {
        let candidates = vec![pair("B2", pt(5), pt(6)), pair("B2", pt(10), pt(11))];

        let mut driver = ResolveDriver::new(config(), navaids(), MemorySink::new(), NoProgress);
        driver.run(candidates, 10).unwrap();

        let mut rows = edges(driver.sink(), "B2");
        rows.sort_by_key(|r| r.2);
        assert_eq!(rows, vec![(1, 1, 5, 6), (2, 1, 10, 11)]);
        assert_eq!(driver.writer_stats().fragments, 2);
    }

    #[test]
    fn test_triple_records_build_airway() {
        let leg = LegAttributes::new(Direction::Forward, 3000, 18000);
        let candidates = vec![
            Ok(CandidateRecord::triple(
                "V7",
                RouteType::Victor,
                None,
                pt(1),
                Some((pt(2), leg)),
            )),
            Ok(CandidateRecord::triple(
                "V7",
                RouteType::Victor,
                Some((pt(1), leg)),
                pt(2),
                Some((pt(3), leg)),
            )),
        ];

        let mut driver = ResolveDriver::new(config(), navaids(), MemorySink::new(), NoProgress);
        driver.run(candidates, 10).unwrap();

        let sink = driver.sink();
        assert_eq!(edges(sink, "V7"), vec![(1, 1, 1, 2), (1, 2, 2, 3)]);
        assert!(sink.rows.iter().all(|r| r.route_type == RouteType::Victor));
        assert!(sink.rows.iter().all(|r| r.direction == Direction::Forward));
        assert_eq!(sink.rows[0].min_alt, 3000);
    }

    #[test]
    fn test_cancellation_keeps_completed_groups_only() {
        let candidates = vec![
            pair("G1", pt(1), pt(2)),
            pair("G1", pt(2), pt(3)),
            pair("G2", pt(4), pt(5)),
            pair("G3", pt(6), pt(7)),
            pair("G4", pt(8), pt(9)),
        ];
        let reporter = AbortOnReport {
            abort_at: 4,
            reports: 0,
            credited: 0,
        };

        let mut driver = ResolveDriver::new(config(), navaids(), MemorySink::new(), reporter);
        assert!(driver.run(candidates, 10).unwrap());
        assert!(driver.summary().aborted);
        assert_eq!(driver.progress().credited, 6);

        let sink = driver.sink();
        let names: Vec<_> = sink.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["G1", "G1", "G2"]);
        assert!(sink.in_transaction);
        assert_eq!(sink.commits, 0);
        assert!(sink.committed.is_empty());
    }

    #[test]
    fn test_rollback_after_cancel_restores_previous_rows() {
        let mut driver = ResolveDriver::new(config(), navaids(), MemorySink::new(), NoProgress);
        driver.run(vec![pair("J1", pt(1), pt(2))], 10).unwrap();
        let sink = driver.into_sink();

        let token = CancellationToken::new();
        token.cancel();
        let mut driver =
            ResolveDriver::new(config(), navaids(), sink, CancelOnFlag::new(token));
        assert!(driver.run(vec![pair("J2", pt(3), pt(4))], 10).unwrap());
        assert!(driver.sink().rows.is_empty());
        assert_eq!(driver.progress().current(), 10);

        let mut sink = driver.into_sink();
        sink.rollback();
        assert_eq!(edges(&sink, "J1"), vec![(1, 1, 1, 2)]);
    }

    #[test]
    fn test_long_segments_are_dropped() {
        let far = WaypointRef::new("FAR", "ED", WaypointKind::Waypoint);
        let candidates = vec![
            pair("J9", pt(1), pt(2)),
            pair("J9", pt(2), far),
        ];

        let mut driver = ResolveDriver::new(
            config().with_max_segment_length_nm(500.0),
            navaids(),
            MemorySink::new(),
            NoProgress,
        );
        driver.run(candidates, 10).unwrap();

        assert_eq!(edges(driver.sink(), "J9"), vec![(1, 1, 1, 2)]);
        assert_eq!(driver.stats().too_long_segments, 1);
        let longest = driver.writer_stats().longest_segment.clone().unwrap();
        assert!(longest.length_nm < 500.0);
    }

    #[test]
    fn test_unresolved_and_degenerate_segments_are_dropped() {
        let unknown = WaypointRef::new("NOPE", "ED", WaypointKind::Vor);
        let candidates = vec![
            pair("J5", pt(1), unknown),
            pair("J5", pt(2), pt(2)),
            pair("J5", pt(2), pt(3)),
        ];

        let mut driver = ResolveDriver::new(config(), navaids(), MemorySink::new(), NoProgress);
        driver.run(candidates, 10).unwrap();

        assert_eq!(edges(driver.sink(), "J5"), vec![(1, 1, 2, 3)]);
        let stats = driver.stats();
        assert_eq!(stats.unresolved_segments, 1);
        assert_eq!(stats.degenerate_segments, 1);
        assert_eq!(stats.segments_accepted, 1);
        assert_eq!(driver.navaid_stats().not_found, 1);
    }

    #[test]
    fn test_group_without_segments_writes_nothing() {
        let unknown = WaypointRef::new("NOPE", "ED", WaypointKind::Ndb);
        let candidates = vec![pair("A1", pt(1), unknown), pair("A2", pt(1), pt(2))];

        let mut driver = ResolveDriver::new(config(), navaids(), MemorySink::new(), NoProgress);
        driver.run(candidates, 10).unwrap();

        assert!(edges(driver.sink(), "A1").is_empty());
        assert_eq!(driver.sink().rows[0].id, 1);
        assert_eq!(driver.stats().groups_read, 2);
        assert_eq!(driver.writer_stats().groups, 1);
    }

    #[test]
    fn test_rerun_replaces_rows() {
        let candidates = || {
            vec![
                pair("B1", pt(1), pt(2)),
                pair("B1", pt(2), pt(3)),
                pair("B2", pt(7), pt(8)),
            ]
        };

        let mut driver = ResolveDriver::new(config(), navaids(), MemorySink::new(), NoProgress);
        driver.run(candidates(), 10).unwrap();
        let first = driver.sink().rows.clone();
        let sink = driver.into_sink();

        let mut driver = ResolveDriver::new(config(), navaids(), sink, NoProgress);
        driver.run(candidates(), 10).unwrap();

        assert_eq!(driver.stats().deleted_rows, 3);
        assert_eq!(driver.sink().rows, first);
    }

    #[test]
    fn test_reappearing_name_is_rejected() {
        let candidates = vec![
            pair("B1", pt(1), pt(2)),
            pair("B2", pt(3), pt(4)),
            pair("B1", pt(5), pt(6)),
            pair("B1", pt(1), pt(2)),
        ];

        let mut driver = ResolveDriver::new(config(), navaids(), MemorySink::new(), NoProgress);
        let err = driver.run(candidates, 10).unwrap_err();
        assert!(matches!(err, ResolveError::UngroupedInput { ref name } if name == "B1"));

        // Nothing of the second B1 block reaches the sink and nothing is committed
        let sink = driver.sink();
        assert_eq!(edges(sink, "B1"), vec![(1, 1, 1, 2)]);
        assert!(sink.in_transaction);
        assert_eq!(sink.commits, 0);

        let mut sink = driver.into_sink();
        sink.rollback();
        assert!(sink.rows.is_empty());
    }

    #[test]
    fn test_defective_legs_are_dropped() {
        let leg = LegAttributes::default();
        let candidates = vec![
            pair("J4", pt(1), pt(2)),
            Ok(CandidateRecord::triple(
                "J4",
                RouteType::Jet,
                Some((pt(1), leg)),
                pt(2),
                Some((pt(3), leg)),
            )
            .with_leg_defect(1, "invalid value \"Z\" in column direction")),
            Ok(CandidateRecord::pair("J4", RouteType::Jet, pt(3), pt(4), leg)
                .with_defect("invalid value \"Q\" in column route type")),
            pair("J4", WaypointRef::with_unknown_kind("P4", "ED"), pt(5)),
            pair("J4", pt(5), pt(6)),
        ];

        let mut driver = ResolveDriver::new(config(), navaids(), MemorySink::new(), NoProgress);
        assert!(!driver.run(candidates, 10).unwrap());

        let mut rows = edges(driver.sink(), "J4");
        rows.sort_by_key(|r| r.2);
        assert_eq!(rows, vec![(1, 1, 1, 2), (2, 1, 5, 6)]);

        let stats = driver.stats();
        assert_eq!(stats.invalid_segments, 2);
        assert_eq!(stats.unresolved_segments, 1);
        assert_eq!(stats.duplicate_segments, 1);
        assert_eq!(driver.navaid_stats().invalid, 1);
        assert_eq!(driver.sink().commits, 1);
    }

    #[test]
    fn test_longest_segment_counts_pruned_fragments() {
        // 1→3 forms its own fragment, contained in 1→2→3 and pruned
        let candidates = vec![
            pair("V1", pt(1), pt(2)),
            pair("V1", pt(2), pt(3)),
            pair("V1", pt(1), pt(3)),
        ];

        let mut driver = ResolveDriver::new(config(), navaids(), MemorySink::new(), NoProgress);
        driver.run(candidates, 10).unwrap();

        assert_eq!(edges(driver.sink(), "V1"), vec![(1, 1, 1, 2), (1, 2, 2, 3)]);
        assert_eq!(driver.stats().pruned.contained, 1);

        let longest = driver.writer_stats().longest_segment.clone().unwrap();
        assert_eq!((longest.from_id, longest.to_id), (1, 3));
    }

    #[test]
    fn test_source_error_stops_run() {
        let candidates = vec![
            pair("B1", pt(1), pt(2)),
            Err(crate::error::StoreError::invalid_code("route_type", "X")),
        ];

        let mut driver = ResolveDriver::new(config(), navaids(), MemorySink::new(), NoProgress);
        let err = driver.run(candidates, 10).unwrap_err();
        assert!(err.to_string().contains("read candidates"));
        assert_eq!(driver.sink().commits, 0);
    }

    #[test]
    fn test_summary_serializes() {
        let mut driver = ResolveDriver::new(config(), navaids(), MemorySink::new(), NoProgress);
        driver.run(vec![pair("B1", pt(1), pt(2))], 10).unwrap();

        let json = serde_json::to_value(driver.summary()).unwrap();
        assert_eq!(json["aborted"], false);
        assert_eq!(json["output"]["rows"], 1);
        assert_eq!(json["candidates"]["records"], 1);
    }
}
