//! Integration tests for resolver runs against SQLite.
//!
//! These tests fill the waypoint and staging tables of an in-memory database,
//! run the resolver through [`SqliteStore::resolve`] and check the rows of the
//! output tables.
//!
//! Run with: `cargo test --test resolve_integration`

use std::collections::BTreeSet;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rusqlite::{params, Connection};

use navcompiler::progress::{CancelOnFlag, CancellationToken, NoProgress, ProgressReporter};
use navcompiler::route::{ResolverConfig, RouteSchema};
use navcompiler::store::SqliteStore;

// ============================================================================
// Helper Functions
// ============================================================================

/// One output row: name, fragment, sequence, from id, to id.
type Row = (String, i64, i64, i64, i64);

/// Store with waypoints `P1..=P40` spaced 0.1 degrees apart along 45N.
///
/// Extra points:
/// - `DUP` twice in region ED: id 100 far east, id 101 next to `P4`
/// - `FAR` 60 degrees east, beyond the default direct route limit
fn setup() -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    store.create_schema().unwrap();

    let conn = store.connection();
    for id in 1..=40 {
        insert_waypoint(conn, id, &format!("P{id}"), id as f64 * 0.1, 45.0);
    }
    insert_waypoint(conn, 100, "DUP", 20.0, 45.0);
    insert_waypoint(conn, 101, "DUP", 0.45, 45.1);
    insert_waypoint(conn, 102, "FAR", 60.0, 45.0);
    store
}

fn insert_waypoint(conn: &Connection, id: i64, ident: &str, lon: f64, lat: f64) {
    conn.execute(
        "INSERT INTO waypoint (waypoint_id, ident, region, type, lonx, laty) \
         VALUES (?1, ?2, 'ED', 'W', ?3, ?4)",
        params![id, ident, lon, lat],
    )
    .unwrap();
}

/// Stage an airway point with optional neighbours.
fn insert_airway(
    conn: &Connection,
    name: &str,
    previous: Option<&str>,
    mid: &str,
    next: Option<&str>,
) {
    let region = |p: Option<&str>| p.map(|_| "ED");
    let kind = |p: Option<&str>| p.map(|_| "W");
    conn.execute(
        "INSERT INTO tmp_airway_point (name, type, mid_ident, mid_region, mid_type, \
             previous_ident, previous_region, previous_type, previous_direction, \
             previous_minimum_altitude, previous_maximum_altitude, \
             next_ident, next_region, next_type, next_direction, \
             next_minimum_altitude, next_maximum_altitude) \
         VALUES (?1, 'J', ?2, 'ED', 'W', ?3, ?4, ?5, 'N', 18000, 45000, \
                 ?6, ?7, ?8, 'N', 18000, 45000)",
        params![
            name,
            mid,
            previous,
            region(previous),
            kind(previous),
            next,
            region(next),
            kind(next)
        ],
    )
    .unwrap();
}

/// Stage a direct route leg.
fn insert_direct(conn: &Connection, name: &str, from: &str, to: &str) {
    conn.execute(
        "INSERT INTO tmp_direct_route (name, from_ident, from_region, from_type, \
             to_ident, to_region, to_type, direction) \
         VALUES (?1, ?2, 'ED', 'W', ?3, 'ED', 'W', 'F')",
        params![name, from, to],
    )
    .unwrap();
}

/// Output rows of a table in id order.
fn rows(conn: &Connection, schema: RouteSchema) -> Vec<Row> {
    let sql = format!(
        "SELECT name, fragment_no, sequence_no, from_waypoint_id, to_waypoint_id \
         FROM {table} ORDER BY {table}_id",
        table = schema.output_table()
    );
    let mut stmt = conn.prepare(&sql).unwrap();
    stmt.query_map([], |r| {
        Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?))
    })
    .unwrap()
    .collect::<Result<_, _>>()
    .unwrap()
}

fn ids(conn: &Connection, schema: RouteSchema) -> Vec<i64> {
    let sql = format!(
        "SELECT {table}_id FROM {table} ORDER BY {table}_id",
        table = schema.output_table()
    );
    let mut stmt = conn.prepare(&sql).unwrap();
    stmt.query_map([], |r| r.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

fn config(schema: RouteSchema) -> ResolverConfig {
    ResolverConfig::for_schema(schema)
        .with_batch_rows(1)
        .with_report_interval(Duration::ZERO)
}

fn run(store: &SqliteStore, schema: RouteSchema) {
    let summary = store.resolve(config(schema), NoProgress, 100).unwrap();
    assert!(!summary.aborted);
}

/// Reporter that aborts on the given report.
struct AbortOnReport {
    abort_at: u64,
    reports: u64,
}

impl ProgressReporter for AbortOnReport {
    fn report_progress(&mut self, _message: &str, _silent: bool) -> bool {
        self.reports += 1;
        self.reports >= self.abort_at
    }

    fn increase_current(&mut self, _steps: u64) {}
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Overlapping airway triples collapse into one ordered fragment.
#[test]
fn test_airway_triples_form_single_fragment() {
    let store = setup();
    let conn = store.connection();
    insert_airway(conn, "B1", None, "P1", Some("P2"));
    insert_airway(conn, "B1", Some("P1"), "P2", Some("P3"));
    insert_airway(conn, "B1", Some("P2"), "P3", Some("P4"));
    insert_airway(conn, "B1", Some("P3"), "P4", None);

    run(&store, RouteSchema::Airway);

    assert_eq!(
        rows(conn, RouteSchema::Airway),
        vec![
            ("B1".to_string(), 1, 1, 1, 2),
            ("B1".to_string(), 1, 2, 2, 3),
            ("B1".to_string(), 1, 3, 3, 4),
        ]
    );
    assert!(!store.in_transaction());
}

/// Disjoint direct route legs of one name become separate fragments.
#[test]
fn test_disjoint_direct_routes() {
    let store = setup();
    let conn = store.connection();
    insert_direct(conn, "B2", "P5", "P6");
    insert_direct(conn, "B2", "P20", "P21");

    run(&store, RouteSchema::DirectRoute);

    let mut result = rows(conn, RouteSchema::DirectRoute);
    result.sort_by_key(|r| r.3);
    let fragments: BTreeSet<_> = result.iter().map(|r| r.1).collect();
    assert_eq!(fragments, BTreeSet::from([1, 2]));
    assert_eq!(result[0].3..=result[0].4, 5..=6);
    assert_eq!(result[1].3..=result[1].4, 20..=21);
    assert!(result.iter().all(|r| r.2 == 1));
}

/// The previous point's position picks the nearer of two equal idents.
#[test]
fn test_bias_resolves_ambiguous_ident() {
    let store = setup();
    let conn = store.connection();
    insert_airway(conn, "T9", Some("P4"), "DUP", Some("P5"));

    run(&store, RouteSchema::Airway);

    let result = rows(conn, RouteSchema::Airway);
    assert_eq!(
        result,
        vec![
            ("T9".to_string(), 1, 1, 4, 101),
            ("T9".to_string(), 1, 2, 101, 5),
        ]
    );
}

/// Segments over the length limit never reach the output.
#[test]
fn test_length_filter() {
    let store = setup();
    let conn = store.connection();
    insert_direct(conn, "D1", "P1", "P2");
    insert_direct(conn, "D1", "P2", "FAR");
    insert_direct(conn, "D1", "FAR", "P3");

    let summary = store
        .resolve(config(RouteSchema::DirectRoute), NoProgress, 100)
        .unwrap();

    assert_eq!(
        rows(conn, RouteSchema::DirectRoute),
        vec![("D1".to_string(), 1, 1, 1, 2)]
    );
    assert_eq!(summary.candidates.too_long_segments, 2);
    let longest = summary.output.longest_segment.unwrap();
    assert!(longest.length_nm < 2000.0);
}

/// Cancelling keeps completed groups in the open transaction only.
#[test]
fn test_cancellation_and_rollback() {
    let store = setup();
    let conn = store.connection();
    insert_direct(conn, "A1", "P1", "P2");
    run(&store, RouteSchema::DirectRoute);
    let before = rows(conn, RouteSchema::DirectRoute);

    insert_direct(conn, "A2", "P3", "P4");
    insert_direct(conn, "A3", "P5", "P6");
    insert_direct(conn, "A4", "P7", "P8");

    // Reports come after A1, A2, A3; the third aborts with A3 read but unwritten.
    let reporter = AbortOnReport {
        abort_at: 3,
        reports: 0,
    };
    let summary = store
        .resolve(config(RouteSchema::DirectRoute), reporter, 100)
        .unwrap();

    assert!(summary.aborted);
    assert!(store.in_transaction());
    let names: Vec<_> = rows(conn, RouteSchema::DirectRoute)
        .into_iter()
        .map(|r| r.0)
        .collect();
    assert_eq!(names, vec!["A1", "A2"]);

    store.rollback().unwrap();
    assert!(!store.in_transaction());
    assert_eq!(rows(conn, RouteSchema::DirectRoute), before);
}

/// A token cancelled before the run aborts at the first report.
#[test]
fn test_cancel_token_aborts_run() {
    let store = setup();
    insert_airway(store.connection(), "B1", Some("P1"), "P2", Some("P3"));

    let token = CancellationToken::new();
    token.cancel();
    let summary = store
        .resolve(config(RouteSchema::Airway), CancelOnFlag::new(token), 100)
        .unwrap();

    assert!(summary.aborted);
    store.rollback().unwrap();
    assert!(rows(store.connection(), RouteSchema::Airway).is_empty());
}

/// Running twice yields the same rows and ids.
#[test]
fn test_rerun_is_idempotent() {
    let store = setup();
    let conn = store.connection();
    insert_airway(conn, "B1", None, "P1", Some("P2"));
    insert_airway(conn, "B1", Some("P1"), "P2", Some("P3"));
    insert_airway(conn, "J3", Some("P10"), "P11", Some("P12"));
    insert_airway(conn, "J3", Some("P20"), "P21", None);

    run(&store, RouteSchema::Airway);
    let first = rows(conn, RouteSchema::Airway);
    let first_ids = ids(conn, RouteSchema::Airway);

    run(&store, RouteSchema::Airway);
    assert_eq!(rows(conn, RouteSchema::Airway), first);
    assert_eq!(ids(conn, RouteSchema::Airway), first_ids);
}

/// Staging order does not change the resolved chains.
#[test]
fn test_staging_order_does_not_matter() {
    let legs: Vec<(&str, String, String)> = ["V1", "V2", "V3"]
        .iter()
        .enumerate()
        .flat_map(|(route, name)| {
            let start = route as i64 * 10 + 1;
            (start..start + 6).map(move |id| (*name, format!("P{id}"), format!("P{}", id + 1)))
        })
        .collect();

    let resolve = |legs: &[(&str, String, String)]| {
        let store = setup();
        for (name, from, to) in legs {
            insert_direct(store.connection(), name, from, to);
        }
        run(&store, RouteSchema::DirectRoute);
        rows(store.connection(), RouteSchema::DirectRoute)
    };

    let expected = resolve(&legs);
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..5 {
        let mut shuffled = legs.clone();
        shuffled.shuffle(&mut rng);
        assert_eq!(resolve(&shuffled), expected);
    }
}

/// Random leg sets keep fragments connected and ids dense.
#[test]
fn test_random_legs_produce_connected_fragments() {
    let mut rng = StdRng::seed_from_u64(42);
    let store = setup();
    let conn = store.connection();

    for route in 0..8 {
        let name = format!("R{route}");
        for _ in 0..rng.random_range(1..25) {
            let from = rng.random_range(1..=40);
            let to = rng.random_range(1..=40);
            insert_direct(conn, &name, &format!("P{from}"), &format!("P{to}"));
        }
    }

    run(&store, RouteSchema::DirectRoute);
    let result = rows(conn, RouteSchema::DirectRoute);

    let expected_ids: Vec<i64> = (1..=result.len() as i64).collect();
    assert_eq!(ids(conn, RouteSchema::DirectRoute), expected_ids);

    for pair in result.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.0 == b.0 && a.1 == b.1 {
            assert_eq!(b.2, a.2 + 1, "sequence gap in {a:?} -> {b:?}");
            assert_eq!(a.4, b.3, "fragment not connected at {a:?} -> {b:?}");
        } else {
            assert_eq!(b.2, 1, "fragment does not start at 1: {b:?}");
        }
    }
    assert!(result.iter().all(|r| r.3 != r.4));
}

/// Each schema has its own table and id counter.
#[test]
fn test_schemas_are_independent() {
    let store = setup();
    let conn = store.connection();
    insert_airway(conn, "B1", Some("P1"), "P2", Some("P3"));
    insert_direct(conn, "D1", "P7", "P8");

    run(&store, RouteSchema::Airway);
    run(&store, RouteSchema::DirectRoute);

    assert_eq!(ids(conn, RouteSchema::Airway), vec![1, 2]);
    assert_eq!(ids(conn, RouteSchema::DirectRoute), vec![1]);

    let airway = store.table_stats(RouteSchema::Airway).unwrap();
    assert_eq!((airway.rows, airway.routes, airway.fragments), (2, 1, 1));
}

/// A staging row with undecodable codes loses only its own segment.
#[test]
fn test_undecodable_row_does_not_stop_run() {
    let store = setup();
    let conn = store.connection();
    insert_direct(conn, "A1", "P1", "P2");
    conn.execute_batch(
        "INSERT INTO tmp_direct_route (name, from_ident, from_region, from_type, \
             to_ident, to_region, to_type, direction) \
         VALUES ('A2', 'P3', 'ED', 'W', 'P4', 'ED', 'X', 'F'); \
         INSERT INTO tmp_direct_route (name, from_ident, from_region, from_type, \
             to_ident, to_region, to_type, direction) \
         VALUES ('A2', 'P4', 'ED', 'W', 'P5', 'ED', 'W', 'Q');",
    )
    .unwrap();
    insert_direct(conn, "A3", "P6", "P7");

    let summary = store
        .resolve(config(RouteSchema::DirectRoute), NoProgress, 100)
        .unwrap();

    assert!(!summary.aborted);
    assert_eq!(
        rows(conn, RouteSchema::DirectRoute),
        vec![
            ("A1".to_string(), 1, 1, 1, 2),
            ("A3".to_string(), 1, 1, 6, 7),
        ]
    );
    assert_eq!(summary.candidates.unresolved_segments, 1);
    assert_eq!(summary.candidates.invalid_segments, 1);
    assert_eq!(summary.navaids.invalid, 1);
    assert!(!store.in_transaction());
}
