//! Tables read and written by the resolver.
//!
//! Only what a standalone run needs: the waypoint table used for lookups,
//! the two candidate staging tables the format readers fill, and the two
//! output tables. Both output tables share one column layout.

use rusqlite::Connection;

use crate::error::StoreResult;
use crate::route::RouteSchema;

const WAYPOINT_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS waypoint (
        waypoint_id INTEGER PRIMARY KEY,
        ident TEXT NOT NULL,
        region TEXT,
        type TEXT NOT NULL,          -- W, V or N
        lonx REAL NOT NULL,
        laty REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_waypoint_ident_type ON waypoint (ident, type);
"#;

const STAGING_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS tmp_airway_point (
        tmp_airway_point_id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        type TEXT NOT NULL,          -- V, J or B
        mid_ident TEXT NOT NULL,
        mid_region TEXT,
        mid_type TEXT NOT NULL,
        previous_ident TEXT,
        previous_region TEXT,
        previous_type TEXT,
        previous_direction TEXT,
        previous_minimum_altitude INTEGER,
        previous_maximum_altitude INTEGER,
        next_ident TEXT,
        next_region TEXT,
        next_type TEXT,
        next_direction TEXT,
        next_minimum_altitude INTEGER,
        next_maximum_altitude INTEGER
    );
    CREATE INDEX IF NOT EXISTS idx_tmp_airway_point_name ON tmp_airway_point (name);

    CREATE TABLE IF NOT EXISTS tmp_direct_route (
        tmp_direct_route_id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        type TEXT,                   -- defaults to D
        from_ident TEXT NOT NULL,
        from_region TEXT,
        from_type TEXT NOT NULL,
        to_ident TEXT NOT NULL,
        to_region TEXT,
        to_type TEXT NOT NULL,
        direction TEXT,
        minimum_altitude INTEGER,
        maximum_altitude INTEGER
    );
    CREATE INDEX IF NOT EXISTS idx_tmp_direct_route_name ON tmp_direct_route (name);
"#;

/// DDL of one output table.
fn output_ddl(schema: RouteSchema) -> String {
    let table = schema.output_table();
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            {table}_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            fragment_no INTEGER NOT NULL,
            sequence_no INTEGER NOT NULL,
            from_waypoint_id INTEGER NOT NULL,
            to_waypoint_id INTEGER NOT NULL,
            direction TEXT NOT NULL,     -- N, F or B
            minimum_altitude INTEGER NOT NULL,
            maximum_altitude INTEGER NOT NULL,
            left_lonx REAL NOT NULL,
            top_laty REAL NOT NULL,
            right_lonx REAL NOT NULL,
            bottom_laty REAL NOT NULL,
            from_lonx REAL NOT NULL,
            from_laty REAL NOT NULL,
            to_lonx REAL NOT NULL,
            to_laty REAL NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_name ON {table} (name, fragment_no, sequence_no);
        "#
    )
}

/// Create all tables that do not exist yet.
pub fn create_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(WAYPOINT_DDL)?;
    conn.execute_batch(STAGING_DDL)?;
    for schema in RouteSchema::ALL {
        conn.execute_batch(&output_ddl(schema))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_create_schema_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        create_schema(&conn).unwrap();

        assert_eq!(
            tables(&conn),
            vec![
                "airway",
                "direct_route",
                "tmp_airway_point",
                "tmp_direct_route",
                "waypoint"
            ]
        );
    }
}
