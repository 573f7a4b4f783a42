//! Route rows into the `airway` / `direct_route` tables.

use rusqlite::{params, Connection};

use crate::error::StoreResult;
use crate::route::{RouteRow, RouteSchema, RouteSink};

/// [`RouteSink`] writing one schema's output table.
///
/// Transactions are issued as plain `BEGIN`/`COMMIT` on the borrowed
/// connection so the same connection can keep reading candidates and
/// navaids while rows are written.
#[derive(Debug)]
pub struct SqliteRouteSink<'c> {
    conn: &'c Connection,
    schema: RouteSchema,
    insert_sql: String,
}

impl<'c> SqliteRouteSink<'c> {
    pub fn new(conn: &'c Connection, schema: RouteSchema) -> Self {
        let table = schema.output_table();
        let insert_sql = format!(
            "INSERT INTO {table} ({table}_id, name, type, fragment_no, sequence_no, \
             from_waypoint_id, to_waypoint_id, direction, minimum_altitude, maximum_altitude, \
             left_lonx, top_laty, right_lonx, bottom_laty, \
             from_lonx, from_laty, to_lonx, to_laty) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
        );
        Self {
            conn,
            schema,
            insert_sql,
        }
    }

    pub fn schema(&self) -> RouteSchema {
        self.schema
    }
}

impl RouteSink for SqliteRouteSink<'_> {
    fn begin(&mut self) -> StoreResult<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn delete_all(&mut self) -> StoreResult<u64> {
        let deleted = self
            .conn
            .execute(&format!("DELETE FROM {}", self.schema.output_table()), [])?;
        Ok(deleted as u64)
    }

    fn insert(&mut self, row: &RouteRow) -> StoreResult<()> {
        let mut stmt = self.conn.prepare_cached(&self.insert_sql)?;
        stmt.execute(params![
            row.id,
            row.name,
            row.route_type.code(),
            row.fragment_no,
            row.sequence_no,
            row.from_id,
            row.to_id,
            row.direction.code(),
            row.min_alt,
            row.max_alt,
            row.bbox.left,
            row.bbox.top,
            row.bbox.right,
            row.bbox.bottom,
            row.from_lon,
            row.from_lat,
            row.to_lon,
            row.to_lat,
        ])?;
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }
}
