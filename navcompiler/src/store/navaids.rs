//! Navaid lookup against the `waypoint` table.

use rusqlite::{params, Connection};

use crate::error::StoreResult;
use crate::geo::Pos;
use crate::navaid::{NavaidCandidate, NavaidLookup, WaypointKind};

/// An empty region matches every region.
const LOOKUP_SQL: &str = "SELECT waypoint_id, lonx, laty FROM waypoint \
     WHERE ident = ?1 AND type = ?2 AND (?3 = '' OR region = ?3) \
     ORDER BY waypoint_id";

/// [`NavaidLookup`] over a borrowed connection.
#[derive(Debug, Clone, Copy)]
pub struct SqliteNavaids<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteNavaids<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl NavaidLookup for SqliteNavaids<'_> {
    fn lookup(
        &self,
        ident: &str,
        region: &str,
        kind: WaypointKind,
    ) -> StoreResult<Vec<NavaidCandidate>> {
        let mut stmt = self.conn.prepare_cached(LOOKUP_SQL)?;
        let candidates = stmt
            .query_map(params![ident, kind.code(), region], |row| {
                Ok(NavaidCandidate::new(
                    row.get(0)?,
                    Pos::new(row.get(1)?, row.get(2)?),
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(candidates)
    }
}
