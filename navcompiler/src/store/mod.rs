//! SQLite bindings for the resolver.
//!
//! One [`SqliteStore`] owns the connection. The navaid lookup, the candidate
//! query and the route sink all borrow it, so a run reads staging rows,
//! resolves waypoints and writes output rows on the same connection inside
//! a single transaction.

mod candidates;
mod navaids;
mod schema;
mod sink;

pub use candidates::CandidateQuery;
pub use navaids::SqliteNavaids;
pub use schema::create_schema;
pub use sink::SqliteRouteSink;

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ResolveError, ResolveResult, StoreResult};
use crate::progress::ProgressReporter;
use crate::route::{ResolveDriver, ResolverConfig, RouteSchema, RunSummary};

/// Row counts of one output table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub rows: u64,
    pub routes: u64,
    pub fragments: u64,
}

/// Navigation database connection.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create a database file.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "Opened navigation database");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Create a private in-memory database.
    pub fn in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create missing tables.
    pub fn create_schema(&self) -> StoreResult<()> {
        create_schema(&self.conn)
    }

    /// Whether a transaction is open on the connection.
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Roll back an open transaction; does nothing otherwise.
    pub fn rollback(&self) -> StoreResult<()> {
        if self.in_transaction() {
            self.conn.execute_batch("ROLLBACK")?;
            info!("Rolled back open transaction");
        }
        Ok(())
    }

    /// Commit an open transaction; does nothing otherwise.
    pub fn commit(&self) -> StoreResult<()> {
        if self.in_transaction() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    pub fn navaids(&self) -> SqliteNavaids<'_> {
        SqliteNavaids::new(&self.conn)
    }

    pub fn route_sink(&self, schema: RouteSchema) -> SqliteRouteSink<'_> {
        SqliteRouteSink::new(&self.conn, schema)
    }

    pub fn candidates(&self, schema: RouteSchema) -> StoreResult<CandidateQuery<'_>> {
        CandidateQuery::prepare(&self.conn, schema)
    }

    /// Row, route and fragment counts of the schema's output table.
    pub fn table_stats(&self, schema: RouteSchema) -> StoreResult<TableStats> {
        let sql = format!(
            "SELECT COUNT(*), COUNT(DISTINCT name), \
             COUNT(DISTINCT name || '/' || fragment_no) FROM {}",
            schema.output_table()
        );
        let stats = self.conn.query_row(&sql, [], |row| {
            Ok(TableStats {
                rows: row.get::<_, i64>(0)? as u64,
                routes: row.get::<_, i64>(1)? as u64,
                fragments: row.get::<_, i64>(2)? as u64,
            })
        })?;
        Ok(stats)
    }

    /// Rebuild one schema's output table from its staging table.
    ///
    /// On cancellation the returned summary has `aborted` set and the
    /// transaction is still open; call [`rollback`](Self::rollback) to
    /// discard it or [`commit`](Self::commit) to keep the groups written so
    /// far.
    pub fn resolve<P: ProgressReporter>(
        &self,
        config: ResolverConfig,
        progress: P,
        max_report_steps: u64,
    ) -> ResolveResult<RunSummary> {
        let schema = config.schema;
        let mut query = self
            .candidates(schema)
            .map_err(|e| ResolveError::store("prepare candidate query", e))?;
        let records = query
            .records()
            .map_err(|e| ResolveError::store("read candidates", e))?;

        let mut driver =
            ResolveDriver::new(config, self.navaids(), self.route_sink(schema), progress);
        driver.run(records, max_report_steps)?;
        Ok(driver.summary())
    }
}
