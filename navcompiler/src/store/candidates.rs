//! Candidate stream from the staging tables.

use rusqlite::{Connection, Row, Statement};

use crate::error::{StoreError, StoreResult};
use crate::navaid::{WaypointKind, WaypointRef};
use crate::route::{CandidateRecord, Direction, LegAttributes, RouteSchema, RouteType};

const AIRWAY_COLUMNS: &str = "name, type, \
     mid_ident, mid_region, mid_type, \
     previous_ident, previous_region, previous_type, previous_direction, \
     previous_minimum_altitude, previous_maximum_altitude, \
     next_ident, next_region, next_type, next_direction, \
     next_minimum_altitude, next_maximum_altitude";

const DIRECT_COLUMNS: &str = "name, type, \
     from_ident, from_region, from_type, \
     to_ident, to_region, to_type, \
     direction, minimum_altitude, maximum_altitude";

type DecodeFn = fn(&Row<'_>) -> rusqlite::Result<CandidateRecord>;

/// Prepared query over the staging table of one schema.
///
/// Rows come out grouped by route name, in insertion order within a name.
pub struct CandidateQuery<'c> {
    stmt: Statement<'c>,
    schema: RouteSchema,
}

impl<'c> CandidateQuery<'c> {
    pub fn prepare(conn: &'c Connection, schema: RouteSchema) -> StoreResult<Self> {
        let columns = match schema {
            RouteSchema::Airway => AIRWAY_COLUMNS,
            RouteSchema::DirectRoute => DIRECT_COLUMNS,
        };
        let table = schema.candidate_table();
        let sql = format!("SELECT {columns} FROM {table} ORDER BY name, {table}_id");
        Ok(Self {
            stmt: conn.prepare(&sql)?,
            schema,
        })
    }

    pub fn schema(&self) -> RouteSchema {
        self.schema
    }

    /// Execute the query. Rows are decoded lazily.
    ///
    /// Only SQLite failures are errors. Undecodable codes end up in the
    /// record: an unknown waypoint type or a blank ident as a point that never
    /// resolves, an unknown direction or route type as a leg defect.
    pub fn records(
        &mut self,
    ) -> StoreResult<impl Iterator<Item = StoreResult<CandidateRecord>> + '_> {
        let decode: DecodeFn = match self.schema {
            RouteSchema::Airway => decode_airway,
            RouteSchema::DirectRoute => decode_direct,
        };
        let rows = self.stmt.query_map([], decode)?;
        Ok(rows.map(|row| row.map_err(StoreError::from)))
    }
}

/// Waypoint columns as stored.
struct RawWaypoint {
    ident: String,
    region: Option<String>,
    kind: Option<String>,
}

impl RawWaypoint {
    fn read(row: &Row<'_>, first: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            ident: row.get::<_, Option<String>>(first)?.unwrap_or_default(),
            region: row.get(first + 1)?,
            kind: row.get(first + 2)?,
        })
    }

    /// Neighbour columns; a blank ident means there is no neighbour.
    fn read_neighbour(row: &Row<'_>, first: usize) -> rusqlite::Result<Option<Self>> {
        let waypoint = Self::read(row, first)?;
        Ok((!waypoint.ident.trim().is_empty()).then_some(waypoint))
    }

    fn into_ref(self) -> WaypointRef {
        let ident = self.ident.trim();
        let region = self.region.unwrap_or_default();
        match WaypointKind::from_code(self.kind.as_deref().unwrap_or_default()) {
            Ok(kind) => WaypointRef::new(ident, region.trim(), kind),
            Err(_) => WaypointRef::with_unknown_kind(ident, region.trim()),
        }
    }
}

/// Leg columns as stored.
struct RawLeg {
    direction: Option<String>,
    min_alt: Option<i32>,
    max_alt: Option<i32>,
}

impl RawLeg {
    fn read(row: &Row<'_>, first: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            direction: row.get(first)?,
            min_alt: row.get(first + 1)?,
            max_alt: row.get(first + 2)?,
        })
    }

    /// Decoded attributes, plus the reason when the direction is unknown.
    fn into_leg(self) -> (LegAttributes, Option<String>) {
        let (direction, defect) =
            match Direction::from_code(self.direction.as_deref().unwrap_or_default()) {
                Ok(direction) => (direction, None),
                Err(e) => (Direction::Both, Some(e.to_string())),
            };
        let leg = LegAttributes::new(
            direction,
            self.min_alt.unwrap_or_default(),
            self.max_alt.unwrap_or_default(),
        );
        (leg, defect)
    }
}

fn decode_airway(row: &Row<'_>) -> rusqlite::Result<CandidateRecord> {
    let name: String = row.get(0)?;
    let route_type: Option<String> = row.get(1)?;
    let mid = RawWaypoint::read(row, 2)?;
    let previous = match RawWaypoint::read_neighbour(row, 5)? {
        Some(waypoint) => Some((waypoint, RawLeg::read(row, 8)?)),
        None => None,
    };
    let next = match RawWaypoint::read_neighbour(row, 11)? {
        Some(waypoint) => Some((waypoint, RawLeg::read(row, 14)?)),
        None => None,
    };

    Ok(airway_record(
        name,
        route_type.as_deref().unwrap_or_default(),
        mid,
        previous,
        next,
    ))
}

fn airway_record(
    name: String,
    route_type: &str,
    mid: RawWaypoint,
    previous: Option<(RawWaypoint, RawLeg)>,
    next: Option<(RawWaypoint, RawLeg)>,
) -> CandidateRecord {
    let mut defects = Vec::with_capacity(2);
    let mut neighbour = |(waypoint, leg): (RawWaypoint, RawLeg)| {
        let (leg, defect) = leg.into_leg();
        defects.push(defect);
        (waypoint.into_ref(), leg)
    };
    let previous = previous.map(&mut neighbour);
    let next = next.map(&mut neighbour);

    let decoded_type = RouteType::from_code(route_type);
    let mut record = CandidateRecord::triple(
        name,
        decoded_type.as_ref().copied().unwrap_or(RouteType::Both),
        previous,
        mid.into_ref(),
        next,
    );
    for (i, defect) in defects.into_iter().enumerate() {
        if let Some(defect) = defect {
            record = record.with_leg_defect(i, defect);
        }
    }
    match decoded_type {
        Ok(_) => record,
        Err(e) => record.with_defect(e.to_string()),
    }
}

fn decode_direct(row: &Row<'_>) -> rusqlite::Result<CandidateRecord> {
    let name: String = row.get(0)?;
    let route_type: Option<String> = row.get(1)?;
    let from = RawWaypoint::read(row, 2)?;
    let to = RawWaypoint::read(row, 5)?;
    let leg = RawLeg::read(row, 8)?;

    Ok(direct_record(name, route_type.as_deref(), from, to, leg))
}

fn direct_record(
    name: String,
    route_type: Option<&str>,
    from: RawWaypoint,
    to: RawWaypoint,
    leg: RawLeg,
) -> CandidateRecord {
    let decoded_type = match route_type.map(str::trim) {
        None | Some("") => Ok(RouteType::Direct),
        Some(code) => RouteType::from_code(code),
    };
    let (leg, leg_defect) = leg.into_leg();

    let mut record = CandidateRecord::pair(
        name,
        decoded_type.as_ref().copied().unwrap_or(RouteType::Direct),
        from.into_ref(),
        to.into_ref(),
        leg,
    );
    if let Some(defect) = leg_defect {
        record = record.with_leg_defect(0, defect);
    }
    match decoded_type {
        Ok(_) => record,
        Err(e) => record.with_defect(e.to_string()),
    }
}
