//! In-memory navaid table.

use std::collections::HashMap;

use super::{NavaidCandidate, NavaidLookup, WaypointId, WaypointKind};
use crate::error::StoreResult;
use crate::geo::Pos;

#[derive(Debug, Clone)]
struct Entry {
    region: String,
    candidate: NavaidCandidate,
}

/// Navaid lookup backed by a hash map, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MemoryNavaids {
    by_ident: HashMap<(String, WaypointKind), Vec<Entry>>,
    len: usize,
}

impl MemoryNavaids {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a waypoint. Entries of the same ident stay sorted by id.
    pub fn insert(
        &mut self,
        id: WaypointId,
        ident: &str,
        region: &str,
        kind: WaypointKind,
        pos: Pos,
    ) -> &mut Self {
        let entries = self
            .by_ident
            .entry((ident.to_string(), kind))
            .or_default();
        entries.push(Entry {
            region: region.to_string(),
            candidate: NavaidCandidate::new(id, pos),
        });
        entries.sort_by_key(|e| e.candidate.id);
        self.len += 1;
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl NavaidLookup for MemoryNavaids {
    fn lookup(
        &self,
        ident: &str,
        region: &str,
        kind: WaypointKind,
    ) -> StoreResult<Vec<NavaidCandidate>> {
        let Some(entries) = self.by_ident.get(&(ident.to_string(), kind)) else {
            return Ok(Vec::new());
        };

        Ok(entries
            .iter()
            .filter(|e| region.is_empty() || e.region == region)
            .map(|e| e.candidate)
            .collect())
    }
}
