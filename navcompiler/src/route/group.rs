//! Working set of one route name.

use std::collections::HashSet;

use super::segment::{Segment, SegmentKey};

/// Segments collected for the route name currently being read.
///
/// Segments are unique by `(from_id, to_id)`; the first occurrence wins.
#[derive(Debug, Default)]
pub struct RouteGroup {
    name: String,
    segments: Vec<Segment>,
    keys: HashSet<SegmentKey>,
}

impl RouteGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a segment; returns `false` if its key was already present.
    pub fn insert(&mut self, segment: Segment) -> bool {
        if self.keys.insert(segment.key()) {
            self.segments.push(segment);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Release the segments in insertion order.
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}
