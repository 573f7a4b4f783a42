//! Fragment reconstruction from unordered segments.
//!
//! The builder grows a double-ended chain from a seed segment, prepending
//! segments that end where the chain starts and appending segments that start
//! where the chain ends, until neither end can be extended.
//!
//! ```text
//!   seed:              B──►C
//!   prepend:      A──►B──►C
//!   append:       A──►B──►C──►D
//! ```
//!
//! # Branch points
//!
//! Origins and destinations are indexed into buckets, so two segments leaving
//! the same waypoint are both visible. When a chain end has several unused
//! candidates, the one that came first in input order is taken. The others stay
//! in the remaining set and later seed fragments of their own, so every input
//! segment lands in exactly one fragment.

use std::collections::{HashMap, VecDeque};

use tracing::trace;

use super::fragment::Fragment;
use super::segment::Segment;
use crate::navaid::WaypointId;

/// Builds connected fragments from the segments of one route group.
#[derive(Debug)]
pub struct ChainBuilder {
    segments: Vec<Segment>,
    used: Vec<bool>,
    remaining: usize,
    /// `from_id` → segment indices, in input order.
    by_origin: HashMap<WaypointId, Vec<usize>>,
    /// `to_id` → segment indices, in input order.
    by_destination: HashMap<WaypointId, Vec<usize>>,
}

impl ChainBuilder {
    /// Index a set of segments. Segments must already be unique by key.
    pub fn new(segments: Vec<Segment>) -> Self {
        let mut by_origin: HashMap<WaypointId, Vec<usize>> = HashMap::new();
        let mut by_destination: HashMap<WaypointId, Vec<usize>> = HashMap::new();

        for (i, segment) in segments.iter().enumerate() {
            by_origin.entry(segment.from_id).or_default().push(i);
            by_destination.entry(segment.to_id).or_default().push(i);
        }

        Self {
            used: vec![false; segments.len()],
            remaining: segments.len(),
            segments,
            by_origin,
            by_destination,
        }
    }

    /// Consume the segments and return fragments numbered from 1.
    pub fn build(mut self) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        let mut seed_cursor = 0;

        while self.remaining > 0 {
            while self.used[seed_cursor] {
                seed_cursor += 1;
            }
            self.take(seed_cursor);

            let mut chain = VecDeque::from([seed_cursor]);
            loop {
                let mut extended = false;

                let head_from = self.segments[chain[0]].from_id;
                if let Some(i) = self.first_unused(&self.by_destination, head_from) {
                    self.take(i);
                    chain.push_front(i);
                    extended = true;
                }

                let tail_to = self.segments[chain[chain.len() - 1]].to_id;
                if let Some(i) = self.first_unused(&self.by_origin, tail_to) {
                    self.take(i);
                    chain.push_back(i);
                    extended = true;
                }

                if !extended {
                    break;
                }
            }

            let number = fragments.len() as u32 + 1;
            let segments: Vec<Segment> = chain.into_iter().map(|i| self.segments[i]).collect();
            trace!(
                fragment = number,
                segments = segments.len(),
                "Built fragment"
            );
            fragments.push(Fragment::new(number, segments));
        }

        fragments
    }

    fn first_unused(
        &self,
        index: &HashMap<WaypointId, Vec<usize>>,
        id: WaypointId,
    ) -> Option<usize> {
        index
            .get(&id)
            .and_then(|bucket| bucket.iter().copied().find(|&i| !self.used[i]))
    }

    fn take(&mut self, i: usize) {
        debug_assert!(!self.used[i]);
        self.used[i] = true;
        self.remaining -= 1;
    }
}
