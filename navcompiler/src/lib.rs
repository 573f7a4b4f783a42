//! navcompiler - navigation data compiler
//!
//! This library turns staged airway and direct route legs into ordered,
//! numbered route segments in a SQLite navigation database.
//!
//! # Modules
//!
//! - [`navaid`] - waypoint lookup and position-biased disambiguation
//! - [`route`] - chain building, pruning, numbering and the run driver
//! - [`store`] - SQLite bindings for lookups, candidates and output rows
//! - [`progress`] - progress reporting and cooperative cancellation
//! - [`config`] - the `~/.navcompiler/config.ini` file
//! - [`logging`] - tracing subscriber setup
//! - [`geo`] - positions, distances and bounding rectangles

pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod navaid;
pub mod progress;
pub mod route;
pub mod store;

pub use error::{ResolveError, ResolveResult, StoreError, StoreResult};
