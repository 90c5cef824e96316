#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geospatial and temporal analytics over shelter intake records.
//!
//! Everything here is a synchronous, total computation over in-memory
//! data. Bad records degrade (placeholder values, `"Unknown"` month,
//! excluded from spatial output) rather than failing a whole view, which
//! is why this crate has no error type.

pub mod arena;
pub mod difficulty;
pub mod distance;
pub mod hotspots;
pub mod identity;
pub mod nearest;
pub mod radar;
pub mod resolve;
pub mod temporal;

pub use arena::RecordArena;
pub use resolve::RecordResolver;
pub use temporal::TemporalIndex;
