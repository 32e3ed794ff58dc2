//! Reelcut Filters
//!
//! Stateless formatters that turn typed, validated option structs into
//! filter-expression fragments (`volume=0.5`, `crop=w=640:h=360`, ...).
//! No pad tags are produced here; chaining and tagging belong to the
//! render engine.
//!
//! This crate is pure computation: it performs no I/O.

pub mod audio;
pub mod color;
pub mod compose;
pub mod draw;
pub mod effects;
pub mod filter;
pub mod geometry;
pub mod param;
pub mod time;

pub use audio::*;
pub use color::*;
pub use compose::*;
pub use draw::*;
pub use effects::*;
pub use filter::*;
pub use geometry::*;
pub use param::*;
pub use time::*;
