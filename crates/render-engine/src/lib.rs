//! Reelcut Render Engine
//!
//! Turns buffered filter expressions into one ffmpeg invocation and runs it.
//!
//! # Pipeline Architecture
//!
//! ```text
//! MediaEditor ── filter calls ──► FilterGraph (per-channel buffers)
//!      │                               │ materialize
//!      │                               ▼
//!      │                     fragments with {owner} pads
//!      │                               │ resolve (InputRegistry)
//!      ▼                               ▼
//!  OutputOptions ──► output policy ──► FfmpegCommand ──► Runner
//! ```

pub mod command;
pub mod editor;
pub mod graph;
pub mod output;
pub mod probe;
pub mod registry;
pub mod resolve;
pub mod runner;

pub use command::*;
pub use editor::*;
pub use graph::*;
pub use output::*;
pub use probe::*;
pub use registry::*;
pub use resolve::*;
pub use runner::*;
