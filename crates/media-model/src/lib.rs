//! Reelcut Media Model
//!
//! Defines the data contracts shared by the filter and render crates:
//! - **Media:** Source type detection and cached stream summaries
//! - **Probe:** The ffprobe JSON report and its reduction to a summary
//! - **Options:** User-facing output options
//! - **Target:** Output container lookup from a file extension

pub mod media;
pub mod options;
pub mod probe;
pub mod target;

pub use media::*;
pub use options::*;
pub use probe::*;
pub use target::*;
