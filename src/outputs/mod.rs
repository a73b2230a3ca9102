//! Output writers.
//!
//! - [`json`]: timestamped snapshot files written by the `snapshot` command

pub mod json;
