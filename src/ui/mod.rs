//! Console and daemon-facing output.
//!
//! - `cli`: flags, subcommands and how they layer onto the settings
//! - `output`: reports for `sync`, `list` and `umount-all`, plus the one-line
//!   pass summaries the daemon logs on every check

pub mod cli;
pub mod output;
