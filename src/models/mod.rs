//! Data models and serialization helpers.
//!
//! This module contains the structures describing desired network shares,
//! mounts observed in the mount table, and the custom deserializers used
//! when reading share lists from JSON and CSV config files.
pub mod serde_helpers;
pub mod share;
