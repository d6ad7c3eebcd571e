//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: writes each source's records and resolved places as a JSON
//!   manifest for the downstream packager

pub mod json;
