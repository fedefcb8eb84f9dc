//! Command implementations for the confsnap CLI

pub mod resolve;
pub mod run;
pub mod validate_hints;
