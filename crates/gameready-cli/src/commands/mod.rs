//! CLI command implementations

pub mod checks;
pub mod scan;
