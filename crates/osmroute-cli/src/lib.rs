//! OpenStreetMap route planner CLI library.
//!
//! This crate provides the command-line glue around `osmroute-lib`:
//! coordinate input with fallbacks, terminal styling and output formatting.

pub mod input;
pub mod output;
pub mod terminal;

#[cfg(test)]
pub(crate) mod test_helpers;
