//! bluechictl-core: Core logic for bluechictl
//!
//! This crate fetches unit lists from a bluechi controller or one of its
//! nodes, collects them, and renders them as a table. It is kept
//! independent of the command-line front end so the pieces can be tested
//! against a fake bus.
//!
//! # Modules
//!
//! - [`unit_list`] - Reference-counted collection of fetched units
//! - [`fetch`] - One `ListUnits` exchange decoded into a unit list
//! - [`list_units`] - Controller-wide and per-node listing operations
//! - [`formatting`] - Table rendering
//! - [`filter`] - Glob filtering on unit ids
//! - [`network`] - IP address helpers for building bus addresses
//! - [`errors`] - Error formatting utilities for user-friendly messages
//! - [`constants`] - bluechi bus names, paths and table labels

pub mod constants;
pub mod errors;
pub mod fetch;
pub mod filter;
pub mod formatting;
pub mod list_units;
pub mod network;
pub mod unit_list;

// Re-export commonly used items at crate root
pub use errors::*;
pub use fetch::{Endpoint, UnitShape, fetch_unit_list};
pub use filter::{UnitFilter, fnmatch_to_glob, match_glob, validate_glob};
pub use formatting::*;
pub use list_units::*;
pub use unit_list::UnitList;

// Network is not re-exported at root; use bluechictl_core::network::* explicitly
