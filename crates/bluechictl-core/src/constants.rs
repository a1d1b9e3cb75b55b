//! Shared constants for the bluechi API and the unit table
//!
//! Bus names, object paths and interfaces the listing talks to, plus the
//! labels used when rendering.

// =============================================================================
// bluechi API
// =============================================================================

/// Well-known bus name of the bluechi controller
pub const BC_INTERFACE_BASE_NAME: &str = "org.eclipse.bluechi";

/// Object path of the controller
pub const BC_OBJECT_PATH: &str = "/org/eclipse/bluechi";

/// Parent path of the per-node objects
pub const NODE_OBJECT_PATH_PREFIX: &str = "/org/eclipse/bluechi/node";

/// Interface implemented by the controller object
pub const CONTROLLER_INTERFACE: &str = "org.eclipse.bluechi.Controller";

/// Interface implemented by every node object
pub const NODE_INTERFACE: &str = "org.eclipse.bluechi.Node";

/// Method that returns the units known to the callee
pub const LIST_UNITS_METHOD: &str = "ListUnits";

// =============================================================================
// Unit table
// =============================================================================

/// Header labels, in column order
pub mod headers {
    pub const NODE: &str = "NODE";
    pub const ID: &str = "ID";
    pub const ACTIVE: &str = "ACTIVE";
    pub const SUB: &str = "SUB";
}

/// Placed between two columns
pub const COLUMN_SEPARATOR: &str = " | ";

/// Character repeated to underline the header
pub const SEPARATOR_LINE_CHAR: char = '=';
