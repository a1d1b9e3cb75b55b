//! bluechi-rs: Rust client for the bluechi D-Bus API
//!
//! This crate provides the pieces needed to talk to a bluechi controller
//! and its nodes: a bus connection, reply decoding, object path helpers and
//! the unit records returned by `ListUnits`.
//!
//! # Example
//!
//! ```no_run
//! use bluechi_rs::{Bus, BusctlConnection, Decode, parse_unit_on_node_info};
//! use bluechi_rs::unit::NODE_AND_UNIT_INFO_STRUCT_TYPESTRING;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = BusctlConnection::system();
//!     let reply = bus
//!         .call_method(
//!             "org.eclipse.bluechi",
//!             "/org/eclipse/bluechi",
//!             "org.eclipse.bluechi.Controller",
//!             "ListUnits",
//!         )
//!         .await?;
//!
//!     let mut reader = reply.reader();
//!     let mut units = reader.enter_array(NODE_AND_UNIT_INFO_STRUCT_TYPESTRING)?;
//!     while let Decode::Decoded(unit) = parse_unit_on_node_info(&mut units) {
//!         println!("{}: {} {}", unit.node_name(), unit.id, unit.active_state);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod message;
pub mod path;
pub mod unit;
pub mod wire;

pub use bus::{Bus, BusTarget, BusctlConnection};
pub use config::{BusKind, ClientConfig};
pub use error::BluechiError;
pub use message::{ArrayReader, Decode, Message, MessageReader, StructReader};
pub use path::{assemble_object_path_string, object_path_is_valid};
pub use unit::{UnitInfo, parse_unit_info, parse_unit_on_node_info};
pub use wire::{Type, Value};
