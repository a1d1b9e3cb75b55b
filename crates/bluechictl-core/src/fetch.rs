//! Fetching unit lists over the bus
//!
//! One code path serves both reply shapes: the controller's, where every
//! element carries its node, and a node's, where the caller supplies it.

use crate::constants::{BC_INTERFACE_BASE_NAME, LIST_UNITS_METHOD};
use crate::unit_list::UnitList;
use bluechi_rs::unit::{NODE_AND_UNIT_INFO_STRUCT_TYPESTRING, UNIT_INFO_STRUCT_TYPESTRING};
use bluechi_rs::{
    ArrayReader, BluechiError, Bus, Decode, UnitInfo, parse_unit_info, parse_unit_on_node_info,
};
use std::rc::Rc;

/// Shape of one element of a `ListUnits` reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitShape {
    /// Controller-wide listing: `(node, unit...)`
    NodeAndUnit,
    /// Single-node listing: `(unit...)`
    Unit,
}

impl UnitShape {
    /// Element signature the reply array must carry
    pub fn typestring(self) -> &'static str {
        match self {
            UnitShape::NodeAndUnit => NODE_AND_UNIT_INFO_STRUCT_TYPESTRING,
            UnitShape::Unit => UNIT_INFO_STRUCT_TYPESTRING,
        }
    }

    /// Decode the next element of an open array
    pub fn decode(self, reader: &mut ArrayReader<'_>) -> Decode<UnitInfo> {
        match self {
            UnitShape::NodeAndUnit => parse_unit_on_node_info(reader),
            UnitShape::Unit => parse_unit_info(reader),
        }
    }
}

/// Where to send a `ListUnits` call and how to read its reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub object_path: String,
    pub interface: &'static str,
    pub shape: UnitShape,
}

impl Endpoint {
    pub fn new(object_path: impl Into<String>, interface: &'static str, shape: UnitShape) -> Self {
        Self {
            object_path: object_path.into(),
            interface,
            shape,
        }
    }
}

/// Call `ListUnits` on `endpoint` and append every returned unit to `unit_list`
///
/// When `node_name` is given it is stamped onto each decoded unit. Returns
/// the number of units appended. On error, units appended before the failure
/// stay in `unit_list`.
pub async fn fetch_unit_list<B: Bus>(
    bus: &B,
    node_name: Option<&str>,
    endpoint: &Endpoint,
    unit_list: &UnitList,
) -> Result<usize, BluechiError> {
    let message = bus
        .call_method(
            BC_INTERFACE_BASE_NAME,
            &endpoint.object_path,
            endpoint.interface,
            LIST_UNITS_METHOD,
        )
        .await?;

    let mut reader = message.reader();
    let mut units = reader.enter_array(endpoint.shape.typestring())?;

    let mut count = 0;
    loop {
        let mut unit = match endpoint.shape.decode(&mut units) {
            Decode::Decoded(unit) => unit,
            Decode::EndOfStream => break,
            Decode::Error(reason) => {
                tracing::debug!(
                    "Decoding unit {} from {} failed: {}",
                    count,
                    endpoint.object_path,
                    reason
                );
                return Err(BluechiError::Protocol(format!(
                    "Failed to parse unit info: {}",
                    reason
                )));
            }
        };

        if let Some(node) = node_name {
            unit.node = Some(node.to_string());
        }

        unit_list.append(Rc::new(unit));
        count += 1;
    }

    tracing::debug!("Fetched {} units from {}", count, endpoint.object_path);
    Ok(count)
}
