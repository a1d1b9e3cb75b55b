//! Unit records as returned by `ListUnits`

use crate::error::BluechiError;
use crate::message::{ArrayReader, Decode, StructReader};

/// Field layout of one unit as reported by a single node
pub const UNIT_INFO_TYPESTRING: &str = "ssssssouso";

/// Struct wrapping [`UNIT_INFO_TYPESTRING`]
pub const UNIT_INFO_STRUCT_TYPESTRING: &str = "(ssssssouso)";

/// Field layout of one unit as reported by the controller: node name first
pub const NODE_AND_UNIT_INFO_TYPESTRING: &str = "sssssssouso";

/// Struct wrapping [`NODE_AND_UNIT_INFO_TYPESTRING`]
pub const NODE_AND_UNIT_INFO_STRUCT_TYPESTRING: &str = "(sssssssouso)";

/// A unit known to a node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitInfo {
    /// Owning node; unset until the reply or the caller provides it
    pub node: Option<String>,
    /// Unit name (e.g., "chronyd.service")
    pub id: String,
    pub description: String,
    pub load_state: String,
    pub active_state: String,
    pub sub_state: String,
    /// Unit this one follows, empty if none
    pub following: String,
    pub object_path: String,
    /// Queued job id, 0 if none
    pub job_id: u32,
    pub job_type: String,
    pub job_path: String,
}

impl UnitInfo {
    /// Whether a job is queued for this unit
    pub fn has_job(&self) -> bool {
        self.job_id != 0
    }

    /// Node name for display, empty when unset
    pub fn node_name(&self) -> &str {
        self.node.as_deref().unwrap_or("")
    }

    fn read_unit_fields(
        node: Option<String>,
        fields: &mut StructReader<'_>,
    ) -> Result<Self, BluechiError> {
        Ok(Self {
            node,
            id: fields.read_str()?.to_string(),
            description: fields.read_str()?.to_string(),
            load_state: fields.read_str()?.to_string(),
            active_state: fields.read_str()?.to_string(),
            sub_state: fields.read_str()?.to_string(),
            following: fields.read_str()?.to_string(),
            object_path: fields.read_object_path()?.to_string(),
            job_id: fields.read_u32()?,
            job_type: fields.read_str()?.to_string(),
            job_path: fields.read_object_path()?.to_string(),
        })
    }
}

fn decode_with<F>(reader: &mut ArrayReader<'_>, read: F) -> Decode<UnitInfo>
where
    F: FnOnce(&mut StructReader<'_>) -> Result<UnitInfo, BluechiError>,
{
    let mut fields = match reader.enter_struct() {
        None => return Decode::EndOfStream,
        Some(Ok(fields)) => fields,
        Some(Err(e)) => return Decode::Error(e.to_string()),
    };

    let unit = match read(&mut fields) {
        Ok(unit) => unit,
        Err(e) => return Decode::Error(e.to_string()),
    };

    match fields.finish() {
        Ok(()) => Decode::Decoded(unit),
        Err(e) => Decode::Error(e.to_string()),
    }
}

/// Decode one `(ssssssouso)` element; `node` is left unset
pub fn parse_unit_info(reader: &mut ArrayReader<'_>) -> Decode<UnitInfo> {
    decode_with(reader, |fields| UnitInfo::read_unit_fields(None, fields))
}

/// Decode one `(sssssssouso)` element, taking `node` from the first field
pub fn parse_unit_on_node_info(reader: &mut ArrayReader<'_>) -> Decode<UnitInfo> {
    decode_with(reader, |fields| {
        let node = fields.read_str()?.to_string();
        UnitInfo::read_unit_fields(Some(node), fields)
    })
}
