//! D-Bus wire types
//!
//! Signatures are parsed into a [`Type`] tree and reply bodies are held as a
//! [`Value`] tree that mirrors it. Values are built from the JSON that
//! `busctl --json` prints, guided by the advertised signature.

use crate::error::BluechiError;
use std::fmt;

/// Longest signature the D-Bus specification allows
pub const MAX_SIGNATURE_LEN: usize = 255;

/// Combined array/struct nesting limit (32 + 32 in the D-Bus specification)
const MAX_DEPTH: usize = 64;

/// A single complete D-Bus type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Byte,
    Boolean,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    String,
    ObjectPath,
    Signature,
    UnixFd,
    Array(Box<Type>),
    Struct(Vec<Type>),
    /// Only valid as the element type of an array
    DictEntry(Box<Type>, Box<Type>),
    Variant,
}

impl Type {
    /// Basic (non-container) types are the only ones allowed as dict keys
    pub fn is_basic(&self) -> bool {
        !matches!(
            self,
            Type::Array(_) | Type::Struct(_) | Type::DictEntry(_, _) | Type::Variant
        )
    }

    fn from_basic_code(code: u8) -> Option<Type> {
        let ty = match code {
            b'y' => Type::Byte,
            b'b' => Type::Boolean,
            b'n' => Type::Int16,
            b'q' => Type::UInt16,
            b'i' => Type::Int32,
            b'u' => Type::UInt32,
            b'x' => Type::Int64,
            b't' => Type::UInt64,
            b'd' => Type::Double,
            b's' => Type::String,
            b'o' => Type::ObjectPath,
            b'g' => Type::Signature,
            b'h' => Type::UnixFd,
            b'v' => Type::Variant,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Byte => f.write_str("y"),
            Type::Boolean => f.write_str("b"),
            Type::Int16 => f.write_str("n"),
            Type::UInt16 => f.write_str("q"),
            Type::Int32 => f.write_str("i"),
            Type::UInt32 => f.write_str("u"),
            Type::Int64 => f.write_str("x"),
            Type::UInt64 => f.write_str("t"),
            Type::Double => f.write_str("d"),
            Type::String => f.write_str("s"),
            Type::ObjectPath => f.write_str("o"),
            Type::Signature => f.write_str("g"),
            Type::UnixFd => f.write_str("h"),
            Type::Variant => f.write_str("v"),
            Type::Array(elem) => write!(f, "a{}", elem),
            Type::Struct(fields) => {
                f.write_str("(")?;
                for field in fields {
                    write!(f, "{}", field)?;
                }
                f.write_str(")")
            }
            Type::DictEntry(key, value) => write!(f, "{{{}{}}}", key, value),
        }
    }
}

/// Parse a signature into its sequence of complete types
///
/// # Examples
///
/// ```
/// use bluechi_rs::wire::{parse_signature, Type};
///
/// let types = parse_signature("a(ss)").unwrap();
/// assert_eq!(types.len(), 1);
/// assert_eq!(types[0].to_string(), "a(ss)");
/// assert!(matches!(types[0], Type::Array(_)));
/// ```
pub fn parse_signature(signature: &str) -> Result<Vec<Type>, BluechiError> {
    if signature.len() > MAX_SIGNATURE_LEN {
        return Err(BluechiError::Protocol(format!(
            "signature longer than {} bytes",
            MAX_SIGNATURE_LEN
        )));
    }

    let bytes = signature.as_bytes();
    let mut pos = 0;
    let mut types = Vec::new();
    while pos < bytes.len() {
        types.push(parse_complete_type(bytes, &mut pos, false, 0).map_err(|reason| {
            BluechiError::Protocol(format!("invalid signature '{}': {}", signature, reason))
        })?);
    }
    Ok(types)
}

/// Parse a signature that must hold exactly one complete type
pub fn parse_single_type(signature: &str) -> Result<Type, BluechiError> {
    let mut types = parse_signature(signature)?;
    if types.len() != 1 {
        return Err(BluechiError::Protocol(format!(
            "expected a single complete type, got '{}'",
            signature
        )));
    }
    Ok(types.remove(0))
}

fn parse_complete_type(
    bytes: &[u8],
    pos: &mut usize,
    dict_allowed: bool,
    depth: usize,
) -> Result<Type, String> {
    if depth > MAX_DEPTH {
        return Err("nesting too deep".to_string());
    }
    let Some(&code) = bytes.get(*pos) else {
        return Err("unexpected end of signature".to_string());
    };
    *pos += 1;

    match code {
        b'a' => {
            let elem = parse_complete_type(bytes, pos, true, depth + 1)?;
            Ok(Type::Array(Box::new(elem)))
        }
        b'(' => {
            let mut fields = Vec::new();
            loop {
                match bytes.get(*pos) {
                    None => return Err("unterminated struct".to_string()),
                    Some(b')') => {
                        *pos += 1;
                        break;
                    }
                    Some(_) => fields.push(parse_complete_type(bytes, pos, false, depth + 1)?),
                }
            }
            if fields.is_empty() {
                return Err("empty struct".to_string());
            }
            Ok(Type::Struct(fields))
        }
        b'{' => {
            if !dict_allowed {
                return Err("dict entry outside of an array".to_string());
            }
            let key = parse_complete_type(bytes, pos, false, depth + 1)?;
            if !key.is_basic() {
                return Err(format!("dict key '{}' is not a basic type", key));
            }
            let value = parse_complete_type(bytes, pos, false, depth + 1)?;
            match bytes.get(*pos) {
                Some(b'}') => {
                    *pos += 1;
                    Ok(Type::DictEntry(Box::new(key), Box::new(value)))
                }
                _ => Err("dict entry must hold exactly one key and one value".to_string()),
            }
        }
        other => Type::from_basic_code(other)
            .ok_or_else(|| format!("unknown type code '{}'", other as char)),
    }
}

/// A decoded D-Bus value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(u8),
    Boolean(bool),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    String(String),
    ObjectPath(String),
    Signature(String),
    UnixFd(u32),
    Array(Vec<Value>),
    Struct(Vec<Value>),
    DictEntry(Box<Value>, Box<Value>),
    Variant(Box<Value>),
}

impl Value {
    /// Short name of the value's kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Byte(_) => "byte",
            Value::Boolean(_) => "boolean",
            Value::Int16(_) => "int16",
            Value::UInt16(_) => "uint16",
            Value::Int32(_) => "int32",
            Value::UInt32(_) => "uint32",
            Value::Int64(_) => "int64",
            Value::UInt64(_) => "uint64",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::ObjectPath(_) => "object path",
            Value::Signature(_) => "signature",
            Value::UnixFd(_) => "unix fd",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::DictEntry(_, _) => "dict entry",
            Value::Variant(_) => "variant",
        }
    }

    /// Convert busctl JSON into a value of the given type
    pub fn from_json(ty: &Type, json: &serde_json::Value) -> Result<Value, BluechiError> {
        convert(ty, json).map_err(BluechiError::Protocol)
    }
}

fn mismatch(ty: &Type, json: &serde_json::Value) -> String {
    format!("expected value of type '{}', got {}", ty, json)
}

fn convert_unsigned<T: TryFrom<u64>>(ty: &Type, json: &serde_json::Value) -> Result<T, String> {
    json.as_u64()
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| mismatch(ty, json))
}

fn convert_signed<T: TryFrom<i64>>(ty: &Type, json: &serde_json::Value) -> Result<T, String> {
    json.as_i64()
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| mismatch(ty, json))
}

fn convert_string(ty: &Type, json: &serde_json::Value) -> Result<String, String> {
    json.as_str()
        .map(str::to_string)
        .ok_or_else(|| mismatch(ty, json))
}

fn convert(ty: &Type, json: &serde_json::Value) -> Result<Value, String> {
    let value = match ty {
        Type::Byte => Value::Byte(convert_unsigned(ty, json)?),
        Type::Boolean => Value::Boolean(json.as_bool().ok_or_else(|| mismatch(ty, json))?),
        Type::Int16 => Value::Int16(convert_signed(ty, json)?),
        Type::UInt16 => Value::UInt16(convert_unsigned(ty, json)?),
        Type::Int32 => Value::Int32(convert_signed(ty, json)?),
        Type::UInt32 => Value::UInt32(convert_unsigned(ty, json)?),
        Type::Int64 => Value::Int64(convert_signed(ty, json)?),
        Type::UInt64 => Value::UInt64(convert_unsigned(ty, json)?),
        Type::Double => Value::Double(json.as_f64().ok_or_else(|| mismatch(ty, json))?),
        Type::String => Value::String(convert_string(ty, json)?),
        Type::ObjectPath => Value::ObjectPath(convert_string(ty, json)?),
        Type::Signature => Value::Signature(convert_string(ty, json)?),
        Type::UnixFd => Value::UnixFd(convert_unsigned(ty, json)?),
        Type::Array(elem) => match (elem.as_ref(), json) {
            // busctl prints string-keyed dictionaries as JSON objects
            (Type::DictEntry(key_ty, value_ty), serde_json::Value::Object(map)) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, val) in map {
                    let key = convert_dict_key(key_ty, key)?;
                    let val = convert(value_ty, val)?;
                    entries.push(Value::DictEntry(Box::new(key), Box::new(val)));
                }
                Value::Array(entries)
            }
            (_, serde_json::Value::Array(items)) => Value::Array(
                items
                    .iter()
                    .map(|item| convert(elem, item))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            _ => return Err(mismatch(ty, json)),
        },
        Type::Struct(fields) => {
            let items = json.as_array().ok_or_else(|| mismatch(ty, json))?;
            if items.len() != fields.len() {
                return Err(format!(
                    "struct '{}' has {} fields, got {}",
                    ty,
                    fields.len(),
                    items.len()
                ));
            }
            Value::Struct(
                fields
                    .iter()
                    .zip(items)
                    .map(|(field_ty, item)| convert(field_ty, item))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }
        Type::DictEntry(key_ty, value_ty) => match json.as_array().map(Vec::as_slice) {
            Some([key, val]) => Value::DictEntry(
                Box::new(convert(key_ty, key)?),
                Box::new(convert(value_ty, val)?),
            ),
            _ => return Err(mismatch(ty, json)),
        },
        Type::Variant => {
            let inner_sig = json
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| mismatch(ty, json))?;
            let inner_data = json.get("data").ok_or_else(|| mismatch(ty, json))?;
            let inner_ty = parse_single_type(inner_sig).map_err(|e| e.to_string())?;
            Value::Variant(Box::new(convert(&inner_ty, inner_data)?))
        }
    };
    Ok(value)
}

/// JSON object keys are always strings; numeric keys arrive as their decimal text
fn convert_dict_key(ty: &Type, key: &str) -> Result<Value, String> {
    let as_json = match ty {
        Type::String | Type::ObjectPath | Type::Signature => serde_json::Value::from(key),
        Type::Boolean => key
            .parse::<bool>()
            .map(serde_json::Value::from)
            .map_err(|_| format!("invalid boolean dict key '{}'", key))?,
        Type::Double => key
            .parse::<f64>()
            .map(serde_json::Value::from)
            .map_err(|_| format!("invalid double dict key '{}'", key))?,
        _ => serde_json::from_str(key).map_err(|_| format!("invalid '{}' dict key '{}'", ty, key))?,
    };
    convert(ty, &as_json)
}
