//! Object path helpers
//!
//! Node names are free-form strings while D-Bus object path elements only
//! allow `[A-Za-z0-9_]`, so names are escaped the same way sd-bus does it.

use crate::error::BluechiError;
use std::fmt::Write;

/// Check an object path against the D-Bus grammar
///
/// # Examples
///
/// ```
/// use bluechi_rs::path::object_path_is_valid;
///
/// assert!(object_path_is_valid("/"));
/// assert!(object_path_is_valid("/org/eclipse/bluechi"));
/// assert!(!object_path_is_valid("/org//bluechi"));
/// assert!(!object_path_is_valid("/org/eclipse/"));
/// assert!(!object_path_is_valid("org/eclipse"));
/// ```
pub fn object_path_is_valid(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    rest.split('/').all(|element| {
        !element.is_empty()
            && element
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    })
}

/// Append an escaped `name` to `prefix` as a new path element
///
/// Every byte outside `[A-Za-z0-9]` becomes `_` followed by two lowercase
/// hex digits; an empty name is written as a lone `_`.
///
/// # Examples
///
/// ```
/// use bluechi_rs::path::assemble_object_path_string;
///
/// assert_eq!(
///     assemble_object_path_string("/org/eclipse/bluechi/node", "node-1").unwrap(),
///     "/org/eclipse/bluechi/node/node_2d1"
/// );
/// assert!(assemble_object_path_string("not/a/path", "node").is_err());
/// ```
pub fn assemble_object_path_string(prefix: &str, name: &str) -> Result<String, BluechiError> {
    if !object_path_is_valid(prefix) {
        return Err(BluechiError::InvalidArgument(format!(
            "'{}' is not a valid object path",
            prefix
        )));
    }

    let mut path = String::with_capacity(prefix.len() + 1 + name.len() * 3);
    path.push_str(prefix);
    if prefix != "/" {
        path.push('/');
    }

    if name.is_empty() {
        path.push('_');
        return Ok(path);
    }

    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() {
            path.push(byte as char);
        } else {
            // Writing to a String cannot fail
            let _ = write!(path, "_{:02x}", byte);
        }
    }

    Ok(path)
}
