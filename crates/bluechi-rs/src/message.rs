//! Reply messages and sequential readers over their bodies
//!
//! A [`Message`] holds the body of a method reply. Readers walk it the way
//! sd-bus does: open a container, pull elements one at a time, and report
//! end-of-container separately from malformed contents.

use crate::error::BluechiError;
use crate::wire::{Type, Value, parse_signature};

/// Outcome of decoding one record from an open array
#[derive(Debug, Clone, PartialEq)]
pub enum Decode<T> {
    /// One record was read
    Decoded(T),
    /// The array has no more elements
    EndOfStream,
    /// The next element could not be decoded
    Error(String),
}

/// Method reply body
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    signature: String,
    types: Vec<Type>,
    body: Vec<Value>,
}

impl Message {
    /// Build a message from a signature and already-decoded body values
    ///
    /// Only the signature is parsed; the values are stored as given and not
    /// checked against it.
    pub fn new(signature: &str, body: Vec<Value>) -> Result<Self, BluechiError> {
        let types = parse_signature(signature)?;
        Ok(Self {
            signature: signature.to_string(),
            types,
            body,
        })
    }

    /// Parse the output of `busctl --json=short call`
    ///
    /// The expected shape is `{"type": "<signature>", "data": [<arg>, ...]}`;
    /// a method without return values prints nothing at all. Anything that
    /// cannot be read is reported as a transport failure since no usable
    /// reply was received.
    pub fn from_busctl_json(output: &str) -> Result<Self, BluechiError> {
        let output = output.trim();
        if output.is_empty() {
            return Self::new("", Vec::new());
        }

        let json: serde_json::Value = serde_json::from_str(output)
            .map_err(|e| BluechiError::Transport(format!("malformed reply: {}", e)))?;

        let signature = json
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| BluechiError::Transport("malformed reply: missing 'type'".to_string()))?;
        let data = json
            .get("data")
            .and_then(|d| d.as_array())
            .ok_or_else(|| BluechiError::Transport("malformed reply: missing 'data'".to_string()))?;

        let types = parse_signature(signature)
            .map_err(|e| BluechiError::Transport(format!("malformed reply: {}", e)))?;
        if types.len() != data.len() {
            return Err(BluechiError::Transport(format!(
                "malformed reply: signature '{}' has {} arguments, got {}",
                signature,
                types.len(),
                data.len()
            )));
        }

        let body = types
            .iter()
            .zip(data)
            .map(|(ty, arg)| Value::from_json(ty, arg))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BluechiError::Transport(format!("malformed reply: {}", e)))?;

        Ok(Self {
            signature: signature.to_string(),
            types,
            body,
        })
    }

    /// Signature of the whole body
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Body values in order
    pub fn body(&self) -> &[Value] {
        &self.body
    }

    /// Start reading the body from its first argument
    pub fn reader(&self) -> MessageReader<'_> {
        MessageReader {
            message: self,
            position: 0,
        }
    }
}

/// Cursor over the top-level arguments of a [`Message`]
#[derive(Debug)]
pub struct MessageReader<'a> {
    message: &'a Message,
    position: usize,
}

impl<'a> MessageReader<'a> {
    /// Open the next argument as an array whose element signature is `contents`
    ///
    /// # Examples
    ///
    /// ```
    /// use bluechi_rs::message::Message;
    /// use bluechi_rs::wire::Value;
    ///
    /// let message = Message::new("as", vec![Value::Array(vec![])]).unwrap();
    /// let mut reader = message.reader();
    /// assert!(reader.enter_array("i").is_err());
    ///
    /// let mut reader = message.reader();
    /// let mut array = reader.enter_array("s").unwrap();
    /// assert!(array.enter_struct().is_none());
    /// ```
    pub fn enter_array(&mut self, contents: &str) -> Result<ArrayReader<'a>, BluechiError> {
        let index = self.position;
        let ty = self.message.types.get(index).ok_or_else(|| {
            BluechiError::Protocol(format!(
                "expected an array of '{}' but reply '{}' has no argument {}",
                contents, self.message.signature, index
            ))
        })?;

        let element = match ty {
            Type::Array(element) if element.to_string() == contents => element,
            other => {
                return Err(BluechiError::Protocol(format!(
                    "expected 'a{}', reply argument {} is '{}'",
                    contents, index, other
                )));
            }
        };

        let items = match self.message.body.get(index) {
            Some(Value::Array(items)) => items.as_slice(),
            Some(other) => {
                return Err(BluechiError::Protocol(format!(
                    "argument {} is a {}, not an array",
                    index,
                    other.kind()
                )));
            }
            None => {
                return Err(BluechiError::Protocol(format!(
                    "argument {} is missing from the body",
                    index
                )));
            }
        };

        self.position += 1;
        Ok(ArrayReader {
            element: element.as_ref().clone(),
            items: items.iter(),
        })
    }
}

/// Cursor over the elements of an open array
#[derive(Debug)]
pub struct ArrayReader<'a> {
    element: Type,
    items: std::slice::Iter<'a, Value>,
}

impl<'a> ArrayReader<'a> {
    /// Signature of one element
    pub fn element_type(&self) -> &Type {
        &self.element
    }

    /// Number of elements not yet read
    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    /// Open the next element as a struct
    ///
    /// Returns `None` once the array is exhausted.
    pub fn enter_struct(&mut self) -> Option<Result<StructReader<'a>, BluechiError>> {
        let item = self.items.next()?;
        Some(match item {
            Value::Struct(fields) => Ok(StructReader {
                fields: fields.iter(),
                index: 0,
            }),
            other => Err(BluechiError::Protocol(format!(
                "array element is a {}, not a struct",
                other.kind()
            ))),
        })
    }
}

/// Cursor over the fields of one struct
#[derive(Debug)]
pub struct StructReader<'a> {
    fields: std::slice::Iter<'a, Value>,
    index: usize,
}

impl<'a> StructReader<'a> {
    fn next_field(&mut self, wanted: &str) -> Result<&'a Value, BluechiError> {
        let index = self.index;
        self.index += 1;
        self.fields.next().ok_or_else(|| {
            BluechiError::Protocol(format!("struct ended before field {} ({})", index, wanted))
        })
    }

    fn unexpected(&self, wanted: &str, got: &Value) -> BluechiError {
        BluechiError::Protocol(format!(
            "field {} is a {}, expected {}",
            self.index - 1,
            got.kind(),
            wanted
        ))
    }

    /// Read a string field
    pub fn read_str(&mut self) -> Result<&'a str, BluechiError> {
        match self.next_field("string")? {
            Value::String(s) => Ok(s),
            other => Err(self.unexpected("string", other)),
        }
    }

    /// Read an object path field
    pub fn read_object_path(&mut self) -> Result<&'a str, BluechiError> {
        match self.next_field("object path")? {
            Value::ObjectPath(s) => Ok(s),
            other => Err(self.unexpected("object path", other)),
        }
    }

    /// Read a uint32 field
    pub fn read_u32(&mut self) -> Result<u32, BluechiError> {
        match self.next_field("uint32")? {
            Value::UInt32(n) => Ok(*n),
            other => Err(self.unexpected("uint32", other)),
        }
    }

    /// Leave the struct, rejecting any fields that were not read
    pub fn finish(mut self) -> Result<(), BluechiError> {
        match self.fields.next() {
            None => Ok(()),
            Some(extra) => Err(BluechiError::Protocol(format!(
                "unexpected trailing {} at field {}",
                extra.kind(),
                self.index
            ))),
        }
    }
}
