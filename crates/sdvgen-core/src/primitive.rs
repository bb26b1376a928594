//! Primitive type table, C-name conversion, and reserved-word escaping.

use serde::Serialize;
use std::fmt;

/// Built-in IDL primitive kinds.
///
/// `String` is listed here so that aliases and array elements can name it, but
/// the classifier reports a bare string as `TypeShape::StringT`, never as a
/// primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Primitive {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Boolean,
    Float,
    Double,
    String,
}

/// Name used for byte payloads; rewritten to an implicit `UInt8` array.
pub const BYTE_BUFFER: &str = "ByteBuffer";

/// Identifiers that collide with IDL keywords and get a `_` suffix
pub const RESERVED_NAMES: &[&str] = &[
    "info",
    "version",
    "interface",
    "struct",
    "enum",
    "const",
    "array",
    "map",
    "broadcast",
    "method",
    "attribute",
    "throws",
];

impl Primitive {
    pub const ALL: [Primitive; 12] = [
        Primitive::UInt8,
        Primitive::UInt16,
        Primitive::UInt32,
        Primitive::UInt64,
        Primitive::Int8,
        Primitive::Int16,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::Boolean,
        Primitive::Float,
        Primitive::Double,
        Primitive::String,
    ];

    /// Look up a primitive by its IDL name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::UInt8 => "UInt8",
            Primitive::UInt16 => "UInt16",
            Primitive::UInt32 => "UInt32",
            Primitive::UInt64 => "UInt64",
            Primitive::Int8 => "Int8",
            Primitive::Int16 => "Int16",
            Primitive::Int32 => "Int32",
            Primitive::Int64 => "Int64",
            Primitive::Boolean => "Boolean",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
            Primitive::String => "String",
        }
    }

    /// Native (C++) spelling of this primitive
    pub fn native_name(self) -> &'static str {
        match self {
            Primitive::UInt8 => "uint8_t",
            Primitive::UInt16 => "uint16_t",
            Primitive::UInt32 => "uint32_t",
            Primitive::UInt64 => "uint64_t",
            Primitive::Int8 => "int8_t",
            Primitive::Int16 => "int16_t",
            Primitive::Int32 => "int32_t",
            Primitive::Int64 => "int64_t",
            Primitive::Boolean => "bool",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::String => "std::string",
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            Primitive::Boolean | Primitive::Float | Primitive::Double | Primitive::String
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Primitive::UInt8 | Primitive::UInt16 | Primitive::UInt32 | Primitive::UInt64
        )
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Convert a C type name to its IDL spelling; other names pass through.
pub fn idl_type_name(name: &str) -> &str {
    match name {
        "uint8_t" => "UInt8",
        "uint16_t" => "UInt16",
        "uint32_t" => "UInt32",
        "uint64_t" => "UInt64",
        "int8_t" => "Int8",
        "int16_t" => "Int16",
        "int32_t" => "Int32",
        "int64_t" => "Int64",
        "bool" => "Boolean",
        "float" => "Float",
        "double" => "Double",
        other => other,
    }
}

/// Append `_` to names that collide with IDL keywords.
pub fn escape_name(name: &str) -> String {
    if RESERVED_NAMES.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Inverse of [`escape_name`], used to match deployment records.
pub fn unescape_name(name: &str) -> &str {
    match name.strip_suffix('_') {
        Some(base) if RESERVED_NAMES.contains(&base) => base,
        _ => name,
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal integer.
pub fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };
    Some(if negative { -value } else { value })
}
