//! Decoded field values and their coercions

use crate::field::GffFieldType;
use crate::locstring::LocString;
use std::fmt;

/// A decoded field value, one variant per field type
#[derive(Debug, Clone, PartialEq)]
pub enum GffValue {
    /// Unsigned 8-bit integer
    Byte(u8),
    /// Signed 8-bit character
    Char(i8),
    /// Unsigned 16-bit integer
    Uint16(u16),
    /// Signed 16-bit integer
    Sint16(i16),
    /// Unsigned 32-bit integer
    Uint32(u32),
    /// Signed 32-bit integer
    Sint32(i32),
    /// Unsigned 64-bit integer
    Uint64(u64),
    /// Signed 64-bit integer
    Sint64(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// String
    ExoString(String),
    /// Resource reference
    ResRef(String),
    /// Localized string
    LocString(LocString),
    /// Binary blob
    Void(Vec<u8>),
    /// Struct index
    Struct(u32),
    /// Byte offset into the list indices area
    List(u32),
    /// Quaternion
    Orientation([f32; 4]),
    /// Vector
    Vector([f32; 3]),
    /// Talk table string reference
    StrRef(u32),
}

impl GffValue {
    /// Field type this value was decoded from
    pub const fn field_type(&self) -> GffFieldType {
        match self {
            Self::Byte(_) => GffFieldType::Byte,
            Self::Char(_) => GffFieldType::Char,
            Self::Uint16(_) => GffFieldType::Uint16,
            Self::Sint16(_) => GffFieldType::Sint16,
            Self::Uint32(_) => GffFieldType::Uint32,
            Self::Sint32(_) => GffFieldType::Sint32,
            Self::Uint64(_) => GffFieldType::Uint64,
            Self::Sint64(_) => GffFieldType::Sint64,
            Self::Float(_) => GffFieldType::Float,
            Self::Double(_) => GffFieldType::Double,
            Self::ExoString(_) => GffFieldType::ExoString,
            Self::ResRef(_) => GffFieldType::ResRef,
            Self::LocString(_) => GffFieldType::LocString,
            Self::Void(_) => GffFieldType::Void,
            Self::Struct(_) => GffFieldType::Struct,
            Self::List(_) => GffFieldType::List,
            Self::Orientation(_) => GffFieldType::Orientation,
            Self::Vector(_) => GffFieldType::Vector,
            Self::StrRef(_) => GffFieldType::StrRef,
        }
    }

    /// Integer value widened to 64 bits.
    ///
    /// Signed sources are sign-extended first, so a `Sint32(-1)` becomes
    /// `0xFFFF_FFFF_FFFF_FFFF`.
    pub fn as_u64(&self) -> Option<u64> {
        Some(match *self {
            Self::Byte(v) => u64::from(v),
            Self::Char(v) => i64::from(v) as u64,
            Self::Uint16(v) => u64::from(v),
            Self::Sint16(v) => i64::from(v) as u64,
            Self::Uint32(v) | Self::StrRef(v) => u64::from(v),
            Self::Sint32(v) => i64::from(v) as u64,
            Self::Uint64(v) => v,
            Self::Sint64(v) => v as u64,
            _ => return None,
        })
    }

    /// Integer value as signed 64 bits (two's complement reinterpretation
    /// of [`as_u64`](Self::as_u64))
    pub fn as_i64(&self) -> Option<i64> {
        self.as_u64().map(|v| v as i64)
    }

    /// Floating point value
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(f64::from(v)),
            Self::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Textual rendering used by the string getter.
    ///
    /// Strings come back as-is, integers in decimal, floats in fixed-point
    /// and vector/orientation components joined by `/`. Blobs, structs and
    /// lists have no textual form.
    pub fn to_text(&self) -> Option<String> {
        Some(match self {
            Self::ExoString(s) | Self::ResRef(s) => s.clone(),
            Self::LocString(s) => s.preferred().unwrap_or_default().to_string(),
            Self::Byte(v) => v.to_string(),
            Self::Char(v) => v.to_string(),
            Self::Uint16(v) => v.to_string(),
            Self::Sint16(v) => v.to_string(),
            Self::Uint32(v) | Self::StrRef(v) => v.to_string(),
            Self::Sint32(v) => v.to_string(),
            Self::Uint64(v) => v.to_string(),
            Self::Sint64(v) => v.to_string(),
            Self::Float(v) => format!("{:.6}", v),
            Self::Double(v) => format!("{:.6}", v),
            Self::Vector(v) => join_floats(v),
            Self::Orientation(v) => join_floats(v),
            Self::Void(_) | Self::Struct(_) | Self::List(_) => return None,
        })
    }
}

fn join_floats(values: &[f32]) -> String {
    values
        .iter()
        .map(|v| format!("{:.6}", v))
        .collect::<Vec<_>>()
        .join("/")
}

impl fmt::Display for GffValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::Struct(index) => write!(f, "<struct #{}>", index),
            Self::List(offset) => write!(f, "<list @{}>", offset),
            other => f.write_str(&other.to_text().unwrap_or_default()),
        }
    }
}
