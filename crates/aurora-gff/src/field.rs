//! Field records and per-type payload decoding

use crate::error::{GffError, GffResult};
use crate::header::{GffHeader, LABEL_SIZE};
use crate::locstring::LocStringDecoder;
use crate::stream::{
    ScopedSeek, label_from_slot, read_bounded, read_f32_array, read_text, read_u8, read_u32_le,
    read_u64_le,
};
use crate::value::GffValue;
use binrw::BinRead;
use std::fmt;
use std::io::{Read, Seek};

/// Field type tags as stored in the field table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum GffFieldType {
    /// Unsigned 8-bit integer
    Byte = 0,
    /// Signed 8-bit character
    Char = 1,
    /// Unsigned 16-bit integer
    Uint16 = 2,
    /// Signed 16-bit integer
    Sint16 = 3,
    /// Unsigned 32-bit integer
    Uint32 = 4,
    /// Signed 32-bit integer
    Sint32 = 5,
    /// Unsigned 64-bit integer
    Uint64 = 6,
    /// Signed 64-bit integer
    Sint64 = 7,
    /// 32-bit float
    Float = 8,
    /// 64-bit float
    Double = 9,
    /// Length-prefixed string
    ExoString = 10,
    /// Resource reference, byte-length-prefixed
    ResRef = 11,
    /// Localized string
    LocString = 12,
    /// Binary blob
    Void = 13,
    /// Reference to a struct by index
    Struct = 14,
    /// Reference to a list by byte offset
    List = 15,
    /// Quaternion, four floats
    Orientation = 16,
    /// Three floats
    Vector = 17,
    /// Talk table string reference
    StrRef = 18,
}

impl GffFieldType {
    /// Whether the value lives in the field data area
    pub const fn is_extended(self) -> bool {
        matches!(
            self,
            Self::Uint64
                | Self::Sint64
                | Self::Double
                | Self::ExoString
                | Self::ResRef
                | Self::LocString
                | Self::Void
                | Self::Orientation
                | Self::Vector
                | Self::StrRef
        )
    }

    /// Types accepted by the integer getters
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Char
                | Self::Uint16
                | Self::Sint16
                | Self::Uint32
                | Self::Sint32
                | Self::Uint64
                | Self::Sint64
                | Self::StrRef
        )
    }

    /// Types accepted by the floating-point getter
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Types the string getter can render as text
    pub const fn is_textual(self) -> bool {
        !matches!(self, Self::Void | Self::Struct | Self::List)
    }

    /// Lowercase type name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Uint16 => "uint16",
            Self::Sint16 => "sint16",
            Self::Uint32 => "uint32",
            Self::Sint32 => "sint32",
            Self::Uint64 => "uint64",
            Self::Sint64 => "sint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::ExoString => "exostring",
            Self::ResRef => "resref",
            Self::LocString => "locstring",
            Self::Void => "void",
            Self::Struct => "struct",
            Self::List => "list",
            Self::Orientation => "orientation",
            Self::Vector => "vector",
            Self::StrRef => "strref",
        }
    }
}

impl TryFrom<u32> for GffFieldType {
    type Error = GffError;

    fn try_from(value: u32) -> GffResult<Self> {
        Ok(match value {
            0 => Self::Byte,
            1 => Self::Char,
            2 => Self::Uint16,
            3 => Self::Sint16,
            4 => Self::Uint32,
            5 => Self::Sint32,
            6 => Self::Uint64,
            7 => Self::Sint64,
            8 => Self::Float,
            9 => Self::Double,
            10 => Self::ExoString,
            11 => Self::ResRef,
            12 => Self::LocString,
            13 => Self::Void,
            14 => Self::Struct,
            15 => Self::List,
            16 => Self::Orientation,
            17 => Self::Vector,
            18 => Self::StrRef,
            other => return Err(GffError::UnknownFieldType(other)),
        })
    }
}

impl fmt::Display for GffFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field table entry as stored on disk
#[derive(Debug, Clone, Copy, BinRead)]
#[br(little)]
pub(crate) struct RawFieldRecord {
    pub type_tag: u32,
    pub label_index: u32,
    pub data: u32,
}

/// A typed datum: inline payload or offset into the field data area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GffField {
    field_type: GffFieldType,
    data: u32,
}

impl GffField {
    /// Create a field from its type and raw data word
    pub const fn new(field_type: GffFieldType, data: u32) -> Self {
        Self { field_type, data }
    }

    /// Field type
    pub const fn field_type(&self) -> GffFieldType {
        self.field_type
    }

    /// Raw data word: the value itself, or a byte offset for extended types
    pub const fn data(&self) -> u32 {
        self.data
    }

    /// Whether the value lives in the field data area
    pub const fn is_extended(&self) -> bool {
        self.field_type.is_extended()
    }

    /// Read one field record at the reader's current position and resolve
    /// its label.
    pub(crate) fn read_record<R: Read + Seek>(
        reader: &mut R,
        header: &GffHeader,
    ) -> GffResult<(String, Self)> {
        let raw = RawFieldRecord::read(reader)?;
        let field_type = GffFieldType::try_from(raw.type_tag)?;

        if raw.label_index >= header.label_count {
            return Err(GffError::LabelIndexOutOfRange {
                index: raw.label_index,
                count: header.label_count,
            });
        }

        let mut slot = [0u8; LABEL_SIZE as usize];
        {
            let mut guard = ScopedSeek::new(reader, header.label_position(raw.label_index))?;
            guard.read_exact(&mut slot)?;
        }

        Ok((label_from_slot(&slot), Self::new(field_type, raw.data)))
    }

    /// Decode the field's value.
    ///
    /// Inline types are taken from the data word with width truncation and
    /// sign extension. Extended types seek into the field data area and the
    /// stream cursor is restored afterwards, whether or not the read succeeds.
    pub fn read_value<R: Read + Seek>(
        &self,
        reader: &mut R,
        header: &GffHeader,
        loc_strings: &dyn LocStringDecoder,
    ) -> GffResult<GffValue> {
        let data = self.data;
        Ok(match self.field_type {
            GffFieldType::Byte => GffValue::Byte(data as u8),
            GffFieldType::Char => GffValue::Char(data as u8 as i8),
            GffFieldType::Uint16 => GffValue::Uint16(data as u16),
            GffFieldType::Sint16 => GffValue::Sint16(data as u16 as i16),
            GffFieldType::Uint32 => GffValue::Uint32(data),
            GffFieldType::Sint32 => GffValue::Sint32(data as i32),
            GffFieldType::Float => GffValue::Float(f32::from_bits(data)),
            GffFieldType::Struct => GffValue::Struct(data),
            GffFieldType::List => GffValue::List(data),
            GffFieldType::Uint64 => {
                GffValue::Uint64(self.extended(reader, header, |r| Ok(read_u64_le(r)?))?)
            }
            GffFieldType::Sint64 => {
                GffValue::Sint64(self.extended(reader, header, |r| Ok(read_u64_le(r)? as i64))?)
            }
            GffFieldType::Double => GffValue::Double(
                self.extended(reader, header, |r| Ok(f64::from_bits(read_u64_le(r)?)))?,
            ),
            GffFieldType::ExoString => GffValue::ExoString(self.extended(reader, header, |r| {
                let len = read_u32_le(r)?;
                Ok(read_text(r, len as usize)?)
            })?),
            GffFieldType::ResRef => GffValue::ResRef(self.extended(reader, header, |r| {
                let len = read_u8(r)?;
                Ok(read_text(r, usize::from(len))?)
            })?),
            GffFieldType::LocString => GffValue::LocString(self.extended(reader, header, |r| {
                let size = read_u32_le(r)?;
                let mut bounded = r.take(u64::from(size));
                loc_strings.decode(&mut bounded)
            })?),
            GffFieldType::Void => GffValue::Void(self.extended(reader, header, |r| {
                let size = read_u32_le(r)?;
                let bytes = read_bounded(r, u64::from(size))?;
                if bytes.len() < size as usize {
                    return Err(GffError::TruncatedBlob {
                        declared: size,
                        available: bytes.len(),
                    });
                }
                Ok(bytes)
            })?),
            GffFieldType::Orientation => {
                GffValue::Orientation(self.extended(reader, header, |r| Ok(read_f32_array(r)?))?)
            }
            GffFieldType::Vector => {
                GffValue::Vector(self.extended(reader, header, |r| Ok(read_f32_array(r)?))?)
            }
            GffFieldType::StrRef => GffValue::StrRef(self.extended(reader, header, |r| {
                let size = read_u32_le(r)?;
                if size != 4 {
                    return Err(GffError::MalformedStrRef(size));
                }
                Ok(read_u32_le(r)?)
            })?),
        })
    }

    fn extended<R, T, F>(&self, reader: &mut R, header: &GffHeader, read: F) -> GffResult<T>
    where
        R: Read + Seek,
        F: FnOnce(&mut R) -> GffResult<T>,
    {
        let mut guard = ScopedSeek::new(reader, header.field_data_position(self.data))?;
        read(&mut *guard)
    }
}
