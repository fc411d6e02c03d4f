//! Error types for GFF decoding

use crate::field::GffFieldType;
use crate::resource::ResourceType;
use thiserror::Error;

/// Coarse classification of a [`GffError`].
///
/// Load-time categories (`HeaderInvalid`, `ListIndicesBroken`) mean no file
/// was produced. Index and payload categories raised while resolving a
/// struct only affect that struct; the file stays usable. `TypeMismatch`
/// and `NoSuchField` are accessor-level and always recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GffErrorKind {
    /// Bad tag or version in the header
    HeaderInvalid,
    /// Label, field, field-indices, struct or list index beyond its table
    IndexOutOfRange,
    /// Declared payload size inconsistent with the data
    MalformedPayload,
    /// Run-length overflow in the list-indices area
    ListIndicesBroken,
    /// Field present but of the wrong type category
    TypeMismatch,
    /// Required struct or list field absent
    NoSuchField,
    /// Field type tag not known to the decoder
    UnknownFieldType,
    /// Resource locator could not find the requested resource
    ResourceNotFound,
    /// Underlying stream failure
    Io,
}

/// Errors produced while loading or reading a GFF file
#[derive(Debug, Error)]
pub enum GffError {
    /// Header tag differs from the one the caller expects
    #[error(
        "invalid GFF tag: expected '{}', got '{}'",
        String::from_utf8_lossy(.expected),
        String::from_utf8_lossy(.actual)
    )]
    InvalidTag {
        /// Tag the caller asked for
        expected: [u8; 4],
        /// Tag found in the file
        actual: [u8; 4],
    },

    /// Header version is not an accepted code
    #[error("unsupported GFF version '{}'", String::from_utf8_lossy(.0))]
    UnsupportedVersion([u8; 4]),

    /// Field record carries an unknown type tag
    #[error("unknown field type {0}")]
    UnknownFieldType(u32),

    /// Label index beyond the label table
    #[error("label index out of range ({index}/{count})")]
    LabelIndexOutOfRange {
        /// Index from the field record
        index: u32,
        /// Declared label count
        count: u32,
    },

    /// Field index beyond the field table
    #[error("field index out of range ({index}/{count})")]
    FieldIndexOutOfRange {
        /// Index requested
        index: u32,
        /// Declared field count
        count: u32,
    },

    /// Field-indices run beyond the field-indices table
    #[error(
        "field indices out of range: {field_count} indices at byte {offset} exceed table of {table_size} bytes"
    )]
    FieldIndicesOutOfRange {
        /// Byte offset of the run
        offset: u32,
        /// Number of indices in the run
        field_count: u32,
        /// Declared table size in bytes
        table_size: u32,
    },

    /// Struct index beyond the struct table
    #[error("struct index out of range ({index}/{count})")]
    StructIndexOutOfRange {
        /// Index requested
        index: u32,
        /// Declared struct count
        count: u32,
    },

    /// List-ref offset that does not start a list
    #[error("no list starts at list-indices byte offset {0}")]
    InvalidListOffset(u32),

    /// Run-length in the list-indices area reads past its end
    #[error("list indices broken: run of {run} at word {position} overruns {len} words")]
    ListIndicesBroken {
        /// Word position of the run-length
        position: usize,
        /// Declared run length
        run: u32,
        /// Total number of words in the area
        len: usize,
    },

    /// Blob shorter than its declared size
    #[error("truncated blob: declared {declared} bytes, {available} available")]
    TruncatedBlob {
        /// Declared size
        declared: u32,
        /// Bytes actually read
        available: usize,
    },

    /// String reference whose declared size is not 4
    #[error("malformed string reference: declared size {0}, expected 4")]
    MalformedStrRef(u32),

    /// Localized string payload could not be decoded
    #[error("malformed localized string: {0}")]
    MalformedLocString(String),

    /// Field present but not of a type the getter accepts
    #[error("field '{label}' is {actual}, expected {expected}")]
    TypeMismatch {
        /// Field label
        label: String,
        /// Category the getter accepts
        expected: &'static str,
        /// Actual field type
        actual: GffFieldType,
    },

    /// Required struct or list field absent
    #[error("no such field '{0}'")]
    NoSuchField(String),

    /// Resource locator found nothing
    #[error("resource not found: {name} ({kind})")]
    ResourceNotFound {
        /// Resource name without extension
        name: String,
        /// Resource kind
        kind: ResourceType,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

impl GffError {
    /// Category of this error
    pub const fn kind(&self) -> GffErrorKind {
        match self {
            Self::InvalidTag { .. } | Self::UnsupportedVersion(_) => GffErrorKind::HeaderInvalid,
            Self::LabelIndexOutOfRange { .. }
            | Self::FieldIndexOutOfRange { .. }
            | Self::FieldIndicesOutOfRange { .. }
            | Self::StructIndexOutOfRange { .. }
            | Self::InvalidListOffset(_) => GffErrorKind::IndexOutOfRange,
            Self::TruncatedBlob { .. } | Self::MalformedStrRef(_) | Self::MalformedLocString(_) => {
                GffErrorKind::MalformedPayload
            }
            Self::ListIndicesBroken { .. } => GffErrorKind::ListIndicesBroken,
            Self::TypeMismatch { .. } => GffErrorKind::TypeMismatch,
            Self::NoSuchField(_) => GffErrorKind::NoSuchField,
            Self::UnknownFieldType(_) => GffErrorKind::UnknownFieldType,
            Self::ResourceNotFound { .. } => GffErrorKind::ResourceNotFound,
            Self::Io(_) | Self::BinRw(_) => GffErrorKind::Io,
        }
    }
}

/// Result type for GFF operations
pub type GffResult<T> = Result<T, GffError>;
