//! Structs: lazy field resolution and the typed accessor surface

use crate::error::{GffError, GffResult};
use crate::field::{GffField, GffFieldType};
use crate::file::GffFile;
use crate::header::GffHeader;
use crate::list::GffList;
use crate::locstring::LocString;
use crate::stream::read_bounded;
use crate::value::GffValue;
use binrw::BinRead;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::OnceLock;
use tracing::{trace, warn};

/// Struct table entry as stored on disk
#[derive(Debug, Clone, Copy, BinRead)]
#[br(little)]
pub(crate) struct RawStructEntry {
    pub id: u32,
    pub data_or_index: u32,
    pub field_count: u32,
}

/// Ordered label -> field mapping of one struct
pub(crate) type FieldMap = IndexMap<String, GffField>;

/// One slot of the file's struct arena.
///
/// The field map starts out empty and is filled at most once, under the
/// file's stream lock.
#[derive(Debug)]
pub(crate) struct StructEntry {
    id: u32,
    data_or_index: u32,
    field_count: u32,
    fields: OnceLock<FieldMap>,
}

impl From<RawStructEntry> for StructEntry {
    fn from(raw: RawStructEntry) -> Self {
        Self {
            id: raw.id,
            data_or_index: raw.data_or_index,
            field_count: raw.field_count,
            fields: OnceLock::new(),
        }
    }
}

impl StructEntry {
    pub(crate) fn is_loaded(&self) -> bool {
        self.fields.get().is_some()
    }

    /// Field map, reading it from the stream on first use.
    ///
    /// A failed resolution leaves the entry unloaded so the error is
    /// reported again on the next access.
    pub(crate) fn resolve<R: Read + Seek>(
        &self,
        stream: &Mutex<R>,
        header: &GffHeader,
    ) -> GffResult<&FieldMap> {
        if let Some(fields) = self.fields.get() {
            return Ok(fields);
        }

        let mut reader = stream.lock();
        // Another caller may have finished while we waited for the lock
        if let Some(fields) = self.fields.get() {
            return Ok(fields);
        }

        let fields = self.read_fields(&mut *reader, header)?;
        trace!(
            id = self.id,
            declared = self.field_count,
            resolved = fields.len(),
            "resolved struct fields"
        );
        Ok(self.fields.get_or_init(|| fields))
    }

    fn read_fields<R: Read + Seek>(
        &self,
        reader: &mut R,
        header: &GffHeader,
    ) -> GffResult<FieldMap> {
        let indices = match self.field_count {
            0 => return Ok(FieldMap::new()),
            1 => vec![self.data_or_index],
            count => read_field_indices(reader, header, self.data_or_index, count)?,
        };

        let mut fields = FieldMap::with_capacity(indices.len());
        for index in indices {
            if index >= header.field_count {
                return Err(GffError::FieldIndexOutOfRange {
                    index,
                    count: header.field_count,
                });
            }

            reader.seek(SeekFrom::Start(header.field_position(index)))?;
            let (label, field) = GffField::read_record(reader, header)?;
            if fields.insert(label.clone(), field).is_some() {
                warn!(id = self.id, label = %label, "duplicate label in struct, keeping the last");
            }
        }
        Ok(fields)
    }
}

/// `count` consecutive field indices starting at byte `offset` of the
/// field-indices table
fn read_field_indices<R: Read + Seek>(
    reader: &mut R,
    header: &GffHeader,
    offset: u32,
    count: u32,
) -> GffResult<Vec<u32>> {
    let byte_len = u64::from(count) * 4;
    if u64::from(offset) + byte_len > u64::from(header.field_indices_count) {
        return Err(GffError::FieldIndicesOutOfRange {
            offset,
            field_count: count,
            table_size: header.field_indices_count,
        });
    }

    reader.seek(SeekFrom::Start(header.field_indices_position(offset)))?;
    let bytes = read_bounded(reader, byte_len)?;
    if (bytes.len() as u64) < byte_len {
        return Err(GffError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "field indices extend past end of stream",
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

fn type_mismatch(label: &str, expected: &'static str, actual: GffFieldType) -> GffError {
    GffError::TypeMismatch {
        label: label.to_string(),
        expected,
        actual,
    }
}

/// Handle to one struct of a [`GffFile`].
///
/// Handles are cheap copies of an index; the fields themselves live in the
/// file and are resolved on the first accessor call. Getters return the
/// caller's default when the label is absent and
/// [`GffError::TypeMismatch`] when the field exists but belongs to another
/// type category.
pub struct GffStruct<'a, R> {
    file: &'a GffFile<R>,
    entry: &'a StructEntry,
    index: u32,
}

impl<R> Clone for GffStruct<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for GffStruct<'_, R> {}

impl<R> fmt::Debug for GffStruct<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GffStruct")
            .field("index", &self.index)
            .field("id", &self.entry.id)
            .field("field_count", &self.entry.field_count)
            .field("loaded", &self.entry.is_loaded())
            .finish()
    }
}

impl<'a, R: Read + Seek> GffStruct<'a, R> {
    pub(crate) fn new(file: &'a GffFile<R>, entry: &'a StructEntry, index: u32) -> Self {
        Self { file, entry, index }
    }

    /// Position in the file's struct table
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Engine-defined struct id
    pub fn id(&self) -> u32 {
        self.entry.id
    }

    /// Field count declared in the struct table
    pub fn field_count(&self) -> u32 {
        self.entry.field_count
    }

    /// Whether the fields have been read yet
    pub fn is_loaded(&self) -> bool {
        self.entry.is_loaded()
    }

    /// Resolve the fields now instead of on first access
    pub fn ensure_loaded(&self) -> GffResult<()> {
        self.map().map(|_| ())
    }

    fn map(&self) -> GffResult<&'a FieldMap> {
        self.entry.resolve(self.file.stream(), self.file.header())
    }

    /// Labels in table order
    pub fn labels(&self) -> GffResult<impl Iterator<Item = &'a str> + use<'a, R>> {
        Ok(self.map()?.keys().map(String::as_str))
    }

    /// `(label, field)` pairs in table order
    pub fn fields(&self) -> GffResult<impl Iterator<Item = (&'a str, GffField)> + use<'a, R>> {
        Ok(self
            .map()?
            .iter()
            .map(|(label, field)| (label.as_str(), *field)))
    }

    /// Whether a field with this label exists
    pub fn has_field(&self, label: &str) -> GffResult<bool> {
        Ok(self.map()?.contains_key(label))
    }

    /// Raw field record
    pub fn field(&self, label: &str) -> GffResult<Option<GffField>> {
        Ok(self.map()?.get(label).copied())
    }

    /// Type of the field, if present
    pub fn field_type(&self, label: &str) -> GffResult<Option<GffFieldType>> {
        Ok(self.field(label)?.map(|field| field.field_type()))
    }

    /// Decoded value of any type
    pub fn value(&self, label: &str) -> GffResult<Option<GffValue>> {
        self.field(label)?
            .map(|field| self.file.read_value(&field))
            .transpose()
    }

    fn typed_value(
        &self,
        label: &str,
        expected: &'static str,
        accepts: fn(GffFieldType) -> bool,
    ) -> GffResult<Option<GffValue>> {
        match self.map()?.get(label) {
            None => Ok(None),
            Some(field) if accepts(field.field_type()) => self.file.read_value(field).map(Some),
            Some(field) => Err(type_mismatch(label, expected, field.field_type())),
        }
    }

    fn required_field(&self, label: &str, expected: GffFieldType) -> GffResult<GffField> {
        let field = self
            .field(label)?
            .ok_or_else(|| GffError::NoSuchField(label.to_string()))?;
        if field.field_type() != expected {
            return Err(type_mismatch(label, expected.name(), field.field_type()));
        }
        Ok(field)
    }

    /// Character value; char fields are taken as Latin-1, byte fields too
    pub fn get_char(&self, label: &str, default: char) -> GffResult<char> {
        match self.typed_value(label, "char", |t| {
            matches!(t, GffFieldType::Char | GffFieldType::Byte)
        })? {
            None => Ok(default),
            Some(GffValue::Char(v)) => Ok(char::from(v as u8)),
            Some(GffValue::Byte(v)) => Ok(char::from(v)),
            Some(other) => Err(type_mismatch(label, "char", other.field_type())),
        }
    }

    /// Integer value widened to `u64`; signed types are sign-extended first
    pub fn get_uint(&self, label: &str, default: u64) -> GffResult<u64> {
        match self.typed_value(label, "integer", GffFieldType::is_integer)? {
            None => Ok(default),
            Some(value) => value
                .as_u64()
                .ok_or_else(|| type_mismatch(label, "integer", value.field_type())),
        }
    }

    /// Integer value as `i64`
    pub fn get_sint(&self, label: &str, default: i64) -> GffResult<i64> {
        match self.typed_value(label, "integer", GffFieldType::is_integer)? {
            None => Ok(default),
            Some(value) => value
                .as_i64()
                .ok_or_else(|| type_mismatch(label, "integer", value.field_type())),
        }
    }

    /// Integer value as a flag, non-zero meaning true
    pub fn get_bool(&self, label: &str, default: bool) -> GffResult<bool> {
        self.get_uint(label, u64::from(default)).map(|v| v != 0)
    }

    /// Float or double value
    pub fn get_double(&self, label: &str, default: f64) -> GffResult<f64> {
        match self.typed_value(label, "float", GffFieldType::is_float)? {
            None => Ok(default),
            Some(value) => value
                .as_f64()
                .ok_or_else(|| type_mismatch(label, "float", value.field_type())),
        }
    }

    /// Text of a string field, or the textual form of a numeric, vector,
    /// orientation or localized-string field.
    ///
    /// A localized string without embedded strings yields the default.
    pub fn get_string(&self, label: &str, default: &str) -> GffResult<String> {
        match self.typed_value(label, "text", GffFieldType::is_textual)? {
            None => Ok(default.to_string()),
            Some(GffValue::LocString(loc)) => Ok(loc.preferred().unwrap_or(default).to_string()),
            Some(value) => value
                .to_text()
                .ok_or_else(|| type_mismatch(label, "text", value.field_type())),
        }
    }

    /// Localized string, `None` when absent
    pub fn get_loc_string(&self, label: &str) -> GffResult<Option<LocString>> {
        match self.typed_value(label, "locstring", |t| t == GffFieldType::LocString)? {
            None => Ok(None),
            Some(GffValue::LocString(loc)) => Ok(Some(loc)),
            Some(other) => Err(type_mismatch(label, "locstring", other.field_type())),
        }
    }

    /// Binary blob, `None` when absent
    pub fn get_data(&self, label: &str) -> GffResult<Option<Vec<u8>>> {
        match self.typed_value(label, "void", |t| t == GffFieldType::Void)? {
            None => Ok(None),
            Some(GffValue::Void(bytes)) => Ok(Some(bytes)),
            Some(other) => Err(type_mismatch(label, "void", other.field_type())),
        }
    }

    /// Vector value
    pub fn get_vector(&self, label: &str, default: [f32; 3]) -> GffResult<[f32; 3]> {
        match self.typed_value(label, "vector", |t| t == GffFieldType::Vector)? {
            None => Ok(default),
            Some(GffValue::Vector(v)) => Ok(v),
            Some(other) => Err(type_mismatch(label, "vector", other.field_type())),
        }
    }

    /// Orientation quaternion
    pub fn get_orientation(&self, label: &str, default: [f32; 4]) -> GffResult<[f32; 4]> {
        match self.typed_value(label, "orientation", |t| t == GffFieldType::Orientation)? {
            None => Ok(default),
            Some(GffValue::Orientation(v)) => Ok(v),
            Some(other) => Err(type_mismatch(label, "orientation", other.field_type())),
        }
    }

    /// Nested struct.
    ///
    /// Fails with [`GffError::NoSuchField`] when absent; there is no default.
    pub fn get_struct(&self, label: &str) -> GffResult<GffStruct<'a, R>> {
        let field = self.required_field(label, GffFieldType::Struct)?;
        self.file.get_struct(field.data())
    }

    /// Nested list.
    ///
    /// Fails with [`GffError::NoSuchField`] when absent; there is no default.
    pub fn get_list(&self, label: &str) -> GffResult<GffList<'a, R>> {
        let field = self.required_field(label, GffFieldType::List)?;
        self.file.list_at_offset(field.data())
    }
}
