//! GFF file loading and the struct/list arena

use crate::error::{GffError, GffResult};
use crate::field::GffField;
use crate::header::{DEFAULT_VERSIONS, GffHeader};
use crate::list::{GffList, ListTable};
use crate::locstring::{AuroraLocStringDecoder, LocStringDecoder};
use crate::resource::{ResourceLocator, ResourceType};
use crate::structure::{GffStruct, RawStructEntry, StructEntry};
use crate::value::GffValue;
use binrw::BinRead;
use parking_lot::Mutex;
use std::fmt;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;
use tracing::debug;

/// Options controlling how a file is loaded
#[derive(Clone)]
pub struct GffOptions {
    expected_tag: [u8; 4],
    versions: Vec<[u8; 4]>,
    loc_strings: Arc<dyn LocStringDecoder>,
}

impl GffOptions {
    /// Options expecting `tag`, accepting `V3.2` and `V3.3`, with the
    /// standard localized-string layout
    pub fn new(expected_tag: [u8; 4]) -> Self {
        Self {
            expected_tag,
            versions: DEFAULT_VERSIONS.to_vec(),
            loc_strings: Arc::new(AuroraLocStringDecoder),
        }
    }

    /// Options for a resource kind
    pub fn for_kind(kind: ResourceType) -> Self {
        Self::new(kind.tag())
    }

    /// Replace the accepted version codes
    pub fn with_versions(mut self, versions: impl IntoIterator<Item = [u8; 4]>) -> Self {
        self.versions = versions.into_iter().collect();
        self
    }

    /// Delegate localized-string payloads to another decoder
    pub fn with_loc_string_decoder(mut self, decoder: Arc<dyn LocStringDecoder>) -> Self {
        self.loc_strings = decoder;
        self
    }

    /// Tag the header must carry
    pub fn expected_tag(&self) -> [u8; 4] {
        self.expected_tag
    }

    /// Accepted version codes
    pub fn versions(&self) -> &[[u8; 4]] {
        &self.versions
    }
}

impl fmt::Debug for GffOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GffOptions")
            .field("expected_tag", &String::from_utf8_lossy(&self.expected_tag))
            .field(
                "versions",
                &self
                    .versions
                    .iter()
                    .map(|v| String::from_utf8_lossy(v).into_owned())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// A loaded GFF file.
///
/// Loading reads the header, the struct table and the list-indices area.
/// Struct fields and extended values are read on demand from the owned
/// stream, which sits behind a lock so handles can be used from several
/// threads.
pub struct GffFile<R> {
    header: GffHeader,
    stream: Mutex<R>,
    structs: Vec<StructEntry>,
    lists: ListTable,
    loc_strings: Arc<dyn LocStringDecoder>,
}

impl GffFile<Cursor<Vec<u8>>> {
    /// Load from an in-memory image
    pub fn from_bytes(data: Vec<u8>, expected_tag: [u8; 4]) -> GffResult<Self> {
        Self::load(Cursor::new(data), expected_tag)
    }
}

impl<R: Read + Seek> GffFile<R> {
    /// Load with default options
    pub fn load(stream: R, expected_tag: [u8; 4]) -> GffResult<Self> {
        Self::load_with(stream, &GffOptions::new(expected_tag))
    }

    /// Load a resource through a locator, expecting the kind's tag
    pub fn open<L>(locator: &L, name: &str, kind: ResourceType) -> GffResult<Self>
    where
        L: ResourceLocator<Stream = R> + ?Sized,
    {
        let stream = locator.open(name, kind)?;
        Self::load_with(stream, &GffOptions::for_kind(kind))
    }

    /// Load the header, struct table and lists.
    ///
    /// Any failure drops the stream and everything read so far.
    pub fn load_with(mut stream: R, options: &GffOptions) -> GffResult<Self> {
        stream.seek(SeekFrom::Start(0))?;
        let header =
            GffHeader::read_accepting(&mut stream, options.expected_tag, &options.versions)?;

        stream.seek(SeekFrom::Start(u64::from(header.struct_offset)))?;
        let mut structs = Vec::with_capacity(header.struct_count.min(4096) as usize);
        for _ in 0..header.struct_count {
            structs.push(StructEntry::from(RawStructEntry::read(&mut stream)?));
        }

        let lists = ListTable::read(&mut stream, &header)?;
        lists.validate_members(header.struct_count)?;

        debug!(
            tag = %header.tag_str(),
            version = %header.version_str(),
            structs = header.struct_count,
            fields = header.field_count,
            labels = header.label_count,
            lists = lists.len(),
            "loaded GFF file"
        );

        Ok(Self {
            header,
            stream: Mutex::new(stream),
            structs,
            lists,
            loc_strings: Arc::clone(&options.loc_strings),
        })
    }

    /// File header
    pub fn header(&self) -> &GffHeader {
        &self.header
    }

    /// Number of structs
    pub fn struct_count(&self) -> usize {
        self.structs.len()
    }

    /// Number of lists
    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    /// Number of structs whose fields have been read
    pub fn loaded_struct_count(&self) -> usize {
        self.structs.iter().filter(|s| s.is_loaded()).count()
    }

    /// Root struct (index 0)
    pub fn top_level(&self) -> GffResult<GffStruct<'_, R>> {
        self.get_struct(0)
    }

    /// Struct by table index
    pub fn get_struct(&self, index: u32) -> GffResult<GffStruct<'_, R>> {
        let entry = self
            .structs
            .get(index as usize)
            .ok_or(GffError::StructIndexOutOfRange {
                index,
                count: self.header.struct_count,
            })?;
        Ok(GffStruct::new(self, entry, index))
    }

    /// List by position in the list-indices area order
    pub fn list(&self, index: usize) -> Option<GffList<'_, R>> {
        self.lists
            .get(index)
            .map(|members| GffList::new(self, index, members))
    }

    /// List referenced by a list field's byte offset
    pub fn list_at_offset(&self, offset: u32) -> GffResult<GffList<'_, R>> {
        let index = self.lists.index_for_offset(offset)?;
        self.list(index).ok_or(GffError::InvalidListOffset(offset))
    }

    /// Give back the stream
    pub fn into_inner(self) -> R {
        self.stream.into_inner()
    }

    pub(crate) fn stream(&self) -> &Mutex<R> {
        &self.stream
    }

    /// Decode a field of this file, holding the stream lock for the read
    pub(crate) fn read_value(&self, field: &GffField) -> GffResult<GffValue> {
        let mut stream = self.stream.lock();
        field.read_value(&mut *stream, &self.header, self.loc_strings.as_ref())
    }
}

impl<R> fmt::Debug for GffFile<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GffFile")
            .field("tag", &self.header.tag_str())
            .field("version", &self.header.version_str())
            .field("structs", &self.structs.len())
            .field("lists", &self.lists.len())
            .finish_non_exhaustive()
    }
}
