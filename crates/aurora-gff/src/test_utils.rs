//! Test utilities for assembling GFF images in memory
//!
//! Images are laid out as header, struct table, field table, labels, field
//! indices, list indices and finally field data, so a payload that claims
//! more bytes than it has runs into end of stream.

use crate::field::GffFieldType;
use crate::header::{GFF_VERSION_V32, GffHeader, HEADER_SIZE};
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Field value as written by the builder
#[derive(Debug, Clone)]
pub enum TestValue {
    Byte(u8),
    Char(i8),
    Uint16(u16),
    Sint16(i16),
    Uint32(u32),
    Sint32(i32),
    Uint64(u64),
    Sint64(i64),
    Float(f32),
    Double(f64),
    ExoString(String),
    ResRef(String),
    LocString {
        string_ref: u32,
        strings: Vec<(u32, String)>,
    },
    Void(Vec<u8>),
    /// Struct table index
    Struct(u32),
    /// Member struct indices; the list is appended to the list area
    List(Vec<u32>),
    Orientation([f32; 4]),
    Vector([f32; 3]),
    StrRef(u32),
    /// Field record written verbatim, no label is added
    Record {
        type_tag: u32,
        label_index: u32,
        data: u32,
    },
    /// Extended field with a hand-made payload
    Extended { type_tag: u32, payload: Vec<u8> },
}

impl TestValue {
    pub fn exo(text: &str) -> Self {
        Self::ExoString(text.to_string())
    }
}

/// Struct to be written by the builder
#[derive(Debug, Clone)]
pub struct TestStruct {
    id: u32,
    fields: Vec<(String, TestValue)>,
    raw: Option<(u32, u32)>,
}

impl TestStruct {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            fields: Vec::new(),
            raw: None,
        }
    }

    /// Struct entry with a hand-made `(data_or_index, field_count)` pair
    pub fn raw(id: u32, data_or_index: u32, field_count: u32) -> Self {
        Self {
            id,
            fields: Vec::new(),
            raw: Some((data_or_index, field_count)),
        }
    }

    pub fn field(mut self, label: &str, value: TestValue) -> Self {
        self.fields.push((label.to_string(), value));
        self
    }
}

/// Builds complete GFF images
#[derive(Debug, Clone)]
pub struct GffImageBuilder {
    tag: [u8; 4],
    version: [u8; 4],
    structs: Vec<TestStruct>,
    raw_list_indices: Option<Vec<u32>>,
}

#[derive(Default)]
struct Tables {
    structs: Vec<[u32; 3]>,
    fields: Vec<[u32; 3]>,
    labels: Vec<String>,
    field_indices: Vec<u32>,
    list_indices: Vec<u32>,
    field_data: Vec<u8>,
}

impl Tables {
    fn label(&mut self, label: &str) -> u32 {
        if let Some(index) = self.labels.iter().position(|l| l == label) {
            return index as u32;
        }
        self.labels.push(label.to_string());
        (self.labels.len() - 1) as u32
    }

    fn extended(&mut self, payload: &[u8]) -> u32 {
        let offset = self.field_data.len() as u32;
        self.field_data.extend_from_slice(payload);
        offset
    }

    fn record(&mut self, label: &str, value: &TestValue) -> [u32; 3] {
        let (field_type, data) = match value {
            TestValue::Record {
                type_tag,
                label_index,
                data,
            } => return [*type_tag, *label_index, *data],
            TestValue::Extended { type_tag, payload } => {
                let label_index = self.label(label);
                return [*type_tag, label_index, self.extended(payload)];
            }
            TestValue::Byte(v) => (GffFieldType::Byte, u32::from(*v)),
            TestValue::Char(v) => (GffFieldType::Char, u32::from(*v as u8)),
            TestValue::Uint16(v) => (GffFieldType::Uint16, u32::from(*v)),
            TestValue::Sint16(v) => (GffFieldType::Sint16, u32::from(*v as u16)),
            TestValue::Uint32(v) => (GffFieldType::Uint32, *v),
            TestValue::Sint32(v) => (GffFieldType::Sint32, *v as u32),
            TestValue::Float(v) => (GffFieldType::Float, v.to_bits()),
            TestValue::Struct(index) => (GffFieldType::Struct, *index),
            TestValue::List(members) => {
                let offset = (self.list_indices.len() * 4) as u32;
                self.list_indices.push(members.len() as u32);
                self.list_indices.extend_from_slice(members);
                (GffFieldType::List, offset)
            }
            TestValue::Uint64(v) => (GffFieldType::Uint64, self.extended(&v.to_le_bytes())),
            TestValue::Sint64(v) => (GffFieldType::Sint64, self.extended(&v.to_le_bytes())),
            TestValue::Double(v) => (GffFieldType::Double, self.extended(&v.to_le_bytes())),
            TestValue::ExoString(s) => {
                let mut payload = (s.len() as u32).to_le_bytes().to_vec();
                payload.extend_from_slice(s.as_bytes());
                (GffFieldType::ExoString, self.extended(&payload))
            }
            TestValue::ResRef(s) => {
                let mut payload = vec![s.len() as u8];
                payload.extend_from_slice(s.as_bytes());
                (GffFieldType::ResRef, self.extended(&payload))
            }
            TestValue::LocString {
                string_ref,
                strings,
            } => {
                let mut body = Vec::new();
                body.extend_from_slice(&string_ref.to_le_bytes());
                body.extend_from_slice(&(strings.len() as u32).to_le_bytes());
                for (id, text) in strings {
                    body.extend_from_slice(&id.to_le_bytes());
                    body.extend_from_slice(&(text.len() as u32).to_le_bytes());
                    body.extend_from_slice(text.as_bytes());
                }
                let mut payload = (body.len() as u32).to_le_bytes().to_vec();
                payload.extend_from_slice(&body);
                (GffFieldType::LocString, self.extended(&payload))
            }
            TestValue::Void(bytes) => {
                let mut payload = (bytes.len() as u32).to_le_bytes().to_vec();
                payload.extend_from_slice(bytes);
                (GffFieldType::Void, self.extended(&payload))
            }
            TestValue::Orientation(v) => {
                let payload: Vec<u8> = v.iter().flat_map(|f| f.to_le_bytes()).collect();
                (GffFieldType::Orientation, self.extended(&payload))
            }
            TestValue::Vector(v) => {
                let payload: Vec<u8> = v.iter().flat_map(|f| f.to_le_bytes()).collect();
                (GffFieldType::Vector, self.extended(&payload))
            }
            TestValue::StrRef(v) => {
                let mut payload = 4u32.to_le_bytes().to_vec();
                payload.extend_from_slice(&v.to_le_bytes());
                (GffFieldType::StrRef, self.extended(&payload))
            }
        };
        [field_type as u32, self.label(label), data]
    }
}

impl GffImageBuilder {
    pub fn new(tag: [u8; 4]) -> Self {
        Self {
            tag,
            version: GFF_VERSION_V32,
            structs: Vec::new(),
            raw_list_indices: None,
        }
    }

    pub fn with_struct(mut self, s: TestStruct) -> Self {
        self.structs.push(s);
        self
    }

    /// Replace the generated list area with raw words
    pub fn with_raw_list_indices(mut self, words: Vec<u32>) -> Self {
        self.raw_list_indices = Some(words);
        self
    }

    /// Header of an image with no tables at all
    pub fn empty_header() -> GffHeader {
        let offset = HEADER_SIZE as u32;
        GffHeader {
            tag: *b"GFF ",
            version: GFF_VERSION_V32,
            struct_offset: offset,
            struct_count: 0,
            field_offset: offset,
            field_count: 0,
            label_offset: offset,
            label_count: 0,
            field_data_offset: offset,
            field_data_count: 0,
            field_indices_offset: offset,
            field_indices_count: 0,
            list_indices_offset: offset,
            list_indices_count: 0,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut tables = Tables::default();

        for s in &self.structs {
            if let Some((data_or_index, field_count)) = s.raw {
                tables.structs.push([s.id, data_or_index, field_count]);
                continue;
            }

            let mut indices = Vec::with_capacity(s.fields.len());
            for (label, value) in &s.fields {
                let record = tables.record(label, value);
                indices.push(tables.fields.len() as u32);
                tables.fields.push(record);
            }

            let entry = match indices.len() {
                0 => [s.id, 0, 0],
                1 => [s.id, indices[0], 1],
                n => {
                    let offset = (tables.field_indices.len() * 4) as u32;
                    tables.field_indices.extend_from_slice(&indices);
                    [s.id, offset, n as u32]
                }
            };
            tables.structs.push(entry);
        }

        if let Some(words) = &self.raw_list_indices {
            tables.list_indices.clone_from(words);
        }

        let struct_offset = HEADER_SIZE as u32;
        let field_offset = struct_offset + tables.structs.len() as u32 * 12;
        let label_offset = field_offset + tables.fields.len() as u32 * 12;
        let field_indices_offset = label_offset + tables.labels.len() as u32 * 16;
        let list_indices_offset = field_indices_offset + tables.field_indices.len() as u32 * 4;
        let field_data_offset = list_indices_offset + tables.list_indices.len() as u32 * 4;

        let mut out = Vec::new();
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.version);
        for word in [
            struct_offset,
            tables.structs.len() as u32,
            field_offset,
            tables.fields.len() as u32,
            label_offset,
            tables.labels.len() as u32,
            field_data_offset,
            tables.field_data.len() as u32,
            field_indices_offset,
            tables.field_indices.len() as u32 * 4,
            list_indices_offset,
            tables.list_indices.len() as u32 * 4,
        ] {
            out.extend_from_slice(&word.to_le_bytes());
        }

        for word in tables.structs.iter().chain(&tables.fields).flatten() {
            out.extend_from_slice(&word.to_le_bytes());
        }
        for label in &tables.labels {
            let mut slot = [0u8; 16];
            slot[..label.len()].copy_from_slice(label.as_bytes());
            out.extend_from_slice(&slot);
        }
        for word in tables.field_indices.iter().chain(&tables.list_indices) {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out.extend_from_slice(&tables.field_data);
        out
    }
}

/// Shared count of `read` calls made through a [`CountingReader`]
#[derive(Debug, Clone, Default)]
pub struct ReadCounter(Arc<AtomicUsize>);

impl ReadCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// In-memory stream that counts reads
#[derive(Debug)]
pub struct CountingReader {
    inner: Cursor<Vec<u8>>,
    reads: ReadCounter,
}

impl CountingReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            inner: Cursor::new(data),
            reads: ReadCounter::default(),
        }
    }

    pub fn counter(&self) -> ReadCounter {
        self.reads.clone()
    }
}

impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads.0.fetch_add(1, Ordering::SeqCst);
        self.inner.read(buf)
    }
}

impl Seek for CountingReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
