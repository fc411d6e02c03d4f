//! GFF header structure and parsing

use crate::error::{GffError, GffResult};
use binrw::BinRead;
use std::io::{Read, Seek};

/// Version code of the common GFF revision
pub const GFF_VERSION_V32: [u8; 4] = *b"V3.2";
/// Version code used by later titles with a different language table
pub const GFF_VERSION_V33: [u8; 4] = *b"V3.3";
/// Versions accepted by default
pub const DEFAULT_VERSIONS: [[u8; 4]; 2] = [GFF_VERSION_V32, GFF_VERSION_V33];

/// Size of the header in bytes
pub const HEADER_SIZE: u64 = 56;
/// Size of one struct table entry
pub const STRUCT_ENTRY_SIZE: u64 = 12;
/// Size of one field table entry
pub const FIELD_ENTRY_SIZE: u64 = 12;
/// Size of one label slot
pub const LABEL_SIZE: u64 = 16;

/// GFF file header (56 bytes)
///
/// Tag and version are four-character codes stored in reading order; the
/// twelve table words are little-endian. Offsets are absolute. Struct, field
/// and label counts are element counts, field-data, field-indices and
/// list-indices counts are byte sizes.
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct GffHeader {
    /// Content kind tag, e.g. `UTC `
    pub tag: [u8; 4],
    /// Format version, e.g. `V3.2`
    pub version: [u8; 4],
    /// Struct table offset
    pub struct_offset: u32,
    /// Number of structs
    pub struct_count: u32,
    /// Field table offset
    pub field_offset: u32,
    /// Number of fields
    pub field_count: u32,
    /// Label table offset
    pub label_offset: u32,
    /// Number of labels
    pub label_count: u32,
    /// Field data area offset
    pub field_data_offset: u32,
    /// Field data area size in bytes
    pub field_data_count: u32,
    /// Field indices table offset
    pub field_indices_offset: u32,
    /// Field indices table size in bytes
    pub field_indices_count: u32,
    /// List indices area offset
    pub list_indices_offset: u32,
    /// List indices area size in bytes
    pub list_indices_count: u32,
}

impl GffHeader {
    /// Read the header and check it against the expected tag and the
    /// default versions
    pub fn read<R: Read + Seek>(reader: &mut R, expected_tag: [u8; 4]) -> GffResult<Self> {
        Self::read_accepting(reader, expected_tag, &DEFAULT_VERSIONS)
    }

    /// Read the header and check it against the expected tag and the given
    /// version codes
    pub fn read_accepting<R: Read + Seek>(
        reader: &mut R,
        expected_tag: [u8; 4],
        versions: &[[u8; 4]],
    ) -> GffResult<Self> {
        let header = <Self as BinRead>::read(reader)?;
        header.validate(expected_tag, versions)?;
        Ok(header)
    }

    /// Validate tag and version. Table offsets and counts are checked later,
    /// when a table is actually dereferenced.
    pub fn validate(&self, expected_tag: [u8; 4], versions: &[[u8; 4]]) -> GffResult<()> {
        if self.tag != expected_tag {
            return Err(GffError::InvalidTag {
                expected: expected_tag,
                actual: self.tag,
            });
        }
        if !versions.contains(&self.version) {
            return Err(GffError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    /// Tag as text
    pub fn tag_str(&self) -> String {
        String::from_utf8_lossy(&self.tag).into_owned()
    }

    /// Version as text
    pub fn version_str(&self) -> String {
        String::from_utf8_lossy(&self.version).into_owned()
    }

    /// Absolute position of struct table entry `index`
    pub fn struct_position(&self, index: u32) -> u64 {
        u64::from(self.struct_offset) + u64::from(index) * STRUCT_ENTRY_SIZE
    }

    /// Absolute position of field table entry `index`
    pub fn field_position(&self, index: u32) -> u64 {
        u64::from(self.field_offset) + u64::from(index) * FIELD_ENTRY_SIZE
    }

    /// Absolute position of label slot `index`
    pub fn label_position(&self, index: u32) -> u64 {
        u64::from(self.label_offset) + u64::from(index) * LABEL_SIZE
    }

    /// Absolute position of byte `offset` in the field data area
    pub fn field_data_position(&self, offset: u32) -> u64 {
        u64::from(self.field_data_offset) + u64::from(offset)
    }

    /// Absolute position of byte `offset` in the field indices table
    pub fn field_indices_position(&self, offset: u32) -> u64 {
        u64::from(self.field_indices_offset) + u64::from(offset)
    }

    /// Number of 32-bit words in the list indices area
    pub fn list_word_count(&self) -> usize {
        (self.list_indices_count / 4) as usize
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::GffErrorKind;
    use crate::test_utils::{GffImageBuilder, TestStruct, TestValue};
    use proptest::prelude::*;
    use std::io::{Cursor, SeekFrom};

    fn sample_image() -> Vec<u8> {
        GffImageBuilder::new(*b"UTC ")
            .with_struct(TestStruct::new(u32::MAX).field("Tag", TestValue::exo("bandit")))
            .build()
    }

    #[test]
    fn test_header_parsing() {
        let data = sample_image();
        let header = GffHeader::read(&mut Cursor::new(&data), *b"UTC ").unwrap();

        assert_eq!(header.tag, *b"UTC ");
        assert_eq!(header.version, GFF_VERSION_V32);
        assert_eq!(header.struct_offset as u64, HEADER_SIZE);
        assert_eq!(header.struct_count, 1);
        assert_eq!(header.field_count, 1);
        assert_eq!(header.label_count, 1);
        assert_eq!(header.tag_str(), "UTC ");
        assert_eq!(header.version_str(), "V3.2");
    }

    #[test]
    fn test_header_rejects_wrong_tag() {
        let data = sample_image();
        let err = GffHeader::read(&mut Cursor::new(&data), *b"UTI ").unwrap_err();
        assert!(matches!(
            err,
            GffError::InvalidTag {
                expected: [b'U', b'T', b'I', b' '],
                actual: [b'U', b'T', b'C', b' ']
            }
        ));
        assert_eq!(err.kind(), GffErrorKind::HeaderInvalid);
    }

    #[test]
    fn test_header_rejects_unknown_version() {
        let mut data = sample_image();
        data[4..8].copy_from_slice(b"V4.0");
        let err = GffHeader::read(&mut Cursor::new(&data), *b"UTC ").unwrap_err();
        assert!(matches!(err, GffError::UnsupportedVersion(v) if &v == b"V4.0"));
    }

    #[test]
    fn test_header_accepts_v33() {
        let mut data = sample_image();
        data[4..8].copy_from_slice(&GFF_VERSION_V33);
        let header = GffHeader::read(&mut Cursor::new(&data), *b"UTC ").unwrap();
        assert_eq!(header.version, GFF_VERSION_V33);

        let err = GffHeader::read_accepting(&mut Cursor::new(&data), *b"UTC ", &[GFF_VERSION_V32])
            .unwrap_err();
        assert_eq!(err.kind(), GffErrorKind::HeaderInvalid);
    }

    #[test]
    fn test_header_truncated() {
        let data = sample_image();
        let result = GffHeader::read(&mut Cursor::new(&data[..30]), *b"UTC ");
        assert!(matches!(result, Err(GffError::BinRw(_))));
    }

    #[test]
    fn test_positions() {
        let data = sample_image();
        let header = GffHeader::read(&mut Cursor::new(&data), *b"UTC ").unwrap();
        assert_eq!(
            header.field_position(2),
            u64::from(header.field_offset) + 24
        );
        assert_eq!(
            header.label_position(3),
            u64::from(header.label_offset) + 48
        );
        assert_eq!(
            header.field_data_position(7),
            u64::from(header.field_data_offset) + 7
        );
    }

    proptest! {
        #[test]
        fn header_read_is_deterministic(words in prop::collection::vec(any::<u32>(), 12)) {
            let mut data = Vec::new();
            data.extend_from_slice(b"GFF V3.2");
            for word in &words {
                data.extend_from_slice(&word.to_le_bytes());
            }

            let mut cursor = Cursor::new(data);
            let first = GffHeader::read(&mut cursor, *b"GFF ").unwrap();
            cursor.seek(SeekFrom::Start(0)).unwrap();
            let second = GffHeader::read(&mut cursor, *b"GFF ").unwrap();

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.struct_offset, words[0]);
            prop_assert_eq!(first.list_indices_count, words[11]);
        }
    }
}
