//! List-indices area decoding
//!
//! The area is a flat run-length encoding: a count `n` followed by `n`
//! struct indices, repeated to the end. A list field refers to its list by
//! the byte offset of the count word, so decoding also builds a table from
//! word position to list index.

use crate::error::{GffError, GffResult};
use crate::file::GffFile;
use crate::header::GffHeader;
use crate::stream::read_bounded;
use crate::structure::GffStruct;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use tracing::debug;

/// Every list of a file plus the offset translation table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTable {
    lists: Vec<Vec<u32>>,
    /// Word position -> list index; `None` where no list starts
    position_to_list: Vec<Option<usize>>,
}

impl ListTable {
    /// Decode a raw word array.
    ///
    /// Fails with [`GffError::ListIndicesBroken`] when a run would read past
    /// the end of the array.
    pub fn decode(raw: &[u32]) -> GffResult<Self> {
        let mut lists = Vec::new();
        let mut position_to_list = vec![None; raw.len()];

        let mut position = 0;
        while position < raw.len() {
            let run = raw[position];
            let start = position + 1;
            let end = start
                .checked_add(run as usize)
                .filter(|&end| end <= raw.len())
                .ok_or(GffError::ListIndicesBroken {
                    position,
                    run,
                    len: raw.len(),
                })?;

            position_to_list[position] = Some(lists.len());
            lists.push(raw[start..end].to_vec());
            position = end;
        }

        Ok(Self {
            lists,
            position_to_list,
        })
    }

    /// Read and decode the list-indices area described by `header`
    pub fn read<R: Read + Seek>(reader: &mut R, header: &GffHeader) -> GffResult<Self> {
        let words = header.list_word_count();
        if words == 0 {
            return Ok(Self::default());
        }

        reader.seek(SeekFrom::Start(u64::from(header.list_indices_offset)))?;
        let bytes = read_bounded(reader, words as u64 * 4)?;
        if bytes.len() < words * 4 {
            return Err(GffError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "list indices area extends past end of stream",
            )));
        }

        let raw: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        let table = Self::decode(&raw)?;
        debug!(words, lists = table.len(), "decoded list indices");
        Ok(table)
    }

    /// Check every member against the struct table size
    pub fn validate_members(&self, struct_count: u32) -> GffResult<()> {
        for &index in self.lists.iter().flatten() {
            if index >= struct_count {
                return Err(GffError::StructIndexOutOfRange {
                    index,
                    count: struct_count,
                });
            }
        }
        Ok(())
    }

    /// Number of lists
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Whether there are no lists
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Struct indices of list `index`
    pub fn get(&self, index: usize) -> Option<&[u32]> {
        self.lists.get(index).map(Vec::as_slice)
    }

    /// List starting at word `position`, if any
    pub fn index_at_position(&self, position: usize) -> Option<usize> {
        self.position_to_list.get(position).copied().flatten()
    }

    /// Translate the byte offset stored in a list field to a list index
    pub fn index_for_offset(&self, offset: u32) -> GffResult<usize> {
        if offset % 4 != 0 {
            return Err(GffError::InvalidListOffset(offset));
        }
        self.index_at_position((offset / 4) as usize)
            .ok_or(GffError::InvalidListOffset(offset))
    }

    /// Iterate over all lists in area order
    pub fn iter(&self) -> impl Iterator<Item = &[u32]> {
        self.lists.iter().map(Vec::as_slice)
    }
}

/// Handle to one list of a [`GffFile`]
pub struct GffList<'a, R> {
    file: &'a GffFile<R>,
    index: usize,
    members: &'a [u32],
}

impl<R> Clone for GffList<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for GffList<'_, R> {}

impl<R> fmt::Debug for GffList<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GffList")
            .field("index", &self.index)
            .field("members", &self.members)
            .finish()
    }
}

impl<'a, R: Read + Seek> GffList<'a, R> {
    pub(crate) fn new(file: &'a GffFile<R>, index: usize, members: &'a [u32]) -> Self {
        Self {
            file,
            index,
            members,
        }
    }

    /// Position of this list in area order
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of member structs
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the list has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Struct table indices of the members
    pub fn struct_indices(&self) -> &'a [u32] {
        self.members
    }

    /// Member at `position`
    pub fn get(&self, position: usize) -> Option<GffStruct<'a, R>> {
        let index = *self.members.get(position)?;
        self.file.get_struct(index).ok()
    }

    /// Iterate over the member structs in order
    pub fn iter(&self) -> impl Iterator<Item = GffStruct<'a, R>> + use<'a, R> {
        let file = self.file;
        self.members
            .iter()
            .filter_map(move |&index| file.get_struct(index).ok())
    }
}
