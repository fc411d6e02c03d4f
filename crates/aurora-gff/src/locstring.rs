//! Localized strings and the decoder they are delegated to

use crate::error::{GffError, GffResult};
use crate::stream::{read_text, read_u32_le};
use std::collections::BTreeMap;
use std::io::{self, Read};

/// String reference meaning "no talk table entry"
pub const NO_STRING_REF: u32 = 0xFFFF_FFFF;

/// Languages of the Aurora language table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Language {
    /// English
    English = 0,
    /// French
    French = 1,
    /// German
    German = 2,
    /// Italian
    Italian = 3,
    /// Spanish
    Spanish = 4,
    /// Polish
    Polish = 5,
    /// Korean
    Korean = 128,
    /// Traditional Chinese
    ChineseTraditional = 129,
    /// Simplified Chinese
    ChineseSimplified = 130,
    /// Japanese
    Japanese = 131,
}

/// Grammatical gender of a localized string variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Gender {
    /// Male or neutral
    Male = 0,
    /// Female
    Female = 1,
}

/// Combined on-disk string id: `language * 2 + gender`
pub const fn string_id(language: Language, gender: Gender) -> u32 {
    language as u32 * 2 + gender as u32
}

/// A string reference plus any number of embedded per-language strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocString {
    string_ref: u32,
    strings: BTreeMap<u32, String>,
}

impl LocString {
    /// Create an empty localized string with the given reference
    pub fn new(string_ref: u32) -> Self {
        Self {
            string_ref,
            strings: BTreeMap::new(),
        }
    }

    /// Talk table reference, [`NO_STRING_REF`] when absent
    pub fn string_ref(&self) -> u32 {
        self.string_ref
    }

    /// Whether the talk table reference is set
    pub fn has_string_ref(&self) -> bool {
        self.string_ref != NO_STRING_REF
    }

    /// Add or replace an embedded string
    pub fn insert(&mut self, language: Language, gender: Gender, text: String) {
        self.strings.insert(string_id(language, gender), text);
    }

    /// Add or replace an embedded string by raw id
    pub fn insert_raw(&mut self, id: u32, text: String) {
        self.strings.insert(id, text);
    }

    /// Embedded string for a language and gender
    pub fn get(&self, language: Language, gender: Gender) -> Option<&str> {
        self.get_raw(string_id(language, gender))
    }

    /// Embedded string by raw id
    pub fn get_raw(&self, id: u32) -> Option<&str> {
        self.strings.get(&id).map(String::as_str)
    }

    /// English male string if present, otherwise the one with the lowest id
    pub fn preferred(&self) -> Option<&str> {
        self.get(Language::English, Gender::Male)
            .or_else(|| self.strings.values().next().map(String::as_str))
    }

    /// Number of embedded strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether there are no embedded strings
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterate `(id, text)` in id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.strings.iter().map(|(id, s)| (*id, s.as_str()))
    }
}

/// Decodes the payload of a localized-string field.
///
/// The reader is bounded to the size declared in front of the payload, so
/// an implementation cannot read into the next value.
pub trait LocStringDecoder: Send + Sync {
    /// Decode one localized string
    fn decode(&self, reader: &mut dyn Read) -> GffResult<LocString>;
}

/// Standard Aurora layout: `u32 strref`, `u32 count`, then `count` entries
/// of `u32 id`, `u32 length`, `length` bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuroraLocStringDecoder;

impl LocStringDecoder for AuroraLocStringDecoder {
    fn decode(&self, reader: &mut dyn Read) -> GffResult<LocString> {
        let string_ref = read_u32_le(reader).map_err(truncated)?;
        let count = read_u32_le(reader).map_err(truncated)?;

        let mut loc = LocString::new(string_ref);
        for _ in 0..count {
            let id = read_u32_le(reader).map_err(truncated)?;
            let len = read_u32_le(reader).map_err(truncated)?;
            let text = read_text(reader, len as usize).map_err(truncated)?;
            loc.insert_raw(id, text);
        }
        Ok(loc)
    }
}

fn truncated(err: io::Error) -> GffError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        GffError::MalformedLocString("payload shorter than its entries declare".to_string())
    } else {
        GffError::Io(err)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::GffErrorKind;
    use std::io::Cursor;

    fn encode(string_ref: u32, entries: &[(u32, &str)]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&string_ref.to_le_bytes());
        out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        for (id, text) in entries {
            out.extend_from_slice(&id.to_le_bytes());
            out.extend_from_slice(&(text.len() as u32).to_le_bytes());
            out.extend_from_slice(text.as_bytes());
        }
        out
    }

    #[test]
    fn test_string_ids() {
        assert_eq!(string_id(Language::English, Gender::Male), 0);
        assert_eq!(string_id(Language::French, Gender::Female), 3);
        assert_eq!(string_id(Language::Japanese, Gender::Male), 262);
    }

    #[test]
    fn test_decode_entries() {
        let data = encode(1234, &[(0, "Bandit"), (3, "Bandite")]);
        let loc = AuroraLocStringDecoder
            .decode(&mut Cursor::new(data))
            .unwrap();

        assert_eq!(loc.string_ref(), 1234);
        assert!(loc.has_string_ref());
        assert_eq!(loc.len(), 2);
        assert_eq!(loc.get(Language::English, Gender::Male), Some("Bandit"));
        assert_eq!(loc.get(Language::French, Gender::Female), Some("Bandite"));
        assert_eq!(loc.preferred(), Some("Bandit"));
    }

    #[test]
    fn test_decode_reference_only() {
        let data = encode(42, &[]);
        let loc = AuroraLocStringDecoder
            .decode(&mut Cursor::new(data))
            .unwrap();
        assert_eq!(loc.string_ref(), 42);
        assert!(loc.is_empty());
        assert_eq!(loc.preferred(), None);
    }

    #[test]
    fn test_decode_truncated_entry() {
        let mut data = encode(NO_STRING_REF, &[(0, "Bandit")]);
        data.truncate(data.len() - 2);
        let err = AuroraLocStringDecoder
            .decode(&mut Cursor::new(data))
            .unwrap_err();
        assert_eq!(err.kind(), GffErrorKind::MalformedPayload);
    }

    #[test]
    fn test_preferred_falls_back_to_lowest_id() {
        let mut loc = LocString::new(NO_STRING_REF);
        loc.insert(Language::Spanish, Gender::Female, "b".to_string());
        loc.insert(Language::German, Gender::Male, "a".to_string());
        assert!(!loc.has_string_ref());
        assert_eq!(loc.preferred(), Some("a"));
        assert_eq!(
            loc.iter().collect::<Vec<_>>(),
            vec![(4, "a"), (9, "b")]
        );
    }
}
