//! Resource kinds and locating GFF resources by name

use crate::error::{GffError, GffResult};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::debug;

/// GFF-based resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// Creature template
    Utc,
    /// Door template
    Utd,
    /// Encounter template
    Ute,
    /// Item template
    Uti,
    /// Merchant template
    Utm,
    /// Placeable template
    Utp,
    /// Sound template
    Uts,
    /// Trigger template
    Utt,
    /// Waypoint template
    Utw,
    /// Dialog tree
    Dlg,
    /// Module info
    Ifo,
    /// Area static data
    Are,
    /// Area instance data
    Git,
    /// Player character
    Bic,
    /// Faction table
    Fac,
    /// Journal
    Jrl,
    /// GUI layout
    Gui,
    /// Path table
    Pth,
    /// Generic GFF
    Gff,
}

impl ResourceType {
    /// All kinds, in declaration order
    pub const ALL: [Self; 19] = [
        Self::Utc,
        Self::Utd,
        Self::Ute,
        Self::Uti,
        Self::Utm,
        Self::Utp,
        Self::Uts,
        Self::Utt,
        Self::Utw,
        Self::Dlg,
        Self::Ifo,
        Self::Are,
        Self::Git,
        Self::Bic,
        Self::Fac,
        Self::Jrl,
        Self::Gui,
        Self::Pth,
        Self::Gff,
    ];

    /// Lowercase file extension without the dot
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Utc => "utc",
            Self::Utd => "utd",
            Self::Ute => "ute",
            Self::Uti => "uti",
            Self::Utm => "utm",
            Self::Utp => "utp",
            Self::Uts => "uts",
            Self::Utt => "utt",
            Self::Utw => "utw",
            Self::Dlg => "dlg",
            Self::Ifo => "ifo",
            Self::Are => "are",
            Self::Git => "git",
            Self::Bic => "bic",
            Self::Fac => "fac",
            Self::Jrl => "jrl",
            Self::Gui => "gui",
            Self::Pth => "pth",
            Self::Gff => "gff",
        }
    }

    /// Header tag: the uppercase extension padded with a space
    pub const fn tag(self) -> [u8; 4] {
        let ext = self.extension().as_bytes();
        [
            ext[0].to_ascii_uppercase(),
            ext[1].to_ascii_uppercase(),
            ext[2].to_ascii_uppercase(),
            b' ',
        ]
    }

    /// Kind for a file extension, case-insensitive
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension().eq_ignore_ascii_case(ext))
    }

    /// Kind implied by a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Opens resources by name and kind
pub trait ResourceLocator {
    /// Stream type handed to the decoder
    type Stream: Read + Seek;

    /// Open `name` of the given kind, or fail with
    /// [`GffError::ResourceNotFound`]
    fn open(&self, name: &str, kind: ResourceType) -> GffResult<Self::Stream>;
}

/// Looks resources up as `<name>.<ext>` in one directory.
///
/// Matching ignores ASCII case, as game data is often shipped with mixed
/// case file names.
#[derive(Debug, Clone)]
pub struct DirectoryLocator {
    root: PathBuf,
}

impl DirectoryLocator {
    /// Locator over `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory searched
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the matching file, if any
    pub fn find(&self, name: &str, kind: ResourceType) -> GffResult<Option<PathBuf>> {
        let wanted = format!("{}.{}", name, kind.extension());

        let exact = self.root.join(&wanted);
        if exact.is_file() {
            return Ok(Some(exact));
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry
                .file_name()
                .to_str()
                .is_some_and(|file_name| file_name.eq_ignore_ascii_case(&wanted))
                && entry.file_type()?.is_file()
            {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }
}

impl ResourceLocator for DirectoryLocator {
    type Stream = BufReader<File>;

    fn open(&self, name: &str, kind: ResourceType) -> GffResult<Self::Stream> {
        let path = self
            .find(name, kind)?
            .ok_or_else(|| GffError::ResourceNotFound {
                name: name.to_string(),
                kind,
            })?;
        debug!(path = %path.display(), "opening resource");
        Ok(BufReader::new(File::open(path)?))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::GffErrorKind;
    use crate::file::GffFile;
    use crate::test_utils::{GffImageBuilder, TestStruct, TestValue};
    use tempfile::tempdir;

    #[test]
    fn test_tags_and_extensions() {
        assert_eq!(ResourceType::Utc.tag(), *b"UTC ");
        assert_eq!(ResourceType::Gff.tag(), *b"GFF ");
        assert_eq!(ResourceType::from_extension("DLG"), Some(ResourceType::Dlg));
        assert_eq!(ResourceType::from_extension(".uti"), Some(ResourceType::Uti));
        assert_eq!(ResourceType::from_extension("2da"), None);
        assert_eq!(
            ResourceType::from_path(Path::new("area/tavern.Git")),
            Some(ResourceType::Git)
        );
        assert_eq!(ResourceType::Jrl.to_string(), "jrl");
    }

    #[test]
    fn test_directory_locator_ignores_case() {
        let dir = tempdir().unwrap();
        let image = GffImageBuilder::new(*b"UTI ")
            .with_struct(TestStruct::new(u32::MAX).field("Cost", TestValue::Uint32(12)))
            .build();
        fs::write(dir.path().join("Longsword.UTI"), image).unwrap();

        let locator = DirectoryLocator::new(dir.path());
        let file = GffFile::open(&locator, "longsword", ResourceType::Uti).unwrap();
        assert_eq!(file.top_level().unwrap().get_uint("Cost", 0).unwrap(), 12);
    }

    #[test]
    fn test_directory_locator_not_found() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("longsword.utc"), b"not this one").unwrap();

        let locator = DirectoryLocator::new(dir.path());
        let err = locator.open("longsword", ResourceType::Uti).unwrap_err();
        assert!(matches!(
            err,
            GffError::ResourceNotFound { ref name, kind: ResourceType::Uti } if name == "longsword"
        ));
        assert_eq!(err.kind(), GffErrorKind::ResourceNotFound);
        assert_eq!(err.to_string(), "resource not found: longsword (uti)");
    }

    #[test]
    fn test_open_checks_kind_tag() {
        let dir = tempdir().unwrap();
        let image = GffImageBuilder::new(*b"UTC ")
            .with_struct(TestStruct::new(u32::MAX))
            .build();
        fs::write(dir.path().join("guard.uti"), image).unwrap();

        let locator = DirectoryLocator::new(dir.path());
        let err = GffFile::open(&locator, "guard", ResourceType::Uti).unwrap_err();
        assert_eq!(err.kind(), GffErrorKind::HeaderInvalid);
    }
}
