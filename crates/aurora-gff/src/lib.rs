//! Lazy decoder for the Aurora GFF binary structured-data format
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Inline payload reinterpretation
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Format terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::float_cmp)] // Binary format requirements
#![allow(clippy::return_self_not_must_use)] // Builder patterns
#![allow(clippy::use_self)] // Type clarity
//! GFF is the generic container used by Aurora engine games for creature
//! and item templates, dialogs, areas, module info and more. A file holds a
//! table of structs, each an ordered set of labelled, typed fields. Fields
//! can hold numbers, strings, localized strings, blobs, vectors, or refer to
//! a nested struct or a list of structs.
//!
//! # Loading model
//!
//! - The header, the struct table and the list-indices area are read when a
//!   file is loaded. A bad tag or version, or a corrupt list area, fails the
//!   load and nothing is kept.
//! - Struct fields are read the first time a struct is accessed, at most
//!   once. An error while resolving one struct leaves the rest of the file
//!   usable.
//! - Values stored out of line are read on demand; the stream position is
//!   restored after every such read.
//!
//! # Example
//!
//! ```no_run
//! use aurora_gff::{DirectoryLocator, GffFile, ResourceType};
//!
//! # fn main() -> Result<(), aurora_gff::GffError> {
//! let locator = DirectoryLocator::new("override");
//! let file = GffFile::open(&locator, "nw_bandit", ResourceType::Utc)?;
//! let creature = file.top_level()?;
//!
//! let tag = creature.get_string("Tag", "")?;
//! let gold = creature.get_uint("Gold", 0)?;
//! for item in creature.get_list("ItemList")?.iter() {
//!     println!("{tag} carries {}", item.get_string("InventoryRes", "")?);
//! }
//! # let _ = gold;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;
/// Field type tags, field records and value decoding
pub mod field;
pub mod file;
pub mod header;
pub mod list;
pub mod locstring;
/// Resource kinds and locators
///
/// Maps GFF content kinds onto file extensions and header tags, and finds
/// resources on disk by name.
pub mod resource;
mod stream;
pub mod structure;
pub mod value;

// Test utilities module
#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;

pub use error::{GffError, GffErrorKind, GffResult};
pub use field::{GffField, GffFieldType};
pub use file::{GffFile, GffOptions};
pub use header::{GFF_VERSION_V32, GFF_VERSION_V33, GffHeader};
pub use list::{GffList, ListTable};
pub use locstring::{
    AuroraLocStringDecoder, Gender, Language, LocString, LocStringDecoder, NO_STRING_REF,
};
pub use resource::{DirectoryLocator, ResourceLocator, ResourceType};
pub use structure::GffStruct;
pub use value::GffValue;
