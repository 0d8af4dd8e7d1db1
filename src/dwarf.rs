//! Debug-info reader abstraction.
//!
//! This module defines the DIE model and the `DebugInfoReader` trait. DIEs are identified
//! by their global `.debug_info` offset; tree structure is reached through reader calls
//! (first child, next sibling) so the walker never holds references into the tree.

use gimli::{DwAt, DwForm, DwTag};

use crate::error::Result;

pub mod gimli_reader;

pub use gimli_reader::GimliReader;

/// Global offset of a DIE in `.debug_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DieOffset(pub u64);

/// Position of a unit in the reader's unit list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(pub usize);

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    String(String),
    Unsigned(u64),
    Signed(i64),
    Address(u64),
    /// Reference to another DIE, resolved to a global offset.
    Reference(DieOffset),
    Flag(bool),
    Bytes(Vec<u8>),
    /// Anything without a structured rendering, pre-formatted.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DieAttribute {
    pub name: DwAt,
    pub form: DwForm,
    pub value: AttrValue,
}

/// A debugging information entry with its attributes in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Die {
    pub offset: DieOffset,
    pub tag: DwTag,
    pub abbrev_code: u64,
    /// Direct `DW_AT_name`, without following specification links.
    pub name: Option<String>,
    pub attributes: Vec<DieAttribute>,
}

impl Die {
    pub fn attribute(&self, name: DwAt) -> Option<&DieAttribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn has(&self, name: DwAt) -> bool {
        self.attribute(name).is_some()
    }

    /// Target of `DW_AT_specification`, if present and a DIE reference.
    pub fn specification(&self) -> Option<DieOffset> {
        match self.attribute(gimli::DW_AT_specification)?.value {
            AttrValue::Reference(offset) => Some(offset),
            _ => None,
        }
    }
}

/// A source of compile units and DIEs.
///
/// Lookups of offsets that do not name a DIE fail with
/// [`crate::error::InspectError::LookupMiss`].
pub trait DebugInfoReader {
    fn units(&self) -> Vec<UnitId>;

    /// Offset of the unit's root DIE.
    fn unit_root(&self, unit: UnitId) -> Result<DieOffset>;

    /// Source file paths of the unit's line program, directory-qualified.
    fn source_files(&self, unit: UnitId) -> Result<Vec<String>>;

    fn die(&self, offset: DieOffset) -> Result<Die>;

    fn first_child(&self, offset: DieOffset) -> Result<Option<DieOffset>>;

    fn next_sibling(&self, offset: DieOffset) -> Result<Option<DieOffset>>;
}
