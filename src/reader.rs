//! Object-file reader abstraction.
//!
//! This module defines the `ObjectReader` trait, the narrow interface through which the
//! rest of the crate reads headers, data blocks and records. Byte-level parsing stays in
//! the backends; the serializer and resolver only ever see the layout model.

use std::borrow::Cow;

use crate::error::Result;
use crate::layout::{DataBlock, SectionHeader, Segment};
use crate::symbol::{DynamicEntry, RelocationEntry, SymbolRecord};

pub mod elf;

/// ELF identification and file header fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInfo {
    /// `EI_CLASS`
    pub class: u8,
    /// `EI_DATA`
    pub data: u8,
    /// `EI_VERSION`
    pub ident_version: u8,
    pub os_abi: u8,
    pub abi_version: u8,
    /// `e_type`
    pub kind: u16,
    pub machine: u16,
    pub version: u32,
    pub entry: u64,
    pub phoff: u64,
    pub shoff: u64,
    pub flags: u32,
    pub ehsize: u16,
    pub phentsize: u16,
    pub phnum: usize,
    pub shentsize: u16,
    pub shnum: usize,
    pub shstrndx: usize,
    /// Index of the first `SHT_SYMTAB` section, 0 when absent.
    pub symtab_index: usize,
    /// Its linked string table.
    pub strtab_index: usize,
    /// Index of the first `SHT_DYNSYM` section, 0 when absent.
    pub dynsym_index: usize,
    pub dynstr_index: usize,
}

/// A source of layout and records for one object file.
///
/// Record accessors return `Ok(None)` once `index` is past the end of the block;
/// callers iterate until then. Missing sections and strings are reported as
/// [`crate::error::InspectError::LookupMiss`].
pub trait ObjectReader<'data> {
    fn file_info(&self) -> &FileInfo;

    fn segments(&self) -> Result<Vec<Segment>>;

    /// Number of entries in the section header table, including the null section.
    fn section_count(&self) -> usize;

    fn section_header(&self, index: usize) -> Result<SectionHeader>;

    /// The `ordinal`-th data block of a section, or `None` when there are no more.
    fn data_block(&self, section: &SectionHeader, ordinal: usize) -> Result<Option<DataBlock<'data>>>;

    fn symbol(&self, block: &DataBlock<'data>, index: usize) -> Result<Option<SymbolRecord>>;

    fn dynamic_entry(&self, block: &DataBlock<'data>, index: usize) -> Result<Option<DynamicEntry>>;

    fn rela_entry(&self, block: &DataBlock<'data>, index: usize) -> Result<Option<RelocationEntry>>;

    fn rel_entry(&self, block: &DataBlock<'data>, index: usize) -> Result<Option<RelocationEntry>>;

    /// NUL-terminated string at `offset` in string table section `section`.
    fn string(&self, section: usize, offset: u64) -> Result<Cow<'data, str>>;

    /// Name of a section, looked up in the section header string table.
    fn section_name(&self, header: &SectionHeader) -> Result<Cow<'data, str>> {
        self.string(self.file_info().shstrndx, u64::from(header.name_offset))
    }
}
