//! Layout model.
//!
//! This module defines the structures describing an input file's layout: sections,
//! the data blocks backing them, and the segments of the program header table.
//! Everything here borrows from the mapped file and is never mutated after loading.

use crate::tables;

pub const SHT_NOBITS: u32 = 8;
pub const SHF_ALLOC: u64 = 0x2;

/// Raw section header fields, as reported by the object-file reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionHeader {
    /// Position in the section header table.
    pub index: usize,
    /// Offset of the name in the section header string table.
    pub name_offset: u32,
    /// `sh_type`
    pub kind: u32,
    /// `sh_flags`
    pub flags: u64,
    /// Base address when loaded, 0 for non-allocated sections.
    pub address: u64,
    /// File offset of the section contents.
    pub offset: u64,
    pub size: u64,
    pub link: u32,
    pub info: u32,
    pub align: u64,
    pub entry_size: u64,
}

/// Record kind of a data block.
///
/// Codes follow libelf's `Elf_Type` numbering so that existing tooling can match
/// on them; see [`tables::BLOCK_KIND`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Byte,
    Addr,
    Dyn,
    Half,
    Rela,
    Rel,
    Sym,
    Word,
    Verdef,
    Verneed,
    Nhdr,
    GnuHash,
    Chdr,
    Relr,
}

impl BlockKind {
    pub fn code(self) -> u64 {
        match self {
            BlockKind::Byte => 0,
            BlockKind::Addr => 1,
            BlockKind::Dyn => 2,
            BlockKind::Half => 4,
            BlockKind::Rela => 7,
            BlockKind::Rel => 8,
            BlockKind::Sym => 11,
            BlockKind::Word => 12,
            BlockKind::Verdef => 15,
            BlockKind::Verneed => 17,
            BlockKind::Nhdr => 19,
            BlockKind::GnuHash => 23,
            BlockKind::Chdr => 25,
            BlockKind::Relr => 27,
        }
    }

    /// The kind a section of type `sh_type` and flags `sh_flags` is read as.
    ///
    /// Compressed sections are presented as their compression header.
    pub fn for_section(sh_type: u32, sh_flags: u64) -> Self {
        const SHF_COMPRESSED: u64 = 0x800;
        if sh_flags & SHF_COMPRESSED != 0 {
            return BlockKind::Chdr;
        }
        match sh_type {
            2 | 11 => BlockKind::Sym,
            4 => BlockKind::Rela,
            5 | 18 => BlockKind::Word,
            6 => BlockKind::Dyn,
            7 => BlockKind::Nhdr,
            9 => BlockKind::Rel,
            14..=16 => BlockKind::Addr,
            17 => BlockKind::Word,
            19 => BlockKind::Relr,
            0x6fff_fff6 => BlockKind::GnuHash,
            0x6fff_fffd => BlockKind::Verdef,
            0x6fff_fffe => BlockKind::Verneed,
            0x6fff_ffff => BlockKind::Half,
            _ => BlockKind::Byte,
        }
    }

    pub fn name(self) -> &'static str {
        tables::BLOCK_KIND.name(self.code())
    }
}

/// A contiguous run of a section's contents.
///
/// Blocks never overlap within a section. `bytes` is `None` for zero-fill
/// content that has no file backing (e.g. `.bss`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataBlock<'data> {
    pub kind: BlockKind,
    pub size: u64,
    /// Offset of the block within its section.
    pub offset: u64,
    pub align: u64,
    pub bytes: Option<&'data [u8]>,
}

impl<'data> DataBlock<'data> {
    pub fn is_backed(&self) -> bool {
        self.bytes.is_some()
    }
}

/// A section together with its data blocks.
#[derive(Debug, Clone)]
pub struct Section<'data> {
    pub header: SectionHeader,
    /// Name resolved through the section header string table, empty when unresolvable.
    pub name: String,
    pub blocks: Vec<DataBlock<'data>>,
}

impl<'data> Section<'data> {
    pub fn index(&self) -> usize {
        self.header.index
    }

    /// Address at which block offsets are anchored.
    pub fn base(&self) -> u64 {
        self.header.address
    }

    pub fn is_allocated(&self) -> bool {
        self.header.flags & SHF_ALLOC != 0
    }
}

/// A program header table entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Segment {
    /// `p_type`
    pub kind: u32,
    /// `p_flags`
    pub flags: u32,
    pub offset: u64,
    pub virtual_address: u64,
    pub physical_address: u64,
    pub file_size: u64,
    pub memory_size: u64,
    pub align: u64,
}
