//! Symbol, relocation and dynamic records.
//!
//! Decoded views of the fixed-size records stored in `SHT_SYMTAB`/`SHT_DYNSYM`,
//! `SHT_RELA`/`SHT_REL` and `SHT_DYNAMIC` sections, plus symbol lookup by index
//! across a symbol table's data blocks.

use crate::error::{InspectError, Result};
use crate::layout::Section;
use crate::reader::ObjectReader;

/// First reserved section index (`SHN_LORESERVE`).
pub const SHN_LORESERVE: u16 = 0xff00;

const DT_NEEDED: u64 = 1;

/// A symbol table entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymbolRecord {
    /// Offset of the name in the linked string table.
    pub name_offset: u32,
    pub value: u64,
    pub size: u64,
    /// `st_shndx`
    pub section_index: u16,
    /// `st_info`
    pub info: u8,
    /// `st_other`
    pub other: u8,
}

impl SymbolRecord {
    pub fn binding(&self) -> u8 {
        self.info >> 4
    }

    pub fn kind(&self) -> u8 {
        self.info & 0xf
    }

    pub fn visibility(&self) -> u8 {
        self.other & 0x3
    }

    /// Whether the symbol's bytes can be looked up in its section.
    ///
    /// Requires a non-zero value and size, and a regular section index.
    pub fn is_content_resolvable(&self) -> bool {
        self.value > 0
            && self.size > 0
            && self.section_index > 0
            && self.section_index < SHN_LORESERVE
    }
}

/// A relocation entry. `addend` is `None` for `SHT_REL` records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelocationEntry {
    pub offset: u64,
    /// Index into the symbol table named by the section's `sh_link`.
    pub symbol: u32,
    /// Machine-specific type code, left uninterpreted.
    pub kind: u32,
    pub addend: Option<i64>,
}

/// A `.dynamic` entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DynamicEntry {
    pub tag: u64,
    pub value: u64,
}

impl DynamicEntry {
    /// `DT_NEEDED` entries carry a string table offset naming a library.
    pub fn is_needed(&self) -> bool {
        self.tag == DT_NEEDED
    }
}

/// Looks up symbol `index` in the symbol table section `symtab`.
///
/// Each block holds `size / entsize` records; the index is counted across blocks
/// in order.
pub fn lookup_symbol<'data>(
    reader: &dyn ObjectReader<'data>,
    symtab: &Section<'data>,
    index: u64,
) -> Result<SymbolRecord> {
    let entry_size = symtab.header.entry_size;
    if entry_size == 0 {
        return Err(InspectError::miss("symbol", index));
    }

    let mut remaining = index;
    for block in &symtab.blocks {
        let count = block.size / entry_size;
        if remaining < count {
            let ordinal = usize::try_from(remaining).map_err(|_| InspectError::miss("symbol", index))?;
            return reader
                .symbol(block, ordinal)?
                .ok_or(InspectError::miss("symbol", index));
        }
        remaining -= count;
    }
    Err(InspectError::miss("symbol", index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_fields_split() {
        let sym = SymbolRecord { info: 0x12, other: 0x2, ..Default::default() };
        assert_eq!(sym.binding(), 1);
        assert_eq!(sym.kind(), 2);
        assert_eq!(sym.visibility(), 2);
    }

    #[test]
    fn zero_value_or_size_is_not_resolvable() {
        let sym = SymbolRecord { value: 0, size: 8, section_index: 1, ..Default::default() };
        assert!(!sym.is_content_resolvable());
        let sym = SymbolRecord { value: 0x10, size: 0, section_index: 1, ..Default::default() };
        assert!(!sym.is_content_resolvable());
        let sym = SymbolRecord { value: 0x10, size: 8, section_index: 1, ..Default::default() };
        assert!(sym.is_content_resolvable());
    }

    #[test]
    fn reserved_section_indices_are_not_resolvable() {
        // SHN_ABS
        let sym = SymbolRecord { value: 0x10, size: 8, section_index: 0xfff1, ..Default::default() };
        assert!(!sym.is_content_resolvable());
        let sym = SymbolRecord { value: 0x10, size: 8, section_index: 0, ..Default::default() };
        assert!(!sym.is_content_resolvable());
    }

    #[test]
    fn needed_entries() {
        assert!(DynamicEntry { tag: 1, value: 0x20 }.is_needed());
        assert!(!DynamicEntry { tag: 14, value: 0x20 }.is_needed());
    }
}
