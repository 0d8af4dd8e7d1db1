//! Address and content resolution.
//!
//! Maps a `(section, address)` pair to the bytes backing it and enumerates allocated
//! sections in address order. Results are index ranges into the section's blocks
//! rather than pointers, so they stay valid for as long as the layout does.

use std::ops::Range;

use crate::layout::{DataBlock, Section};
use crate::symbol::SymbolRecord;

/// A byte range inside one data block of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Position of the block in [`Section::blocks`].
    pub block: usize,
    pub start: usize,
    pub end: usize,
}

impl BlockSpan {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The bytes this span covers, if it belongs to `section`.
    pub fn slice<'data>(&self, section: &Section<'data>) -> Option<&'data [u8]> {
        section.blocks.get(self.block)?.bytes?.get(self.range())
    }
}

fn block_contains(base: u64, block: &DataBlock<'_>, address: u64) -> bool {
    let Some(start) = base.checked_add(block.offset) else {
        return false;
    };
    let Some(end) = start.checked_add(block.size) else {
        return false;
    };
    start <= address && address < end
}

/// Finds the block of `section` covering `address`.
///
/// Blocks are anchored at the section's base address. The first covering block wins;
/// a covering block without file backing yields `None`.
pub fn resolve_pointer(section: &Section<'_>, address: u64) -> Option<BlockSpan> {
    let base = section.base();
    let (block, data) = section
        .blocks
        .iter()
        .enumerate()
        .find(|(_, data)| block_contains(base, data, address))?;
    let bytes = data.bytes?;
    let start = usize::try_from(address - base - data.offset).ok()?;
    if start > bytes.len() {
        return None;
    }
    Some(BlockSpan { block, start, end: bytes.len() })
}

/// The allocated, non-empty section with the lowest base address at or after `address`.
///
/// Ties go to the earlier entry in `sections`. The returned cursor is the end of the
/// chosen section, suitable for the next call.
pub fn next_allocated_section_at_or_after<'a, 'data>(
    sections: &'a [Section<'data>],
    address: u64,
) -> Option<(&'a Section<'data>, u64)> {
    let mut best: Option<&'a Section<'data>> = None;
    for section in sections {
        if !section.is_allocated() || section.header.size == 0 || section.base() < address {
            continue;
        }
        if best.map_or(true, |current| section.base() < current.base()) {
            best = Some(section);
        }
    }
    let section = best?;
    Some((section, section.base().saturating_add(section.header.size)))
}

/// Iterates allocated sections in ascending address order.
///
/// Sections overlapping an already returned one are skipped, as are sections
/// placed before it.
pub struct AllocatedSections<'a, 'data> {
    sections: &'a [Section<'data>],
    cursor: Option<u64>,
}

impl<'a, 'data> AllocatedSections<'a, 'data> {
    pub fn new(sections: &'a [Section<'data>]) -> Self {
        Self { sections, cursor: Some(0) }
    }
}

impl<'a, 'data> Iterator for AllocatedSections<'a, 'data> {
    type Item = &'a Section<'data>;

    fn next(&mut self) -> Option<Self::Item> {
        let address = self.cursor?;
        match next_allocated_section_at_or_after(self.sections, address) {
            Some((section, cursor)) => {
                // A section ending at the top of the address space, or an empty
                // advance, terminates the walk.
                self.cursor = (cursor > address && cursor != u64::MAX).then_some(cursor);
                Some(section)
            }
            None => {
                self.cursor = None;
                None
            }
        }
    }
}

/// The bytes of a symbol's object, at most `symbol.size` long.
///
/// `None` unless the symbol is content-resolvable and its section is loaded and
/// backs the symbol's address.
pub fn symbol_content<'data>(sections: &[Section<'data>], symbol: &SymbolRecord) -> Option<&'data [u8]> {
    if !symbol.is_content_resolvable() {
        return None;
    }
    let section = sections.iter().find(|s| s.index() == usize::from(symbol.section_index))?;
    let span = resolve_pointer(section, symbol.value)?;
    let bytes = span.slice(section)?;
    let len = usize::try_from(symbol.size).map_or(bytes.len(), |size| size.min(bytes.len()));
    Some(&bytes[..len])
}
