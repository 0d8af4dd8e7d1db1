//! Structured model serializer.
//!
//! Turns the loaded layout into the output tree: file header, program header list,
//! section list with data blocks and decoded records, and the address-ordered
//! section list. A failure inside one section is recorded as a [`Diagnostic`] and
//! attached to that section; the remaining sections are still emitted.

use crate::crc::crc32;
use crate::error::{recover, Result};
use crate::layout::{BlockKind, DataBlock, Section};
use crate::node::{MapBuilder, Node};
use crate::reader::ObjectReader;
use crate::resolver::{symbol_content, AllocatedSections};
use crate::symbol::{lookup_symbol, RelocationEntry};
use crate::tables;

/// A per-section failure that did not stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub section: usize,
    pub message: String,
}

pub struct ModelSerializer<'a, 'data> {
    reader: &'a dyn ObjectReader<'data>,
    sections: &'a [Section<'data>],
    preview_len: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, 'data> ModelSerializer<'a, 'data> {
    pub fn new(reader: &'a dyn ObjectReader<'data>, sections: &'a [Section<'data>], preview_len: usize) -> Self {
        Self { reader, sections, preview_len, diagnostics: Vec::new() }
    }

    /// Seeds diagnostics gathered while loading sections.
    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// The complete layout model: header fields followed by the three lists.
    pub fn serialize(&mut self) -> Result<Node> {
        let mut root = self.file_header();
        root.push("program_header_list", self.program_header_list()?);
        root.push("section_list", self.section_list());
        root.push("section_addr_list", self.section_addr_list());
        Ok(root.build())
    }

    pub fn file_header(&self) -> MapBuilder {
        let info = self.reader.file_info();
        Node::map()
            .field("EI_CLASS", Node::code(&tables::ELF_CLASS, info.class.into()))
            .field("EI_DATA", Node::code(&tables::ELF_DATA, info.data.into()))
            .number("EI_VERSION", info.ident_version)
            .field("EI_OSABI", Node::code(&tables::ELF_OSABI, info.os_abi.into()))
            .number("EI_ABIVERSION", info.abi_version)
            .field("e_type", Node::code(&tables::ELF_TYPE, info.kind.into()))
            .field("e_machine", Node::code(&tables::ELF_MACHINE, info.machine.into()))
            .number("e_version", info.version)
            .number("e_entry", info.entry)
            .number("e_phoff", info.phoff)
            .number("e_shoff", info.shoff)
            .number("e_flags", info.flags)
            .number("e_ehsize", info.ehsize)
            .number("e_phentsize", info.phentsize)
            .number("e_phnum", info.phnum as u64)
            .number("e_shentsize", info.shentsize)
            .number("e_shnum", info.shnum as u64)
            .number("e_shstrndx", info.shstrndx as u64)
            .number("program_header_total", info.phnum as u64)
            .number("symtab_section_index", info.symtab_index as u64)
            .number("strtab_section_index", info.strtab_index as u64)
            .number("dynsym_section_index", info.dynsym_index as u64)
            .number("dynstr_section_index", info.dynstr_index as u64)
    }

    pub fn program_header_list(&self) -> Result<Node> {
        let segments = self.reader.segments()?;
        Ok(Node::List(
            segments
                .iter()
                .map(|segment| {
                    Node::map()
                        .field("p_type", Node::code(&tables::SEGMENT_TYPE, segment.kind.into()))
                        .field("p_flags", Node::flags(&tables::SEGMENT_FLAGS, segment.flags.into()))
                        .number("p_offset", segment.offset)
                        .number("p_vaddr", segment.virtual_address)
                        .number("p_paddr", segment.physical_address)
                        .number("p_filesz", segment.file_size)
                        .number("p_memsz", segment.memory_size)
                        .number("p_align", segment.align)
                        .build()
                })
                .collect(),
        ))
    }

    /// Every section except the null section, in table order, with data blocks.
    pub fn section_list(&mut self) -> Node {
        let sections = self.sections;
        Node::List(
            sections
                .iter()
                .filter(|section| section.index() != 0)
                .map(|section| self.section(section, true))
                .collect(),
        )
    }

    /// Allocated sections in ascending address order, without data blocks.
    pub fn section_addr_list(&mut self) -> Node {
        let sections = self.sections;
        Node::List(AllocatedSections::new(sections).map(|section| self.section(section, false)).collect())
    }

    fn section(&mut self, section: &Section<'data>, with_data: bool) -> Node {
        let header = &section.header;
        let mut node = Node::map()
            .number("section_index", header.index as u64)
            .text("sh_name", section.name.as_str())
            .field("sh_type", Node::code(&tables::SECTION_TYPE, header.kind.into()))
            .field("sh_flags", Node::flags(&tables::SECTION_FLAGS, header.flags))
            .number("sh_addr", header.address)
            .number("sh_offset", header.offset)
            .number("sh_size", header.size)
            .number("sh_link", header.link)
            .number("sh_info", header.info)
            .number("sh_addralign", header.align)
            .number("sh_entsize", header.entry_size);

        if !with_data {
            return node.build();
        }

        let mut blocks = Vec::new();
        let outcome = section
            .blocks
            .iter()
            .try_for_each(|block| self.data_block(section, block).map(|node| blocks.push(node)));
        node.push("data_list", Node::List(blocks));

        if let Err(err) = outcome {
            tracing::warn!("section {} ({}): {}", header.index, section.name, err);
            self.diagnostics.push(Diagnostic { section: header.index, message: err.to_string() });
        }
        if let Some(diagnostic) = self.diagnostics.iter().find(|d| d.section == header.index) {
            node.push("error", Node::text(diagnostic.message.as_str()));
        }
        node.build()
    }

    fn data_block(&self, section: &Section<'data>, block: &DataBlock<'data>) -> Result<Node> {
        let mut node = Node::map()
            .field("d_type", Node::code(&tables::BLOCK_KIND, block.kind.code()))
            .number("d_size", block.size)
            .number("d_off", block.offset)
            .number("d_align", block.align);

        match block.kind {
            BlockKind::Sym => node.push("symbol_list", self.symbol_list(section, block)?),
            BlockKind::Dyn => node.push("dynamic_list", self.dynamic_list(section, block)?),
            BlockKind::Rela => node.push("rela_list", self.relocation_list(section, block, true)?),
            BlockKind::Rel => node.push("rel_list", self.relocation_list(section, block, false)?),
            _ => {}
        }
        Ok(node.build())
    }

    fn string(&self, table: u32, offset: u64) -> Result<Option<String>> {
        Ok(recover(self.reader.string(table as usize, offset))?.map(|s| s.into_owned()))
    }

    fn symbol_list(&self, section: &Section<'data>, block: &DataBlock<'data>) -> Result<Node> {
        let mut symbols = Vec::new();
        let mut index = 0;
        while let Some(symbol) = self.reader.symbol(block, index)? {
            let name = self.string(section.header.link, symbol.name_offset.into())?;
            let mut node = Node::map()
                .optional("st_name", name.map(Node::Text))
                .number("st_value", symbol.value)
                .number("st_size", symbol.size)
                .number("st_shndx", symbol.section_index)
                .number("st_info", symbol.info)
                .field("ST_BIND", Node::code(&tables::SYMBOL_BINDING, symbol.binding().into()))
                .field("ST_TYPE", Node::code(&tables::SYMBOL_TYPE, symbol.kind().into()))
                .number("st_other", symbol.other)
                .field("ST_VISIBILITY", Node::code(&tables::SYMBOL_VISIBILITY, symbol.visibility().into()));

            if let Some(content) = symbol_content(self.sections, &symbol) {
                let preview = &content[..content.len().min(self.preview_len)];
                node.push("obj_crc", Node::Number(crc32(content).into()));
                node.push("obj_data", Node::Bytes(preview.to_vec()));
            }
            symbols.push(node.build());
            index += 1;
        }
        Ok(Node::List(symbols))
    }

    fn dynamic_list(&self, section: &Section<'data>, block: &DataBlock<'data>) -> Result<Node> {
        let mut entries = Vec::new();
        let mut index = 0;
        while let Some(entry) = self.reader.dynamic_entry(block, index)? {
            let lib_name = if entry.is_needed() { self.string(section.header.link, entry.value)? } else { None };
            entries.push(
                Node::map()
                    .field("d_tag", Node::code(&tables::DYNAMIC_TAG, entry.tag))
                    .number("d_val", entry.value)
                    .optional("lib_name", lib_name.map(Node::Text))
                    .build(),
            );
            index += 1;
        }
        Ok(Node::List(entries))
    }

    fn relocation_list(&self, section: &Section<'data>, block: &DataBlock<'data>, with_addend: bool) -> Result<Node> {
        let mut entries = Vec::new();
        let mut index = 0;
        loop {
            let entry = if with_addend {
                self.reader.rela_entry(block, index)?
            } else {
                self.reader.rel_entry(block, index)?
            };
            let Some(entry) = entry else {
                break;
            };
            let symbol_name = self.relocation_symbol_name(section, &entry)?;
            entries.push(
                Node::map()
                    .number("r_offset", entry.offset)
                    .number("SYM", entry.symbol)
                    .optional("symbol_name", symbol_name.map(Node::Text))
                    .number("TYPE", entry.kind)
                    .optional("r_addend", entry.addend.map(Node::Signed))
                    .build(),
            );
            index += 1;
        }
        Ok(Node::List(entries))
    }

    /// Name of the symbol a relocation refers to, via the section's linked symbol table.
    fn relocation_symbol_name(&self, section: &Section<'data>, entry: &RelocationEntry) -> Result<Option<String>> {
        let link = section.header.link as usize;
        if link == 0 {
            return Ok(None);
        }
        let Some(symtab) = self.sections.iter().find(|s| s.index() == link) else {
            tracing::debug!("section {} links to missing section {}", section.index(), link);
            return Ok(None);
        };
        let Some(symbol) = recover(lookup_symbol(self.reader, symtab, entry.symbol.into()))? else {
            return Ok(None);
        };
        self.string(symtab.header.link, symbol.name_offset.into())
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::error::InspectError;
    use crate::layout::{SectionHeader, Segment, SHF_ALLOC};
    use crate::reader::FileInfo;
    use crate::symbol::{DynamicEntry, SymbolRecord};

    static TEXT: [u8; 8] = [0x55, 0x48, 0x89, 0xe5, 0x5d, 0xc3, 0x90, 0x90];

    /// Serves symbols from a fixed list; optionally fails every symbol read.
    struct MockReader {
        info: FileInfo,
        symbols: Vec<SymbolRecord>,
        dynamic: Vec<DynamicEntry>,
        broken: bool,
    }

    impl<'data> ObjectReader<'data> for MockReader {
        fn file_info(&self) -> &FileInfo {
            &self.info
        }

        fn segments(&self) -> Result<Vec<Segment>> {
            Ok(vec![Segment { kind: 1, flags: 0x5, ..Default::default() }])
        }

        fn section_count(&self) -> usize {
            3
        }

        fn section_header(&self, index: usize) -> Result<SectionHeader> {
            Err(InspectError::miss("section", index as u64))
        }

        fn data_block(&self, _: &SectionHeader, _: usize) -> Result<Option<DataBlock<'data>>> {
            Ok(None)
        }

        fn symbol(&self, _: &DataBlock<'data>, index: usize) -> Result<Option<SymbolRecord>> {
            if self.broken {
                return Err(InspectError::Format("truncated symbol table".into()));
            }
            Ok(self.symbols.get(index).copied())
        }

        fn dynamic_entry(&self, _: &DataBlock<'data>, index: usize) -> Result<Option<DynamicEntry>> {
            Ok(self.dynamic.get(index).copied())
        }

        fn rela_entry(&self, _: &DataBlock<'data>, _: usize) -> Result<Option<RelocationEntry>> {
            Ok(None)
        }

        fn rel_entry(&self, _: &DataBlock<'data>, _: usize) -> Result<Option<RelocationEntry>> {
            Ok(None)
        }

        fn string(&self, _: usize, offset: u64) -> Result<Cow<'data, str>> {
            match offset {
                1 => Ok(Cow::Borrowed("main")),
                6 => Ok(Cow::Borrowed("start")),
                _ => Err(InspectError::miss("string", offset)),
            }
        }
    }

    fn sections() -> Vec<Section<'static>> {
        let text = Section {
            header: SectionHeader { index: 1, kind: 1, flags: SHF_ALLOC | 0x4, address: 0x1000, size: 8, ..Default::default() },
            name: ".text".into(),
            blocks: vec![DataBlock { kind: BlockKind::Byte, size: 8, offset: 0, align: 16, bytes: Some(&TEXT[..]) }],
        };
        let symtab = Section {
            header: SectionHeader { index: 2, kind: 2, link: 3, entry_size: 24, size: 72, ..Default::default() },
            name: ".symtab".into(),
            blocks: vec![DataBlock { kind: BlockKind::Sym, size: 72, offset: 0, align: 8, bytes: Some(&[][..]) }],
        };
        vec![Section { header: SectionHeader::default(), name: String::new(), blocks: vec![] }, text, symtab]
    }

    fn symbols() -> Vec<SymbolRecord> {
        vec![
            SymbolRecord::default(),
            SymbolRecord { name_offset: 1, value: 0x1000, size: 6, section_index: 1, info: 0x12, other: 0 },
            SymbolRecord { name_offset: 6, value: 0, size: 6, section_index: 1, info: 0x12, other: 0 },
        ]
    }

    #[test]
    fn symbol_content_gets_crc_and_preview() {
        let reader = MockReader { info: FileInfo::default(), symbols: symbols(), dynamic: vec![], broken: false };
        let sections = sections();
        let mut serializer = ModelSerializer::new(&reader, &sections, 4);
        let list = serializer.section_list();
        let symtab = &list.as_list().unwrap()[1];
        let symbols = symtab.get("data_list").unwrap().as_list().unwrap()[0].get("symbol_list").unwrap();
        let symbols = symbols.as_list().unwrap();
        assert_eq!(symbols.len(), 3);

        let main = &symbols[1];
        assert_eq!(main.get("st_name").and_then(Node::as_str), Some("main"));
        assert_eq!(main.get("obj_crc").and_then(Node::as_u64), Some(u64::from(crc32(&TEXT[..6]))));
        assert_eq!(main.get("obj_data"), Some(&Node::Bytes(TEXT[..4].to_vec())));

        // value 0
        assert!(symbols[2].get("obj_crc").is_none());
        // name offset 0 does not resolve in the mock
        assert!(symbols[0].get("st_name").is_none());
        assert!(serializer.diagnostics().is_empty());
    }

    #[test]
    fn failing_section_is_reported_and_others_survive() {
        let reader = MockReader { info: FileInfo::default(), symbols: symbols(), dynamic: vec![], broken: true };
        let sections = sections();
        let mut serializer = ModelSerializer::new(&reader, &sections, 64);
        let root = serializer.serialize().unwrap();

        let list = root.get("section_list").unwrap().as_list().unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[0].get("error").is_none());
        assert_eq!(list[1].get("error").and_then(Node::as_str), Some("format error: truncated symbol table"));
        assert_eq!(list[1].get("data_list").and_then(Node::as_list).map(<[Node]>::len), Some(0));

        let by_address = root.get("section_addr_list").unwrap().as_list().unwrap();
        assert_eq!(by_address.len(), 1);
        assert_eq!(by_address[0].get("sh_name").and_then(Node::as_str), Some(".text"));
        assert!(by_address[0].get("data_list").is_none());

        assert_eq!(serializer.diagnostics(), &[Diagnostic { section: 2, message: "format error: truncated symbol table".into() }]);
    }

    #[test]
    fn program_headers_decode_flags() {
        let reader = MockReader { info: FileInfo::default(), symbols: vec![], dynamic: vec![], broken: false };
        let sections = sections();
        let serializer = ModelSerializer::new(&reader, &sections, 64);
        let list = serializer.program_header_list().unwrap();
        let phdr = &list.as_list().unwrap()[0];
        assert_eq!(phdr.get("p_type").and_then(Node::as_str), Some("PT_LOAD"));
        match phdr.get("p_flags") {
            Some(Node::Flags { names, .. }) => assert_eq!(names.iter().copied().collect::<Vec<_>>(), vec!["PF_R", "PF_X"]),
            other => panic!("unexpected p_flags {:?}", other),
        }
    }

    #[test]
    fn dynamic_entries_name_needed_libraries() {
        let dynamic = vec![DynamicEntry { tag: 1, value: 1 }, DynamicEntry { tag: 12, value: 0x1000 }];
        let reader = MockReader { info: FileInfo::default(), symbols: vec![], dynamic, broken: false };
        let section = Section {
            header: SectionHeader { index: 1, kind: 6, link: 2, entry_size: 16, size: 32, ..Default::default() },
            name: ".dynamic".into(),
            blocks: vec![DataBlock { kind: BlockKind::Dyn, size: 32, offset: 0, align: 8, bytes: Some(&[][..]) }],
        };
        let sections = vec![Section { header: SectionHeader::default(), name: String::new(), blocks: vec![] }, section];
        let mut serializer = ModelSerializer::new(&reader, &sections, 64);
        let list = serializer.section_list();
        let blocks = list.as_list().unwrap()[0].get("data_list").and_then(Node::as_list).unwrap();
        let entries = blocks[0].get("dynamic_list").and_then(Node::as_list).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].get("d_tag").and_then(Node::as_str), Some("DT_NEEDED"));
        assert_eq!(entries[0].get("lib_name").and_then(Node::as_str), Some("main"));
        assert!(entries[0].get("d_ptr").is_none());

        assert_eq!(entries[1].get("d_val").and_then(Node::as_u64), Some(0x1000));
        assert!(entries[1].get("lib_name").is_none());
        assert!(entries[1].get("d_ptr").is_none());
    }
}
