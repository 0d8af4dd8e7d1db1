//! ELF backend.
//!
//! Implements the `ObjectReader` trait for ELF32 and ELF64 files of either byte order,
//! on top of the `object` crate's low-level ELF structures.

use std::borrow::Cow;
use std::mem;

use object::read::elf::{
    Dyn as _, FileHeader, ProgramHeader as _, Rel as _, Rela as _, SectionHeader as _, SectionTable, Sym as _,
};
use object::read::SectionIndex;
use object::{elf, pod, Endianness, FileKind};

use super::{FileInfo, ObjectReader};
use crate::error::{InspectError, Result};
use crate::layout::{BlockKind, DataBlock, SectionHeader, Segment, SHT_NOBITS};
use crate::symbol::{DynamicEntry, RelocationEntry, SymbolRecord};

pub type ElfReader32<'data> = ElfReader<'data, elf::FileHeader32<Endianness>>;
pub type ElfReader64<'data> = ElfReader<'data, elf::FileHeader64<Endianness>>;

/// Reads an ELF file mapped in memory.
pub struct ElfReader<'data, Elf: FileHeader<Endian = Endianness>> {
    data: &'data [u8],
    endian: Endianness,
    header: &'data Elf,
    sections: SectionTable<'data, Elf>,
    segments: &'data [Elf::ProgramHeader],
    info: FileInfo,
}

/// Opens `data` with the backend matching its ELF class.
pub fn open_elf<'data>(data: &'data [u8]) -> Result<Box<dyn ObjectReader<'data> + 'data>> {
    let kind = FileKind::parse(data).map_err(|_| InspectError::Format("unrecognized file magic".into()))?;
    match kind {
        FileKind::Elf32 => Ok(Box::new(ElfReader32::parse(data)?)),
        FileKind::Elf64 => Ok(Box::new(ElfReader64::parse(data)?)),
        other => Err(InspectError::Format(format!("not an ELF file: {:?}", other))),
    }
}

impl<'data, Elf: FileHeader<Endian = Endianness>> ElfReader<'data, Elf> {
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let header = Elf::parse(data)?;
        let endian = header.endian()?;
        let sections = header.sections(endian, data)?;
        let segments = header.program_headers(endian, data)?;
        let ident = header.e_ident();

        let mut info = FileInfo {
            class: ident.class,
            data: ident.data,
            ident_version: ident.version,
            os_abi: ident.os_abi,
            abi_version: ident.abi_version,
            kind: header.e_type(endian),
            machine: header.e_machine(endian),
            version: header.e_version(endian),
            entry: header.e_entry(endian).into(),
            phoff: header.e_phoff(endian).into(),
            shoff: header.e_shoff(endian).into(),
            flags: header.e_flags(endian),
            ehsize: header.e_ehsize(endian),
            phentsize: header.e_phentsize(endian),
            phnum: segments.len(),
            shentsize: header.e_shentsize(endian),
            shnum: sections.len(),
            shstrndx: header.shstrndx(endian, data)? as usize,
            ..Default::default()
        };

        for (index, section) in sections.iter().enumerate() {
            let link = section.sh_link(endian) as usize;
            match section.sh_type(endian) {
                elf::SHT_SYMTAB if info.symtab_index == 0 => {
                    info.symtab_index = index;
                    info.strtab_index = link;
                }
                elf::SHT_DYNSYM if info.dynsym_index == 0 => {
                    info.dynsym_index = index;
                    info.dynstr_index = link;
                }
                _ => {}
            }
        }

        tracing::debug!(
            "parsed ELF header: class={} machine={} sections={} segments={}",
            info.class,
            info.machine,
            info.shnum,
            info.phnum
        );

        Ok(Self { data, endian, header, sections, segments, info })
    }

    /// The raw header at `index`, including the null section at index 0.
    fn raw_section(&self, index: usize) -> Result<&'data Elf::SectionHeader> {
        self.sections.iter().as_slice().get(index).ok_or(InspectError::miss("section", index as u64))
    }
}

/// The `index`-th fixed-size record of type `T` in a block, `None` past the end.
fn record<'data, T: pod::Pod>(block: &DataBlock<'data>, index: usize) -> Option<&'data T> {
    let bytes = block.bytes?;
    let size = mem::size_of::<T>();
    let start = index.checked_mul(size)?;
    let raw = bytes.get(start..start.checked_add(size)?)?;
    pod::from_bytes::<T>(raw).ok().map(|(value, _)| value)
}

impl<'data, Elf: FileHeader<Endian = Endianness>> ObjectReader<'data> for ElfReader<'data, Elf> {
    fn file_info(&self) -> &FileInfo {
        &self.info
    }

    fn segments(&self) -> Result<Vec<Segment>> {
        let endian = self.endian;
        Ok(self
            .segments
            .iter()
            .map(|phdr| Segment {
                kind: phdr.p_type(endian),
                flags: phdr.p_flags(endian),
                offset: phdr.p_offset(endian).into(),
                virtual_address: phdr.p_vaddr(endian).into(),
                physical_address: phdr.p_paddr(endian).into(),
                file_size: phdr.p_filesz(endian).into(),
                memory_size: phdr.p_memsz(endian).into(),
                align: phdr.p_align(endian).into(),
            })
            .collect())
    }

    fn section_count(&self) -> usize {
        self.sections.len()
    }

    fn section_header(&self, index: usize) -> Result<SectionHeader> {
        let endian = self.endian;
        let raw = self.raw_section(index)?;
        Ok(SectionHeader {
            index,
            name_offset: raw.sh_name(endian),
            kind: raw.sh_type(endian),
            flags: raw.sh_flags(endian).into(),
            address: raw.sh_addr(endian).into(),
            offset: raw.sh_offset(endian).into(),
            size: raw.sh_size(endian).into(),
            link: raw.sh_link(endian),
            info: raw.sh_info(endian),
            align: raw.sh_addralign(endian).into(),
            entry_size: raw.sh_entsize(endian).into(),
        })
    }

    fn data_block(&self, section: &SectionHeader, ordinal: usize) -> Result<Option<DataBlock<'data>>> {
        // ELF sections are backed by a single contiguous run.
        if ordinal > 0 || section.size == 0 {
            return Ok(None);
        }

        let bytes = if section.kind == SHT_NOBITS {
            None
        } else {
            Some(self.raw_section(section.index)?.data(self.endian, self.data)?)
        };

        Ok(Some(DataBlock {
            kind: BlockKind::for_section(section.kind, section.flags),
            size: bytes.map_or(section.size, |b| b.len() as u64),
            offset: 0,
            align: section.align,
            bytes,
        }))
    }

    fn symbol(&self, block: &DataBlock<'data>, index: usize) -> Result<Option<SymbolRecord>> {
        let endian = self.endian;
        Ok(record::<Elf::Sym>(block, index).map(|sym| SymbolRecord {
            name_offset: sym.st_name(endian),
            value: sym.st_value(endian).into(),
            size: sym.st_size(endian).into(),
            section_index: sym.st_shndx(endian),
            info: sym.st_info(),
            other: sym.st_other(),
        }))
    }

    fn dynamic_entry(&self, block: &DataBlock<'data>, index: usize) -> Result<Option<DynamicEntry>> {
        let endian = self.endian;
        Ok(record::<Elf::Dyn>(block, index).map(|dynamic| DynamicEntry {
            tag: dynamic.d_tag(endian).into(),
            value: dynamic.d_val(endian).into(),
        }))
    }

    fn rela_entry(&self, block: &DataBlock<'data>, index: usize) -> Result<Option<RelocationEntry>> {
        let endian = self.endian;
        let mips64el = self.header.is_mips64el(endian);
        Ok(record::<Elf::Rela>(block, index).map(|rela| RelocationEntry {
            offset: rela.r_offset(endian).into(),
            symbol: rela.r_sym(endian, mips64el),
            kind: rela.r_type(endian, mips64el),
            addend: Some(rela.r_addend(endian).into()),
        }))
    }

    fn rel_entry(&self, block: &DataBlock<'data>, index: usize) -> Result<Option<RelocationEntry>> {
        let endian = self.endian;
        Ok(record::<Elf::Rel>(block, index).map(|rel| RelocationEntry {
            offset: rel.r_offset(endian).into(),
            symbol: rel.r_sym(endian),
            kind: rel.r_type(endian),
            addend: None,
        }))
    }

    fn string(&self, section: usize, offset: u64) -> Result<Cow<'data, str>> {
        let table = self
            .sections
            .strings(self.endian, self.data, SectionIndex(section))
            .map_err(|_| InspectError::miss("string table", section as u64))?;
        let bytes = u32::try_from(offset)
            .ok()
            .and_then(|offset| table.get(offset).ok())
            .ok_or(InspectError::miss("string", offset))?;
        Ok(String::from_utf8_lossy(bytes))
    }
}
