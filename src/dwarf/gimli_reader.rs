//! `gimli` backend for `DebugInfoReader`.
//!
//! Every DWARF section is copied out of the object file (decompressed when needed) into
//! an `EndianArcSlice`, and all units are parsed up front. For relocatable files the
//! absolute relocations against debug sections are applied first, otherwise string and
//! line-table offsets in `.o` files would all read as zero.

use std::sync::Arc;

use gimli::{
    AttributeValue, DebugInfoOffset, Dwarf, EndianArcSlice, Endianity, Reader, RunTimeEndian, SectionId, Unit, UnitOffset,
};
use object::{Object, ObjectKind, ObjectSection, ObjectSymbol, RelocationKind, RelocationTarget};

use super::{AttrValue, DebugInfoReader, Die, DieAttribute, DieOffset, UnitId};
use crate::error::{recover, InspectError, Result};

type ArcReader = EndianArcSlice<RunTimeEndian>;

pub struct GimliReader {
    dwarf: Dwarf<ArcReader>,
    units: Vec<Unit<ArcReader>>,
    /// `.debug_info` offset of each unit header, ascending.
    starts: Vec<usize>,
}

impl GimliReader {
    pub fn load(object: &object::File<'_>) -> Result<Self> {
        let endian = if object.is_little_endian() { RunTimeEndian::Little } else { RunTimeEndian::Big };
        let relocate = object.kind() == ObjectKind::Relocatable;

        let dwarf = Dwarf::load(|id: SectionId| -> Result<ArcReader> {
            let data: Arc<[u8]> = match object.section_by_name(id.name()) {
                Some(section) => {
                    let mut bytes = section.uncompressed_data()?.into_owned();
                    if relocate {
                        apply_relocations(object, &section, &mut bytes, endian);
                    }
                    Arc::from(bytes)
                }
                None => Arc::from(Vec::new()),
            };
            Ok(EndianArcSlice::new(data, endian))
        })?;

        let mut units = Vec::new();
        let mut starts = Vec::new();
        let mut headers = dwarf.units();
        while let Some(header) = headers.next()? {
            let Some(start) = header.offset().as_debug_info_offset() else {
                continue;
            };
            starts.push(start.0);
            units.push(dwarf.unit(header)?);
        }
        tracing::debug!("loaded {} DWARF units", units.len());

        Ok(Self { dwarf, units, starts })
    }

    fn unit(&self, id: UnitId) -> Result<&Unit<ArcReader>> {
        self.units.get(id.0).ok_or(InspectError::miss("unit", id.0 as u64))
    }

    /// The unit containing `offset`, and the offset relative to it.
    fn locate(&self, offset: DieOffset) -> Result<(&Unit<ArcReader>, UnitOffset)> {
        let target = usize::try_from(offset.0)
            .map(DebugInfoOffset)
            .map_err(|_| InspectError::miss("DIE", offset.0))?;
        let position = self.starts.partition_point(|&start| start <= target.0);
        position
            .checked_sub(1)
            .and_then(|index| self.units.get(index))
            .and_then(|unit| target.to_unit_offset(&unit.header).map(|local| (unit, local)))
            .ok_or(InspectError::miss("DIE", offset.0))
    }

    fn global(unit: &Unit<ArcReader>, local: UnitOffset) -> Option<DieOffset> {
        local.to_debug_info_offset(&unit.header).map(|global| DieOffset(global.0 as u64))
    }

    /// Resolves a string attribute. An offset or index that does not resolve is a lookup miss.
    fn string(&self, unit: &Unit<ArcReader>, value: AttributeValue<ArcReader>) -> Result<String> {
        let index = match value {
            AttributeValue::DebugStrRef(offset) => offset.0 as u64,
            AttributeValue::DebugStrRefSup(offset) => offset.0 as u64,
            AttributeValue::DebugLineStrRef(offset) => offset.0 as u64,
            AttributeValue::DebugStrOffsetsIndex(index) => index.0 as u64,
            _ => 0,
        };
        let text = self.dwarf.attr_string(unit, value).map_err(|err| {
            tracing::debug!("string attribute 0x{:x}: {}", index, err);
            InspectError::miss("string", index)
        })?;
        Ok(text.to_string_lossy()?.into_owned())
    }

    fn convert(&self, unit: &Unit<ArcReader>, value: AttributeValue<ArcReader>) -> Result<AttrValue> {
        let converted = match value {
            AttributeValue::String(_)
            | AttributeValue::DebugStrRef(_)
            | AttributeValue::DebugStrRefSup(_)
            | AttributeValue::DebugLineStrRef(_)
            | AttributeValue::DebugStrOffsetsIndex(_) => match recover(self.string(unit, value))? {
                Some(text) => AttrValue::String(text),
                None => AttrValue::Other("<unresolved string>".into()),
            },
            AttributeValue::Addr(address) => AttrValue::Address(address),
            AttributeValue::DebugAddrIndex(index) => match self.dwarf.address(unit, index) {
                Ok(address) => AttrValue::Address(address),
                Err(err) => AttrValue::Other(format!("<{}>", err)),
            },
            AttributeValue::UnitRef(local) => match Self::global(unit, local) {
                Some(offset) => AttrValue::Reference(offset),
                None => AttrValue::Other(format!("<bad unit ref 0x{:x}>", local.0)),
            },
            AttributeValue::DebugInfoRef(global) => AttrValue::Reference(DieOffset(global.0 as u64)),
            AttributeValue::Flag(flag) => AttrValue::Flag(flag),
            AttributeValue::Data1(v) => AttrValue::Unsigned(v.into()),
            AttributeValue::Data2(v) => AttrValue::Unsigned(v.into()),
            AttributeValue::Data4(v) => AttrValue::Unsigned(v.into()),
            AttributeValue::Data8(v) | AttributeValue::Udata(v) | AttributeValue::FileIndex(v) => {
                AttrValue::Unsigned(v)
            }
            AttributeValue::Sdata(v) => AttrValue::Signed(v),
            AttributeValue::SecOffset(v) => AttrValue::Unsigned(v as u64),
            AttributeValue::DebugLineRef(offset) => AttrValue::Unsigned(offset.0 as u64),
            AttributeValue::Language(lang) => AttrValue::Unsigned(lang.0.into()),
            AttributeValue::Encoding(encoding) => AttrValue::Unsigned(encoding.0.into()),
            AttributeValue::Block(bytes) => AttrValue::Bytes(bytes.to_slice()?.into_owned()),
            AttributeValue::Exprloc(expr) => AttrValue::Bytes(expr.0.to_slice()?.into_owned()),
            other => AttrValue::Other(format!("{:?}", other)),
        };
        Ok(converted)
    }
}

impl DebugInfoReader for GimliReader {
    fn units(&self) -> Vec<UnitId> {
        (0..self.units.len()).map(UnitId).collect()
    }

    fn unit_root(&self, id: UnitId) -> Result<DieOffset> {
        let unit = self.unit(id)?;
        let mut cursor = unit.entries();
        let local = match cursor.next_dfs()? {
            Some((_, root)) => root.offset(),
            None => return Err(InspectError::miss("unit root", id.0 as u64)),
        };
        Self::global(unit, local).ok_or(InspectError::miss("unit root", id.0 as u64))
    }

    fn source_files(&self, id: UnitId) -> Result<Vec<String>> {
        let unit = self.unit(id)?;
        let Some(program) = &unit.line_program else {
            return Ok(Vec::new());
        };
        let header = program.header();

        let mut files = Vec::new();
        for file in header.file_names() {
            let path = self.string(unit, file.path_name())?;
            let directory = match file.directory(header) {
                Some(directory) => self.string(unit, directory)?,
                None => String::new(),
            };
            if directory.is_empty() || path.starts_with('/') {
                files.push(path);
            } else {
                files.push(format!("{}/{}", directory, path));
            }
        }
        Ok(files)
    }

    fn die(&self, offset: DieOffset) -> Result<Die> {
        let (unit, local) = self.locate(offset)?;
        let entry = unit.entry(local)?;
        let specs = unit.abbreviations.get(entry.code()).map(|abbrev| abbrev.attributes());

        let mut name = None;
        let mut attributes = Vec::new();
        let mut attrs = entry.attrs();
        while let Some(attr) = attrs.next()? {
            let form = specs
                .and_then(|specs| specs.get(attributes.len()))
                .map_or(gimli::DwForm(0), |spec| spec.form());
            let value = self.convert(unit, attr.value())?;
            if attr.name() == gimli::DW_AT_name {
                if let AttrValue::String(text) = &value {
                    name = Some(text.clone());
                }
            }
            attributes.push(DieAttribute { name: attr.name(), form, value });
        }

        Ok(Die { offset, tag: entry.tag(), abbrev_code: entry.code(), name, attributes })
    }

    fn first_child(&self, offset: DieOffset) -> Result<Option<DieOffset>> {
        let (unit, local) = self.locate(offset)?;
        let mut cursor = unit.entries_at_offset(local)?;
        let has_children = match cursor.next_dfs()? {
            Some((_, entry)) => entry.has_children(),
            None => return Ok(None),
        };
        if !has_children {
            return Ok(None);
        }
        // An empty child list is just a null entry; next_dfs then lands on a sibling.
        match cursor.next_dfs()? {
            Some((delta, child)) if delta > 0 => Ok(Self::global(unit, child.offset())),
            _ => Ok(None),
        }
    }

    fn next_sibling(&self, offset: DieOffset) -> Result<Option<DieOffset>> {
        let (unit, local) = self.locate(offset)?;
        let mut cursor = unit.entries_at_offset(local)?;
        if cursor.next_dfs()?.is_none() {
            return Ok(None);
        }
        Ok(cursor.next_sibling()?.and_then(|sibling| Self::global(unit, sibling.offset())))
    }
}

/// Applies absolute relocations against `section` to `bytes`.
///
/// Unsupported relocation kinds and sizes are left untouched.
fn apply_relocations(
    object: &object::File<'_>,
    section: &object::Section<'_, '_>,
    bytes: &mut [u8],
    endian: RunTimeEndian,
) {
    for (offset, relocation) in section.relocations() {
        if relocation.kind() != RelocationKind::Absolute {
            tracing::trace!("skipping {:?} relocation at 0x{:x}", relocation.kind(), offset);
            continue;
        }

        let symbol = match relocation.target() {
            RelocationTarget::Symbol(index) => match object.symbol_by_index(index) {
                Ok(symbol) => symbol.address(),
                Err(_) => continue,
            },
            RelocationTarget::Absolute => 0,
            _ => continue,
        };

        let Ok(offset) = usize::try_from(offset) else {
            continue;
        };
        let width = usize::from(relocation.size()) / 8;
        let Some(slot) = bytes.get_mut(offset..offset.saturating_add(width)) else {
            continue;
        };

        let Some(existing) = read_uint(slot, endian) else {
            tracing::trace!("skipping {}-bit relocation at 0x{:x}", relocation.size(), offset);
            continue;
        };
        let implicit = if relocation.has_implicit_addend() { existing } else { 0 };
        let value = symbol.wrapping_add(relocation.addend() as u64).wrapping_add(implicit);
        write_uint(slot, value, endian);
    }
}

/// Reads a relocation slot of 1, 2, 4 or 8 bytes.
fn read_uint(slot: &[u8], endian: RunTimeEndian) -> Option<u64> {
    match slot.len() {
        1 => Some(slot[0].into()),
        2 => Some(endian.read_u16(slot).into()),
        4 => Some(endian.read_u32(slot).into()),
        8 => Some(endian.read_u64(slot)),
        _ => None,
    }
}

/// Writes the low bytes of `value` into a slot of 1, 2, 4 or 8 bytes; other widths are left as is.
fn write_uint(slot: &mut [u8], value: u64, endian: RunTimeEndian) {
    match slot.len() {
        1 => slot[0] = value as u8,
        2 => endian.write_u16(slot, value as u16),
        4 => endian.write_u32(slot, value as u32),
        8 => endian.write_u64(slot, value),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_round_trip_respects_byte_order() {
        let mut slot = [0u8; 4];
        write_uint(&mut slot, 0x1234_5678, RunTimeEndian::Big);
        assert_eq!(slot, [0x12, 0x34, 0x56, 0x78]);
        assert_eq!(read_uint(&slot, RunTimeEndian::Big), 0x1234_5678);

        write_uint(&mut slot, 0x1234_5678, RunTimeEndian::Little);
        assert_eq!(slot, [0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn odd_relocation_widths_are_not_touched() {
        let mut slot = [0xaau8; 3];
        assert_eq!(read_uint(&slot, RunTimeEndian::Little), None);
        write_uint(&mut slot, 0x1234_5678, RunTimeEndian::Little);
        assert_eq!(slot, [0xaa; 3]);

        let mut wide = [0u8; 8];
        write_uint(&mut wide, 0x0102_0304_0506_0708, RunTimeEndian::Big);
        assert_eq!(wide, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(read_uint(&wide[..2], RunTimeEndian::Little), Some(0x0201));
    }

    #[test]
    fn object_without_debug_info_has_no_units() {
        use object::write::Object as WriteObject;
        use object::{Architecture, BinaryFormat, Endianness};

        let data = WriteObject::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little)
            .write()
            .unwrap();
        let file = object::File::parse(&*data).unwrap();
        let reader = GimliReader::load(&file).unwrap();
        assert!(reader.units().is_empty());
        assert!(reader.die(DieOffset(0x0b)).unwrap_err().is_recoverable());
    }
}
