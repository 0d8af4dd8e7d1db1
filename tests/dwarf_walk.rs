use elfprobe::config::InspectOptions;
use elfprobe::dwarf::{AttrValue, DebugInfoReader, DieOffset, GimliReader, UnitId};
use elfprobe::inspect;
use elfprobe::node::Node;
use elfprobe::walker::{DieWalker, EntityKind};
use gimli::write::{Address, AttributeValue, Dwarf, DwarfUnit, EndianVec, LineProgram, Sections, Unit};
use gimli::{Encoding, Format, LittleEndian};
use object::write::Object;
use object::{Architecture, BinaryFormat, Endianness, SectionKind};

/// An x86_64 ELF object holding one compile unit `cu1`:
///
/// - `v` declared, then defined through `DW_AT_specification`
/// - `f` with code, and a local inside it
/// - `g` without a code range
/// - two unnamed variables whose specifications point at each other
fn fixture() -> Vec<u8> {
    let mut dwarf = DwarfUnit::new(encoding());
    let unit = &mut dwarf.unit;
    let root = unit.root();
    unit.get_mut(root).set(gimli::DW_AT_name, AttributeValue::String(b"cu1".to_vec()));

    let decl = unit.add(root, gimli::DW_TAG_variable);
    unit.get_mut(decl).set(gimli::DW_AT_name, AttributeValue::String(b"v".to_vec()));
    unit.get_mut(decl).set(gimli::DW_AT_declaration, AttributeValue::Flag(true));

    let def = unit.add(root, gimli::DW_TAG_variable);
    unit.get_mut(def).set(gimli::DW_AT_specification, AttributeValue::UnitRef(decl));
    // DW_OP_addr 0
    unit.get_mut(def).set(gimli::DW_AT_location, AttributeValue::Block(vec![0x03, 0, 0, 0, 0, 0, 0, 0, 0]));

    let f = unit.add(root, gimli::DW_TAG_subprogram);
    unit.get_mut(f).set(gimli::DW_AT_name, AttributeValue::String(b"f".to_vec()));
    unit.get_mut(f).set(gimli::DW_AT_low_pc, AttributeValue::Address(Address::Constant(0x1000)));
    unit.get_mut(f).set(gimli::DW_AT_high_pc, AttributeValue::Udata(0x20));
    let local = unit.add(f, gimli::DW_TAG_variable);
    unit.get_mut(local).set(gimli::DW_AT_name, AttributeValue::String(b"local".to_vec()));
    // DW_OP_fbreg -8
    unit.get_mut(local).set(gimli::DW_AT_location, AttributeValue::Block(vec![0x91, 0x78]));

    let g = unit.add(root, gimli::DW_TAG_subprogram);
    unit.get_mut(g).set(gimli::DW_AT_name, AttributeValue::String(b"g".to_vec()));
    // DW_OP_reg6
    unit.get_mut(g).set(gimli::DW_AT_frame_base, AttributeValue::Block(vec![0x56]));

    let first = unit.add(root, gimli::DW_TAG_variable);
    let second = unit.add(root, gimli::DW_TAG_variable);
    unit.get_mut(first).set(gimli::DW_AT_specification, AttributeValue::UnitRef(second));
    unit.get_mut(first).set(gimli::DW_AT_location, AttributeValue::Block(vec![0x50]));
    unit.get_mut(second).set(gimli::DW_AT_specification, AttributeValue::UnitRef(first));
    unit.get_mut(second).set(gimli::DW_AT_location, AttributeValue::Block(vec![0x51]));

    let mut sections = Sections::new(EndianVec::new(LittleEndian));
    dwarf.write(&mut sections).unwrap();
    elf_with(&sections, &[])
}

/// Wraps written DWARF sections in an ELF object, leaving out the sections named in `skip`.
fn elf_with(sections: &Sections<EndianVec<LittleEndian>>, skip: &[&str]) -> Vec<u8> {
    let mut obj = Object::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
    sections
        .for_each(|id, data| {
            if !data.slice().is_empty() && !skip.contains(&id.name()) {
                let section = obj.add_section(Vec::new(), id.name().as_bytes().to_vec(), SectionKind::Debug);
                obj.append_section_data(section, data.slice(), 1);
            }
            Ok::<(), gimli::write::Error>(())
        })
        .unwrap();
    obj.write().unwrap()
}

fn encoding() -> Encoding {
    Encoding { format: Format::Dwarf32, version: 4, address_size: 8 }
}

/// `cu1` with one variable named through `.debug_str`, written without that section,
/// and one variable `w` named inline.
fn missing_string_fixture() -> Vec<u8> {
    let mut dwarf = DwarfUnit::new(encoding());
    let hidden = dwarf.strings.add("hidden");
    let unit = &mut dwarf.unit;
    let root = unit.root();
    unit.get_mut(root).set(gimli::DW_AT_name, AttributeValue::String(b"cu1".to_vec()));

    let first = unit.add(root, gimli::DW_TAG_variable);
    unit.get_mut(first).set(gimli::DW_AT_name, AttributeValue::StringRef(hidden));
    unit.get_mut(first).set(gimli::DW_AT_location, AttributeValue::Block(vec![0x50]));

    let second = unit.add(root, gimli::DW_TAG_variable);
    unit.get_mut(second).set(gimli::DW_AT_name, AttributeValue::String(b"w".to_vec()));
    unit.get_mut(second).set(gimli::DW_AT_location, AttributeValue::Block(vec![0x51]));

    let mut sections = Sections::new(EndianVec::new(LittleEndian));
    dwarf.write(&mut sections).unwrap();
    elf_with(&sections, &[".debug_str"])
}

/// `count` compile units `cu0`, `cu1`, ..., each defining one variable `x0`, `x1`, ...
fn many_units_fixture(count: usize) -> Vec<u8> {
    let mut dwarf = Dwarf::new();
    for i in 0..count {
        let id = dwarf.units.add(Unit::new(encoding(), LineProgram::none()));
        let unit = dwarf.units.get_mut(id);
        let root = unit.root();
        unit.get_mut(root).set(gimli::DW_AT_name, AttributeValue::String(format!("cu{}", i).into_bytes()));
        let var = unit.add(root, gimli::DW_TAG_variable);
        unit.get_mut(var).set(gimli::DW_AT_name, AttributeValue::String(format!("x{}", i).into_bytes()));
        unit.get_mut(var).set(gimli::DW_AT_location, AttributeValue::Block(vec![0x50]));
    }

    let mut sections = Sections::new(EndianVec::new(LittleEndian));
    dwarf.write(&mut sections).unwrap();
    elf_with(&sections, &[])
}

fn reader(data: &[u8]) -> GimliReader {
    let object = object::File::parse(data).unwrap();
    GimliReader::load(&object).unwrap()
}

#[test]
fn walker_reports_definitions_only() {
    let data = fixture();
    let reader = reader(&data);
    assert_eq!(reader.units(), vec![UnitId(0)]);

    let walker = DieWalker::new(&reader, 8);
    let units = walker.definitions().unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].name, "cu1");
    assert!(units[0].source_files.is_empty());

    let found: Vec<_> = units[0].definitions.iter().map(|d| (d.kind, d.name.as_str())).collect();
    assert_eq!(found, vec![(EntityKind::Variable, "v"), (EntityKind::Function, "f")]);
    assert!(units[0].definitions.iter().all(|d| d.unit == "cu1"));
}

#[test]
fn unit_root_is_the_compile_unit() {
    let data = fixture();
    let reader = reader(&data);
    let root = reader.unit_root(UnitId(0)).unwrap();
    let die = reader.die(root).unwrap();
    assert_eq!(die.tag, gimli::DW_TAG_compile_unit);
    assert_eq!(die.name.as_deref(), Some("cu1"));

    let child = reader.first_child(root).unwrap().unwrap();
    let decl = reader.die(child).unwrap();
    assert_eq!(decl.name.as_deref(), Some("v"));
    assert!(decl.has(gimli::DW_AT_declaration));

    let next = reader.next_sibling(child).unwrap().unwrap();
    let def = reader.die(next).unwrap();
    assert!(def.name.is_none());
    assert_eq!(def.specification(), Some(child));
}

#[test]
fn cyclic_specification_has_no_name() {
    let data = fixture();
    let reader = reader(&data);
    let walker = DieWalker::new(&reader, 8);
    let root = reader.unit_root(UnitId(0)).unwrap();

    let mut last = reader.first_child(root).unwrap();
    let mut offsets = Vec::new();
    while let Some(offset) = last {
        offsets.push(offset);
        last = reader.next_sibling(offset).unwrap();
    }
    // v, definition of v, f, g, then the two cyclic variables
    assert_eq!(offsets.len(), 6);
    assert!(walker.chase_name(offsets[4]).is_err());
    assert_eq!(walker.resolve_name(offsets[5]).unwrap(), None);
    assert_eq!(walker.resolve_name(offsets[1]).unwrap().as_deref(), Some("v"));
}

#[test]
fn inspect_lists_compile_units() {
    let data = fixture();
    let model = inspect(&data, &InspectOptions::default()).unwrap();
    let units = model.get("dwarf").and_then(|d| d.get("compile_unit_list")).and_then(Node::as_list).unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].get("cu_name").and_then(Node::as_str), Some("cu1"));

    let definitions = units[0].get("definition_list").and_then(Node::as_list).unwrap();
    let found: Vec<_> = definitions
        .iter()
        .map(|d| (d.get("kind").and_then(Node::as_str).unwrap(), d.get("name").and_then(Node::as_str).unwrap()))
        .collect();
    assert_eq!(found, vec![("Variable", "v"), ("Function", "f")]);
    assert!(model.get("dwarf").and_then(|d| d.get("die_dump")).is_none());
}

#[test]
fn die_dump_inlines_specifications() {
    let data = fixture();
    let options = InspectOptions { layout: false, dump_dies: true, ..InspectOptions::default() };
    let model = inspect(&data, &options).unwrap();
    assert!(model.get("section_list").is_none());

    let dumps = model.get("dwarf").and_then(|d| d.get("die_dump")).and_then(Node::as_list).unwrap();
    assert_eq!(dumps.len(), 1);
    let dies = dumps[0].get("die_list").and_then(Node::as_list).unwrap();
    assert_eq!(dies.len(), 1);
    assert_eq!(dies[0].get("tag").and_then(Node::as_str), Some("DW_TAG_compile_unit"));

    let children = dies[0].get("children").and_then(Node::as_list).unwrap();
    assert_eq!(children.len(), 6);
    let inlined = children[1].get("specification").unwrap();
    assert_eq!(inlined.get("name").and_then(Node::as_str), Some("v"));

    // the local lives under f
    let locals = children[2].get("children").and_then(Node::as_list).unwrap();
    assert_eq!(locals[0].get("name").and_then(Node::as_str), Some("local"));
}

#[test]
fn unresolved_name_string_degrades_to_no_name() {
    let data = missing_string_fixture();
    let reader = reader(&data);
    let root = reader.unit_root(UnitId(0)).unwrap();
    let first = reader.first_child(root).unwrap().unwrap();
    let die = reader.die(first).unwrap();
    assert!(die.name.is_none());
    let name = die.attribute(gimli::DW_AT_name).unwrap();
    assert_eq!(name.form, gimli::DW_FORM_strp);
    assert!(matches!(name.value, AttrValue::Other(_)));

    let options = InspectOptions { layout: false, ..InspectOptions::default() };
    let model = inspect(&data, &options).unwrap();
    let units = model.get("dwarf").and_then(|d| d.get("compile_unit_list")).and_then(Node::as_list).unwrap();
    assert_eq!(units.len(), 1);
    assert!(units[0].get("error").is_none());
    let definitions = units[0].get("definition_list").and_then(Node::as_list).unwrap();
    let names: Vec<_> = definitions.iter().filter_map(|d| d.get("name").and_then(Node::as_str)).collect();
    assert_eq!(names, vec!["w"]);
}

#[test]
fn broken_debug_info_keeps_the_layout() {
    let mut obj = Object::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
    let section = obj.add_section(Vec::new(), b".debug_info".to_vec(), SectionKind::Debug);
    // unit_length 0x40, version 4, then nothing
    obj.append_section_data(section, &[0x40, 0, 0, 0, 0x04, 0], 1);
    let data = obj.write().unwrap();

    let model = inspect(&data, &InspectOptions::default()).unwrap();
    let sections = model.get("section_list").and_then(Node::as_list).unwrap();
    assert!(sections.iter().any(|s| s.get("sh_name").and_then(Node::as_str) == Some(".debug_info")));

    let dwarf = model.get("dwarf").unwrap();
    assert!(dwarf.get("error").and_then(Node::as_str).is_some());
    assert!(dwarf.get("compile_unit_list").is_none());
}

#[test]
fn dies_are_found_in_every_unit() {
    let data = many_units_fixture(5);
    let reader = reader(&data);
    assert_eq!(reader.units().len(), 5);

    for unit in reader.units() {
        let root = reader.unit_root(unit).unwrap();
        assert_eq!(reader.die(root).unwrap().name, Some(format!("cu{}", unit.0)));
        let child = reader.first_child(root).unwrap().unwrap();
        assert_eq!(reader.die(child).unwrap().name, Some(format!("x{}", unit.0)));
        assert_eq!(reader.next_sibling(child).unwrap(), None);
    }
    assert!(reader.die(DieOffset(1 << 40)).unwrap_err().is_recoverable());

    let units = DieWalker::new(&reader, 8).definitions().unwrap();
    let found: Vec<_> = units.iter().map(|u| (u.name.as_str(), u.definitions[0].name.as_str())).collect();
    assert_eq!(found, vec![("cu0", "x0"), ("cu1", "x1"), ("cu2", "x2"), ("cu3", "x3"), ("cu4", "x4")]);
}
