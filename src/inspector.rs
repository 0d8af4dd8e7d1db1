//! Inspection session.
//!
//! This module contains the `Inspector` which orchestrates one run over a mapped file:
//! 1. Loading: reads every section header and its data blocks through the reader.
//! 2. Layout: serializes header, segments and sections into the output tree.
//! 3. Debug entities: walks each DWARF compile unit for definitions (and, on request,
//!    dumps every DIE).

use object::FileKind;

use crate::config::InspectOptions;
use crate::dwarf::{DebugInfoReader, GimliReader, UnitId};
use crate::error::{recover, InspectError, Result};
use crate::layout::Section;
use crate::node::Node;
use crate::reader::elf::open_elf;
use crate::reader::ObjectReader;
use crate::serializer::{Diagnostic, ModelSerializer};
use crate::walker::{DieWalker, UnitDefinitions};

pub struct Inspector<'a, 'data> {
    reader: &'a dyn ObjectReader<'data>,
    sections: Vec<Section<'data>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, 'data> Inspector<'a, 'data> {
    /// Loads every section, including the null section at index 0.
    ///
    /// A section whose data cannot be read keeps its header and gets a diagnostic.
    pub fn new(reader: &'a dyn ObjectReader<'data>) -> Result<Self> {
        let mut sections = Vec::with_capacity(reader.section_count());
        let mut diagnostics = Vec::new();

        for index in 0..reader.section_count() {
            let header = reader.section_header(index)?;
            let name = recover(reader.section_name(&header))?.map(|n| n.into_owned()).unwrap_or_default();

            let mut blocks = Vec::new();
            let mut loaded = 0u64;
            let mut ordinal = 0;
            while loaded < header.size {
                match reader.data_block(&header, ordinal) {
                    Ok(Some(block)) => {
                        loaded = loaded.saturating_add(block.size);
                        blocks.push(block);
                    }
                    Ok(None) => break,
                    Err(err) => {
                        tracing::warn!("section {} ({}): {}", index, name, err);
                        diagnostics.push(Diagnostic { section: index, message: err.to_string() });
                        break;
                    }
                }
                ordinal += 1;
            }

            tracing::debug!("loaded section {} '{}' with {} block(s)", index, name, blocks.len());
            sections.push(Section { header, name, blocks });
        }

        Ok(Self { reader, sections, diagnostics })
    }

    pub fn sections(&self) -> &[Section<'data>] {
        &self.sections
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The layout model. Diagnostics raised while serializing are kept on the inspector.
    pub fn layout(&mut self, preview_len: usize) -> Result<Node> {
        let mut serializer = ModelSerializer::new(self.reader, &self.sections, preview_len)
            .with_diagnostics(std::mem::take(&mut self.diagnostics));
        let model = serializer.serialize();
        self.diagnostics = serializer.into_diagnostics();
        model
    }
}

/// Debug entities of every compile unit, plus a DIE dump when requested.
///
/// A unit that fails to decode gets an `error` entry in place of its definitions;
/// the remaining units are still walked.
pub fn debug_entities<R: DebugInfoReader + ?Sized>(reader: &R, options: &InspectOptions) -> Node {
    let walker = DieWalker::new(reader, options.max_spec_hops);

    let mut units = Vec::new();
    for unit in reader.units() {
        match walker.unit_definitions(unit) {
            Ok(Some(defs)) => {
                for def in &defs.definitions {
                    tracing::info!("CU: {}, {}: {}", def.unit, def.kind.label(), def.name);
                }
                units.push(unit_node(&defs));
            }
            Ok(None) => {}
            Err(err) => units.push(unit_error(unit, &err)),
        }
    }

    let mut node = Node::map().field("compile_unit_list", Node::List(units));
    if options.dump_dies {
        let dumps = reader
            .units()
            .into_iter()
            .map(|unit| walker.dump_unit(unit).unwrap_or_else(|err| unit_error(unit, &err)))
            .collect();
        node.push("die_dump", Node::List(dumps));
    }
    node.build()
}

fn unit_error(unit: UnitId, err: &InspectError) -> Node {
    tracing::warn!("compile unit {}: {}", unit.0, err);
    Node::map().number("unit_index", unit.0 as u64).text("error", err.to_string()).build()
}

fn unit_node(unit: &UnitDefinitions) -> Node {
    let definitions = unit
        .definitions
        .iter()
        .map(|def| {
            Node::map()
                .text("kind", def.kind.label())
                .text("name", def.name.as_str())
                .number("offset", def.offset.0)
                .build()
        })
        .collect();
    Node::map()
        .number("unit_index", unit.unit.0 as u64)
        .text("cu_name", unit.name.as_str())
        .field("source_files", Node::List(unit.source_files.iter().cloned().map(Node::Text).collect()))
        .field("definition_list", Node::List(definitions))
        .build()
}

/// Inspects an in-memory ELF file.
///
/// The layout fields come first, at the top level; debug entities follow under `dwarf`.
/// Debug info that cannot be loaded becomes `dwarf.error` and leaves the layout intact.
pub fn inspect(data: &[u8], options: &InspectOptions) -> Result<Node> {
    match FileKind::parse(data) {
        Ok(FileKind::Elf32) | Ok(FileKind::Elf64) => {}
        _ => return Err(InspectError::Format("not an ELF file".into())),
    }

    let mut entries = Vec::new();
    if options.layout {
        let reader = open_elf(data)?;
        let mut inspector = Inspector::new(reader.as_ref())?;
        if let Node::Map(fields) = inspector.layout(options.preview_len)? {
            entries.extend(fields);
        }
        if !inspector.diagnostics().is_empty() {
            tracing::warn!("{} section(s) could not be fully decoded", inspector.diagnostics().len());
        }
    }

    if options.dwarf {
        let dwarf = object::File::parse(data)
            .map_err(InspectError::from)
            .and_then(|object| GimliReader::load(&object))
            .map(|dwarf| debug_entities(&dwarf, options));
        let node = dwarf.unwrap_or_else(|err| {
            tracing::warn!("debug info: {}", err);
            Node::map().text("error", err.to_string()).build()
        });
        entries.push(("dwarf".to_string(), node));
    }

    Ok(Node::Map(entries))
}
