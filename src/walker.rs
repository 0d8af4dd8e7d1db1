//! Debug-entity tree walker.
//!
//! Walks each compile unit's DIE tree in pre-order and reports the functions and
//! variables it defines. A definition DIE often carries no name of its own and points
//! at its declaration through `DW_AT_specification`; names are recovered by following
//! that link, with a bound on the number of hops so cyclic or pathological chains
//! always terminate.

use std::collections::HashSet;

use gimli::DwTag;

use crate::dwarf::{AttrValue, DebugInfoReader, Die, DieOffset, UnitId};
use crate::error::{recover, InspectError, Result};
use crate::node::{MapBuilder, Node};
use crate::tables;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Function,
    Variable,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Function => "Function",
            EntityKind::Variable => "Variable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Definition(EntityKind),
    Declaration(EntityKind),
    Unclassified,
}

/// Classifies a DIE by tag and attributes.
///
/// A subprogram defines code when it has `DW_AT_low_pc` or `DW_AT_ranges`; a variable
/// defines storage when it has `DW_AT_location`. Other tags are not classified.
pub fn classify(die: &Die) -> Classification {
    let (kind, defined) = match die.tag {
        gimli::DW_TAG_subprogram => {
            (EntityKind::Function, die.has(gimli::DW_AT_low_pc) || die.has(gimli::DW_AT_ranges))
        }
        gimli::DW_TAG_variable => (EntityKind::Variable, die.has(gimli::DW_AT_location)),
        _ => return Classification::Unclassified,
    };
    if defined {
        Classification::Definition(kind)
    } else {
        Classification::Declaration(kind)
    }
}

/// A function or variable defined in a compile unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// Name of the compile unit.
    pub unit: String,
    pub name: String,
    pub kind: EntityKind,
    pub offset: DieOffset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDefinitions {
    pub unit: UnitId,
    pub name: String,
    pub source_files: Vec<String>,
    pub definitions: Vec<Definition>,
}

pub struct DieWalker<'r, R: DebugInfoReader + ?Sized> {
    reader: &'r R,
    max_spec_hops: usize,
}

impl<'r, R: DebugInfoReader + ?Sized> DieWalker<'r, R> {
    pub fn new(reader: &'r R, max_spec_hops: usize) -> Self {
        Self { reader, max_spec_hops }
    }

    /// Name of the DIE at `offset`, following `DW_AT_specification` when it has none.
    ///
    /// Fails with `UnboundedReference` when the chain revisits a DIE or needs more than
    /// `max_spec_hops` hops.
    pub fn chase_name(&self, offset: DieOffset) -> Result<Option<String>> {
        let mut visited = HashSet::new();
        let mut current = offset;
        loop {
            if !visited.insert(current) || visited.len() > self.max_spec_hops + 1 {
                return Err(InspectError::UnboundedReference { offset: offset.0, hops: self.max_spec_hops });
            }
            let die = self.reader.die(current)?;
            if let Some(name) = die.name {
                return Ok(Some(name));
            }
            match die.specification() {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
    }

    /// Like [`Self::chase_name`], with broken or unbounded chains reported as "no name".
    pub fn resolve_name(&self, offset: DieOffset) -> Result<Option<String>> {
        Ok(recover(self.chase_name(offset))?.flatten())
    }

    /// Definitions of every compile unit, in unit order.
    pub fn definitions(&self) -> Result<Vec<UnitDefinitions>> {
        let mut all = Vec::new();
        for unit in self.reader.units() {
            if let Some(defs) = self.unit_definitions(unit)? {
                all.push(defs);
            }
        }
        Ok(all)
    }

    /// Definitions in one unit, or `None` when its root is not a named compile unit.
    pub fn unit_definitions(&self, unit: UnitId) -> Result<Option<UnitDefinitions>> {
        let root = self.reader.unit_root(unit)?;
        let die = self.reader.die(root)?;
        if die.tag != gimli::DW_TAG_compile_unit {
            tracing::debug!("skipping unit {} with root tag {}", unit.0, tag_name(die.tag));
            return Ok(None);
        }
        let Some(name) = die.name else {
            tracing::debug!("skipping unnamed compile unit {}", unit.0);
            return Ok(None);
        };

        let source_files = recover(self.reader.source_files(unit))?.unwrap_or_default();
        let mut definitions = Vec::new();
        self.collect(root, &name, &mut definitions)?;
        Ok(Some(UnitDefinitions { unit, name, source_files, definitions }))
    }

    /// Pre-order walk over `first` and its siblings. Subprogram subtrees are not entered,
    /// so locals never show up as definitions.
    fn collect(&self, first: DieOffset, unit_name: &str, out: &mut Vec<Definition>) -> Result<()> {
        let mut next = Some(first);
        while let Some(offset) = next {
            let die = self.reader.die(offset)?;
            if let Classification::Definition(kind) = classify(&die) {
                if let Some(name) = self.resolve_name(offset)? {
                    out.push(Definition { unit: unit_name.to_string(), name, kind, offset });
                }
            }
            if die.tag != gimli::DW_TAG_subprogram {
                if let Some(child) = self.reader.first_child(offset)? {
                    self.collect(child, unit_name, out)?;
                }
            }
            next = self.reader.next_sibling(offset)?;
        }
        Ok(())
    }

    /// Every DIE of a unit in pre-order, children nested under their parent.
    pub fn dump_unit(&self, unit: UnitId) -> Result<Node> {
        let root = self.reader.unit_root(unit)?;
        let source_files = recover(self.reader.source_files(unit))?.unwrap_or_default();
        Ok(Node::map()
            .number("unit_index", unit.0 as u64)
            .field("source_files", Node::List(source_files.into_iter().map(Node::Text).collect()))
            .field("die_list", Node::List(self.dump_siblings(root)?))
            .build())
    }

    fn dump_siblings(&self, first: DieOffset) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        let mut next = Some(first);
        while let Some(offset) = next {
            let die = self.reader.die(offset)?;
            let mut node = self.describe(&die);
            if let Some(target) = die.specification() {
                let inlined = recover(self.reader.die(target))?;
                node.push("specification", inlined.map_or(Node::Text(String::new()), |spec| self.describe(&spec).build()));
            }
            if let Some(child) = self.reader.first_child(offset)? {
                node.push("children", Node::List(self.dump_siblings(child)?));
            }
            nodes.push(node.build());
            next = self.reader.next_sibling(offset)?;
        }
        Ok(nodes)
    }

    fn describe(&self, die: &Die) -> MapBuilder {
        let attributes = die
            .attributes
            .iter()
            .map(|attr| {
                Node::map()
                    .field("attr", Node::code(&tables::DWARF_ATTRIBUTE, attr.name.0.into()))
                    .field("form", Node::code(&tables::DWARF_FORM, attr.form.0.into()))
                    .field("value", attr_node(&attr.value))
                    .build()
            })
            .collect();
        Node::map()
            .number("offset", die.offset.0)
            .field("tag", Node::code(&tables::DWARF_TAG, die.tag.0.into()))
            .optional("name", die.name.clone().map(Node::Text))
            .number("abbrev_code", die.abbrev_code)
            .field("attribute_list", Node::List(attributes))
    }
}

fn tag_name(tag: DwTag) -> &'static str {
    tables::DWARF_TAG.name(tag.0.into())
}

fn attr_node(value: &AttrValue) -> Node {
    match value {
        AttrValue::String(text) | AttrValue::Other(text) => Node::Text(text.clone()),
        AttrValue::Unsigned(n) | AttrValue::Address(n) => Node::Number(*n),
        AttrValue::Signed(n) => Node::Signed(*n),
        AttrValue::Reference(offset) => Node::Number(offset.0),
        AttrValue::Flag(flag) => Node::Bool(*flag),
        AttrValue::Bytes(bytes) => Node::Bytes(bytes.clone()),
    }
}
