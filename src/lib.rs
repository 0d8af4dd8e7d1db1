//! ELF and DWARF introspection library.
//!
//! This library provides the core components for the `elfprobe` tool.
//! It is organized into several modules:
//! - `config`: CLI configuration and inspection options.
//! - `error`: Error types.
//! - `tables`: Symbolic names for ELF and DWARF codes.
//! - `crc`: Content fingerprints.
//! - `layout`: Sections, data blocks and segments.
//! - `symbol`: Symbol, relocation and dynamic records.
//! - `reader`: Object-file reader trait and the ELF backend.
//! - `resolver`: Address to content resolution.
//! - `node`: Output tree and its JSON rendering.
//! - `serializer`: The structured layout model.
//! - `dwarf`: Debug-info reader trait and the `gimli` backend.
//! - `walker`: Debug-entity tree walking.
//! - `inspector`: Session orchestration.

pub mod config;
pub mod crc;
pub mod dwarf;
pub mod error;
pub mod inspector;
pub mod layout;
pub mod node;
pub mod reader;
pub mod resolver;
pub mod serializer;
pub mod symbol;
pub mod tables;
pub mod walker;

pub use error::{InspectError, Result};
pub use inspector::inspect;
