//! Configuration module.
//!
//! This module defines the command-line interface (CLI) using `clap`, and the
//! `InspectOptions` the library consumes. The CLI only selects the input file, the
//! output destination and a few knobs; everything else lives in the library.

use clap::Parser;
use std::path::PathBuf;

/// Default bound on `DW_AT_specification` hops when resolving a DIE name.
pub const DEFAULT_MAX_SPEC_HOPS: usize = 8;

/// Default number of content bytes shown per symbol.
pub const DEFAULT_PREVIEW_LEN: usize = 64;

/// Dumps the layout and debug entities of an ELF file as JSON.
///
/// The output covers the file header, program headers, sections with their data
/// blocks and decoded records, and the functions and variables defined in each
/// DWARF compile unit.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Input ELF file
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file
    #[arg(short, long, help = "Write JSON to this file instead of stdout")]
    pub output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", help = "Set the logging level")]
    pub log_level: String,

    /// Bound on DW_AT_specification hops
    #[arg(long, default_value_t = DEFAULT_MAX_SPEC_HOPS, help = "Maximum DW_AT_specification hops per name")]
    pub max_spec_hops: usize,

    /// Content bytes shown per symbol
    #[arg(long, default_value_t = DEFAULT_PREVIEW_LEN, help = "Symbol content bytes to include in obj_data")]
    pub preview_bytes: usize,

    /// Skip debug entities
    #[arg(long, help = "Skip DWARF debug entities")]
    pub no_dwarf: bool,

    /// Skip the layout model
    #[arg(long, help = "Skip the ELF layout model")]
    pub no_layout: bool,

    /// Dump every DIE
    #[arg(long, help = "Include every DIE with its attributes")]
    pub dump_dies: bool,

    /// Pretty-print JSON
    #[arg(long, help = "Pretty-print the JSON output")]
    pub pretty: bool,
}

impl Config {
    pub fn options(&self) -> InspectOptions {
        InspectOptions {
            max_spec_hops: self.max_spec_hops,
            preview_len: self.preview_bytes,
            layout: !self.no_layout,
            dwarf: !self.no_dwarf,
            dump_dies: self.dump_dies,
        }
    }
}

/// What to inspect and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectOptions {
    pub max_spec_hops: usize,
    pub preview_len: usize,
    pub layout: bool,
    pub dwarf: bool,
    pub dump_dies: bool,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            max_spec_hops: DEFAULT_MAX_SPEC_HOPS,
            preview_len: DEFAULT_PREVIEW_LEN,
            layout: true,
            dwarf: true,
            dump_dies: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_library_defaults() {
        let config = Config::try_parse_from(["elfprobe", "a.out"]).unwrap();
        assert_eq!(config.input, PathBuf::from("a.out"));
        assert_eq!(config.log_level, "warn");
        assert!(config.output.is_none());
        assert_eq!(config.options(), InspectOptions::default());
    }

    #[test]
    fn flags_map_to_options() {
        let config = Config::try_parse_from([
            "elfprobe",
            "--max-spec-hops",
            "2",
            "--preview-bytes",
            "16",
            "--no-layout",
            "--dump-dies",
            "--pretty",
            "-o",
            "out.json",
            "lib.so",
        ])
        .unwrap();
        let options = config.options();
        assert_eq!(options.max_spec_hops, 2);
        assert_eq!(options.preview_len, 16);
        assert!(!options.layout);
        assert!(options.dwarf);
        assert!(options.dump_dies);
        assert!(config.pretty);
        assert_eq!(config.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn input_is_required() {
        assert!(Config::try_parse_from(["elfprobe"]).is_err());
    }
}
