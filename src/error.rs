//! Error types.
//!
//! Library code reports failures through [`InspectError`]. Lookup misses and
//! unbounded specification chains are recoverable: callers degrade them to an
//! absent value instead of aborting the walk.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectError {
    /// The input is not the expected kind of file, or a required table is broken.
    #[error("format error: {0}")]
    Format(String),

    /// A section, symbol, string or DIE referenced by index or offset does not exist.
    #[error("{what} not found at index/offset 0x{index:x}")]
    LookupMiss { what: &'static str, index: u64 },

    /// A `DW_AT_specification` chain is cyclic or longer than the configured bound.
    #[error("specification chain starting at DIE 0x{offset:x} exceeds {hops} hops")]
    UnboundedReference { offset: u64, hops: usize },

    #[error("object file error: {0}")]
    Object(#[from] object::read::Error),

    #[error("DWARF parsing error: {0}")]
    Dwarf(#[from] gimli::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InspectError {
    pub fn miss(what: &'static str, index: u64) -> Self {
        Self::LookupMiss { what, index }
    }

    /// Whether the error should become an absent output value rather than abort.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::LookupMiss { .. } | Self::UnboundedReference { .. })
    }
}

pub type Result<T, E = InspectError> = std::result::Result<T, E>;

/// Turns a recoverable error into `None`, logging it; fatal errors pass through.
pub fn recover<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_recoverable() => {
            tracing::debug!("recovered: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misses_are_recovered() {
        let value: Result<u32> = Err(InspectError::miss("string", 0x40));
        assert!(recover(value).unwrap().is_none());
    }

    #[test]
    fn format_errors_are_fatal() {
        let value: Result<u32> = Err(InspectError::Format("not an ELF file".into()));
        assert!(recover(value).is_err());
    }

    #[test]
    fn unbounded_reference_message_names_the_offset() {
        let err = InspectError::UnboundedReference { offset: 0x2a, hops: 8 };
        assert_eq!(err.to_string(), "specification chain starting at DIE 0x2a exceeds 8 hops");
        assert!(err.is_recoverable());
    }
}
