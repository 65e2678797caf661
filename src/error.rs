// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Errors raised while building a netlist or writing it out.
///
/// Every variant aborts the operation that raised it; callers are not
/// expected to recover and continue with a half-built block.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required port, block, mapping or database entry does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The architecture and the implementation disagree, or the netlist is
    /// internally inconsistent.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A port, instance or parameter name is already taken.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A width or index is outside the permitted range.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// The requested value or feature is not available.
    #[error("not available: {0}")]
    NotAvailable(String),

    /// Writing an output file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The file being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_prefixes_message() {
        let err = Error::AlreadyExists("port clk of block fu_alu".to_string());
        assert_eq!(err.to_string(), "already exists: port clk of block fu_alu");
        let err = Error::OutOfRange("port data has a negative width".to_string());
        assert!(err.to_string().starts_with("out of range"));
    }

    #[test]
    fn io_error_display() {
        let err = Error::Io {
            path: PathBuf::from("/tmp/out/toplevel.vhdl"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("toplevel.vhdl"));
    }
}
