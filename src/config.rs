// SPDX-License-Identifier: Apache-2.0

//! Generator and writer settings, loadable from TOML.

use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// Settings of one generation run.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Prefix of the fetch, decompressor and decoder module names and of
    /// the core packages.
    pub core_entity_name: String,
    /// Module name of the top-level block.
    pub toplevel_name: String,
    /// Width of one instruction memory word in minimum addressable units.
    pub imem_width_in_maus: i64,
    /// Whether the target is a RISC-V machine.
    pub riscv: bool,
    /// Output formatting shared by both writers.
    pub writer: WriterOptions,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            core_entity_name: "tta".to_string(),
            toplevel_name: "toplevel".to_string(),
            imem_width_in_maus: 1,
            riscv: false,
            writer: WriterOptions::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(content: &str) -> Result<GeneratorConfig> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<GeneratorConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        GeneratorConfig::from_toml_str(&content)
    }

    /// Checks the instruction memory word size: a RISC-V machine needs
    /// exactly four MAUs per word, every other machine exactly one.
    pub fn validate_imem_width(&self) -> Result<()> {
        if self.imem_width_in_maus < 1 {
            return Err(Error::OutOfRange(format!(
                "instruction memory width of {} MAUs",
                self.imem_width_in_maus
            )));
        }
        let required = if self.riscv { 4 } else { 1 };
        if self.imem_width_in_maus != required {
            return Err(Error::InvalidData(format!(
                "instruction memory width must be {} MAUs, got {}",
                required, self.imem_width_in_maus
            )));
        }
        Ok(())
    }
}

/// Formatting of emitted HDL text.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WriterOptions {
    /// One level of indentation.
    pub indentation: String,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            indentation: "  ".to_string(),
        }
    }
}
