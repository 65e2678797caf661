// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use crate::{Block, HdlDialect, Result, VerilogWriter, VhdlWriter};

impl Block {
    /// Writes this block and everything below it into `dir` in the chosen
    /// HDL.
    pub fn write_self(&self, dir: impl AsRef<Path>, dialect: HdlDialect) -> Result<Vec<PathBuf>> {
        match dialect {
            HdlDialect::Vhdl => VhdlWriter::new(self).write(dir),
            HdlDialect::Verilog => VerilogWriter::new(self).write(dir),
        }
    }
}
