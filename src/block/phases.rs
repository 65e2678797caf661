// SPDX-License-Identifier: Apache-2.0

use crate::{Block, Result};

/// Construction phases of a block subtree: `build` creates ports and
/// sub-blocks, `connect` wires them, and `finalize` applies post-wiring
/// fixups. Each default implementation runs the same phase on every
/// sub-block in child order; `finalize` then auto-wires clocks and resets.
pub trait BlockPhases {
    /// The block this phase driver works on.
    fn block(&self) -> &Block;

    fn build(&self) -> Result<()> {
        for sub_block in self.block().sub_blocks() {
            sub_block.build()?;
        }
        Ok(())
    }

    fn connect(&self) -> Result<()> {
        for sub_block in self.block().sub_blocks() {
            BlockPhases::connect(&sub_block)?;
        }
        Ok(())
    }

    fn finalize(&self) -> Result<()> {
        for sub_block in self.block().sub_blocks() {
            sub_block.finalize()?;
        }
        self.block().connect_clocks()?;
        self.block().connect_resets()
    }
}

impl BlockPhases for Block {
    fn block(&self) -> &Block {
        self
    }
}
