// SPDX-License-Identifier: Apache-2.0

use crate::{Block, Result, SignalType};

impl Block {
    /// If this block has exactly one clock port, wires it to every direct
    /// sub-block that has exactly one clock port of the same direction which
    /// is still unconnected. Calling it again changes nothing.
    pub fn connect_clocks(&self) -> Result<()> {
        self.connect_single_role(SignalType::Clock)
    }

    /// Reset counterpart of [`Block::connect_clocks`].
    pub fn connect_resets(&self) -> Result<()> {
        self.connect_single_role(SignalType::Reset)
    }

    fn connect_single_role(&self, role: SignalType) -> Result<()> {
        let own = self.ports_by(role);
        let [source] = own.as_slice() else {
            return Ok(());
        };
        for sub_block in self.sub_blocks() {
            let candidates = sub_block.ports_by(role);
            let [target] = candidates.as_slice() else {
                continue;
            };
            if target.direction() != source.direction() || self.is_connected(target) {
                continue;
            }
            log::debug!(
                "auto-connecting {:?} {} to {}.{}",
                role,
                source.name(),
                sub_block.instance_name(),
                target.name()
            );
            self.connect(source, target)?;
        }
        Ok(())
    }
}
