// SPDX-License-Identifier: Apache-2.0

use crate::generator::NetlistGenerator;
use crate::{Block, Result};

/// Interconnect and decoder generator hook, run after every unit has been
/// added to the core so it can finish the remaining wiring.
pub trait IcDecoderPlugin {
    fn complete_netlist(&mut self, top: &Block, generator: &NetlistGenerator<'_>) -> Result<()>;
}

/// Plugin that adds nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPlugin;

impl IcDecoderPlugin for NullPlugin {
    fn complete_netlist(&mut self, _top: &Block, _generator: &NetlistGenerator<'_>) -> Result<()> {
        Ok(())
    }
}
