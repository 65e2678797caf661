// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::rc::Weak;

use indexmap::{IndexMap, IndexSet};

use crate::block::BlockId;
use crate::{Block, Netlist, Parameter, Port, PortGroup};

/// Data behind a [`Block`] handle.
///
/// Not intended to be used directly; use `Block` instead, which contains a
/// smart pointer to this struct.
pub struct BlockCore {
    pub(crate) id: BlockId,
    pub(crate) module_name: String,
    pub(crate) instance_name: String,
    pub(crate) parent: Option<Weak<RefCell<BlockCore>>>,
    pub(crate) sub_blocks: Vec<Block>,
    pub(crate) ports: Vec<Port>,
    pub(crate) port_groups: Vec<PortGroup>,
    pub(crate) parameters: IndexMap<String, Parameter>,
    pub(crate) packages: IndexSet<String>,
    pub(crate) netlist: Netlist,
    pub(crate) is_virtual: bool,
}
