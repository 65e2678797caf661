// SPDX-License-Identifier: Apache-2.0

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::{IndexMap, IndexSet};

use crate::{Netlist, Port, PortGroup, Result};

mod clocks;
mod copy;
mod core;
mod parameters;
mod phases;
mod ports;
mod sub_blocks;
mod write;

pub use core::BlockCore;
pub use phases::BlockPhases;

static NEXT_BLOCK_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of a block, never reused within a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(usize);

/// A module instance in the hardware hierarchy.
///
/// A block owns its ports, port groups, parameters and sub-blocks, and has
/// its own [`Netlist`] over its ports and the ports of its direct
/// sub-blocks. `Block` is a shared handle; cloning it yields another handle
/// to the same block.
#[derive(Clone)]
pub struct Block {
    pub(crate) core: Rc<RefCell<BlockCore>>,
}

impl Block {
    /// Creates a parentless block. An empty instance name defaults to
    /// `<module_name>_inst0`.
    pub fn new(module_name: impl AsRef<str>, instance_name: impl AsRef<str>) -> Block {
        let module_name = module_name.as_ref().to_string();
        let instance_name = if instance_name.as_ref().is_empty() {
            format!("{module_name}_inst0")
        } else {
            instance_name.as_ref().to_string()
        };
        Block {
            core: Rc::new(RefCell::new(BlockCore {
                id: BlockId(NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed)),
                module_name,
                instance_name,
                parent: None,
                sub_blocks: Vec::new(),
                ports: Vec::new(),
                port_groups: Vec::new(),
                parameters: IndexMap::new(),
                packages: IndexSet::new(),
                netlist: Netlist::new(),
                is_virtual: false,
            })),
        }
    }

    pub fn id(&self) -> BlockId {
        self.core.borrow().id
    }

    pub fn module_name(&self) -> String {
        self.core.borrow().module_name.clone()
    }

    pub fn set_module_name(&self, module_name: impl AsRef<str>) {
        self.core.borrow_mut().module_name = module_name.as_ref().to_string();
    }

    pub fn instance_name(&self) -> String {
        self.core.borrow().instance_name.clone()
    }

    /// Virtual blocks have no physical instance: writers skip their
    /// declaration and instantiation, and their ports only carry static
    /// values.
    pub fn is_virtual(&self) -> bool {
        self.core.borrow().is_virtual
    }

    pub fn set_virtual(&self, is_virtual: bool) {
        self.core.borrow_mut().is_virtual = is_virtual;
    }

    pub fn has_parent_block(&self) -> bool {
        self.parent_block().is_some()
    }

    pub fn parent_block(&self) -> Option<Block> {
        self.core
            .borrow()
            .parent
            .as_ref()
            .and_then(|weak| weak.upgrade())
            .map(|core| Block { core })
    }

    /// Read access to this block's wiring graph.
    pub fn netlist(&self) -> Ref<'_, Netlist> {
        Ref::map(self.core.borrow(), |core| &core.netlist)
    }

    /// Write access to this block's wiring graph.
    pub fn netlist_mut(&self) -> RefMut<'_, Netlist> {
        RefMut::map(self.core.borrow_mut(), |core| &mut core.netlist)
    }

    /// Connects two ports in this block's netlist over their full width.
    pub fn connect(&self, port1: &Port, port2: &Port) -> Result<()> {
        self.netlist_mut().connect(port1, port2)
    }

    /// Connects a bit range of two ports in this block's netlist.
    pub fn connect_bits(
        &self,
        port1: &Port,
        port2: &Port,
        port1_first_bit: usize,
        port2_first_bit: usize,
        width: usize,
    ) -> Result<()> {
        self.netlist_mut()
            .connect_bits(port1, port2, port1_first_bit, port2_first_bit, width)
    }

    pub fn disconnect(&self, port1: &Port, port2: &Port) -> Result<()> {
        self.netlist_mut().disconnect_ports(port1, port2)
    }

    /// Whether `port` has any connection in this block's netlist.
    pub fn is_connected(&self, port: &Port) -> bool {
        self.netlist().is_port_connected(port)
    }

    /// Connects two port groups in this block's netlist by signal role.
    pub fn connect_groups(&self, group1: &PortGroup, group2: &PortGroup) -> Result<bool> {
        self.netlist_mut().connect_groups_by_role(group1, group2)
    }

    /// Dotted instance path from the root of the hierarchy.
    pub fn debug_string(&self) -> String {
        match self.parent_block() {
            Some(parent) => format!("{}.{}", parent.debug_string(), self.instance_name()),
            None => self.instance_name(),
        }
    }

    pub(crate) fn is_ancestor_of(&self, other: &Block) -> bool {
        let mut current = other.parent_block();
        while let Some(block) = current {
            if block == *self {
                return true;
            }
            current = block.parent_block();
        }
        false
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl Eq for Block {}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("Block")
            .field("module_name", &core.module_name)
            .field("instance_name", &core.instance_name)
            .field("ports", &core.ports.len())
            .field("sub_blocks", &core.sub_blocks.len())
            .finish()
    }
}
