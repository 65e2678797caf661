// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::block::BlockCore;
use crate::{Block, Error, Port, Result, SignalGroupType, SignalType};

/// What kind of bundle a port group is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortGroupKind {
    Generic,
    /// A data memory bus bound to a named address space.
    MemoryBus { address_space: String },
}

/// Data behind a [`PortGroup`] handle.
pub struct PortGroupCore {
    pub(crate) group_type: SignalGroupType,
    pub(crate) kind: PortGroupKind,
    pub(crate) ports: Vec<Port>,
    pub(crate) parent: Option<Weak<RefCell<BlockCore>>>,
}

/// An ordered bundle of ports implementing one protocol. Port groups are
/// used to connect blocks together by signal role, much like interfaces
/// connect modules together by function name.
///
/// Within a group each signal role other than `Undefined` appears at most
/// once.
#[derive(Clone)]
pub struct PortGroup {
    pub(crate) core: Rc<RefCell<PortGroupCore>>,
}

impl PortGroup {
    pub fn new(group_type: SignalGroupType) -> PortGroup {
        PortGroup::with_kind(group_type, PortGroupKind::Generic)
    }

    /// Creates an empty memory bus group for `address_space`.
    pub fn memory_bus(group_type: SignalGroupType, address_space: impl AsRef<str>) -> PortGroup {
        PortGroup::with_kind(
            group_type,
            PortGroupKind::MemoryBus {
                address_space: address_space.as_ref().to_string(),
            },
        )
    }

    pub(crate) fn with_kind(group_type: SignalGroupType, kind: PortGroupKind) -> PortGroup {
        PortGroup {
            core: Rc::new(RefCell::new(PortGroupCore {
                group_type,
                kind,
                ports: Vec::new(),
                parent: None,
            })),
        }
    }

    /// Creates a generic group holding `ports` in the given order.
    pub fn with_ports(
        group_type: SignalGroupType,
        ports: impl IntoIterator<Item = Port>,
    ) -> Result<PortGroup> {
        let group = PortGroup::new(group_type);
        for port in ports {
            group.add_port(port)?;
        }
        Ok(group)
    }

    /// Appends a port. If the group already belongs to a block, an
    /// unattached port is attached to that block as well.
    pub fn add_port(&self, port: Port) -> Result<Port> {
        let signal_type = port.assigned_signal().signal_type;
        if signal_type != SignalType::Undefined && self.has_port(signal_type) {
            return Err(Error::AlreadyExists(format!(
                "port group {:?} already has a port with role {:?}",
                self.assigned_signal_group(),
                signal_type
            )));
        }
        if let Some(parent) = self.parent_block() {
            if !port.has_parent_block() {
                parent.add_port(port.clone())?;
            }
        }
        self.core.borrow_mut().ports.push(port.clone());
        Ok(port)
    }

    pub fn assigned_signal_group(&self) -> SignalGroupType {
        self.core.borrow().group_type
    }

    pub fn kind(&self) -> PortGroupKind {
        self.core.borrow().kind.clone()
    }

    /// Name of the bound address space for memory bus groups.
    pub fn address_space(&self) -> Option<String> {
        match &self.core.borrow().kind {
            PortGroupKind::MemoryBus { address_space } => Some(address_space.clone()),
            PortGroupKind::Generic => None,
        }
    }

    pub fn ports(&self) -> Vec<Port> {
        self.core.borrow().ports.clone()
    }

    pub fn port_count(&self) -> usize {
        self.core.borrow().ports.len()
    }

    pub fn port(&self, index: usize) -> Result<Port> {
        self.core.borrow().ports.get(index).cloned().ok_or_else(|| {
            Error::OutOfRange(format!(
                "port index {index} of a group with {} ports",
                self.port_count()
            ))
        })
    }

    pub fn has_port(&self, signal_type: SignalType) -> bool {
        self.core
            .borrow()
            .ports
            .iter()
            .any(|p| p.assigned_signal().signal_type == signal_type)
    }

    /// Returns the port playing `signal_type` in this group.
    pub fn port_by(&self, signal_type: SignalType) -> Result<Port> {
        self.core
            .borrow()
            .ports
            .iter()
            .find(|p| p.assigned_signal().signal_type == signal_type)
            .cloned()
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "no port with role {:?} in port group {:?}",
                    signal_type,
                    self.assigned_signal_group()
                ))
            })
    }

    /// Returns an unattached copy of the group built from unattached copies
    /// of its ports, optionally with every direction mirrored.
    pub fn clone_group(&self, as_mirrored: bool) -> PortGroup {
        let core = self.core.borrow();
        PortGroup {
            core: Rc::new(RefCell::new(PortGroupCore {
                group_type: core.group_type,
                kind: core.kind.clone(),
                ports: core.ports.iter().map(|p| p.clone_port(as_mirrored)).collect(),
                parent: None,
            })),
        }
    }

    pub fn parent_block(&self) -> Option<Block> {
        self.core
            .borrow()
            .parent
            .as_ref()
            .and_then(|weak| weak.upgrade())
            .map(|core| Block { core })
    }

    pub(crate) fn set_parent(&self, parent: Option<&Block>) {
        self.core.borrow_mut().parent = parent.map(|b| Rc::downgrade(&b.core));
    }
}

impl PartialEq for PortGroup {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}
