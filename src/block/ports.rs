// SPDX-License-Identifier: Apache-2.0

use crate::{Block, Error, Port, PortGroup, Result, SignalGroupType, SignalType};

impl Block {
    /// Attaches `port` to this block and registers it in this block's
    /// netlist and, if there is one, in the parent's netlist. A port that
    /// belongs to another block is moved here.
    pub fn add_port(&self, port: Port) -> Result<Port> {
        let name = port.name();
        if let Some(existing) = self.find_port(&name) {
            if existing == port {
                return Ok(port);
            }
            return Err(Error::AlreadyExists(format!(
                "port {} already exists in block {}",
                name,
                self.instance_name()
            )));
        }
        if let Some(old_parent) = port.parent_block() {
            old_parent.remove_port(&port)?;
        }
        port.set_parent(Some(self));
        self.core.borrow_mut().ports.push(port.clone());
        self.netlist_mut().register_port(&port);
        if let Some(parent) = self.parent_block() {
            parent.netlist_mut().register_port(&port);
        }
        Ok(port)
    }

    /// Detaches `port` from this block, removing it from the netlists it was
    /// registered in along with every connection it had, and from any port
    /// group of this block.
    pub fn remove_port(&self, port: &Port) -> Result<()> {
        let position = self
            .core
            .borrow()
            .ports
            .iter()
            .position(|p| p == port)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "port {} is not a port of block {}",
                    port.name(),
                    self.instance_name()
                ))
            })?;
        self.core.borrow_mut().ports.remove(position);
        for group in self.port_groups() {
            group.core.borrow_mut().ports.retain(|p| p != port);
        }
        self.netlist_mut().unregister_port(port);
        if let Some(parent) = self.parent_block() {
            parent.netlist_mut().unregister_port(port);
        }
        port.set_parent(None);
        Ok(())
    }

    /// Exact-name lookup.
    pub fn find_port(&self, name: &str) -> Option<Port> {
        self.core
            .borrow()
            .ports
            .iter()
            .find(|p| p.name() == name)
            .cloned()
    }

    /// Finds a port by name. With `partial_match`, the first port whose
    /// name contains `name` is returned.
    pub fn port(&self, name: &str, partial_match: bool) -> Result<Port> {
        let found = if partial_match {
            self.core
                .borrow()
                .ports
                .iter()
                .find(|p| p.name().contains(name))
                .cloned()
        } else {
            self.find_port(name)
        };
        found.ok_or_else(|| {
            Error::NotFound(format!(
                "no port {} in block {}",
                name,
                self.instance_name()
            ))
        })
    }

    pub fn has_port(&self, name: &str) -> bool {
        self.find_port(name).is_some()
    }

    /// Ports in declaration order.
    pub fn ports(&self) -> Vec<Port> {
        self.core.borrow().ports.clone()
    }

    pub fn port_count(&self) -> usize {
        self.core.borrow().ports.len()
    }

    pub fn port_at(&self, index: usize) -> Result<Port> {
        self.core.borrow().ports.get(index).cloned().ok_or_else(|| {
            Error::OutOfRange(format!(
                "port index {} of block {} with {} ports",
                index,
                self.instance_name(),
                self.port_count()
            ))
        })
    }

    /// Ports playing `signal_type`, in declaration order.
    pub fn ports_by(&self, signal_type: SignalType) -> Vec<Port> {
        self.core
            .borrow()
            .ports
            .iter()
            .filter(|p| p.assigned_signal().signal_type == signal_type)
            .cloned()
            .collect()
    }

    /// The `index`-th port playing `signal_type`.
    pub fn port_by(&self, signal_type: SignalType, index: usize) -> Result<Port> {
        let ports = self.ports_by(signal_type);
        if ports.is_empty() {
            return Err(Error::NotFound(format!(
                "block {} has no port with role {:?}",
                self.instance_name(),
                signal_type
            )));
        }
        ports.get(index).cloned().ok_or_else(|| {
            Error::OutOfRange(format!(
                "block {} has {} ports with role {:?}, index {} requested",
                self.instance_name(),
                ports.len(),
                signal_type,
                index
            ))
        })
    }

    /// Takes ownership of `group`. Ports of the group that are not yet
    /// attached to any block are attached to this one.
    pub fn add_port_group(&self, group: PortGroup) -> Result<PortGroup> {
        if let Some(owner) = group.parent_block() {
            if owner != *self {
                return Err(Error::AlreadyExists(format!(
                    "port group {:?} already belongs to block {}",
                    group.assigned_signal_group(),
                    owner.instance_name()
                )));
            }
            return Ok(group);
        }
        for port in group.ports() {
            match port.parent_block() {
                None => {
                    self.add_port(port)?;
                }
                Some(owner) if owner == *self => {}
                Some(owner) => {
                    return Err(Error::InvalidData(format!(
                        "port {} of the group belongs to block {}",
                        port.name(),
                        owner.instance_name()
                    )));
                }
            }
        }
        group.set_parent(Some(self));
        self.core.borrow_mut().port_groups.push(group.clone());
        Ok(group)
    }

    /// Removes `group` and all of its ports from this block.
    pub fn remove_port_group(&self, group: &PortGroup) -> Result<()> {
        let position = self
            .core
            .borrow()
            .port_groups
            .iter()
            .position(|g| g == group)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "port group {:?} is not owned by block {}",
                    group.assigned_signal_group(),
                    self.instance_name()
                ))
            })?;
        self.core.borrow_mut().port_groups.remove(position);
        group.set_parent(None);
        for port in group.ports() {
            if port.parent_block().as_ref() == Some(self) {
                self.remove_port(&port)?;
            }
        }
        Ok(())
    }

    pub fn port_groups(&self) -> Vec<PortGroup> {
        self.core.borrow().port_groups.clone()
    }

    pub fn port_groups_by(&self, group_type: SignalGroupType) -> Vec<PortGroup> {
        self.core
            .borrow()
            .port_groups
            .iter()
            .filter(|g| g.assigned_signal_group() == group_type)
            .cloned()
            .collect()
    }
}
