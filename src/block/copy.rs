// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;

use crate::{Block, PortGroup, Result};

impl Block {
    /// Returns a new parentless block with the same module and instance
    /// name, ports, port groups, parameters and packages, but without
    /// sub-blocks or connections. Port order and signal roles are kept.
    pub fn shallow_copy(&self) -> Result<Block> {
        let copy = Block::new(self.module_name(), self.instance_name());
        copy.set_virtual(self.is_virtual());
        for package in self.packages() {
            copy.add_package(package);
        }
        for parameter in self.parameters() {
            copy.add_parameter(parameter)?;
        }
        let mut copied_ports = IndexMap::new();
        for port in self.ports() {
            let duplicate = copy.add_port(port.clone_port(false))?;
            copied_ports.insert(port.id(), duplicate);
        }
        for group in self.port_groups() {
            let duplicate = PortGroup::with_kind(group.assigned_signal_group(), group.kind());
            for port in group.ports() {
                if let Some(copied) = copied_ports.get(&port.id()) {
                    duplicate.add_port(copied.clone())?;
                }
            }
            copy.add_port_group(duplicate)?;
        }
        Ok(copy)
    }
}
