// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{Error, Netlist, Port, PortGroup, Result, SignalType};

impl Netlist {
    /// Connects two groups port by port, matching ports by signal role.
    /// Returns `Ok(false)` without connecting anything when the groups have
    /// different port counts.
    pub fn connect_groups_by_role(&mut self, group1: &PortGroup, group2: &PortGroup) -> Result<bool> {
        if group1.port_count() != group2.port_count() {
            return Ok(false);
        }
        let by_role = index_unique(group2, |p| p.assigned_signal().signal_type)?;
        let mut pairs = Vec::new();
        for from in group1.ports() {
            let role = from.assigned_signal().signal_type;
            let to = by_role.get(&role).ok_or_else(|| {
                Error::InvalidData(format!(
                    "port {} has role {:?} which the other group lacks",
                    from.name(),
                    role
                ))
            })?;
            pairs.push((from, to.clone()));
        }
        for (from, to) in pairs {
            self.connect(&from, &to)?;
        }
        Ok(true)
    }

    /// Connects the port playing `role` in each group.
    pub fn connect_by(
        &mut self,
        role: SignalType,
        group1: &PortGroup,
        group2: &PortGroup,
    ) -> Result<()> {
        let port1 = group1.port_by(role)?;
        let port2 = group2.port_by(role)?;
        self.connect(&port1, &port2)
    }

    /// Connects each port of `group1` whose role is a key of `map` to the
    /// port of `group2` playing the mapped role. Roles missing from the map,
    /// or mapped to [`SignalType::Open`], are left unconnected.
    pub fn connect_groups_mapped(
        &mut self,
        group1: &PortGroup,
        group2: &PortGroup,
        map: &HashMap<SignalType, SignalType>,
    ) -> Result<()> {
        for port1 in group1.ports() {
            let Some(&role2) = map.get(&port1.assigned_signal().signal_type) else {
                continue;
            };
            if role2 == SignalType::Open {
                continue;
            }
            let port2 = group2.port_by(role2)?;
            self.connect(&port1, &port2)?;
        }
        Ok(())
    }

    /// Connects two groups port by port, matching ports by name. Returns
    /// `Ok(false)` when the port counts differ.
    pub fn connect_groups_by_name(
        &mut self,
        group1: &PortGroup,
        group2: &PortGroup,
    ) -> Result<bool> {
        if group1.port_count() != group2.port_count() {
            return Ok(false);
        }
        let by_name = index_unique(group2, |p| p.name())?;
        let mut pairs = Vec::new();
        for from in group1.ports() {
            let to = by_name.get(&from.name()).ok_or_else(|| {
                Error::InvalidData(format!(
                    "port {} has no namesake in the other group",
                    from.name()
                ))
            })?;
            pairs.push((from, to.clone()));
        }
        for (from, to) in pairs {
            self.connect(&from, &to)?;
        }
        Ok(true)
    }
}

fn index_unique<K, F>(group: &PortGroup, key: F) -> Result<IndexMap<K, Port>>
where
    K: std::hash::Hash + Eq + std::fmt::Debug,
    F: Fn(&Port) -> K,
{
    let mut index = IndexMap::new();
    for port in group.ports() {
        let k = key(&port);
        if index.contains_key(&k) {
            return Err(Error::InvalidData(format!(
                "port group has more than one port keyed {k:?}"
            )));
        }
        index.insert(k, port);
    }
    Ok(index)
}
