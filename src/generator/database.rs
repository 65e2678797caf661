// SPDX-License-Identifier: Apache-2.0

//! Concrete hardware implementations of units, as stored in a component
//! database.

use indexmap::{IndexMap, IndexSet};

use crate::generator::model::FunctionUnit;
use crate::{Direction, Error, Result};

/// Generic of an implementation. An empty value has to be resolved from
/// the architecture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImplementationParameter {
    pub name: String,
    pub param_type: String,
    pub value: String,
}

impl ImplementationParameter {
    pub fn new(
        name: impl AsRef<str>,
        param_type: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Self {
        ImplementationParameter {
            name: name.as_ref().to_string(),
            param_type: param_type.as_ref().to_string(),
            value: value.as_ref().to_string(),
        }
    }
}

/// A port of an implementation that is not modeled in the architecture and
/// is routed to the top level, such as a data memory bus wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalPort {
    pub name: String,
    pub direction: Direction,
    pub width_formula: String,
    /// Implementation parameters the width formula refers to.
    pub parameter_dependencies: Vec<String>,
}

impl ExternalPort {
    pub fn new(
        name: impl AsRef<str>,
        direction: Direction,
        width_formula: impl AsRef<str>,
    ) -> Self {
        ExternalPort {
            name: name.as_ref().to_string(),
            direction,
            width_formula: width_formula.as_ref().to_string(),
            parameter_dependencies: Vec::new(),
        }
    }

    pub fn depends_on(mut self, parameter: impl AsRef<str>) -> Self {
        self.parameter_dependencies
            .push(parameter.as_ref().to_string());
        self
    }
}

/// Implementation of one architectural function unit port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuPortImplementation {
    pub name: String,
    pub architecture_port: String,
    pub width_formula: String,
    /// Empty if the port has no load enable.
    pub load_port: String,
    /// Empty if the port has no guard output.
    pub guard_port: String,
}

impl FuPortImplementation {
    pub fn new(
        name: impl AsRef<str>,
        architecture_port: impl AsRef<str>,
        width_formula: impl AsRef<str>,
    ) -> Self {
        FuPortImplementation {
            name: name.as_ref().to_string(),
            architecture_port: architecture_port.as_ref().to_string(),
            width_formula: width_formula.as_ref().to_string(),
            load_port: String::new(),
            guard_port: String::new(),
        }
    }

    pub fn with_load_port(mut self, load_port: impl AsRef<str>) -> Self {
        self.load_port = load_port.as_ref().to_string();
        self
    }

    pub fn with_guard_port(mut self, guard_port: impl AsRef<str>) -> Self {
        self.guard_port = guard_port.as_ref().to_string();
        self
    }
}

/// Function unit implementation. Every optional port name is empty when the
/// implementation does not have that port.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FuImplementation {
    pub module_name: String,
    pub ports: Vec<FuPortImplementation>,
    pub opcode_port: String,
    pub clk_port: String,
    pub rst_port: String,
    pub glock_port: String,
    pub glock_req_port: String,
    pub external_ports: Vec<ExternalPort>,
    pub parameters: Vec<ImplementationParameter>,
    /// Operation codes stored with the implementation, by operation name.
    pub opcodes: IndexMap<String, u64>,
}

impl FuImplementation {
    pub fn new(module_name: impl AsRef<str>) -> Self {
        FuImplementation {
            module_name: module_name.as_ref().to_string(),
            ..FuImplementation::default()
        }
    }

    /// Stored opcode of `operation`. Operation names compare
    /// case-insensitively.
    pub fn opcode(&self, operation: &str) -> Option<u64> {
        self.opcodes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(operation))
            .map(|(_, opcode)| *opcode)
    }
}

/// Architecture of a stored function unit: the unit itself plus the ports
/// whose width is a parameter of the implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuArchitecture {
    pub unit: FunctionUnit,
    pub parameterized_ports: IndexSet<String>,
}

impl FuArchitecture {
    pub fn new(unit: FunctionUnit) -> Self {
        FuArchitecture {
            unit,
            parameterized_ports: IndexSet::new(),
        }
    }

    pub fn with_parameterized_width(mut self, port: impl AsRef<str>) -> Self {
        self.parameterized_ports.insert(port.as_ref().to_string());
        self
    }

    pub fn has_parameterized_width(&self, port: &str) -> bool {
        self.parameterized_ports.contains(port)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuEntry {
    pub id: u32,
    pub architecture: Option<FuArchitecture>,
    pub implementation: Option<FuImplementation>,
}

impl FuEntry {
    pub fn new(id: u32, architecture: FuArchitecture, implementation: FuImplementation) -> Self {
        FuEntry {
            id,
            architecture: Some(architecture),
            implementation: Some(implementation),
        }
    }

    /// Both halves of the entry, or `InvalidData` naming the missing one.
    pub fn parts(&self) -> Result<(&FuArchitecture, &FuImplementation)> {
        match (&self.architecture, &self.implementation) {
            (Some(architecture), Some(implementation)) => Ok((architecture, implementation)),
            (_, None) => Err(Error::InvalidData(format!(
                "FU entry {} does not have an implementation",
                self.id
            ))),
            (None, _) => Err(Error::InvalidData(format!(
                "FU entry {} does not have an architecture definition",
                self.id
            ))),
        }
    }
}

/// Implementation of one register file port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RfPortImplementation {
    pub name: String,
    pub direction: Direction,
    pub load_port: String,
    /// Empty when the port needs no register index, which is only allowed
    /// for single-register files.
    pub opcode_port: String,
    pub opcode_port_width_formula: String,
}

impl RfPortImplementation {
    pub fn new(name: impl AsRef<str>, direction: Direction, load_port: impl AsRef<str>) -> Self {
        RfPortImplementation {
            name: name.as_ref().to_string(),
            direction,
            load_port: load_port.as_ref().to_string(),
            opcode_port: String::new(),
            opcode_port_width_formula: String::new(),
        }
    }

    pub fn with_opcode_port(
        mut self,
        opcode_port: impl AsRef<str>,
        width_formula: impl AsRef<str>,
    ) -> Self {
        self.opcode_port = opcode_port.as_ref().to_string();
        self.opcode_port_width_formula = width_formula.as_ref().to_string();
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RfImplementation {
    pub module_name: String,
    pub ports: Vec<RfPortImplementation>,
    pub clk_port: String,
    pub rst_port: String,
    pub glock_port: String,
    pub guard_port: String,
    /// Generic receiving the register count; may be empty.
    pub size_parameter: String,
    /// Generic receiving the register width; may be empty.
    pub width_parameter: String,
    pub external_ports: Vec<ExternalPort>,
    pub parameters: Vec<ImplementationParameter>,
}

impl RfImplementation {
    pub fn new(module_name: impl AsRef<str>) -> Self {
        RfImplementation {
            module_name: module_name.as_ref().to_string(),
            clk_port: "clk".to_string(),
            rst_port: "rstx".to_string(),
            ..RfImplementation::default()
        }
    }
}

/// Architecture of a stored register file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RfArchitecture {
    pub size: usize,
    pub width: usize,
    pub guard_support: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RfEntry {
    pub id: u32,
    pub architecture: Option<RfArchitecture>,
    pub implementation: Option<RfImplementation>,
}

impl RfEntry {
    pub fn new(id: u32, architecture: RfArchitecture, implementation: RfImplementation) -> Self {
        RfEntry {
            id,
            architecture: Some(architecture),
            implementation: Some(implementation),
        }
    }

    pub fn parts(&self) -> Result<(&RfArchitecture, &RfImplementation)> {
        match (&self.architecture, &self.implementation) {
            (Some(architecture), Some(implementation)) => Ok((architecture, implementation)),
            _ => Err(Error::InvalidData(format!(
                "RF entry {} does not have an implementation or architecture defined",
                self.id
            ))),
        }
    }
}

/// Read-only lookup of stored implementations.
pub trait ComponentDatabase {
    fn fu_entry(&self, id: u32) -> Result<FuEntry>;
    fn rf_entry(&self, id: u32) -> Result<RfEntry>;
}

/// In-memory component database.
#[derive(Clone, Debug, Default)]
pub struct ComponentLibrary {
    fu_entries: IndexMap<u32, FuEntry>,
    rf_entries: IndexMap<u32, RfEntry>,
}

impl ComponentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `entry`, replacing any entry with the same id.
    pub fn add_fu_entry(&mut self, entry: FuEntry) {
        self.fu_entries.insert(entry.id, entry);
    }

    pub fn add_rf_entry(&mut self, entry: RfEntry) {
        self.rf_entries.insert(entry.id, entry);
    }
}

impl ComponentDatabase for ComponentLibrary {
    fn fu_entry(&self, id: u32) -> Result<FuEntry> {
        self.fu_entries
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("FU entry {id}")))
    }

    fn rf_entry(&self, id: u32) -> Result<RfEntry> {
        self.rf_entries
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("RF entry {id}")))
    }
}
