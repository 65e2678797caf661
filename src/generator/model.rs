// SPDX-License-Identifier: Apache-2.0

//! Abstract machine description consumed by the generator.

use indexmap::IndexMap;

use crate::Direction;

/// Address space of a memory reachable from the core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressSpace {
    pub name: String,
    /// Width of the minimum addressable unit in bits.
    pub width: usize,
    pub start: u64,
    pub end: u64,
}

impl AddressSpace {
    pub fn new(name: impl AsRef<str>, width: usize, start: u64, end: u64) -> Self {
        AddressSpace {
            name: name.as_ref().to_string(),
            width,
            start,
            end,
        }
    }
}

/// Operand port of a function unit or of the control unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuPort {
    pub name: String,
    pub width: usize,
    /// Writing this port starts an operation.
    pub triggering: bool,
    pub direction: Direction,
}

impl FuPort {
    pub fn new(name: impl AsRef<str>, width: usize, direction: Direction) -> Self {
        FuPort {
            name: name.as_ref().to_string(),
            width,
            triggering: false,
            direction,
        }
    }

    pub fn triggering(mut self) -> Self {
        self.triggering = true;
        self
    }

    pub fn is_input(&self) -> bool {
        matches!(self.direction, Direction::In | Direction::Bidir)
    }

    pub fn is_output(&self) -> bool {
        matches!(self.direction, Direction::Out | Direction::Bidir)
    }
}

/// An operation with its operands bound to unit ports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    /// Operand index to port name.
    pub bindings: IndexMap<usize, String>,
}

impl Operation {
    pub fn new(name: impl AsRef<str>) -> Self {
        Operation {
            name: name.as_ref().to_string(),
            bindings: IndexMap::new(),
        }
    }

    pub fn bind(mut self, operand: usize, port: impl AsRef<str>) -> Self {
        self.bindings.insert(operand, port.as_ref().to_string());
        self
    }

    /// Operand index `port` is bound to, if any.
    pub fn io(&self, port: &str) -> Option<usize> {
        self.bindings
            .iter()
            .find(|(_, bound)| bound.as_str() == port)
            .map(|(operand, _)| *operand)
    }

    pub fn port(&self, operand: usize) -> Option<&str> {
        self.bindings.get(&operand).map(String::as_str)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FunctionUnit {
    pub name: String,
    pub ports: Vec<FuPort>,
    pub operations: Vec<Operation>,
    /// Name of the address space a load/store unit accesses.
    pub address_space: Option<String>,
}

impl FunctionUnit {
    pub fn new(name: impl AsRef<str>) -> Self {
        FunctionUnit {
            name: name.as_ref().to_string(),
            ..FunctionUnit::default()
        }
    }

    pub fn with_port(mut self, port: FuPort) -> Self {
        self.ports.push(port);
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_address_space(mut self, address_space: impl AsRef<str>) -> Self {
        self.address_space = Some(address_space.as_ref().to_string());
        self
    }

    pub fn port(&self, name: &str) -> Option<&FuPort> {
        self.ports.iter().find(|p| p.name == name)
    }

    pub fn port_mut(&mut self, name: &str) -> Option<&mut FuPort> {
        self.ports.iter_mut().find(|p| p.name == name)
    }

    /// Operation names compare case-insensitively.
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|op| op.name.eq_ignore_ascii_case(name))
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.operation(name).is_some()
    }
}

/// Port of a register file; the sockets tell whether it is written, read
/// or both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RfPort {
    pub name: String,
    pub input_socket: bool,
    pub output_socket: bool,
}

impl RfPort {
    pub fn write(name: impl AsRef<str>) -> Self {
        RfPort {
            name: name.as_ref().to_string(),
            input_socket: true,
            output_socket: false,
        }
    }

    pub fn read(name: impl AsRef<str>) -> Self {
        RfPort {
            name: name.as_ref().to_string(),
            input_socket: false,
            output_socket: true,
        }
    }

    pub fn bidirectional(name: impl AsRef<str>) -> Self {
        RfPort {
            name: name.as_ref().to_string(),
            input_socket: true,
            output_socket: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    RegisterFile,
    ImmediateUnit,
}

impl UnitKind {
    /// Prefix of instance names, external port names and netlist
    /// parameters of this kind of unit.
    pub fn prefix(&self) -> &'static str {
        match self {
            UnitKind::RegisterFile => "rf_",
            UnitKind::ImmediateUnit => "iu_",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UnitKind::RegisterFile => "register file",
            UnitKind::ImmediateUnit => "immediate unit",
        }
    }
}

/// A register file or an immediate unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterFile {
    pub name: String,
    pub kind: UnitKind,
    pub size: usize,
    pub width: usize,
    pub ports: Vec<RfPort>,
    /// Registers of this file can be used as guards.
    pub used_as_guard: bool,
}

impl RegisterFile {
    pub fn new(name: impl AsRef<str>, kind: UnitKind, size: usize, width: usize) -> Self {
        RegisterFile {
            name: name.as_ref().to_string(),
            kind,
            size,
            width,
            ports: Vec::new(),
            used_as_guard: false,
        }
    }

    pub fn with_port(mut self, port: RfPort) -> Self {
        self.ports.push(port);
        self
    }

    pub fn used_as_guard(mut self) -> Self {
        self.used_as_guard = true;
        self
    }
}

/// The global control unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlUnit {
    pub name: String,
    pub ports: Vec<FuPort>,
    pub operations: Vec<Operation>,
    /// Name of the special register port holding the return address.
    pub return_address_port: String,
    /// Name of the instruction memory address space.
    pub address_space: Option<String>,
}

impl ControlUnit {
    pub fn new(name: impl AsRef<str>) -> Self {
        ControlUnit {
            name: name.as_ref().to_string(),
            ..ControlUnit::default()
        }
    }

    pub fn with_port(mut self, port: FuPort) -> Self {
        self.ports.push(port);
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_return_address_port(mut self, port: FuPort) -> Self {
        self.return_address_port = port.name.clone();
        self.ports.push(port);
        self
    }

    pub fn with_address_space(mut self, address_space: impl AsRef<str>) -> Self {
        self.address_space = Some(address_space.as_ref().to_string());
        self
    }

    pub fn trigger_port(&self) -> Option<&FuPort> {
        self.ports.iter().find(|p| p.triggering)
    }
}

/// The complete abstract machine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Architecture {
    pub control_unit: ControlUnit,
    pub function_units: Vec<FunctionUnit>,
    pub register_files: Vec<RegisterFile>,
    pub immediate_units: Vec<RegisterFile>,
    pub address_spaces: Vec<AddressSpace>,
}

impl Architecture {
    pub fn new(control_unit: ControlUnit) -> Self {
        Architecture {
            control_unit,
            ..Architecture::default()
        }
    }

    pub fn with_function_unit(mut self, unit: FunctionUnit) -> Self {
        self.function_units.push(unit);
        self
    }

    /// Adds a register file or an immediate unit depending on its kind.
    pub fn with_register_file(mut self, unit: RegisterFile) -> Self {
        match unit.kind {
            UnitKind::RegisterFile => self.register_files.push(unit),
            UnitKind::ImmediateUnit => self.immediate_units.push(unit),
        }
        self
    }

    pub fn with_address_space(mut self, address_space: AddressSpace) -> Self {
        self.address_spaces.push(address_space);
        self
    }

    pub fn function_unit(&self, name: &str) -> Option<&FunctionUnit> {
        self.function_units.iter().find(|u| u.name == name)
    }

    pub(crate) fn function_unit_mut(&mut self, name: &str) -> Option<&mut FunctionUnit> {
        self.function_units.iter_mut().find(|u| u.name == name)
    }

    pub fn register_file(&self, name: &str) -> Option<&RegisterFile> {
        self.register_files.iter().find(|u| u.name == name)
    }

    pub fn immediate_unit(&self, name: &str) -> Option<&RegisterFile> {
        self.immediate_units.iter().find(|u| u.name == name)
    }

    pub fn address_space(&self, name: &str) -> Option<&AddressSpace> {
        self.address_spaces.iter().find(|a| a.name == name)
    }

    /// Address space of the instruction memory.
    pub fn instruction_memory(&self) -> Option<&AddressSpace> {
        self.control_unit
            .address_space
            .as_deref()
            .and_then(|name| self.address_space(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_lookup_ignores_case() {
        let fu = FunctionUnit::new("lsu")
            .with_operation(Operation::new("LDW").bind(1, "addr").bind(2, "data"));
        assert!(fu.has_operation("ldw"));
        let op = fu.operation("ldw").unwrap();
        assert_eq!(op.io("data"), Some(2));
        assert_eq!(op.port(1), Some("addr"));
        assert_eq!(op.io("missing"), None);
    }

    #[test]
    fn register_files_sorted_by_kind() {
        let arch = Architecture::new(ControlUnit::new("gcu"))
            .with_register_file(RegisterFile::new("rf", UnitKind::RegisterFile, 8, 32))
            .with_register_file(RegisterFile::new("imm", UnitKind::ImmediateUnit, 1, 32));
        assert!(arch.register_file("rf").is_some());
        assert!(arch.register_file("imm").is_none());
        assert_eq!(arch.immediate_unit("imm").unwrap().kind.prefix(), "iu_");
    }
}
