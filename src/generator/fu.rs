// SPDX-License-Identifier: Apache-2.0

use crate::generator::database::{FuArchitecture, FuImplementation};
use crate::generator::external::add_fu_external_ports;
use crate::generator::lsu::{calculate_address_width, is_lsu};
use crate::generator::model::FunctionUnit;
use crate::generator::opcode::fu_opcode_port_width;
use crate::generator::{NetlistGenerator, UnitImplementation, UnitRef, check_instance_name};
use crate::{
    Block, DataType, DiagnosticSink, Direction, Error, Parameter, Port, Result, Signal, SignalType,
};

/// Port of `adf` that plays the role of `port` of `stored`, matched by the
/// operand the port is bound to in operations of the same name. Ports that
/// no operation binds are matched by name. Operations binding `port` to
/// different ports of `adf` are `InvalidData`.
fn corresponding_port(
    adf: &FunctionUnit,
    stored: &FunctionUnit,
    port: &str,
) -> Result<Option<String>> {
    let mut found: Option<&str> = None;
    for op in &stored.operations {
        let Some(operand) = op.io(port) else {
            continue;
        };
        let Some(candidate) = adf.operation(&op.name).and_then(|adf_op| adf_op.port(operand))
        else {
            continue;
        };
        match found {
            Some(previous) if previous != candidate => {
                return Err(Error::InvalidData(format!(
                    "port {port} of {} is bound to both {previous} and {candidate} of {}",
                    stored.name, adf.name
                )));
            }
            _ => found = Some(candidate),
        }
    }
    Ok(found
        .map(str::to_string)
        .or_else(|| adf.port(port).map(|p| p.name.clone())))
}

impl NetlistGenerator<'_> {
    /// Adds a function unit realized by a stored implementation.
    pub(crate) fn add_fu(
        &mut self,
        location: &UnitImplementation,
        top: &Block,
        sink: &DiagnosticSink,
    ) -> Result<()> {
        let entry = self.database.fu_entry(location.entry_id).map_err(|e| {
            Error::InvalidData(format!(
                "cannot use FU entry {} for {}: {e}",
                location.entry_id, location.unit
            ))
        })?;
        let (fu_arch, fu_impl) = {
            let (arch, imp) = entry.parts()?;
            (arch.clone(), imp.clone())
        };
        let mut adf_fu = self
            .architecture
            .function_unit(&location.unit)
            .cloned()
            .ok_or_else(|| {
                Error::InvalidData(format!("FU {} not found in the architecture", location.unit))
            })?;
        let entry_id = entry.id;
        self.state.fu_entries.insert(location.unit.clone(), entry);

        let mismatch = || {
            Error::InvalidData(format!(
                "architectures of FU entry {entry_id} and FU {} don't match",
                location.unit
            ))
        };

        let instance = check_instance_name(&format!("fu_{}", location.unit), &fu_impl.module_name);
        let block = Block::new(&fu_impl.module_name, &instance);
        top.add_sub_block(&block, None)?;
        let unit = UnitRef::FunctionUnit(location.unit.clone());
        self.map_netlist_block(unit.clone(), &block)?;

        for parameter in &fu_impl.parameters {
            let parameterized = fu_impl.ports.iter().any(|p| {
                p.width_formula == parameter.name
                    && fu_arch.has_parameterized_width(&p.architecture_port)
            });
            let value = if parameter.value.is_empty() || parameterized {
                self.resolve_fu_parameter(&parameter.name, &fu_arch, &fu_impl, &mut adf_fu)?
                    .ok_or_else(|| {
                        Error::InvalidData(format!(
                            "unable to resolve the value of parameter {} of FU {}",
                            parameter.name, location.unit
                        ))
                    })?
            } else {
                parameter.value.clone()
            };
            block.add_parameter(Parameter::new(&parameter.name, &parameter.param_type, value))?;
        }
        if let Some(unit) = self.architecture.function_unit_mut(&location.unit) {
            *unit = adf_fu.clone();
        }

        for port_impl in &fu_impl.ports {
            let adf_port_name =
                corresponding_port(&adf_fu, &fu_arch.unit, &port_impl.architecture_port)?
                    .ok_or_else(mismatch)?;
            let adf_port = adf_fu.port(&adf_port_name).ok_or_else(mismatch)?;
            let direction = fu_arch
                .unit
                .port(&port_impl.architecture_port)
                .map(|p| p.direction)
                .ok_or_else(mismatch)?;
            let port = block.add_port(Port::with_formula_and_width(
                &port_impl.name,
                &port_impl.width_formula,
                adf_port.width as i64,
                DataType::BitVector,
                direction,
            )?)?;
            self.map_netlist_port(&unit, &adf_port_name, &port)?;
            if !port_impl.load_port.is_empty() {
                let load = block.add_port(Port::in_bit(&port_impl.load_port))?;
                self.map_load_port(&port, &load)?;
            }
            if !port_impl.guard_port.is_empty() {
                let guard = block.add_port(Port::out_bit(&port_impl.guard_port))?;
                self.map_fu_guard_port(&port, &guard)?;
            }
        }

        if !fu_impl.opcode_port.is_empty() {
            let width = fu_opcode_port_width(&fu_arch.unit, &fu_impl, sink);
            let opcode = block.add_port(Port::with_width(
                &fu_impl.opcode_port,
                width as i64,
                DataType::BitVector,
                Direction::In,
            )?)?;
            self.map_fu_opcode_port(&block, &opcode)?;
        }

        add_fu_external_ports(top, &block, &adf_fu, &fu_impl.external_ports)?;

        self.add_sync_ports(top, &block, &fu_impl.clk_port, &fu_impl.rst_port)?;
        self.add_glock_port(&block, &fu_impl.glock_port)?;
        self.add_glock_req_port(&block, &fu_impl.glock_req_port)
    }

    /// Value of a generic that sizes ports of the unit, taken from the
    /// width of the corresponding architectural port. The address port of
    /// a load/store unit is sized by its address space instead, and the
    /// architectural port is widened to match.
    fn resolve_fu_parameter(
        &self,
        parameter: &str,
        fu_arch: &FuArchitecture,
        fu_impl: &FuImplementation,
        adf_fu: &mut FunctionUnit,
    ) -> Result<Option<String>> {
        for port_impl in fu_impl.ports.iter().filter(|p| p.width_formula == parameter) {
            let Some(adf_port_name) =
                corresponding_port(adf_fu, &fu_arch.unit, &port_impl.architecture_port)?
            else {
                continue;
            };
            let triggering = match adf_fu.port(&adf_port_name) {
                Some(port) => port.triggering,
                None => continue,
            };
            if is_lsu(adf_fu) && triggering {
                let width = calculate_address_width(&self.architecture, adf_fu)?;
                if let Some(port) = adf_fu.port_mut(&adf_port_name) {
                    port.width = width;
                }
                return Ok(Some(width.to_string()));
            }
            if let Some(port) = adf_fu.port(&adf_port_name) {
                return Ok(Some(port.width.to_string()));
            }
        }
        Ok(None)
    }

    /// Adds the clock and reset inputs named by an implementation, if any,
    /// and connects them to the top-level clock and reset.
    pub(super) fn add_sync_ports(
        &mut self,
        top: &Block,
        block: &Block,
        clk_port: &str,
        rst_port: &str,
    ) -> Result<()> {
        if !clk_port.is_empty() {
            let clk = block.add_port(Port::in_bit(clk_port).with_signal(SignalType::Clock))?;
            top.connect(&self.clk_port(top)?, &clk)?;
            self.map_clock_port(block, &clk)?;
        }
        if !rst_port.is_empty() {
            let rst = block
                .add_port(Port::in_bit(rst_port).with_signal(Signal::active_low(SignalType::Reset)))?;
            top.connect(&self.rst_port(top)?, &rst)?;
            self.map_reset_port(block, &rst)?;
        }
        Ok(())
    }

    pub(super) fn add_glock_port(&mut self, block: &Block, name: &str) -> Result<()> {
        if name.is_empty() {
            return Ok(());
        }
        let glock = block.add_port(Port::in_bit(name).with_signal(SignalType::GlobalLock))?;
        self.map_global_lock_port(block, &glock)
    }

    pub(super) fn add_glock_req_port(&mut self, block: &Block, name: &str) -> Result<()> {
        if name.is_empty() {
            return Ok(());
        }
        let request =
            block.add_port(Port::out_bit(name).with_signal(SignalType::GlobalLockRequest))?;
        self.map_global_lock_request_port(block, &request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::model::{FuPort, Operation};

    #[test]
    fn ports_correspond_through_operation_operands() {
        let stored = FunctionUnit::new("alu_db")
            .with_port(FuPort::new("in1t", 32, Direction::In).triggering())
            .with_port(FuPort::new("in2", 32, Direction::In))
            .with_port(FuPort::new("out1", 32, Direction::Out))
            .with_operation(Operation::new("add").bind(1, "in1t").bind(2, "in2").bind(3, "out1"));
        let adf = FunctionUnit::new("alu")
            .with_port(FuPort::new("a", 32, Direction::In).triggering())
            .with_port(FuPort::new("b", 32, Direction::In))
            .with_port(FuPort::new("r", 32, Direction::Out))
            .with_operation(Operation::new("ADD").bind(1, "a").bind(2, "b").bind(3, "r"));
        assert_eq!(corresponding_port(&adf, &stored, "in2").unwrap().as_deref(), Some("b"));
        assert_eq!(corresponding_port(&adf, &stored, "out1").unwrap().as_deref(), Some("r"));
        assert_eq!(corresponding_port(&adf, &stored, "nothing").unwrap(), None);
    }

    #[test]
    fn conflicting_bindings_are_invalid() {
        let stored = FunctionUnit::new("alu_db")
            .with_port(FuPort::new("in2", 32, Direction::In))
            .with_operation(Operation::new("add").bind(2, "in2"))
            .with_operation(Operation::new("sub").bind(2, "in2"));
        let adf = FunctionUnit::new("alu")
            .with_port(FuPort::new("b", 32, Direction::In))
            .with_port(FuPort::new("c", 32, Direction::In))
            .with_operation(Operation::new("add").bind(2, "b"))
            .with_operation(Operation::new("sub").bind(2, "c"));
        assert!(matches!(
            corresponding_port(&adf, &stored, "in2"),
            Err(Error::InvalidData(_))
        ));
    }
}
