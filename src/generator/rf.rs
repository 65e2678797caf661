// SPDX-License-Identifier: Apache-2.0

use crate::generator::database::ImplementationParameter;
use crate::generator::external::add_rf_external_ports;
use crate::generator::model::{RegisterFile, UnitKind};
use crate::generator::{NetlistGenerator, UnitImplementation, UnitRef, check_instance_name};
use crate::util::required_bits;
use crate::{Block, DataType, Direction, Error, Parameter, Port, Result};

impl NetlistGenerator<'_> {
    /// Adds a register file or an immediate unit realized by a stored
    /// implementation.
    pub(crate) fn add_base_rf(
        &mut self,
        location: &UnitImplementation,
        kind: UnitKind,
        top: &Block,
    ) -> Result<()> {
        let adf_rf = match kind {
            UnitKind::RegisterFile => self.architecture.register_file(&location.unit),
            UnitKind::ImmediateUnit => self.architecture.immediate_unit(&location.unit),
        }
        .cloned()
        .ok_or_else(|| {
            Error::InvalidData(format!(
                "{} {} not found in the architecture",
                kind.description(),
                location.unit
            ))
        })?;
        let entry = self.database.rf_entry(location.entry_id).map_err(|e| {
            Error::InvalidData(format!(
                "cannot use RF entry {} for {}: {e}",
                location.entry_id, location.unit
            ))
        })?;
        let (rf_arch, rf_impl) = {
            let (arch, imp) = entry.parts()?;
            (*arch, imp.clone())
        };
        self.state.rf_entries.insert(location.unit.clone(), entry);

        let prefix = format!("{}{}", kind.prefix(), location.unit);
        let instance = check_instance_name(&prefix, &rf_impl.module_name);
        let block = Block::new(&rf_impl.module_name, &instance);
        top.add_sub_block(&block, None)?;
        let unit = UnitRef::for_register_file(kind, &location.unit);
        self.map_netlist_block(unit.clone(), &block)?;

        add_rf_parameters(
            &block,
            &adf_rf,
            &rf_impl.parameters,
            &rf_impl.size_parameter,
            &rf_impl.width_parameter,
        )?;

        let data_formula = if rf_impl.width_parameter.is_empty() {
            adf_rf.width.to_string()
        } else {
            rf_impl.width_parameter.clone()
        };
        let opcode_width = required_bits(adf_rf.size.saturating_sub(1) as u64) as i64;

        for port_impl in &rf_impl.ports {
            let directions: &[(Direction, &str)] = match port_impl.direction {
                Direction::Bidir => &[(Direction::In, "_in"), (Direction::Out, "_out")],
                Direction::In => &[(Direction::In, "")],
                Direction::Out => &[(Direction::Out, "")],
            };
            let mut data_ports = Vec::new();
            for (direction, suffix) in directions {
                let port = block.add_port(Port::with_formula_and_width(
                    format!("{}{suffix}", port_impl.name),
                    &data_formula,
                    adf_rf.width as i64,
                    DataType::BitVector,
                    *direction,
                )?)?;
                // The write port of an immediate unit has no architectural
                // counterpart.
                if kind == UnitKind::ImmediateUnit && *direction == Direction::In {
                    self.map_immediate_unit_write_port(&location.unit, &port);
                } else {
                    let adf_port = self
                        .unmapped_rf_port(&unit, &adf_rf, *direction)
                        .ok_or_else(|| {
                            Error::InvalidData(format!(
                                "cannot map port {} of {} to a port of {} {}",
                                port.name(),
                                rf_impl.module_name,
                                kind.description(),
                                location.unit
                            ))
                        })?;
                    self.map_netlist_port(&unit, &adf_port, &port)?;
                }
                data_ports.push(port);
            }

            if !port_impl.load_port.is_empty() {
                let load = block.add_port(Port::in_bit(&port_impl.load_port))?;
                for port in &data_ports {
                    self.map_load_port(port, &load)?;
                }
            }

            if !port_impl.opcode_port.is_empty() {
                let opcode = block.add_port(Port::with_formula_and_width(
                    &port_impl.opcode_port,
                    &port_impl.opcode_port_width_formula,
                    opcode_width,
                    DataType::BitVector,
                    Direction::In,
                )?)?;
                for port in &data_ports {
                    self.map_rf_opcode_port(port, &opcode)?;
                }
            } else if adf_rf.size != 1 {
                return Err(Error::InvalidData(format!(
                    "port {} of {} has no opcode port but {} {} has {} registers",
                    port_impl.name,
                    rf_impl.module_name,
                    kind.description(),
                    location.unit,
                    adf_rf.size
                )));
            }
        }

        if rf_arch.guard_support && !rf_impl.guard_port.is_empty() {
            let formula = if rf_impl.size_parameter.is_empty() {
                adf_rf.size.to_string()
            } else {
                rf_impl.size_parameter.clone()
            };
            let guard = block.add_port(Port::with_formula_and_width(
                &rf_impl.guard_port,
                formula,
                adf_rf.size as i64,
                DataType::BitVector,
                Direction::Out,
            )?)?;
            self.map_rf_guard_port(&block, &guard)?;
        }

        add_rf_external_ports(top, &block, &prefix, &rf_impl.external_ports)?;

        self.add_sync_ports(top, &block, &rf_impl.clk_port, &rf_impl.rst_port)?;
        self.add_glock_port(&block, &rf_impl.glock_port)
    }

    /// First port of `rf` usable in `direction` that no netlist port of
    /// that direction realizes yet.
    fn unmapped_rf_port(
        &self,
        unit: &UnitRef,
        rf: &RegisterFile,
        direction: Direction,
    ) -> Option<String> {
        rf.ports
            .iter()
            .filter(|p| match direction {
                Direction::In => p.input_socket,
                Direction::Out => p.output_socket,
                Direction::Bidir => p.input_socket && p.output_socket,
            })
            .find(|p| {
                self.state
                    .port_map
                    .get(&(unit.clone(), p.name.clone()))
                    .is_none_or(|ports| ports.iter().all(|port| port.direction() != direction))
            })
            .map(|p| p.name.clone())
    }
}

/// Sets the generics of a register file block. The size and width
/// generics always get the register count and width of the architecture;
/// every other generic needs a stored value.
fn add_rf_parameters(
    block: &Block,
    rf: &RegisterFile,
    parameters: &[ImplementationParameter],
    size_parameter: &str,
    width_parameter: &str,
) -> Result<()> {
    for parameter in parameters {
        let value = if parameter.name == size_parameter {
            rf.size.to_string()
        } else if parameter.name == width_parameter {
            rf.width.to_string()
        } else if parameter.value.is_empty() {
            return Err(Error::InvalidData(format!(
                "parameter {} of {} {} has no value",
                parameter.name,
                rf.kind.description(),
                rf.name
            )));
        } else {
            parameter.value.clone()
        };
        block.add_parameter(Parameter::new(&parameter.name, &parameter.param_type, value))?;
    }
    for (name, value) in [(size_parameter, rf.size), (width_parameter, rf.width)] {
        if !name.is_empty() && !block.has_parameter(name) {
            block.add_parameter(Parameter::new(name, "integer", value.to_string()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_and_width_come_from_the_architecture() {
        let block = Block::new("rf_1wr_1rd", "rf_main");
        let rf = RegisterFile::new("main", UnitKind::RegisterFile, 16, 32);
        let parameters = [
            ImplementationParameter::new("rf_size", "integer", ""),
            ImplementationParameter::new("debug", "boolean", "false"),
        ];
        add_rf_parameters(&block, &rf, &parameters, "rf_size", "dataw").unwrap();
        assert_eq!(block.parameter("rf_size").unwrap().value(), "16");
        assert_eq!(block.parameter("debug").unwrap().value(), "false");
        assert_eq!(block.parameter("dataw").unwrap().value(), "32");
        assert_eq!(block.parameter_count(), 3);
    }

    #[test]
    fn unresolved_parameter_is_invalid() {
        let block = Block::new("rf_1wr_1rd", "rf_main");
        let rf = RegisterFile::new("main", UnitKind::RegisterFile, 16, 32);
        let parameters = [ImplementationParameter::new("latency", "integer", "")];
        assert!(matches!(
            add_rf_parameters(&block, &rf, &parameters, "", ""),
            Err(Error::InvalidData(_))
        ));
    }
}
