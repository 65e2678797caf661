// SPDX-License-Identifier: Apache-2.0

//! Units without a stored implementation. Their blocks only declare the
//! interface; the module itself is produced by a later generation step.

use crate::generator::port_factory::{CLOCK_PORT_NAME, RESET_PORT_NAME};
use crate::generator::{NetlistGenerator, UnitRef};
use crate::util::{ceil_log2, required_bits};
use crate::{Block, DataType, Direction, Error, Port, Result};

const GLOCK_PORT_NAME: &str = "glock_in";
const GLOCK_REQ_PORT_NAME: &str = "glockreq_out";

fn data_port(name: impl AsRef<str>, width: usize, direction: Direction) -> Result<Port> {
    Port::with_width(name, width as i64, DataType::BitVector, direction)
}

impl NetlistGenerator<'_> {
    pub(crate) fn add_generated_fu(&mut self, name: &str, top: &Block) -> Result<()> {
        let fu = self
            .architecture
            .function_unit(name)
            .cloned()
            .ok_or_else(|| {
                Error::InvalidData(format!("generated FU {name} not found in the architecture"))
            })?;
        let instance = format!("fu_{name}").to_lowercase();
        let block = Block::new(format!("{instance}_generated"), &instance);
        top.add_sub_block(&block, None)?;
        let unit = UnitRef::FunctionUnit(name.to_string());
        self.map_netlist_block(unit.clone(), &block)?;

        self.add_sync_ports(top, &block, CLOCK_PORT_NAME, RESET_PORT_NAME)?;
        self.add_glock_port(&block, GLOCK_PORT_NAME)?;
        if fu.operations.len() > 1 {
            let width = ceil_log2(fu.operations.len() as u64);
            let opcode = block.add_port(data_port("operation_in", width, Direction::In)?)?;
            self.map_fu_opcode_port(&block, &opcode)?;
        }
        self.add_glock_req_port(&block, GLOCK_REQ_PORT_NAME)?;

        for port in &fu.ports {
            if port.is_input() {
                let data = block.add_port(data_port(
                    format!("data_{}_in", port.name),
                    port.width,
                    Direction::In,
                )?)?;
                self.map_netlist_port(&unit, &port.name, &data)?;
                let load = block.add_port(Port::in_bit(format!("load_{}_in", port.name)))?;
                self.map_load_port(&data, &load)?;
            }
            if port.is_output() {
                let data = block.add_port(data_port(
                    format!("data_{}_out", port.name),
                    port.width,
                    Direction::Out,
                )?)?;
                self.map_netlist_port(&unit, &port.name, &data)?;
            }
        }
        Ok(())
    }

    pub(crate) fn add_generated_rf(&mut self, name: &str, top: &Block) -> Result<()> {
        let rf = self
            .architecture
            .register_file(name)
            .cloned()
            .ok_or_else(|| {
                Error::InvalidData(format!("generated RF {name} not found in the architecture"))
            })?;
        let instance = format!("rf_{name}").to_lowercase();
        let block = Block::new(format!("{instance}_generated"), &instance);
        top.add_sub_block(&block, None)?;
        let unit = UnitRef::RegisterFile(name.to_string());
        self.map_netlist_block(unit.clone(), &block)?;

        self.add_sync_ports(top, &block, CLOCK_PORT_NAME, RESET_PORT_NAME)?;
        self.add_glock_port(&block, GLOCK_PORT_NAME)?;

        let opcode_width = required_bits(rf.size.saturating_sub(1) as u64);
        for port in &rf.ports {
            let mut data_ports = Vec::new();
            if port.input_socket {
                let name = format!("data_{}_in", port.name);
                data_ports.push(data_port(name, rf.width, Direction::In)?);
            }
            if port.output_socket {
                let name = format!("data_{}_out", port.name);
                data_ports.push(data_port(name, rf.width, Direction::Out)?);
            }
            if data_ports.is_empty() {
                continue;
            }
            let load = Port::in_bit(format!("load_{}_in", port.name));
            let opcode = data_port(format!("opcode_{}_in", port.name), opcode_width, Direction::In)?;
            for data in data_ports {
                let data = block.add_port(data)?;
                self.map_netlist_port(&unit, &port.name, &data)?;
                let load = block.add_port(load.clone())?;
                let opcode = block.add_port(opcode.clone())?;
                self.map_load_port(&data, &load)?;
                self.map_rf_opcode_port(&data, &opcode)?;
            }
        }

        if rf.used_as_guard {
            let guard = block.add_port(data_port("guard_out", rf.size, Direction::Out)?)?;
            self.map_rf_guard_port(&block, &guard)?;
        }
        Ok(())
    }
}
