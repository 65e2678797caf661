// SPDX-License-Identifier: Apache-2.0

use crate::generator::opcode::gcu_opcode_port_width;
use crate::generator::port_factory::INSTRUCTION_WIDTH;
use crate::generator::{NetlistGenerator, UnitRef};
use crate::{Block, DataType, Direction, Parameter, Port, Result};

impl NetlistGenerator<'_> {
    /// Adds the core id generic, the top-level clock, reset, instruction
    /// fetch bus and lock status ports, and the fetch, decompressor and
    /// decoder blocks wired to them and to each other.
    pub(crate) fn add_gcu(&mut self, top: &Block) -> Result<()> {
        let factory = self.factory()?.clone();
        let core_name = self.config.core_entity_name.clone();
        let gcu = self.architecture.control_unit.clone();
        let opcode_width = gcu_opcode_port_width(&gcu) as i64;

        top.add_parameter(Parameter::new("core_id", "integer", "0"))?;
        let tl_clk = top.add_port(factory.clock_port())?;
        let tl_rst = top.add_port(factory.reset_port())?;
        let tl_line = top.add_port_group(factory.instruction_line()?)?;
        let tl_locked = top.add_port(factory.lock_status_port())?;
        self.map_clock_port(top, &tl_clk)?;
        self.map_reset_port(top, &tl_rst)?;

        let ifetch = Block::new(format!("{core_name}_ifetch"), "inst_fetch");
        top.add_sub_block(&ifetch, None)?;
        self.state.instruction_fetch = Some(ifetch.clone());
        let ifetch_clk = ifetch.add_port(factory.clock_port())?;
        let ifetch_rst = ifetch.add_port(factory.reset_port())?;
        let ra_out = ifetch.add_port(factory.address_width_port("ra_out", Direction::Out)?)?;
        let ra_in = ifetch.add_port(factory.address_width_port("ra_in", Direction::In)?)?;
        self.state.ra_out_port = Some(ra_out);
        self.state.ra_in_port = Some(ra_in);
        let ifetch_line = ifetch.add_port_group(factory.instruction_line()?)?;
        let ifetch_pc_in = ifetch.add_port(factory.address_width_port("pc_in", Direction::In)?)?;
        let ifetch_pc_load = ifetch.add_port(Port::in_bit("pc_load"))?;
        let ifetch_ra_load = ifetch.add_port(Port::in_bit("ra_load"))?;
        let ifetch_pc_opcode = ifetch.add_port(Port::with_width(
            "pc_opcode",
            opcode_width,
            DataType::BitVector,
            Direction::In,
        )?)?;
        let ifetch_fetch = ifetch.add_port(Port::in_bit("fetch_en"))?;
        let ifetch_glock = ifetch.add_port(Port::out_bit("glock"))?;
        let ifetch_fetchblock = ifetch.add_port(factory.fetchblock_port("fetchblock", Direction::Out)?)?;

        top.connect(&tl_clk, &ifetch_clk)?;
        top.connect(&tl_rst, &ifetch_rst)?;
        top.connect_groups(&tl_line, &ifetch_line)?;

        if let Some(trigger) = gcu.trigger_port() {
            self.map_netlist_port(&UnitRef::ControlUnit, &trigger.name, &ifetch_pc_in)?;
        }

        // Ports beyond the standard ones are exposed as plain data ports.
        for port in &gcu.ports {
            if port.name == gcu.return_address_port
                || self.is_port_mapped(&UnitRef::ControlUnit, &port.name)
            {
                continue;
            }
            let direction = if port.is_input() {
                Direction::In
            } else {
                Direction::Out
            };
            let data = ifetch.add_port(Port::with_width(
                format!("{}_data", port.name),
                port.width as i64,
                DataType::BitVector,
                direction,
            )?)?;
            self.map_netlist_port(&UnitRef::ControlUnit, &port.name, &data)?;
            if port.is_input() {
                let load = ifetch.add_port(Port::in_bit(format!("{}_load", port.name)))?;
                self.map_load_port(&data, &load)?;
            }
        }

        let decompressor = Block::new(format!("{core_name}_decompressor"), "decomp");
        top.add_sub_block(&decompressor, None)?;
        self.state.instruction_decompressor = Some(decompressor.clone());
        let decomp_fetch = decompressor.add_port(Port::out_bit("fetch_en"))?;
        let decomp_lock = decompressor.add_port(Port::in_bit("lock"))?;
        let decomp_fetchblock =
            decompressor.add_port(factory.fetchblock_port("fetchblock", Direction::In)?)?;
        let decomp_clk = decompressor.add_port(factory.clock_port())?;
        let decomp_rst = decompressor.add_port(factory.reset_port())?;
        let decomp_iword = decompressor.add_port(Port::new(
            "instructionword",
            INSTRUCTION_WIDTH,
            DataType::BitVector,
            Direction::Out,
        ))?;
        let decomp_glock = decompressor.add_port(Port::out_bit("glock"))?;
        let decomp_lock_req = decompressor.add_port(Port::in_bit("lock_r"))?;

        top.connect(&ifetch_fetch, &decomp_fetch)?;
        top.connect(&ifetch_glock, &decomp_lock)?;
        top.connect(&ifetch_fetchblock, &decomp_fetchblock)?;
        top.connect(&tl_clk, &decomp_clk)?;
        top.connect(&tl_rst, &decomp_rst)?;

        let decoder = Block::new(format!("{core_name}_decoder"), "inst_decoder");
        top.add_sub_block(&decoder, None)?;
        self.state.instruction_decoder = Some(decoder.clone());
        let decod_iword = decoder.add_port(Port::new(
            "instructionword",
            INSTRUCTION_WIDTH,
            DataType::BitVector,
            Direction::In,
        ))?;
        let decod_pc_load = decoder.add_port(Port::out_bit("pc_load"))?;
        let decod_ra_load = decoder.add_port(Port::out_bit("ra_load"))?;
        let decod_pc_opcode = decoder.add_port(Port::with_width(
            "pc_opcode",
            opcode_width,
            DataType::BitVector,
            Direction::Out,
        )?)?;
        let decod_lock = decoder.add_port(Port::in_bit("lock"))?;
        let decod_lock_req = decoder.add_port(Port::out_bit("lock_r"))?;
        let decod_clk = decoder.add_port(factory.clock_port())?;
        let decod_rst = decoder.add_port(factory.reset_port())?;
        let decod_locked = decoder.add_port(Port::out_bit("locked"))?;

        top.connect(&decomp_iword, &decod_iword)?;
        top.connect(&decomp_glock, &decod_lock)?;
        top.connect(&decomp_lock_req, &decod_lock_req)?;
        top.connect(&decod_clk, &tl_clk)?;
        top.connect(&decod_rst, &tl_rst)?;
        top.connect(&decod_pc_load, &ifetch_pc_load)?;
        top.connect(&decod_ra_load, &ifetch_ra_load)?;
        top.connect(&decod_pc_opcode, &ifetch_pc_opcode)?;
        top.connect(&tl_locked, &decod_locked)?;

        top.connect_clocks()?;
        top.connect_resets()
    }
}
