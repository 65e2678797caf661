// SPDX-License-Identifier: Apache-2.0

use crate::{
    ActiveState, DataType, Direction, Port, PortGroup, Result, Signal, SignalGroupType, SignalType,
};

pub const CLOCK_PORT_NAME: &str = "clk";
pub const RESET_PORT_NAME: &str = "rstx";
pub const BUSY_PORT_NAME: &str = "busy";
pub const READ_ENABLE_PORT_NAME: &str = "imem_en_x";
pub const ADDRESS_PORT_NAME: &str = "imem_addr";
pub const DATA_PORT_NAME: &str = "imem_data";
pub const LOCK_STATUS_PORT_NAME: &str = "locked";

pub const IMEM_ADDRESS_WIDTH: &str = "IMEMADDRWIDTH";
pub const IMEM_WIDTH_FORMULA: &str = "IMEMWIDTHINMAUS*IMEMMAUWIDTH";
pub const INSTRUCTION_WIDTH: &str = "INSTRUCTIONWIDTH";

/// Creates the canonical ports every core block shares, so that the top
/// block and the instruction fetch block agree on names, roles and widths.
/// One factory is made per generation run.
#[derive(Clone, Debug)]
pub struct PortFactory {
    imem_address_width: Option<usize>,
    imem_width: Option<usize>,
}

impl PortFactory {
    /// `imem_address_width` and `imem_width` are the resolved values of
    /// the instruction memory address and word widths, if known.
    pub fn new(imem_address_width: Option<usize>, imem_width: Option<usize>) -> Self {
        PortFactory {
            imem_address_width,
            imem_width,
        }
    }

    pub fn clock_port(&self) -> Port {
        Port::in_bit(CLOCK_PORT_NAME).with_signal(SignalType::Clock)
    }

    /// Active-low reset.
    pub fn reset_port(&self) -> Port {
        Port::in_bit(RESET_PORT_NAME).with_signal(Signal::active_low(SignalType::Reset))
    }

    pub fn lock_status_port(&self) -> Port {
        Port::out_bit(LOCK_STATUS_PORT_NAME).with_signal(SignalType::CoreHaltStatus)
    }

    /// Instruction memory address output.
    pub fn imem_address_port(&self) -> Result<Port> {
        symbolic_port(
            ADDRESS_PORT_NAME,
            IMEM_ADDRESS_WIDTH,
            self.imem_address_width,
            Direction::Out,
        )
        .map(|port| port.with_signal(SignalType::Address))
    }

    /// Instruction fetch bus: busy, read enable, address and data.
    pub fn instruction_line(&self) -> Result<PortGroup> {
        let busy = Port::in_bit(BUSY_PORT_NAME)
            .with_signal(Signal::new(SignalType::ReadRequestReady, ActiveState::Low));
        let read_enable = Port::out_bit(READ_ENABLE_PORT_NAME)
            .with_signal(Signal::new(SignalType::ReadRequest, ActiveState::Low));
        let address = self.imem_address_port()?;
        let data = symbolic_port(DATA_PORT_NAME, IMEM_WIDTH_FORMULA, self.imem_width, Direction::In)?
            .with_signal(SignalType::Fetchblock);
        PortGroup::with_ports(
            SignalGroupType::InstructionLine,
            [busy, read_enable, address, data],
        )
    }

    /// A vector port sized by the instruction memory address width.
    pub fn address_width_port(&self, name: &str, direction: Direction) -> Result<Port> {
        symbolic_port(name, IMEM_ADDRESS_WIDTH, self.imem_address_width, direction)
    }

    /// A vector port sized by the instruction memory word width.
    pub fn fetchblock_port(&self, name: &str, direction: Direction) -> Result<Port> {
        symbolic_port(name, IMEM_WIDTH_FORMULA, self.imem_width, direction)
    }
}

fn symbolic_port(
    name: &str,
    formula: &str,
    width: Option<usize>,
    direction: Direction,
) -> Result<Port> {
    match width {
        Some(width) => Port::with_formula_and_width(
            name,
            formula,
            width as i64,
            DataType::BitVector,
            direction,
        ),
        None => Ok(Port::new(name, formula, DataType::BitVector, direction)),
    }
}
