// SPDX-License-Identifier: Apache-2.0

//! Name-based recognition of load/store units and their memory bus ports.

use crate::generator::model::{Architecture, FunctionUnit};
use crate::util::ceil_log2;
use crate::{ActiveState, Error, Result, Signal, SignalType};

const MEMORY_OPERATIONS: [&str; 18] = [
    "ldw", "ldh", "ldq", "ldw2", "ldw4", "stw", "sth", "stq", "stw2", "stw4", "ld8", "ldu8",
    "ld16", "ldu16", "ld32", "st8", "st16", "st32",
];

const DATA_PORT_WORDS: [&str; 5] = ["addr", "data", "mem_en", "wr_en", "wr_mask"];

/// A unit with an address space that implements any memory operation.
pub fn is_lsu(unit: &FunctionUnit) -> bool {
    unit.address_space.is_some() && MEMORY_OPERATIONS.iter().any(|op| unit.has_operation(op))
}

/// Whether the external port `port_name` of `unit` is part of its data
/// memory bus.
pub fn is_lsu_data_port(unit: &FunctionUnit, port_name: &str) -> bool {
    unit.address_space.is_some() && DATA_PORT_WORDS.iter().any(|w| port_name.contains(w))
}

/// Memory bus role of an external port. A trailing `_x` after the keyword
/// marks an active-low signal.
pub fn infer_lsu_signal(port_name: &str) -> Signal {
    let after = |word: &str, suffix: &str| {
        port_name
            .find(word)
            .is_some_and(|pos| port_name[pos + word.len()..].contains(suffix))
    };
    let polarity = |word: &str, signal_type: SignalType| {
        if after(word, "_x") {
            Signal::new(signal_type, ActiveState::Low)
        } else {
            Signal::from(signal_type)
        }
    };
    if port_name.contains("addr") {
        Signal::from(SignalType::Address)
    } else if port_name.contains("data") {
        if after("data", "_in") {
            Signal::from(SignalType::ReadData)
        } else if after("data", "_out") {
            Signal::from(SignalType::WriteData)
        } else {
            Signal::default()
        }
    } else if port_name.contains("mem_en") {
        polarity("mem_en", SignalType::ReadWriteRequest)
    } else if port_name.contains("wr_mask") {
        polarity("wr_mask", SignalType::WriteBitmask)
    } else if port_name.contains("wr_en") {
        polarity("wr_en", SignalType::WriteMode)
    } else {
        Signal::default()
    }
}

/// Address width of the address space `unit` accesses: `ceil(log2(end))`.
pub fn calculate_address_width(architecture: &Architecture, unit: &FunctionUnit) -> Result<usize> {
    let space = unit
        .address_space
        .as_deref()
        .and_then(|name| architecture.address_space(name))
        .ok_or_else(|| {
            Error::InvalidData(format!(
                "tried to resolve address space width from FU {} that does not have an address space",
                unit.name
            ))
        })?;
    if space.end == 0 || space.start >= space.end {
        return Err(Error::InvalidData(format!(
            "invalid address space {} ({}..{})",
            space.name, space.start, space.end
        )));
    }
    Ok(ceil_log2(space.end))
}
