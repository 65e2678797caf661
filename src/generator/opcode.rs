// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;

use crate::DiagnosticSink;
use crate::generator::database::FuImplementation;
use crate::generator::model::{ControlUnit, FunctionUnit, Operation};
use crate::util::required_bits;

/// Distinct operation names in byte order.
fn sorted_names(operations: &[Operation]) -> BTreeSet<&str> {
    operations.iter().map(|op| op.name.as_str()).collect()
}

/// Width of the opcode port of a stored function unit; at least one bit.
///
/// Operations of `unit`, the architecture stored with the implementation,
/// are coded by their alphabetical order starting from zero. An opcode
/// stored with the implementation that disagrees with this order is
/// reported to `sink` as a warning and the alphabetical code is used.
pub fn fu_opcode_port_width(
    unit: &FunctionUnit,
    implementation: &FuImplementation,
    sink: &DiagnosticSink,
) -> usize {
    let names = sorted_names(&unit.operations);
    let mut width = 1;
    for (opcode, name) in names.iter().enumerate() {
        let opcode = opcode as u64;
        if names.len() != 1 {
            if let Some(stored) = implementation.opcode(name) {
                if stored != opcode {
                    sink.warning(format!(
                        "opcode {stored} stored for operation {name} of {} does not \
                         follow the alphabetical order of operations, using {opcode}",
                        implementation.module_name
                    ));
                }
            }
        }
        width = width.max(required_bits(opcode));
    }
    width
}

/// Width of the program counter opcode of the control unit, which codes
/// its operations as `0..n-1`; at least one bit.
pub fn gcu_opcode_port_width(gcu: &ControlUnit) -> usize {
    let count = sorted_names(&gcu.operations).len();
    if count < 2 {
        1
    } else {
        required_bits(count as u64 - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(names: &[&str]) -> FunctionUnit {
        names
            .iter()
            .fold(FunctionUnit::new("fu"), |fu, name| fu.with_operation(Operation::new(name)))
    }

    #[test]
    fn widths_follow_operation_count() {
        let sink = DiagnosticSink::new();
        let imp = FuImplementation::new("fu_impl");
        assert_eq!(fu_opcode_port_width(&unit(&["ADD"]), &imp, &sink), 1);
        assert_eq!(fu_opcode_port_width(&unit(&[]), &imp, &sink), 1);
        assert_eq!(fu_opcode_port_width(&unit(&["ADD", "SUB"]), &imp, &sink), 1);
        assert_eq!(fu_opcode_port_width(&unit(&["ADD", "SUB", "MUL"]), &imp, &sink), 2);
        assert_eq!(sink.warning_count(), 0);
    }

    #[test]
    fn stored_opcode_out_of_order_warns() {
        let sink = DiagnosticSink::new();
        let mut imp = FuImplementation::new("fu_impl");
        imp.opcodes.insert("SUB".to_string(), 0);
        imp.opcodes.insert("ADD".to_string(), 0);
        assert_eq!(fu_opcode_port_width(&unit(&["SUB", "ADD"]), &imp, &sink), 1);
        assert_eq!(sink.warning_count(), 1);
        assert!(sink.diagnostics()[0].message.contains("SUB"));
    }

    #[test]
    fn stored_opcodes_match_names_ignoring_case() {
        let sink = DiagnosticSink::new();
        let mut imp = FuImplementation::new("fu_impl");
        imp.opcodes.insert("add".to_string(), 1);
        imp.opcodes.insert("sub".to_string(), 0);
        assert_eq!(fu_opcode_port_width(&unit(&["ADD", "SUB"]), &imp, &sink), 1);
        assert_eq!(sink.warning_count(), 2);

        let sink = DiagnosticSink::new();
        imp.opcodes.insert("add".to_string(), 0);
        imp.opcodes.insert("sub".to_string(), 1);
        fu_opcode_port_width(&unit(&["ADD", "SUB"]), &imp, &sink);
        assert_eq!(sink.warning_count(), 0);
    }

    #[test]
    fn single_operation_skips_stored_opcode() {
        let sink = DiagnosticSink::new();
        let mut imp = FuImplementation::new("fu_impl");
        imp.opcodes.insert("ADD".to_string(), 3);
        fu_opcode_port_width(&unit(&["ADD"]), &imp, &sink);
        assert_eq!(sink.warning_count(), 0);
    }

    #[test]
    fn control_unit_needs_one_bit() {
        let gcu = ControlUnit::new("gcu");
        assert_eq!(gcu_opcode_port_width(&gcu), 1);
        let gcu = gcu.with_operation(Operation::new("jump"));
        assert_eq!(gcu_opcode_port_width(&gcu), 1);
        let gcu = gcu
            .with_operation(Operation::new("call"))
            .with_operation(Operation::new("nop"));
        assert_eq!(gcu_opcode_port_width(&gcu), 2);
    }
}
