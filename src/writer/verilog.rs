// SPDX-License-Identifier: Apache-2.0

use itertools::Itertools;

use crate::writer::{
    Dialect, GROUND_SIGNAL, RenderContext, StructuralPlan, check_range, declared_high,
    quoted_default, quoted_generic, wire_high,
};
use crate::{Block, DataType, Direction, Error, Parameter, Port, Result, StaticValue};

/// Verilog-2001 with SystemVerilog fill literals.
pub struct Verilog;

impl Dialect for Verilog {
    fn module_file_name(module: &str) -> String {
        format!("{module}.v")
    }

    fn package_file_name(package: &str) -> String {
        format!("{package}_pkg.vh")
    }

    fn direction_keyword(direction: Direction) -> &'static str {
        match direction {
            Direction::In => "input",
            Direction::Out => "output",
            Direction::Bidir => "inout",
        }
    }

    fn bit_index(index: usize) -> String {
        format!("[{index}]")
    }

    fn signal_range(high: i64, low: i64, allow_short: bool) -> Result<String> {
        check_range(high, low)?;
        if allow_short && high == low {
            Ok(format!("[{low}]"))
        } else {
            Ok(format!("[{high}:{low}]"))
        }
    }

    fn static_literal(value: StaticValue, _shape: DataType) -> String {
        match value {
            StaticValue::Vcc => "'1".to_string(),
            StaticValue::Gnd => "'0".to_string(),
            StaticValue::Open => Self::unconnected().to_string(),
        }
    }

    fn unconnected() -> &'static str {
        ""
    }

    fn negate(expression: &str) -> String {
        format!("~{expression}")
    }

    fn indexes_formal_ports() -> bool {
        false
    }

    fn generic_value(parameter: &Parameter) -> Result<String> {
        if parameter.is_boolean_type() {
            boolean_value(parameter, parameter.value())
        } else if parameter.is_string_type() {
            Ok(quoted_generic(parameter.value()))
        } else {
            Ok(parameter.value().to_string())
        }
    }

    fn render_package(top: &Block, _package: &str, _ctx: &RenderContext) -> Result<String> {
        let netlist = top.netlist();
        if netlist.parameter_count() == 0 {
            return Ok(format!("parameter {}_DUMMY = 0\n", top.module_name()));
        }
        let lines = netlist
            .parameters()
            .map(|p| format!("parameter {} = {}", p.name(), p.value()))
            .join(",\n");
        Ok(format!("{lines}\n"))
    }

    fn render_structure(block: &Block, plan: &StructuralPlan, ctx: &RenderContext) -> Result<String> {
        let mut text = module_header(block, ctx)?;
        text += "\n";
        for (name, port) in &plan.wires {
            text += &format!("{}wire{} {};\n", ctx.indent(1), wire_range(port), name);
        }
        if plan.ground_width > 0 {
            text += &format!(
                "{}wire {} {};\n",
                ctx.indent(1),
                Self::signal_range(plan.ground_width as i64 - 1, 0, false)?,
                GROUND_SIGNAL
            );
        }
        text += "\n";
        for assignment in &plan.assignments {
            text += &format!(
                "{}assign {} = {};\n",
                ctx.indent(1),
                assignment.target,
                assignment.source
            );
        }
        if plan.ground_width > 0 {
            text += &format!(
                "{}assign {} = {{{}{{1'b0}}}};\n",
                ctx.indent(1),
                GROUND_SIGNAL,
                plan.ground_width
            );
        }
        text += "\n";
        for instance in &plan.instances {
            let component = &instance.block;
            text += &format!("{}{}\n", ctx.indent(1), component.module_name());
            let parameters = component.parameters();
            if !parameters.is_empty() {
                text += &format!("{}#(\n", ctx.indent(1));
                let mut lines = Vec::with_capacity(parameters.len());
                for parameter in &parameters {
                    lines.push(format!(
                        "{}.{}({})",
                        ctx.indent(2),
                        parameter.name(),
                        Self::generic_value(parameter)?
                    ));
                }
                text += &format!("{}\n{})\n", lines.join(",\n"), ctx.indent(1));
            }
            text += &format!(
                "{}{}_{}\n{}(\n",
                ctx.indent(1),
                component.instance_name(),
                instance.index,
                ctx.indent(2)
            );
            let lines = instance
                .port_map
                .iter()
                .map(|(formal, actual)| format!("{}.{}({})", ctx.indent(3), formal, actual))
                .join(",\n");
            text += &format!("{lines});\n\n");
        }
        text += "endmodule\n";
        Ok(text)
    }

    fn render_interface(block: &Block, ctx: &RenderContext) -> Result<String> {
        let mut text = module_header(block, ctx)?;
        text += "\nendmodule\n";
        Ok(text)
    }
}

fn boolean_value(parameter: &Parameter, value: &str) -> Result<String> {
    match value {
        "true" => Ok("1".to_string()),
        "false" => Ok("0".to_string()),
        other => Err(Error::InvalidData(format!(
            "boolean parameter {} has value {}",
            parameter.name(),
            other
        ))),
    }
}

/// `module X`, the parameter list with the package includes, and the port
/// list.
fn module_header(block: &Block, ctx: &RenderContext) -> Result<String> {
    let mut text = format!("module {}\n", block.module_name());
    let mut entries = Vec::new();
    if block.netlist().parameter_count() > 0 {
        entries.push(format!("`include \"{}_pkg.vh\"", ctx.params_package));
    }
    for package in block.packages() {
        entries.push(format!("`include \"{package}_pkg.vh\""));
    }
    for parameter in block.parameters() {
        let mut line = format!("{}parameter {}", ctx.indent(1), parameter.name());
        let default = parameter.default_value();
        if !default.is_empty() {
            let value = if parameter.is_boolean_type() {
                boolean_value(&parameter, default)?
            } else if parameter.is_string_type() {
                quoted_default(default)
            } else {
                default.to_string()
            };
            line += &format!(" = {value}");
        }
        entries.push(line);
    }
    if !entries.is_empty() {
        text += &format!("#(\n{}\n)\n", entries.join(",\n"));
    }
    let lines = block
        .ports()
        .iter()
        .map(|port| {
            format!(
                "{}{}{} {}",
                ctx.indent(1),
                Verilog::direction_keyword(port.direction()),
                port_range(port),
                port.name()
            )
        })
        .join(",\n");
    text += &format!("(\n{lines});\n");
    Ok(text)
}

fn port_range(port: &Port) -> String {
    match port.data_type() {
        DataType::Bit => String::new(),
        DataType::BitVector => format!(" [{}:0]", declared_high(port)),
    }
}

fn wire_range(port: &Port) -> String {
    match port.data_type() {
        DataType::Bit => String::new(),
        DataType::BitVector => format!(" [{}:0]", wire_high(port)),
    }
}
