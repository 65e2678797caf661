// SPDX-License-Identifier: Apache-2.0

use itertools::Itertools;

use crate::writer::{
    Dialect, GROUND_SIGNAL, RenderContext, StructuralPlan, check_range, declared_high,
    quoted_default, quoted_generic, wire_high,
};
use crate::{Block, DataType, Direction, Parameter, Port, Result, StaticValue};

/// VHDL-93 with the `std_logic` types.
pub struct Vhdl;

impl Dialect for Vhdl {
    fn module_file_name(module: &str) -> String {
        format!("{module}.vhdl")
    }

    fn package_file_name(package: &str) -> String {
        format!("{package}_pkg.vhdl")
    }

    fn direction_keyword(direction: Direction) -> &'static str {
        match direction {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::Bidir => "inout",
        }
    }

    fn bit_index(index: usize) -> String {
        format!("({index})")
    }

    fn signal_range(high: i64, low: i64, allow_short: bool) -> Result<String> {
        check_range(high, low)?;
        if allow_short && high == low {
            Ok(format!("({low})"))
        } else {
            Ok(format!("({high} downto {low})"))
        }
    }

    fn static_literal(value: StaticValue, shape: DataType) -> String {
        let bit = match value {
            StaticValue::Vcc => '1',
            StaticValue::Gnd => '0',
            StaticValue::Open => return Self::unconnected().to_string(),
        };
        match shape {
            DataType::Bit => format!("'{bit}'"),
            DataType::BitVector => format!("(others => '{bit}')"),
        }
    }

    fn unconnected() -> &'static str {
        "open"
    }

    fn negate(expression: &str) -> String {
        format!("not {expression}")
    }

    fn indexes_formal_ports() -> bool {
        true
    }

    fn generic_value(parameter: &Parameter) -> Result<String> {
        if parameter.is_string_type() {
            Ok(quoted_generic(parameter.value()))
        } else {
            Ok(parameter.value().to_string())
        }
    }

    fn render_package(top: &Block, package: &str, ctx: &RenderContext) -> Result<String> {
        let mut text = format!("package {package} is\n");
        for parameter in top.netlist().parameters() {
            text += &format!(
                "{}constant {} : {} := {};\n",
                ctx.indent(1),
                parameter.name(),
                parameter.param_type(),
                parameter.value()
            );
        }
        text += &format!("end {package};\n");
        Ok(text)
    }

    fn render_structure(block: &Block, plan: &StructuralPlan, ctx: &RenderContext) -> Result<String> {
        let entity = block.module_name();
        let mut text = header(block, ctx);
        text += &entity_declaration(block, ctx);

        text += &format!("\narchitecture structural of {entity} is\n\n");
        for (name, port) in &plan.wires {
            text += &format!("{}signal {} : {};\n", ctx.indent(1), name, signal_type(port));
        }
        if plan.ground_width > 0 {
            text += &format!(
                "{}signal {} : std_logic_vector{};\n",
                ctx.indent(1),
                GROUND_SIGNAL,
                Self::signal_range(plan.ground_width as i64 - 1, 0, false)?
            );
        }
        text += "\n";
        for component in &plan.components {
            text += &format!("{}component {} is\n", ctx.indent(1), component.module_name());
            let parameters = component.parameters();
            if !parameters.is_empty() {
                text += &format!("{}generic (\n", ctx.indent(2));
                let lines = parameters
                    .iter()
                    .map(|p| format!("{}{} : {}", ctx.indent(3), p.name(), p.param_type()))
                    .join(";\n");
                text += &format!("{lines});\n");
            }
            text += &port_clause(&component.ports(), 2, ctx);
            text += &format!("{}end component;\n\n", ctx.indent(1));
        }

        text += "begin\n\n";
        for assignment in &plan.assignments {
            text += &format!(
                "{}{} <= {};\n",
                ctx.indent(1),
                assignment.target,
                assignment.source
            );
        }
        if plan.ground_width > 0 {
            text += &format!("{}{} <= (others => '0');\n", ctx.indent(1), GROUND_SIGNAL);
        }
        text += "\n";
        for instance in &plan.instances {
            let component = &instance.block;
            text += &format!(
                "{}{} : {}\n",
                ctx.indent(1),
                component.instance_name(),
                component.module_name()
            );
            let parameters = component.parameters();
            if !parameters.is_empty() {
                text += &format!("{}generic map (\n", ctx.indent(2));
                let mut lines = Vec::with_capacity(parameters.len());
                for parameter in &parameters {
                    lines.push(format!(
                        "{}{} => {}",
                        ctx.indent(3),
                        parameter.name(),
                        Self::generic_value(parameter)?
                    ));
                }
                text += &format!("{})\n", lines.join(",\n"));
            }
            text += &format!("{}port map (\n", ctx.indent(2));
            let lines = instance
                .port_map
                .iter()
                .map(|(formal, actual)| format!("{}{} => {}", ctx.indent(3), formal, actual))
                .join(",\n");
            text += &format!("{lines});\n\n");
        }
        text += "end structural;\n";
        Ok(text)
    }

    fn render_interface(block: &Block, ctx: &RenderContext) -> Result<String> {
        let mut text = header(block, ctx);
        text += &entity_declaration(block, ctx);
        Ok(text)
    }
}

fn header(block: &Block, ctx: &RenderContext) -> String {
    let mut text = String::from(
        "library IEEE;\n\
         use IEEE.std_logic_1164.all;\n\
         use IEEE.std_logic_arith.all;\n\
         use work.tce_util.all;\n",
    );
    for package in block.packages() {
        text += &format!("use work.{package}.all;\n");
    }
    if block.netlist().parameter_count() > 0 {
        text += &format!("use work.{}.all;\n", ctx.params_package);
    }
    text += "\n";
    text
}

fn entity_declaration(block: &Block, ctx: &RenderContext) -> String {
    let entity = block.module_name();
    let mut text = format!("entity {entity} is\n");
    let parameters = block.parameters();
    if !parameters.is_empty() {
        text += &format!("\n{}generic (\n", ctx.indent(1));
        let lines = parameters
            .iter()
            .map(|p| {
                let mut line = format!("{}{} : {}", ctx.indent(2), p.name(), p.param_type());
                if !p.default_value().is_empty() {
                    let default = if p.is_string_type() {
                        quoted_default(p.default_value())
                    } else {
                        p.default_value().to_string()
                    };
                    line += &format!(" := {default}");
                }
                line
            })
            .join(";\n");
        text += &format!("{lines});\n");
    }
    let ports = block.ports();
    if !ports.is_empty() {
        text += "\n";
        text += &port_clause(&ports, 1, ctx);
    }
    text += &format!("\nend {entity};\n");
    text
}

fn port_clause(ports: &[Port], level: usize, ctx: &RenderContext) -> String {
    let lines = ports
        .iter()
        .map(|port| {
            format!(
                "{}{} : {} {}",
                ctx.indent(level + 1),
                port.name(),
                Vhdl::direction_keyword(port.direction()),
                port_type(port)
            )
        })
        .join(";\n");
    format!("{}port (\n{});\n", ctx.indent(level), lines)
}

fn port_type(port: &Port) -> String {
    match port.data_type() {
        DataType::Bit => "std_logic".to_string(),
        DataType::BitVector => format!("std_logic_vector({} downto 0)", declared_high(port)),
    }
}

fn signal_type(port: &Port) -> String {
    match port.data_type() {
        DataType::Bit => "std_logic".to_string(),
        DataType::BitVector => format!("std_logic_vector({} downto 0)", wire_high(port)),
    }
}
