// SPDX-License-Identifier: Apache-2.0

//! Routing of implementation ports that have no architectural counterpart
//! to ports of the top block.

use crate::generator::database::ExternalPort;
use crate::generator::lsu::{infer_lsu_signal, is_lsu_data_port};
use crate::generator::model::FunctionUnit;
use crate::{
    Block, DataType, Error, Parameter, Port, PortGroup, Result, SignalGroupType,
};

/// Exposes each generic `external` depends on as a netlist parameter named
/// `<prefix>_<generic>`, assigns that name to the generic of `block`, and
/// returns the width formula rewritten in terms of the netlist parameters.
fn promote_parameters(
    top: &Block,
    block: &Block,
    prefix: &str,
    external: &ExternalPort,
) -> Result<String> {
    let mut formula = external.width_formula.clone();
    for dependency in &external.parameter_dependencies {
        let parameter = block.parameter(dependency)?;
        let netlist_name = format!("{prefix}_{dependency}");
        {
            let mut netlist = top.netlist_mut();
            if !netlist.has_parameter(&netlist_name) {
                netlist.set_parameter(Parameter::new(
                    &netlist_name,
                    parameter.param_type(),
                    parameter.value(),
                ));
            }
        }
        block.set_parameter_value(dependency, &netlist_name)?;
        if !formula.contains(dependency.as_str()) {
            return Err(Error::InvalidData(format!(
                "width formula {} of external port {} does not refer to parameter {}",
                formula, external.name, dependency
            )));
        }
        formula = formula.replacen(dependency.as_str(), &netlist_name, 1);
    }
    Ok(formula)
}

/// Adds the external ports of a function unit instance to `block` and to
/// the top block, named `<instance>_<port>`. Data memory ports of a
/// load/store unit get their bus role and are collected into one memory
/// bus group of its address space.
pub(crate) fn add_fu_external_ports(
    top: &Block,
    block: &Block,
    unit: &FunctionUnit,
    externals: &[ExternalPort],
) -> Result<()> {
    let prefix = block.instance_name();
    let mut pairs = Vec::new();
    let mut bus = Vec::new();
    for external in externals {
        let formula = promote_parameters(top, block, &prefix, external)?;
        let inner = Port::new(
            &external.name,
            &external.width_formula,
            DataType::BitVector,
            external.direction,
        );
        let outer = Port::new(
            format!("{prefix}_{}", external.name),
            formula,
            DataType::BitVector,
            external.direction,
        );
        let inner = block.add_port(inner)?;
        if is_lsu_data_port(unit, &external.name) {
            let signal = infer_lsu_signal(&external.name);
            inner.set_signal(signal);
            outer.set_signal(signal);
            bus.push((inner, outer));
        } else {
            let outer = top.add_port(outer)?;
            pairs.push((inner, outer));
        }
    }

    if let (false, Some(space)) = (bus.is_empty(), unit.address_space.as_deref()) {
        let group = PortGroup::memory_bus(SignalGroupType::BitmaskedSramPort, space);
        for (_, outer) in &bus {
            group.add_port(outer.clone())?;
        }
        top.add_port_group(group)?;
        pairs.extend(bus);
    }

    for (inner, outer) in &pairs {
        top.connect(inner, outer)?;
    }
    Ok(())
}

/// Adds the external ports of a register file or immediate unit, named
/// `<prefix>_<port>`, and connects them.
pub(crate) fn add_rf_external_ports(
    top: &Block,
    block: &Block,
    prefix: &str,
    externals: &[ExternalPort],
) -> Result<()> {
    for external in externals {
        let formula = promote_parameters(top, block, prefix, external)?;
        let inner = block.add_port(Port::new(
            &external.name,
            &external.width_formula,
            DataType::BitVector,
            external.direction,
        ))?;
        let outer = top.add_port(Port::new(
            format!("{prefix}_{}", external.name),
            formula,
            DataType::BitVector,
            external.direction,
        ))?;
        top.connect(&inner, &outer)?;
    }
    Ok(())
}
