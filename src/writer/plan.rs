// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::port::PortId;
use crate::writer::{Dialect, GROUND_SIGNAL, wire_name};
use crate::{Block, DataType, Direction, Netlist, Port, PortConnectionProperty, Result, StaticValue};

/// `target <= source` in the block's body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub target: String,
    pub source: String,
}

/// One instantiated sub-block with its port map.
#[derive(Clone, Debug)]
pub struct Instance {
    pub block: Block,
    /// Position among all sub-blocks of the parent.
    pub index: usize,
    /// `(formal, actual)` pairs in port declaration order.
    pub port_map: Vec<(String, String)>,
}

/// Everything the body of a structural block consists of, independent of
/// the target language.
#[derive(Clone, Debug)]
pub struct StructuralPlan {
    /// Wire names with the ports they replace, sub-blocks sorted by
    /// instance name.
    pub wires: Vec<(String, Port)>,
    /// Width of the all-zero ground wire; zero if none is needed.
    pub ground_width: usize,
    pub assignments: Vec<Assignment>,
    /// One representative per distinct module of the non-virtual sub-blocks.
    pub components: Vec<Block>,
    pub instances: Vec<Instance>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Route {
    /// Mapped to a constant in the port map.
    Literal(StaticValue),
    /// Mapped straight onto the block's own port.
    Direct { formal: String, actual: String },
    /// Mapped to its own wire.
    Wired,
}

impl StructuralPlan {
    /// Plans the body of `block` for dialect `D`.
    pub fn build<D: Dialect>(block: &Block) -> Result<StructuralPlan> {
        let netlist = block.netlist();
        let sub_blocks = block.sub_blocks();

        let mut routes = Vec::new();
        for sub_block in sub_blocks.iter().filter(|b| !b.is_virtual()) {
            for port in sub_block.ports() {
                let route = route::<D>(block, &netlist, &port);
                routes.push((port, route));
            }
        }
        let is_wired = |port: &Port| {
            routes
                .iter()
                .any(|(p, route)| p == port && *route == Route::Wired)
        };

        let mut sorted: Vec<&Block> = sub_blocks.iter().filter(|b| !b.is_virtual()).collect();
        sorted.sort_by_key(|b| b.instance_name());
        let mut wires = Vec::new();
        for sub_block in sorted {
            for port in sub_block.ports() {
                if is_wired(&port) {
                    wires.push((wire_name(&port), port));
                }
            }
        }

        let mut assignments = Vec::new();
        for own in block.ports() {
            if own.direction() != Direction::Out {
                continue;
            }
            for (other, property) in netlist.connections(&own) {
                if other.parent_block().as_ref() == Some(block) {
                    push_assignment::<D>(block, &mut assignments, &own, &other, &property)?;
                }
            }
        }
        let mut handled: HashSet<(PortId, PortId)> = HashSet::new();
        for (port, route) in &routes {
            if *route != Route::Wired {
                continue;
            }
            for (other, property) in netlist.connections(port) {
                let local = other.parent_block().as_ref() == Some(block);
                if local {
                    if port.direction() == Direction::Out {
                        push_assignment::<D>(
                            block,
                            &mut assignments,
                            &other,
                            port,
                            &property.mirrored(),
                        )?;
                    } else {
                        push_assignment::<D>(block, &mut assignments, port, &other, &property)?;
                    }
                    continue;
                }
                if handled.contains(&(other.id(), port.id())) {
                    continue;
                }
                handled.insert((port.id(), other.id()));
                if port.direction() != Direction::Out && other.direction() == Direction::Out {
                    push_assignment::<D>(
                        block,
                        &mut assignments,
                        port,
                        &other,
                        &property,
                    )?;
                } else if port.direction() == Direction::Out {
                    push_assignment::<D>(
                        block,
                        &mut assignments,
                        &other,
                        port,
                        &property.mirrored(),
                    )?;
                } else {
                    push_assignment::<D>(block, &mut assignments, port, &other, &property)?;
                }
            }
        }

        let mut ground_width = 0;
        for (port, route) in &routes {
            if *route != Route::Wired
                || netlist.is_port_connected(port)
                || port.direction() != Direction::In
            {
                continue;
            }
            let source = match port.data_type() {
                DataType::Bit => {
                    ground_width = ground_width.max(1);
                    format!("{}{}", GROUND_SIGNAL, D::bit_index(0))
                }
                DataType::BitVector => match port.known_width() {
                    Some(width) => {
                        let width = width.max(1);
                        ground_width = ground_width.max(width);
                        format!(
                            "{}{}",
                            GROUND_SIGNAL,
                            D::signal_range(width as i64 - 1, 0, false)?
                        )
                    }
                    None => D::static_literal(StaticValue::Gnd, DataType::BitVector),
                },
            };
            assignments.push(Assignment {
                target: wire_name(port),
                source,
            });
        }

        let mut modules = IndexSet::new();
        let mut components = Vec::new();
        let mut instances = Vec::new();
        for (index, sub_block) in sub_blocks.iter().enumerate() {
            if sub_block.is_virtual() {
                continue;
            }
            if modules.insert(sub_block.module_name()) {
                components.push(sub_block.clone());
            }
            let port_map = sub_block
                .ports()
                .into_iter()
                .map(|port| {
                    let route = routes
                        .iter()
                        .find(|(p, _)| *p == port)
                        .map_or(Route::Wired, |(_, r)| r.clone());
                    match route {
                        Route::Literal(StaticValue::Open) => {
                            (port.name(), D::unconnected().to_string())
                        }
                        Route::Literal(value) => {
                            (port.name(), D::static_literal(value, port.data_type()))
                        }
                        Route::Direct { formal, actual } => (formal, actual),
                        Route::Wired => (port.name(), wire_name(&port)),
                    }
                })
                .collect();
            instances.push(Instance {
                block: sub_block.clone(),
                index,
                port_map,
            });
        }

        Ok(StructuralPlan {
            wires,
            ground_width,
            assignments,
            components,
            instances,
        })
    }
}

fn route<D: Dialect>(block: &Block, netlist: &Netlist, port: &Port) -> Route {
    if let Some(value) = port.static_value() {
        return Route::Literal(value);
    }
    let connections = netlist.connections(port);
    let [(other, property)] = connections.as_slice() else {
        return Route::Wired;
    };
    if property.inverted()
        || other.has_static_value()
        || other.parent_block().as_ref() != Some(block)
    {
        return Route::Wired;
    }
    match (port.data_type(), other.data_type()) {
        (DataType::Bit, DataType::BitVector) => Route::Direct {
            formal: port.name(),
            actual: format!("{}{}", other.name(), D::bit_index(property.port2_first_bit())),
        },
        (DataType::BitVector, DataType::Bit)
            if port.width_formula() == "1" && D::indexes_formal_ports() =>
        {
            Route::Direct {
                formal: format!("{}{}", port.name(), D::bit_index(0)),
                actual: other.name(),
            }
        }
        (a, b) if a == b && property.fully_connected() => Route::Direct {
            formal: port.name(),
            actual: other.name(),
        },
        _ => Route::Wired,
    }
}

/// How `port` is referred to inside the body of `block`.
fn reference<D: Dialect>(block: &Block, port: &Port, shape: DataType) -> String {
    if let Some(value) = port.static_value() {
        return D::static_literal(value, shape);
    }
    match port.parent_block() {
        Some(parent) if parent == *block => port.name(),
        Some(parent) if parent.is_virtual() => D::static_literal(StaticValue::Gnd, shape),
        _ => wire_name(port),
    }
}

/// One side of a connection: the reference to `port`, sliced to the bits
/// the connection covers when it is partial.
fn side<D: Dialect>(
    block: &Block,
    port: &Port,
    other: &Port,
    first_bit: usize,
    property: &PortConnectionProperty,
) -> Result<String> {
    let partial = !property.fully_connected();
    let shape = if partial && other.data_type() == DataType::Bit {
        DataType::Bit
    } else {
        port.data_type()
    };
    let base = reference::<D>(block, port, shape);
    if port.has_static_value() || !partial || port.data_type() == DataType::Bit {
        return Ok(base);
    }
    if other.data_type() == DataType::Bit {
        return Ok(format!("{}{}", base, D::bit_index(first_bit)));
    }
    let high = (first_bit + property.width()) as i64 - 1;
    Ok(format!(
        "{}{}",
        base,
        D::signal_range(high, first_bit as i64, true)?
    ))
}

/// Pushes `target <= source` for the connection `property`, which is seen
/// from `target`. Constants and ports of virtual blocks cannot be driven,
/// and an open source drives nothing.
fn push_assignment<D: Dialect>(
    block: &Block,
    assignments: &mut Vec<Assignment>,
    target: &Port,
    source: &Port,
    property: &PortConnectionProperty,
) -> Result<()> {
    let undrivable = target.has_static_value()
        || target
            .parent_block()
            .is_some_and(|b| b != *block && b.is_virtual());
    if undrivable || source.static_value() == Some(StaticValue::Open) {
        return Ok(());
    }
    let lhs = side::<D>(block, target, source, property.port1_first_bit(), property)?;
    let mut rhs = side::<D>(
        block,
        source,
        target,
        property.port2_first_bit(),
        property,
    )?;
    if property.inverted() {
        rhs = D::negate(&rhs);
    }
    assignments.push(Assignment {
        target: lhs,
        source: rhs,
    });
    Ok(())
}
