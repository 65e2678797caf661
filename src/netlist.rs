// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::rc::Weak;

use indexmap::IndexMap;

use crate::port::{PortCore, PortId};
use crate::{DataType, Error, Parameter, Port, Result};

mod groups;

/// Bit ranges joined by one edge of the wiring graph, as seen from the
/// edge's source port (`port1`) towards its target (`port2`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortConnectionProperty {
    port1_first_bit: usize,
    port2_first_bit: usize,
    width: usize,
    inverted: bool,
}

impl PortConnectionProperty {
    /// A connection joining the two ports over their whole width.
    pub fn full(inverted: bool) -> Self {
        PortConnectionProperty {
            port1_first_bit: 0,
            port2_first_bit: 0,
            width: 0,
            inverted,
        }
    }

    /// A connection of `width` bits starting at the given bit of each port.
    /// A width of zero means a full connection.
    pub fn partial(
        port1_first_bit: usize,
        port2_first_bit: usize,
        width: usize,
        inverted: bool,
    ) -> Self {
        PortConnectionProperty {
            port1_first_bit,
            port2_first_bit,
            width,
            inverted,
        }
    }

    pub fn fully_connected(&self) -> bool {
        self.width == 0
    }

    pub fn port1_first_bit(&self) -> usize {
        self.port1_first_bit
    }

    pub fn port2_first_bit(&self) -> usize {
        self.port2_first_bit
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    /// The same connection seen from the other end.
    pub fn mirrored(&self) -> Self {
        PortConnectionProperty {
            port1_first_bit: self.port2_first_bit,
            port2_first_bit: self.port1_first_bit,
            width: self.width,
            inverted: self.inverted,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Edge {
    pub(crate) target: usize,
    pub(crate) property: PortConnectionProperty,
}

struct Vertex {
    port: Weak<RefCell<PortCore>>,
    edges: Vec<Edge>,
}

/// Bit-level wiring graph of one block.
///
/// Every port of the block and of its direct sub-blocks is a vertex with a
/// stable integer descriptor. Vertices hold the ports weakly; the owning
/// blocks unregister ports when they are removed. Every edge has a mirror
/// edge in the opposite direction.
///
/// The netlist also carries netlist-scoped parameters: constants shared by
/// many sub-blocks and emitted into a separate package.
#[derive(Default)]
pub struct Netlist {
    vertices: Vec<Option<Vertex>>,
    /// Slots of unregistered ports, reused by later registrations.
    free: Vec<usize>,
    descriptors: IndexMap<PortId, usize>,
    parameters: IndexMap<String, Parameter>,
}

impl Netlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `port` as a vertex and returns its descriptor. Registering an
    /// already registered port returns the existing descriptor.
    pub fn register_port(&mut self, port: &Port) -> usize {
        let id = port.id();
        if let Some(&descriptor) = self.descriptors.get(&id) {
            return descriptor;
        }
        let vertex = Vertex {
            port: std::rc::Rc::downgrade(&port.core),
            edges: Vec::new(),
        };
        let descriptor = match self.free.pop() {
            Some(slot) => {
                self.vertices[slot] = Some(vertex);
                slot
            }
            None => {
                self.vertices.push(Some(vertex));
                self.vertices.len() - 1
            }
        };
        self.descriptors.insert(id, descriptor);
        descriptor
    }

    /// Removes the vertex of `port` together with every edge touching it.
    pub fn unregister_port(&mut self, port: &Port) {
        if let Some(descriptor) = self.descriptors.shift_remove(&port.id()) {
            if let Some(vertex) = self.vertices[descriptor].take() {
                for edge in vertex.edges {
                    if let Some(Some(other)) = self.vertices.get_mut(edge.target) {
                        other.edges.retain(|e| e.target != descriptor);
                    }
                }
            }
            self.free.push(descriptor);
        }
    }

    pub fn is_registered(&self, port: &Port) -> bool {
        self.descriptors.contains_key(&port.id())
    }

    /// Returns the vertex descriptor of a registered port.
    pub fn descriptor(&self, port: &Port) -> Result<usize> {
        self.descriptors.get(&port.id()).copied().ok_or_else(|| {
            Error::NotFound(format!(
                "port {} is not registered in this netlist",
                port.name()
            ))
        })
    }

    /// Returns the port behind a vertex descriptor, if it is still alive.
    pub fn port_at(&self, descriptor: usize) -> Option<Port> {
        self.vertices
            .get(descriptor)
            .and_then(|v| v.as_ref())
            .and_then(|v| v.port.upgrade())
            .map(|core| Port { core })
    }

    /// Joins two ports over their full width. Ports of different data types
    /// are joined on a single bit instead. The edge is marked inverted when
    /// the ports' active states differ.
    pub fn connect(&mut self, port1: &Port, port2: &Port) -> Result<()> {
        let inverted = needs_inversion(port1, port2);
        let property = if port1.data_type() != port2.data_type() {
            PortConnectionProperty::partial(0, 0, 1, inverted)
        } else {
            PortConnectionProperty::full(inverted)
        };
        self.add_edge_pair(port1, port2, property)
    }

    /// Joins `width` bits of the two ports starting at the given bits. A
    /// width of zero is a full connection when the data types agree and a
    /// one-bit connection when they do not.
    pub fn connect_bits(
        &mut self,
        port1: &Port,
        port2: &Port,
        port1_first_bit: usize,
        port2_first_bit: usize,
        width: usize,
    ) -> Result<()> {
        let width = if width == 0 && port1.data_type() != port2.data_type() {
            1
        } else {
            width
        };
        if width > 0 {
            check_range(port1, port1_first_bit, width)?;
            check_range(port2, port2_first_bit, width)?;
        }
        let property = PortConnectionProperty::partial(
            port1_first_bit,
            port2_first_bit,
            width,
            needs_inversion(port1, port2),
        );
        self.add_edge_pair(port1, port2, property)
    }

    fn add_edge_pair(
        &mut self,
        port1: &Port,
        port2: &Port,
        property: PortConnectionProperty,
    ) -> Result<()> {
        let d1 = self.descriptor(port1)?;
        let d2 = self.descriptor(port2)?;
        log::debug!(
            "connect {} <-> {} ({:?})",
            port1.name(),
            port2.name(),
            property
        );
        self.vertex_mut(d1).edges.push(Edge {
            target: d2,
            property,
        });
        self.vertex_mut(d2).edges.push(Edge {
            target: d1,
            property: property.mirrored(),
        });
        Ok(())
    }

    fn vertex_mut(&mut self, descriptor: usize) -> &mut Vertex {
        match self.vertices[descriptor].as_mut() {
            Some(vertex) => vertex,
            None => unreachable!("descriptor {descriptor} points to a removed vertex"),
        }
    }

    /// Removes every edge between the two ports, in both directions.
    pub fn disconnect_ports(&mut self, port1: &Port, port2: &Port) -> Result<()> {
        let d1 = self.descriptor(port1)?;
        let d2 = self.descriptor(port2)?;
        self.vertex_mut(d1).edges.retain(|e| e.target != d2);
        self.vertex_mut(d2).edges.retain(|e| e.target != d1);
        Ok(())
    }

    /// `true` if the port has at least one edge. Unregistered ports are never
    /// connected.
    pub fn is_port_connected(&self, port: &Port) -> bool {
        self.out_degree(port) > 0
    }

    pub fn out_degree(&self, port: &Port) -> usize {
        self.edges_of(port).map_or(0, |edges| edges.len())
    }

    pub(crate) fn edges_of(&self, port: &Port) -> Option<&[Edge]> {
        let descriptor = *self.descriptors.get(&port.id())?;
        self.vertices[descriptor].as_ref().map(|v| v.edges.as_slice())
    }

    /// Returns the ports `port` is connected to, with the connection seen
    /// from `port`, in the order the connections were made.
    pub fn connections(&self, port: &Port) -> Vec<(Port, PortConnectionProperty)> {
        self.edges_of(port)
            .unwrap_or(&[])
            .iter()
            .filter_map(|e| self.port_at(e.target).map(|p| (p, e.property)))
            .collect()
    }

    /// `true` if the two ports share an edge.
    pub fn are_connected(&self, port1: &Port, port2: &Port) -> bool {
        match (self.edges_of(port1), self.descriptors.get(&port2.id())) {
            (Some(edges), Some(&d2)) => edges.iter().any(|e| e.target == d2),
            _ => false,
        }
    }

    /// `true` if no port is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn has_connections(&self) -> bool {
        self.vertices.iter().flatten().any(|v| !v.edges.is_empty())
    }

    pub fn port_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Sets a netlist parameter, replacing any parameter of the same name.
    pub fn set_parameter(&mut self, param: Parameter) {
        self.remove_parameter(param.name());
        self.parameters.insert(param.name().to_string(), param);
    }

    pub fn remove_parameter(&mut self, name: &str) {
        self.parameters.shift_remove(name);
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    pub fn parameter(&self, name: &str) -> Result<&Parameter> {
        self.parameters
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("netlist parameter {name}")))
    }

    pub fn parameter_at(&self, index: usize) -> Result<&Parameter> {
        self.parameters
            .get_index(index)
            .map(|(_, p)| p)
            .ok_or_else(|| {
                Error::OutOfRange(format!(
                    "netlist parameter index {index} of {}",
                    self.parameters.len()
                ))
            })
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }
}

fn needs_inversion(port1: &Port, port2: &Port) -> bool {
    port1.assigned_signal().active_state != port2.assigned_signal().active_state
}

fn check_range(port: &Port, first_bit: usize, width: usize) -> Result<()> {
    if port.data_type() == DataType::Bit {
        if first_bit == 0 && width == 1 {
            return Ok(());
        }
        return Err(Error::OutOfRange(format!(
            "bits {}..{} of single-bit port {}",
            first_bit,
            first_bit + width,
            port.name()
        )));
    }
    match port.real_width() {
        Ok(port_width) if first_bit + width > port_width.max(1) => Err(Error::OutOfRange(format!(
            "bits {}..{} of port {} with width {}",
            first_bit,
            first_bit + width,
            port.name(),
            port_width
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, Signal, SignalType};

    fn registered(netlist: &mut Netlist, ports: &[&Port]) {
        for p in ports {
            netlist.register_port(p);
        }
    }

    #[test]
    fn connect_is_symmetric_and_disconnect_restores() {
        let mut netlist = Netlist::new();
        let a = Port::out_bit("a");
        let b = Port::in_bit("b");
        registered(&mut netlist, &[&a, &b]);
        assert!(!netlist.is_port_connected(&a));
        netlist.connect(&a, &b).unwrap();
        assert!(netlist.is_port_connected(&a));
        assert!(netlist.is_port_connected(&b));
        assert!(netlist.are_connected(&b, &a));
        netlist.disconnect_ports(&a, &b).unwrap();
        assert!(!netlist.is_port_connected(&a));
        assert!(!netlist.is_port_connected(&b));
        assert!(!netlist.has_connections());
    }

    #[test]
    fn bit_to_vector_is_one_bit_partial() {
        let mut netlist = Netlist::new();
        let bit = Port::out_bit("q");
        let vec = Port::with_width("d", 1, DataType::BitVector, Direction::In).unwrap();
        registered(&mut netlist, &[&bit, &vec]);
        netlist.connect(&bit, &vec).unwrap();
        let (_, property) = netlist.connections(&bit).remove(0);
        assert!(!property.fully_connected());
        assert_eq!(property.width(), 1);
    }

    #[test]
    fn partial_ranges_are_mirrored() {
        let mut netlist = Netlist::new();
        let a = Port::with_width("a", 16, DataType::BitVector, Direction::Out).unwrap();
        let b = Port::with_width("b", 8, DataType::BitVector, Direction::In).unwrap();
        registered(&mut netlist, &[&a, &b]);
        netlist.connect_bits(&a, &b, 8, 0, 8).unwrap();
        let (_, from_a) = netlist.connections(&a).remove(0);
        let (_, from_b) = netlist.connections(&b).remove(0);
        assert_eq!((from_a.port1_first_bit(), from_a.port2_first_bit()), (8, 0));
        assert_eq!((from_b.port1_first_bit(), from_b.port2_first_bit()), (0, 8));
        assert_eq!(from_a.width(), from_b.width());
    }

    #[test]
    fn range_past_width_is_out_of_range() {
        let mut netlist = Netlist::new();
        let a = Port::with_width("a", 4, DataType::BitVector, Direction::Out).unwrap();
        let b = Port::with_width("b", 8, DataType::BitVector, Direction::In).unwrap();
        registered(&mut netlist, &[&a, &b]);
        let err = netlist.connect_bits(&a, &b, 2, 0, 4).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
    }

    #[test]
    fn polarity_mismatch_inverts() {
        let mut netlist = Netlist::new();
        let a = Port::out_bit("rst").with_signal(SignalType::Reset);
        let b = Port::in_bit("rstx").with_signal(Signal::active_low(SignalType::Reset));
        registered(&mut netlist, &[&a, &b]);
        netlist.connect(&a, &b).unwrap();
        assert!(netlist.connections(&a)[0].1.inverted());
    }

    #[test]
    fn unregister_removes_mirror_edges() {
        let mut netlist = Netlist::new();
        let a = Port::out_bit("a");
        let b = Port::in_bit("b");
        registered(&mut netlist, &[&a, &b]);
        netlist.connect(&a, &b).unwrap();
        netlist.unregister_port(&a);
        assert!(!netlist.is_registered(&a));
        assert!(!netlist.is_port_connected(&b));
        assert!(matches!(netlist.connect(&a, &b), Err(Error::NotFound(_))));
    }

    #[test]
    fn unregistered_slots_are_reused() {
        let mut netlist = Netlist::new();
        let a = Port::out_bit("a");
        let b = Port::in_bit("b");
        registered(&mut netlist, &[&a, &b]);
        netlist.connect(&a, &b).unwrap();
        let slot = netlist.descriptor(&a).unwrap();
        for round in 0..4 {
            netlist.unregister_port(&a);
            let c = Port::out_bit(format!("c{round}"));
            assert_eq!(netlist.register_port(&c), slot);
            assert!(!netlist.is_port_connected(&c));
            assert!(!netlist.is_port_connected(&b));
            netlist.connect(&c, &b).unwrap();
            assert!(netlist.are_connected(&b, &c));
            netlist.unregister_port(&c);
            netlist.register_port(&a);
        }
        assert_eq!(netlist.vertices.len(), 2);
        assert_eq!(netlist.port_count(), 2);
    }

    #[test]
    fn parameters_replace_by_name() {
        let mut netlist = Netlist::new();
        netlist.set_parameter(Parameter::new("N", "integer", "8"));
        netlist.set_parameter(Parameter::new("M", "integer", "2"));
        netlist.set_parameter(Parameter::new("N", "integer", "16"));
        assert_eq!(netlist.parameter_count(), 2);
        assert_eq!(netlist.parameter("N").unwrap().value(), "16");
        assert_eq!(netlist.parameter_at(1).unwrap().name(), "N");
        assert!(matches!(netlist.parameter_at(2), Err(Error::OutOfRange(_))));
        netlist.remove_parameter("M");
        assert!(!netlist.has_parameter("M"));
    }
}
