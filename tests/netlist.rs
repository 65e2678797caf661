// SPDX-License-Identifier: Apache-2.0

use progen::*;
use rstest::rstest;

fn vector(name: &str, width: i64, direction: Direction) -> Port {
    Port::with_width(name, width, DataType::BitVector, direction).unwrap()
}

#[test]
fn test_partial_connection_bounds() {
    let top = Block::new("top", "top");
    let leaf = Block::new("leaf", "u0");
    top.add_sub_block(&leaf, None).unwrap();
    let bus = top.add_port(vector("bus", 8, Direction::In)).unwrap();
    let lo = leaf.add_port(vector("lo", 4, Direction::In)).unwrap();
    let bit = leaf.add_port(Port::in_bit("bit")).unwrap();

    top.connect_bits(&bus, &lo, 0, 0, 4).unwrap();
    top.connect_bits(&bus, &bit, 7, 0, 1).unwrap();
    assert!(matches!(
        top.connect_bits(&bus, &lo, 6, 0, 4),
        Err(Error::OutOfRange(_))
    ));
    assert!(matches!(
        top.connect_bits(&bus, &bit, 0, 1, 1),
        Err(Error::OutOfRange(_))
    ));

    let netlist = top.netlist();
    let connections = netlist.connections(&bit);
    assert_eq!(connections.len(), 1);
    let (other, property) = &connections[0];
    assert_eq!(*other, bus);
    assert_eq!((property.port1_first_bit(), property.port2_first_bit()), (0, 7));
    assert_eq!(property.width(), 1);
}

#[test]
fn test_unregistered_port_cannot_connect() {
    let top = Block::new("top", "top");
    let a = top.add_port(Port::in_bit("a")).unwrap();
    let stray = Port::in_bit("stray");
    assert!(matches!(top.connect(&a, &stray), Err(Error::NotFound(_))));
    assert!(!top.is_connected(&stray));
}

#[test]
fn test_width_formula_resolution() {
    let top = Block::new("top", "top");
    top.netlist_mut()
        .set_parameter(Parameter::new("N", "integer", "8"));
    let n = top
        .add_port(Port::new("n", "N", DataType::BitVector, Direction::In))
        .unwrap();
    let n1 = top
        .add_port(Port::new("n1", "N+1", DataType::BitVector, Direction::In))
        .unwrap();
    let lit = top
        .add_port(Port::new("lit", "16", DataType::BitVector, Direction::In))
        .unwrap();
    assert!(matches!(n.real_width(), Err(Error::NotAvailable(_))));
    assert_eq!(n.resolve_real_width(), Some(8));
    assert_eq!(n1.resolve_real_width(), None);
    assert_eq!(lit.resolve_real_width(), Some(16));
    assert!(matches!(n1.real_width(), Err(Error::NotAvailable(_))));
    assert!(matches!(
        Port::with_width("neg", -1, DataType::BitVector, Direction::In),
        Err(Error::OutOfRange(_))
    ));
}

#[test]
fn test_resolved_width_is_kept() {
    let top = Block::new("top", "top");
    top.netlist_mut()
        .set_parameter(Parameter::new("N", "integer", "8"));
    let n = top
        .add_port(Port::new("n", "N", DataType::BitVector, Direction::In))
        .unwrap();
    assert!(!n.real_width_available());
    assert_eq!(n.resolve_real_width(), Some(8));
    assert!(n.real_width_available());
    assert_eq!(n.real_width().unwrap(), 8);

    top.netlist_mut()
        .set_parameter(Parameter::new("N", "integer", "12"));
    assert_eq!(n.resolve_real_width(), Some(8));
    assert_eq!(n.width_formula(), "N");
}

#[test]
fn test_copy_to_carries_resolved_width() {
    let top = Block::new("top", "top");
    top.netlist_mut()
        .set_parameter(Parameter::new("N", "integer", "8"));
    let n = top
        .add_port(
            Port::new("n", "N", DataType::BitVector, Direction::Out)
                .with_signal(SignalType::WriteData),
        )
        .unwrap();
    let other = Block::new("other", "u1");
    let copy = n.copy_to(&other, Some("n_copy")).unwrap();
    assert_eq!(copy.name(), "n_copy");
    assert_eq!(copy.width_formula(), "N");
    assert_eq!(copy.real_width().unwrap(), 8);
    assert_eq!(copy.assigned_signal().signal_type, SignalType::WriteData);
    assert_eq!(copy.parent_block().unwrap(), other);
}

#[test]
fn test_mirrored_clone() {
    let port = vector("data", 32, Direction::Out).with_signal(SignalType::ReadData);
    port.set_to_static(StaticValue::Gnd);
    let mirror = port.clone_port(true);
    assert_eq!(mirror.direction(), Direction::In);
    assert_eq!(mirror.real_width().unwrap(), 32);
    assert_eq!(mirror.assigned_signal(), port.assigned_signal());
    assert_eq!(mirror.static_value(), Some(StaticValue::Gnd));
    assert!(!mirror.has_parent_block());
    assert_ne!(mirror.id(), port.id());
    assert_eq!(port.clone_port(false).direction(), Direction::Out);
    assert_eq!(Direction::Bidir.mirror(), Direction::Bidir);
}

#[test]
fn test_groups_connect_by_role() {
    let top = Block::new("top", "top");
    let fetch = Block::new("fetch", "ifetch");
    top.add_sub_block(&fetch, None).unwrap();
    let factory = PortFactory::new(Some(12), Some(32));
    let outer = top
        .add_port_group(factory.instruction_line().unwrap())
        .unwrap();
    let inner = fetch
        .add_port_group(factory.instruction_line().unwrap())
        .unwrap();
    assert!(top.connect_groups(&outer, &inner).unwrap());
    for role in [
        SignalType::ReadRequestReady,
        SignalType::ReadRequest,
        SignalType::Address,
        SignalType::Fetchblock,
    ] {
        let a = outer.port_by(role).unwrap();
        let b = inner.port_by(role).unwrap();
        assert!(top.netlist().are_connected(&a, &b), "{role:?}");
    }
    // busy is active low on both sides
    let busy = outer.port_by(SignalType::ReadRequestReady).unwrap();
    assert!(!top.netlist().connections(&busy)[0].1.inverted());

    let small = PortGroup::new(SignalGroupType::InstructionLine);
    small.add_port(Port::in_bit("busy")).unwrap();
    assert!(!top.connect_groups(&outer, &small).unwrap());
}

#[test]
fn test_group_rejects_duplicate_role() {
    let group = PortGroup::memory_bus(SignalGroupType::BitmaskedSramPort, "data");
    group
        .add_port(vector("addr", 10, Direction::Out).with_signal(SignalType::Address))
        .unwrap();
    assert!(matches!(
        group.add_port(vector("addr2", 10, Direction::Out).with_signal(SignalType::Address)),
        Err(Error::AlreadyExists(_))
    ));
    group.add_port(Port::out_bit("x")).unwrap();
    group.add_port(Port::out_bit("y")).unwrap();
    assert_eq!(group.port_count(), 3);
    assert_eq!(group.address_space().as_deref(), Some("data"));
    assert!(matches!(
        group.port_by(SignalType::WriteData),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_static_tieoff() {
    let port = Port::in_bit("en");
    assert!(!port.has_static_value());
    port.set_to_static(StaticValue::Vcc);
    assert_eq!(port.static_value(), Some(StaticValue::Vcc));
    port.unset_static();
    assert_eq!(port.static_value(), None);
}

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(2, 2)]
#[case(7, 3)]
#[case(8, 4)]
#[case(1023, 10)]
fn test_required_bits(#[case] number: u64, #[case] bits: usize) {
    assert_eq!(required_bits(number), bits);
}

#[rstest]
#[case(0, 0)]
#[case(1, 0)]
#[case(2, 1)]
#[case(3, 2)]
#[case(1024, 10)]
#[case(65535, 16)]
fn test_ceil_log2(#[case] n: u64, #[case] log: usize) {
    assert_eq!(ceil_log2(n), log);
}
