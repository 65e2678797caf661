// SPDX-License-Identifier: Apache-2.0

use progen::*;

const LSU_ENTRY: u32 = 1;
const RF_ENTRY: u32 = 2;
const IMM_ENTRY: u32 = 3;

fn architecture() -> Architecture {
    let gcu = ControlUnit::new("gcu")
        .with_port(FuPort::new("pc", 32, Direction::In).triggering())
        .with_return_address_port(FuPort::new("ra", 32, Direction::Bidir))
        .with_operation(Operation::new("jump").bind(1, "pc"))
        .with_operation(Operation::new("call").bind(1, "pc"))
        .with_address_space("instructions");
    let alu = FunctionUnit::new("ALU")
        .with_port(FuPort::new("in1t", 32, Direction::In).triggering())
        .with_port(FuPort::new("in2", 32, Direction::In))
        .with_port(FuPort::new("out1", 32, Direction::Out))
        .with_operation(Operation::new("add").bind(1, "in1t").bind(2, "in2").bind(3, "out1"))
        .with_operation(Operation::new("sub").bind(1, "in1t").bind(2, "in2").bind(3, "out1"));
    Architecture::new(gcu)
        .with_address_space(AddressSpace::new("instructions", 8, 0, 1023))
        .with_address_space(AddressSpace::new("data", 8, 0, 65535))
        .with_function_unit(alu)
        .with_function_unit(lsu_unit())
        .with_register_file(
            RegisterFile::new("RF", UnitKind::RegisterFile, 8, 32)
                .with_port(RfPort::write("W1"))
                .with_port(RfPort::read("R1")),
        )
        .with_register_file(
            RegisterFile::new("IMM", UnitKind::ImmediateUnit, 1, 32).with_port(RfPort::read("r")),
        )
        .with_register_file(
            RegisterFile::new("BOOL", UnitKind::RegisterFile, 2, 1)
                .with_port(RfPort::bidirectional("b"))
                .used_as_guard(),
        )
}

fn lsu_unit() -> FunctionUnit {
    FunctionUnit::new("LSU")
        .with_port(FuPort::new("addr", 32, Direction::In).triggering())
        .with_port(FuPort::new("data", 32, Direction::In))
        .with_port(FuPort::new("result", 32, Direction::Out))
        .with_operation(Operation::new("ldw").bind(1, "addr").bind(2, "result"))
        .with_operation(Operation::new("stw").bind(1, "addr").bind(2, "data"))
        .with_address_space("data")
}

fn library() -> ComponentLibrary {
    let mut lsu = FuImplementation::new("fu_lsu_impl");
    lsu.ports = vec![
        FuPortImplementation::new("t1data", "addr", "addrw").with_load_port("t1load"),
        FuPortImplementation::new("o1data", "data", "dataw").with_load_port("o1load"),
        FuPortImplementation::new("r1data", "result", "dataw"),
    ];
    lsu.opcode_port = "t1opcode".to_string();
    lsu.clk_port = "clk".to_string();
    lsu.rst_port = "rstx".to_string();
    lsu.glock_port = "glock".to_string();
    lsu.parameters = vec![
        ImplementationParameter::new("dataw", "integer", "32"),
        ImplementationParameter::new("addrw", "integer", ""),
    ];
    lsu.external_ports = vec![
        ExternalPort::new("dmem_addr_out", Direction::Out, "addrw").depends_on("addrw"),
        ExternalPort::new("dmem_data_in", Direction::In, "dataw").depends_on("dataw"),
        ExternalPort::new("dmem_data_out", Direction::Out, "dataw").depends_on("dataw"),
        ExternalPort::new("dmem_mem_en_x", Direction::Out, "1"),
    ];

    let mut rf = RfImplementation::new("rf_1wr_1rd");
    rf.ports = vec![
        RfPortImplementation::new("data_wr", Direction::In, "load_wr").with_opcode_port("addr_wr", "3"),
        RfPortImplementation::new("data_rd", Direction::Out, "load_rd").with_opcode_port("addr_rd", "3"),
    ];
    rf.size_parameter = "rf_size".to_string();
    rf.width_parameter = "dataw".to_string();
    rf.parameters = vec![
        ImplementationParameter::new("rf_size", "integer", ""),
        ImplementationParameter::new("dataw", "integer", ""),
    ];
    rf.guard_port = "guard".to_string();
    rf.glock_port = "glock".to_string();

    let mut imm = RfImplementation::new("imm_unit");
    imm.ports = vec![
        RfPortImplementation::new("data_in", Direction::In, "load_in"),
        RfPortImplementation::new("data_out", Direction::Out, "load_out"),
    ];

    let mut library = ComponentLibrary::new();
    library.add_fu_entry(FuEntry::new(
        LSU_ENTRY,
        FuArchitecture::new(lsu_unit()).with_parameterized_width("addr"),
        lsu,
    ));
    library.add_rf_entry(RfEntry::new(
        RF_ENTRY,
        RfArchitecture {
            size: 8,
            width: 32,
            guard_support: true,
        },
        rf,
    ));
    library.add_rf_entry(RfEntry::new(
        IMM_ENTRY,
        RfArchitecture {
            size: 1,
            width: 32,
            guard_support: false,
        },
        imm,
    ));
    library
}

fn selection() -> ImplementationSelection {
    ImplementationSelection::from_toml_str(
        r#"
generated_fus = ["ALU"]
generated_rfs = ["BOOL"]

[[fu_implementations]]
unit = "LSU"
entry_id = 1

[[rf_implementations]]
unit = "RF"
entry_id = 2

[[iu_implementations]]
unit = "IMM"
entry_id = 3
"#,
    )
    .unwrap()
}

/// Records the core block the generator hands over.
#[derive(Default)]
struct CorePeek {
    core: Option<String>,
    blocks: usize,
}

impl IcDecoderPlugin for CorePeek {
    fn complete_netlist(&mut self, top: &Block, generator: &NetlistGenerator<'_>) -> Result<()> {
        assert_eq!(generator.tta_core()?, *top);
        self.core = Some(top.instance_name());
        self.blocks = top.sub_block_count();
        Ok(())
    }
}

#[test]
fn test_generates_complete_core() {
    let _ = env_logger::builder().is_test(true).try_init();
    let selection = selection();
    let library = library();
    let mut generator =
        NetlistGenerator::new(GeneratorConfig::default(), architecture(), &selection, &library);
    let sink = DiagnosticSink::new();
    let mut plugin = CorePeek::default();
    let top = generator.generate(&mut plugin, &sink).unwrap();

    assert_eq!(plugin.core.as_deref(), Some("tta_core"));
    assert_eq!(plugin.blocks, 8);
    assert_eq!(top.module_name(), "toplevel");
    assert_eq!(top.instance_name(), "tta_core");
    assert_eq!(top.sub_block_count(), 8);
    assert_eq!(sink.warning_count(), 0);

    // instruction fetch
    let imem_addr = top.port("imem_addr", false).unwrap();
    assert_eq!(imem_addr.real_width().unwrap(), 10);
    let ifetch = generator.instruction_fetch().unwrap();
    assert!(top
        .netlist()
        .are_connected(&imem_addr, &ifetch.port("imem_addr", false).unwrap()));
    assert_eq!(generator.gcu_return_address_in_port().unwrap().name(), "ra_in");
    assert_eq!(
        generator
            .netlist_port(&UnitRef::ControlUnit, "pc", Direction::In)
            .unwrap()
            .name(),
        "pc_in"
    );
}

#[test]
fn test_stored_lsu_is_sized_by_its_address_space() {
    let selection = selection();
    let library = library();
    let mut generator =
        NetlistGenerator::new(GeneratorConfig::default(), architecture(), &selection, &library);
    let top = generator
        .generate(&mut NullPlugin, &DiagnosticSink::new())
        .unwrap();

    assert_eq!(top.netlist().parameter("fu_LSU_addrw").unwrap().value(), "16");
    assert_eq!(top.netlist().parameter("fu_LSU_dataw").unwrap().value(), "32");
    assert_eq!(
        generator
            .architecture()
            .function_unit("LSU")
            .unwrap()
            .port("addr")
            .unwrap()
            .width,
        16
    );

    let unit = UnitRef::FunctionUnit("LSU".to_string());
    let lsu = generator.netlist_block(&unit).unwrap();
    assert_eq!(lsu.instance_name(), "fu_LSU");
    assert_eq!(lsu.parameter("addrw").unwrap().value(), "fu_LSU_addrw");
    let addr = generator.netlist_port(&unit, "addr", Direction::In).unwrap();
    assert_eq!(addr.name(), "t1data");
    assert_eq!(addr.real_width().unwrap(), 16);
    assert_eq!(generator.load_port(&addr).unwrap().name(), "t1load");
    assert_eq!(
        generator.netlist_port(&unit, "result", Direction::Out).unwrap().name(),
        "r1data"
    );
    assert_eq!(generator.fu_opcode_port(&lsu).unwrap().real_width().unwrap(), 1);
    assert!(generator.has_glock_port(&lsu));
    assert!(!generator.has_glock_req_port(&lsu));
    assert_eq!(generator.fu_entry("LSU").unwrap().id, LSU_ENTRY);

    let lsu_clk = generator.clk_port(&lsu).unwrap();
    let top_clk = generator.clk_port(&top).unwrap();
    assert!(top.netlist().are_connected(&top_clk, &lsu_clk));

    let buses = top.port_groups_by(SignalGroupType::BitmaskedSramPort);
    assert_eq!(buses.len(), 1);
    assert_eq!(buses[0].address_space().as_deref(), Some("data"));
    assert_eq!(buses[0].port_count(), 4);
    let bus_addr = buses[0].port_by(SignalType::Address).unwrap();
    assert_eq!(bus_addr.name(), "fu_LSU_dmem_addr_out");
    assert_eq!(bus_addr.width_formula(), "fu_LSU_addrw");
    assert_eq!(bus_addr.resolve_real_width(), Some(16));
    let enable = buses[0].port_by(SignalType::ReadWriteRequest).unwrap();
    assert_eq!(enable.assigned_signal().active_state, ActiveState::Low);
    assert!(top.is_connected(&enable));
}

#[test]
fn test_generated_units_declare_their_interface() {
    let selection = selection();
    let library = library();
    let mut generator =
        NetlistGenerator::new(GeneratorConfig::default(), architecture(), &selection, &library);
    generator
        .generate(&mut NullPlugin, &DiagnosticSink::new())
        .unwrap();

    let alu_unit = UnitRef::FunctionUnit("ALU".to_string());
    let alu = generator.netlist_block(&alu_unit).unwrap();
    assert_eq!(alu.module_name(), "fu_alu_generated");
    assert_eq!(generator.fu_opcode_port(&alu).unwrap().name(), "operation_in");
    assert_eq!(generator.fu_opcode_port(&alu).unwrap().real_width().unwrap(), 1);
    let in2 = generator.netlist_port(&alu_unit, "in2", Direction::In).unwrap();
    assert_eq!(in2.name(), "data_in2_in");
    assert_eq!(generator.load_port(&in2).unwrap().name(), "load_in2_in");
    assert_eq!(
        generator.glock_req_port(&alu).unwrap().assigned_signal().signal_type,
        SignalType::GlobalLockRequest
    );

    let bool_unit = UnitRef::RegisterFile("BOOL".to_string());
    let bool_rf = generator.netlist_block(&bool_unit).unwrap();
    assert_eq!(bool_rf.instance_name(), "rf_bool");
    let b_in = generator.netlist_port(&bool_unit, "b", Direction::In).unwrap();
    let b_out = generator.netlist_port(&bool_unit, "b", Direction::Out).unwrap();
    assert_eq!((b_in.name().as_str(), b_out.name().as_str()), ("data_b_in", "data_b_out"));
    assert_eq!(
        generator.rf_opcode_port(&b_in).unwrap(),
        generator.rf_opcode_port(&b_out).unwrap()
    );
    assert_eq!(generator.rf_opcode_port(&b_in).unwrap().real_width().unwrap(), 1);
    let guard = generator.rf_guard_port(&bool_rf).unwrap();
    assert_eq!((guard.name().as_str(), guard.real_width().unwrap()), ("guard_out", 2));
}

#[test]
fn test_stored_register_files() {
    let selection = selection();
    let library = library();
    let mut generator =
        NetlistGenerator::new(GeneratorConfig::default(), architecture(), &selection, &library);
    generator
        .generate(&mut NullPlugin, &DiagnosticSink::new())
        .unwrap();

    let rf_unit = UnitRef::RegisterFile("RF".to_string());
    let rf = generator.netlist_block(&rf_unit).unwrap();
    assert_eq!(rf.instance_name(), "rf_RF");
    assert_eq!(rf.parameter("rf_size").unwrap().value(), "8");
    assert_eq!(rf.parameter("dataw").unwrap().value(), "32");
    let write = generator.netlist_port(&rf_unit, "W1", Direction::In).unwrap();
    assert_eq!(write.name(), "data_wr");
    assert_eq!(write.width_formula(), "dataw");
    let opcode = generator.rf_opcode_port(&write).unwrap();
    assert_eq!((opcode.name().as_str(), opcode.real_width().unwrap()), ("addr_wr", 3));
    assert_eq!(
        generator.netlist_port(&rf_unit, "R1", Direction::Out).unwrap().name(),
        "data_rd"
    );
    let guard = generator.rf_guard_port(&rf).unwrap();
    assert_eq!((guard.width_formula(), guard.real_width().unwrap()), ("rf_size".to_string(), 8));
    assert!(generator.rf_has_entry("RF"));

    let imm_unit = UnitRef::ImmediateUnit("IMM".to_string());
    assert_eq!(generator.netlist_block(&imm_unit).unwrap().instance_name(), "iu_IMM");
    assert_eq!(generator.immediate_unit_write_port("IMM").unwrap().name(), "data_in");
    assert_eq!(
        generator.netlist_port(&imm_unit, "r", Direction::Out).unwrap().name(),
        "data_out"
    );
}

#[test]
fn test_generated_core_renders() {
    let selection = selection();
    let library = library();
    let mut generator =
        NetlistGenerator::new(GeneratorConfig::default(), architecture(), &selection, &library);
    let top = generator
        .generate(&mut NullPlugin, &DiagnosticSink::new())
        .unwrap();

    let files = VhdlWriter::new(&top).render().unwrap();
    assert!(files["toplevel.vhdl"].contains("entity toplevel is"));
    assert!(files["toplevel.vhdl"].contains("use work.tta_globals.all;"));
    let package = files.values().next().unwrap();
    assert!(package.contains("constant fu_LSU_addrw : integer := 16;"));
    assert!(files.contains_key("fu_lsu_impl.vhdl"));

    let dir = tempfile::tempdir().unwrap();
    let written = VerilogWriter::new(&top).write(dir.path()).unwrap();
    assert_eq!(written.len(), files.len());
    assert!(dir.path().join("toplevel.v").exists());
}

#[test]
fn test_riscv_needs_four_maus_per_word() {
    let selection = selection();
    let library = library();
    let config = GeneratorConfig {
        riscv: true,
        ..GeneratorConfig::default()
    };
    let mut generator = NetlistGenerator::new(config, architecture(), &selection, &library);
    assert!(matches!(
        generator.generate(&mut NullPlugin, &DiagnosticSink::new()),
        Err(Error::InvalidData(_))
    ));
}

#[test]
fn test_unknown_entry_is_invalid() {
    let mut selection = selection();
    selection.fu_implementations[0].entry_id = 99;
    let library = library();
    let mut generator =
        NetlistGenerator::new(GeneratorConfig::default(), architecture(), &selection, &library);
    assert!(matches!(
        generator.generate(&mut NullPlugin, &DiagnosticSink::new()),
        Err(Error::InvalidData(_))
    ));
}

#[test]
fn test_regeneration_starts_from_scratch() {
    let selection = selection();
    let library = library();
    let mut generator =
        NetlistGenerator::new(GeneratorConfig::default(), architecture(), &selection, &library);
    let first = generator
        .generate(&mut NullPlugin, &DiagnosticSink::new())
        .unwrap();
    let second = generator
        .generate(&mut NullPlugin, &DiagnosticSink::new())
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(generator.tta_core().unwrap(), second);
    assert_eq!(second.sub_block_count(), 8);
}

#[test]
fn test_conflicting_operand_bindings_are_invalid() {
    // data is operand 2 of both operations, which the machine binds to
    // result and data respectively
    let stored = FunctionUnit::new("LSU")
        .with_port(FuPort::new("addr", 32, Direction::In).triggering())
        .with_port(FuPort::new("data", 32, Direction::In))
        .with_port(FuPort::new("result", 32, Direction::Out))
        .with_operation(Operation::new("ldw").bind(1, "addr").bind(2, "data"))
        .with_operation(Operation::new("stw").bind(1, "addr").bind(2, "data"));
    let mut library = library();
    let mut entry = library.fu_entry(LSU_ENTRY).unwrap();
    entry.architecture = Some(FuArchitecture::new(stored).with_parameterized_width("addr"));
    library.add_fu_entry(entry);

    let selection = selection();
    let mut generator =
        NetlistGenerator::new(GeneratorConfig::default(), architecture(), &selection, &library);
    let err = generator
        .generate(&mut NullPlugin, &DiagnosticSink::new())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidData(ref m) if m.contains("bound to both")));
}

#[test]
fn test_single_operation_unit_has_one_bit_opcode() {
    let mul = || {
        FunctionUnit::new("MUL")
            .with_port(FuPort::new("in1t", 32, Direction::In).triggering())
            .with_port(FuPort::new("in2", 32, Direction::In))
            .with_port(FuPort::new("out1", 32, Direction::Out))
            .with_operation(Operation::new("mul").bind(1, "in1t").bind(2, "in2").bind(3, "out1"))
    };
    let mut implementation = FuImplementation::new("fu_mul");
    implementation.ports = vec![
        FuPortImplementation::new("t1data", "in1t", "32").with_load_port("t1load"),
        FuPortImplementation::new("o1data", "in2", "32").with_load_port("o1load"),
        FuPortImplementation::new("r1data", "out1", "32"),
    ];
    implementation.opcode_port = "t1opcode".to_string();
    let mut library = library();
    library.add_fu_entry(FuEntry::new(4, FuArchitecture::new(mul()), implementation));
    let mut selection = selection();
    selection
        .fu_implementations
        .push(UnitImplementation::new("MUL", 4));

    let mut generator = NetlistGenerator::new(
        GeneratorConfig::default(),
        architecture().with_function_unit(mul()),
        &selection,
        &library,
    );
    generator
        .generate(&mut NullPlugin, &DiagnosticSink::new())
        .unwrap();
    let block = generator
        .netlist_block(&UnitRef::FunctionUnit("MUL".to_string()))
        .unwrap();
    let opcode = generator.fu_opcode_port(&block).unwrap();
    assert_eq!((opcode.name().as_str(), opcode.real_width().unwrap()), ("t1opcode", 1));
}
