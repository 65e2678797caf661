// SPDX-License-Identifier: Apache-2.0

//! Assembly of a processor core netlist from an abstract architecture and
//! the implementations chosen for its units.
//!
//! [`NetlistGenerator::generate`] builds the top block in stages: the
//! control unit with the fetch, decompressor and decoder blocks first, then
//! generated and stored function units, generated and stored register
//! files, immediate units, and finally the [`IcDecoderPlugin`] hook. While
//! building, the generator records which netlist port and block realizes
//! each architectural port and unit; the plugin and later passes query
//! these mappings through the accessor methods.

use std::hash::Hash;

use indexmap::IndexMap;

use crate::block::BlockId;
use crate::port::PortId;
use crate::{Block, DiagnosticSink, Direction, Error, GeneratorConfig, Port, Result};

mod database;
mod external;
mod fu;
mod gcu;
mod generatable;
mod lsu;
mod model;
mod opcode;
mod plugin;
mod port_factory;
mod rf;
mod selection;

pub use database::{
    ComponentDatabase, ComponentLibrary, ExternalPort, FuArchitecture, FuEntry, FuImplementation,
    FuPortImplementation, ImplementationParameter, RfArchitecture, RfEntry, RfImplementation,
    RfPortImplementation,
};
pub use lsu::{calculate_address_width, infer_lsu_signal, is_lsu, is_lsu_data_port};
pub use model::{
    AddressSpace, Architecture, ControlUnit, FuPort, FunctionUnit, Operation, RegisterFile,
    RfPort, UnitKind,
};
pub use opcode::{fu_opcode_port_width, gcu_opcode_port_width};
pub use plugin::{IcDecoderPlugin, NullPlugin};
pub use port_factory::PortFactory;
pub use selection::{ImplementationSelection, UnitImplementation};

/// An architectural unit, as a key of the generator's mappings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnitRef {
    ControlUnit,
    FunctionUnit(String),
    RegisterFile(String),
    ImmediateUnit(String),
}

impl UnitRef {
    pub(crate) fn for_register_file(kind: UnitKind, name: &str) -> UnitRef {
        match kind {
            UnitKind::RegisterFile => UnitRef::RegisterFile(name.to_string()),
            UnitKind::ImmediateUnit => UnitRef::ImmediateUnit(name.to_string()),
        }
    }
}

/// Everything recorded during one [`NetlistGenerator::generate`] run.
#[derive(Default)]
struct GenerationState {
    core: Option<Block>,
    instruction_fetch: Option<Block>,
    instruction_decompressor: Option<Block>,
    instruction_decoder: Option<Block>,
    ra_in_port: Option<Port>,
    ra_out_port: Option<Port>,
    factory: Option<PortFactory>,
    /// Architectural port to its netlist ports, at most one per direction.
    port_map: IndexMap<(UnitRef, String), Vec<Port>>,
    block_map: IndexMap<UnitRef, Block>,
    load_ports: IndexMap<PortId, Port>,
    rf_opcode_ports: IndexMap<PortId, Port>,
    fu_guard_ports: IndexMap<PortId, Port>,
    fu_opcode_ports: IndexMap<BlockId, Port>,
    rf_guard_ports: IndexMap<BlockId, Port>,
    clk_ports: IndexMap<BlockId, Port>,
    rst_ports: IndexMap<BlockId, Port>,
    glock_ports: IndexMap<BlockId, Port>,
    glock_req_ports: IndexMap<BlockId, Port>,
    iu_write_ports: IndexMap<String, Port>,
    fu_entries: IndexMap<String, FuEntry>,
    rf_entries: IndexMap<String, RfEntry>,
}

/// Builds the netlist of one processor core.
pub struct NetlistGenerator<'a> {
    config: GeneratorConfig,
    architecture: Architecture,
    selection: &'a ImplementationSelection,
    database: &'a dyn ComponentDatabase,
    state: GenerationState,
}

impl<'a> NetlistGenerator<'a> {
    pub fn new(
        config: GeneratorConfig,
        architecture: Architecture,
        selection: &'a ImplementationSelection,
        database: &'a dyn ComponentDatabase,
    ) -> Self {
        NetlistGenerator {
            config,
            architecture,
            selection,
            database,
            state: GenerationState::default(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The architecture as seen by the netlist: port widths resolved from
    /// address spaces during generation are reflected here.
    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    /// Builds the top block of the core. Any mappings of a previous run
    /// are discarded.
    pub fn generate(
        &mut self,
        plugin: &mut dyn IcDecoderPlugin,
        sink: &DiagnosticSink,
    ) -> Result<Block> {
        self.config.validate_imem_width()?;
        self.state = GenerationState::default();
        self.state.factory = Some(PortFactory::new(
            Some(self.instruction_memory_address_width()?),
            Some(self.instruction_memory_width()?),
        ));

        let top = Block::new(&self.config.toplevel_name, "tta_core");
        top.add_package(format!("{}_imem_mau", self.config.core_entity_name));
        top.add_package(format!("{}_globals", self.config.core_entity_name));
        self.state.core = Some(top.clone());

        log::info!("adding control unit to {}", top.module_name());
        self.add_gcu(&top)?;

        let selection = self.selection;
        for name in &selection.generated_fus {
            log::info!("adding generated FU {name}");
            self.add_generated_fu(name, &top)?;
        }
        for location in &selection.fu_implementations {
            log::info!("adding FU {} (entry {})", location.unit, location.entry_id);
            self.add_fu(location, &top, sink)?;
        }
        for name in &selection.generated_rfs {
            log::info!("adding generated RF {name}");
            self.add_generated_rf(name, &top)?;
        }
        for location in &selection.rf_implementations {
            log::info!("adding RF {} (entry {})", location.unit, location.entry_id);
            self.add_base_rf(location, UnitKind::RegisterFile, &top)?;
        }
        for location in &selection.iu_implementations {
            log::info!("adding IU {} (entry {})", location.unit, location.entry_id);
            self.add_base_rf(location, UnitKind::ImmediateUnit, &top)?;
        }

        log::info!("completing netlist of {}", top.module_name());
        plugin.complete_netlist(&top, self)?;
        Ok(top)
    }

    /// Bits needed to address the instruction memory: `required_bits(end)`.
    pub fn instruction_memory_address_width(&self) -> Result<usize> {
        let space = self.instruction_memory()?;
        Ok(crate::util::required_bits(space.end))
    }

    /// Width of one instruction memory word in bits.
    pub fn instruction_memory_width(&self) -> Result<usize> {
        let space = self.instruction_memory()?;
        Ok(space.width * self.config.imem_width_in_maus as usize)
    }

    fn instruction_memory(&self) -> Result<&AddressSpace> {
        self.architecture.instruction_memory().ok_or_else(|| {
            Error::InvalidData(format!(
                "control unit {} does not have an instruction memory address space",
                self.architecture.control_unit.name
            ))
        })
    }

    pub(crate) fn factory(&self) -> Result<&PortFactory> {
        self.state
            .factory
            .as_ref()
            .ok_or_else(|| Error::NotAvailable("port factory outside of generation".to_string()))
    }
}

/// Appends `_instance` to an instance name that equals its module name,
/// ignoring case.
pub(crate) fn check_instance_name(base: &str, module_name: &str) -> String {
    if base.eq_ignore_ascii_case(module_name) {
        format!("{base}_instance")
    } else {
        base.to_string()
    }
}

fn insert_unique<K: Hash + Eq>(
    map: &mut IndexMap<K, Port>,
    key: K,
    port: &Port,
    what: &str,
) -> Result<()> {
    if map.contains_key(&key) {
        return Err(Error::AlreadyExists(format!(
            "{} already mapped for {}",
            what,
            port.debug_string()
        )));
    }
    map.insert(key, port.clone());
    Ok(())
}

fn lookup<K: Hash + Eq>(map: &IndexMap<K, Port>, key: &K, what: impl FnOnce() -> String) -> Result<Port> {
    map.get(key)
        .cloned()
        .ok_or_else(|| Error::NotFound(what()))
}

// Mappings recorded while building.
impl NetlistGenerator<'_> {
    pub(crate) fn map_netlist_port(
        &mut self,
        unit: &UnitRef,
        adf_port: &str,
        port: &Port,
    ) -> Result<()> {
        let ports = self
            .state
            .port_map
            .entry((unit.clone(), adf_port.to_string()))
            .or_default();
        if ports.iter().any(|p| p.direction() == port.direction()) {
            return Err(Error::AlreadyExists(format!(
                "{adf_port} of {unit:?} is already mapped in direction {}",
                port.direction()
            )));
        }
        ports.push(port.clone());
        Ok(())
    }

    pub(crate) fn is_port_mapped(&self, unit: &UnitRef, adf_port: &str) -> bool {
        self.state
            .port_map
            .contains_key(&(unit.clone(), adf_port.to_string()))
    }

    pub(crate) fn map_netlist_block(&mut self, unit: UnitRef, block: &Block) -> Result<()> {
        if self.state.block_map.contains_key(&unit) {
            return Err(Error::AlreadyExists(format!("{unit:?} is already mapped to a block")));
        }
        self.state.block_map.insert(unit, block.clone());
        Ok(())
    }

    pub(crate) fn map_load_port(&mut self, port: &Port, load_port: &Port) -> Result<()> {
        insert_unique(&mut self.state.load_ports, port.id(), load_port, "load port")
    }

    pub(crate) fn map_rf_opcode_port(&mut self, port: &Port, opcode_port: &Port) -> Result<()> {
        insert_unique(&mut self.state.rf_opcode_ports, port.id(), opcode_port, "RF opcode port")
    }

    pub(crate) fn map_fu_guard_port(&mut self, port: &Port, guard_port: &Port) -> Result<()> {
        insert_unique(&mut self.state.fu_guard_ports, port.id(), guard_port, "FU guard port")
    }

    pub(crate) fn map_fu_opcode_port(&mut self, block: &Block, port: &Port) -> Result<()> {
        insert_unique(&mut self.state.fu_opcode_ports, block.id(), port, "FU opcode port")
    }

    pub(crate) fn map_rf_guard_port(&mut self, block: &Block, port: &Port) -> Result<()> {
        insert_unique(&mut self.state.rf_guard_ports, block.id(), port, "RF guard port")
    }

    pub(crate) fn map_clock_port(&mut self, block: &Block, port: &Port) -> Result<()> {
        insert_unique(&mut self.state.clk_ports, block.id(), port, "clock port")
    }

    pub(crate) fn map_reset_port(&mut self, block: &Block, port: &Port) -> Result<()> {
        insert_unique(&mut self.state.rst_ports, block.id(), port, "reset port")
    }

    pub(crate) fn map_global_lock_port(&mut self, block: &Block, port: &Port) -> Result<()> {
        insert_unique(&mut self.state.glock_ports, block.id(), port, "global lock port")
    }

    pub(crate) fn map_global_lock_request_port(&mut self, block: &Block, port: &Port) -> Result<()> {
        insert_unique(
            &mut self.state.glock_req_ports,
            block.id(),
            port,
            "global lock request port",
        )
    }

    pub(crate) fn map_immediate_unit_write_port(&mut self, unit: &str, port: &Port) {
        self.state.iu_write_ports.insert(unit.to_string(), port.clone());
    }
}

// Queries. Each one fails with `NotFound` if nothing was recorded.
impl NetlistGenerator<'_> {
    /// Netlist port realizing `adf_port` of `unit`. A port realized by
    /// an input and an output is resolved by `direction`.
    pub fn netlist_port(&self, unit: &UnitRef, adf_port: &str, direction: Direction) -> Result<Port> {
        let ports = self
            .state
            .port_map
            .get(&(unit.clone(), adf_port.to_string()))
            .ok_or_else(|| {
                Error::NotFound(format!("cannot find netlist port {adf_port} of unit {unit:?}"))
            })?;
        ports
            .iter()
            .find(|p| p.direction() == direction)
            .or_else(|| ports.first())
            .cloned()
            .ok_or_else(|| {
                Error::NotFound(format!("cannot find netlist port {adf_port} of unit {unit:?}"))
            })
    }

    pub fn netlist_block(&self, unit: &UnitRef) -> Result<Block> {
        self.state.block_map.get(unit).cloned().ok_or_else(|| {
            Error::NotFound(format!("cannot find corresponding netlist block for {unit:?}"))
        })
    }

    pub fn load_port(&self, port: &Port) -> Result<Port> {
        lookup(&self.state.load_ports, &port.id(), || {
            format!("cannot find load port of {}", port.debug_string())
        })
    }

    pub fn has_opcode_port(&self, port: &Port) -> bool {
        self.state.rf_opcode_ports.contains_key(&port.id())
    }

    pub fn rf_opcode_port(&self, port: &Port) -> Result<Port> {
        lookup(&self.state.rf_opcode_ports, &port.id(), || {
            format!("cannot find RF opcode port of {}", port.debug_string())
        })
    }

    pub fn rf_guard_port(&self, block: &Block) -> Result<Port> {
        lookup(&self.state.rf_guard_ports, &block.id(), || {
            format!("cannot find guard port in register file {}", block.instance_name())
        })
    }

    pub fn fu_opcode_port(&self, block: &Block) -> Result<Port> {
        lookup(&self.state.fu_opcode_ports, &block.id(), || {
            format!("cannot find opcode port in function unit {}", block.instance_name())
        })
    }

    pub fn fu_guard_port(&self, port: &Port) -> Result<Port> {
        lookup(&self.state.fu_guard_ports, &port.id(), || {
            format!("cannot find guard port of {}", port.debug_string())
        })
    }

    pub fn clk_port(&self, block: &Block) -> Result<Port> {
        lookup(&self.state.clk_ports, &block.id(), || {
            format!("cannot find clock port in block {}", block.instance_name())
        })
    }

    pub fn rst_port(&self, block: &Block) -> Result<Port> {
        lookup(&self.state.rst_ports, &block.id(), || {
            format!("cannot find reset port in block {}", block.instance_name())
        })
    }

    pub fn has_glock_port(&self, block: &Block) -> bool {
        self.state.glock_ports.contains_key(&block.id())
    }

    pub fn glock_port(&self, block: &Block) -> Result<Port> {
        lookup(&self.state.glock_ports, &block.id(), || {
            format!("cannot find global lock port in block {}", block.instance_name())
        })
    }

    pub fn has_glock_req_port(&self, block: &Block) -> bool {
        self.state.glock_req_ports.contains_key(&block.id())
    }

    pub fn glock_req_port(&self, block: &Block) -> Result<Port> {
        lookup(&self.state.glock_req_ports, &block.id(), || {
            format!(
                "cannot find global lock request port in block {}",
                block.instance_name()
            )
        })
    }

    /// Write port of an immediate unit, which has no architectural
    /// counterpart.
    pub fn immediate_unit_write_port(&self, unit: &str) -> Result<Port> {
        lookup(&self.state.iu_write_ports, &unit.to_string(), || {
            format!("cannot find immediate unit {unit} write port")
        })
    }

    pub fn gcu_return_address_in_port(&self) -> Result<Port> {
        self.state.ra_in_port.clone().ok_or_else(|| {
            Error::NotFound("cannot find return address in port of GCU".to_string())
        })
    }

    pub fn gcu_return_address_out_port(&self) -> Result<Port> {
        self.state.ra_out_port.clone().ok_or_else(|| {
            Error::NotFound("cannot find return address out port of GCU".to_string())
        })
    }

    pub fn tta_core(&self) -> Result<Block> {
        self.state
            .core
            .clone()
            .ok_or_else(|| Error::NotFound("cannot find core block".to_string()))
    }

    pub fn instruction_decoder(&self) -> Result<Block> {
        self.state
            .instruction_decoder
            .clone()
            .ok_or_else(|| Error::NotFound("cannot find instruction decoder block".to_string()))
    }

    pub fn instruction_fetch(&self) -> Result<Block> {
        self.state
            .instruction_fetch
            .clone()
            .ok_or_else(|| Error::NotFound("cannot find instruction fetch block".to_string()))
    }

    pub fn instruction_decompressor(&self) -> Result<Block> {
        self.state.instruction_decompressor.clone().ok_or_else(|| {
            Error::NotFound("cannot find instruction decompressor block".to_string())
        })
    }

    pub fn fu_entry(&self, unit: &str) -> Result<&FuEntry> {
        self.state
            .fu_entries
            .get(unit)
            .ok_or_else(|| Error::NotFound(format!("cannot find function unit entry of {unit}")))
    }

    pub fn rf_entry(&self, unit: &str) -> Result<&RfEntry> {
        self.state
            .rf_entries
            .get(unit)
            .ok_or_else(|| Error::NotFound(format!("cannot find register file entry of {unit}")))
    }

    pub fn rf_has_entry(&self, unit: &str) -> bool {
        self.state.rf_entries.contains_key(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_name_clash_is_suffixed() {
        assert_eq!(check_instance_name("fu_alu", "FU_ALU"), "fu_alu_instance");
        assert_eq!(check_instance_name("fu_alu", "alu_impl"), "fu_alu");
    }

    #[test]
    fn queries_before_generation_are_not_found() {
        let selection = ImplementationSelection::default();
        let library = ComponentLibrary::new();
        let generator = NetlistGenerator::new(
            GeneratorConfig::default(),
            Architecture::default(),
            &selection,
            &library,
        );
        assert!(matches!(generator.tta_core(), Err(Error::NotFound(_))));
        assert!(matches!(generator.instruction_fetch(), Err(Error::NotFound(_))));
        assert!(matches!(generator.gcu_return_address_in_port(), Err(Error::NotFound(_))));
        assert!(matches!(generator.fu_entry("alu"), Err(Error::NotFound(_))));
        assert!(!generator.rf_has_entry("rf"));
        assert!(matches!(
            generator.netlist_block(&UnitRef::ControlUnit),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn missing_instruction_memory_is_invalid() {
        let selection = ImplementationSelection::default();
        let library = ComponentLibrary::new();
        let mut generator = NetlistGenerator::new(
            GeneratorConfig::default(),
            Architecture::default(),
            &selection,
            &library,
        );
        let sink = DiagnosticSink::new();
        assert!(matches!(
            generator.generate(&mut NullPlugin, &sink),
            Err(Error::InvalidData(_))
        ));
    }
}
