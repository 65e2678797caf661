// SPDX-License-Identifier: Apache-2.0

//! Netlists of processor cores: blocks with typed ports, the connections
//! between them, a generator that assembles a core from an architecture
//! description and stored unit implementations, and writers that emit the
//! result as structural VHDL or Verilog.

mod block;
mod config;
mod diagnostics;
mod error;
pub mod generator;
mod io;
mod netlist;
mod parameter;
mod port;
mod port_group;
mod signal;
mod util;
mod writer;

pub use block::{Block, BlockCore, BlockId, BlockPhases};
pub use config::{GeneratorConfig, WriterOptions};
pub use diagnostics::{Diagnostic, DiagnosticSink, Severity};
pub use error::{Error, Result};
pub use generator::{
    AddressSpace, Architecture, ComponentDatabase, ComponentLibrary, ControlUnit, ExternalPort,
    FuArchitecture, FuEntry, FuImplementation, FuPort, FuPortImplementation, FunctionUnit,
    IcDecoderPlugin, ImplementationParameter, ImplementationSelection, NetlistGenerator,
    NullPlugin, Operation, PortFactory, RegisterFile, RfArchitecture, RfEntry, RfImplementation,
    RfPort, RfPortImplementation, UnitImplementation, UnitKind, UnitRef,
};
pub use io::{DataType, Direction};
pub use netlist::{Netlist, PortConnectionProperty};
pub use parameter::{PackageConstant, Parameter};
pub use port::{Port, PortId};
pub use port_group::{PortGroup, PortGroupKind};
pub use signal::{ActiveState, Signal, SignalGroupType, SignalType, StaticValue};
pub use util::{ceil_log2, required_bits};
pub use writer::{
    Assignment, Dialect, HdlDialect, Instance, NetlistWriter, RenderContext, StructuralPlan,
    Verilog, VerilogWriter, Vhdl, VhdlWriter,
};
