// SPDX-License-Identifier: Apache-2.0

//! Structural HDL output.
//!
//! Both writers share one traversal ([`StructuralPlan::build`]) that decides,
//! for every port of every sub-block, whether it maps straight onto a port of
//! the block being written or goes through a wire, and which assignments
//! join the wires. The [`Dialect`] implementations only supply token syntax
//! and the file layout.

use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};

use crate::util::{is_number, parse_int};
use crate::{Block, DataType, Direction, Error, Parameter, Port, Result, StaticValue, WriterOptions};

mod plan;
mod verilog;
mod vhdl;

pub use plan::{Assignment, Instance, StructuralPlan};
pub use verilog::Verilog;
pub use vhdl::Vhdl;

pub(crate) const GROUND_SIGNAL: &str = "ground_signal";

/// Token syntax and file layout of one target language.
pub trait Dialect {
    /// Name of the file holding `module`.
    fn module_file_name(module: &str) -> String;

    /// Name of the file holding the netlist parameter package `package`.
    fn package_file_name(package: &str) -> String;

    fn direction_keyword(direction: Direction) -> &'static str;

    /// Selects one bit of a vector.
    fn bit_index(index: usize) -> String;

    /// A bit range `high` down to `low`. With `allow_short`, a one-bit
    /// range is written as a bit index.
    fn signal_range(high: i64, low: i64, allow_short: bool) -> Result<String>;

    /// Constant of the given shape; `Open` renders as [`Dialect::unconnected`].
    fn static_literal(value: StaticValue, shape: DataType) -> String;

    /// Actual of a port-map entry that is left unconnected.
    fn unconnected() -> &'static str;

    fn negate(expression: &str) -> String;

    /// Whether a port map may select a bit of the formal port.
    fn indexes_formal_ports() -> bool;

    /// Value of a generic in an instance's generic map.
    fn generic_value(parameter: &Parameter) -> Result<String>;

    fn render_package(top: &Block, package: &str, ctx: &RenderContext) -> Result<String>;

    /// Full structural description of a block with sub-blocks.
    fn render_structure(block: &Block, plan: &StructuralPlan, ctx: &RenderContext) -> Result<String>;

    /// Interface-only description of a leaf block.
    fn render_interface(block: &Block, ctx: &RenderContext) -> Result<String>;
}

/// Settings shared by every file of one conversion.
pub struct RenderContext<'a> {
    /// Name of the netlist parameter package of the top block.
    pub params_package: &'a str,
    pub options: &'a WriterOptions,
}

impl RenderContext<'_> {
    pub fn indent(&self, level: usize) -> String {
        self.options.indentation.repeat(level)
    }
}

/// Output language selectable at run time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HdlDialect {
    Vhdl,
    Verilog,
}

impl FromStr for HdlDialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "vhdl" => Ok(HdlDialect::Vhdl),
            "verilog" => Ok(HdlDialect::Verilog),
            other => Err(Error::NotAvailable(format!("no writer for HDL {other}"))),
        }
    }
}

impl fmt::Display for HdlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HdlDialect::Vhdl => write!(f, "vhdl"),
            HdlDialect::Verilog => write!(f, "verilog"),
        }
    }
}

/// Converts a block tree into structural source files of dialect `D`.
pub struct NetlistWriter<'a, D: Dialect> {
    top: &'a Block,
    options: WriterOptions,
    emit_leaf_modules: bool,
    dialect: PhantomData<D>,
}

pub type VhdlWriter<'a> = NetlistWriter<'a, Vhdl>;
pub type VerilogWriter<'a> = NetlistWriter<'a, Verilog>;

impl<'a, D: Dialect> NetlistWriter<'a, D> {
    pub fn new(top: &'a Block) -> Self {
        NetlistWriter {
            top,
            options: WriterOptions::default(),
            emit_leaf_modules: true,
            dialect: PhantomData,
        }
    }

    pub fn with_options(mut self, options: WriterOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether blocks without sub-blocks get an interface-only file.
    pub fn emit_leaf_modules(mut self, emit: bool) -> Self {
        self.emit_leaf_modules = emit;
        self
    }

    /// Name of the package holding the netlist parameters.
    pub fn params_package(&self) -> String {
        format!("{}_params", self.top.module_name())
    }

    /// Renders every file of the conversion, keyed by file name, in the
    /// order they would be written.
    pub fn render(&self) -> Result<IndexMap<String, String>> {
        if self.top.netlist().is_empty() {
            return Err(Error::InvalidData(format!(
                "empty netlist in block {}",
                self.top.instance_name()
            )));
        }
        let package = self.params_package();
        let ctx = RenderContext {
            params_package: &package,
            options: &self.options,
        };
        let mut files = IndexMap::new();
        files.insert(
            D::package_file_name(&package),
            D::render_package(self.top, &package, &ctx)?,
        );
        let mut seen = IndexSet::new();
        self.render_block(self.top, &ctx, &mut seen, &mut files)?;
        Ok(files)
    }

    fn render_block(
        &self,
        block: &Block,
        ctx: &RenderContext,
        seen: &mut IndexSet<String>,
        files: &mut IndexMap<String, String>,
    ) -> Result<()> {
        if !seen.insert(block.module_name()) {
            return Ok(());
        }
        let file_name = D::module_file_name(&block.module_name());
        if block.sub_block_count() > 0 {
            let plan = StructuralPlan::build::<D>(block)?;
            files.insert(file_name, D::render_structure(block, &plan, ctx)?);
            for sub_block in block.sub_blocks() {
                if !sub_block.is_virtual() {
                    self.render_block(&sub_block, ctx, seen, files)?;
                }
            }
        } else if self.emit_leaf_modules || block == self.top {
            files.insert(file_name, D::render_interface(block, ctx)?);
        }
        Ok(())
    }

    /// Writes every rendered file into `dir`, creating it if needed, and
    /// returns the paths written.
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let files = self.render()?;
        std::fs::create_dir_all(dir).map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut written = Vec::with_capacity(files.len());
        for (name, text) in files {
            let path = dir.join(name);
            std::fs::write(&path, text).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            log::info!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Name of the wire standing in for a sub-block port.
pub(crate) fn wire_name(port: &Port) -> String {
    let instance = port
        .parent_block()
        .map(|b| b.instance_name())
        .unwrap_or_default();
    format!("{}_{}_wire", instance, port.name())
}

/// Upper bound of a vector port as declared in an entity, module or
/// component: the literal width minus one, or the formula minus one.
pub(crate) fn declared_high(port: &Port) -> String {
    let formula = port.width_formula();
    match parse_int(&formula) {
        Some(width) if is_number(&formula) => (width - 1).max(0).to_string(),
        _ => format!("{formula}-1"),
    }
}

/// Upper bound of the wire replacing `port`. A formula naming a parameter
/// of the port's block is replaced by that parameter's value.
pub(crate) fn wire_high(port: &Port) -> String {
    if let Ok(width) = port.real_width() {
        return width.saturating_sub(1).to_string();
    }
    let formula = port.width_formula();
    if is_number(&formula) {
        return declared_high(port);
    }
    if let Some(parameter) = port
        .parent_block()
        .and_then(|b| b.parameter(&formula).ok())
    {
        return format!("{}-1", parameter.value());
    }
    format!("{formula}-1")
}

/// Quotes a string generic value containing `.` or `__` unless it already
/// is a quoted literal.
pub(crate) fn quoted_generic(value: &str) -> String {
    let already_quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    if !already_quoted && (value.contains('.') || value.contains("__")) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Default value of a string generic as a quoted literal.
pub(crate) fn quoted_default(value: &str) -> String {
    let mut text = String::new();
    if !value.starts_with('"') {
        text.push('"');
    }
    text.push_str(value);
    if !value.ends_with('"') {
        text.push('"');
    }
    text
}

pub(crate) fn check_range(high: i64, low: i64) -> Result<()> {
    if high < low {
        return Err(Error::InvalidData(format!(
            "high ({high}) boundary is smaller than low ({low}) boundary"
        )));
    }
    Ok(())
}
