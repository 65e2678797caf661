// SPDX-License-Identifier: Apache-2.0

use crate::util::parse_int;
use crate::{Block, Error, Port, Result};

impl Port {
    pub fn width_formula(&self) -> String {
        self.core.borrow().width_formula.clone()
    }

    pub fn set_width_formula(&self, formula: impl AsRef<str>) {
        self.core.borrow_mut().width_formula = formula.as_ref().to_string();
    }

    pub fn real_width_available(&self) -> bool {
        self.core.borrow().real_width.is_some()
    }

    /// Returns the known integer width of the port.
    pub fn real_width(&self) -> Result<usize> {
        self.core.borrow().real_width.ok_or_else(|| {
            Error::NotAvailable(format!("port {} has no actual bit width", self.name()))
        })
    }

    /// Returns the actual width, resolving it from the width formula when it
    /// is not yet known: first by looking the formula up as a parameter of
    /// the owning block's netlist, then by reading it as a literal. A
    /// successful resolution is stored as the port's actual width. Returns
    /// `None` when neither works.
    pub fn resolve_real_width(&self) -> Option<usize> {
        if let Some(width) = self.core.borrow().real_width {
            return Some(width);
        }
        let formula = self.width_formula();
        let from_parameter = self.parent_block().and_then(|parent| {
            let netlist = parent.netlist();
            netlist
                .parameter(&formula)
                .ok()
                .map(|param| parse_int(param.value()))
        });
        let width = from_parameter
            .unwrap_or_else(|| parse_int(&formula))
            .and_then(|w| usize::try_from(w).ok())?;
        self.core.borrow_mut().real_width = Some(width);
        Some(width)
    }

    /// Width if it is known or can be resolved.
    pub(crate) fn known_width(&self) -> Option<usize> {
        self.resolve_real_width()
    }

    /// Creates a copy of this port on `new_parent`, optionally under a new
    /// name. The copy carries the actual width when it is known or
    /// resolvable.
    pub fn copy_to(&self, new_parent: &Block, new_name: Option<&str>) -> Result<Port> {
        let name = new_name.map_or_else(|| self.name(), |n| n.to_string());
        let copy = match self.known_width() {
            Some(width) => Port::with_formula_and_width(
                &name,
                self.width_formula(),
                width as i64,
                self.data_type(),
                self.direction(),
            )?,
            None => Port::new(&name, self.width_formula(), self.data_type(), self.direction()),
        };
        copy.set_signal(self.assigned_signal());
        new_parent.add_port(copy)
    }
}
