// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::block::BlockCore;
use crate::{Block, DataType, Direction, Error, Result, Signal, StaticValue};

mod tieoff;
mod width;

static NEXT_PORT_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of a port, stable for the port's whole lifetime and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(usize);

impl PortId {
    fn next() -> PortId {
        PortId(NEXT_PORT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Data behind a [`Port`] handle. Not intended to be used directly.
pub struct PortCore {
    pub(crate) id: PortId,
    pub(crate) name: String,
    pub(crate) width_formula: String,
    pub(crate) real_width: Option<usize>,
    pub(crate) data_type: DataType,
    pub(crate) direction: Direction,
    pub(crate) signal: Signal,
    pub(crate) static_value: Option<StaticValue>,
    pub(crate) parent: Option<Weak<RefCell<BlockCore>>>,
}

/// A named, directional terminal of a block.
///
/// `Port` is a shared handle: cloning it yields another handle to the same
/// port. Two handles compare equal only if they refer to the same port.
#[derive(Clone)]
pub struct Port {
    pub(crate) core: Rc<RefCell<PortCore>>,
}

impl Port {
    fn from_parts(
        name: &str,
        width_formula: String,
        real_width: Option<usize>,
        data_type: DataType,
        direction: Direction,
    ) -> Port {
        Port {
            core: Rc::new(RefCell::new(PortCore {
                id: PortId::next(),
                name: name.to_string(),
                width_formula,
                real_width,
                data_type,
                direction,
                signal: Signal::default(),
                static_value: None,
                parent: None,
            })),
        }
    }

    /// Creates an unattached port whose width is known only symbolically.
    pub fn new(
        name: impl AsRef<str>,
        width_formula: impl AsRef<str>,
        data_type: DataType,
        direction: Direction,
    ) -> Port {
        Port::from_parts(
            name.as_ref(),
            width_formula.as_ref().to_string(),
            None,
            data_type,
            direction,
        )
    }

    /// Creates an unattached port of a known width. The width formula is the
    /// width written out in decimal.
    pub fn with_width(
        name: impl AsRef<str>,
        width: i64,
        data_type: DataType,
        direction: Direction,
    ) -> Result<Port> {
        Port::with_formula_and_width(name.as_ref(), width.to_string(), width, data_type, direction)
    }

    /// Creates an unattached port carrying both a symbolic formula and its
    /// known value. A width of zero is legal; a negative width is not.
    pub fn with_formula_and_width(
        name: impl AsRef<str>,
        width_formula: impl AsRef<str>,
        width: i64,
        data_type: DataType,
        direction: Direction,
    ) -> Result<Port> {
        let real_width = usize::try_from(width).map_err(|_| {
            Error::OutOfRange(format!("port {} has a negative width", name.as_ref()))
        })?;
        Ok(Port::from_parts(
            name.as_ref(),
            width_formula.as_ref().to_string(),
            Some(real_width),
            data_type,
            direction,
        ))
    }

    /// One-bit input port of data type `Bit`.
    pub fn in_bit(name: impl AsRef<str>) -> Port {
        Port::from_parts(name.as_ref(), "1".to_string(), Some(1), DataType::Bit, Direction::In)
    }

    /// One-bit output port of data type `Bit`.
    pub fn out_bit(name: impl AsRef<str>) -> Port {
        Port::from_parts(name.as_ref(), "1".to_string(), Some(1), DataType::Bit, Direction::Out)
    }

    /// Assigns a signal role and returns the same port.
    pub fn with_signal(self, signal: impl Into<Signal>) -> Port {
        self.core.borrow_mut().signal = signal.into();
        self
    }

    pub fn id(&self) -> PortId {
        self.core.borrow().id
    }

    pub fn name(&self) -> String {
        self.core.borrow().name.clone()
    }

    /// Renames the port. Fails if the owning block already has another port
    /// with the new name.
    pub fn rename(&self, new_name: impl AsRef<str>) -> Result<()> {
        let new_name = new_name.as_ref();
        if let Some(parent) = self.parent_block() {
            if let Some(existing) = parent.find_port(new_name) {
                if existing != *self {
                    return Err(Error::AlreadyExists(format!(
                        "port {} cannot be renamed to {}: name taken in block {}",
                        self.name(),
                        new_name,
                        parent.instance_name()
                    )));
                }
            }
        }
        self.core.borrow_mut().name = new_name.to_string();
        Ok(())
    }

    pub fn data_type(&self) -> DataType {
        self.core.borrow().data_type
    }

    pub fn direction(&self) -> Direction {
        self.core.borrow().direction
    }

    pub fn set_direction(&self, direction: Direction) {
        self.core.borrow_mut().direction = direction;
    }

    pub fn assigned_signal(&self) -> Signal {
        self.core.borrow().signal
    }

    pub fn set_signal(&self, signal: impl Into<Signal>) {
        self.core.borrow_mut().signal = signal.into();
    }

    pub fn has_parent_block(&self) -> bool {
        self.parent_block().is_some()
    }

    /// Returns the block this port is attached to, if any.
    pub fn parent_block(&self) -> Option<Block> {
        self.core
            .borrow()
            .parent
            .as_ref()
            .and_then(|weak| weak.upgrade())
            .map(|core| Block { core })
    }

    pub(crate) fn set_parent(&self, parent: Option<&Block>) {
        self.core.borrow_mut().parent = parent.map(|b| Rc::downgrade(&b.core));
    }

    /// Returns an unattached duplicate of this port. With `as_mirrored` the
    /// direction of the duplicate is reversed.
    pub fn clone_port(&self, as_mirrored: bool) -> Port {
        let core = self.core.borrow();
        let copy = Port::from_parts(
            &core.name,
            core.width_formula.clone(),
            core.real_width,
            core.data_type,
            if as_mirrored {
                core.direction.mirror()
            } else {
                core.direction
            },
        );
        {
            let mut copy_core = copy.core.borrow_mut();
            copy_core.signal = core.signal;
            copy_core.static_value = core.static_value;
        }
        copy
    }

    /// Returns a human-readable `instance.port` path for messages.
    pub fn debug_string(&self) -> String {
        match self.parent_block() {
            Some(parent) => format!("{}.{}", parent.instance_name(), self.name()),
            None => self.name(),
        }
    }
}

impl PartialEq for Port {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl Eq for Port {}

impl Hash for Port {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("Port")
            .field("name", &core.name)
            .field("width_formula", &core.width_formula)
            .field("real_width", &core.real_width)
            .field("data_type", &core.data_type)
            .field("direction", &core.direction)
            .field("signal", &core.signal)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActiveState, SignalType};

    #[test]
    fn mirrored_clone_flips_direction_only() {
        let p = Port::with_width("data", 32, DataType::BitVector, Direction::In)
            .unwrap()
            .with_signal(SignalType::ReadData);
        let m = p.clone_port(true);
        assert_eq!(m.name(), "data");
        assert_eq!(m.direction(), Direction::Out);
        assert_eq!(m.width_formula(), "32");
        assert_eq!(m.real_width().unwrap(), 32);
        assert_eq!(m.assigned_signal().signal_type, SignalType::ReadData);
        assert!(m != p);
        assert!(!m.has_parent_block());
    }

    #[test]
    fn negative_width_is_rejected() {
        let err = Port::with_width("x", -1, DataType::BitVector, Direction::In).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
    }

    #[test]
    fn zero_width_vector_is_legal() {
        let p = Port::with_width("opcode", 0, DataType::BitVector, Direction::In).unwrap();
        assert_eq!(p.real_width().unwrap(), 0);
    }

    #[test]
    fn bit_port_helpers() {
        let p = Port::in_bit("rstx").with_signal(Signal::active_low(SignalType::Reset));
        assert_eq!(p.data_type(), DataType::Bit);
        assert_eq!(p.width_formula(), "1");
        assert_eq!(p.assigned_signal().active_state, ActiveState::Low);
        assert_eq!(Port::out_bit("q").direction(), Direction::Out);
    }
}
