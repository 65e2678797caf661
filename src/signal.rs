// SPDX-License-Identifier: Apache-2.0

//! Closed vocabularies used to match ports and port groups automatically.

/// Polarity of a signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActiveState {
    #[default]
    High,
    Low,
}

/// Role of a single port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignalType {
    #[default]
    Undefined,
    /// Placeholder used in role maps for a role that is left unconnected.
    Open,
    Opcode,
    WriteMode,
    Clock,
    Reset,
    Address,
    Fetchblock,
    ReadData,
    WriteData,
    ReadRequest,
    ReadRequestReady,
    WriteRequest,
    WriteRequestReady,
    ReadWriteRequest,
    WriteBitmask,
    CoreHaltStatus,
    GlobalLock,
    GlobalLockRequest,
}

/// Protocol implemented by a port group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SignalGroupType {
    #[default]
    Undefined,
    InstructionLine,
    BitmaskedSramPort,
    BytemaskedSramPort,
}

/// A port role together with its polarity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Signal {
    pub signal_type: SignalType,
    pub active_state: ActiveState,
}

impl Signal {
    pub fn new(signal_type: SignalType, active_state: ActiveState) -> Self {
        Signal {
            signal_type,
            active_state,
        }
    }

    pub fn active_low(signal_type: SignalType) -> Self {
        Signal::new(signal_type, ActiveState::Low)
    }
}

impl From<SignalType> for Signal {
    fn from(signal_type: SignalType) -> Self {
        Signal::new(signal_type, ActiveState::High)
    }
}

/// Constant value tied to a port in place of a wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StaticValue {
    /// Logic 0 on every bit.
    Gnd,
    /// Logic 1 on every bit.
    Vcc,
    /// Deliberately left unconnected.
    Open,
}
