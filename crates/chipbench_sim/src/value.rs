//! Signal identifiers, port declarations, and settled change records.
//!
//! Each signal on the device boundary has a flat [`SignalId`], a declared
//! width and direction, a current value, and the value it last settled at.
//! The difference between the two is what the kernel reports as a
//! [`SignalChange`] when it settles.

use chipbench_common::{Logic, LogicVec};
use serde::{Deserialize, Serialize};

/// Opaque ID for a signal in the kernel's signal table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignalId(u32);

impl SignalId {
    /// Creates a `SignalId` from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Direction of a port as seen from the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Driven by the testbench, read by the device.
    Input,
    /// Driven by the device, read by the testbench.
    Output,
    /// Bidirectional pad.
    InOut,
}

/// Declaration of one named pin or bus on the device boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortDecl {
    /// Port name, as used by testbench code.
    pub name: String,
    /// Width in bits.
    pub width: u32,
    /// Port direction.
    pub direction: PortDirection,
}

impl PortDecl {
    /// Declares an input port.
    pub fn input(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
            direction: PortDirection::Input,
        }
    }

    /// Declares an output port.
    pub fn output(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
            direction: PortDirection::Output,
        }
    }

    /// Declares a bidirectional port.
    pub fn inout(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
            direction: PortDirection::InOut,
        }
    }
}

/// Runtime state of one signal.
#[derive(Clone, Debug)]
pub(crate) struct SignalState {
    pub(crate) name: String,
    pub(crate) direction: PortDirection,
    /// Current value; task writes land here immediately.
    pub(crate) value: LogicVec,
    /// Value as of the last settle, used for edge detection.
    pub(crate) settled: LogicVec,
    /// Whether the signal is queued for the next settle.
    pub(crate) dirty: bool,
}

impl SignalState {
    /// Creates a signal that starts out all-`X`.
    pub(crate) fn new(decl: &PortDecl) -> Self {
        Self {
            name: decl.name.clone(),
            direction: decl.direction,
            value: LogicVec::all_x(decl.width),
            settled: LogicVec::all_x(decl.width),
            dirty: false,
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.value.width()
    }
}

/// A settled value change on one signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalChange {
    /// The signal that changed.
    pub signal: SignalId,
    /// Value before the change.
    pub previous: LogicVec,
    /// Value after the change.
    pub current: LogicVec,
}

impl SignalChange {
    /// Bit 0 went from anything other than `1` to `1`.
    pub fn is_rising(&self) -> bool {
        self.previous.lsb() != Logic::One && self.current.lsb() == Logic::One
    }

    /// Bit 0 went from anything other than `0` to `0`.
    pub fn is_falling(&self) -> bool {
        self.previous.lsb() != Logic::Zero && self.current.lsb() == Logic::Zero
    }
}
