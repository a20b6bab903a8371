//! Named signal access for testbench code.

use std::fmt;
use std::rc::Rc;

use chipbench_common::LogicVec;

use crate::error::SimError;
use crate::kernel::Sim;
use crate::trigger::{EdgeKind, EdgeTrigger};
use crate::value::SignalId;

/// The device under test, as seen by a testbench: a set of named signals.
#[derive(Clone)]
pub struct Dut {
    sim: Sim,
    name: Rc<str>,
}

impl Dut {
    pub(crate) fn new(sim: Sim, name: impl Into<String>) -> Self {
        Self {
            sim,
            name: Rc::from(name.into()),
        }
    }

    /// The device's top-level name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The simulation this device lives in.
    pub fn sim(&self) -> &Sim {
        &self.sim
    }

    /// Looks up a signal by name.
    pub fn signal(&self, name: &str) -> Result<SignalHandle, SimError> {
        let id = self
            .sim
            .find_signal(name)
            .ok_or_else(|| SimError::UnknownSignal {
                name: name.to_string(),
            })?;
        let (name, width) = self.sim.signal_info(id);
        Ok(SignalHandle {
            sim: self.sim.clone(),
            id,
            name: Rc::from(name),
            width,
        })
    }
}

impl fmt::Debug for Dut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dut").field("name", &self.name).finish()
    }
}

/// A resolved reference to one signal of a [`Dut`].
#[derive(Clone)]
pub struct SignalHandle {
    sim: Sim,
    id: SignalId,
    name: Rc<str>,
    width: u32,
}

impl SignalHandle {
    /// The signal's kernel ID.
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// The signal's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current value.
    pub fn get(&self) -> LogicVec {
        self.sim.value(self.id)
    }

    /// Drives a new value. Must match the signal's width.
    pub fn set(&self, value: LogicVec) -> Result<(), SimError> {
        self.sim.write(self.id, value)
    }

    /// Drives an unsigned integer, truncated to the signal's width.
    pub fn set_u64(&self, value: u64) -> Result<(), SimError> {
        self.set(LogicVec::from_u64(value, self.width))
    }

    /// Drives every bit to the same level.
    pub fn set_bool(&self, level: bool) -> Result<(), SimError> {
        let value = if level {
            LogicVec::all_one(self.width)
        } else {
            LogicVec::all_zero(self.width)
        };
        self.set(value)
    }

    /// Drives every bit to `1`.
    pub fn set_all_ones(&self) -> Result<(), SimError> {
        self.set_bool(true)
    }

    /// Waits for `count` edges of the given kind.
    pub fn edge(&self, kind: EdgeKind, count: u32) -> EdgeTrigger {
        self.sim.edges(self.id, kind, count)
    }

    /// Waits for the next rising edge.
    pub fn rising_edge(&self) -> EdgeTrigger {
        self.edge(EdgeKind::Rising, 1)
    }

    /// Waits for the next falling edge.
    pub fn falling_edge(&self) -> EdgeTrigger {
        self.edge(EdgeKind::Falling, 1)
    }

    /// Waits for `cycles` rising edges.
    pub fn clock_cycles(&self, cycles: u32) -> EdgeTrigger {
        self.edge(EdgeKind::Rising, cycles)
    }
}

impl fmt::Debug for SignalHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalHandle")
            .field("name", &self.name)
            .field("width", &self.width)
            .finish()
    }
}
