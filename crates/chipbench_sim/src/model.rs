//! The device behavior behind the signal table.
//!
//! A [`Model`] stands in for the compiled design an external simulator would
//! load. It declares its ports once during elaboration, and afterwards is
//! evaluated every time the kernel settles a batch of signal changes. Model
//! writes are non-blocking: they are applied one delta cycle later, so any
//! testbench task woken by the same edge still reads the pre-edge values.

use chipbench_common::LogicVec;

use crate::error::SimError;
use crate::kernel::Kernel;
use crate::time::SimTime;
use crate::value::{PortDecl, SignalChange, SignalId, SignalState};

/// Behavioral description of a device under test.
pub trait Model {
    /// Declares the model's ports, keeping the returned IDs for evaluation.
    fn elaborate(&mut self, ports: &mut PortBuilder<'_>) -> Result<(), SimError>;

    /// Reacts to a settled batch of signal changes.
    fn evaluate(&mut self, ctx: &mut ModelContext<'_>);
}

/// Declares ports on behalf of a model during elaboration.
pub struct PortBuilder<'a> {
    pub(crate) kernel: &'a mut Kernel,
}

impl PortBuilder<'_> {
    /// Declares a port and returns its signal ID.
    pub fn declare(&mut self, decl: PortDecl) -> Result<SignalId, SimError> {
        self.kernel.declare(&decl)
    }
}

/// View of the kernel handed to [`Model::evaluate`].
pub struct ModelContext<'a> {
    pub(crate) now: SimTime,
    pub(crate) signals: &'a [SignalState],
    pub(crate) changes: &'a [SignalChange],
    pub(crate) writes: &'a mut Vec<(SignalId, LogicVec)>,
}

impl ModelContext<'_> {
    /// Current simulation time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Every change in the batch being settled.
    pub fn changes(&self) -> &[SignalChange] {
        self.changes
    }

    /// The change recorded for `id` in this batch, if any.
    pub fn changed(&self, id: SignalId) -> Option<&SignalChange> {
        self.changes.iter().find(|c| c.signal == id)
    }

    /// True if `id` saw a rising edge in this batch.
    pub fn rose(&self, id: SignalId) -> bool {
        self.changed(id).is_some_and(SignalChange::is_rising)
    }

    /// Settled value of a signal.
    pub fn value(&self, id: SignalId) -> &LogicVec {
        &self.signals[id.index()].value
    }

    /// Schedules a non-blocking write, applied at the next delta cycle.
    pub fn drive(&mut self, id: SignalId, value: LogicVec) {
        self.writes.push((id, value));
    }
}
