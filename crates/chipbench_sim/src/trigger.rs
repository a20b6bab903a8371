//! Awaitable triggers: elapsed time and signal edges.
//!
//! A trigger registers itself with the kernel on its first poll and is
//! resolved when the kernel fires its [`WaitSlot`]. Resolution is recorded in
//! the slot rather than inferred from being polled, so a spurious wakeup
//! never completes a trigger early.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::kernel::Sim;
use crate::value::{SignalChange, SignalId};

/// Shared completion flag between a pending trigger and the kernel.
#[derive(Default)]
pub(crate) struct WaitSlot {
    fired: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

impl WaitSlot {
    pub(crate) fn fire(&self) {
        self.fired.set(true);
        if let Some(waker) = self.waker.borrow_mut().take() {
            waker.wake();
        }
    }

    fn is_fired(&self) -> bool {
        self.fired.get()
    }

    fn park(&self, waker: &Waker) {
        *self.waker.borrow_mut() = Some(waker.clone());
    }
}

fn poll_slot(slot: &WaitSlot, cx: &mut Context<'_>) -> Poll<()> {
    if slot.is_fired() {
        Poll::Ready(())
    } else {
        slot.park(cx.waker());
        Poll::Pending
    }
}

/// Which transitions of a signal an [`EdgeTrigger`] counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Any value change.
    Any,
    /// Bit 0 rising to `1`.
    Rising,
    /// Bit 0 falling to `0`.
    Falling,
}

impl EdgeKind {
    pub(crate) fn matches(self, change: &SignalChange) -> bool {
        match self {
            EdgeKind::Any => true,
            EdgeKind::Rising => change.is_rising(),
            EdgeKind::Falling => change.is_falling(),
        }
    }
}

/// Resolves after a fixed amount of simulated time.
///
/// A zero-length timer resolves at the current time without advancing it,
/// after everything already runnable has had its turn.
#[must_use = "triggers do nothing unless awaited"]
pub struct Timer {
    sim: Sim,
    duration_fs: u64,
    slot: Option<Rc<WaitSlot>>,
}

impl Timer {
    pub(crate) fn new(sim: Sim, duration_fs: u64) -> Self {
        Self {
            sim,
            duration_fs,
            slot: None,
        }
    }
}

impl Future for Timer {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if let Some(slot) = &this.slot {
            return poll_slot(slot, cx);
        }
        let slot = Rc::new(WaitSlot::default());
        slot.park(cx.waker());
        this.sim.schedule_timer(this.duration_fs, Rc::clone(&slot));
        this.slot = Some(slot);
        Poll::Pending
    }
}

/// Resolves after a signal has shown `count` matching edges.
///
/// `ClockCycles(clk, n)` is `EdgeTrigger` with [`EdgeKind::Rising`] and a
/// count of `n`. A count of zero resolves immediately without suspending.
#[must_use = "triggers do nothing unless awaited"]
pub struct EdgeTrigger {
    sim: Sim,
    signal: SignalId,
    kind: EdgeKind,
    count: u32,
    slot: Option<Rc<WaitSlot>>,
}

impl EdgeTrigger {
    pub(crate) fn new(sim: Sim, signal: SignalId, kind: EdgeKind, count: u32) -> Self {
        Self {
            sim,
            signal,
            kind,
            count,
            slot: None,
        }
    }
}

impl Future for EdgeTrigger {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.count == 0 {
            return Poll::Ready(());
        }
        if let Some(slot) = &this.slot {
            return poll_slot(slot, cx);
        }
        let slot = Rc::new(WaitSlot::default());
        slot.park(cx.waker());
        this.sim
            .register_edge(this.signal, this.kind, this.count, Rc::clone(&slot));
        this.slot = Some(slot);
        Poll::Pending
    }
}
