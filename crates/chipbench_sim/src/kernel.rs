//! Simulation kernel: signal table, timer queue, settle loop, and executor.
//!
//! [`Sim`] is the handle testbench code holds. Internally it couples a
//! [`Kernel`] (time, signals, timers, edge waiters, the model) with a task
//! table and a ready queue. The kernel is never borrowed while a task is
//! being polled, which is what lets tasks read and write signals and
//! register triggers from inside `poll`.

use std::cell::RefCell;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::future::Future;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use chipbench_common::LogicVec;
use futures::FutureExt;

use crate::dut::Dut;
use crate::error::SimError;
use crate::model::{Model, ModelContext, PortBuilder};
use crate::task::{ReadyQueue, TaskHandle, TaskTable};
use crate::time::SimTime;
use crate::trigger::{EdgeKind, EdgeTrigger, Timer, WaitSlot};
use crate::value::{PortDecl, PortDirection, SignalChange, SignalId, SignalState};

/// Default maximum number of delta cycles per time step.
pub const DEFAULT_MAX_DELTAS: u32 = 10_000;

/// A timer scheduled in the event queue.
struct TimerEntry {
    deadline_fs: u64,
    /// Insertion order; timers due at the same instant fire FIFO.
    seq: u64,
    slot: Rc<WaitSlot>,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.deadline_fs, self.seq).cmp(&(other.deadline_fs, other.seq))
    }
}

/// A task waiting for `remaining` more edges of a signal.
struct EdgeWaiter {
    kind: EdgeKind,
    remaining: u32,
    slot: Rc<WaitSlot>,
}

/// What happened when the kernel tried to move time forward.
enum Advance {
    Fired,
    Exhausted,
}

/// Time, signals, timers, edge waiters, and the model.
pub(crate) struct Kernel {
    now: SimTime,
    signals: Vec<SignalState>,
    names: HashMap<String, SignalId>,
    dirty: Vec<SignalId>,
    /// Non-blocking model writes awaiting the next delta.
    pending: Vec<(SignalId, LogicVec)>,
    timers: BinaryHeap<Reverse<TimerEntry>>,
    next_seq: u64,
    edge_waiters: HashMap<SignalId, Vec<EdgeWaiter>>,
    model: Option<Box<dyn Model>>,
    transcript: Vec<String>,
    time_limit: Option<u64>,
    max_deltas: u32,
    total_deltas: u64,
    wall_budget: Option<(Instant, Duration)>,
}

impl Kernel {
    fn new() -> Self {
        Self {
            now: SimTime::zero(),
            signals: Vec::new(),
            names: HashMap::new(),
            dirty: Vec::new(),
            pending: Vec::new(),
            timers: BinaryHeap::new(),
            next_seq: 0,
            edge_waiters: HashMap::new(),
            model: None,
            transcript: Vec::new(),
            time_limit: None,
            max_deltas: DEFAULT_MAX_DELTAS,
            total_deltas: 0,
            wall_budget: None,
        }
    }

    /// Adds a signal to the table. Every signal starts out all-`X`.
    pub(crate) fn declare(&mut self, decl: &PortDecl) -> Result<SignalId, SimError> {
        if self.names.contains_key(&decl.name) {
            return Err(SimError::DuplicateSignal {
                name: decl.name.clone(),
            });
        }
        let id = SignalId::from_raw(self.signals.len() as u32);
        self.signals.push(SignalState::new(decl));
        self.names.insert(decl.name.clone(), id);
        Ok(id)
    }

    fn write(&mut self, id: SignalId, value: LogicVec) -> Result<(), SimError> {
        let state = &mut self.signals[id.index()];
        if state.width() != value.width() {
            return Err(SimError::WidthMismatch {
                signal: state.name.clone(),
                expected: state.width(),
                actual: value.width(),
            });
        }
        state.value = value;
        if !state.dirty {
            state.dirty = true;
            self.dirty.push(id);
        }
        Ok(())
    }

    fn bump_delta(&mut self) -> Result<(), SimError> {
        self.now = self.now.next_delta();
        self.total_deltas += 1;
        if self.now.delta > self.max_deltas {
            return Err(SimError::DeltaCycleLimit {
                fs: self.now.fs,
                max_deltas: self.max_deltas,
            });
        }
        Ok(())
    }

    fn check_wall_clock(&self) -> Result<(), SimError> {
        match self.wall_budget {
            Some((started, budget)) if started.elapsed() > budget => {
                Err(SimError::WallClockTimeout {
                    limit_ms: budget.as_millis() as u64,
                    time: self.now,
                })
            }
            _ => Ok(()),
        }
    }

    /// Settles dirty signals: records changes, evaluates the model, and
    /// fires edge waiters. Returns false if nothing actually changed.
    fn settle(&mut self) -> Result<bool, SimError> {
        if self.dirty.is_empty() {
            return Ok(false);
        }

        let mut changes = Vec::new();
        for id in std::mem::take(&mut self.dirty) {
            let state = &mut self.signals[id.index()];
            state.dirty = false;
            if state.value != state.settled {
                let previous = std::mem::replace(&mut state.settled, state.value.clone());
                changes.push(SignalChange {
                    signal: id,
                    previous,
                    current: state.value.clone(),
                });
            }
        }
        if changes.is_empty() {
            return Ok(false);
        }
        self.bump_delta()?;

        if let Some(mut model) = self.model.take() {
            let mut ctx = ModelContext {
                now: self.now,
                signals: &self.signals,
                changes: &changes,
                writes: &mut self.pending,
            };
            model.evaluate(&mut ctx);
            self.model = Some(model);
        }

        for change in &changes {
            let Some(waiters) = self.edge_waiters.get_mut(&change.signal) else {
                continue;
            };
            waiters.retain_mut(|waiter| {
                // Only the kernel holds the slot: the trigger was dropped.
                if Rc::strong_count(&waiter.slot) == 1 {
                    return false;
                }
                if !waiter.kind.matches(change) {
                    return true;
                }
                waiter.remaining -= 1;
                if waiter.remaining == 0 {
                    waiter.slot.fire();
                    return false;
                }
                true
            });
        }
        Ok(true)
    }

    /// Applies pending model writes as a new delta cycle.
    fn apply_pending(&mut self) -> Result<bool, SimError> {
        if self.pending.is_empty() {
            return Ok(false);
        }
        for (id, value) in std::mem::take(&mut self.pending) {
            self.write(id, value)?;
        }
        Ok(true)
    }

    /// Fires every timer due at the earliest pending deadline.
    fn advance(&mut self) -> Result<Advance, SimError> {
        let Some(Reverse(first)) = self.timers.pop() else {
            return Ok(Advance::Exhausted);
        };
        let deadline = first.deadline_fs;
        if let Some(limit) = self.time_limit {
            if deadline > limit {
                return Err(SimError::TimeLimitExceeded { limit_fs: limit });
            }
        }
        if deadline > self.now.fs {
            self.now = self.now.advance_to(deadline);
        } else {
            self.bump_delta()?;
        }

        first.slot.fire();
        while self
            .timers
            .peek()
            .is_some_and(|Reverse(next)| next.deadline_fs == deadline)
        {
            if let Some(Reverse(next)) = self.timers.pop() {
                next.slot.fire();
            }
        }
        Ok(Advance::Fired)
    }
}

struct SimInner {
    kernel: RefCell<Kernel>,
    tasks: RefCell<TaskTable>,
    ready: ReadyQueue,
}

/// Handle to a discrete-event simulation.
///
/// Clones share one kernel. `Sim` is deliberately `!Send`: all tasks run on
/// the thread that calls [`Sim::run`].
#[derive(Clone)]
pub struct Sim {
    inner: Rc<SimInner>,
}

impl Default for Sim {
    fn default() -> Self {
        Self::new()
    }
}

impl Sim {
    /// Creates an empty simulation with no signals and no model.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SimInner {
                kernel: RefCell::new(Kernel::new()),
                tasks: RefCell::new(TaskTable::default()),
                ready: ReadyQueue::default(),
            }),
        }
    }

    /// Creates a simulation whose signals are the ports of `model`.
    pub fn with_model(mut model: Box<dyn Model>) -> Result<Self, SimError> {
        let sim = Self::new();
        {
            let mut kernel = sim.inner.kernel.borrow_mut();
            let mut ports = PortBuilder {
                kernel: &mut *kernel,
            };
            model.elaborate(&mut ports)?;
            kernel.model = Some(model);
        }
        Ok(sim)
    }

    /// Declares a free-standing signal not owned by any model.
    pub fn add_signal(
        &self,
        name: impl Into<String>,
        width: u32,
        direction: PortDirection,
    ) -> Result<SignalId, SimError> {
        let decl = PortDecl {
            name: name.into(),
            width,
            direction,
        };
        self.inner.kernel.borrow_mut().declare(&decl)
    }

    /// Sets an upper bound on simulated time.
    pub fn set_time_limit(&self, limit_fs: u64) {
        self.inner.kernel.borrow_mut().time_limit = Some(limit_fs);
    }

    /// Limits how long the next [`Sim::run`] may take in real time. The
    /// budget is checked between scheduling steps, so a task that never
    /// yields is not interrupted.
    pub fn set_wall_timeout(&self, budget: Duration) {
        self.inner.kernel.borrow_mut().wall_budget = Some((Instant::now(), budget));
    }

    /// Sets the maximum number of delta cycles per time step.
    pub fn set_max_deltas(&self, max: u32) {
        self.inner.kernel.borrow_mut().max_deltas = max;
    }

    /// Returns the current simulation time.
    pub fn now(&self) -> SimTime {
        self.inner.kernel.borrow().now
    }

    /// Total delta cycles executed so far.
    pub fn total_deltas(&self) -> u64 {
        self.inner.kernel.borrow().total_deltas
    }

    /// Finds a signal by name.
    pub fn find_signal(&self, name: &str) -> Option<SignalId> {
        self.inner.kernel.borrow().names.get(name).copied()
    }

    /// Lists every declared signal in declaration order.
    pub fn ports(&self) -> Vec<PortDecl> {
        self.inner
            .kernel
            .borrow()
            .signals
            .iter()
            .map(|s| PortDecl {
                name: s.name.clone(),
                width: s.width(),
                direction: s.direction,
            })
            .collect()
    }

    /// Returns a signal's name and width.
    pub(crate) fn signal_info(&self, id: SignalId) -> (String, u32) {
        let kernel = self.inner.kernel.borrow();
        let state = &kernel.signals[id.index()];
        (state.name.clone(), state.width())
    }

    /// Returns the current value of a signal.
    pub fn value(&self, id: SignalId) -> LogicVec {
        self.inner.kernel.borrow().signals[id.index()].value.clone()
    }

    /// Writes a signal. The new value is visible to reads immediately;
    /// edges are reported when the kernel next settles.
    pub fn write(&self, id: SignalId, value: LogicVec) -> Result<(), SimError> {
        self.inner.kernel.borrow_mut().write(id, value)
    }

    /// Wraps this simulation as a device with named signals.
    pub fn dut(&self, name: impl Into<String>) -> Dut {
        Dut::new(self.clone(), name)
    }

    /// Returns a trigger that resolves after `duration_fs` of simulated time.
    pub fn timer(&self, duration_fs: u64) -> Timer {
        Timer::new(self.clone(), duration_fs)
    }

    /// Returns a trigger for `count` edges of `kind` on `signal`.
    pub fn edges(&self, signal: SignalId, kind: EdgeKind, count: u32) -> EdgeTrigger {
        EdgeTrigger::new(self.clone(), signal, kind, count)
    }

    /// Records a time-stamped line in the run transcript and logs it.
    pub fn note(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        let mut kernel = self.inner.kernel.borrow_mut();
        let now = kernel.now;
        tracing::info!(time = %now, "{message}");
        kernel.transcript.push(format!("[{now}] {message}"));
    }

    /// Returns all transcript lines recorded so far.
    pub fn transcript(&self) -> Vec<String> {
        self.inner.kernel.borrow().transcript.clone()
    }

    /// Starts a background task. It is first polled on the next pass of
    /// the run loop, so spawning never blocks the caller.
    pub fn spawn<F>(&self, future: F) -> TaskHandle
    where
        F: Future<Output = ()> + 'static,
    {
        self.inner
            .tasks
            .borrow_mut()
            .insert(future.boxed_local(), &self.inner.ready)
    }

    /// Runs `main` to completion and returns its output.
    ///
    /// Background tasks still alive when `main` finishes (a free-running
    /// clock, for instance) are dropped before this returns, as are any
    /// pending timers and edge waiters.
    pub fn run<F>(&self, main: F) -> Result<F::Output, SimError>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        let output = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&output);
        let handle = self.spawn(async move {
            let value = main.await;
            *slot.borrow_mut() = Some(value);
        });

        let result = self.drive(&handle);
        self.teardown();
        result?;

        let value = output.borrow_mut().take();
        value.ok_or(SimError::Stalled { time: self.now() })
    }

    fn drive(&self, main: &TaskHandle) -> Result<(), SimError> {
        loop {
            self.poll_ready(main);
            if main.is_finished() {
                return Ok(());
            }

            let mut kernel = self.inner.kernel.borrow_mut();
            kernel.check_wall_clock()?;
            if kernel.settle()? || kernel.apply_pending()? {
                continue;
            }
            match kernel.advance()? {
                Advance::Fired => {}
                Advance::Exhausted => {
                    return Err(SimError::Stalled { time: kernel.now });
                }
            }
        }
    }

    fn poll_ready(&self, main: &TaskHandle) {
        while let Some(id) = self.inner.ready.pop() {
            let Some((mut future, waker)) = self.inner.tasks.borrow_mut().checkout(id) else {
                continue;
            };
            let mut cx = Context::from_waker(&waker);
            match future.as_mut().poll(&mut cx) {
                Poll::Ready(()) => self.inner.tasks.borrow_mut().complete(id),
                Poll::Pending => self.inner.tasks.borrow_mut().restore(id, future),
            }
            if main.is_finished() {
                return;
            }
        }
    }

    fn teardown(&self) {
        let futures = self.inner.tasks.borrow_mut().drain();
        self.inner.ready.clear();
        let (timers, waiters) = {
            let mut kernel = self.inner.kernel.borrow_mut();
            (
                std::mem::take(&mut kernel.timers),
                std::mem::take(&mut kernel.edge_waiters),
            )
        };
        tracing::debug!(
            dropped_tasks = futures.len(),
            dropped_timers = timers.len(),
            "tearing down background tasks"
        );
        drop(futures);
        drop(timers);
        drop(waiters);
    }

    /// Number of tasks that have not finished.
    pub fn live_tasks(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    pub(crate) fn schedule_timer(&self, duration_fs: u64, slot: Rc<WaitSlot>) {
        let mut kernel = self.inner.kernel.borrow_mut();
        let deadline_fs = kernel.now.fs.saturating_add(duration_fs);
        let seq = kernel.next_seq;
        kernel.next_seq += 1;
        kernel.timers.push(Reverse(TimerEntry {
            deadline_fs,
            seq,
            slot,
        }));
    }

    pub(crate) fn register_edge(
        &self,
        signal: SignalId,
        kind: EdgeKind,
        count: u32,
        slot: Rc<WaitSlot>,
    ) {
        self.inner
            .kernel
            .borrow_mut()
            .edge_waiters
            .entry(signal)
            .or_default()
            .push(EdgeWaiter {
                kind,
                remaining: count,
                slot,
            });
    }
}
