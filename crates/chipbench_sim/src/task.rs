//! Task table, ready queue, and wakers for the cooperative executor.
//!
//! Tasks are boxed `!Send` futures. A task is only ever polled from the run
//! loop; while it is being polled its future is taken out of the table, so
//! the task may freely spawn further tasks or touch the kernel.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::task::Waker;

use futures::future::LocalBoxFuture;
use futures::task::{waker, ArcWake};

/// Identifier of a spawned task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Returns the raw task number.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// Handle to a spawned task.
///
/// Dropping the handle does not stop the task; background tasks live until
/// they finish or until the run that owns them returns.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    id: TaskId,
    finished: Rc<Cell<bool>>,
}

impl TaskHandle {
    /// The task's identifier.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// True once the task's future has completed.
    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }
}

/// FIFO of tasks that have been woken and are waiting to be polled.
#[derive(Clone, Default)]
pub(crate) struct ReadyQueue(Arc<Mutex<VecDeque<TaskId>>>);

impl ReadyQueue {
    pub(crate) fn push(&self, id: TaskId) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push_back(id);
        }
    }

    pub(crate) fn pop(&self) -> Option<TaskId> {
        self.0.lock().ok().and_then(|mut queue| queue.pop_front())
    }

    pub(crate) fn clear(&self) {
        if let Ok(mut queue) = self.0.lock() {
            queue.clear();
        }
    }
}

struct TaskWaker {
    id: TaskId,
    ready: ReadyQueue,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.ready.push(arc_self.id);
    }
}

struct TaskEntry {
    /// `None` while the task is being polled.
    future: Option<LocalBoxFuture<'static, ()>>,
    waker: Waker,
    finished: Rc<Cell<bool>>,
}

/// All live tasks, keyed by ID.
#[derive(Default)]
pub(crate) struct TaskTable {
    tasks: HashMap<TaskId, TaskEntry>,
    next_id: u64,
}

impl TaskTable {
    /// Inserts a new task and queues it for its first poll.
    pub(crate) fn insert(
        &mut self,
        future: LocalBoxFuture<'static, ()>,
        ready: &ReadyQueue,
    ) -> TaskHandle {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let finished = Rc::new(Cell::new(false));
        let task_waker = waker(Arc::new(TaskWaker {
            id,
            ready: ready.clone(),
        }));
        self.tasks.insert(
            id,
            TaskEntry {
                future: Some(future),
                waker: task_waker,
                finished: Rc::clone(&finished),
            },
        );
        ready.push(id);
        TaskHandle { id, finished }
    }

    /// Takes a task's future out for polling, along with its waker.
    ///
    /// Returns `None` for finished tasks and for stale wakeups.
    pub(crate) fn checkout(&mut self, id: TaskId) -> Option<(LocalBoxFuture<'static, ()>, Waker)> {
        let entry = self.tasks.get_mut(&id)?;
        let future = entry.future.take()?;
        Some((future, entry.waker.clone()))
    }

    /// Puts a still-pending future back.
    pub(crate) fn restore(&mut self, id: TaskId, future: LocalBoxFuture<'static, ()>) {
        if let Some(entry) = self.tasks.get_mut(&id) {
            entry.future = Some(future);
        }
    }

    /// Marks a task finished and drops it.
    pub(crate) fn complete(&mut self, id: TaskId) {
        if let Some(entry) = self.tasks.remove(&id) {
            entry.finished.set(true);
        }
    }

    /// Number of live tasks.
    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Removes every task, returning the futures so the caller can drop
    /// them outside any borrow of the table.
    pub(crate) fn drain(&mut self) -> Vec<LocalBoxFuture<'static, ()>> {
        self.tasks
            .drain()
            .filter_map(|(_, entry)| entry.future)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[test]
    fn insert_queues_first_poll() {
        let ready = ReadyQueue::default();
        let mut table = TaskTable::default();
        let handle = table.insert(async {}.boxed_local(), &ready);
        assert_eq!(ready.pop(), Some(handle.id()));
        assert_eq!(ready.pop(), None);
        assert!(!handle.is_finished());
    }

    #[test]
    fn waker_requeues_task() {
        let ready = ReadyQueue::default();
        let mut table = TaskTable::default();
        let handle = table.insert(async {}.boxed_local(), &ready);
        ready.pop();
        let (future, waker) = table.checkout(handle.id()).unwrap();
        waker.wake_by_ref();
        table.restore(handle.id(), future);
        assert_eq!(ready.pop(), Some(handle.id()));
    }

    #[test]
    fn checkout_twice_is_none() {
        let ready = ReadyQueue::default();
        let mut table = TaskTable::default();
        let handle = table.insert(async {}.boxed_local(), &ready);
        assert!(table.checkout(handle.id()).is_some());
        assert!(table.checkout(handle.id()).is_none());
    }

    #[test]
    fn complete_sets_finished() {
        let ready = ReadyQueue::default();
        let mut table = TaskTable::default();
        let handle = table.insert(async {}.boxed_local(), &ready);
        table.complete(handle.id());
        assert!(handle.is_finished());
        assert_eq!(table.len(), 0);
        assert!(table.checkout(handle.id()).is_none());
    }

    #[test]
    fn drain_empties_table() {
        let ready = ReadyQueue::default();
        let mut table = TaskTable::default();
        table.insert(async {}.boxed_local(), &ready);
        table.insert(async {}.boxed_local(), &ready);
        assert_eq!(table.drain().len(), 2);
        assert_eq!(table.len(), 0);
    }
}
