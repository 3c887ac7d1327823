//! Logical timers processed synchronously at tick boundaries.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BTreeSet, BinaryHeap},
    time::Duration,
};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle identifying a scheduled task, used for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TaskHandle(u64);

#[derive(Debug)]
struct Entry<T> {
    due: Duration,
    sequence: u64,
    handle: TaskHandle,
    period: Option<Duration>,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.sequence == other.sequence
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then(self.sequence.cmp(&other.sequence))
    }
}

/// Queue of one-shot and repeating tasks keyed by simulated time.
///
/// Tasks fire in due-time order, ties broken by scheduling order. A task
/// scheduled while draining fires in the same drain if it is already due.
#[derive(Debug)]
pub(crate) struct Scheduler<T> {
    now: Duration,
    queue: BinaryHeap<Reverse<Entry<T>>>,
    live: BTreeSet<TaskHandle>,
    next_sequence: u64,
    next_handle: u64,
}

impl<T: Clone> Scheduler<T> {
    pub(crate) fn new() -> Self {
        Self {
            now: Duration::ZERO,
            queue: BinaryHeap::new(),
            live: BTreeSet::new(),
            next_sequence: 0,
            next_handle: 0,
        }
    }

    /// Current simulated time.
    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Schedules `task` to fire after `delay`, and every `delay` thereafter
    /// when `repeat` is set.
    pub(crate) fn schedule(&mut self, delay: Duration, repeat: bool, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        let period = repeat.then(|| delay.max(MIN_PERIOD));
        let _ = self.live.insert(handle);
        self.push(self.now.saturating_add(delay), handle, period, task);
        handle
    }

    /// Cancels a pending task. Returns whether the task was still pending.
    pub(crate) fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.live.remove(&handle)
    }

    /// Removes and returns the next task that is due, if any.
    pub(crate) fn pop_due(&mut self) -> Option<T> {
        loop {
            let due = self.queue.peek().map(|Reverse(entry)| entry.due)?;
            if due > self.now {
                return None;
            }

            let Reverse(entry) = self.queue.pop()?;
            if !self.live.contains(&entry.handle) {
                continue;
            }

            match entry.period {
                Some(period) => {
                    let next_due = entry.due.saturating_add(period);
                    self.push(next_due, entry.handle, Some(period), entry.task.clone());
                }
                None => {
                    let _ = self.live.remove(&entry.handle);
                }
            }
            return Some(entry.task);
        }
    }

    fn push(&mut self, due: Duration, handle: TaskHandle, period: Option<Duration>, task: T) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.push(Reverse(Entry {
            due,
            sequence,
            handle,
            period,
            task,
        }));
    }
}
