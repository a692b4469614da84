use std::{
    collections::VecDeque,
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
};

/// Producer and consumer state, always updated under one lock.
///
/// Keeping `closed` inside the same mutex as the buffer is what makes the
/// wakeup protocol airtight: a waiter re-checks both under the lock it will
/// sleep on, so a close can never slip between the check and the wait.
struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Bounded FIFO queue shared between threads, blocking on both ends.
///
/// `push` blocks while the queue is full, `pop` blocks while it is empty.
/// [`BoundedQueue::close`] wakes every blocked thread on both sides at once
/// and flips the queue into drain mode: further pushes are refused, pops
/// return the remaining items and then `None`.
///
/// One mutex guards the buffer; two condvars (`not_full`, `not_empty`) keep
/// producers from waking producers and consumers from waking consumers.
pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates a queue holding at most `capacity` items.
    ///
    /// # Panics
    /// Panics if `capacity` is zero; a zero-capacity queue could never
    /// accept a push.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be at least 1");
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// Appends `item`, blocking while the queue is full.
    ///
    /// # Errors
    /// Returns `Err(item)` if the queue is (or becomes, while waiting)
    /// closed, handing the item back to the caller.
    pub fn push(&self, item: T) -> Result<(), T> {
        let mut state = self.lock();

        // Loop: both spurious wakeups and close() land here.
        while state.items.len() == self.capacity && !state.closed {
            state = self
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if state.closed {
            return Err(item);
        }

        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the oldest item, blocking while the queue is empty.
    ///
    /// Returns `None` only once the queue is closed and fully drained, so
    /// no item accepted by [`BoundedQueue::push`] is ever lost.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.lock();

        while state.items.is_empty() && !state.closed {
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let item = state.items.pop_front();
        drop(state);
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Closes the queue, waking every waiter on both sides.
    ///
    /// Idempotent. After this, `push` refuses new items while `pop` drains
    /// whatever was already accepted.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        drop(state);
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// A poisoned lock only means another thread panicked mid-operation;
    /// the buffer itself is still structurally sound, so keep going.
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
