use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::sync::bounded_queue::BoundedQueue;

/// One-way end-of-session switch shared by every worker.
///
/// Any worker may trip it (local end marker, peer end marker, transport
/// failure); once set it never resets. The first `set` also closes all
/// queues registered at construction, which is what yanks workers out of
/// a blocking `push` or `pop` so they can observe the flag and exit.
///
/// Workers that block on something other than a queue (socket reads,
/// keyboard polls) use a timeout and re-check [`ShutdownSignal::is_set`]
/// each lap instead.
pub struct ShutdownSignal<T> {
    fired: AtomicBool,
    queues: Vec<Arc<BoundedQueue<T>>>,
}

impl<T> ShutdownSignal<T> {
    /// Builds a signal wired to the queues it must close when tripped.
    #[must_use]
    pub fn new(queues: Vec<Arc<BoundedQueue<T>>>) -> Self {
        Self {
            fired: AtomicBool::new(false),
            queues,
        }
    }

    /// Trips the signal and closes the registered queues.
    ///
    /// Idempotent: `swap` guarantees the queues are closed exactly once,
    /// no matter how many workers hit their end condition at the same time.
    pub fn set(&self) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            for q in &self.queues {
                q.close();
            }
        }
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}
