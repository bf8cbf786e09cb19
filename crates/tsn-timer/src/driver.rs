//! Worker thread driving a [`TimerTable`].

use crate::table::{TimerId, TimerTable};
use log::debug;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// State that embeds a [`TimerTable`] and receives timer dispatches.
///
/// `dispatch_timer` runs on the worker thread while the subsystem lock is
/// held, so it may freely mutate `self` — including re-arming the timer
/// that just fired.
pub trait TimerDispatch: Send + 'static {
    /// Access to the embedded timer table.
    fn timer_table(&mut self) -> &mut TimerTable;

    /// Called once for every due timer, in deadline order.
    fn dispatch_timer(&mut self, id: TimerId);
}

struct Shared<S> {
    state: Mutex<S>,
    wake: Condvar,
    shutdown: AtomicBool,
}

/// The subsystem lock plus the condvar the worker sleeps on.
///
/// All public access to `S` goes through [`lock`](TimerHost::lock); the
/// worker acquires the same mutex, so dispatches are serialized with every
/// other caller.
pub struct TimerHost<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for TimerHost<S> {
    fn clone(&self) -> Self {
        TimerHost {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: TimerDispatch> TimerHost<S> {
    pub fn new(state: S) -> Self {
        TimerHost {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                wake: Condvar::new(),
                shutdown: AtomicBool::new(false),
            }),
        }
    }

    /// Acquires the subsystem lock.
    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.shared.state.lock()
    }

    /// Signals the worker to recompute its sleep deadline. Call after a
    /// table operation reported that the wake target moved earlier.
    pub fn wake_worker(&self) {
        self.shared.wake.notify_one();
    }

    /// Spawns the worker thread. At most one worker should run per host.
    pub fn spawn_worker(&self, thread_name: &str) -> TimerWorker<S> {
        let shared = Arc::clone(&self.shared);
        let handle = std::thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || worker_loop(shared))
            .expect("failed to spawn timer worker thread");

        TimerWorker {
            shared: Arc::clone(&self.shared),
            handle: Some(handle),
        }
    }
}

fn worker_loop<S: TimerDispatch>(shared: Arc<Shared<S>>) {
    let mut state = shared.state.lock();
    debug!("timer worker started");

    loop {
        if shared.shutdown.load(Ordering::Acquire) {
            break;
        }

        let now = std::time::Instant::now();
        for id in state.timer_table().take_due(now) {
            state.dispatch_timer(id);
        }

        let target = state.timer_table().next_deadline();
        state.timer_table().set_wake_target(target);
        match target {
            Some(deadline) => {
                let _ = shared.wake.wait_until(&mut state, deadline);
            }
            None => shared.wake.wait(&mut state),
        }
    }

    debug!("timer worker stopped");
}

/// Join handle for the worker thread. Dropping it (or calling
/// [`shutdown`](TimerWorker::shutdown)) stops the worker and joins it.
pub struct TimerWorker<S> {
    shared: Arc<Shared<S>>,
    handle: Option<JoinHandle<()>>,
}

impl<S> TimerWorker<S> {
    /// Stops the worker thread and waits for it to exit.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.shared.shutdown.store(true, Ordering::Release);
            self.shared.wake.notify_all();
            let _ = handle.join();
        }
    }
}

impl<S> Drop for TimerWorker<S> {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
