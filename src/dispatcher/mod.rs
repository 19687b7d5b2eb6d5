//! Single-owner dispatcher thread
//!
//! A [`Dispatcher`] owns one native windowing context. It spawns a dedicated
//! thread, initializes the platform there, and then executes queued closures in
//! submission order. Every native call in the crate funnels through it.
//!
//! # Design Notes
//!
//! - Work items are boxed closures on an unbounded `crossbeam` channel.
//! - Each submission carries its own completion channel; the submitter either
//!   blocks on it ([`Dispatcher::invoke`]) or keeps it as a [`PendingInvoke`].
//! - Errors and panics raised by an item are handed to its submitter. The loop
//!   itself keeps going.
//! - Submitting from the owner thread runs the closure inline. Queuing it would
//!   deadlock the moment the owner waited for its own item.
//! - The loop ends when the last [`Dispatcher`] handle is dropped, or right after
//!   [`Dispatcher::terminate`] tore the native context down.


use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, LazyLock};
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::error::{NativeError, Result, WindowingError};
use crate::native::{self, Platform};

/// Name of the process-wide dispatcher thread.
pub const GLOBAL_THREAD_NAME: &str = "windowing-dispatcher";

/// Lifecycle of a dispatcher thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExecutionState {
    Starting = 0,
    Running = 1,
    Terminated = 2,
}

impl ExecutionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ExecutionState::Starting,
            1 => ExecutionState::Running,
            _ => ExecutionState::Terminated,
        }
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Value, error, or panic payload of a finished work item.
type Outcome<R> = thread::Result<Result<R>>;

#[derive(Debug)]
struct StateCell(AtomicU8);

impl StateCell {
    fn new(state: ExecutionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    fn get(&self) -> ExecutionState {
        ExecutionState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: ExecutionState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

// ============================================================================
// Pending Invoke
// ============================================================================

/// Completion handle of an asynchronous submission.
///
/// Finish it with [`wait`](PendingInvoke::wait) or [`Dispatcher::end_invoke`].
/// Dropping it discards the result; the item still runs.
#[must_use = "the result of a dispatched action is lost unless it is waited for"]
pub struct PendingInvoke<R> {
    completion: Receiver<Outcome<R>>,
}

impl<R> PendingInvoke<R> {
    /// An already finished handle holding `result`.
    pub fn ready(result: Result<R>) -> Self {
        Self::finished(Ok(result))
    }

    fn finished(outcome: Outcome<R>) -> Self {
        let (tx, completion) = channel::bounded(1);
        // capacity is 1 and the receiver is alive
        let _ = tx.send(outcome);
        Self { completion }
    }

    /// Whether the action has finished. Does not block.
    pub fn is_completed(&self) -> bool {
        !self.completion.is_empty()
    }

    /// Block until the action has finished and return its result.
    ///
    /// A panic inside the action is resumed here with its original payload.
    pub fn wait(self) -> Result<R> {
        match self.completion.recv() {
            Ok(Ok(result)) => result,
            Ok(Err(payload)) => panic::resume_unwind(payload),
            Err(_) => Err(WindowingError::DispatcherTerminated),
        }
    }
}

impl<R> fmt::Debug for PendingInvoke<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingInvoke")
            .field("completed", &self.is_completed())
            .finish()
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Handle to a dispatcher thread and its native context.
pub struct Dispatcher {
    name: String,
    owner: ThreadId,
    state: Arc<StateCell>,
    queue: Sender<Job>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

static GLOBAL: LazyLock<Mutex<Option<Arc<Dispatcher>>>> = LazyLock::new(|| Mutex::new(None));

impl Dispatcher {
    /// Spawn a dispatcher thread named `name` and run `init` on it.
    ///
    /// Returns once the platform is initialized. An `init` failure, or a panic in
    /// it, is reported here and the thread exits.
    pub fn spawn<I>(name: &str, init: I) -> Result<Arc<Self>>
    where
        I: FnOnce() -> std::result::Result<Box<dyn Platform>, NativeError> + Send + 'static,
    {
        let (queue, jobs) = channel::unbounded::<Job>();
        let (ready_tx, ready_rx) = channel::bounded::<Result<()>>(1);
        let state = Arc::new(StateCell::new(ExecutionState::Starting));
        let thread_state = Arc::clone(&state);

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                lower_priority();

                match init() {
                    Ok(platform) => {
                        native::install(platform);
                        thread_state.set(ExecutionState::Running);
                        let _ = ready_tx.send(Ok(()));
                    }
                    Err(err) => {
                        thread_state.set(ExecutionState::Terminated);
                        let _ = ready_tx.send(Err(err.into()));
                        return;
                    }
                }

                run(jobs, &thread_state);

                drop(native::uninstall());
                thread_state.set(ExecutionState::Terminated);
                tracing::debug!("dispatcher loop finished");
            })
            .map_err(|e| WindowingError::Spawn(e.to_string()))?;

        let owner = handle.thread().id();

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(thread = name, error = %err, "native initialization failed");
                let _ = handle.join();
                return Err(err);
            }
            Err(_) => {
                state.set(ExecutionState::Terminated);
                let _ = handle.join();
                return Err(WindowingError::Spawn(format!(
                    "{name} exited during initialization"
                )));
            }
        }

        tracing::info!(thread = name, "dispatcher started");

        Ok(Arc::new(Self {
            name: name.to_string(),
            owner,
            state,
            queue,
            thread: Mutex::new(Some(handle)),
        }))
    }

    /// The process-wide dispatcher, spawned with `init` on first use.
    ///
    /// `init` is ignored once a live instance exists. A terminated instance is
    /// replaced.
    pub fn global_or_init<I>(init: I) -> Result<Arc<Self>>
    where
        I: FnOnce() -> std::result::Result<Box<dyn Platform>, NativeError> + Send + 'static,
    {
        let mut global = GLOBAL.lock();
        if let Some(dispatcher) = global.as_ref() {
            if dispatcher.state() != ExecutionState::Terminated {
                return Ok(Arc::clone(dispatcher));
            }
        }

        let dispatcher = Self::spawn(GLOBAL_THREAD_NAME, init)?;
        *global = Some(Arc::clone(&dispatcher));
        Ok(dispatcher)
    }

    /// The process-wide dispatcher, if one has been started.
    pub fn global() -> Option<Arc<Self>> {
        GLOBAL.lock().clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ExecutionState {
        self.state.get()
    }

    /// Whether the calling thread is this dispatcher's thread.
    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Run `f` on the dispatcher thread and wait for its result.
    ///
    /// On the dispatcher thread itself `f` runs inline.
    pub fn invoke<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce() -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        if self.state() == ExecutionState::Terminated {
            return Err(WindowingError::DispatcherTerminated);
        }
        if self.is_owner_thread() {
            return f();
        }
        self.begin_invoke(f).wait()
    }

    /// Queue `f` without waiting for it.
    ///
    /// On the dispatcher thread itself `f` runs inline and the returned handle is
    /// already complete.
    pub fn begin_invoke<R, F>(&self, f: F) -> PendingInvoke<R>
    where
        F: FnOnce() -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        if self.state() == ExecutionState::Terminated {
            return PendingInvoke::ready(Err(WindowingError::DispatcherTerminated));
        }
        if self.is_owner_thread() {
            return PendingInvoke::finished(panic::catch_unwind(AssertUnwindSafe(f)));
        }

        let (tx, completion) = channel::bounded::<Outcome<R>>(1);
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(f));
            if let Err(payload) = &outcome {
                tracing::warn!(panic = panic_message(payload.as_ref()), "dispatched action panicked");
            }
            if tx.send(outcome).is_err() {
                tracing::trace!("submitter dropped its completion handle");
            }
        });

        if self.queue.send(job).is_err() {
            // the job and its sender were dropped, so waiting reports termination
            tracing::warn!(thread = %self.name, "submission after dispatcher terminated");
        }
        PendingInvoke { completion }
    }

    /// Wait for an asynchronous submission. Same as [`PendingInvoke::wait`].
    pub fn end_invoke<R>(&self, pending: PendingInvoke<R>) -> Result<R> {
        pending.wait()
    }

    /// Tear down the native context and stop the loop.
    ///
    /// Work still queued behind this call is dropped; its submitters get
    /// [`WindowingError::DispatcherTerminated`], as does every later submission. A
    /// terminated global instance is replaced by the next
    /// [`global_or_init`](Self::global_or_init). Does nothing once terminated.
    pub fn terminate(&self) -> Result<()> {
        if self.state() == ExecutionState::Terminated {
            return Ok(());
        }
        let state = Arc::clone(&self.state);
        let name = self.name.clone();
        self.invoke(move || {
            if let Some(platform) = native::uninstall() {
                tracing::info!(thread = %name, backend = platform.name(), "native context terminated");
            }
            state.set(ExecutionState::Terminated);
            Ok(())
        })
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        // Disconnect the queue so the loop drains and exits.
        let (closed, _) = channel::unbounded();
        drop(std::mem::replace(&mut self.queue, closed));

        if self.is_owner_thread() {
            return;
        }
        if let Some(handle) = self.thread.lock().take() {
            if handle.join().is_err() {
                tracing::error!(thread = %self.name, "dispatcher thread panicked");
            }
        }
    }
}

fn run(jobs: Receiver<Job>, state: &StateCell) {
    for job in jobs.iter() {
        job();
        if state.get() == ExecutionState::Terminated {
            break;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// Drop the calling thread to the lowest scheduling priority.
#[cfg(target_os = "linux")]
fn lower_priority() {
    // On Linux PRIO_PROCESS with who = 0 applies to the calling thread only.
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, 19) };
    if rc != 0 {
        tracing::debug!(
            error = %std::io::Error::last_os_error(),
            "could not lower dispatcher priority"
        );
    }
}

#[cfg(not(target_os = "linux"))]
fn lower_priority() {}
