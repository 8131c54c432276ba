//! Pausing the debuggee
//!
//! Breakpoints are only changed with the debuggee paused. A `PausedExecutionController`
//! hands out a `Resumer` once the debuggee is halted and it stays halted until that
//! `Resumer` is used.
//!
//! `PauseCoordinator` is the usual controller, sitting in front of a thread in the
//! debuggee. Any number of sections can be open on it at once, the thread is interrupted
//! when the first one opens and resumed when the last closes. If the thread was already
//! paused, say at a breakpoint, it's left alone both ways.

use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use crate::server::PadreError;
use crate::Result;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};

#[async_trait]
pub trait PausedExecutionController: Send + Sync {
    /// Resolves once the debuggee is paused
    async fn pause(&self) -> Result<Resumer>;
}

/// Consumed to let the debuggee carry on
pub struct Resumer {
    resume: BoxFuture<'static, Result<()>>,
}

impl Resumer {
    pub fn new<F>(resume: F) -> Self
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        Resumer {
            resume: resume.boxed(),
        }
    }

    pub async fn resume(self) -> Result<()> {
        self.resume.await
    }
}

impl fmt::Debug for Resumer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Resumer").finish()
    }
}

/// Run `work` with the debuggee paused, resuming afterwards whether `work` succeeded
/// or not.
///
/// When both `work` and the resume fail it's the error from `work` that's returned. A
/// panic in `work` is carried on with once the debuggee has been resumed.
pub async fn run_exclusively_paused<T, F, Fut>(
    controller: &dyn PausedExecutionController,
    work: F,
) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let resumer = controller.pause().await?;

    let result = AssertUnwindSafe(async move { work().await })
        .catch_unwind()
        .await;

    let resumed = resumer.resume().await;

    let result = match result {
        Ok(result) => result,
        Err(panic) => panic::resume_unwind(panic),
    };

    match (result, resumed) {
        (Err(e), _) => Err(e),
        (Ok(_), Err(e)) => Err(e),
        (Ok(ret), Ok(())) => Ok(ret),
    }
}

/// A thread in the debuggee
#[async_trait]
pub trait ThreadActor: Send + Sync {
    async fn interrupt(&self) -> Result<()>;
    async fn resume(&self) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ThreadState {
    Running,
    Paused,
}

type Interrupt = Shared<BoxFuture<'static, std::result::Result<(), PadreError>>>;

struct CoordinatorState {
    thread_state: ThreadState,
    open_sections: usize,
    // Whether we paused the thread and so should resume it
    interrupted: bool,
    interrupt: Option<Interrupt>,
    interrupt_generation: u64,
}

#[derive(Clone)]
pub struct PauseCoordinator {
    thread: Arc<dyn ThreadActor>,
    state: Arc<Mutex<CoordinatorState>>,
}

impl PauseCoordinator {
    pub fn new(thread: Arc<dyn ThreadActor>, thread_state: ThreadState) -> Self {
        PauseCoordinator {
            thread,
            state: Arc::new(Mutex::new(CoordinatorState {
                thread_state,
                open_sections: 0,
                interrupted: false,
                interrupt: None,
                interrupt_generation: 0,
            })),
        }
    }

    /// The debuggee reported the thread paused by itself, e.g. hitting a breakpoint
    pub fn thread_paused(&self) {
        self.state.lock().unwrap().thread_state = ThreadState::Paused;
    }

    /// The debuggee reported the thread running again
    pub fn thread_resumed(&self) {
        let mut state = self.state.lock().unwrap();
        state.thread_state = ThreadState::Running;
        state.interrupted = false;
        state.interrupt = None;
    }

    pub fn thread_state(&self) -> ThreadState {
        self.state.lock().unwrap().thread_state
    }

    pub fn open_sections(&self) -> usize {
        self.state.lock().unwrap().open_sections
    }

    async fn close_section(
        thread: Arc<dyn ThreadActor>,
        state: Arc<Mutex<CoordinatorState>>,
    ) -> Result<()> {
        let resume_thread = {
            let mut state = state.lock().unwrap();
            state.open_sections -= 1;
            if state.open_sections == 0 && state.interrupted {
                state.thread_state = ThreadState::Running;
                state.interrupted = false;
                state.interrupt = None;
                true
            } else {
                false
            }
        };

        if resume_thread {
            thread.resume().await
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for PauseCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("PauseCoordinator")
            .field("thread_state", &state.thread_state)
            .field("open_sections", &state.open_sections)
            .field("interrupted", &state.interrupted)
            .finish()
    }
}

#[async_trait]
impl PausedExecutionController for PauseCoordinator {
    async fn pause(&self) -> Result<Resumer> {
        let (interrupt, generation) = {
            let mut state = self.state.lock().unwrap();
            state.open_sections += 1;

            if state.thread_state == ThreadState::Running {
                let thread = self.thread.clone();
                let interrupt: Interrupt =
                    async move { thread.interrupt().await }.boxed().shared();
                state.thread_state = ThreadState::Paused;
                state.interrupted = true;
                state.interrupt = Some(interrupt);
                state.interrupt_generation += 1;
            }

            (state.interrupt.clone(), state.interrupt_generation)
        };

        if let Some(interrupt) = interrupt {
            if let Err(e) = interrupt.await {
                let mut state = self.state.lock().unwrap();
                state.open_sections -= 1;
                if state.interrupt_generation == generation && state.interrupt.is_some() {
                    state.thread_state = ThreadState::Running;
                    state.interrupted = false;
                    state.interrupt = None;
                }
                return Err(e);
            }
        }

        let thread = self.thread.clone();
        let state = self.state.clone();

        Ok(Resumer::new(PauseCoordinator::close_section(thread, state)))
    }
}
