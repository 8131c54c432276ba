//! Source unit
//!
//! A source in the debuggee along with the breakpoints we believe are set in it. The
//! breakpoints are held as a shared future as they may still be being worked out, and
//! replacing that future is how one request for a source queues up behind another.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::actor::RemoteBreakpointActor;
use crate::debugger::InstalledBreakpoint;
use crate::Result;

use futures::future::{self, BoxFuture, FutureExt, Shared};

/// The installed breakpoints for a source, settled or still being computed
pub type BreakpointsFuture = Shared<BoxFuture<'static, Result<Vec<InstalledBreakpoint>>>>;

/// Wrap up a future of breakpoints so it can be stored and awaited by many
pub fn breakpoints_future<F>(fut: F) -> BreakpointsFuture
where
    F: Future<Output = Result<Vec<InstalledBreakpoint>>> + Send + 'static,
{
    fut.boxed().shared()
}

pub struct SourceUnit {
    url: String,
    actor: Arc<dyn RemoteBreakpointActor>,
    current_breakpoints: Mutex<BreakpointsFuture>,
}

impl SourceUnit {
    /// Create a source with no breakpoints set
    pub fn new(url: String, actor: Arc<dyn RemoteBreakpointActor>) -> Self {
        SourceUnit::with_breakpoints(url, actor, vec![])
    }

    /// Create a source that already has breakpoints set in the debuggee
    pub fn with_breakpoints(
        url: String,
        actor: Arc<dyn RemoteBreakpointActor>,
        breakpoints: Vec<InstalledBreakpoint>,
    ) -> Self {
        SourceUnit {
            url,
            actor,
            current_breakpoints: Mutex::new(breakpoints_future(future::ok(breakpoints))),
        }
    }

    pub fn url(&self) -> &str {
        &self.url[..]
    }

    pub fn actor(&self) -> Arc<dyn RemoteBreakpointActor> {
        self.actor.clone()
    }

    /// Get the latest breakpoints, possibly still pending
    pub fn current_breakpoints(&self) -> BreakpointsFuture {
        self.current_breakpoints.lock().unwrap().clone()
    }

    /// Queue up new breakpoints behind the current ones.
    ///
    /// `next` is handed the current breakpoints and whatever it returns replaces them, all
    /// while nobody else can get at them. Anything `next` returns should wait on what it was
    /// handed before doing anything, that's what keeps two requests on a source from
    /// overlapping.
    pub fn queue_breakpoints<F>(&self, next: F) -> BreakpointsFuture
    where
        F: FnOnce(BreakpointsFuture) -> BreakpointsFuture,
    {
        let mut current = self.current_breakpoints.lock().unwrap();
        let queued = next(current.clone());
        *current = queued.clone();
        queued
    }
}

impl fmt::Debug for SourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SourceUnit").field("url", &self.url).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{breakpoints_future, SourceUnit};
    use crate::actor::RemoteBreakpointActor;
    use crate::debugger::{
        BreakpointHandle, InstalledBreakpoint, SetBreakpointResult, SourceLocation,
    };
    use crate::server::{PadreError, PadreErrorKind};
    use crate::Result;

    use async_trait::async_trait;
    use futures::future;
    use tokio::sync::oneshot;

    struct NoActor;

    #[async_trait]
    impl RemoteBreakpointActor for NoActor {
        async fn set(&self, _: SourceLocation, _: Option<String>) -> Result<SetBreakpointResult> {
            unreachable!();
        }

        async fn delete(&self, _: BreakpointHandle) -> Result<()> {
            unreachable!();
        }
    }

    fn installed(line: u64) -> InstalledBreakpoint {
        InstalledBreakpoint::new(
            line,
            line,
            None,
            BreakpointHandle::new(format!("breakpoint{}", line)),
        )
    }

    #[tokio::test]
    async fn check_new_source_has_no_breakpoints() {
        let source = SourceUnit::new("file:///home/me/test.js".to_string(), Arc::new(NoActor));

        assert_eq!(source.url(), "file:///home/me/test.js");
        assert_eq!(source.current_breakpoints().await, Ok(vec![]));
    }

    #[tokio::test]
    async fn check_queued_breakpoints_see_previous() {
        let source = SourceUnit::with_breakpoints(
            "test.js".to_string(),
            Arc::new(NoActor),
            vec![installed(5)],
        );

        let queued = source.queue_breakpoints(|previous| {
            breakpoints_future(async move {
                let mut breakpoints = previous.await?;
                breakpoints.push(installed(9));
                Ok(breakpoints)
            })
        });

        assert_eq!(queued.await, Ok(vec![installed(5), installed(9)]));
        assert_eq!(
            source.current_breakpoints().await,
            Ok(vec![installed(5), installed(9)])
        );
    }

    #[tokio::test]
    async fn check_queued_breakpoints_chain_in_order() {
        let source = SourceUnit::new("test.js".to_string(), Arc::new(NoActor));

        let (tx, rx) = oneshot::channel::<()>();

        let first = source.queue_breakpoints(|previous| {
            breakpoints_future(async move {
                let mut breakpoints = previous.await?;
                rx.await.unwrap();
                breakpoints.push(installed(1));
                Ok(breakpoints)
            })
        });
        let second = source.queue_breakpoints(|previous| {
            breakpoints_future(async move {
                let mut breakpoints = previous.await?;
                breakpoints.push(installed(2));
                Ok(breakpoints)
            })
        });

        tx.send(()).unwrap();

        assert_eq!(second.await, Ok(vec![installed(1), installed(2)]));
        assert_eq!(first.await, Ok(vec![installed(1)]));
    }

    #[tokio::test]
    async fn check_pending_breakpoints_seen_by_every_reader() {
        let source = SourceUnit::new("test.js".to_string(), Arc::new(NoActor));

        let (tx, rx) = oneshot::channel();
        let _ = source.queue_breakpoints(|_| {
            breakpoints_future(async move { Ok(rx.await.unwrap()) })
        });

        let first = source.current_breakpoints();
        let second = source.current_breakpoints();

        tx.send(vec![installed(3)]).unwrap();

        assert_eq!(first.await, Ok(vec![installed(3)]));
        assert_eq!(second.await, Ok(vec![installed(3)]));
    }

    #[tokio::test]
    async fn check_failed_breakpoints_seen_by_every_reader() {
        let source = SourceUnit::new("test.js".to_string(), Arc::new(NoActor));

        let err = PadreError::new(
            PadreErrorKind::RemoteOperationFailure,
            "Can't set breakpoint".to_string(),
            "noScript".to_string(),
        );
        let failed = err.clone();
        let _ = source.queue_breakpoints(|_| breakpoints_future(future::err(failed)));

        assert_eq!(source.current_breakpoints().await, Err(err.clone()));
        assert_eq!(source.current_breakpoints().await, Err(err));
    }
}
