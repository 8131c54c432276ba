//! Remote breakpoint actor
//!
//! The part of the debuggee's protocol we need for breakpoints on one source. How the
//! messages get there and back is up to the implementor.

use crate::debugger::{BreakpointHandle, SetBreakpointResult, SourceLocation};
use crate::Result;

use async_trait::async_trait;

#[async_trait]
pub trait RemoteBreakpointActor: Send + Sync {
    /// Ask the debuggee for a breakpoint at `location`, it may move it to the nearest
    /// line it can break on and report that back in the result.
    async fn set(
        &self,
        location: SourceLocation,
        condition: Option<String>,
    ) -> Result<SetBreakpointResult>;

    /// Remove a breakpoint previously set
    async fn delete(&self, handle: BreakpointHandle) -> Result<()>;
}
