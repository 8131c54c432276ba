//! PADRE breakpoints
//!
//! Keeps the breakpoints in a debuggee's sources in line with what the editor asks for.
//! Given the breakpoints wanted for a source it works out which to remove and which to
//! add, pauses the debuggee, makes the changes and hands back what's now installed.
//!
//! The debuggee itself is only seen through the `RemoteBreakpointActor` and
//! `PausedExecutionController` traits, wiring them to a real protocol is left to the
//! debugger using this.

#[macro_use]
extern crate serde_derive;

#[macro_use]
extern crate lazy_static;

pub mod actor;
pub mod batch;
pub mod config;
pub mod debugger;
pub mod notifier;
pub mod pause;
pub mod reconciler;
pub mod server;
pub mod source;

pub use self::reconciler::Reconciler;
pub use self::source::SourceUnit;

pub type Result<T> = std::result::Result<T, server::PadreError>;
