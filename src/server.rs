//! Shared data structures mostly, handed between the reconciler and whatever
//! is listening to it.

use std::error;
use std::fmt;

/// Log level to log at, clients can choose to filter messages at certain log
/// levels
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogLevel {
    CRITICAL = 1,
    ERROR,
    WARN,
    INFO,
    DEBUG,
}

/// A notification to be sent to all listeners of an event
///
/// Takes a String as the command and a vector of JSON values as arguments. For example, a
/// `Notification` with a command `padre#debugger#BreakpointSet` and the arguments
/// `["test.js", 12]` tells listeners a breakpoint now exists at line 12 of `test.js`.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    cmd: String,
    args: Vec<serde_json::Value>,
}

impl Notification {
    /// Create a notification
    pub fn new(cmd: String, args: Vec<serde_json::Value>) -> Self {
        Notification { cmd, args }
    }

    /// Return the notification cmd
    pub fn cmd(&self) -> &str {
        self.cmd.as_ref()
    }

    /// Return the notification arguments
    pub fn args(&self) -> &Vec<serde_json::Value> {
        &self.args
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PadreErrorKind {
    GenericError,
    DebuggerError,
    RemoteOperationFailure,
    Timeout,
    DuplicateBreakpoint,
    StaleBreakpointState,
}

/// The error type for everything in here.
///
/// The `error_string` is suitable for showing to a user, the `debug_string` carries
/// whatever detail we had when it went wrong. Cloneable as a failed reconciliation is
/// observed both by its caller and by the next reconciliation queued on the same source.
#[derive(Clone, Debug, PartialEq)]
pub struct PadreError {
    kind: PadreErrorKind,
    error_string: String,
    debug_string: String,
}

impl PadreError {
    pub fn new(kind: PadreErrorKind, error_string: String, debug_string: String) -> Self {
        PadreError {
            kind,
            error_string,
            debug_string,
        }
    }

    pub fn kind(&self) -> PadreErrorKind {
        self.kind
    }

    pub fn get_error_string(&self) -> &str {
        &self.error_string
    }

    pub fn get_debug_string(&self) -> &str {
        &self.debug_string
    }
}

impl fmt::Display for PadreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.error_string)
    }
}

impl error::Error for PadreError {}

impl From<tokio::task::JoinError> for PadreError {
    fn from(err: tokio::task::JoinError) -> PadreError {
        PadreError::new(
            PadreErrorKind::GenericError,
            "Generic error".to_string(),
            format!("Generic error {}", err),
        )
    }
}
