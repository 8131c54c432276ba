//! Breakpoint data structures
//!
//! What gets asked for (`RequestedBreakpoint`) and what the debuggee actually ends up with
//! (`InstalledBreakpoint`).

/// A location in a source, lines are 1-based
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    line: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    column: Option<u64>,
}

impl SourceLocation {
    pub fn new(line: u64, column: Option<u64>) -> Self {
        SourceLocation { line, column }
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn column(&self) -> Option<u64> {
        self.column
    }
}

/// A breakpoint the editor wants, only the line is used to tell two apart.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedBreakpoint {
    line: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    column: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
}

impl RequestedBreakpoint {
    pub fn new(line: u64) -> Self {
        RequestedBreakpoint {
            line,
            column: None,
            condition: None,
        }
    }

    pub fn with_column(mut self, column: u64) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_condition(mut self, condition: String) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn column(&self) -> Option<u64> {
        self.column
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Opaque handle the debuggee gave us for a breakpoint, normally the name of the
/// breakpoint's actor.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct BreakpointHandle(String);

impl BreakpointHandle {
    pub fn new(handle: String) -> Self {
        BreakpointHandle(handle)
    }

    pub fn as_str(&self) -> &str {
        &self.0[..]
    }
}

/// The line the debuggee really put a breakpoint on
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualLocation {
    line: u64,
}

impl ActualLocation {
    pub fn new(line: u64) -> Self {
        ActualLocation { line }
    }

    pub fn line(&self) -> u64 {
        self.line
    }
}

/// Response to setting a breakpoint, `actual_location` is missing when the debuggee
/// didn't need to move it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakpointResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actual_location: Option<ActualLocation>,
    breakpoint_handle: BreakpointHandle,
}

impl SetBreakpointResult {
    pub fn new(actual_location: Option<ActualLocation>, breakpoint_handle: BreakpointHandle) -> Self {
        SetBreakpointResult {
            actual_location,
            breakpoint_handle,
        }
    }

    pub fn actual_location(&self) -> Option<&ActualLocation> {
        self.actual_location.as_ref()
    }

    pub fn breakpoint_handle(&self) -> &BreakpointHandle {
        &self.breakpoint_handle
    }
}

/// A breakpoint that exists in the debuggee.
///
/// `requested_line` is what was asked for and is what later requests get matched
/// against, `actual_line` is where the debuggee moved it to if that line couldn't
/// be broken on.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledBreakpoint {
    requested_line: u64,
    actual_line: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    handle: BreakpointHandle,
}

impl InstalledBreakpoint {
    pub fn new(
        requested_line: u64,
        actual_line: u64,
        condition: Option<String>,
        handle: BreakpointHandle,
    ) -> Self {
        InstalledBreakpoint {
            requested_line,
            actual_line,
            condition,
            handle,
        }
    }

    /// Create from a breakpoint request and the debuggee's response to setting it
    pub fn from_set_result(requested: &RequestedBreakpoint, result: SetBreakpointResult) -> Self {
        let actual_line = match result.actual_location {
            Some(ref location) => location.line(),
            None => requested.line(),
        };

        InstalledBreakpoint::new(
            requested.line(),
            actual_line,
            requested.condition.clone(),
            result.breakpoint_handle,
        )
    }

    pub fn requested_line(&self) -> u64 {
        self.requested_line
    }

    pub fn actual_line(&self) -> u64 {
        self.actual_line
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn handle(&self) -> &BreakpointHandle {
        &self.handle
    }
}
