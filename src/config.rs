//! Configuration
//!
//! Responsible for setting default config, reading configs and setting.
//!
//! The following config items can be set:
//!  - BreakpointTimeout: Seconds to wait on any single breakpoint being set or removed
//!    in the debuggee before giving up on it. 0 means wait forever. Defaults to 10.
//!  - DuplicateBreakpointLines: Set to the following:
//!    0: if a request can contain the same line twice, the first one requested matches
//!       any breakpoint already on that line.
//!    1: if a request with the same line twice should be rejected outright.
//!    Defaults to 1.
//!  - RecoverFailedBreakpoints: Set to the following:
//!    0: if a failure setting breakpoints should also fail the next request for the
//!       same source.
//!    1: if the next request should carry on as though no breakpoints were set.
//!    Defaults to 1.
//!    With 1 any breakpoints the failed request had carried over, or that reached the
//!    debuggee after timing out, are forgotten and never removed. Asking for their lines
//!    again sets a second breakpoint alongside the forgotten one.

use std::collections::HashMap;

lazy_static! {
    static ref DEFAULT_CONFIG: HashMap<&'static str, i64> = {
        let mut m = HashMap::new();
        m.insert("BreakpointTimeout", 10);
        m.insert("DuplicateBreakpointLines", 1);
        m.insert("RecoverFailedBreakpoints", 1);
        m
    };
}

#[derive(Clone, Debug)]
pub struct Config {
    config: HashMap<&'static str, i64>,
}

impl Config {
    /// Create a config with every item at its default
    pub fn new() -> Self {
        Config {
            config: DEFAULT_CONFIG.clone(),
        }
    }

    /// Get a config items value
    pub fn get_config(&self, key: &str) -> Option<i64> {
        self.config.get(key).copied()
    }

    /// Set a config items value to an integer, returns false if there's no such item
    pub fn set_config(&mut self, key: &str, value: i64) -> bool {
        match self.config.get_mut(key) {
            Some(s) => {
                *s = value;
                true
            }
            None => false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}
