//! Breakpoint reconciler
//!
//! Takes the breakpoints wanted in a source and makes the debuggee match, touching only
//! the breakpoints that changed. Breakpoints are matched up on the line originally asked
//! for, not the line the debuggee moved them to, so asking again for a line that got
//! moved leaves it alone.
//!
//! The debuggee is paused for the whole time breakpoints are being changed. All the
//! removals happen first and all at once, then all the additions at once, so a line being
//! freed up is free before anything tries to claim it.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::actor::RemoteBreakpointActor;
use crate::batch::run_batches_in_order;
use crate::config::Config;
use crate::debugger::{InstalledBreakpoint, RequestedBreakpoint};
use crate::notifier::{breakpoint_set, log_msg};
use crate::pause::{run_exclusively_paused, PausedExecutionController};
use crate::server::{LogLevel, Notification, PadreError, PadreErrorKind};
use crate::source::{breakpoints_future, BreakpointsFuture, SourceUnit};
use crate::Result;

use futures::future::{self, BoxFuture, FutureExt};
use tokio::sync::mpsc::Sender;

/// Config values read once at the start of each reconciliation
#[derive(Clone, Copy, Debug)]
struct ReconcileSettings {
    timeout: Option<Duration>,
    reject_duplicates: bool,
    recover_failed: bool,
}

impl ReconcileSettings {
    fn from_config(config: &Config) -> Self {
        let timeout = match config.get_config("BreakpointTimeout") {
            Some(secs) if secs > 0 => Some(Duration::from_secs(secs as u64)),
            _ => None,
        };

        ReconcileSettings {
            timeout,
            reject_duplicates: config.get_config("DuplicateBreakpointLines") != Some(0),
            recover_failed: config.get_config("RecoverFailedBreakpoints") != Some(0),
        }
    }
}

/// What has to happen to get from the installed breakpoints to the requested ones
#[derive(Debug, PartialEq)]
struct BreakpointChanges {
    // Indexed as the request, `None` where a breakpoint still needs adding
    breakpoints: Vec<Option<InstalledBreakpoint>>,
    to_remove: Vec<InstalledBreakpoint>,
    to_add: Vec<(usize, RequestedBreakpoint)>,
}

/// Match each installed breakpoint to the first unmatched request on the line it was
/// requested on, anything installed that's left over gets removed and anything requested
/// that's left over gets added.
fn diff_breakpoints(
    requested: Vec<RequestedBreakpoint>,
    installed: Vec<InstalledBreakpoint>,
) -> BreakpointChanges {
    let mut unmatched: Vec<Option<RequestedBreakpoint>> =
        requested.into_iter().map(Some).collect();
    let mut breakpoints = vec![None; unmatched.len()];
    let mut to_remove = vec![];

    for breakpoint in installed {
        let index = unmatched.iter().position(|r| {
            r.as_ref()
                .map_or(false, |r| r.line() == breakpoint.requested_line())
        });

        match index {
            Some(i) => {
                unmatched[i] = None;
                breakpoints[i] = Some(breakpoint);
            }
            None => to_remove.push(breakpoint),
        }
    }

    let to_add = unmatched
        .into_iter()
        .enumerate()
        .filter_map(|(i, r)| r.map(|r| (i, r)))
        .collect();

    BreakpointChanges {
        breakpoints,
        to_remove,
        to_add,
    }
}

fn find_duplicate_line(requested: &[RequestedBreakpoint]) -> Option<u64> {
    let mut seen = HashSet::new();
    requested
        .iter()
        .map(|r| r.line())
        .find(|line| !seen.insert(*line))
}

/// Bound a remote call by `timeout` if there is one
async fn remote_call<T, F>(timeout: Option<Duration>, what: String, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout {
        Some(duration) => match tokio::time::timeout(duration, call).await {
            Ok(ret) => ret,
            Err(_) => Err(PadreError::new(
                PadreErrorKind::Timeout,
                format!("Timed out trying to {}", what),
                format!(
                    "Timed out after {} seconds trying to {}",
                    duration.as_secs(),
                    what
                ),
            )),
        },
        None => call.await,
    }
}

/// Apply the changes to the source, the debuggee must already be paused
async fn set_breakpoints_on_paused_source(
    requested: Vec<RequestedBreakpoint>,
    installed: Vec<InstalledBreakpoint>,
    url: String,
    actor: Arc<dyn RemoteBreakpointActor>,
    timeout: Option<Duration>,
    notifier_tx: Sender<Notification>,
) -> Result<Vec<InstalledBreakpoint>> {
    log_msg(
        &notifier_tx,
        LogLevel::DEBUG,
        &format!("Setting {} breakpoints for {}", requested.len(), url),
    );
    log_msg(
        &notifier_tx,
        LogLevel::DEBUG,
        &format!(
            "{} breakpoints were previously set for {}",
            installed.len(),
            url
        ),
    );

    let BreakpointChanges {
        mut breakpoints,
        to_remove,
        to_add,
    } = diff_breakpoints(requested, installed);

    log_msg(
        &notifier_tx,
        LogLevel::DEBUG,
        &format!(
            "Adding {} and removing {} breakpoints",
            to_add.len(),
            to_remove.len()
        ),
    );

    let removals: Vec<BoxFuture<'static, Result<()>>> = to_remove
        .into_iter()
        .map(|breakpoint| {
            let actor = actor.clone();
            let what = format!(
                "remove breakpoint at line {} of {}",
                breakpoint.actual_line(),
                url
            );
            async move {
                let handle = breakpoint.handle().clone();
                remote_call(timeout, what, actor.delete(handle)).await
            }
            .boxed()
        })
        .collect();

    let additions: Vec<BoxFuture<'static, Result<(usize, InstalledBreakpoint)>>> = to_add
        .into_iter()
        .map(|(index, request)| {
            let actor = actor.clone();
            let what = format!("set breakpoint at line {} of {}", request.line(), url);
            async move {
                let condition = request.condition().map(|c| c.to_string());
                let call = actor.set(request.location(), condition);
                let result = remote_call(timeout, what, call).await?;
                Ok((index, InstalledBreakpoint::from_set_result(&request, result)))
            }
            .boxed()
        })
        .collect();

    let (_, added) = run_batches_in_order(removals, additions).await?;

    for (index, breakpoint) in added {
        breakpoint_set(&notifier_tx, &url, breakpoint.actual_line());
        breakpoints[index] = Some(breakpoint);
    }

    // Every slot was either carried over or has just been added
    Ok(breakpoints.into_iter().flatten().collect())
}

#[derive(Debug)]
pub struct Reconciler {
    notifier_tx: Sender<Notification>,
    config: Arc<Mutex<Config>>,
}

impl Reconciler {
    pub fn new(notifier_tx: Sender<Notification>, config: Arc<Mutex<Config>>) -> Self {
        Reconciler {
            notifier_tx,
            config,
        }
    }

    pub fn get_config(&self, key: &str) -> Option<i64> {
        self.config.lock().unwrap().get_config(key)
    }

    pub fn set_config(&self, key: &str, value: i64) -> bool {
        let found = self.config.lock().unwrap().set_config(key, value);
        if !found {
            log_msg(
                &self.notifier_tx,
                LogLevel::WARN,
                &format!("Couldn't set unfound config item: {}", key),
            );
        }
        found
    }

    /// Make the breakpoints in `source` match `requested`.
    ///
    /// Resolves to the breakpoints now installed, with the breakpoint for `requested[i]`
    /// at index `i`. Any failure removing or adding a breakpoint fails the lot.
    ///
    /// The work is queued on `source` as soon as this is called and carries on even if the
    /// returned future is dropped. A later call for the same source won't start until this
    /// one is finished and works from what this one leaves behind.
    pub fn reconcile(
        &self,
        requested: Vec<RequestedBreakpoint>,
        source: &SourceUnit,
        debuggee: Arc<dyn PausedExecutionController>,
    ) -> BreakpointsFuture {
        let settings = ReconcileSettings::from_config(&self.config.lock().unwrap());

        if settings.reject_duplicates {
            if let Some(line) = find_duplicate_line(&requested) {
                let msg = format!(
                    "Breakpoint requested twice at line {} of {}",
                    line,
                    source.url()
                );
                log_msg(&self.notifier_tx, LogLevel::WARN, &msg);
                return breakpoints_future(future::err(PadreError::new(
                    PadreErrorKind::DuplicateBreakpoint,
                    msg.clone(),
                    format!("{}, requested lines: {:?}", msg, requested),
                )));
            }
        }

        let url = source.url().to_string();
        let actor = source.actor();
        let notifier_tx = self.notifier_tx.clone();

        source.queue_breakpoints(move |previous| {
            let task = tokio::spawn(async move {
                let installed = match previous.await {
                    Ok(installed) => installed,
                    Err(e) => {
                        if settings.recover_failed {
                            log_msg(
                                &notifier_tx,
                                LogLevel::WARN,
                                &format!(
                                    "Previous breakpoints for {} failed, assuming none are set: {}",
                                    url, e
                                ),
                            );
                            vec![]
                        } else {
                            let msg = format!("Breakpoints for {} are unknown", url);
                            log_msg(&notifier_tx, LogLevel::ERROR, &msg);
                            return Err(PadreError::new(
                                PadreErrorKind::StaleBreakpointState,
                                format!("{}: {}", msg, e.get_error_string()),
                                e.get_debug_string().to_string(),
                            ));
                        }
                    }
                };

                let work_url = url.clone();
                let work_tx = notifier_tx.clone();
                let ret = run_exclusively_paused(&*debuggee, move || {
                    set_breakpoints_on_paused_source(
                        requested,
                        installed,
                        work_url,
                        actor,
                        settings.timeout,
                        work_tx,
                    )
                })
                .await;

                if let Err(ref e) = ret {
                    log_msg(
                        &notifier_tx,
                        LogLevel::ERROR,
                        &format!("Failed setting breakpoints: {}", e),
                    );
                    log_msg(&notifier_tx, LogLevel::DEBUG, e.get_debug_string());
                }

                ret
            });

            breakpoints_future(task.map(|joined| match joined {
                Ok(ret) => ret,
                Err(e) => Err(PadreError::from(e)),
            }))
        })
    }
}
