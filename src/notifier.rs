//! Notifier
//!
//! Tools for notifying whoever is listening about an event. Everything goes through
//! a `Sender<Notification>`, the listening end decides where it's forwarded to.

use crate::server::{LogLevel, Notification};

use tokio::sync::mpsc::Sender;

/// Send a notification without waiting on the listener
fn send_notification(notifier_tx: &Sender<Notification>, msg: Notification) {
    let notifier_tx = notifier_tx.clone();
    tokio::spawn(async move {
        // Nobody listening is fine, the message is just dropped.
        let _ = notifier_tx.send(msg).await;
    });
}

/// Send a log message
pub fn log_msg(notifier_tx: &Sender<Notification>, level: LogLevel, msg: &str) {
    let msg = Notification::new(
        "padre#debugger#Log".to_string(),
        vec![serde_json::json!(level as u8), serde_json::json!(msg)],
    );
    send_notification(notifier_tx, msg);
}

/// Notify that a breakpoint has been set
pub fn breakpoint_set(notifier_tx: &Sender<Notification>, file: &str, line: u64) {
    let msg = Notification::new(
        "padre#debugger#BreakpointSet".to_string(),
        vec![serde_json::json!(file), serde_json::json!(line)],
    );
    send_notification(notifier_tx, msg);
}
