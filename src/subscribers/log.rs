//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] renders events through the `log` facade in a compact
//! human-readable format. This is primarily useful for development,
//! debugging, and examples.
//!
//! ## Output format
//! ```text
//! [entered] slot=press user=worker-1
//! [enter-deferred] slot=press user=worker-4 arrival=7
//! [switch-queued] from=lathe slot=press user=worker-2
//! [cycle-rotated] len=3 slot=press user=worker-2
//! [use-started] slot=press user=worker-1
//! [left] slot=press user=worker-1
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple log-facade subscriber.
///
/// Enabled via the `logging` feature. Emits one `log::info!` line per
/// event for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
pub struct LogWriter;

fn opt(field: &Option<std::sync::Arc<str>>) -> &str {
    field.as_deref().unwrap_or("?")
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::EnterDeferred => {
                log::info!(
                    "[enter-deferred] slot={} user={} arrival={:?}",
                    opt(&e.slot),
                    opt(&e.user),
                    e.arrival
                );
            }
            EventKind::EnterQueued => {
                log::info!("[enter-queued] slot={} user={}", opt(&e.slot), opt(&e.user));
            }
            EventKind::Entered => {
                log::info!("[entered] slot={} user={}", opt(&e.slot), opt(&e.user));
            }
            EventKind::SwitchQueued => {
                log::info!(
                    "[switch-queued] from={} slot={} user={}",
                    opt(&e.from),
                    opt(&e.slot),
                    opt(&e.user)
                );
            }
            EventKind::Switched => {
                log::info!(
                    "[switched] from={} slot={} user={}",
                    opt(&e.from),
                    opt(&e.slot),
                    opt(&e.user)
                );
            }
            EventKind::CycleRotated => {
                log::info!(
                    "[cycle-rotated] len={:?} slot={} user={}",
                    e.cycle_len,
                    opt(&e.slot),
                    opt(&e.user)
                );
            }
            EventKind::UseStarted => {
                log::info!("[use-started] slot={} user={}", opt(&e.slot), opt(&e.user));
            }
            EventKind::UseFinished => {
                log::info!("[use-finished] slot={} user={}", opt(&e.slot), opt(&e.user));
            }
            EventKind::Left => {
                log::info!("[left] slot={} user={}", opt(&e.slot), opt(&e.user));
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
