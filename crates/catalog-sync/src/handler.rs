//! Terminal transitions shared by every flow. These are the only places a
//! session releases its control.

use crate::error::SyncError;
use crate::feedback::LogEntry;
use crate::guard::SessionLease;
use crate::phase::SyncPhase;
use crate::session::Session;

/// Status text for a failed session, qualified by phase when known.
pub fn failure_status(phase: Option<&SyncPhase>, error: &SyncError) -> String {
    match phase {
        Some(phase) => format!("Error syncing {}: {error}", phase.as_str()),
        None => format!("Error: {error}"),
    }
}

/// Report a fail-fast error and unlock the control.
///
/// The bar keeps its last value. Structured details go to the diagnostic
/// channel, never to the visible log.
pub fn fail(
    session: &mut Session,
    lease: SessionLease,
    phase: Option<&SyncPhase>,
    error: &SyncError,
) {
    let status = failure_status(phase, error);

    if let Some(details) = error.details() {
        tracing::warn!(%details, "backend error details");
        session.surface().push_diagnostic(details.to_string());
    }
    tracing::warn!(phase = ?phase.map(SyncPhase::as_str), %error, "session failed");

    session.finish_status(status.clone());
    session.log(LogEntry::error(status));
    lease.release();
}

/// Force the bar to 100, write the completion message and unlock the control.
pub fn complete(session: &mut Session, lease: SessionLease, message: impl Into<String>) {
    let message = message.into();
    tracing::info!(requests = session.requests(), "{message}");

    session.progress_mut().finish();
    session.publish_progress();
    session.finish_status(message.clone());
    session.log(LogEntry::success(message));
    lease.release();
}
