use crate::batch::{BatchRequest, BatchResponse};
use crate::error::SyncError;
use crate::feedback::LogEntry;
use crate::phase::{BatchCursor, SyncPhase};
use crate::progress::phase_percent;
use crate::session::Session;
use crate::transport::BatchTransport;

/// Drives one phase through successive offset-based batches.
///
/// Exactly one request is outstanding at a time: the next offset is only
/// requested after the previous response has been fully processed.
pub struct BatchLoopRunner<'a> {
    transport: &'a dyn BatchTransport,
}

impl<'a> BatchLoopRunner<'a> {
    pub fn new(transport: &'a dyn BatchTransport) -> Self {
        Self { transport }
    }

    /// Run `phase` from offset 0 until the backend reports no more work.
    ///
    /// Returns the final cursor. The first transport or application error
    /// ends the loop and is returned to the caller untouched; the bar keeps
    /// its last value.
    pub async fn run_phase<F>(
        &self,
        session: &mut Session,
        phase: &SyncPhase,
        make_request: F,
    ) -> Result<BatchCursor, SyncError>
    where
        F: Fn(u64) -> BatchRequest + Sync,
    {
        let mut cursor = BatchCursor::new(phase.clone());
        tracing::info!(phase = %phase, "phase started");

        while cursor.has_more {
            let request = make_request(cursor.offset);
            tracing::debug!(
                phase = %phase,
                offset = cursor.offset,
                action = %request.action,
                "requesting batch"
            );

            session.animate(format!("Syncing {}", phase.as_str()));
            let result = self.transport.submit(&request).await;
            session.stop_animation();
            session.record_request();

            let response = result?;
            if !response.success {
                return Err(SyncError::from_response(&response));
            }

            emit_batch_logs(session, phase, &cursor, &response);
            cursor.advance(response.next_offset, response.total_items, response.has_more)?;

            let percent = phase_percent(cursor.offset, cursor.total_items, cursor.has_more);
            session.progress_mut().set_phase_percent(percent);
            session.publish_progress();
            session
                .surface()
                .set_status(format!("{}: {percent}%", phase.display_label()));
        }

        tracing::info!(phase = %phase, offset = cursor.offset, "phase finished");
        Ok(cursor)
    }
}

/// Log the backend's lines, or one synthesized line when it sent none.
fn emit_batch_logs(
    session: &Session,
    phase: &SyncPhase,
    cursor: &BatchCursor,
    response: &BatchResponse,
) {
    if !response.log_lines.is_empty() {
        session.log_lines(&response.log_lines);
        return;
    }

    let next = response.next_offset.unwrap_or(cursor.offset);
    let text = match response.total_items {
        Some(total) if total > 0 => {
            format!("{}: processed {next} of {total}", phase.display_label())
        }
        _ => format!("{}: processed batch up to offset {next}", phase.display_label()),
    };
    session.log(LogEntry::info(text));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::DEFAULT_INTERVAL;
    use crate::error::TransportError;
    use crate::feedback::Severity;
    use crate::progress::ProgressState;
    use crate::surface::{Surface, SurfaceEvent};
    use crate::test_support::ScriptedTransport;

    fn session(surface: &Surface) -> Session {
        Session::new(surface.clone(), DEFAULT_INTERVAL, ProgressState::single_phase())
    }

    #[tokio::test]
    async fn follows_offsets_until_exhausted() {
        let transport = ScriptedTransport::new([
            Ok(BatchResponse::page(40, 100, true)),
            Ok(BatchResponse::page(80, 100, true)),
            Ok(BatchResponse::page(100, 100, false)),
        ]);
        let surface = Surface::new();
        let mut session = session(&surface);
        let mut rx = surface.subscribe();

        let runner = BatchLoopRunner::new(&transport);
        let cursor = runner
            .run_phase(&mut session, &SyncPhase::Products, |offset| {
                BatchRequest::phase_sync(&SyncPhase::Products, offset)
            })
            .await
            .unwrap();

        assert_eq!(cursor.offset, 100);
        let offsets: Vec<_> = transport.requests().iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![Some(0), Some(40), Some(80)]);
        assert_eq!(session.requests(), 3);

        let mut progress = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SurfaceEvent::Progress(p) = event {
                progress.push(p);
            }
        }
        assert_eq!(progress, vec![40, 80, 100]);
        assert_eq!(surface.status(), "Products: 100%");
    }

    #[tokio::test]
    async fn classifies_backend_lines_and_synthesizes_when_absent() {
        let transport = ScriptedTransport::new([
            Ok(BatchResponse::page(2, 3, true).with_logs([
                "Category Shoes created",
                "Failed to save category Hats",
            ])),
            Ok(BatchResponse::page(3, 3, false)),
        ]);
        let surface = Surface::new();
        let mut session = session(&surface);

        BatchLoopRunner::new(&transport)
            .run_phase(&mut session, &SyncPhase::Categories, |offset| {
                BatchRequest::phase_sync(&SyncPhase::Categories, offset)
            })
            .await
            .unwrap();

        let log = surface.log();
        let severities: Vec<_> = log.iter().map(|e| e.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Success, Severity::Error, Severity::Info]
        );
        assert_eq!(log[2].text, "Categories: processed 3 of 3");
    }

    #[tokio::test]
    async fn unknown_total_stays_at_zero_until_done() {
        let transport = ScriptedTransport::new([
            Ok(BatchResponse::page(25, 0, true)),
            Ok(BatchResponse::page(50, 0, false)),
        ]);
        let surface = Surface::new();
        let mut session = session(&surface);
        let mut rx = surface.subscribe();

        BatchLoopRunner::new(&transport)
            .run_phase(&mut session, &SyncPhase::Orders, BatchRequest::order_sync)
            .await
            .unwrap();

        let mut progress = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SurfaceEvent::Progress(p) = event {
                progress.push(p);
            }
        }
        assert_eq!(progress, vec![100]);
        assert_eq!(surface.log()[0].text, "Orders: processed batch up to offset 25");
    }

    #[tokio::test]
    async fn application_error_stops_requesting() {
        let transport = ScriptedTransport::new([
            Ok(BatchResponse::page(50, 200, true)),
            Ok(BatchResponse::failure("quota exceeded")),
            Ok(BatchResponse::page(200, 200, false)),
        ]);
        let surface = Surface::new();
        let mut session = session(&surface);

        let err = BatchLoopRunner::new(&transport)
            .run_phase(&mut session, &SyncPhase::Customers, BatchRequest::customer_sync)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(surface.progress(), 25);
    }

    #[tokio::test]
    async fn transport_error_stops_requesting() {
        let transport =
            ScriptedTransport::new([Err(TransportError::with_status(503, "Service Unavailable"))]);
        let surface = Surface::new();
        let mut session = session(&surface);

        let err = BatchLoopRunner::new(&transport)
            .run_phase(&mut session, &SyncPhase::Products, |offset| {
                BatchRequest::phase_sync(&SyncPhase::Products, offset)
            })
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(surface.progress(), 0);
    }

    #[tokio::test]
    async fn stalled_cursor_is_an_error() {
        let transport = ScriptedTransport::new([
            Ok(BatchResponse::page(10, 100, true)),
            Ok(BatchResponse::page(10, 100, true)),
        ]);
        let surface = Surface::new();
        let mut session = session(&surface);

        let err = BatchLoopRunner::new(&transport)
            .run_phase(&mut session, &SyncPhase::Products, |offset| {
                BatchRequest::phase_sync(&SyncPhase::Products, offset)
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Application { .. }));
        assert_eq!(transport.requests().len(), 2);
    }
}
