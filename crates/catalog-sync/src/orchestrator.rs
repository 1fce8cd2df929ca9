use std::sync::Arc;
use std::time::Duration;

use crate::animator::DEFAULT_INTERVAL;
use crate::batch::{BatchRequest, BatchResponse};
use crate::error::{SyncError, TransportError};
use crate::feedback::LogEntry;
use crate::guard::{Control, SessionLease};
use crate::handler;
use crate::phase::{ItemId, SyncPhase, SyncPlan};
use crate::progress::ProgressState;
use crate::runner::BatchLoopRunner;
use crate::selective::{ImportSummary, SelectionState, SelectiveImportRunner};
use crate::sequencer::StepSequencer;
use crate::session::{Session, SessionOutcome, SessionReport};
use crate::surface::Surface;
use crate::transport::BatchTransport;

/// Settings shared by every flow.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    pub plan: SyncPlan,
    pub animation_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            plan: SyncPlan::default(),
            animation_interval: DEFAULT_INTERVAL,
        }
    }
}

/// The operator-facing flows, each with its own control and surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    FullSync,
    Categories,
    Customers,
    Orders,
    Selection,
    Import,
    Hierarchy,
}

impl PanelKind {
    pub fn all() -> [PanelKind; 7] {
        [
            Self::FullSync,
            Self::Categories,
            Self::Customers,
            Self::Orders,
            Self::Selection,
            Self::Import,
            Self::Hierarchy,
        ]
    }

    /// Idle and busy labels of the panel's control.
    fn labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::FullSync => ("Start full sync", "Syncing..."),
            Self::Categories => ("Sync categories", "Syncing categories..."),
            Self::Customers => ("Sync customers", "Syncing customers..."),
            Self::Orders => ("Sync orders", "Syncing orders..."),
            Self::Selection => ("Load products", "Loading..."),
            Self::Import => ("Import selected", "Importing..."),
            Self::Hierarchy => ("Fix category hierarchy", "Fixing..."),
        }
    }
}

/// A control bound to the surface it reports on.
#[derive(Debug, Clone)]
pub struct Panel {
    pub control: Control,
    pub surface: Surface,
}

impl Panel {
    fn new(kind: PanelKind) -> Self {
        let (idle, busy) = kind.labels();
        Self {
            control: Control::new(idle, busy),
            surface: Surface::new(),
        }
    }
}

/// Entry points for every user action.
///
/// Each method locks its panel's control for the length of the session and
/// returns [`SessionOutcome::AlreadyRunning`] without side effects when the
/// control is already locked. Flows on different panels are independent.
pub struct Orchestrator {
    transport: Arc<dyn BatchTransport>,
    config: OrchestratorConfig,
    full_sync: Panel,
    categories: Panel,
    customers: Panel,
    orders: Panel,
    selection: Panel,
    import: Panel,
    hierarchy: Panel,
}

impl Orchestrator {
    pub fn new(transport: Arc<dyn BatchTransport>, config: OrchestratorConfig) -> Self {
        Self {
            transport,
            config,
            full_sync: Panel::new(PanelKind::FullSync),
            categories: Panel::new(PanelKind::Categories),
            customers: Panel::new(PanelKind::Customers),
            orders: Panel::new(PanelKind::Orders),
            selection: Panel::new(PanelKind::Selection),
            import: Panel::new(PanelKind::Import),
            hierarchy: Panel::new(PanelKind::Hierarchy),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn panel(&self, kind: PanelKind) -> &Panel {
        match kind {
            PanelKind::FullSync => &self.full_sync,
            PanelKind::Categories => &self.categories,
            PanelKind::Customers => &self.customers,
            PanelKind::Orders => &self.orders,
            PanelKind::Selection => &self.selection,
            PanelKind::Import => &self.import,
            PanelKind::Hierarchy => &self.hierarchy,
        }
    }

    fn acquire(&self, kind: PanelKind) -> Option<SessionLease> {
        let lease = self.panel(kind).control.try_acquire();
        if lease.is_none() {
            tracing::debug!(panel = ?kind, "session already running; ignoring trigger");
        }
        lease
    }

    fn session(&self, kind: PanelKind, progress: ProgressState) -> Session {
        Session::new(
            self.panel(kind).surface.clone(),
            self.config.animation_interval,
            progress,
        )
    }

    /// Run every phase of the configured plan in order.
    pub async fn full_sync(&self) -> SessionOutcome {
        let Some(lease) = self.acquire(PanelKind::FullSync) else {
            return SessionOutcome::AlreadyRunning;
        };

        let plan = self.config.plan.clone();
        tracing::info!(phases = plan.len(), "full sync started");
        let mut session = self.session(PanelKind::FullSync, ProgressState::for_plan(&plan));
        let mut sequencer = StepSequencer::new(plan);
        let runner = BatchLoopRunner::new(self.transport.as_ref());

        match sequencer.run(&runner, &mut session).await {
            Ok(()) => {
                let report = SessionReport {
                    requests: session.requests(),
                    phases_completed: sequencer.plan().len(),
                };
                handler::complete(&mut session, lease, "Synchronization complete");
                SessionOutcome::Completed(report)
            }
            Err(failure) => {
                handler::fail(&mut session, lease, Some(&failure.phase), &failure.error);
                SessionOutcome::Failed(failure.error)
            }
        }
    }

    pub async fn category_sync(&self) -> SessionOutcome {
        self.single_phase(PanelKind::Categories, SyncPhase::Categories)
            .await
    }

    pub async fn customer_sync(&self) -> SessionOutcome {
        self.single_phase(PanelKind::Customers, SyncPhase::Customers)
            .await
    }

    pub async fn order_sync(&self) -> SessionOutcome {
        self.single_phase(PanelKind::Orders, SyncPhase::Orders).await
    }

    async fn single_phase(&self, kind: PanelKind, phase: SyncPhase) -> SessionOutcome {
        let Some(lease) = self.acquire(kind) else {
            return SessionOutcome::AlreadyRunning;
        };

        let mut session = self.session(kind, ProgressState::single_phase());
        let runner = BatchLoopRunner::new(self.transport.as_ref());
        let result = runner
            .run_phase(&mut session, &phase, |offset| {
                BatchRequest::for_phase(&phase, offset)
            })
            .await;

        match result {
            Ok(_) => {
                let report = SessionReport {
                    requests: session.requests(),
                    phases_completed: 1,
                };
                let message = format!("{} sync complete", phase.display_label());
                handler::complete(&mut session, lease, message);
                SessionOutcome::Completed(report)
            }
            Err(error) => {
                handler::fail(&mut session, lease, Some(&phase), &error);
                SessionOutcome::Failed(error)
            }
        }
    }

    /// Load the list of items available for selective import.
    pub async fn fetch_selection(&self) -> SessionOutcome<SelectionState> {
        let Some(lease) = self.acquire(PanelKind::Selection) else {
            return SessionOutcome::AlreadyRunning;
        };

        let mut session = self.session(PanelKind::Selection, ProgressState::single_phase());
        session.animate("Loading products");
        let result = self
            .transport
            .submit(&BatchRequest::fetch_selection())
            .await;
        session.stop_animation();
        session.record_request();

        let response = match accepted(result) {
            Ok(response) => response,
            Err(error) => {
                handler::fail(&mut session, lease, None, &error);
                return SessionOutcome::Failed(error);
            }
        };

        session.log_lines(&response.log_lines);
        let message = format!("Loaded {} products", response.items.len());
        session.log(LogEntry::info(message.clone()));
        session.progress_mut().finish();
        session.publish_progress();
        session.finish_status(message);
        lease.release();

        SessionOutcome::Completed(SelectionState::new(response.items))
    }

    /// Import `ids` one at a time. Per-item failures never stop the run.
    ///
    /// An empty list is rejected with a visible warning before any session
    /// starts. While an import is running the panel is left untouched.
    pub async fn import_items(
        &self,
        ids: &[ItemId],
        selection: Option<&SelectionState>,
    ) -> SessionOutcome<ImportSummary> {
        let panel = self.panel(PanelKind::Import);
        if panel.control.is_locked() {
            return SessionOutcome::AlreadyRunning;
        }
        if ids.is_empty() {
            let reason = "Select at least one product to import".to_owned();
            panel.surface.set_status(reason.clone());
            panel.surface.push_log(LogEntry::warning(reason.clone()));
            return SessionOutcome::Rejected(reason);
        }

        let Some(lease) = self.acquire(PanelKind::Import) else {
            return SessionOutcome::AlreadyRunning;
        };

        tracing::info!(items = ids.len(), "selective import started");
        let mut session = self.session(PanelKind::Import, ProgressState::single_phase());
        let runner = SelectiveImportRunner::new(self.transport.as_ref());
        let summary = runner.run(&mut session, ids, selection).await;

        let message = summary.message();
        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "selective import finished"
        );
        session.finish_status(message.clone());
        if summary.failed == 0 {
            session.log(LogEntry::success(message));
        } else {
            session.log(LogEntry::warning(message));
        }
        lease.release();

        SessionOutcome::Completed(summary)
    }

    /// Import whatever is currently selected in `selection`.
    pub async fn import_selected(
        &self,
        selection: &SelectionState,
    ) -> SessionOutcome<ImportSummary> {
        self.import_items(selection.selected_ids(), Some(selection))
            .await
    }

    /// Ask the backend to repair the category parent/child links.
    pub async fn fix_hierarchy(&self) -> SessionOutcome {
        let Some(lease) = self.acquire(PanelKind::Hierarchy) else {
            return SessionOutcome::AlreadyRunning;
        };

        let mut session = self.session(PanelKind::Hierarchy, ProgressState::single_phase());
        session.animate("Fixing category hierarchy");
        let result = self.transport.submit(&BatchRequest::fix_hierarchy()).await;
        session.stop_animation();
        session.record_request();

        let response = match accepted(result) {
            Ok(response) => response,
            Err(error) => {
                handler::fail(&mut session, lease, Some(&SyncPhase::Categories), &error);
                return SessionOutcome::Failed(error);
            }
        };

        session.log_lines(&response.log_lines);
        let report = SessionReport {
            requests: session.requests(),
            phases_completed: 1,
        };
        let message = response
            .message
            .unwrap_or_else(|| "Category hierarchy repaired".to_owned());
        handler::complete(&mut session, lease, message);
        SessionOutcome::Completed(report)
    }
}

/// A response the backend reported as successful, or the error it stands for.
fn accepted(
    result: Result<BatchResponse, TransportError>,
) -> Result<BatchResponse, SyncError> {
    let response = result?;
    if response.success {
        Ok(response)
    } else {
        Err(SyncError::from_response(&response))
    }
}
