pub mod animator;
pub mod batch;
pub mod classify;
pub mod error;
pub mod feedback;
pub mod guard;
pub mod handler;
pub mod orchestrator;
pub mod phase;
pub mod progress;
pub mod runner;
pub mod selective;
pub mod sequencer;
pub mod session;
pub mod surface;
pub mod transport;

pub use animator::{DEFAULT_INTERVAL, StatusAnimator};
pub use batch::{BatchRequest, BatchResponse, CatalogItem, ImportedItem, RequestAction};
pub use classify::classify;
pub use error::{SyncError, TransportError};
pub use feedback::{LogEntry, Severity};
pub use guard::{Control, SessionLease};
pub use orchestrator::{Orchestrator, OrchestratorConfig, Panel, PanelKind};
pub use phase::{BatchCursor, ItemId, SyncPhase, SyncPlan};
pub use progress::{ProgressState, item_percent, phase_percent};
pub use runner::BatchLoopRunner;
pub use selective::{ImportSummary, SelectionState, SelectiveImportRunner};
pub use sequencer::{PhaseFailure, SequencerState, StepSequencer};
pub use session::{Session, SessionOutcome, SessionReport};
pub use surface::{Surface, SurfaceEvent};
pub use transport::BatchTransport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
