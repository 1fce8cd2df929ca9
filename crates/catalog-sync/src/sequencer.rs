use crate::batch::BatchRequest;
use crate::error::SyncError;
use crate::phase::{SyncPhase, SyncPlan};
use crate::progress::ProgressState;
use crate::runner::BatchLoopRunner;
use crate::session::Session;

/// Where a full sync currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running { step: usize },
    Complete,
    Failed { step: usize },
}

/// A phase failure that halted the sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseFailure {
    pub phase: SyncPhase,
    pub error: SyncError,
}

/// Runs the phases of a [`SyncPlan`] in order, folding each phase's weight
/// into one progress bar. The first failing phase halts the sequence.
#[derive(Debug)]
pub struct StepSequencer {
    plan: SyncPlan,
    state: SequencerState,
}

impl StepSequencer {
    pub fn new(plan: SyncPlan) -> Self {
        Self {
            plan,
            state: SequencerState::Idle,
        }
    }

    pub fn plan(&self) -> &SyncPlan {
        &self.plan
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    /// Reset progress and point at the first phase.
    pub fn begin(&mut self, progress: &mut ProgressState) {
        progress.reset();
        self.state = SequencerState::Running { step: 0 };
    }

    /// The phase to run next, if the sequence is running.
    pub fn current_phase(&self) -> Option<&SyncPhase> {
        match self.state {
            SequencerState::Running { step } => self.plan.phases().get(step),
            _ => None,
        }
    }

    /// Record completion of the running phase and advance.
    pub fn phase_done(&mut self, progress: &mut ProgressState) {
        let SequencerState::Running { step } = self.state else {
            return;
        };
        progress.complete_phase();
        let next = step + 1;
        self.state = if next == self.plan.len() {
            SequencerState::Complete
        } else {
            SequencerState::Running { step: next }
        };
    }

    /// Halt on the running phase.
    pub fn fail(&mut self) {
        if let SequencerState::Running { step } = self.state {
            self.state = SequencerState::Failed { step };
        }
    }

    /// Run every phase of the plan. Remaining phases are not attempted after a failure.
    pub async fn run(
        &mut self,
        runner: &BatchLoopRunner<'_>,
        session: &mut Session,
    ) -> Result<(), PhaseFailure> {
        self.begin(session.progress_mut());
        session.publish_progress();

        while let Some(phase) = self.current_phase().cloned() {
            let result = runner
                .run_phase(session, &phase, |offset| BatchRequest::for_phase(&phase, offset))
                .await;

            match result {
                Ok(_) => {
                    self.phase_done(session.progress_mut());
                    session.publish_progress();
                }
                Err(error) => {
                    self.fail();
                    return Err(PhaseFailure { phase, error });
                }
            }
        }

        Ok(())
    }
}
