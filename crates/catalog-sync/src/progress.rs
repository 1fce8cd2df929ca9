//! Progress arithmetic shared by every runner.

use crate::phase::SyncPlan;

/// Completion percentage of a single phase after a batch.
///
/// `has_more == false` always reports 100: the completion flag is
/// authoritative and the offset ratio is only advisory. A zero total means
/// the backend did not report one.
pub fn phase_percent(next_offset: u64, total_items: u64, has_more: bool) -> u8 {
    if !has_more {
        return 100;
    }
    if total_items == 0 {
        return 0;
    }
    let ratio = next_offset as f64 / total_items as f64 * 100.0;
    ratio.round().clamp(0.0, 100.0) as u8
}

/// Percentage of a per-item loop after `done` of `total` items.
pub fn item_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let ratio = done as f64 / total as f64 * 100.0;
    ratio.round().clamp(0.0, 100.0) as u8
}

/// Weighted progress across the phases of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    completed_weight: f64,
    current_phase_percent: u8,
    phase_weight: f64,
}

impl ProgressState {
    pub fn new(phase_weight: f64) -> Self {
        Self {
            completed_weight: 0.0,
            current_phase_percent: 0,
            phase_weight: phase_weight.clamp(0.0, 100.0),
        }
    }

    /// One phase owning the whole bar.
    pub fn single_phase() -> Self {
        Self::new(100.0)
    }

    pub fn for_plan(plan: &SyncPlan) -> Self {
        Self::new(plan.phase_weight())
    }

    pub fn reset(&mut self) {
        self.completed_weight = 0.0;
        self.current_phase_percent = 0;
    }

    pub fn set_phase_percent(&mut self, percent: u8) {
        self.current_phase_percent = percent.min(100);
    }

    /// Fold the running phase into the completed weight.
    pub fn complete_phase(&mut self) {
        self.completed_weight = (self.completed_weight + self.phase_weight).min(100.0);
        self.current_phase_percent = 0;
    }

    /// Force the bar to 100.
    pub fn finish(&mut self) {
        self.completed_weight = 100.0;
        self.current_phase_percent = 0;
    }

    pub fn completed_weight(&self) -> f64 {
        self.completed_weight
    }

    pub fn current_phase_percent(&self) -> u8 {
        self.current_phase_percent
    }

    pub fn overall(&self) -> u8 {
        let overall = self.completed_weight
            + f64::from(self.current_phase_percent) * self.phase_weight / 100.0;
        overall.round().clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::SyncPhase;

    #[test]
    fn percent_from_offset_ratio() {
        assert_eq!(phase_percent(0, 100, true), 0);
        assert_eq!(phase_percent(50, 100, true), 50);
        assert_eq!(phase_percent(1, 3, true), 33);
        assert_eq!(phase_percent(2, 3, true), 67);
    }

    #[test]
    fn percent_never_exceeds_bounds() {
        assert_eq!(phase_percent(500, 100, true), 100);
        assert_eq!(phase_percent(u64::MAX, 1, true), 100);
    }

    #[test]
    fn unknown_total_reports_zero_until_done() {
        assert_eq!(phase_percent(250, 0, true), 0);
        assert_eq!(phase_percent(250, 0, false), 100);
    }

    #[test]
    fn finished_phase_is_always_complete() {
        for (offset, total) in [(0, 0), (10, 100), (100, 100), (999, 3)] {
            assert_eq!(phase_percent(offset, total, false), 100);
        }
    }

    #[test]
    fn percent_is_monotonic_in_offset() {
        for total in [1u64, 7, 100, 1234] {
            let mut last = 0;
            for offset in 0..=total + 10 {
                let percent = phase_percent(offset, total, true);
                assert!(percent <= 100);
                assert!(percent >= last, "offset {offset} total {total}");
                last = percent;
            }
        }
    }

    #[test]
    fn item_percent_rounds() {
        assert_eq!(item_percent(0, 3), 0);
        assert_eq!(item_percent(1, 3), 33);
        assert_eq!(item_percent(2, 3), 67);
        assert_eq!(item_percent(3, 3), 100);
        assert_eq!(item_percent(0, 0), 100);
    }

    #[test]
    fn completed_weight_after_n_of_m_phases() {
        for m in 1..=7usize {
            let plan = SyncPlan::new(vec![SyncPhase::Products; m]).unwrap();
            let mut state = ProgressState::for_plan(&plan);
            for n in 1..=m {
                state.complete_phase();
                let expected = n as f64 * 100.0 / m as f64;
                assert!((state.completed_weight() - expected).abs() < 1e-9);
            }
            assert_eq!(state.overall(), 100);
        }
    }

    #[test]
    fn overall_is_monotonic_across_phase_boundaries() {
        let plan = SyncPlan::new(vec![
            SyncPhase::Categories,
            SyncPhase::Products,
            SyncPhase::Customers,
        ])
        .unwrap();
        let mut state = ProgressState::for_plan(&plan);
        let mut last = state.overall();

        for _ in plan.phases() {
            for percent in [0u8, 20, 60, 100] {
                state.set_phase_percent(percent);
                assert!(state.overall() >= last);
                last = state.overall();
            }
            state.complete_phase();
            assert!(state.overall() >= last);
            last = state.overall();
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn two_phase_plan_weights() {
        let mut state = ProgressState::new(50.0);
        state.set_phase_percent(50);
        assert_eq!(state.overall(), 25);
        state.set_phase_percent(100);
        assert_eq!(state.overall(), 50);
        state.complete_phase();
        assert_eq!(state.overall(), 50);
        state.set_phase_percent(100);
        assert_eq!(state.overall(), 100);
    }

    #[test]
    fn reset_and_finish() {
        let mut state = ProgressState::single_phase();
        state.set_phase_percent(40);
        assert_eq!(state.overall(), 40);
        state.reset();
        assert_eq!(state.overall(), 0);
        state.finish();
        assert_eq!(state.overall(), 100);
    }
}
