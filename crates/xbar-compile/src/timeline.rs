//! `StateTimeline` (C3, §4.3): an ordered `cycle → CrossbarState` map
//! giving the grid state in effect "just before" any cycle.

use std::collections::BTreeMap;

use crate::crossbar::CrossbarState;

/// An ordered map from cycle to the `CrossbarState` that took effect at
/// that cycle.
#[derive(Debug, Clone)]
pub struct StateTimeline {
    initial: CrossbarState,
    entries: BTreeMap<u64, CrossbarState>,
}

impl StateTimeline {
    /// Start a timeline at the given initial state (installed before
    /// cycle 0).
    #[must_use]
    pub fn new(initial: CrossbarState) -> Self {
        Self {
            initial,
            entries: BTreeMap::new(),
        }
    }

    /// The state in effect just before executing an instruction
    /// starting at `cycle`: the state at the greatest installed key ≤
    /// `cycle`, or the initial state if none.
    #[must_use]
    pub fn snapshot_at(&self, cycle: u64) -> &CrossbarState {
        self.entries
            .range(..=cycle)
            .next_back()
            .map_or(&self.initial, |(_, state)| state)
    }

    /// Install `new_state` as the state taking effect at `cycle`.
    pub fn commit(&mut self, cycle: u64, new_state: CrossbarState) {
        self.entries.insert(cycle, new_state);
    }

    /// The state at the highest installed cycle, or the initial state
    /// if nothing has been committed yet — the kernel's final state.
    #[must_use]
    pub fn final_state(&self) -> &CrossbarState {
        self.entries
            .values()
            .next_back()
            .unwrap_or(&self.initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xbar_ir::QubitId;

    #[test]
    fn test_snapshot_before_any_commit_is_initial() {
        let mut initial = CrossbarState::new(2, 2);
        initial.add_qubit(0, 0, QubitId(0), false).unwrap();
        let timeline = StateTimeline::new(initial.clone());
        assert!(timeline.snapshot_at(0).equals(&initial));
        assert!(timeline.snapshot_at(100).equals(&initial));
    }

    #[test]
    fn test_snapshot_picks_greatest_key_leq_cycle() {
        let mut initial = CrossbarState::new(2, 2);
        initial.add_qubit(0, 0, QubitId(0), false).unwrap();
        let mut timeline = StateTimeline::new(initial.clone());

        let mut moved = initial.clone();
        moved.shuttle_right(QubitId(0)).unwrap();
        timeline.commit(5, moved.clone());

        assert!(timeline.snapshot_at(0).equals(&initial));
        assert!(timeline.snapshot_at(4).equals(&initial));
        assert!(timeline.snapshot_at(5).equals(&moved));
        assert!(timeline.snapshot_at(1000).equals(&moved));
    }
}
