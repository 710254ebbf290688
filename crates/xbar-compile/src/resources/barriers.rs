//! `BarrierResource` (§4.6.2): the (H−1) horizontal and (W−1) vertical
//! barriers between adjacent grid cells.

use xbar_ir::{Gate, InstrType};

use super::{direction_from_name, is_combined_shuttle, Resource};
use crate::crossbar::CrossbarState;
use crate::error::{CompileError, CompileResult};
use crate::interval_map::IntervalMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierState {
    Lowered,
    Raised,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BarrierId {
    /// The barrier between row `gap_row` and `gap_row + 1`, at column `col`.
    Horizontal { gap_row: u32, col: u32 },
    /// The barrier between column `gap_col` and `gap_col + 1`, at row `row`.
    Vertical { row: u32, gap_col: u32 },
}

/// All barriers bordering the cell at `pos`, paired with whether that
/// edge lies in the direction of `delta` (the "in-between" edge for a
/// move in that direction) — `None` delta marks every edge as a border
/// (used for gates that don't move anything, e.g. global-wave pulses).
fn cell_edges(height: u32, width: u32, pos: (u32, u32), delta: Option<(i32, i32)>) -> Vec<(BarrierId, bool)> {
    let (row, col) = pos;
    let mut edges = Vec::with_capacity(4);
    if row > 0 {
        edges.push((BarrierId::Horizontal { gap_row: row - 1, col }, delta == Some((-1, 0))));
    }
    if row + 1 < height {
        edges.push((BarrierId::Horizontal { gap_row: row, col }, delta == Some((1, 0))));
    }
    if col > 0 {
        edges.push((BarrierId::Vertical { row, gap_col: col - 1 }, delta == Some((0, -1))));
    }
    if col + 1 < width {
        edges.push((BarrierId::Vertical { row, gap_col: col }, delta == Some((0, 1))));
    }
    edges
}

/// The barrier directly between two adjacent sites, and the other
/// (border) edges of the first site's cell — used for two-qubit natives
/// and the perpendicular-detection phase of a measurement, both of
/// which request "in-between lowered, three perimeter raised" around
/// one operand's cell (§4.6.2).
fn between(height: u32, width: u32, state: &CrossbarState, a: u32, b: u32) -> CompileResult<Vec<(BarrierId, bool)>> {
    let pos_a = state.get_pos_by_site(a);
    let pos_b = state.get_pos_by_site(b);
    let delta = (
        i32::try_from(pos_b.0).unwrap_or(0) - i32::try_from(pos_a.0).unwrap_or(0),
        i32::try_from(pos_b.1).unwrap_or(0) - i32::try_from(pos_a.1).unwrap_or(0),
    );
    if delta.0.abs() + delta.1.abs() != 1 {
        return Err(CompileError::IllegalState {
            component: "BarrierResource",
            message: format!("sites {a} and {b} are not grid-adjacent"),
        });
    }
    Ok(cell_edges(height, width, pos_a, Some(delta)))
}

#[derive(Debug)]
pub struct BarrierResource {
    height: u32,
    width: u32,
    horizontal: Vec<IntervalMap<BarrierState>>,
    vertical: Vec<IntervalMap<BarrierState>>,
}

impl BarrierResource {
    #[must_use]
    pub fn new(height: u32, width: u32) -> Self {
        let horizontal_count = height.saturating_sub(1) as usize * width as usize;
        let vertical_count = height as usize * width.saturating_sub(1) as usize;
        Self {
            height,
            width,
            horizontal: (0..horizontal_count).map(|_| IntervalMap::new()).collect(),
            vertical: (0..vertical_count).map(|_| IntervalMap::new()).collect(),
        }
    }

    fn slot(&self, id: BarrierId) -> Option<(&Vec<IntervalMap<BarrierState>>, usize)> {
        match id {
            BarrierId::Horizontal { gap_row, col } => {
                Some((&self.horizontal, gap_row as usize * self.width as usize + col as usize))
            }
            BarrierId::Vertical { row, gap_col } => {
                Some((&self.vertical, row as usize * (self.width.saturating_sub(1)) as usize + gap_col as usize))
            }
        }
    }

    fn edges_for(&self, gate: &Gate, state: &CrossbarState) -> CompileResult<Vec<(BarrierId, bool)>> {
        if let Some(delta) = direction_from_name(&gate.name) {
            let site = gate.site_operands().next().map(|s| s.0).ok_or_else(|| CompileError::IllegalState {
                component: "BarrierResource",
                message: format!("mover '{}' has no site operand", gate.name),
            })?;
            let pos = state.get_pos_by_site(site);
            return Ok(cell_edges(self.height, self.width, pos, Some(delta)));
        }

        match gate.instr_type {
            InstrType::SingleQubitGate if !is_combined_shuttle(&gate.name) => {
                // Global-wave pulse: every barrier raised for the pulse window.
                let mut edges = Vec::new();
                for gap_row in 0..self.height.saturating_sub(1) {
                    for col in 0..self.width {
                        edges.push((BarrierId::Horizontal { gap_row, col }, false));
                    }
                }
                for row in 0..self.height {
                    for gap_col in 0..self.width.saturating_sub(1) {
                        edges.push((BarrierId::Vertical { row, gap_col }, false));
                    }
                }
                Ok(edges)
            }
            InstrType::TwoQubitGate => {
                let sites: Vec<u32> = gate.site_operands().map(|s| s.0).collect();
                let &[a, b] = sites.as_slice() else {
                    return Err(CompileError::IllegalState {
                        component: "BarrierResource",
                        message: format!("two-qubit gate '{}' must have exactly two site operands", gate.name),
                    });
                };
                between(self.height, self.width, state, a, b)
            }
            InstrType::MeasurementGate => {
                let sites: Vec<u32> = gate.site_operands().map(|s| s.0).collect();
                let &[data, ancilla] = sites.as_slice() else {
                    return Err(CompileError::IllegalState {
                        component: "BarrierResource",
                        message: format!("measurement '{}' must have exactly two site operands", gate.name),
                    });
                };
                between(self.height, self.width, state, data, ancilla)
            }
            _ => Ok(Vec::new()),
        }
    }
}

impl Resource for BarrierResource {
    fn available(&self, start_cycle: u64, gate: &Gate, state: &CrossbarState, duration: u64, _forward: bool) -> CompileResult<bool> {
        let edges = self.edges_for(gate, state)?;
        let lo = start_cycle as i64;
        let hi = lo + duration as i64;
        for (id, lowered) in edges {
            let wanted = if lowered { BarrierState::Lowered } else { BarrierState::Raised };
            if let Some((bank, index)) = self.slot(id) {
                if let Some(map) = bank.get(index) {
                    let conflicting = map.find_overlapping(lo, hi, false).into_iter().any(|&existing| existing != wanted);
                    if conflicting {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    fn reserve(&mut self, start_cycle: u64, gate: &Gate, state: &CrossbarState, duration: u64, _forward: bool) -> CompileResult<()> {
        let edges = self.edges_for(gate, state)?;
        let lo = start_cycle as i64;
        let hi = lo + duration as i64;
        for (id, lowered) in edges {
            let wanted = if lowered { BarrierState::Lowered } else { BarrierState::Raised };
            let slot = match id {
                BarrierId::Horizontal { gap_row, col } => {
                    let idx = gap_row as usize * self.width as usize + col as usize;
                    self.horizontal.get_mut(idx)
                }
                BarrierId::Vertical { row, gap_col } => {
                    let idx = row as usize * (self.width.saturating_sub(1)) as usize + gap_col as usize;
                    self.vertical.get_mut(idx)
                }
            };
            if let Some(map) = slot {
                map.insert(lo, hi, wanted);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xbar_ir::{Operand, QubitId, SiteIndex};

    fn grid() -> CrossbarState {
        let mut state = CrossbarState::new(3, 3);
        state.add_qubit(1, 1, QubitId(0), false).unwrap();
        state
    }

    #[test]
    fn test_shuttle_lowers_in_between_raises_borders() {
        let state = grid();
        let mut resource = BarrierResource::new(3, 3);
        let right = Gate::new(
            "shuttle_right",
            vec![Operand::Site(SiteIndex(state.site_index((1, 1))))],
            vec![],
            20.0,
            "shuttle",
            "none",
            InstrType::Shuttle,
        );
        assert!(resource.available(0, &right, &state, 1, true).unwrap());
        resource.reserve(0, &right, &state, 1, true).unwrap();

        // A concurrent shuttle_up from the same cell wants its own
        // transverse barrier lowered but raises the very barrier
        // `right` just lowered (it's one of its three border edges).
        let up = Gate::new(
            "shuttle_up",
            vec![Operand::Site(SiteIndex(state.site_index((1, 1))))],
            vec![],
            20.0,
            "shuttle",
            "none",
            InstrType::Shuttle,
        );
        assert!(!resource.available(0, &up, &state, 1, true).unwrap());

        // Re-requesting the same `right` move at an overlapping cycle is
        // compatible (same barrier states requested).
        assert!(resource.available(0, &right, &state, 1, true).unwrap());
    }

    #[test]
    fn test_global_wave_raises_every_barrier() {
        let state = grid();
        let resource = BarrierResource::new(3, 3);
        let gate = Gate::new(
            "wave",
            vec![Operand::Site(SiteIndex(state.site_index((1, 1))))],
            vec![],
            100.0,
            "wave",
            "mw",
            InstrType::SingleQubitGate,
        );
        assert!(resource.available(0, &gate, &state, 5, true).unwrap());
    }

    #[test]
    fn test_two_qubit_requires_adjacency() {
        let state = grid();
        let resource = BarrierResource::new(3, 3);
        let gate = Gate::new(
            "cz",
            vec![Operand::Site(SiteIndex(0)), Operand::Site(SiteIndex(8))],
            vec![],
            40.0,
            "cz",
            "flux",
            InstrType::TwoQubitGate,
        );
        assert!(resource.available(0, &gate, &state, 2, true).is_err());
    }
}
