//! `QubitLineResource` (§4.6.3): the `2W−1` global control lines indexed
//! by `col − row`, and the voltage/signal conditions moves and native
//! gates impose on them.

use xbar_ir::{Gate, InstrType};

use super::{direction_from_name, paired_sites_of, Resource};
use crate::crossbar::CrossbarState;
use crate::error::CompileResult;
use crate::interval_map::IntervalMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    Voltage,
    Signal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Less,
    Equal,
}

/// A condition installed on the qubit lines through two grid positions
/// (§4.6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub a: (u32, u32),
    pub b: (u32, u32),
    pub mode: LineMode,
    pub comparator: Comparator,
}

impl Condition {
    fn line(pos: (u32, u32)) -> i64 {
        i64::from(pos.1) - i64::from(pos.0)
    }

    fn lines(&self) -> (i64, i64) {
        (Self::line(self.a), Self::line(self.b))
    }

    fn same_pair(&self, other: &Condition) -> bool {
        let (a1, b1) = self.lines();
        let (a2, b2) = other.lines();
        (a1 == a2 && b1 == b2) || (a1 == b2 && b1 == a2)
    }

    fn shares_a_line(&self, other: &Condition) -> bool {
        let (a1, b1) = self.lines();
        let (a2, b2) = other.lines();
        a1 == a2 || a1 == b2 || b1 == a2 || b1 == b2
    }
}

/// Whether `candidate` conflicts with an already-reserved `existing`
/// condition (§4.6.3's conflict table).
fn conflicts(candidate: &Condition, existing: &Condition) -> bool {
    if !candidate.shares_a_line(existing) {
        return false;
    }
    if candidate.mode != existing.mode {
        return true;
    }
    match candidate.mode {
        LineMode::Signal => true,
        LineMode::Voltage => match (candidate.comparator, existing.comparator) {
            (Comparator::Equal, Comparator::Equal) => false,
            (Comparator::Less, Comparator::Less) => {
                candidate.same_pair(existing) && candidate.lines() != existing.lines()
            }
            _ => true,
        },
    }
}

/// Isolated qubits sharing the mover's row or column induce a
/// `voltage/less` condition between the mover and themselves (§4.6.3).
/// "Isolated" here means no other qubit occupies an immediately
/// adjacent cell.
fn induced_conditions(state: &CrossbarState, mover_pos: (u32, u32)) -> Vec<Condition> {
    let mut out = Vec::new();
    for q in state.qubits() {
        let Some(pos) = state.position_of(q) else { continue };
        if pos == mover_pos {
            continue;
        }
        let same_row = pos.0 == mover_pos.0;
        let same_col = pos.1 == mover_pos.1;
        if !same_row && !same_col {
            continue;
        }
        let isolated = [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)].iter().all(|&(dr, dc)| {
            let r = i64::from(pos.0) + i64::from(dr);
            let c = i64::from(pos.1) + i64::from(dc);
            if r < 0 || c < 0 {
                return true;
            }
            state.occupants_at((r as u32, c as u32)).is_empty()
        });
        if isolated {
            out.push(Condition {
                a: mover_pos,
                b: pos,
                mode: LineMode::Voltage,
                comparator: Comparator::Less,
            });
        }
    }
    out
}

fn conditions_for(gate: &Gate, state: &CrossbarState) -> CompileResult<Vec<(Condition, bool)>> {
    if let Some(delta) = direction_from_name(&gate.name) {
        let site = gate.site_operands().next().map(|s| s.0);
        let Some(site) = site else { return Ok(Vec::new()) };
        let origin = state.get_pos_by_site(site);
        let dest_row = (i64::from(origin.0) + i64::from(delta.0)) as u32;
        let dest_col = (i64::from(origin.1) + i64::from(delta.1)) as u32;
        let destination = (dest_row, dest_col);
        let mut conditions = vec![(
            Condition { a: origin, b: destination, mode: LineMode::Signal, comparator: Comparator::Less },
            true,
        )];
        conditions.extend(induced_conditions(state, origin).into_iter().map(|c| (c, false)));
        return Ok(conditions);
    }

    match gate.instr_type {
        InstrType::TwoQubitGate | InstrType::MeasurementGate => {
            if let Some((a, b)) = paired_sites_of(gate) {
                let pos_a = state.get_pos_by_site(a);
                let pos_b = state.get_pos_by_site(b);
                return Ok(vec![(
                    Condition { a: pos_a, b: pos_b, mode: LineMode::Voltage, comparator: Comparator::Equal },
                    true,
                )]);
            }
            Ok(Vec::new())
        }
        _ => Ok(Vec::new()),
    }
}

/// One global IntervalMap of `(Condition, owned)` reservations — owned
/// marks a condition installed directly by a two-qubit/measurement
/// gate on exactly its two operand sites, as opposed to one induced by
/// an isolated bystander qubit.
#[derive(Debug, Default)]
pub struct QubitLineResource {
    reservations: IntervalMap<(Condition, bool)>,
}

impl QubitLineResource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Resource for QubitLineResource {
    fn available(&self, start_cycle: u64, gate: &Gate, state: &CrossbarState, duration: u64, _forward: bool) -> CompileResult<bool> {
        let conditions = conditions_for(gate, state)?;
        let lo = start_cycle as i64;
        let hi = lo + duration as i64;
        let overlapping: Vec<(Condition, bool)> =
            self.reservations.find_overlapping(lo, hi, false).into_iter().copied().collect();

        for (candidate, owned) in &conditions {
            for (existing, _) in &overlapping {
                if conflicts(candidate, existing) {
                    return Ok(false);
                }
            }
            if candidate.mode == LineMode::Voltage && candidate.comparator == Comparator::Equal && !owned {
                let vouching_owners: Vec<&Condition> = overlapping
                    .iter()
                    .filter(|(existing, existing_owned)| *existing_owned && candidate.shares_a_line(existing))
                    .map(|(existing, _)| existing)
                    .collect();
                // The ownership rule is only locally (pairwise) transitive: if
                // more than one distinct owned condition interacts with this
                // line, composing their resolutions isn't guaranteed sound, so
                // report a conflict rather than vouch.
                if vouching_owners.len() != 1 || !vouching_owners[0].same_pair(candidate) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn reserve(&mut self, start_cycle: u64, gate: &Gate, state: &CrossbarState, duration: u64, _forward: bool) -> CompileResult<()> {
        let conditions = conditions_for(gate, state)?;
        let lo = start_cycle as i64;
        let hi = lo + duration as i64;
        for entry in conditions {
            self.reservations.insert(lo, hi, entry);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xbar_ir::{Operand, QubitId, SiteIndex};

    #[test]
    fn test_voltage_equal_conditions_on_same_pair_never_conflict() {
        let a = Condition { a: (0, 0), b: (0, 1), mode: LineMode::Voltage, comparator: Comparator::Equal };
        let b = Condition { a: (0, 0), b: (0, 1), mode: LineMode::Voltage, comparator: Comparator::Equal };
        assert!(!conflicts(&a, &b));
    }

    #[test]
    fn test_swapped_less_conditions_conflict() {
        let less_ab = Condition { a: (0, 0), b: (0, 2), mode: LineMode::Voltage, comparator: Comparator::Less };
        let less_ba = Condition { a: (0, 2), b: (0, 0), mode: LineMode::Voltage, comparator: Comparator::Less };
        assert!(conflicts(&less_ab, &less_ba));
    }

    #[test]
    fn test_unowned_equal_condition_needs_a_vouching_owner() {
        let mut state = CrossbarState::new(2, 2);
        state.add_qubit(0, 0, QubitId(0), false).unwrap();
        let mut resource = QubitLineResource::new();

        let shuttle = Gate::new(
            "shuttle_right",
            vec![Operand::Site(SiteIndex(state.site_index((0, 0))))],
            vec![],
            20.0,
            "shuttle",
            "none",
            InstrType::Shuttle,
        );
        // No prior two-qubit gate vouches for anything; a bare shuttle
        // only installs a signal-mode condition, so it's unaffected by
        // the owner rule.
        assert!(resource.available(0, &shuttle, &state, 1, true).unwrap());
    }
}
