//! `SiteResource` (§4.6.1): per-site occupancy-interval reservations.

use rustc_hash::FxHashMap;

use xbar_ir::{Gate, InstrType};

use super::{is_combined_shuttle, mover_sites, Resource};
use crate::crossbar::CrossbarState;
use crate::error::{CompileError, CompileResult};
use crate::interval_map::IntervalMap;

/// The sites one gate reservation touches: the moving pair (for
/// shuttle-like primitives) plus whatever ancillary sites its primitive
/// kind additionally reserves (§4.6.1).
#[derive(Debug, Default)]
struct Footprint {
    mover: Option<(u32, u32)>,
    extra: Vec<u32>,
}

impl Footprint {
    fn all_sites(&self) -> Vec<u32> {
        let mut sites = Vec::new();
        if let Some((origin, destination)) = self.mover {
            sites.push(origin);
            sites.push(destination);
        }
        sites.extend(self.extra.iter().copied());
        sites
    }
}

fn footprint(gate: &Gate, state: &CrossbarState) -> CompileResult<Footprint> {
    if let Some(mover) = mover_sites(gate, state)? {
        return Ok(Footprint { mover: Some(mover), extra: vec![] });
    }

    match gate.instr_type {
        InstrType::SingleQubitGate if !is_combined_shuttle(&gate.name) => {
            // A pure global-wave pulse: origin + adjacent empty site,
            // left if free else right (§4.6.1).
            let origin = gate.site_operands().next().map(|s| s.0).ok_or_else(|| CompileError::IllegalState {
                component: "SiteResource",
                message: format!("wave pulse '{}' has no site operand", gate.name),
            })?;
            let pos = state.get_pos_by_site(origin);
            let adjacent = if pos.1 > 0 && state.occupants_at((pos.0, pos.1 - 1)).is_empty() {
                state.site_index((pos.0, pos.1 - 1))
            } else {
                state.site_index((pos.0, pos.1 + 1))
            };
            Ok(Footprint { mover: None, extra: vec![origin, adjacent] })
        }
        InstrType::TwoQubitGate => {
            let sites: Vec<u32> = gate.site_operands().map(|s| s.0).collect();
            Ok(Footprint { mover: None, extra: sites })
        }
        InstrType::MeasurementGate => {
            let sites: Vec<u32> = gate.site_operands().map(|s| s.0).collect();
            let &[data, ancilla] = sites.as_slice() else {
                return Err(CompileError::IllegalState {
                    component: "SiteResource",
                    message: format!("measurement '{}' must have exactly two site operands", gate.name),
                });
            };
            let ancilla_pos = state.get_pos_by_site(ancilla);
            let perpendicular = if ancilla_pos.0 + 1 < state.get_y_size() {
                state.site_index((ancilla_pos.0 + 1, ancilla_pos.1))
            } else {
                state.site_index((ancilla_pos.0 - 1, ancilla_pos.1))
            };
            Ok(Footprint { mover: None, extra: vec![data, ancilla, perpendicular] })
        }
        _ => Ok(Footprint::default()),
    }
}

/// Per-site `IntervalMap` of reservations, checked against `CrossbarState`
/// occupancy at request time.
#[derive(Debug, Default)]
pub struct SiteResource {
    reservations: FxHashMap<u32, IntervalMap<u32>>,
}

impl SiteResource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Resource for SiteResource {
    fn available(&self, start_cycle: u64, gate: &Gate, state: &CrossbarState, duration: u64, forward: bool) -> CompileResult<bool> {
        let footprint = footprint(gate, state)?;
        let lo = start_cycle as i64;
        let hi = lo + duration as i64;

        for site in footprint.all_sites() {
            if self.reservations.get(&site).is_some_and(|m| m.overlaps(lo, hi)) {
                return Ok(false);
            }
        }

        if let Some((origin, destination)) = footprint.mover {
            let origin_occupied = !state.occupants_at(state.get_pos_by_site(origin)).is_empty();
            let destination_occupied = !state.occupants_at(state.get_pos_by_site(destination)).is_empty();
            let ok = if forward {
                origin_occupied && !destination_occupied
            } else {
                !origin_occupied && destination_occupied
            };
            if !ok {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn reserve(&mut self, start_cycle: u64, gate: &Gate, state: &CrossbarState, duration: u64, _forward: bool) -> CompileResult<()> {
        let footprint = footprint(gate, state)?;
        let lo = start_cycle as i64;
        let hi = lo + duration as i64;
        for site in footprint.all_sites() {
            self.reservations.entry(site).or_default().insert(lo, hi, site);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xbar_ir::{Operand, QubitId, SiteIndex};

    fn grid() -> CrossbarState {
        let mut state = CrossbarState::new(2, 3);
        state.add_qubit(0, 0, QubitId(0), false).unwrap();
        state
    }

    fn shuttle_right_gate() -> Gate {
        Gate::new("shuttle_right", vec![Operand::Site(SiteIndex(0))], vec![], 20.0, "shuttle", "none", InstrType::Shuttle)
    }

    #[test]
    fn test_forward_shuttle_requires_origin_occupied_destination_free() {
        let state = grid();
        let resource = SiteResource::new();
        let gate = shuttle_right_gate();
        assert!(resource.available(0, &gate, &state, 1, true).unwrap());
    }

    #[test]
    fn test_backward_shuttle_requires_mirrored_occupancy() {
        let state = grid();
        let resource = SiteResource::new();
        let gate = shuttle_right_gate();
        // backward: origin(0) must be free, destination(1) occupied -- neither holds here
        assert!(!resource.available(0, &gate, &state, 1, false).unwrap());
    }

    #[test]
    fn test_overlapping_reservation_blocks_second_use() {
        let state = grid();
        let mut resource = SiteResource::new();
        let gate = shuttle_right_gate();
        resource.reserve(0, &gate, &state, 5, true).unwrap();
        assert!(!resource.available(2, &gate, &state, 3, true).unwrap());
        assert!(resource.available(5, &gate, &state, 3, true).unwrap());
    }
}
