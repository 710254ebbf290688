//! `WaveResource` (§4.6.4): a single global IntervalMap keyed by
//! operation name — concurrent single-qubit global gates must all be
//! the same rotation to share a wave window.

use xbar_ir::{Gate, InstrType};

use super::{is_combined_shuttle, Resource};
use crate::crossbar::CrossbarState;
use crate::error::CompileResult;
use crate::interval_map::IntervalMap;

/// Global IntervalMap of `(start, end) -> rotation name`; two
/// overlapping reservations conflict iff their names differ.
#[derive(Debug, Default)]
pub struct WaveResource {
    reservations: IntervalMap<String>,
}

impl WaveResource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn is_wave_pulse(gate: &Gate) -> bool {
        matches!(gate.instr_type, InstrType::SingleQubitGate) && !is_combined_shuttle(&gate.name)
    }
}

impl Resource for WaveResource {
    fn available(&self, start_cycle: u64, gate: &Gate, _state: &CrossbarState, duration: u64, _forward: bool) -> CompileResult<bool> {
        if !Self::is_wave_pulse(gate) {
            return Ok(true);
        }
        let lo = start_cycle as i64;
        let hi = lo + duration as i64;
        Ok(self.reservations.find_overlapping(lo, hi, false).into_iter().all(|name| name == &gate.name))
    }

    fn reserve(&mut self, start_cycle: u64, gate: &Gate, _state: &CrossbarState, duration: u64, _forward: bool) -> CompileResult<()> {
        if !Self::is_wave_pulse(gate) {
            return Ok(());
        }
        let lo = start_cycle as i64;
        let hi = lo + duration as i64;
        self.reservations.insert(lo, hi, gate.name.clone());
        Ok(())
    }
}
