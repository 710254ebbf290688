//! The composite resource manager (C6, §4.6): independent sub-resources
//! that each answer `available`/`reserve` for one physical constraint,
//! plus the [`StateTimeline`] update shuttle/swap primitives trigger.

pub mod barriers;
pub mod qubit_lines;
pub mod sites;
pub mod wave;

pub use barriers::BarrierResource;
pub use qubit_lines::QubitLineResource;
pub use sites::SiteResource;
pub use wave::WaveResource;

use tracing::{debug, instrument};

use xbar_hal::ResourceSettings;
use xbar_ir::{Gate, InstrType};

use crate::crossbar::CrossbarState;
use crate::error::{CompileError, CompileResult};
use crate::timeline::StateTimeline;

/// The direction a shuttle-like primitive moves, decoded from its name
/// suffix (`_up`/`_down`/`_left`/`_right`). Shared by [`sites`] and
/// [`barriers`] since both need to tell a primitive's origin from its
/// destination.
pub(crate) fn direction_from_name(name: &str) -> Option<(i32, i32)> {
    if name.ends_with("_up") {
        Some((1, 0))
    } else if name.ends_with("_down") {
        Some((-1, 0))
    } else if name.ends_with("_left") {
        Some((0, -1))
    } else if name.ends_with("_right") {
        Some((0, 1))
    } else {
        None
    }
}

/// Whether `name` is a z-family combined rotation-and-shuttle primitive
/// (e.g. `z_shuttle_left`), which moves its qubit the same way an
/// elementary `shuttle_*` primitive does even though its
/// [`xbar_ir::InstrType`] tag is `SingleQubitGate` rather than `Shuttle`.
pub(crate) fn is_combined_shuttle(name: &str) -> bool {
    name.contains("_shuttle_")
}

fn only_site(gate: &Gate) -> CompileResult<u32> {
    gate.site_operands().next().map(|s| s.0).ok_or_else(|| CompileError::IllegalState {
        component: "ResourceManager",
        message: format!("gate '{}' has no site operand", gate.name),
    })
}

/// A mover's pre- and post-move site, decoded from its name and its
/// pre-move position in `state`.
pub(crate) fn mover_sites(gate: &Gate, state: &CrossbarState) -> CompileResult<Option<(u32, u32)>> {
    let Some(delta) = direction_from_name(&gate.name) else {
        return Ok(None);
    };
    let origin = only_site(gate)?;
    let pos = state.get_pos_by_site(origin);
    let dest_row = (i64::from(pos.0) + i64::from(delta.0)) as u32;
    let dest_col = (i64::from(pos.1) + i64::from(delta.1)) as u32;
    let destination = state.site_index((dest_row, dest_col));
    Ok(Some((origin, destination)))
}

/// The two operand sites of a two-qubit or measurement gate, for the
/// gate kinds where [`mover_sites`] doesn't apply.
pub(crate) fn paired_sites_of(gate: &Gate) -> Option<(u32, u32)> {
    let mut it = gate.site_operands();
    let a = it.next()?.0;
    let b = it.next()?.0;
    Some((a, b))
}

/// One sub-resource of the composite manager (§4.6).
pub trait Resource {
    fn available(&self, start_cycle: u64, gate: &Gate, state: &CrossbarState, duration: u64, forward: bool) -> CompileResult<bool>;
    fn reserve(&mut self, start_cycle: u64, gate: &Gate, state: &CrossbarState, duration: u64, forward: bool) -> CompileResult<()>;
}

/// The composite resource manager: every sub-resource plus the
/// [`StateTimeline`] they collectively keep in sync.
pub struct ResourceManager {
    pub sites: SiteResource,
    pub barriers: BarrierResource,
    pub qubit_lines: QubitLineResource,
    pub wave: WaveResource,
    pub timeline: StateTimeline,
    forward: bool,
    /// Fixed window sizes (§4.6.2, §4.6.4) a global wave pulse and its
    /// separating shuttle reserve against `barriers`/`wave`/`sites`,
    /// independent of the gate's own declared instruction duration.
    wave_duration_cycles: u64,
    shuttle_duration_cycles: u64,
}

impl ResourceManager {
    #[must_use]
    pub fn new(height: u32, width: u32, initial_state: CrossbarState, forward: bool, resources: ResourceSettings) -> Self {
        Self {
            sites: SiteResource::new(),
            barriers: BarrierResource::new(height, width),
            qubit_lines: QubitLineResource::new(),
            wave: WaveResource::new(),
            timeline: StateTimeline::new(initial_state),
            forward,
            wave_duration_cycles: resources.wave_duration_cycles,
            shuttle_duration_cycles: resources.shuttle_duration_cycles,
        }
    }

    /// The window size to reserve `gate` for: `WAVE_DURATION_CYCLES` for
    /// a global wave pulse, `SHUTTLE_DURATION_CYCLE` for a shuttle move,
    /// otherwise the caller-supplied, instruction-duration-derived
    /// `scheduled_duration` (§4.6.2, §4.6.4, §9's design note).
    fn effective_duration(&self, gate: &Gate, scheduled_duration: u64) -> u64 {
        if matches!(gate.instr_type, InstrType::SingleQubitGate) && !is_combined_shuttle(&gate.name) {
            self.wave_duration_cycles
        } else if matches!(gate.instr_type, InstrType::Shuttle) {
            self.shuttle_duration_cycles
        } else {
            scheduled_duration
        }
    }

    /// Whether `gate` is schedulable at `start_cycle` — every
    /// sub-resource must agree.
    #[instrument(skip(self, gate), fields(gate = %gate.name, start_cycle))]
    pub fn available(&self, start_cycle: u64, gate: &Gate, duration: u64) -> CompileResult<bool> {
        let duration = self.effective_duration(gate, duration);
        let state = self.timeline.snapshot_at(start_cycle);
        let ok = self.sites.available(start_cycle, gate, state, duration, self.forward)?
            && self.barriers.available(start_cycle, gate, state, duration, self.forward)?
            && self.qubit_lines.available(start_cycle, gate, state, duration, self.forward)?
            && self.wave.available(start_cycle, gate, state, duration, self.forward)?;
        debug!(available = ok, "resource availability check");
        Ok(ok)
    }

    /// Commit `gate` at `start_cycle`: reserve it against every
    /// sub-resource and, if it is a shuttle-like mover, advance the
    /// `StateTimeline`.
    pub fn reserve(&mut self, start_cycle: u64, gate: &Gate, duration: u64) -> CompileResult<()> {
        let duration = self.effective_duration(gate, duration);
        let state = self.timeline.snapshot_at(start_cycle).clone();
        self.sites.reserve(start_cycle, gate, &state, duration, self.forward)?;
        self.barriers.reserve(start_cycle, gate, &state, duration, self.forward)?;
        self.qubit_lines.reserve(start_cycle, gate, &state, duration, self.forward)?;
        self.wave.reserve(start_cycle, gate, &state, duration, self.forward)?;

        if let Some((origin, _destination)) = mover_sites(gate, &state)? {
            let Some(delta) = direction_from_name(&gate.name) else {
                unreachable!("mover_sites only returns Some when direction_from_name does");
            };
            let pos = state.get_pos_by_site(origin);
            let q = state.occupants_at(pos).first().copied().ok_or_else(|| CompileError::IllegalState {
                component: "ResourceManager",
                message: format!("no qubit occupies site {origin} for mover '{}'", gate.name),
            })?;
            let mut new_state = state.clone();
            match delta {
                (1, 0) => new_state.shuttle_up(q)?,
                (-1, 0) => new_state.shuttle_down(q)?,
                (0, -1) => new_state.shuttle_left(q)?,
                (0, 1) => new_state.shuttle_right(q)?,
                _ => unreachable!("direction_from_name only returns unit deltas"),
            }
            self.timeline.commit(start_cycle + duration, new_state);
        }
        Ok(())
    }

    #[must_use]
    pub fn qubit_at(state: &CrossbarState, site: u32) -> Option<xbar_ir::QubitId> {
        let pos = state.get_pos_by_site(site);
        state.occupants_at(pos).first().copied()
    }
}
