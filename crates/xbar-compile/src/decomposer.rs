//! The decomposer (C4, §4.4): rewrites high-level gates into the closed
//! primitive instruction set (shuttles, half-swaps, measurements,
//! single-qubit waves), executing each emitted shuttle against a
//! running [`CrossbarState`] so later decisions observe earlier moves.

use tracing::{debug, instrument};

use xbar_hal::{InstrTypeTag, InstructionSetting, PlatformDescription};
use xbar_ir::{Circuit, Direction, Gate, InstrType, Operand, QubitId, SiteIndex, SourceGate, SourceGateKind};

use crate::crossbar::CrossbarState;
use crate::error::{CompileError, CompileResult};

/// Rewrites a kernel's circuit into the primitive instruction set,
/// consulting the platform's instruction catalogue for durations and
/// resource metadata.
pub struct Decomposer<'a> {
    platform: &'a PlatformDescription,
}

impl<'a> Decomposer<'a> {
    #[must_use]
    pub fn new(platform: &'a PlatformDescription) -> Self {
        Self { platform }
    }

    /// Split `circuit` at every two-qubit gate so each sub-kernel holds
    /// at most one two-qubit gate (§4.4), simplifying the dependence and
    /// resource interactions the scheduler sees per sub-kernel.
    #[must_use]
    pub fn divide_into_subkernels(&self, circuit: &Circuit) -> Vec<Vec<SourceGate>> {
        let mut subkernels = vec![];
        let mut current: Vec<SourceGate> = vec![];
        for gate in circuit.gates() {
            let is_two_qubit = matches!(
                gate.kind(),
                SourceGateKind::SwapOrMove | SourceGateKind::SqSwap | SourceGateKind::Cz
            );
            if is_two_qubit {
                if !current.is_empty() {
                    subkernels.push(std::mem::take(&mut current));
                }
                subkernels.push(vec![gate.clone()]);
            } else {
                current.push(gate.clone());
            }
        }
        if !current.is_empty() {
            subkernels.push(current);
        }
        subkernels
    }

    /// Decompose `circuit` into a primitive gate list, mutating `state`
    /// in step with every emitted shuttle.
    #[instrument(skip(self, circuit, state), fields(gates = circuit.len()))]
    pub fn decompose(&self, circuit: &Circuit, state: &mut CrossbarState) -> CompileResult<Vec<Gate>> {
        let mut out = vec![];
        for gate in circuit.gates() {
            self.decompose_one(gate, state, &mut out)?;
        }
        debug!(primitives = out.len(), "decomposition complete");
        Ok(out)
    }

    fn decompose_one(
        &self,
        gate: &SourceGate,
        state: &mut CrossbarState,
        out: &mut Vec<Gate>,
    ) -> CompileResult<()> {
        match gate.kind() {
            SourceGateKind::SwapOrMove => {
                let a = gate.qubits[0];
                let b = gate.qubits[1];
                self.decompose_swap(a, b, state, out)
            }
            SourceGateKind::SqSwap => {
                self.decompose_two_qubit("sqswap", gate.qubits[0], gate.qubits[1], Axis::Horizontal, state, out)
            }
            SourceGateKind::Cz => {
                self.decompose_two_qubit("cz", gate.qubits[0], gate.qubits[1], Axis::Vertical, state, out)
            }
            SourceGateKind::DirectionalSingleQubit => {
                self.decompose_directional(gate, state, out)
            }
            SourceGateKind::ZFamilyRotation => self.decompose_z_family(gate, state, out),
            SourceGateKind::GlobalWave => self.decompose_global_wave(gate, state, out),
            SourceGateKind::Measure => self.decompose_measure(gate, state, out),
            SourceGateKind::Display | SourceGateKind::Classical => {
                self.decompose_passthrough(gate, state, out)
            }
        }
    }

    // -- swap/move ---------------------------------------------------

    fn decompose_swap(
        &self,
        a: QubitId,
        b: QubitId,
        state: &mut CrossbarState,
        out: &mut Vec<Gate>,
    ) -> CompileResult<()> {
        let pos_a = require_pos(state, a)?;
        let pos_b = require_pos(state, b)?;
        let dr = i64::from(pos_b.0) - i64::from(pos_a.0);
        let dc = i64::from(pos_b.1) - i64::from(pos_a.1);

        if dr != 0 && dc != 0 {
            // Rectangular case: route each qubit through the *other*
            // corner of the bounding box so their paths never cross.
            // b takes the horizontal leg first, then a; then b takes
            // the vertical leg, then a — by construction neither ever
            // steps onto a cell the other still occupies.
            self.shuttle_horizontal(b, dc.signum(), dc.unsigned_abs() as u32, state, out)?;
            self.shuttle_horizontal(a, dc.signum(), dc.unsigned_abs() as u32, state, out)?;
            self.shuttle_vertical(b, dr.signum(), dr.unsigned_abs() as u32, state, out)?;
            self.shuttle_vertical(a, dr.signum(), dr.unsigned_abs() as u32, state, out)?;
        } else if dr == 0 && dc != 0 {
            // Same row: detour b through an adjacent row so it can pass a.
            let detour = detour_row(state, pos_a.0)?;
            self.shuttle_vertical(b, (i64::from(detour) - i64::from(pos_a.0)).signum(), 1, state, out)?;
            self.shuttle_horizontal(b, -dc.signum(), dc.unsigned_abs() as u32, state, out)?;
            self.shuttle_horizontal(a, dc.signum(), dc.unsigned_abs() as u32, state, out)?;
            self.shuttle_vertical(b, (i64::from(pos_a.0) - i64::from(detour)).signum(), 1, state, out)?;
        } else if dc == 0 && dr != 0 {
            // Same column: detour b through an adjacent column.
            let detour = detour_col(state, pos_a.1)?;
            self.shuttle_horizontal(b, (i64::from(detour) - i64::from(pos_a.1)).signum(), 1, state, out)?;
            self.shuttle_vertical(b, -dr.signum(), dr.unsigned_abs() as u32, state, out)?;
            self.shuttle_vertical(a, dr.signum(), dr.unsigned_abs() as u32, state, out)?;
            self.shuttle_horizontal(b, (i64::from(pos_a.1) - i64::from(detour)).signum(), 1, state, out)?;
        }
        // dr == 0 && dc == 0 would mean a == b's position: unreachable
        // for distinct mapped qubits.
        Ok(())
    }

    fn shuttle_horizontal(
        &self,
        q: QubitId,
        sign: i64,
        steps: u32,
        state: &mut CrossbarState,
        out: &mut Vec<Gate>,
    ) -> CompileResult<()> {
        for _ in 0..steps {
            if sign > 0 {
                self.emit_shuttle("shuttle_right", q, state, out)?;
            } else {
                self.emit_shuttle("shuttle_left", q, state, out)?;
            }
        }
        Ok(())
    }

    fn shuttle_vertical(
        &self,
        q: QubitId,
        sign: i64,
        steps: u32,
        state: &mut CrossbarState,
        out: &mut Vec<Gate>,
    ) -> CompileResult<()> {
        for _ in 0..steps {
            if sign > 0 {
                self.emit_shuttle("shuttle_up", q, state, out)?;
            } else {
                self.emit_shuttle("shuttle_down", q, state, out)?;
            }
        }
        Ok(())
    }

    fn emit_shuttle(
        &self,
        name: &str,
        q: QubitId,
        state: &mut CrossbarState,
        out: &mut Vec<Gate>,
    ) -> CompileResult<()> {
        let setting = self.lookup(name)?;
        let site = site_of(state, q)?;
        let gate = build_gate(name, vec![Operand::Site(site)], vec![], setting);
        apply_shuttle(name, q, state)?;
        out.push(gate);
        Ok(())
    }

    // -- native two-qubit gates ---------------------------------------

    fn decompose_two_qubit(
        &self,
        name: &str,
        a: QubitId,
        b: QubitId,
        perpendicular: Axis,
        state: &mut CrossbarState,
        out: &mut Vec<Gate>,
    ) -> CompileResult<()> {
        let pos_a = require_pos(state, a)?;
        let pos_b = require_pos(state, b)?;
        let offset = match perpendicular {
            Axis::Horizontal => i64::from(pos_b.1) - i64::from(pos_a.1),
            Axis::Vertical => i64::from(pos_b.0) - i64::from(pos_a.0),
        };

        if offset != 0 {
            match perpendicular {
                Axis::Horizontal => {
                    self.shuttle_horizontal(b, -offset.signum(), offset.unsigned_abs() as u32, state, out)?
                }
                Axis::Vertical => {
                    self.shuttle_vertical(b, -offset.signum(), offset.unsigned_abs() as u32, state, out)?
                }
            }
        }

        let setting = self.lookup(name)?;
        let site_a = site_of(state, a)?;
        let site_b = site_of(state, b)?;
        out.push(build_gate(
            name,
            vec![Operand::Site(site_a), Operand::Site(site_b)],
            vec![],
            setting,
        ));

        if offset != 0 {
            match perpendicular {
                Axis::Horizontal => {
                    self.shuttle_horizontal(b, offset.signum(), offset.unsigned_abs() as u32, state, out)?
                }
                Axis::Vertical => {
                    self.shuttle_vertical(b, offset.signum(), offset.unsigned_abs() as u32, state, out)?
                }
            }
        }
        Ok(())
    }

    // -- single-qubit gates --------------------------------------------

    fn decompose_directional(
        &self,
        gate: &SourceGate,
        state: &mut CrossbarState,
        out: &mut Vec<Gate>,
    ) -> CompileResult<()> {
        let q = gate.qubits[0];
        let direction = gate.direction_suffix().ok_or_else(|| CompileError::IllegalState {
            component: "Decomposer",
            message: format!("'{}' classified as directional but has no _left/_right suffix", gate.name),
        })?;
        self.emit_directional_shuttle(direction, q, state, out)?;

        let setting = self.lookup(&gate.name)?;
        let site = site_of(state, q)?;
        out.push(build_gate(&gate.name, vec![Operand::Site(site)], vec![], setting));

        self.emit_directional_shuttle(direction.reverse(), q, state, out)?;
        Ok(())
    }

    fn decompose_z_family(
        &self,
        gate: &SourceGate,
        state: &mut CrossbarState,
        out: &mut Vec<Gate>,
    ) -> CompileResult<()> {
        let q = gate.qubits[0];
        let pos = require_pos(state, q)?;
        let direction = if pos.1 > 0 {
            Direction::Left
        } else {
            Direction::Right
        };
        let name = format!("{}_shuttle_{}", gate.name, direction_suffix(direction));
        let setting = self.lookup(&name)?;
        let site = site_of(state, q)?;
        let primitive = build_gate(&name, vec![Operand::Site(site)], vec![], setting);
        apply_shuttle(shuttle_name(direction), q, state)?;
        out.push(primitive);
        Ok(())
    }

    fn decompose_global_wave(
        &self,
        gate: &SourceGate,
        state: &mut CrossbarState,
        out: &mut Vec<Gate>,
    ) -> CompileResult<()> {
        let q = gate.qubits[0];
        let pos = require_pos(state, q)?;
        let left_empty = pos.1 > 0 && state.occupants_at((pos.0, pos.1 - 1)).is_empty();
        let direction = if left_empty {
            Direction::Left
        } else if pos.1 + 1 < state.get_x_size() && state.occupants_at((pos.0, pos.1 + 1)).is_empty() {
            Direction::Right
        } else {
            return Err(CompileError::IllegalState {
                component: "Decomposer",
                message: format!(
                    "both neighbours of qubit {q} are occupied; a global wave gate requires one empty adjacent site"
                ),
            });
        };
        let wave_setting = self.lookup(&gate.name)?;

        let site_before = site_of(state, q)?;
        out.push(build_gate(
            &gate.name,
            vec![Operand::Site(site_before)],
            vec![],
            wave_setting,
        ));

        self.emit_directional_shuttle(direction, q, state, out)?;

        let site_after = site_of(state, q)?;
        out.push(build_gate(&gate.name, vec![Operand::Site(site_after)], vec![], wave_setting));

        // Reproduces a quirk of the decomposition this is modeled on: whether
        // a return shuttle is appended is gated on `left_empty` — the flag
        // that chose the *outgoing* direction — rather than on any property
        // of the post-shuttle position. A wave gate that shuttled right
        // (because the left neighbour was occupied) never gets shuttled back.
        if left_empty {
            self.emit_directional_shuttle(direction.reverse(), q, state, out)?;
        }
        Ok(())
    }

    fn emit_directional_shuttle(
        &self,
        direction: Direction,
        q: QubitId,
        state: &mut CrossbarState,
        out: &mut Vec<Gate>,
    ) -> CompileResult<()> {
        let name = shuttle_name(direction);
        self.emit_shuttle(name, q, state, out)
    }

    // -- measurement -----------------------------------------------------

    fn decompose_measure(
        &self,
        gate: &SourceGate,
        state: &mut CrossbarState,
        out: &mut Vec<Gate>,
    ) -> CompileResult<()> {
        let data = gate.qubits[0];
        let ancilla = *gate.qubits.get(1).ok_or_else(|| CompileError::IllegalState {
            component: "Decomposer",
            message: format!("measure on {data} has no ancilla operand"),
        })?;
        let clbit = gate.clbits.first().copied();

        let pos_d = require_pos(state, data)?;
        let pos_a = require_pos(state, ancilla)?;

        let lr = if pos_a.1 < pos_d.1 { "left" } else { "right" };
        let ud = if pos_a.0 > pos_d.0 { "up" } else { "down" };
        let name = format!("measure_{lr}_{ud}");

        let col_offset = i64::from(pos_a.1) - i64::from(pos_d.1);
        if col_offset != 0 {
            self.shuttle_horizontal(ancilla, -col_offset.signum(), col_offset.unsigned_abs() as u32, state, out)?;
        }

        let setting = self.lookup(&name)?;
        let site_d = site_of(state, data)?;
        let site_a = site_of(state, ancilla)?;
        let mut primitive = build_gate(&name, vec![Operand::Site(site_d), Operand::Site(site_a)], clbit.into_iter().collect(), setting);
        primitive.instr_type = InstrType::MeasurementGate;
        out.push(primitive);

        if col_offset != 0 {
            self.shuttle_horizontal(ancilla, col_offset.signum(), col_offset.unsigned_abs() as u32, state, out)?;
        }
        Ok(())
    }

    // -- display / classical --------------------------------------------

    fn decompose_passthrough(
        &self,
        gate: &SourceGate,
        _state: &mut CrossbarState,
        out: &mut Vec<Gate>,
    ) -> CompileResult<()> {
        let fallback;
        let setting: &InstructionSetting = match self.lookup(&gate.name) {
            Ok(setting) => setting,
            Err(_) => {
                fallback = default_classical_setting();
                &fallback
            }
        };
        let operands = gate.qubits.iter().copied().map(Operand::Qubit).collect();
        let mut g = build_gate(&gate.name, operands, gate.clbits.clone(), setting);
        g.instr_type = InstrType::ClassicalGate;
        out.push(g);
        Ok(())
    }

    fn lookup(&self, name: &str) -> CompileResult<&InstructionSetting> {
        self.platform
            .instruction(name)
            .ok_or_else(|| CompileError::UnknownInstruction { name: name.to_string() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

fn direction_suffix(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => "left",
        Direction::Right => "right",
    }
}

fn shuttle_name(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => "shuttle_left",
        Direction::Right => "shuttle_right",
    }
}

fn apply_shuttle(name: &str, q: QubitId, state: &mut CrossbarState) -> CompileResult<()> {
    match name {
        "shuttle_up" => state.shuttle_up(q),
        "shuttle_down" => state.shuttle_down(q),
        "shuttle_left" => state.shuttle_left(q),
        "shuttle_right" => state.shuttle_right(q),
        other => Err(CompileError::IllegalState {
            component: "Decomposer",
            message: format!("'{other}' is not a shuttle primitive"),
        }),
    }
}

fn require_pos(state: &CrossbarState, q: QubitId) -> CompileResult<(u32, u32)> {
    state.position_of(q).ok_or_else(|| CompileError::IllegalState {
        component: "Decomposer",
        message: format!("qubit {q} has no position in the running crossbar state"),
    })
}

fn site_of(state: &CrossbarState, q: QubitId) -> CompileResult<SiteIndex> {
    let pos = require_pos(state, q)?;
    Ok(SiteIndex(state.site_index(pos)))
}


fn detour_row(state: &CrossbarState, row: u32) -> CompileResult<u32> {
    if row + 1 < state.get_y_size() {
        Ok(row + 1)
    } else if row > 0 {
        Ok(row - 1)
    } else {
        Err(CompileError::IllegalState {
            component: "Decomposer",
            message: "grid has no row to detour a same-row swap through".into(),
        })
    }
}

fn detour_col(state: &CrossbarState, col: u32) -> CompileResult<u32> {
    if col + 1 < state.get_x_size() {
        Ok(col + 1)
    } else if col > 0 {
        Ok(col - 1)
    } else {
        Err(CompileError::IllegalState {
            component: "Decomposer",
            message: "grid has no column to detour a same-column swap through".into(),
        })
    }
}

fn build_gate(
    name: &str,
    operands: Vec<Operand>,
    creg_operands: Vec<xbar_ir::ClbitId>,
    setting: &InstructionSetting,
) -> Gate {
    let mut g = Gate::new(
        name,
        operands,
        creg_operands,
        setting.duration_ns,
        setting.cc_light_instr.clone(),
        setting.buffer_type.clone(),
        instr_type_from_tag(setting.cc_light_instr_type),
    );
    g.latency_ns = setting.latency_ns;
    g
}

fn instr_type_from_tag(tag: InstrTypeTag) -> InstrType {
    match tag {
        InstrTypeTag::Shuttle => InstrType::Shuttle,
        InstrTypeTag::SingleQubitGate => InstrType::SingleQubitGate,
        InstrTypeTag::TwoQubitGate => InstrType::TwoQubitGate,
        InstrTypeTag::MeasurementGate => InstrType::MeasurementGate,
    }
}

fn default_classical_setting() -> InstructionSetting {
    InstructionSetting {
        duration_ns: 0.0,
        buffer_type: "none".into(),
        cc_light_instr: "classical".into(),
        cc_light_instr_type: InstrTypeTag::SingleQubitGate,
        latency_ns: 0.0,
        matrix: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use xbar_ir::ClbitId;

    fn platform_2x2() -> PlatformDescription {
        let value = json!({
            "qubit_number": 4,
            "cycle_time": 20.0,
            "topology": {
                "x_size": 2, "y_size": 2,
                "init_configuration": {
                    "0": {"type": "data", "position": [0, 0]},
                    "1": {"type": "data", "position": [0, 1]},
                }
            },
            "instruction_settings": {
                "shuttle_up": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
                "shuttle_down": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
                "shuttle_left": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
                "shuttle_right": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
                "x": {"duration": 40.0, "type": "mw", "cc_light_instr_type": "single_qubit_gate"},
                "cz": {"duration": 60.0, "type": "flux", "cc_light_instr_type": "two_qubit_gate"},
            },
            "resources": {"wave": {"wave_duration": 4}},
        });
        PlatformDescription::from_json(&value).unwrap()
    }

    #[test]
    fn test_seed_scenario_2_global_wave_three_bundles_worth_of_primitives() {
        let platform = platform_2x2();
        let mut state = CrossbarState::new(2, 2);
        state.add_qubit(0, 0, QubitId(0), false).unwrap();
        let circuit = {
            let mut c = Circuit::with_size("k", 1, 0);
            c.push(SourceGate::single("x", QubitId(0))).unwrap();
            c
        };
        let decomposer = Decomposer::new(&platform);
        let primitives = decomposer.decompose(&circuit, &mut state).unwrap();
        assert_eq!(primitives.len(), 3);
        assert!(primitives[0].is_two_qubit() == false && primitives[0].name == "x");
        assert!(primitives[1].is_shuttle());
        assert_eq!(primitives[2].name, "x");
    }

    #[test]
    fn test_seed_scenario_1_both_neighbours_occupied_is_illegal_state() {
        let platform = platform_2x2();
        let mut state = CrossbarState::new(2, 2);
        state.add_qubit(0, 0, QubitId(0), false).unwrap();
        state.add_qubit(0, 1, QubitId(1), false).unwrap();
        let circuit = {
            let mut c = Circuit::with_size("k", 2, 0);
            c.push(SourceGate::single("x", QubitId(0))).unwrap();
            c
        };
        let decomposer = Decomposer::new(&platform);
        let err = decomposer.decompose(&circuit, &mut state).unwrap_err();
        assert!(matches!(err, CompileError::IllegalState { .. }));
    }

    #[test]
    fn test_seed_scenario_4_cz_adjacent_no_shuttles() {
        let platform = platform_2x2();
        let mut state = CrossbarState::new(2, 2);
        state.add_qubit(0, 0, QubitId(0), false).unwrap();
        state.add_qubit(0, 1, QubitId(1), false).unwrap();
        let circuit = {
            let mut c = Circuit::with_size("k", 2, 0);
            c.push(SourceGate::two_qubit("cz", QubitId(0), QubitId(1))).unwrap();
            c
        };
        let decomposer = Decomposer::new(&platform);
        let primitives = decomposer.decompose(&circuit, &mut state).unwrap();
        assert_eq!(primitives.len(), 1);
        assert_eq!(primitives[0].name, "cz");
    }

    #[test]
    fn test_seed_scenario_3_swap_exchanges_positions() {
        let value = json!({
            "qubit_number": 9,
            "cycle_time": 20.0,
            "topology": {
                "x_size": 3, "y_size": 3,
                "init_configuration": {
                    "0": {"type": "data", "position": [0, 0]},
                    "1": {"type": "data", "position": [0, 2]},
                }
            },
            "instruction_settings": {
                "shuttle_up": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
                "shuttle_down": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
                "shuttle_left": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
                "shuttle_right": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
            },
        });
        let platform = PlatformDescription::from_json(&value).unwrap();
        let mut state = CrossbarState::new(3, 3);
        state.add_qubit(0, 0, QubitId(0), false).unwrap();
        state.add_qubit(0, 2, QubitId(1), false).unwrap();
        let circuit = {
            let mut c = Circuit::with_size("k", 2, 0);
            c.push(SourceGate::two_qubit("swap", QubitId(0), QubitId(1))).unwrap();
            c
        };
        let decomposer = Decomposer::new(&platform);
        decomposer.decompose(&circuit, &mut state).unwrap();
        assert_eq!(state.position_of(QubitId(0)), Some((0, 2)));
        assert_eq!(state.position_of(QubitId(1)), Some((0, 0)));
    }

    #[test]
    fn test_seed_scenario_6_global_wave_returns_to_origin_at_grid_center() {
        let value = json!({
            "qubit_number": 9,
            "cycle_time": 20.0,
            "topology": {
                "x_size": 3, "y_size": 3,
                "init_configuration": {
                    "0": {"type": "data", "position": [1, 1]},
                }
            },
            "instruction_settings": {
                "shuttle_up": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
                "shuttle_down": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
                "shuttle_left": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
                "shuttle_right": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
                "h": {"duration": 40.0, "type": "mw", "cc_light_instr_type": "single_qubit_gate"},
            },
            "resources": {"wave": {"wave_duration": 4}},
        });
        let platform = PlatformDescription::from_json(&value).unwrap();
        let mut state = CrossbarState::new(3, 3);
        state.add_qubit(1, 1, QubitId(0), false).unwrap();
        let circuit = {
            let mut c = Circuit::with_size("k", 1, 0);
            c.push(SourceGate::single("h", QubitId(0))).unwrap();
            c
        };
        let decomposer = Decomposer::new(&platform);
        let primitives = decomposer.decompose(&circuit, &mut state).unwrap();
        assert_eq!(primitives.len(), 4, "wave / shuttle / wave / shuttle-back");
        assert_eq!(state.position_of(QubitId(0)), Some((1, 1)));
    }

    #[test]
    fn test_divide_into_subkernels_splits_on_two_qubit_gates() {
        let mut c = Circuit::with_size("k", 3, 1);
        c.push(SourceGate::single("x", QubitId(0))).unwrap();
        c.push(SourceGate::two_qubit("cz", QubitId(0), QubitId(1))).unwrap();
        c.push(SourceGate::single("x", QubitId(2))).unwrap();
        c.push(SourceGate::measure(QubitId(2), None, Some(ClbitId(0))))
            .unwrap();

        let platform = platform_2x2();
        let decomposer = Decomposer::new(&platform);
        let subkernels = decomposer.divide_into_subkernels(&c);
        assert_eq!(subkernels.len(), 3);
        assert_eq!(subkernels[1].len(), 1);
        assert_eq!(subkernels[1][0].kind(), SourceGateKind::Cz);
    }
}
