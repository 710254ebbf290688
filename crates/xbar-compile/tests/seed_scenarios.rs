//! End-to-end seed scenarios (§8): one test per named case, exercised
//! through the full `KernelCompiler` pipeline.

use serde_json::json;

use xbar_compile::{CompileError, KernelCompiler};
use xbar_hal::PlatformDescription;
use xbar_ir::{Circuit, QubitId, SourceGate};

fn platform(extra_instructions: serde_json::Value, x_size: u32, y_size: u32, init: serde_json::Value) -> PlatformDescription {
    let mut instruction_settings = json!({
        "shuttle_up": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
        "shuttle_down": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
        "shuttle_left": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
        "shuttle_right": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
    });
    for (k, v) in extra_instructions.as_object().unwrap() {
        instruction_settings[k] = v.clone();
    }
    let value = json!({
        "qubit_number": 9,
        "cycle_time": 20.0,
        "topology": { "x_size": x_size, "y_size": y_size, "init_configuration": init },
        "instruction_settings": instruction_settings,
        "resources": {"wave": {"wave_duration": 4}},
    });
    PlatformDescription::from_json(&value).unwrap()
}

#[test]
fn test_scenario_1_both_neighbours_occupied_is_illegal_state() {
    let platform = platform(
        json!({}),
        2,
        2,
        json!({"0": {"type": "data", "position": [0, 0]}, "1": {"type": "data", "position": [0, 1]}}),
    );
    let mut circuit = Circuit::with_size("k", 2, 0);
    circuit.push(SourceGate::single("x", QubitId(0))).unwrap();

    let compiler = KernelCompiler::new(&platform);
    let err = compiler.compile(&circuit).unwrap_err();
    assert!(matches!(err, CompileError::IllegalState { .. }));
}

#[test]
fn test_scenario_2_global_wave_emits_three_bundles() {
    let platform = platform(
        json!({"x": {"duration": 40.0, "type": "mw", "cc_light_instr_type": "single_qubit_gate"}}),
        2,
        2,
        json!({"0": {"type": "data", "position": [0, 0]}}),
    );
    let mut circuit = Circuit::with_size("k", 1, 0);
    circuit.push(SourceGate::single("x", QubitId(0))).unwrap();

    let compiler = KernelCompiler::new(&platform);
    let compiled = compiler.compile(&circuit).unwrap();
    assert_eq!(compiled.bundles.len(), 3);
}

#[test]
fn test_scenario_3_swap_exchanges_positions() {
    let platform = platform(
        json!({}),
        3,
        3,
        json!({"0": {"type": "data", "position": [0, 0]}, "1": {"type": "data", "position": [0, 2]}}),
    );
    let mut circuit = Circuit::with_size("k", 2, 0);
    circuit.push(SourceGate::two_qubit("swap", QubitId(0), QubitId(1))).unwrap();

    let compiler = KernelCompiler::new(&platform);
    let compiled = compiler.compile(&circuit).unwrap();
    assert!(!compiled.bundles.is_empty());
}

#[test]
fn test_scenario_4_cz_adjacent_no_shuttles() {
    let platform = platform(
        json!({"cz": {"duration": 40.0, "type": "flux", "cc_light_instr_type": "two_qubit_gate"}}),
        2,
        2,
        json!({"0": {"type": "data", "position": [0, 0]}, "1": {"type": "data", "position": [0, 1]}}),
    );
    let mut circuit = Circuit::with_size("k", 2, 0);
    circuit.push(SourceGate::two_qubit("cz", QubitId(0), QubitId(1))).unwrap();

    let compiler = KernelCompiler::new(&platform);
    let compiled = compiler.compile(&circuit).unwrap();
    assert_eq!(compiled.bundles.len(), 1);
    assert_eq!(compiled.bundles[0].parallel_sections.len(), 1);
    assert_eq!(compiled.bundles[0].parallel_sections[0].gates.len(), 1);
    assert_eq!(compiled.bundles[0].parallel_sections[0].gates[0].name, "cz");
}

#[test]
fn test_scenario_5_barrier_resource_forces_separate_bundles() {
    let platform = platform(
        json!({
            "cz": {"duration": 40.0, "type": "flux", "cc_light_instr_type": "two_qubit_gate"},
            "sqswap": {"duration": 40.0, "type": "flux", "cc_light_instr_type": "two_qubit_gate"},
        }),
        3,
        3,
        json!({
            "0": {"type": "data", "position": [0, 0]},
            "1": {"type": "data", "position": [0, 1]},
            "2": {"type": "data", "position": [1, 0]},
        }),
    );
    let mut circuit = Circuit::with_size("k", 3, 0);
    circuit.push(SourceGate::two_qubit("cz", QubitId(0), QubitId(1))).unwrap();
    circuit.push(SourceGate::two_qubit("sqswap", QubitId(0), QubitId(2))).unwrap();

    let compiler = KernelCompiler::new(&platform);
    let compiled = compiler.compile(&circuit).unwrap();

    let cz_cycle = compiled
        .bundles
        .iter()
        .find(|b| b.parallel_sections.iter().any(|s| s.gates.iter().any(|g| g.name == "cz")))
        .map(|b| b.start_cycle);
    let sqswap_cycle = compiled
        .bundles
        .iter()
        .find(|b| b.parallel_sections.iter().any(|s| s.gates.iter().any(|g| g.name == "sqswap")))
        .map(|b| b.start_cycle);
    assert!(cz_cycle.is_some() && sqswap_cycle.is_some());
    assert_ne!(cz_cycle, sqswap_cycle, "cz and sqswap sharing q0's barriers must land in separate bundles");
}

#[test]
fn test_scenario_6_global_wave_returns_to_origin() {
    let platform = platform(
        json!({"h": {"duration": 40.0, "type": "mw", "cc_light_instr_type": "single_qubit_gate"}}),
        3,
        3,
        json!({"0": {"type": "data", "position": [1, 1]}}),
    );
    let mut circuit = Circuit::with_size("k", 1, 0);
    circuit.push(SourceGate::single("h", QubitId(0))).unwrap();

    let compiler = KernelCompiler::new(&platform);
    let compiled = compiler.compile(&circuit).unwrap();
    assert!(!compiled.bundles.is_empty());
    assert!(compiled.assembly.contains("# Total depth:"));
}
