//! `KernelCompiler`: the top-level orchestration driving a kernel's
//! circuit through Decomposer → DependenceGraph → Scheduler → Bundler
//! (§4.1's data flow).

use tracing::{debug, instrument};

use xbar_hal::{PlatformDescription, QubitKind};
use xbar_ir::Circuit;

use crate::bundler::{render_qasm, Bundle, Bundler};
use crate::crossbar::CrossbarState;
use crate::dependence::DependenceGraph;
use crate::decomposer::Decomposer;
use crate::error::{CompileError, CompileResult};
use crate::resources::ResourceManager;
use crate::scheduler::{apply_buffer_buffer_delays, ScheduleDirection, Scheduler};

/// Everything a compiled kernel produces: the final bundle list and its
/// rendered assembly text.
#[derive(Debug, Clone)]
pub struct CompiledKernel {
    pub bundles: Vec<Bundle>,
    pub assembly: String,
}

/// Drives one kernel's circuit through the full pipeline against a
/// given platform description.
pub struct KernelCompiler<'a> {
    platform: &'a PlatformDescription,
}

impl<'a> KernelCompiler<'a> {
    #[must_use]
    pub fn new(platform: &'a PlatformDescription) -> Self {
        Self { platform }
    }

    /// Build the crossbar state the platform's `topology.init_configuration`
    /// describes.
    pub fn initial_state(&self) -> CompileResult<CrossbarState> {
        let topology = &self.platform.topology;
        let mut state = CrossbarState::new(topology.y_size, topology.x_size);
        for (&qubit_id, placement) in &topology.init_configuration {
            let is_ancilla = matches!(placement.kind, QubitKind::Ancilla);
            state
                .add_qubit(placement.position.0, placement.position.1, xbar_ir::QubitId(qubit_id), is_ancilla)
                .map_err(|e| CompileError::IllegalState {
                    component: "KernelCompiler",
                    message: format!("failed to place qubit {qubit_id} from the platform topology: {e}"),
                })?;
        }
        Ok(state)
    }

    /// Compile `circuit`, divided and decomposed against a single
    /// running `CrossbarState`, scheduled as one dependence graph, then
    /// bundled and rendered.
    #[instrument(skip(self, circuit), fields(kernel = circuit.name(), gates = circuit.len()))]
    pub fn compile(&self, circuit: &Circuit) -> CompileResult<CompiledKernel> {
        let decomposer = Decomposer::new(self.platform);
        let initial_state = self.initial_state()?;
        let mut running_state = initial_state.clone();

        let subkernels = decomposer.divide_into_subkernels(circuit);
        debug!(subkernels = subkernels.len(), "_divided");

        let mut primitives = Vec::new();
        for subkernel in &subkernels {
            let mut sub_circuit = Circuit::with_size(circuit.name(), circuit.num_qubits(), circuit.num_clbits());
            for gate in subkernel {
                sub_circuit.push(gate.clone())?;
            }
            let mut sub_primitives = decomposer.decompose(&sub_circuit, &mut running_state)?;
            primitives.append(&mut sub_primitives);
        }
        debug!(primitives = primitives.len(), "_decomposed");

        let final_state = running_state;

        let dependence_graph = DependenceGraph::build(&primitives, self.platform.cycle_time, true)?;
        if !dependence_graph.is_dag() {
            return Err(CompileError::IllegalState {
                component: "KernelCompiler",
                message: "dependence graph constructed with a cycle".into(),
            });
        }

        let mut resources = ResourceManager::new(
            self.platform.topology.y_size,
            self.platform.topology.x_size,
            initial_state,
            true,
            self.platform.resources,
        );
        let scheduler = Scheduler::new(self.platform, ScheduleDirection::Forward);
        scheduler.schedule(&dependence_graph, &mut primitives, &mut resources)?;
        apply_buffer_buffer_delays(&mut primitives, self.platform);
        debug!("_b_compiled");

        if !resources.timeline.final_state().equals(&final_state) {
            return Err(CompileError::IllegalState {
                component: "KernelCompiler",
                message: "the scheduled move sequence's final crossbar state diverges from the decomposer's".into(),
            });
        }

        let bundler = Bundler::new(self.platform.cycle_time);
        let bundles = bundler.bundle(&primitives);
        let assembly = render_qasm(&bundles, self.platform.qubit_number);
        debug!(bundles = bundles.len(), "_compiled");

        Ok(CompiledKernel { bundles, assembly })
    }
}
