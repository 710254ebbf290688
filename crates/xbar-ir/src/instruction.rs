//! The primitive "Gate" record (§3, data model) flowing through the
//! decomposer, dependence graph, resource manager and scheduler.
//!
//! Unlike [`crate::gate::SourceGate`] (the pre-decomposition, purely
//! qubit-addressed instruction), a [`Gate`] is the opaque record the rest
//! of the pipeline operates on: it may address either qubits or grid
//! sites depending on stage, and carries the categorical fields
//! (`op_name`, `op_type`, `instr_type`) the resource manager and
//! scheduler dispatch on.

use serde::{Deserialize, Serialize};

use crate::qubit::{ClbitId, QubitId, SiteIndex};

/// An operand of a primitive [`Gate`]: either a qubit id or a grid site,
/// depending on which stage of the pipeline produced the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// A qubit identifier (pre-site-translation).
    Qubit(QubitId),
    /// A grid site index (post-site-translation).
    Site(SiteIndex),
}

impl Operand {
    /// The qubit id, if this operand addresses a qubit.
    #[must_use]
    pub fn as_qubit(self) -> Option<QubitId> {
        match self {
            Operand::Qubit(q) => Some(q),
            Operand::Site(_) => None,
        }
    }

    /// The site index, if this operand addresses a site.
    #[must_use]
    pub fn as_site(self) -> Option<SiteIndex> {
        match self {
            Operand::Site(s) => Some(s),
            Operand::Qubit(_) => None,
        }
    }
}

/// The category of a primitive instruction, used by the resource manager
/// and scheduler to decide which checks apply (§3, §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrType {
    /// An elementary nearest-neighbour displacement.
    Shuttle,
    /// A single-qubit primitive (directional or global-wave).
    SingleQubitGate,
    /// A native two-qubit primitive (`cz`, `sqswap`).
    TwoQubitGate,
    /// A measurement primitive.
    MeasurementGate,
    /// A classical (non-quantum) instruction.
    ClassicalGate,
    /// A sentinel with no hardware effect (SOURCE/SINK).
    Dummy,
    /// An explicit idle cycle inserted by the bundler.
    Wait,
}

/// A primitive instruction: the opaque "Gate" record of §3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// Instruction name (may be a primitive like `shuttle_left` or a
    /// native two-qubit name like `cz`).
    pub name: String,
    /// Operands, in instruction-defined order.
    pub operands: Vec<Operand>,
    /// Classical register operands.
    pub creg_operands: Vec<ClbitId>,
    /// Duration in nanoseconds.
    pub duration_ns: f64,
    /// Cycle this gate has been assigned to scheduling (`None` before
    /// scheduling commits it).
    pub cycle: Option<u64>,
    /// Primitive name used by the resource manager (`cc_light_instr`
    /// in the platform description).
    pub op_name: String,
    /// Buffer-delay class (`cc_light_instr_type`'s sibling `type`).
    pub op_type: String,
    /// Categorical kind dispatched on by resources and the scheduler.
    pub instr_type: InstrType,
    /// Declared latency offset in nanoseconds (may be negative).
    pub latency_ns: f64,
}

impl Gate {
    /// Construct a gate with all fields explicit.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        operands: Vec<Operand>,
        creg_operands: Vec<ClbitId>,
        duration_ns: f64,
        op_name: impl Into<String>,
        op_type: impl Into<String>,
        instr_type: InstrType,
    ) -> Self {
        Self {
            name: name.into(),
            operands,
            creg_operands,
            duration_ns,
            cycle: None,
            op_name: op_name.into(),
            op_type: op_type.into(),
            instr_type,
            latency_ns: 0.0,
        }
    }

    /// A sentinel gate with no operands and zero duration (SOURCE/SINK).
    #[must_use]
    pub fn dummy(name: impl Into<String>) -> Self {
        Self::new(name, vec![], vec![], 0.0, "dummy", "none", InstrType::Dummy)
    }

    /// Build a shuttle primitive over a qubit operand.
    #[must_use]
    pub fn shuttle(name: impl Into<String>, qubit: QubitId, duration_ns: f64) -> Self {
        Self::new(
            name,
            vec![Operand::Qubit(qubit)],
            vec![],
            duration_ns,
            "shuttle",
            "none",
            InstrType::Shuttle,
        )
    }

    #[must_use]
    pub fn is_shuttle(&self) -> bool {
        matches!(self.instr_type, InstrType::Shuttle)
    }

    #[must_use]
    pub fn is_two_qubit(&self) -> bool {
        matches!(self.instr_type, InstrType::TwoQubitGate)
    }

    #[must_use]
    pub fn is_measurement(&self) -> bool {
        matches!(self.instr_type, InstrType::MeasurementGate)
    }

    #[must_use]
    pub fn is_dummy(&self) -> bool {
        matches!(self.instr_type, InstrType::Dummy)
    }

    /// Duration rounded up to whole cycles (`⌈duration/cycle_time⌉`).
    #[must_use]
    pub fn duration_cycles(&self, cycle_time_ns: f64) -> u64 {
        (self.duration_ns / cycle_time_ns).ceil() as u64
    }

    /// Qubit operands only (sites are skipped).
    pub fn qubit_operands(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.operands.iter().filter_map(|op| op.as_qubit())
    }

    /// Site operands only (qubits are skipped).
    pub fn site_operands(&self) -> impl Iterator<Item = SiteIndex> + '_ {
        self.operands.iter().filter_map(|op| op.as_site())
    }
}
