//! A kernel's circuit: an ordered list of [`SourceGate`]s over a fixed
//! number of qubits and classical bits (§3, §6).
//!
//! The router/mapper step that assigns virtual qubits to physical
//! positions runs before this crate is invoked (out of scope per §1), so
//! a `Circuit` here is already "mapped": its `QubitId`s are the ids the
//! platform's `init_configuration` places on the grid.

use crate::error::{IrError, IrResult};
use crate::gate::SourceGate;
use crate::qubit::{ClbitId, QubitId};

/// An ordered sequence of gates over a fixed qubit/clbit count.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    name: String,
    num_qubits: u32,
    num_clbits: u32,
    gates: Vec<SourceGate>,
}

impl Circuit {
    /// Create an empty circuit with the given qubit/clbit counts.
    #[must_use]
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            gates: vec![],
        }
    }

    /// The circuit's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    #[must_use]
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Number of gates in program order.
    #[must_use]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Append a gate, validating that its operands are in range.
    pub fn push(&mut self, gate: SourceGate) -> IrResult<()> {
        for &q in &gate.qubits {
            if q.0 >= self.num_qubits {
                return Err(IrError::QubitNotFound {
                    qubit: q,
                    gate_name: Some(gate.name.clone()),
                });
            }
        }
        for &c in &gate.clbits {
            if c.0 >= self.num_clbits {
                return Err(IrError::ClbitNotFound {
                    clbit: c,
                    gate_name: Some(gate.name.clone()),
                });
            }
        }
        self.gates.push(gate);
        Ok(())
    }

    /// Iterate gates in program order.
    pub fn gates(&self) -> impl Iterator<Item = &SourceGate> {
        self.gates.iter()
    }

    #[must_use]
    pub fn qubit_ids(&self) -> Vec<QubitId> {
        (0..self.num_qubits).map(QubitId).collect()
    }

    #[must_use]
    pub fn clbit_ids(&self) -> Vec<ClbitId> {
        (0..self.num_clbits).map(ClbitId).collect()
    }
}
