//! The source-level gate vocabulary consumed by the decomposer (§4.4).
//!
//! Unlike a general-purpose circuit IR, this crate does not carry gate
//! matrices or symbolic parameters — gate-matrix algebra is explicitly out
//! of scope (§1); only a gate's *name* and *operand shape* matter to the
//! decomposition and scheduling core.

use serde::{Deserialize, Serialize};

use crate::qubit::{ClbitId, QubitId};

/// The Z/S/T-family single-qubit rotations that decompose into a
/// `<name>_shuttle_{left,right}` primitive pair (§4.4).
pub const Z_FAMILY: &[&str] = &["z", "zdag", "s", "sdag", "t", "tdag"];

/// Returns `true` if `name` is one of the Z/S/T-family rotation names.
#[must_use]
pub fn is_z_family(name: &str) -> bool {
    Z_FAMILY.contains(&name)
}

/// A single instruction in the abstract, not-yet-decomposed circuit.
///
/// `SourceGate` is deliberately name-driven rather than enum-driven: the
/// instruction catalogue (platform description, §6) is the authority on
/// which names exist and how they behave, so the decomposer classifies a
/// gate by pattern-matching its `name` (see [`SourceGate::kind`]) rather
/// than by a closed Rust enum of every hardware gate family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceGate {
    /// The gate name as it appears in the instruction catalogue.
    pub name: String,
    /// Qubit operands, in catalogue-defined order.
    pub qubits: Vec<QubitId>,
    /// Classical register operands (non-empty only for `measure` and
    /// classical gates).
    pub clbits: Vec<ClbitId>,
}

/// Coarse classification of a [`SourceGate`], used by the decomposer to
/// pick a rewrite rule (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceGateKind {
    /// `swap`/`move` — exchanges two qubits' positions via four shuttles.
    SwapOrMove,
    /// `sqswap` — native two-qubit gate, horizontal perpendicular shuttle.
    SqSwap,
    /// `cz`/`cphase` — native two-qubit gate, vertical perpendicular shuttle.
    Cz,
    /// A single-qubit gate whose name ends in `_left`/`_right`: bracketed
    /// between a shuttle in that direction and its reverse.
    DirectionalSingleQubit,
    /// A Z/S/T-family rotation without a directional suffix: decomposes
    /// into a `<name>_shuttle_{left,right}` primitive.
    ZFamilyRotation,
    /// A single-qubit gate with no directional suffix and not in the
    /// Z-family: a global wave gate (two pulses separated by a shuttle).
    GlobalWave,
    /// `measure(q[, ancilla])`.
    Measure,
    /// `display` — touches every qubit and classical register.
    Display,
    /// A classical (non-quantum) instruction.
    Classical,
}

impl SourceGate {
    /// Create a new source gate.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        qubits: impl IntoIterator<Item = QubitId>,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> Self {
        Self {
            name: name.into(),
            qubits: qubits.into_iter().collect(),
            clbits: clbits.into_iter().collect(),
        }
    }

    /// A single-qubit gate with no register operands.
    #[must_use]
    pub fn single(name: impl Into<String>, q: QubitId) -> Self {
        Self::new(name, [q], [])
    }

    /// A two-qubit gate with no register operands.
    #[must_use]
    pub fn two_qubit(name: impl Into<String>, a: QubitId, b: QubitId) -> Self {
        Self::new(name, [a, b], [])
    }

    /// `measure(q[, ancilla])` — a second qubit operand is the ancilla.
    #[must_use]
    pub fn measure(q: QubitId, ancilla: Option<QubitId>, c: Option<ClbitId>) -> Self {
        let mut qubits = vec![q];
        qubits.extend(ancilla);
        Self::new("measure", qubits, c)
    }

    /// `display` over the given operands.
    #[must_use]
    pub fn display(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::new("display", qubits, [])
    }

    /// A classical instruction.
    #[must_use]
    pub fn classical(
        name: impl Into<String>,
        qubits: impl IntoIterator<Item = QubitId>,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> Self {
        Self::new(name, qubits, clbits)
    }

    /// Whether this is the `_left` or `_right` directional suffix form.
    #[must_use]
    pub fn direction_suffix(&self) -> Option<Direction> {
        if self.name.ends_with("_left") {
            Some(Direction::Left)
        } else if self.name.ends_with("_right") {
            Some(Direction::Right)
        } else {
            None
        }
    }

    /// Classify this gate per §4.4's rewrite-rule dispatch.
    #[must_use]
    pub fn kind(&self) -> SourceGateKind {
        match self.name.as_str() {
            "swap" | "move" => SourceGateKind::SwapOrMove,
            "sqswap" => SourceGateKind::SqSwap,
            "cz" | "cphase" => SourceGateKind::Cz,
            "measure" => SourceGateKind::Measure,
            "display" => SourceGateKind::Display,
            name if self.qubits.len() == 1 => {
                if self.direction_suffix().is_some() {
                    SourceGateKind::DirectionalSingleQubit
                } else if is_z_family(name) {
                    SourceGateKind::ZFamilyRotation
                } else {
                    SourceGateKind::GlobalWave
                }
            }
            _ => SourceGateKind::Classical,
        }
    }
}

/// A lateral direction on the crossbar grid (column axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward lower column indices.
    Left,
    /// Toward higher column indices.
    Right,
}

impl Direction {
    /// The opposite direction.
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}
