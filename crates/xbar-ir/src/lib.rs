//! Crossbar compilation core — circuit intermediate representation.
//!
//! This crate provides the gate vocabulary shared by the decomposer,
//! dependence graph, resource manager and scheduler:
//!
//! - [`SourceGate`]/[`Circuit`] — the abstract, not-yet-decomposed circuit
//!   handed to the decomposer (§4.4).
//! - [`Gate`]/[`Operand`]/[`InstrType`] — the opaque primitive-instruction
//!   record (§3) that the rest of the pipeline operates on once the
//!   decomposer has rewritten high-level gates into shuttles, waves and
//!   native two-qubit primitives.
//!
//! Virtual-to-physical qubit mapping, gate-matrix algebra and the
//! user-facing circuit construction API are out of scope (§1): a
//! [`Circuit`] here is already mapped onto the device's qubit ids.

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{is_z_family, Direction, SourceGate, SourceGateKind, Z_FAMILY};
pub use instruction::{Gate, InstrType, Operand};
pub use qubit::{ClbitId, QubitId, SiteIndex};
