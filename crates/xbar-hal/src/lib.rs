//! Crossbar platform description.
//!
//! Parses the JSON-shaped device document (§6) — grid size, initial
//! qubit placement and instruction catalogue — into typed structs the
//! compilation core consumes. Backend registries, job submission and
//! authentication are out of scope: those concerns belong to whatever
//! layer actually talks to hardware, not to this compiler core.

pub mod error;
pub mod platform;

pub use error::{HalError, HalResult};
pub use platform::{
    BufferClass, BufferSettings, InstrTypeTag, InstructionSetting, PlatformDescription,
    QubitKind, QubitPlacement, ResourceSettings, Topology,
};
