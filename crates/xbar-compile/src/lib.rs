//! Crossbar compilation core.
//!
//! Lowers an already-mapped [`xbar_ir::Circuit`] onto a 2D crossbar
//! qubit array with global control lines: the crossbar state model
//! (C1–C3), the decomposer (C4), the dependence graph (C5), the
//! composite resource manager (C6), the critical-path list scheduler
//! (C7) and the bundler (C8).
//!
//! Virtual-to-physical qubit mapping, gate-matrix algebra, CLI/config
//! parsing and output file writing live in other layers; see
//! [`manager::KernelCompiler`] for the entry point this crate exposes.

pub mod bundler;
pub mod crossbar;
pub mod decomposer;
pub mod dependence;
pub mod error;
pub mod interval_map;
pub mod manager;
pub mod resources;
pub mod scheduler;
pub mod timeline;

pub use bundler::{render_qasm, Bundle, Bundler, ParallelSection};
pub use crossbar::CrossbarState;
pub use decomposer::Decomposer;
pub use dependence::{DepCause, DepKind, DependenceGraph, EventKind};
pub use error::{CompileError, CompileResult};
pub use manager::{CompiledKernel, KernelCompiler};
pub use resources::{BarrierResource, QubitLineResource, Resource, ResourceManager, SiteResource, WaveResource};
pub use scheduler::{ScheduleDirection, Scheduler, ALAP_SINK_CYCLE, MAX_CYCLE};
pub use timeline::StateTimeline;
