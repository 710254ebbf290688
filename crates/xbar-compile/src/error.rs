//! Error types for the compilation core.

use thiserror::Error;

/// Errors raised while compiling a kernel onto the crossbar.
///
/// Every variant is fatal: the core is a batch compiler and does not
/// attempt local recovery (§7). Each variant names the failing
/// component so a caller can attribute the failure without parsing the
/// message text.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A required platform description field was missing or ill-typed.
    #[error("configuration error in {component}: {message}")]
    ConfigurationError {
        /// The component that detected the problem.
        component: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// The decomposer was asked to expand a gate absent from the
    /// instruction catalogue.
    #[error("unknown instruction '{name}' (no entry in the instruction catalogue)")]
    UnknownInstruction {
        /// The offending gate name.
        name: String,
    },

    /// The decomposer or a resource detected a state that should be
    /// impossible given a well-formed circuit and platform.
    #[error("illegal state in {component}: {message}")]
    IllegalState {
        /// The component that detected the problem.
        component: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// The scheduler could not make progress even after
    /// `solve_deadlock` was invoked on the highest-priority waiting node.
    #[error("scheduler deadlocked at cycle {cycle} on gate '{gate_name}'")]
    ResourceDeadlock {
        /// The cycle at which the deadlock was detected.
        cycle: u64,
        /// The gate the scheduler was attempting to place.
        gate_name: String,
    },

    /// `curr_cycle` exceeded `MAX_CYCLE` before the scheduler terminated.
    #[error("schedule overflow: curr_cycle exceeded the {max_cycle}-cycle ceiling")]
    ScheduleOverflow {
        /// The configured ceiling that was exceeded.
        max_cycle: u64,
    },

    /// A malformed source circuit (propagated from `xbar-ir`).
    #[error(transparent)]
    Ir(#[from] xbar_ir::IrError),

    /// A malformed platform description (propagated from `xbar-hal`).
    #[error(transparent)]
    Hal(#[from] xbar_hal::HalError),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
