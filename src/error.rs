//! # Kernel error types
//!
//! Configuration errors (spec §7) are the only failures the kernel API
//! surfaces through `Result`. Boundary errors (an out-of-range semaphore
//! id or port) are deliberately *not* modeled here — per spec they are
//! silent no-ops/absent-sentinels at the call site, not propagated.

/// Errors returned by kernel configuration-time API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// `set_task` was called with no free TCB slot remaining.
    TaskTableFull,
    /// `set_task` was called after `begin_sch` started the scheduler.
    AlreadyScheduling,
    /// A semaphore id outside `0..N_SEM` was used at initialization time.
    InvalidSemaphore,
}
