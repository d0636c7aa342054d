//! # Architecture Abstraction Layer
//!
//! Provides the hardware boundary the scheduler switches contexts
//! through: `init_stack` prepares a new task's initial stack frame,
//! `switch_context` performs a synchronous cooperative stack swap.
//! Both backends expose the identical signature so `sched.rs` never
//! branches on architecture itself.
//!
//! Two backends exist:
//! - [`cortex_m4`]: the real ARM Cortex-M4 target.
//! - [`host`]: an x86-64 SysV backend used so `cargo test` performs
//!   genuine stack switches on the development machine, the same
//!   precedent this corpus already uses for testing context-switch
//!   code (`numpy1314-oscamp-base-experiment`'s `04_context_switch`
//!   exercises gate a real switch behind a host target architecture).

#[cfg(target_arch = "arm")]
pub mod cortex_m4;
#[cfg(target_arch = "arm")]
pub use cortex_m4 as backend;

#[cfg(not(target_arch = "arm"))]
pub mod host;
#[cfg(not(target_arch = "arm"))]
pub use host as backend;
