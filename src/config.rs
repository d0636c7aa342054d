//! # Kernel configuration
//!
//! Compile-time constants governing task, semaphore, and stack sizing.
//! All limits are fixed at compile time — no dynamic allocation anywhere
//! in the kernel.

/// Maximum number of user tasks. Slot 0 is reserved for the idle task,
/// so the task table holds `N_TASK_MAX + 1` entries. Matches the
/// original C kernel's `NUMTASK`.
pub const N_TASK_MAX: usize = 5;

/// Number of counting semaphores. Matches the original `NUMSEMAPHORE`.
pub const N_SEM: usize = 3;

/// Per-task user stack size in bytes. Matches the original `STKSIZE`.
/// Must be large enough for the deepest call chain of any task plus the
/// saved-register frame the context switch pushes.
pub const STACK_SIZE: usize = 4096;

/// Per-task system stack size in bytes. Reserved for trap/exception use;
/// not touched by the cooperative context switch itself, but owned
/// exclusively by its task for the task's lifetime per the data model.
pub const SYS_STACK_SIZE: usize = 4096;

/// Number of independent serial ports the platform layer exposes.
pub const N_PORT: usize = 2;

/// Number of memory-mapped LED/character cells.
pub const N_LED: usize = 8;

/// Per-port receive ring buffer capacity in bytes.
pub const RX_BUF_LEN: usize = 64;

/// Timer tick frequency in Hz.
pub const TICK_HZ: u32 = 100;

/// System clock frequency in Hz (STM32F4-class target at 16 MHz HSI,
/// matching the reference board this kernel was built against).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// Fill byte written across unused stack bytes at boot so that a
/// post-mortem tool can detect how deep a stack grew.
pub const STACK_SENTINEL: u8 = 0xAA;
