//! # MTK — Minimal Cooperative Multitasking Microkernel
//!
//! A small, purely cooperative kernel for a single-CPU embedded board:
//! a fixed task table, one FIFO ready queue, counting semaphores with
//! FIFO wait queues, a tick-driven timer that never makes scheduling
//! decisions itself, two independent non-blocking serial ports, and a
//! bank of memory-mapped LED cells.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    Application Tasks                    │
//! ├────────────────────────────────────────────────────────┤
//! │                 Kernel API (kernel.rs)                  │
//! │     init_kernel() · set_task() · begin_sch() · yield()  │
//! │                    p()  ·  v()                          │
//! ├──────────────┬────────────────────┬───────────────────┤
//! │  Scheduler   │   Semaphores       │  Platform         │
//! │  sched.rs    │   sem.rs           │  platform.rs      │
//! │  ─ dispatch()│   ─ P() / V()      │  ─ inbyte/outbyte │
//! │  ─ yield()   │   ─ wait queue     │  ─ LED cells      │
//! ├──────────────┴────────────────────┴───────────────────┤
//! │      Task Model (task.rs) · Ready Queue (queue.rs)      │
//! │         Tcb · TaskState · StackPair                     │
//! ├────────────────────────────────────────────────────────┤
//! │          Arch Port (arch/cortex_m4.rs, arch/host.rs)     │
//! │      switch_context() · init_stack() · tick ISR          │
//! ├────────────────────────────────────────────────────────┤
//! │     ARM Cortex-M4 Hardware (target) / x86-64 (tests)     │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cooperative scheduling
//!
//! Nothing preempts a running task. A task keeps the CPU until it
//! calls `kernel::yield_task()`, blocks on `kernel::p()`, or its entry
//! function returns. The timer ISR only advances a tick counter; all
//! scheduling decisions happen in task or startup context, never in
//! interrupt context.
//!
//! ## Memory model
//!
//! - **No heap, no `alloc`**: every task's TCB and stack pair is
//!   inline in a fixed-size array, sized at compile time by
//!   `config::N_TASK_MAX`.
//! - **Fixed-size task table**: `[Tcb; N_TASK_MAX + 1]`, slot 0
//!   reserved for the idle task.
//! - **No critical sections around scheduler state**: the timer ISR
//!   never touches it, so nothing needs to be masked to access it
//!   safely from task/startup context. See `sync.rs`.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod task;
pub mod queue;
pub mod sem;
pub mod sched;
pub mod arch;
pub mod kernel;
pub mod sync;
pub mod platform;
pub mod logging;
