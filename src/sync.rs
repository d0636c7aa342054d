//! # Synchronization primitives
//!
//! The scheduler, ready queue, and semaphore tables are never touched
//! from interrupt context in this kernel (see spec §5 and
//! `arch::cortex_m4`'s SysTick handler, which only increments a tick
//! counter), so none of that state needs a critical section. The one
//! place genuine ISR/task concurrency exists is the per-port receive
//! ring buffer in `platform.rs`, and that is built on atomics rather
//! than disabling interrupts (see `platform::RxRing`).
//!
//! `critical_section` is kept for the few places application code
//! still wants a hard guarantee against interrupt reentry — e.g.
//! around the one-time logger installation — mirroring the teacher's
//! `cortex_m::interrupt::free` usage, but scoped down from "guards all
//! scheduler state" to "guards this one critical region".

#[cfg(target_arch = "arm")]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    cortex_m::interrupt::free(|_cs| f())
}

/// On the host backend there are no real interrupts to race with, so
/// this is a plain call — kept so call sites don't need to be
/// `cfg`-gated themselves.
#[cfg(not(target_arch = "arm"))]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}
