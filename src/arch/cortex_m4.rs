//! # Cortex-M4 Port Layer
//!
//! Hardware-specific code for the ARM Cortex-M4 (Thumb-2) processor.
//!
//! ## Context switch mechanism
//!
//! This kernel is purely cooperative — there is no preemption, so there
//! is no need for the PendSV/exception-return trick a preemptive RTOS
//! uses to switch stacks from interrupt context. Instead `switch_context`
//! is an ordinary naked function, called synchronously from `sched.rs`
//! whenever a task yields or blocks: it saves the AAPCS callee-saved
//! registers (r4–r11, lr) onto the current stack, swaps the stack
//! pointer, and restores the same registers from the new stack. The
//! very first call saves the live boot-stack context into the idle
//! task's slot, which is exactly how the idle task's "do nothing, loop
//! back into dispatch" behavior is realized — see `sched::begin_sch`.
//!
//! SysTick remains a real hardware interrupt, but per the spec it only
//! increments the tick counter — it never makes a scheduling decision
//! and never triggers a context switch.

use cortex_m::peripheral::syst::SystClkSource;
use core::arch::asm;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::{SYSTEM_CLOCK_HZ, TICK_HZ};

/// Monotonic tick counter, incremented only by the SysTick ISR and
/// read only by task/kernel code — a single `AtomicU32` is enough
/// since no scheduling state is touched from interrupt context.
static TICK: AtomicU32 = AtomicU32::new(0);

/// Configure SysTick to fire at `TICK_HZ`.
pub fn configure_systick(syst: &mut cortex_m::peripheral::SYST) {
    let reload = SYSTEM_CLOCK_HZ / TICK_HZ - 1;
    syst.set_reload(reload);
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_counter();
    syst.enable_interrupt();
}

/// Current tick count.
pub fn ticks() -> u32 {
    TICK.load(Ordering::Relaxed)
}

/// SysTick exception handler. Does nothing but advance the clock — no
/// scheduling decision is ever made from interrupt context.
#[no_mangle]
pub unsafe extern "C" fn SysTick() {
    TICK.fetch_add(1, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Stack initialization
// ---------------------------------------------------------------------------

/// Build the initial register frame for a brand-new task stack so that
/// the first `switch_context` into it lands on `trampoline` with r4–r11
/// zeroed. `stack_top` must point just past the end of the task's user
/// stack (the high address, since the stack grows down).
///
/// # Safety
/// `stack_top` must be valid for at least 36 bytes below it, 4-byte
/// aligned memory owned exclusively by this task.
pub unsafe fn init_stack(stack_top: *mut u8, trampoline: extern "C" fn() -> !) -> *mut usize {
    let top = (stack_top as usize) & !0x7;
    let frame = (top - 9 * 4) as *mut usize;
    for i in 0..8 {
        *frame.add(i) = 0; // r4..r11
    }
    *frame.add(8) = trampoline as usize; // lr
    frame
}

// ---------------------------------------------------------------------------
// Context switch
// ---------------------------------------------------------------------------

/// Save the caller's callee-saved registers onto its own stack, store
/// the resulting stack pointer at `*save_to`, then load `new_sp` and
/// resume whatever context was suspended there.
///
/// # Safety
/// `new_sp` must be a stack pointer previously produced by `init_stack`
/// or previously saved by this same function; `save_to` must point at
/// a live `Tcb::saved_sp` field.
#[naked]
pub unsafe extern "C" fn switch_context(save_to: *mut *mut usize, new_sp: *mut usize) {
    asm!(
        "push {{r4-r11, lr}}",
        "str sp, [r0]",
        "mov sp, r1",
        "pop {{r4-r11, lr}}",
        "bx lr",
        options(noreturn)
    );
}
