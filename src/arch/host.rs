//! # Host backend (x86-64 SysV)
//!
//! A second context-switch backend active whenever the crate is not
//! built for `target_arch = "arm"` — in practice, whenever `cargo test`
//! runs on the development machine. It performs a real stack switch
//! between real task stacks using the same shape of naked
//! save/restore routine as [`super::cortex_m4`], just with the SysV
//! callee-saved register set (`rbx`, `rbp`, `r12`–`r15`) in place of
//! AAPCS's (`r4`–`r11`, `lr`). This lets the scheduler, queue, and
//! semaphore logic be exercised end-to-end by real cooperative
//! switches on the host, the same precedent already used in this
//! corpus for testing context-switch code on a development machine
//! rather than only on the real target.

use core::arch::asm;
use core::sync::atomic::{AtomicU32, Ordering};

/// Tick counter. On the host there is no hardware timer; tests advance
/// it explicitly to exercise timing-dependent code paths.
static TICK: AtomicU32 = AtomicU32::new(0);

pub fn ticks() -> u32 {
    TICK.load(Ordering::Relaxed)
}

/// Advance the tick counter by one. Stands in for the SysTick ISR in
/// host tests.
pub fn advance_tick() {
    TICK.fetch_add(1, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Stack initialization
// ---------------------------------------------------------------------------

/// Build the initial register frame for a brand-new task stack so that
/// the first `switch_context` into it lands on `trampoline` with all
/// callee-saved registers zeroed.
///
/// # Safety
/// `stack_top` must be valid for at least 56 bytes below it, 16-byte
/// aligned memory owned exclusively by this task.
pub unsafe fn init_stack(stack_top: *mut u8, trampoline: extern "C" fn() -> !) -> *mut usize {
    let top = (stack_top as usize) & !0xF;
    let frame = (top - 7 * 8) as *mut usize;
    for i in 0..6 {
        *frame.add(i) = 0; // r15, r14, r13, r12, rbx, rbp
    }
    *frame.add(6) = trampoline as usize; // return address
    frame
}

// ---------------------------------------------------------------------------
// Context switch
// ---------------------------------------------------------------------------

/// Save the caller's callee-saved registers onto its own stack, store
/// the resulting stack pointer at `*save_to`, then load `new_sp` and
/// resume whatever context was suspended there (or, for a freshly
/// initialized stack, `ret` into its trampoline).
///
/// # Safety
/// `new_sp` must be a stack pointer previously produced by `init_stack`
/// or previously saved by this same function; `save_to` must point at
/// a live `Tcb::saved_sp` field.
#[naked]
pub unsafe extern "C" fn switch_context(save_to: *mut *mut usize, new_sp: *mut usize) {
    asm!(
        "push rbp",
        "push rbx",
        "push r12",
        "push r13",
        "push r14",
        "push r15",
        "mov [rdi], rsp",
        "mov rsp, rsi",
        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop rbx",
        "pop rbp",
        "ret",
        options(noreturn)
    );
}
