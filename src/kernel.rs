//! # Kernel
//!
//! Top-level public API: `init_kernel`, `set_task`, `begin_sch`,
//! `yield_task`, `p`/`v`, and the platform passthroughs `inbyte`/
//! `outbyte`. Holds the single global [`Sched`] instance, the way the
//! teacher crate holds a single global `Scheduler` — a `static mut`
//! plus a raw pointer the exit trampoline can reach without needing a
//! reference threaded through task entry points that take no
//! arguments.
//!
//! ## Startup sequence
//!
//! ```text
//! main()
//!   ├─► kernel::init_kernel()      ← install logger, reset scheduler
//!   ├─► kernel::sem_init(id, n)    ← configure semaphores  (×N_SEM)
//!   ├─► kernel::set_task(entry)    ← register tasks        (×N_TASK_MAX)
//!   └─► kernel::begin_sch()        ← start scheduling, never returns
//! ```

use log::LevelFilter;

use crate::error::KernelError;
use crate::logging;
use crate::sched::Sched;
use crate::task::{TaskId, TaskState};

static mut SCHED: Sched = Sched::new();

/// Raw pointer to the global scheduler, set once by `init_kernel`.
/// Needed by `task_trampoline`, which is reached by `bx`/`ret` from
/// assembly and so cannot be passed a reference.
#[no_mangle]
pub static mut SCHED_PTR: *mut Sched = core::ptr::null_mut();

/// Initialize the kernel. Must be called exactly once, before any
/// other kernel function.
pub fn init_kernel() {
    unsafe {
        SCHED = Sched::new();
        SCHED_PTR = &mut SCHED as *mut Sched;
    }
    install_timer();
    logging::init(LevelFilter::Debug);
    log::debug!("kernel initialized");
}

/// Configure and arm the tick timer per spec §4.7's "install ISR,
/// enable timer". On the host there is no hardware timer to arm; tests
/// advance the tick counter explicitly via `arch::host::advance_tick`.
#[cfg(target_arch = "arm")]
fn install_timer() {
    let mut peripherals = cortex_m::Peripherals::take().expect("Peripherals::take");
    crate::arch::cortex_m4::configure_systick(&mut peripherals.SYST);
}

#[cfg(not(target_arch = "arm"))]
fn install_timer() {}

/// Register a new task. Valid only before `begin_sch`.
pub fn set_task(entry: extern "C" fn()) -> Result<TaskId, KernelError> {
    let id = unsafe { (*SCHED_PTR).set_task(entry, task_trampoline) }?;
    log::debug!("task {} created", id);
    Ok(id)
}

/// Set semaphore `id`'s initial count. Valid only before `begin_sch`.
pub fn sem_init(id: usize, initial: i32) -> Result<(), KernelError> {
    unsafe { (*SCHED_PTR).sem_init(id, initial) }
}

/// Start cooperative scheduling. **Never returns.**
pub fn begin_sch() -> ! {
    log::debug!("scheduling started");
    unsafe { (*SCHED_PTR).begin_sch() }
}

/// Voluntarily yield the CPU to the next ready task.
pub fn yield_task() {
    unsafe { (*SCHED_PTR).yield_task() }
}

/// `P` (wait) on semaphore `id`.
pub fn p(id: usize) {
    unsafe { (*SCHED_PTR).p(id) }
}

/// `V` (signal) on semaphore `id`.
pub fn v(id: usize) {
    unsafe { (*SCHED_PTR).v(id) }
}

/// Poll serial port `port` for a received byte. Never blocks.
pub fn inbyte(port: usize) -> Option<u8> {
    crate::platform::inbyte(port)
}

/// Write one byte out serial port `port`.
pub fn outbyte(port: usize, byte: u8) {
    crate::platform::outbyte(port, byte)
}

/// Kernel tick count, advanced by the platform timer ISR.
pub fn tick() -> u32 {
    crate::arch::backend::ticks()
}

/// The trampoline every task stack is built to land on (see
/// `sched::Sched::set_task`'s call to `arch::backend::init_stack`).
/// Looks up the current task's entry function in the global
/// scheduler, calls it, and marks the task `Exit` when it returns —
/// the task never resumes past this point since an exited task is
/// never requeued.
extern "C" fn task_trampoline() -> ! {
    unsafe {
        let sched = &mut *SCHED_PTR;
        let id = sched.current_task();
        if let Some(entry) = sched.table[id as usize].entry {
            entry();
        }
        sched.table[id as usize].status = TaskState::Exit;
        log::debug!("task {} exited", id);
        sched.dispatch();
    }
    // Unreachable: `dispatch` never switches back into an exited task.
    loop {
        core::hint::spin_loop();
    }
}
