//! # MTK Example Firmware — two-player duel
//!
//! Wires up the `duel` demo workload (see `duel.rs`) on top of the
//! kernel: two game tasks, each polling its own serial port, and one
//! render task draining their shared render queue. Exercises every
//! external interface the kernel exposes — two ports, three
//! semaphores of different disciplines, tick-based timing, and
//! non-blocking input — without implementing a full Tetris ruleset.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use panic_halt as _;

use mtk::kernel;

mod duel;

/// Firmware entry point. Initializes the kernel, registers the duel
/// workload's tasks and semaphores, and starts the scheduler. Does
/// not return.
#[entry]
fn main() -> ! {
    kernel::init_kernel();

    duel::install();

    kernel::begin_sch()
}
