//! # Duel — two-player networked-style demo workload
//!
//! Exercises every kernel primitive the way `tetris_main.c` does in
//! `examples/original_source/`: two independent game tasks, one per
//! serial port, each running a simplified single-falling-cell
//! simulation rather than full Tetris (the color tables, 7-bag
//! shuffling, and line-clear timing of the original are explicitly out
//! of scope). Neither game task writes to its port directly — both
//! push render commands onto a shared ring buffer guarded by a mutex
//! semaphore and a counting semaphore, and a third task drains it onto
//! whichever port the command names. A fourth semaphore, used as a
//! plain mutex, guards a "pending garbage lines" counter the two game
//! tasks exchange — the textbook "application state shared across
//! tasks must be guarded by an application-owned semaphore" case.
//!
//! This module owns all of its shared state as crate-private statics;
//! nothing here is part of the kernel's own API surface.

use mtk::kernel;

/// Port each player reads input from and the render task writes to.
const PORT_A: usize = 0;
const PORT_B: usize = 1;

/// Mutex guarding `GARBAGE_LINES`.
const SEM_GARBAGE: usize = 0;
/// Mutex guarding the render queue's head/tail and slots.
const SEM_RENDER_MUTEX: usize = 1;
/// Counting semaphore tracking how many render commands are queued.
const SEM_RENDER_COUNT: usize = 2;

const FIELD_WIDTH: u8 = 8;
const FIELD_HEIGHT: u8 = 16;
const FALL_PERIOD_TICKS: u32 = 20;

const RENDER_QUEUE_LEN: usize = 16;

/// One render command: "player P's falling cell is now at (row, col)",
/// or a line-clear notice. The render task is the only consumer and
/// the only task that ever touches a port's transmit side.
#[derive(Clone, Copy)]
struct RenderCmd {
    port: usize,
    row: u8,
    col: u8,
}

struct RenderQueue {
    slots: [RenderCmd; RENDER_QUEUE_LEN],
    head: usize,
    tail: usize,
}

impl RenderQueue {
    const fn new() -> Self {
        Self {
            slots: [RenderCmd { port: 0, row: 0, col: 0 }; RENDER_QUEUE_LEN],
            head: 0,
            tail: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.tail.wrapping_sub(self.head) >= RENDER_QUEUE_LEN
    }

    fn push(&mut self, cmd: RenderCmd) {
        self.slots[self.tail % RENDER_QUEUE_LEN] = cmd;
        self.tail = self.tail.wrapping_add(1);
    }

    fn pop(&mut self) -> RenderCmd {
        let cmd = self.slots[self.head % RENDER_QUEUE_LEN];
        self.head = self.head.wrapping_add(1);
        cmd
    }
}

static mut RENDER_QUEUE: RenderQueue = RenderQueue::new();
static mut GARBAGE_LINES: u32 = 0;

/// One player's falling-cell state. Each game task owns exactly one of
/// these — never shared, so no semaphore is needed around it.
struct PlayerState {
    port: usize,
    row: u8,
    col: u8,
}

/// Mirrors `tetris_main.c`'s `send_draw_command`: poll for room and
/// yield to the render task while the queue is full, before ever
/// taking the mutex, so a producer can never overrun a consumer that
/// has fallen behind.
fn push_render(cmd: RenderCmd) {
    while unsafe { RENDER_QUEUE.is_full() } {
        kernel::yield_task();
    }
    kernel::p(SEM_RENDER_MUTEX);
    unsafe { RENDER_QUEUE.push(cmd) };
    kernel::v(SEM_RENDER_MUTEX);
    kernel::v(SEM_RENDER_COUNT);
}

fn run_player(mut state: PlayerState) {
    let mut tick_in_period: u32 = 0;
    loop {
        if let Some(byte) = kernel::inbyte(state.port) {
            match byte {
                b'a' | b'A' => {
                    if state.col > 0 {
                        state.col -= 1;
                    }
                }
                b'd' | b'D' => {
                    if state.col + 1 < FIELD_WIDTH {
                        state.col += 1;
                    }
                }
                _ => {}
            }
        }

        tick_in_period += 1;
        if tick_in_period >= FALL_PERIOD_TICKS {
            tick_in_period = 0;
            state.row += 1;
            if state.row >= FIELD_HEIGHT {
                state.row = 0;
                kernel::p(SEM_GARBAGE);
                unsafe { GARBAGE_LINES += 1 };
                kernel::v(SEM_GARBAGE);
            }
        }

        push_render(RenderCmd {
            port: state.port,
            row: state.row,
            col: state.col,
        });

        kernel::yield_task();
    }
}

extern "C" fn player_a_task() {
    run_player(PlayerState { port: PORT_A, row: 0, col: FIELD_WIDTH / 2 });
}

extern "C" fn player_b_task() {
    run_player(PlayerState { port: PORT_B, row: 0, col: FIELD_WIDTH / 2 });
}

/// Drains the render queue and writes a compact status line to the
/// port named in each command. Never returns: the render task is the
/// last task registered, so it keeps the system alive even once both
/// players have (hypothetically) exited.
extern "C" fn render_task() {
    loop {
        kernel::p(SEM_RENDER_COUNT);
        kernel::p(SEM_RENDER_MUTEX);
        let cmd = unsafe { RENDER_QUEUE.pop() };
        kernel::v(SEM_RENDER_MUTEX);

        for byte in [b'r', b'0' + (cmd.row % 10), b',', b'0' + (cmd.col % 10), b'\n'] {
            kernel::outbyte(cmd.port, byte);
        }

        kernel::yield_task();
    }
}

/// Register the duel workload's three tasks and initialize its
/// semaphores. Called once from `main` before `kernel::begin_sch`.
pub fn install() {
    kernel::sem_init(SEM_GARBAGE, 1).expect("sem_init(SEM_GARBAGE)");
    kernel::sem_init(SEM_RENDER_MUTEX, 1).expect("sem_init(SEM_RENDER_MUTEX)");
    kernel::sem_init(SEM_RENDER_COUNT, 0).expect("sem_init(SEM_RENDER_COUNT)");

    kernel::set_task(player_a_task).expect("set_task(player_a_task)");
    kernel::set_task(player_b_task).expect("set_task(player_b_task)");
    kernel::set_task(render_task).expect("set_task(render_task)");
}
