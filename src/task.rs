//! # Task Control Block
//!
//! The TCB is the central record the scheduler, ready queue, and
//! semaphore wait queues all operate on. Every task owns exactly one
//! TCB slot and one stack pair for its entire lifetime; slots are never
//! reused once a task reaches `Exit`.
//!
//! ## Queue membership
//!
//! A task is in at most one intrusive queue at a time: the ready queue
//! or exactly one semaphore's wait queue. Membership is encoded purely
//! by `next` plus `status` — there is no separate "which queue am I in"
//! tag, so debug builds that want to assert the invariant check
//! `status` against the queue they expect to find the task in.

use crate::config::{N_TASK_MAX, STACK_SENTINEL, STACK_SIZE, SYS_STACK_SIZE};

/// Task identifier. `0` is the universal "none" sentinel: end of a
/// queue, or "no task".
pub type TaskId = u8;

/// Id of the idle task, permanently resident in slot 0. Never appears
/// in the ready queue or any semaphore's wait queue.
pub const IDLE_TASK: TaskId = 0;

// ---------------------------------------------------------------------------
// Task state machine
// ---------------------------------------------------------------------------

/// Execution state of a task, per the data model in spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Slot not yet assigned to a task.
    Undefined,
    /// Runnable, waiting in the ready queue.
    Ready,
    /// Currently executing.
    Running,
    /// Blocked on a semaphore's wait queue.
    Waiting,
    /// Entry function returned; slot retired, never rescheduled.
    Exit,
}

// ---------------------------------------------------------------------------
// Stack pair
// ---------------------------------------------------------------------------

/// The user/system stack pair owned by one task slot. Only the user
/// stack is touched by the cooperative context switch; the system
/// stack is reserved for trap handling and is otherwise inert in this
/// kernel, per spec §4.2.
#[repr(align(16))]
pub struct StackPair {
    pub user: [u8; STACK_SIZE],
    pub system: [u8; SYS_STACK_SIZE],
}

impl StackPair {
    pub const fn empty() -> Self {
        Self {
            user: [0; STACK_SIZE],
            system: [0; SYS_STACK_SIZE],
        }
    }

    /// Fill both stacks with the sentinel pattern so that stack
    /// exhaustion is visible to a post-mortem tool (spec §4.2, §7).
    pub fn fill_sentinel(&mut self) {
        self.user.fill(STACK_SENTINEL);
        self.system.fill(STACK_SENTINEL);
    }
}

// ---------------------------------------------------------------------------
// Task Control Block
// ---------------------------------------------------------------------------

/// Task Control Block. Holds everything the scheduler needs to
/// context-switch into and out of a task, plus its queue linkage.
pub struct Tcb {
    /// Entry function. `None` for an unallocated slot. May return —
    /// returning lands on the exit trampoline (see `sched::init_stack`).
    pub entry: Option<extern "C" fn()>,

    /// Saved stack pointer. Meaningful only while the task is not
    /// currently running; written by the context switch on the way out,
    /// read on the way back in.
    pub saved_sp: *mut usize,

    /// Reserved for future priority-ordered scheduling. Unused by the
    /// current FIFO scheduler.
    pub priority: u8,

    /// Current state in the lifecycle state machine.
    pub status: TaskState,

    /// Next task-id in whichever intrusive queue currently holds this
    /// task; `0` marks the end of the queue.
    pub next: TaskId,

    /// This task's private stack pair.
    pub stacks: StackPair,
}

// Safety: `saved_sp` always points into `self.stacks.user`, and a TCB is
// only ever mutated from the single cooperative execution context (task
// code or the one-time startup sequence) — never from the tick ISR.
unsafe impl Send for Tcb {}
unsafe impl Sync for Tcb {}

impl Tcb {
    /// An empty, unallocated TCB, suitable for `[Tcb::EMPTY; N]`.
    pub const EMPTY: Tcb = Tcb {
        entry: None,
        saved_sp: core::ptr::null_mut(),
        priority: 0,
        status: TaskState::Undefined,
        next: IDLE_TASK,
        stacks: StackPair::empty(),
    };

    /// Reset this slot to a fresh, unallocated state and re-fill its
    /// stacks with the sentinel pattern. Called once at `init_kernel`.
    pub fn reset(&mut self) {
        self.entry = None;
        self.saved_sp = core::ptr::null_mut();
        self.priority = 0;
        self.status = TaskState::Undefined;
        self.next = IDLE_TASK;
        self.stacks.fill_sentinel();
    }

    #[inline]
    pub fn is_runnable(&self) -> bool {
        self.status == TaskState::Ready
    }
}

/// Bound on the task table, exposed for array sizing in `sched`.
pub const TASK_TABLE_LEN: usize = N_TASK_MAX + 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tcb_is_undefined() {
        let tcb = Tcb::EMPTY;
        assert_eq!(tcb.status, TaskState::Undefined);
        assert!(tcb.entry.is_none());
        assert!(!tcb.is_runnable());
    }

    #[test]
    fn reset_fills_sentinel() {
        let mut tcb = Tcb::EMPTY;
        tcb.reset();
        assert!(tcb.stacks.user.iter().all(|&b| b == STACK_SENTINEL));
        assert!(tcb.stacks.system.iter().all(|&b| b == STACK_SENTINEL));
        assert_eq!(tcb.status, TaskState::Undefined);
    }
}
