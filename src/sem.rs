//! # Semaphores
//!
//! Counting semaphores, each with its own FIFO wait queue built on
//! `queue.rs`. `P`/`V` are cooperative: a `P` that blocks hands control
//! straight to the scheduler rather than spinning, and a `V` that wakes
//! a waiter moves it to the ready queue without resuming it
//! immediately — the woken task merely becomes eligible, per spec §5.

use crate::config::N_SEM;
use crate::queue;
use crate::task::{TaskId, Tcb};

/// One counting semaphore: a count plus the head of its FIFO wait
/// queue. `count` never goes negative — per spec §3/§8, it stays at 0
/// while any task is queued on `wait_head`, and waiter presence is
/// tracked by the queue itself rather than by letting `count` run into
/// negative territory the way the original `SEMAPHORE_TYPE`'s `nst`
/// overdraft trick does.
pub struct Semaphore {
    pub count: i32,
    pub wait_head: TaskId,
}

impl Semaphore {
    pub const fn new(initial: i32) -> Self {
        Self {
            count: initial,
            wait_head: 0,
        }
    }
}

/// The kernel's fixed semaphore table, sized by `config::N_SEM`.
pub struct SemTable {
    sems: [Semaphore; N_SEM],
}

impl SemTable {
    pub const fn new() -> Self {
        Self {
            sems: [Semaphore::new(0), Semaphore::new(0), Semaphore::new(0)],
        }
    }

    /// Set the initial count of semaphore `id`. Only valid before
    /// `begin_sch`; called from application startup code.
    pub fn init(&mut self, id: usize, initial: i32) {
        if id < self.sems.len() {
            self.sems[id].count = initial;
            self.sems[id].wait_head = 0;
        }
    }

    pub fn get(&self, id: usize) -> Option<&Semaphore> {
        self.sems.get(id)
    }

    /// `P` (wait/acquire). If a unit is available, takes it and returns
    /// immediately. Otherwise the calling task is pushed onto the
    /// semaphore's wait queue and its status set to `Waiting`, with
    /// `count` left at 0 rather than driven negative. Returns `true` if
    /// the caller must block (and therefore call `dispatch` after
    /// this), `false` if it may continue running.
    pub fn p(&mut self, id: usize, table: &mut [Tcb], task_id: TaskId) -> bool {
        let Some(sem) = self.sems.get_mut(id) else {
            return false;
        };
        if sem.count > 0 {
            sem.count -= 1;
            false
        } else {
            table[task_id as usize].status = crate::task::TaskState::Waiting;
            queue::push_tail(table, &mut sem.wait_head, task_id);
            true
        }
    }

    /// `V` (signal/release). If a task is waiting, pops it from the
    /// wait queue, marks it `Ready`, and returns its id so the caller
    /// can enqueue it on the ready queue — `count` stays at 0, since
    /// the released unit passes straight to the waiter instead of
    /// round-tripping through `count`. Otherwise increments `count`.
    /// Never resumes the woken task directly — it only becomes
    /// schedulable, per spec §5's "no direct handoff" rule.
    pub fn v(&mut self, id: usize, table: &mut [Tcb]) -> Option<TaskId> {
        let sem = self.sems.get_mut(id)?;
        if sem.wait_head != 0 {
            let woken = queue::pop_head(table, &mut sem.wait_head);
            table[woken as usize].status = crate::task::TaskState::Ready;
            Some(woken)
        } else {
            sem.count += 1;
            None
        }
    }
}
