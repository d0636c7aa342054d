//! # Intrusive FIFO queue
//!
//! Both the ready queue (`sched.rs`) and each semaphore's wait queue
//! (`sem.rs`) are the same data structure: a singly-linked FIFO threaded
//! through the `next` field of the shared `Tcb` table. There is no
//! separate node allocation — a task's position in a queue costs
//! nothing beyond the one `TaskId` already in its TCB.
//!
//! A queue is represented here only by its head id; the tail is found
//! by walking `next` on push, which is fine at these queue depths
//! (`N_TASK_MAX` is single digits).

use crate::task::{TaskId, Tcb};

/// Append `id` to the end of the queue whose head is `*head`. `id`'s
/// `next` is reset to `0` (end-of-queue) before linking.
pub fn push_tail(table: &mut [Tcb], head: &mut TaskId, id: TaskId) {
    table[id as usize].next = 0;
    if *head == 0 {
        *head = id;
        return;
    }
    let mut cursor = *head;
    loop {
        let next = table[cursor as usize].next;
        if next == 0 {
            table[cursor as usize].next = id;
            return;
        }
        cursor = next;
    }
}

/// Remove and return the task at the head of the queue, or `0` if empty.
pub fn pop_head(table: &mut [Tcb], head: &mut TaskId) -> TaskId {
    let id = *head;
    if id == 0 {
        return 0;
    }
    *head = table[id as usize].next;
    table[id as usize].next = 0;
    id
}

/// Remove `id` from the queue wherever it sits, if present at all. Used
/// when a task must leave a wait queue other than from its head (not
/// needed by the current FIFO semaphore discipline, but kept as the
/// general intrusive-list operation the ready queue and wait queues
/// both rely on for symmetry with `push_tail`/`pop_head`).
pub fn remove(table: &mut [Tcb], head: &mut TaskId, id: TaskId) {
    if *head == 0 {
        return;
    }
    if *head == id {
        *head = table[id as usize].next;
        table[id as usize].next = 0;
        return;
    }
    let mut cursor = *head;
    loop {
        let next = table[cursor as usize].next;
        if next == 0 {
            return;
        }
        if next == id {
            table[cursor as usize].next = table[id as usize].next;
            table[id as usize].next = 0;
            return;
        }
        cursor = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Tcb;

    fn table() -> [Tcb; 6] {
        [
            Tcb::EMPTY,
            Tcb::EMPTY,
            Tcb::EMPTY,
            Tcb::EMPTY,
            Tcb::EMPTY,
            Tcb::EMPTY,
        ]
    }

    #[test]
    fn fifo_order_preserved() {
        let mut table = table();
        let mut head: TaskId = 0;
        push_tail(&mut table, &mut head, 1);
        push_tail(&mut table, &mut head, 2);
        push_tail(&mut table, &mut head, 3);

        assert_eq!(pop_head(&mut table, &mut head), 1);
        assert_eq!(pop_head(&mut table, &mut head), 2);
        assert_eq!(pop_head(&mut table, &mut head), 3);
        assert_eq!(pop_head(&mut table, &mut head), 0);
    }

    #[test]
    fn remove_from_middle() {
        let mut table = table();
        let mut head: TaskId = 0;
        push_tail(&mut table, &mut head, 1);
        push_tail(&mut table, &mut head, 2);
        push_tail(&mut table, &mut head, 3);

        remove(&mut table, &mut head, 2);

        assert_eq!(pop_head(&mut table, &mut head), 1);
        assert_eq!(pop_head(&mut table, &mut head), 3);
        assert_eq!(pop_head(&mut table, &mut head), 0);
    }

    #[test]
    fn remove_head_updates_head() {
        let mut table = table();
        let mut head: TaskId = 0;
        push_tail(&mut table, &mut head, 1);
        push_tail(&mut table, &mut head, 2);

        remove(&mut table, &mut head, 1);
        assert_eq!(head, 2);
    }
}
