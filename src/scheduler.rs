//! # Scheduler
//!
//! The scheduler state and the policy behind every context switch.
//!
//! ## Scheduling Algorithm
//!
//! At each SysTick interrupt the port layer saves r4–r11 of the interrupted
//! task and calls [`Scheduler::switch_context`], which:
//! 1. **Records** the interrupted task's stack pointer in its registry slot
//! 2. **Advances** `current_task` to `(current_task + 1) % N`
//! 3. **Returns** the saved stack pointer of the new current task
//!
//! There are no priorities and no blocking: every task gets exactly one tick
//! per round, in registry order, forever.
//!
//! ## Single Writer
//!
//! Once the scheduler is started, only the SysTick handler mutates this
//! state. SysTick cannot preempt itself and task code never touches the
//! registry, so the handler body is a critical section without a lock.

use crate::frame::{self, InitialFrame};
use crate::task::{TaskEntry, TaskSlot};

// ---------------------------------------------------------------------------
// Round-robin selector
// ---------------------------------------------------------------------------

/// The task that runs after `current` in a set of `count` tasks.
#[inline]
pub const fn next_task(current: usize, count: usize) -> usize {
    (current + 1) % count
}

// ---------------------------------------------------------------------------
// Scheduler struct
// ---------------------------------------------------------------------------

/// The task registry plus the index of the task whose context is live.
///
/// Stored as a global in `kernel.rs` for the target; tests build their own.
pub struct Scheduler<const N: usize> {
    /// Registry, indexed by task id.
    tasks: [TaskSlot; N],

    /// Index of the running task. Always `< N`.
    current_task: usize,
}

impl<const N: usize> Scheduler<N> {
    const NON_EMPTY: () = assert!(N > 0, "the scheduler needs at least one task");

    /// A scheduler whose slots are not filled in yet.
    pub const fn empty() -> Self {
        let () = Self::NON_EMPTY;
        Self {
            tasks: [TaskSlot::EMPTY; N],
            current_task: 0,
        }
    }

    /// Build the registry from each task's stack top and entry point.
    ///
    /// The stack pointers are preset to the stack tops; call
    /// [`init_task_stacks`](Self::init_task_stacks) before starting.
    pub fn new(stack_tops: [*mut u32; N], entries: [TaskEntry; N]) -> Self {
        let mut scheduler = Self::empty();
        for (slot, (top, entry)) in scheduler.tasks.iter_mut().zip(stack_tops.into_iter().zip(entries)) {
            *slot = TaskSlot::new(top, entry);
        }
        scheduler
    }

    /// Fabricate an initial exception frame on every task's stack.
    ///
    /// Afterwards each slot's stack pointer addresses its frame, so the
    /// first switch to a task "resumes" it at its entry point.
    ///
    /// # Safety
    /// Every slot's stack pointer must be the top of a writable stack region
    /// owned by that task and large enough for the frame.
    pub unsafe fn init_task_stacks(&mut self) {
        for (id, slot) in self.tasks.iter_mut().enumerate() {
            let top = slot.stack_pointer;
            slot.stack_pointer = build_initial_frame(top, slot.entry);
            log::debug!(
                "task {}: stack top {:p}, frame at {:p}, entry {:#010x}",
                id,
                top,
                slot.stack_pointer,
                slot.entry_address()
            );
        }
    }

    #[inline]
    pub fn current_task(&self) -> usize {
        self.current_task
    }

    #[inline]
    pub const fn task_count(&self) -> usize {
        N
    }

    #[inline]
    pub fn stack_pointer(&self, id: usize) -> *mut u32 {
        self.tasks[id].stack_pointer
    }

    #[inline]
    pub fn entry(&self, id: usize) -> TaskEntry {
        self.tasks[id].entry
    }

    /// Saved stack pointer of the current task.
    #[inline]
    pub fn current_stack_pointer(&self) -> *mut u32 {
        self.tasks[self.current_task].stack_pointer
    }

    /// Record where the current task's context now starts.
    #[inline]
    pub fn save_current(&mut self, stack_pointer: *mut u32) {
        self.tasks[self.current_task].stack_pointer = stack_pointer;
    }

    /// Move on to the next task in registry order and return its index.
    #[inline]
    pub fn advance(&mut self) -> usize {
        self.current_task = next_task(self.current_task, N);
        self.current_task
    }

    /// One context switch: save the interrupted task's stack pointer, pick
    /// the next task, and hand back the stack pointer to restore from.
    ///
    /// `saved` must already address a complete frame (software part below
    /// the hardware part), as laid out in [`crate::frame`].
    pub fn switch_context(&mut self, saved: *mut u32) -> *mut u32 {
        self.save_current(saved);
        self.advance();
        self.current_stack_pointer()
    }
}

// ---------------------------------------------------------------------------
// Stack layout builder
// ---------------------------------------------------------------------------

/// Write a fabricated exception frame for `entry` just below `stack_top`.
///
/// ## Stack Layout (top = high address, growing down)
///
/// ```text
/// [Hardware stacked frame]   <- stack_top
///   xPSR  (0x0100_0000, Thumb bit)
///   PC    (task entry point)
///   LR    (0xFFFF_FFFD, Thread mode on PSP)
///   R12, R3, R2, R1, R0 (0)
/// [Software saved context]
///   R11 .. R4 (0)            <- returned stack pointer
/// ```
///
/// # Safety
/// The 64 bytes below `stack_top` must be writable and owned by the task.
pub unsafe fn build_initial_frame(stack_top: *mut u32, entry: TaskEntry) -> *mut u32 {
    frame::push(stack_top, InitialFrame::fabricate(entry))
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
