//! # Task Registry Entries
//!
//! A task is a no-argument entry point that never returns. It is called
//! directly at most once (task 0, right after the stack switch) and is
//! otherwise only ever resumed from its saved context; it never observes
//! being switched out.

/// Entry point of a task. The `!` return type is the run-forever contract.
pub type TaskEntry = extern "C" fn() -> !;

/// One slot of the task registry.
#[derive(Clone, Copy)]
pub struct TaskSlot {
    /// Base of the task's most recent context image on its own stack:
    /// the fabricated frame until its first preemption, a saved frame after.
    /// Written only by the stack layout builder and the context switch.
    pub stack_pointer: *mut u32,

    /// Where the task starts. Written once at initialization.
    pub entry: TaskEntry,
}

// Safety: `stack_pointer` only ever addresses the task's own stack region,
// and the registry is only written before start or from the SysTick handler.
unsafe impl Send for TaskSlot {}
unsafe impl Sync for TaskSlot {}

impl TaskSlot {
    /// An unfilled slot. Used to initialize the static registry.
    pub const EMPTY: TaskSlot = TaskSlot {
        stack_pointer: core::ptr::null_mut(),
        entry: unassigned,
    };

    /// A slot whose stack pointer still sits at the top of its stack region.
    pub const fn new(stack_top: *mut u32, entry: TaskEntry) -> Self {
        Self {
            stack_pointer: stack_top,
            entry,
        }
    }

    /// Entry address as a word, suitable for `bx`.
    #[inline]
    pub fn entry_address(&self) -> u32 {
        self.entry as usize as u32
    }
}

/// Entry of an empty slot. Never dispatched once `kernel::init` has run.
extern "C" fn unassigned() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn spin() -> ! {
        loop {}
    }

    #[test]
    fn test_empty_slot() {
        let slot = TaskSlot::EMPTY;
        assert!(slot.stack_pointer.is_null());
        assert_eq!(slot.entry_address(), unassigned as usize as u32);
    }

    #[test]
    fn test_new_slot_points_at_stack_top() {
        let mut stack = [0u32; 4];
        let top = stack.as_mut_ptr().wrapping_add(4);
        let slot = TaskSlot::new(top, spin);
        assert_eq!(slot.stack_pointer, top);
        assert_eq!(slot.entry_address(), spin as usize as u32);
    }
}
