//! # Scheduler Configuration
//!
//! Compile-time constants for the task set, the memory map and the tick.
//! All limits are fixed at compile time: no dynamic allocation, no runtime
//! registration.
//!
//! ## SRAM layout (top 5 KiB)
//!
//! ```text
//! SRAM_END ─────────────► ┌──────────────────┐
//!                         │ task 0 stack     │ 1 KiB
//!                         ├──────────────────┤
//!                         │ task 1 stack     │ 1 KiB
//!                         ├──────────────────┤
//!                         │ task 2 stack     │ 1 KiB
//!                         ├──────────────────┤
//!                         │ task 3 stack     │ 1 KiB
//! SCHED_STACK_START ────► ├──────────────────┤
//!                         │ scheduler (MSP)  │ 1 KiB
//!                         └──────────────────┘
//! ```
//!
//! `SCHED_STACK_START` must agree with `_stack_start` in `memory.x`, which
//! is what cortex-m-rt loads into MSP on reset.

use crate::stack::{self, StackRegion};
use crate::timer;

/// Number of tasks in the round-robin. Every slot must be filled before
/// the scheduler starts.
pub const MAX_TASKS: usize = 4;

/// SysTick frequency in Hz. One tick is one time slice.
pub const TICK_HZ: u32 = 1000;

/// Core clock feeding SysTick (HSI, no PLL).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

pub const SRAM_START: u32 = 0x2000_0000;
pub const SRAM_SIZE: u32 = 16 * 1024;
pub const SRAM_END: u32 = SRAM_START + SRAM_SIZE;

/// Private stack size of each task in bytes.
pub const TASK_STACK_SIZE: u32 = 1024;

/// Size reserved for the privileged stack used by `main` and the handlers.
pub const SCHED_STACK_SIZE: u32 = 1024;

/// Top of the scheduler stack, right below the last task stack.
pub const SCHED_STACK_START: u32 = SRAM_END - MAX_TASKS as u32 * TASK_STACK_SIZE;

/// Stack regions of the tasks, in registry order. Task 0 owns the top of SRAM.
pub const TASK_STACKS: [StackRegion; MAX_TASKS] = task_stacks();

/// Region of the privileged stack.
pub const SCHED_STACK: StackRegion = StackRegion::new(SCHED_STACK_START, SCHED_STACK_SIZE);

/// Value programmed into the SysTick reload register.
pub const SYSTICK_RELOAD: u32 = match timer::reload_value(SYSTEM_CLOCK_HZ, TICK_HZ) {
    Ok(reload) => reload,
    Err(_) => panic!("TICK_HZ cannot be generated from SYSTEM_CLOCK_HZ"),
};

const fn task_stacks() -> [StackRegion; MAX_TASKS] {
    let mut stacks = [StackRegion::new(0, 0); MAX_TASKS];
    let mut i = 0;
    while i < MAX_TASKS {
        stacks[i] = StackRegion::new(SRAM_END - i as u32 * TASK_STACK_SIZE, TASK_STACK_SIZE);
        i += 1;
    }
    stacks
}

// Reject a broken memory map at build time.
const _: () = match stack::validate_layout(&TASK_STACKS, SCHED_STACK, SRAM_START, SRAM_END) {
    Ok(()) => (),
    Err(_) => panic!("task or scheduler stack regions are misconfigured"),
};

const _: () = assert!(MAX_TASKS > 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_stack_tops_follow_source_layout() {
        assert_eq!(TASK_STACKS[0].top(), SRAM_END);
        assert_eq!(TASK_STACKS[1].top(), SRAM_END - 1024);
        assert_eq!(TASK_STACKS[2].top(), SRAM_END - 2048);
        assert_eq!(TASK_STACKS[3].top(), SRAM_END - 3072);
        assert_eq!(SCHED_STACK_START, SRAM_END - 4096);
    }

    #[test]
    fn test_configured_layout_is_valid() {
        assert_eq!(
            stack::validate_layout(&TASK_STACKS, SCHED_STACK, SRAM_START, SRAM_END),
            Ok(())
        );
    }

    #[test]
    fn test_systick_reload() {
        assert_eq!(SYSTICK_RELOAD, 15_999);
    }
}
