//! # Kernel
//!
//! Owns the global scheduler instance and drives system start-up.
//!
//! ## Startup Sequence
//!
//! ```text
//! reset_handler (cortex-m-rt, MSP = _stack_start = SCHED_STACK_START)
//!   └─► main()
//!         ├─► kernel::init(tasks)   ← Fill registry, fabricate frames
//!         └─► kernel::start(cp)     ← Does not return
//!               ├─► Mask interrupts
//!               ├─► Configure SysTick
//!               └─► arch::start_first_task()
//!                     ├─► switch_to_process_stack()
//!                     ├─► Unmask interrupts
//!                     └─► task 0 entry point
//! ```

use crate::arch::cortex_m0;
use crate::config::{MAX_TASKS, SYSTICK_RELOAD, TASK_STACKS, TICK_HZ};
use crate::scheduler::Scheduler;
use crate::sync::KernelCell;
use crate::task::TaskEntry;

// ---------------------------------------------------------------------------
// Global scheduler instance
// ---------------------------------------------------------------------------

/// Global scheduler instance.
///
/// Written by [`init`] before the tick is enabled; afterwards only the
/// SysTick handler mutates it.
pub(crate) static SCHEDULER: KernelCell<Scheduler<MAX_TASKS>> = KernelCell::new(Scheduler::empty());

// ---------------------------------------------------------------------------
// Kernel API
// ---------------------------------------------------------------------------

/// Register the task set and fabricate each task's initial frame.
///
/// `tasks[i]` runs on the stack region `TASK_STACKS[i]`; task 0 is started
/// first.
///
/// Must be called exactly once, before [`start`].
pub fn init(tasks: [TaskEntry; MAX_TASKS]) {
    let stack_tops = TASK_STACKS.map(|region| region.top_ptr());

    SCHEDULER.with(|scheduler| {
        *scheduler = Scheduler::new(stack_tops, tasks);
        // Safety: TASK_STACKS is checked at build time to be aligned,
        // disjoint and inside SRAM.
        unsafe { scheduler.init_task_stacks() };
    });

    log::info!("registered {} tasks", MAX_TASKS);
}

/// Start preemptive scheduling. **Does not return.**
///
/// Programs SysTick for `TICK_HZ`, moves Thread mode onto task 0's stack and
/// branches to task 0. From here on every tick hands the CPU to the next
/// task in registry order.
pub fn start(mut core_peripherals: cortex_m::Peripherals) -> ! {
    log::info!(
        "starting round-robin: {} tasks, {} Hz tick, reload {}",
        MAX_TASKS,
        TICK_HZ,
        SYSTICK_RELOAD
    );

    // Re-enabled by start_first_task once PSP is valid
    cortex_m::interrupt::disable();

    cortex_m0::configure_systick(&mut core_peripherals.SYST);

    // Safety: called once, on MSP, after init() built every task frame.
    unsafe { cortex_m0::start_first_task() }
}

/// Index of the task whose context is currently live.
pub fn current_task() -> usize {
    SCHEDULER.with(|scheduler| scheduler.current_task())
}
