//! # Cortex-M0 Port Layer
//!
//! Hardware-specific code for the ARM Cortex-M0 (Armv6-M, Thumb-1 subset).
//! Implements the SysTick context switch, SysTick configuration and the
//! one-time hand-over from the main stack to the first task's stack.
//!
//! ## Context Switch Mechanism
//!
//! The Cortex-M0 uses a split-stack model:
//! - **MSP** (Main Stack Pointer): used by `main` and by exception handlers
//! - **PSP** (Process Stack Pointer): used by tasks in Thread mode
//!
//! On exception entry the hardware stacks R0–R3, R12, LR, PC and xPSR onto
//! the process stack. The SysTick handler stores R4–R11 below them, which
//! completes the frame described in [`crate::frame`].
//!
//! Armv6-M has no `stmdb`/`ldmia` for high registers and `str`/`ldr` only
//! take low registers, so R8–R11 are moved through R1 one at a time.

use core::arch::naked_asm;

use cortex_m::peripheral::syst::SystClkSource;

use crate::config::SYSTICK_RELOAD;
use crate::frame::{SoftwareFrame, CONTROL_SPSEL};
use crate::kernel::SCHEDULER;

// ---------------------------------------------------------------------------
// SysTick configuration
// ---------------------------------------------------------------------------

/// Configure SysTick to fire every `1 / TICK_HZ` seconds from the core clock.
///
/// There is no matching disable: once enabled the tick runs until reset.
pub fn configure_systick(syst: &mut cortex_m::peripheral::SYST) {
    syst.set_reload(SYSTICK_RELOAD);
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_interrupt();
    syst.enable_counter();
}

// ---------------------------------------------------------------------------
// Stack switch and first task launch
// ---------------------------------------------------------------------------

/// Move Thread mode from MSP onto the current task's stack.
///
/// Loads PSP with the saved stack pointer of `current_task` and sets
/// CONTROL.SPSEL, then returns to the caller, which is now running on PSP.
///
/// Register contract: no inputs; clobbers r0, r1 and r2-r3/r12 through the
/// call to `current_stack_pointer`; LR is preserved on MSP across that call.
/// Naked because the stack it returns on is not the one it was called on.
///
/// # Safety
/// Call once, from privileged Thread mode on MSP, after the task stacks have
/// been built and with interrupts masked.
#[unsafe(naked)]
pub unsafe extern "C" fn switch_to_process_stack() {
    naked_asm!(
        // keep LR (and 8-byte alignment) on MSP across the call
        "push {{r0, lr}}",
        "bl {current_sp}",
        "msr psp, r0",
        "pop {{r0, r1}}",
        "mov lr, r1",

        // Thread mode now uses PSP
        "movs r0, #{spsel}",
        "msr control, r0",
        "isb",
        "bx lr",

        current_sp = sym current_stack_pointer,
        spsel = const CONTROL_SPSEL,
    );
}

/// Switch to the first task's stack and call its entry point directly.
///
/// Interrupts are unmasked right before the branch, so the first tick can
/// only arrive once PSP is valid.
///
/// # Safety
/// Same as [`switch_to_process_stack`].
#[unsafe(naked)]
pub unsafe extern "C" fn start_first_task() -> ! {
    naked_asm!(
        "bl {switch}",
        "bl {entry}",
        "cpsie i",
        "bx r0",

        switch = sym switch_to_process_stack,
        entry = sym current_entry_address,
    );
}

// ---------------------------------------------------------------------------
// SysTick handler (context switch)
// ---------------------------------------------------------------------------

/// SysTick exception handler: preempt the running task and resume the next.
///
/// ## Sequence
/// 1. Read PSP and store R4–R11 below the hardware frame
/// 2. `context_switch` records the new PSP, advances the round-robin and
///    returns the next task's saved stack pointer
/// 3. Load R4–R11 from it and point PSP past them
/// 4. Exception return (EXC_RETURN kept in LR): the hardware unstacks the
///    rest of the frame and the next task resumes
///
/// # Safety
/// Called only by the NVIC. R4–R11 hold the interrupted task's values on
/// entry and must hold the next task's values on exit; only R0–R3, R12 and
/// LR (all hardware-stacked) are used as scratch.
#[no_mangle]
#[unsafe(naked)]
pub unsafe extern "C" fn SysTick() {
    naked_asm!(
        // --- Save current context ---
        "mrs r0, psp",
        "subs r0, #{frame_size}",
        "str r4, [r0, #{r4}]",
        "str r5, [r0, #{r5}]",
        "str r6, [r0, #{r6}]",
        "str r7, [r0, #{r7}]",
        "mov r1, r8",
        "str r1, [r0, #{r8}]",
        "mov r1, r9",
        "str r1, [r0, #{r9}]",
        "mov r1, r10",
        "str r1, [r0, #{r10}]",
        "mov r1, r11",
        "str r1, [r0, #{r11}]",

        // EXC_RETURN stays on MSP across the call
        "push {{r2, lr}}",

        // --- Select next task ---
        "bl {switch}",             // r0 = context_switch(r0)

        // --- Restore next context ---
        "ldr r1, [r0, #{r8}]",
        "mov r8, r1",
        "ldr r1, [r0, #{r9}]",
        "mov r9, r1",
        "ldr r1, [r0, #{r10}]",
        "mov r10, r1",
        "ldr r1, [r0, #{r11}]",
        "mov r11, r1",
        "ldr r4, [r0, #{r4}]",
        "ldr r5, [r0, #{r5}]",
        "ldr r6, [r0, #{r6}]",
        "ldr r7, [r0, #{r7}]",
        "adds r0, #{frame_size}",
        "msr psp, r0",

        // Return to Thread mode on PSP
        "pop {{r2, pc}}",

        switch = sym context_switch,
        frame_size = const SoftwareFrame::SIZE,
        r4 = const SoftwareFrame::R4_OFFSET,
        r5 = const SoftwareFrame::R5_OFFSET,
        r6 = const SoftwareFrame::R6_OFFSET,
        r7 = const SoftwareFrame::R7_OFFSET,
        r8 = const SoftwareFrame::R8_OFFSET,
        r9 = const SoftwareFrame::R9_OFFSET,
        r10 = const SoftwareFrame::R10_OFFSET,
        r11 = const SoftwareFrame::R11_OFFSET,
    );
}

// ---------------------------------------------------------------------------
// Scheduler access for the assembly above
// ---------------------------------------------------------------------------

/// Save the preempted task's stack pointer and return the next one.
/// Called from SysTick.
///
/// # Safety
/// Called from handler context only; SysTick does not nest, so this is the
/// sole user of the scheduler while it runs.
unsafe extern "C" fn context_switch(saved: *mut u32) -> *mut u32 {
    let scheduler = &mut *SCHEDULER.get();
    scheduler.switch_context(saved)
}

/// Saved stack pointer of the current task. Called from the stack switch.
unsafe extern "C" fn current_stack_pointer() -> *mut u32 {
    (*SCHEDULER.get()).current_stack_pointer()
}

/// Entry address of the current task. Called when launching the first task.
unsafe extern "C" fn current_entry_address() -> u32 {
    let scheduler = &*SCHEDULER.get();
    scheduler.entry(scheduler.current_task()) as usize as u32
}
