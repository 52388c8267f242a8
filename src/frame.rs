//! # Exception Frame Layout
//!
//! The binary contract shared by the stack layout builder and the SysTick
//! context switch. Both sides derive every offset from the structs below, so
//! a fabricated frame and a frame saved by the handler are interchangeable.
//!
//! ## Frame on a task stack (high address at the top)
//!
//! ```text
//! ┌────────────────────┐ ◄── stack top / PSP before exception entry
//! │ xPSR               │ ┐
//! │ PC                 │ │
//! │ LR                 │ │  HardwareFrame: stacked by the core on
//! │ R12                │ │  exception entry, unstacked on return
//! │ R3 R2 R1 R0        │ ┘
//! ├────────────────────┤ ◄── PSP inside the handler
//! │ R11 R10 R9 R8      │ ┐  SoftwareFrame: stored and loaded by the
//! │ R7 R6 R5 R4        │ ┘  SysTick handler
//! └────────────────────┘ ◄── saved stack pointer in the registry
//! ```

use core::mem::{offset_of, size_of};

use crate::task::TaskEntry;

/// xPSR of a task that has never run: only the Thumb state bit (T, bit 24).
pub const DUMMY_XPSR: u32 = 0x0100_0000;

/// EXC_RETURN: return to Thread mode, use the process stack (PSP).
pub const EXC_RETURN_THREAD_PSP: u32 = 0xFFFF_FFFD;

/// CONTROL.SPSEL: Thread mode uses PSP instead of MSP.
pub const CONTROL_SPSEL: u32 = 0b10;

/// Registers the core does not stack on exception entry.
///
/// Field order is memory order: `r4` sits at the saved stack pointer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoftwareFrame {
    pub r4: u32,
    pub r5: u32,
    pub r6: u32,
    pub r7: u32,
    pub r8: u32,
    pub r9: u32,
    pub r10: u32,
    pub r11: u32,
}

impl SoftwareFrame {
    /// Bytes the handler moves the stack pointer by when saving/restoring.
    pub const SIZE: usize = size_of::<SoftwareFrame>();

    pub const R4_OFFSET: usize = offset_of!(SoftwareFrame, r4);
    pub const R5_OFFSET: usize = offset_of!(SoftwareFrame, r5);
    pub const R6_OFFSET: usize = offset_of!(SoftwareFrame, r6);
    pub const R7_OFFSET: usize = offset_of!(SoftwareFrame, r7);
    pub const R8_OFFSET: usize = offset_of!(SoftwareFrame, r8);
    pub const R9_OFFSET: usize = offset_of!(SoftwareFrame, r9);
    pub const R10_OFFSET: usize = offset_of!(SoftwareFrame, r10);
    pub const R11_OFFSET: usize = offset_of!(SoftwareFrame, r11);
}

/// Registers the core stacks automatically on exception entry, in the order
/// the architecture defines.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HardwareFrame {
    pub r0: u32,
    pub r1: u32,
    pub r2: u32,
    pub r3: u32,
    pub r12: u32,
    pub lr: u32,
    pub pc: u32,
    pub xpsr: u32,
}

/// The full image of a suspended task, as found at its saved stack pointer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitialFrame {
    pub software: SoftwareFrame,
    pub hardware: HardwareFrame,
}

impl InitialFrame {
    pub const WORDS: usize = size_of::<InitialFrame>() / size_of::<u32>();

    /// Fabricate the frame of a task that has never run.
    ///
    /// Returning from an exception through this frame lands on `entry` in
    /// Thread mode on PSP, with every general register zero.
    pub fn fabricate(entry: TaskEntry) -> Self {
        Self {
            software: SoftwareFrame::default(),
            hardware: HardwareFrame {
                lr: EXC_RETURN_THREAD_PSP,
                pc: resume_address(entry),
                xpsr: DUMMY_XPSR,
                ..HardwareFrame::default()
            },
        }
    }
}

const _: () = assert!(SoftwareFrame::SIZE == 8 * 4);
const _: () = assert!(size_of::<HardwareFrame>() == 8 * 4);
const _: () = assert!(InitialFrame::WORDS == 16);
const _: () = assert!(offset_of!(InitialFrame, hardware) == SoftwareFrame::SIZE);

/// Address the core resumes at for `entry`.
///
/// Function pointers carry the Thumb interworking bit; an exception return
/// address must have bit 0 clear.
pub fn resume_address(entry: TaskEntry) -> u32 {
    (entry as usize as u32) & !1
}

/// Push `frame` onto a full-descending stack of words.
///
/// Returns the new stack pointer, which addresses the first field of `frame`.
///
/// # Safety
/// `sp` must be word aligned and the `size_of::<F>()` bytes below it must be
/// writable memory owned by the caller.
pub unsafe fn push<F: Copy>(sp: *mut u32, frame: F) -> *mut u32 {
    let base = sp.cast::<u8>().sub(size_of::<F>()).cast::<F>();
    base.write(frame);
    base.cast()
}

/// Pop a frame of type `F` off a full-descending stack of words.
///
/// Returns the frame and the stack pointer just past it.
///
/// # Safety
/// `sp` must address a valid, initialized `F`.
pub unsafe fn pop<F: Copy>(sp: *mut u32) -> (F, *mut u32) {
    let frame = sp.cast::<F>().read();
    (frame, sp.cast::<u8>().add(size_of::<F>()).cast())
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn idle() -> ! {
        loop {}
    }

    #[test]
    fn test_software_frame_offsets() {
        assert_eq!(SoftwareFrame::R4_OFFSET, 0);
        assert_eq!(SoftwareFrame::R7_OFFSET, 12);
        assert_eq!(SoftwareFrame::R8_OFFSET, 16);
        assert_eq!(SoftwareFrame::R11_OFFSET, 28);
        assert_eq!(SoftwareFrame::SIZE, 32);
    }

    #[test]
    fn test_hardware_frame_order() {
        assert_eq!(offset_of!(HardwareFrame, r0), 0);
        assert_eq!(offset_of!(HardwareFrame, r12), 16);
        assert_eq!(offset_of!(HardwareFrame, lr), 20);
        assert_eq!(offset_of!(HardwareFrame, pc), 24);
        assert_eq!(offset_of!(HardwareFrame, xpsr), 28);
    }

    #[test]
    fn test_fabricated_frame_contents() {
        let frame = InitialFrame::fabricate(idle);
        assert_eq!(frame.software, SoftwareFrame::default());
        assert_eq!(frame.hardware.xpsr, DUMMY_XPSR);
        assert_eq!(frame.hardware.pc, resume_address(idle));
        assert_eq!(frame.hardware.lr, EXC_RETURN_THREAD_PSP);
        assert_eq!(frame.hardware.r0, 0);
        assert_eq!(frame.hardware.r12, 0);
    }

    #[test]
    fn test_resume_address_clears_thumb_bit() {
        assert_eq!(resume_address(idle) & 1, 0);
    }

    #[test]
    fn test_push_and_pop_move_stack_pointer() {
        let mut memory = [0u32; 16];
        let top = unsafe { memory.as_mut_ptr().add(16) };
        let regs = SoftwareFrame { r4: 4, r11: 11, ..SoftwareFrame::default() };

        let sp = unsafe { push(top, regs) };
        assert_eq!(sp, unsafe { top.sub(8) });
        assert_eq!(memory[8], 4);
        assert_eq!(memory[15], 11);

        let (popped, sp) = unsafe { pop::<SoftwareFrame>(top.wrapping_sub(8)) };
        assert_eq!(popped, regs);
        assert_eq!(sp, top);
    }
}
