//! # Stack Regions
//!
//! Each task owns a disjoint, statically reserved slice of SRAM used as its
//! private (PSP) stack. Nothing checks these at runtime: an overlapping or
//! undersized region silently corrupts a neighbour. Instead the configured
//! regions go through [`validate_layout`] in a `const` context, so a broken
//! memory map is a build failure.

use core::fmt;

use crate::frame::InitialFrame;

/// Stacks must stay 8-byte aligned at exception entry (AAPCS).
pub const STACK_ALIGN: u32 = 8;

/// A full-descending stack: grows down from `top`, owns `[top - size, top)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackRegion {
    top: u32,
    size: u32,
}

impl StackRegion {
    pub const fn new(top: u32, size: u32) -> Self {
        Self { top, size }
    }

    #[inline]
    pub const fn top(&self) -> u32 {
        self.top
    }

    #[inline]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Lowest address owned by the region, `None` if it would wrap below zero.
    pub const fn bottom(&self) -> Option<u32> {
        self.top.checked_sub(self.size)
    }

    /// Top of the stack as a word pointer, as loaded into PSP.
    #[inline]
    pub const fn top_ptr(&self) -> *mut u32 {
        self.top as usize as *mut u32
    }

    /// True if the two regions share at least one byte.
    pub const fn overlaps(&self, other: &StackRegion) -> bool {
        let (Some(a_bottom), Some(b_bottom)) = (self.bottom(), other.bottom()) else {
            return true;
        };
        a_bottom < other.top && b_bottom < self.top
    }
}

/// Which configured region a [`LayoutError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Task(usize),
    Scheduler,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Task(id) => write!(f, "task {} stack", id),
            Region::Scheduler => f.write_str("scheduler stack"),
        }
    }
}

/// A static memory-map mistake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// The stack top is not 8-byte aligned.
    Misaligned(Region),
    /// The region cannot even hold the fabricated exception frame.
    TooSmall(Region),
    /// The region is not entirely inside SRAM.
    OutOfRam(Region),
    /// Two regions share memory.
    Overlap(Region, Region),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Misaligned(r) => write!(f, "{} top is not {}-byte aligned", r, STACK_ALIGN),
            LayoutError::TooSmall(r) => write!(f, "{} cannot hold an exception frame", r),
            LayoutError::OutOfRam(r) => write!(f, "{} lies outside SRAM", r),
            LayoutError::Overlap(a, b) => write!(f, "{} overlaps {}", a, b),
        }
    }
}

const MIN_STACK_SIZE: u32 = (InitialFrame::WORDS * 4) as u32;

const fn check_region(region: &StackRegion, id: Region, ram_start: u32, ram_end: u32) -> Result<(), LayoutError> {
    if region.top % STACK_ALIGN != 0 {
        return Err(LayoutError::Misaligned(id));
    }
    if region.size < MIN_STACK_SIZE {
        return Err(LayoutError::TooSmall(id));
    }
    match region.bottom() {
        Some(bottom) if bottom >= ram_start && region.top <= ram_end => Ok(()),
        _ => Err(LayoutError::OutOfRam(id)),
    }
}

/// Check the task stacks and the scheduler stack against each other and
/// against SRAM `[ram_start, ram_end)`.
///
/// Every region must be aligned, big enough for the fabricated frame, inside
/// SRAM, and disjoint from every other region.
pub const fn validate_layout(
    tasks: &[StackRegion],
    scheduler: StackRegion,
    ram_start: u32,
    ram_end: u32,
) -> Result<(), LayoutError> {
    if let Err(e) = check_region(&scheduler, Region::Scheduler, ram_start, ram_end) {
        return Err(e);
    }

    let mut i = 0;
    while i < tasks.len() {
        if let Err(e) = check_region(&tasks[i], Region::Task(i), ram_start, ram_end) {
            return Err(e);
        }
        if tasks[i].overlaps(&scheduler) {
            return Err(LayoutError::Overlap(Region::Task(i), Region::Scheduler));
        }
        let mut j = i + 1;
        while j < tasks.len() {
            if tasks[i].overlaps(&tasks[j]) {
                return Err(LayoutError::Overlap(Region::Task(i), Region::Task(j)));
            }
            j += 1;
        }
        i += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAM_START: u32 = 0x2000_0000;
    const RAM_END: u32 = 0x2000_4000;

    fn stacks(count: u32, size: u32) -> [StackRegion; 4] {
        let mut out = [StackRegion::new(0, 0); 4];
        for i in 0..count {
            out[i as usize] = StackRegion::new(RAM_END - i * size, size);
        }
        out
    }

    #[test]
    fn test_adjacent_regions_do_not_overlap() {
        let a = StackRegion::new(0x2000_4000, 1024);
        let b = StackRegion::new(0x2000_3C00, 1024);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_overlapping_regions_detected() {
        let a = StackRegion::new(0x2000_4000, 1024);
        let b = StackRegion::new(0x2000_3E00, 1024);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_valid_layout() {
        let tasks = stacks(4, 1024);
        let sched = StackRegion::new(RAM_END - 4 * 1024, 1024);
        assert_eq!(validate_layout(&tasks, sched, RAM_START, RAM_END), Ok(()));
    }

    #[test]
    fn test_task_stacks_overlapping_each_other() {
        let mut tasks = stacks(4, 1024);
        tasks[2] = StackRegion::new(RAM_END - 1024 - 512, 1024);
        let sched = StackRegion::new(RAM_END - 4 * 1024, 1024);
        assert_eq!(
            validate_layout(&tasks, sched, RAM_START, RAM_END),
            Err(LayoutError::Overlap(Region::Task(1), Region::Task(2)))
        );
    }

    #[test]
    fn test_scheduler_stack_overlapping_task() {
        let tasks = stacks(4, 1024);
        let sched = StackRegion::new(RAM_END - 3 * 1024, 1024);
        assert_eq!(
            validate_layout(&tasks, sched, RAM_START, RAM_END),
            Err(LayoutError::Overlap(Region::Task(3), Region::Scheduler))
        );
    }

    #[test]
    fn test_misaligned_top_rejected() {
        let mut tasks = stacks(4, 1024);
        tasks[1] = StackRegion::new(RAM_END - 1024 - 4, 1016);
        let sched = StackRegion::new(RAM_END - 4 * 1024, 1024);
        assert_eq!(
            validate_layout(&tasks, sched, RAM_START, RAM_END),
            Err(LayoutError::Misaligned(Region::Task(1)))
        );
    }

    #[test]
    fn test_region_too_small_for_frame() {
        let tasks = [StackRegion::new(RAM_END, 32)];
        let sched = StackRegion::new(RAM_END - 1024, 1024);
        assert_eq!(
            validate_layout(&tasks, sched, RAM_START, RAM_END),
            Err(LayoutError::TooSmall(Region::Task(0)))
        );
    }

    #[test]
    fn test_region_outside_ram() {
        let tasks = [StackRegion::new(RAM_END + 1024, 1024)];
        let sched = StackRegion::new(RAM_END - 1024, 1024);
        assert_eq!(
            validate_layout(&tasks, sched, RAM_START, RAM_END),
            Err(LayoutError::OutOfRam(Region::Task(0)))
        );
    }
}
