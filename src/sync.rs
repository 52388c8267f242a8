//! # Synchronization Primitives
//!
//! Interrupt-safe access to the global scheduler state on a single core.
//!
//! Two access paths exist:
//! - Thread-mode code (`kernel::init`, `kernel::current_task`) goes through
//!   [`critical_section`], so SysTick cannot observe a half-written registry.
//! - The SysTick handler uses the raw pointer from [`KernelCell::get`]
//!   directly: nothing can preempt it that also touches the scheduler.

use core::cell::UnsafeCell;

use cortex_m::interrupt;

/// Execute a closure with interrupts disabled.
///
/// Interrupts are restored to their previous state on exit.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(&interrupt::CriticalSection) -> R,
{
    interrupt::free(f)
}

/// Statically allocated kernel state shared between thread mode and the
/// SysTick handler.
pub struct KernelCell<T>(UnsafeCell<T>);

// Safety: single core; every access is either inside `critical_section` or
// inside the SysTick handler, which cannot be re-entered.
unsafe impl<T> Sync for KernelCell<T> {}

impl<T> KernelCell<T> {
    pub const fn new(value: T) -> Self {
        Self(UnsafeCell::new(value))
    }

    /// Raw pointer to the contents, for handler code.
    #[inline]
    pub const fn get(&self) -> *mut T {
        self.0.get()
    }

    /// Exclusive access for the duration of a critical section.
    #[inline]
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        critical_section(|_cs| {
            // Safety: interrupts are off and the handler is the only other user.
            f(unsafe { &mut *self.0.get() })
        })
    }
}
