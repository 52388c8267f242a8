//! # rrsched Example Firmware
//!
//! Four tasks share the CPU in 1 ms slices, each printing its name to the
//! debugger console over semihosting:
//!
//! | Task | Stack top | Output |
//! |------|-----------|--------|
//! | `task1_handler` | `SRAM_END` | `This is task 1` |
//! | `task2_handler` | `SRAM_END - 1 KiB` | `This is task 2` |
//! | `task3_handler` | `SRAM_END - 2 KiB` | `This is task 3` |
//! | `task4_handler` | `SRAM_END - 3 KiB` | `This is task 4` |
//!
//! Run under a debugger with semihosting enabled (e.g. OpenOCD
//! `arm semihosting enable`), otherwise the first print faults.
//!
//! On the host this binary is only a stub so that `cargo build` of the whole
//! package works; the firmware is built with
//! `--target thumbv6m-none-eabi`.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod firmware {
    use cortex_m_rt::entry;
    use cortex_m_semihosting::hprintln;
    use log::LevelFilter;
    use panic_halt as _;

    use rrsched::{kernel, logger};

    // -----------------------------------------------------------------------
    // Task entry points
    // -----------------------------------------------------------------------

    extern "C" fn task1_handler() -> ! {
        loop {
            let _ = hprintln!("This is task 1");
        }
    }

    extern "C" fn task2_handler() -> ! {
        loop {
            let _ = hprintln!("This is task 2");
        }
    }

    extern "C" fn task3_handler() -> ! {
        loop {
            let _ = hprintln!("This is task 3");
        }
    }

    extern "C" fn task4_handler() -> ! {
        loop {
            let _ = hprintln!("This is task 4");
        }
    }

    // -----------------------------------------------------------------------
    // Main entry point
    // -----------------------------------------------------------------------

    /// Firmware entry point. Runs on the scheduler stack (MSP), registers
    /// the tasks and starts the scheduler. Does not return.
    #[entry]
    fn main() -> ! {
        // Safety: nothing else runs yet.
        unsafe { logger::init(LevelFilter::Info) };

        let cp = cortex_m::Peripherals::take().unwrap();

        kernel::init([task1_handler, task2_handler, task3_handler, task4_handler]);

        // Start the scheduler — does not return
        kernel::start(cp)
    }
}

#[cfg(not(target_os = "none"))]
fn main() {
    eprintln!("rrsched is firmware; build it with --target thumbv6m-none-eabi");
}
