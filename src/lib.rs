//! # rrsched — Round-Robin Scheduler
//!
//! A minimal preemptive round-robin task scheduler for single-core ARM
//! Cortex-M0 microcontrollers with no OS underneath.
//!
//! ## Overview
//!
//! A fixed, compile-time set of tasks shares one CPU. Each task has its own
//! stack and runs an infinite loop. SysTick fires every `1 / TICK_HZ` seconds;
//! its handler saves the running task's context onto that task's stack and
//! resumes the next task in registry order. Tasks never yield, block or exit.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    Application Tasks                    │
//! ├────────────────────────────────────────────────────────┤
//! │                 Kernel API (kernel.rs)                  │
//! │                init() · start() · current_task()        │
//! ├──────────────┬──────────────────┬──────────────────────┤
//! │  Scheduler   │  Frame Layout    │  Config / Stacks     │
//! │  scheduler.rs│  frame.rs        │  config.rs stack.rs  │
//! │  ─ advance() │  ─ SoftwareFrame │  ─ validate_layout() │
//! │  ─ switch_   │  ─ HardwareFrame │  timer.rs            │
//! │    context() │  ─ InitialFrame  │  ─ reload_value()    │
//! ├──────────────┴──────────────────┴──────────────────────┤
//! │              Task Registry (task.rs)                    │
//! │              TaskSlot · TaskEntry                       │
//! ├────────────────────────────────────────────────────────┤
//! │            Arch Port (arch/cortex_m0.rs)                │
//! │    SysTick context switch · SysTick config · PSP switch │
//! ├────────────────────────────────────────────────────────┤
//! │         ARM Cortex-M0 Hardware (Armv6-M)                │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Memory Model
//!
//! - **No heap**: all state is statically allocated
//! - **Fixed task stacks**: carved from the top of SRAM by `config.rs`,
//!   checked for overlap and size at compile time
//! - **One writer**: after start, only the SysTick handler touches the
//!   scheduler
//!
//! ## Building
//!
//! The firmware targets `thumbv6m-none-eabi`. Everything outside `arch`,
//! `kernel` and `logger` is portable, and `cargo test` runs its unit tests
//! on the host.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod frame;
pub mod scheduler;
pub mod stack;
pub mod sync;
pub mod task;
pub mod timer;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod arch;
#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod kernel;
#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod logger;
