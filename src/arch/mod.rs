//! # Architecture Abstraction Layer
//!
//! The hardware boundary of the scheduler. Only built for bare-metal ARM;
//! the rest of the crate is portable and tested on the host.

pub mod cortex_m0;
