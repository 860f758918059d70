//! Utility functions for the engine module.
//!
//! Currently holds the weighted index sampler shared by segment selection in the
//! job driver and by drivers that pick among their own interaction channels.

pub mod sampling;
