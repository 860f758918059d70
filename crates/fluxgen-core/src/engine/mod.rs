//! # Engine Module
//!
//! The stateful layer of fluxgen: the rejection-sampling job driver and the
//! resources it owns.
//!
//! ## Architecture
//!
//! - **Job Driver** ([`scheduler`]) - The self-tuning rejection-sampling loop with its adaptive bound
//! - **Driver Pool** ([`pool`]) - One lazily built physics driver per target, owned for the job's lifetime
//! - **Configuration** ([`config`]) - Seed, initial bound, bound headroom and spline mode
//! - **Statistics** ([`stats`]) - Draw, miss, rejection and acceptance counters
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events for front ends
//! - **Error Handling** ([`error`]) - The engine error taxonomy
//!
//! ## Sampling Model
//!
//! For each probe the driver forms `P = Σ likelihood_i × length_i × weight` over the
//! segments reported by the geometry and accepts the probe with probability `P / Pmax`.
//! The bound only grows; a probe breaching it raises it and is accepted outright.
//! Flux exhaustion ends a job cleanly, every collaborator failure aborts it.

pub mod config;
pub mod error;
pub mod pool;
pub mod progress;
pub mod scheduler;
pub mod stats;
#[cfg(test)]
pub(crate) mod testing;
pub mod utils;
