//! # Physics Support Module
//!
//! Reusable building blocks for physics drivers. Nothing here models a specific
//! interaction; drivers combine these pieces with their own cross sections.
//!
//! - [`spline`] - Energy splines with linear or log-energy indexing, used to cache
//!   expensive likelihood evaluations once per job
//! - [`tables`] - Energy-binned species fraction tables (e.g. charm-hadron production),
//!   owned explicitly and handed to the drivers that need them

pub mod spline;
pub mod tables;
