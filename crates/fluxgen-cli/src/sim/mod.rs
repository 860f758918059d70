//! Reference collaborators used by the command-line front end: a parametric beam
//! flux, a slab-stack geometry and a channel-based physics driver.

pub mod flux;
pub mod geometry;
pub mod physics;
pub mod tables;
