//! # Core Models Module
//!
//! Plain data carried between the job driver and its collaborators.
//!
//! ## Key Components
//!
//! - [`ids`] - Particle and target identities (`ParticleCode`, `TargetId`)
//! - [`probe`] - Incident probe samples drawn from a flux source
//! - [`path`] - Per-probe lists of traversed targets and path lengths
//! - [`record`] - Generated interaction records and their particles
//!
//! ## Usage
//!
//! ```ignore
//! use fluxgen::core::models::{ids::{ParticleCode, TargetId}, probe::ProbeSample, path::PathLengthList};
//!
//! let probe = ProbeSample::new(ParticleCode::NU_MU, 2.0, Vector3::z(), Point3::origin());
//! let mut paths = PathLengthList::new();
//! paths.push(TargetId::nucleus(6, 12), 10.0);
//! ```

pub mod ids;
pub(crate) mod particles;
pub mod path;
pub mod probe;
pub mod record;
