//! # Core Module
//!
//! Stateless foundation of the job driver: the data exchanged with collaborators,
//! the collaborator interfaces themselves, and physics-support utilities.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Probes, path-length lists, target identities and interaction records
//! - **Collaborator Interfaces** ([`traits`]) - `FluxSource`, `GeometryAnalyzer`, `PhysicsDriver`
//!   and the `DriverFactory` seam used by the driver pool
//! - **Physics Support** ([`physics`]) - Energy splines and species fraction tables
//!
//! Concrete flux, geometry and physics models live outside this crate; the core
//! only fixes the contracts the scheduler relies on.

pub mod models;
pub mod physics;
pub mod traits;
