//! # fluxgen Core Library
//!
//! The orchestration engine of a Monte Carlo particle-interaction generator: it draws
//! incident probes from a flux model, asks a detector geometry what each probe
//! traverses, and uses self-tuning rejection sampling to decide whether and where an
//! interaction happens before handing final-state generation to a per-target physics
//! driver.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Plain data models (`ProbeSample`, `PathLengthList`,
//!   `InteractionRecord`), the collaborator interfaces (`FluxSource`, `GeometryAnalyzer`,
//!   `PhysicsDriver`) and physics-support utilities such as energy splines.
//!
//! - **[`engine`]: The Logic Core.** The `JobDriver` rejection-sampling loop, its adaptive
//!   probability bound and the `DriverPool` that owns one physics driver per target.
//!
//! - **[`workflows`]: The Public API.** Batch generation on top of the engine, with progress
//!   reporting and run summaries.
//!
//! Concrete flux, geometry and physics models are supplied by the caller.

pub mod core;
pub mod engine;
pub mod workflows;
