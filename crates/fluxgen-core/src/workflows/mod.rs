//! # Workflows Module
//!
//! Top-level entry points built on the engine. A workflow takes a job driver whose
//! collaborators are already bound, configures it if needed, and runs it to a
//! requested number of events while reporting progress.
//!
//! - **Generation Workflow** ([`generate`]) - Produce a batch of interaction records and a run summary

pub mod generate;
