//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (alerthub-infra) implements. The core crate never depends on any
//! specific storage technology.

pub mod reference;
pub mod report;
pub mod user;
