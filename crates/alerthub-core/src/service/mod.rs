//! Business logic services (use cases).
//!
//! Services orchestrate repository calls and business rules. They depend on
//! traits (ports) -- never on concrete infrastructure implementations.

pub mod auth;
pub mod credentials;
pub mod heatmap;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;
