//! Ports (trait boundaries) for external dependencies.
//!
//! These traits are owned by the domain and implemented by agents, storage
//! adapters and observers.

pub mod agent;
pub mod observer;
pub mod repository;

pub use agent::Agent;
pub use observer::Observer;
pub use repository::{PolicyRepository, policy_key};
