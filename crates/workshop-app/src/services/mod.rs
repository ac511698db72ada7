//! Service layer for the workshop app.
//!
//! # Components
//!
//! - `faults` - Fault injection strategy used by the synthetic endpoints

pub mod faults;

pub use faults::FaultInjector;
