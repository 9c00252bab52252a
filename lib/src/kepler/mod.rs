//! Keplerian orbits: elements, anomalies and propagation.

pub mod anomaly;
pub mod elements;
pub mod propagator;

pub use elements::KeplerianElements;
pub use propagator::{check_gravitational_parameter, compute_position, OrbitState, Propagator};
