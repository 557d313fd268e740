//! Session engine adapters.

mod simulated;

pub use simulated::SimulatedVenue;
