//! Onset detection modules

pub mod envelope;
pub mod peaks;

pub use envelope::{EnvelopeExtractor, OnsetEnvelope};
pub use peaks::{PeakPicker, PeakSet};
