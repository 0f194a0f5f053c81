// Response envelope shared by every backend endpoint

pub mod envelope;

pub use envelope::{ApiOutcome, Envelope, RawEnvelope};
