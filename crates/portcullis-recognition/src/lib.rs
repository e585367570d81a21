//! Recognition Client - talks to the external plate recognition service
//!
//! The service accepts an image and returns zero or more candidate plate
//! strings with confidence scores and regions. Zero candidates is a valid
//! outcome ("no plate detected"), distinct from a transport failure; callers
//! branch on it explicitly via [`RankedCandidates::is_empty`].
//!
//! Full-frame recognition and lightweight re-verification are distinct
//! operations with distinct timeouts (30 s and 15 s), not interchangeable.

#![deny(unsafe_code)]

mod client;
mod error;

pub use client::{RecognitionClient, Recognizer, FULL_RECOGNITION_TIMEOUT, REVERIFY_TIMEOUT};
pub use error::RecognitionError;

pub use portcullis_types::RankedCandidates;
