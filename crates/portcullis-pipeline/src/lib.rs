//! Portcullis Pipeline - turns a captured image into an authorization
//! decision, a gate command, and a durable audit record
//!
//! One attempt moves through `Received -> Recognizing -> Resolving ->
//! Deciding -> Actuating -> Logged`, strictly sequential. No stage retries;
//! a failure terminates the attempt at its stage and the audit record is
//! still written, tagged with the terminal stage and error kind.
//!
//! The pipeline is the sole writer of [`portcullis_types::AccessAttempt`]
//! records and the only component with cross-cutting failure handling: the
//! recognition service, the registry, and the command channel fail
//! independently, and none of those failures may take the pipeline down.

#![deny(unsafe_code)]

mod context;
mod error;
pub mod mocks;
mod pipeline;
mod policy;

pub use context::AttemptContext;
pub use error::PipelineError;
pub use pipeline::{AccessPipeline, PipelineConfig};
pub use policy::{authorize, CONFIDENCE_THRESHOLD};
