//! Portcullis Channel - command transport to the physical gate actuator
//!
//! Publishing is fire-and-forget at the transport level: a send returns once
//! the message is handed to the transport, not once the actuator confirms
//! motion. Delivery is at-most-once with no confirmation of physical effect;
//! [`Ack`] makes that contract explicit in the type.
//!
//! The transport itself is a seam ([`CommandTransport`]). The in-process
//! implementation distributes over a broadcast channel; a broker-backed
//! implementation plugs in behind the same trait.

#![deny(unsafe_code)]

mod channel;
mod error;
mod transport;

pub use channel::{Ack, ChannelConfig, GateChannel};
pub use error::ChannelError;
pub use transport::{CommandTransport, InProcessTransport};
