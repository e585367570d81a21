//! REST request handlers

mod access;
mod gate;
mod health;
mod vehicles;
mod visitors;

pub use access::{list_attempts, scan_image};
pub use gate::{close_gate, open_gate, request_capture};
pub use health::{health_check, recognition_health};
pub use vehicles::{create_vehicle, delete_vehicle, list_vehicles};
pub use visitors::{create_invitation, list_visitors, verify_visitor};
