//! Network layer - calls to the face swap service
//!
//! The Network actor receives service commands and sends back responses.

pub mod actor;
pub mod client;

pub use actor::NetworkActor;
pub use client::ApiClient;
