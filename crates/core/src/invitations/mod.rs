//! Single-use invitation tokens

pub mod ports;
pub mod service;

pub use service::InvitationService;
