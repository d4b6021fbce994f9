//! Contact resolution for free-text attendee tokens

pub mod ports;
pub mod resolver;

pub use resolver::ContactResolver;
