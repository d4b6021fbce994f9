//! Reconciliation between the store and the external ledger

pub mod service;

pub use service::{Reconciler, StakeVerification};
