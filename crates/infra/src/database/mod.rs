//! Database implementations

pub mod contact_repository;
pub mod invitation_repository;
pub mod manager;
pub mod meeting_repository;
mod rows;

pub use contact_repository::*;
pub use invitation_repository::*;
pub use manager::*;
pub use meeting_repository::*;
