//! Port interfaces for address books

use async_trait::async_trait;
use showup_domain::{Contact, Result};

/// Trait for address-book persistence
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// All contacts owned by an account
    async fn list_contacts(&self, account_id: &str) -> Result<Vec<Contact>>;

    /// Replace an account's address book; returns the number stored
    async fn replace_contacts(&self, account_id: &str, contacts: &[Contact]) -> Result<usize>;
}
