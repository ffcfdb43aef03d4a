//! Recipient assignments backed by the recipients spreadsheet.

pub mod sheet;
pub mod xlsx_repository;

pub use xlsx_repository::XlsxAssignmentRepository;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// Header names in the recipients workbook.
pub const SENDER_EMAIL_COLUMN: &str = "Email";
pub const SENDER_NAME_COLUMN: &str = "Name";
pub const FIRST_NAME_COLUMN: &str = "Vārds / First Name";
pub const LAST_NAME_COLUMN: &str = "Uzvārds / Last Name";
pub const RECIPIENT_EMAIL_COLUMN: &str = "E-pasta adrese / Email Address";
pub const EMAIL_SENT_COLUMN: &str = "email_sent";

/// One person a sender still has to invite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub recipient_fname: String,
    pub recipient_lname: String,
    pub recipient_email: String,
    /// First name of the assigned sender.
    pub sender_name: String,
    /// Data row in the spreadsheet (0-based, header excluded).
    pub row_index: usize,
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Recipients assigned to `sender_email` whose row is not marked sent,
    /// in spreadsheet order. The lookup is case-insensitive.
    async fn pending_for(&self, sender_email: &str) -> Vec<Recipient>;

    /// Flag the given rows as sent and persist the whole table once.
    async fn mark_sent(&self, row_indices: &[usize]) -> Result<()>;
}
