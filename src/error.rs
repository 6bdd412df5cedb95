use crate::domain::{BloodGroup, Id, ValidationErrors};

/// A user-facing operation failure.
///
/// None of these leave storage modified. The `Display` text is the message
/// shown to the user.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// A required field was missing from a new record.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// No bank has the given identifier.
    #[error("bank not found: {0}")]
    BankNotFound(Id),

    /// No donor has the given identifier.
    #[error("donor not found: {0}")]
    DonorNotFound(Id),

    /// No request has the given identifier.
    #[error("request not found: {0}")]
    RequestNotFound(Id),

    /// The bank holds fewer units than requested.
    #[error(
        "insufficient units: {bank} holds {available} unit(s) of {blood_group}, {requested} requested"
    )]
    InsufficientUnits {
        /// Name of the bank.
        bank: String,
        /// Blood group drawn from.
        blood_group: BloodGroup,
        /// Units requested.
        requested: u32,
        /// Units held at the time.
        available: u32,
    },

    /// No backup exists at the given position.
    #[error("no backup at position {0}")]
    BackupNotFound(usize),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;
