//! Error taxonomy for booking operations.

use thiserror::Error;

/// Result type alias for booking operations.
pub type Result<T> = std::result::Result<T, BanquetError>;

/// Broad category of a [`BanquetError`].
///
/// Storage backends and the HTTP layer branch on the kind rather than on
/// individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request was malformed or incomplete.
    Validation,
    /// Credentials did not match.
    Authentication,
    /// Caller is known but not allowed to act.
    Authorization,
    /// Addressed record does not exist.
    NotFound,
    /// Request collides with existing data.
    Conflict,
    /// A hall would exceed its slot allowance.
    Capacity,
    /// Storage or infrastructure failure.
    Internal,
}

/// Every failure a booking operation can report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BanquetError {
    // ═══════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════

    /// One or more required fields were absent or blank.
    ///
    /// Field names are listed in request order.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A field was present but could not be interpreted.
    #[error("{0}")]
    InvalidInput(String),

    /// An identifier was not an integer.
    #[error("Invalid {field} format")]
    InvalidIdFormat {
        /// Name of the offending field
        field: &'static str,
        /// Value as supplied by the caller
        value: String,
    },

    /// Subscription plan name is not recognised.
    #[error("Invalid plan selected: {0}")]
    InvalidPlan(String),

    /// A hall carries more than the allowed number of slots.
    #[error(
        "Banquet hall \"{hall}\" has more than {limit} time slots. Maximum {limit} slots allowed per hall."
    )]
    CapacityExceeded {
        /// Hall that overflowed
        hall: String,
        /// Allowed slots per hall
        limit: usize,
    },

    // ═══════════════════════════════════════════════════════════
    // Authentication / Authorization Errors
    // ═══════════════════════════════════════════════════════════

    /// Unknown login id or wrong password.
    #[error("Invalid user ID or password")]
    InvalidCredentials,

    /// Company subscription has lapsed.
    #[error("Account has expired")]
    AccountExpired,

    /// User is not linked to the company.
    #[error("{0}")]
    Forbidden(String),

    // ═══════════════════════════════════════════════════════════
    // Lookup Errors
    // ═══════════════════════════════════════════════════════════

    /// Company id does not resolve.
    #[error("Company not found")]
    CompanyNotFound,

    /// Named record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    // ═══════════════════════════════════════════════════════════
    // Conflict Errors
    // ═══════════════════════════════════════════════════════════

    /// Customer name already registered for the company.
    #[error("Customer name already exists")]
    DuplicateName,

    /// Phone number already registered.
    #[error("Phone number already exists")]
    DuplicatePhone,

    /// A catalog entry with the same name already exists.
    #[error("{0}")]
    DuplicateEntry(String),

    /// Login id is already used by a company or company user.
    #[error("User ID already exists")]
    UserIdTaken,

    /// Hall, date and slot are already taken.
    #[error("This time slot is already booked")]
    SlotAlreadyBooked,

    // ═══════════════════════════════════════════════════════════
    // Infrastructure Errors
    // ═══════════════════════════════════════════════════════════

    /// Storage layer failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Any other unexpected failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BanquetError {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingFields(_)
            | Self::InvalidInput(_)
            | Self::InvalidIdFormat { .. }
            | Self::InvalidPlan(_) => ErrorKind::Validation,
            Self::CapacityExceeded { .. } => ErrorKind::Capacity,
            Self::InvalidCredentials => ErrorKind::Authentication,
            Self::AccountExpired | Self::Forbidden(_) => ErrorKind::Authorization,
            Self::CompanyNotFound | Self::NotFound(_) => ErrorKind::NotFound,
            Self::DuplicateName
            | Self::DuplicatePhone
            | Self::DuplicateEntry(_)
            | Self::UserIdTaken
            | Self::SlotAlreadyBooked => ErrorKind::Conflict,
            Self::Database(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller could fix the request and retry.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Internal)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_lists_names_in_order() {
        let err = BanquetError::MissingFields(vec!["company_id", "time_slot"]);
        assert_eq!(err.to_string(), "Missing required fields: company_id, time_slot");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn capacity_message_names_hall() {
        let err = BanquetError::CapacityExceeded {
            hall: "Hall A".to_string(),
            limit: 4,
        };
        assert!(err.to_string().contains("\"Hall A\""));
        assert!(err.to_string().contains("Maximum 4 slots"));
        assert_eq!(err.kind(), ErrorKind::Capacity);
    }

    #[test]
    fn kinds_cover_conflicts_and_internals() {
        assert_eq!(BanquetError::SlotAlreadyBooked.kind(), ErrorKind::Conflict);
        assert_eq!(BanquetError::DuplicatePhone.kind(), ErrorKind::Conflict);
        assert_eq!(BanquetError::AccountExpired.kind(), ErrorKind::Authorization);
        assert!(!BanquetError::Database("boom".into()).is_client_error());
        assert!(BanquetError::CompanyNotFound.is_client_error());
    }
}
