//! Mapping from `sqlx` failures to domain errors.

use banquet_core::error::BanquetError;

/// Unique constraint guarding a (company, hall, date, slot) reservation.
pub(crate) const BOOKING_SLOT_KEY: &str = "banquet_bookings_slot_key";

/// Wrap any database failure with what was being attempted.
pub(crate) fn database(context: &str, err: &sqlx::Error) -> BanquetError {
    BanquetError::Database(format!("{context}: {err}"))
}

/// Name of the violated unique constraint, if `err` is a unique violation.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Some(db_err.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

/// Map a write failure, translating violations of the listed constraints.
pub(crate) fn on_conflict(
    context: &str,
    err: &sqlx::Error,
    conflicts: &[(&str, BanquetError)],
) -> BanquetError {
    unique_violation(err)
        .and_then(|constraint| {
            conflicts
                .iter()
                .find(|(name, _)| *name == constraint)
                .map(|(_, mapped)| mapped.clone())
        })
        .unwrap_or_else(|| database(context, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_conflicts() {
        let err = sqlx::Error::RowNotFound;
        assert_eq!(unique_violation(&err), None);
        assert_eq!(
            on_conflict(
                "Failed to insert booking",
                &err,
                &[(BOOKING_SLOT_KEY, BanquetError::SlotAlreadyBooked)]
            ),
            BanquetError::Database(format!(
                "Failed to insert booking: {}",
                sqlx::Error::RowNotFound
            ))
        );
    }
}
