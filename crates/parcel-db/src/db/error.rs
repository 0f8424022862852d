use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    /// The row violates a unique, check, not-null or foreign-key constraint.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// No connection could be used: pool exhausted or closed, or the server is unreachable.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for PersistError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    let detail = match db_err.constraint() {
                        Some(constraint) => format!("{} ({})", db_err.message(), constraint),
                        None => db_err.message().to_string(),
                    };
                    PersistError::Constraint(detail)
                }
                _ => PersistError::Database(sqlx::Error::Database(db_err)),
            },
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => PersistError::Unavailable(err.to_string()),
            other => PersistError::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_unavailable() {
        assert!(matches!(
            PersistError::from(sqlx::Error::PoolTimedOut),
            PersistError::Unavailable(_)
        ));
        assert!(matches!(
            PersistError::from(sqlx::Error::PoolClosed),
            PersistError::Unavailable(_)
        ));

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            PersistError::from(sqlx::Error::Io(io)),
            PersistError::Unavailable(_)
        ));
    }

    #[test]
    fn test_other_errors_are_database_errors() {
        let err = PersistError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, PersistError::Database(sqlx::Error::RowNotFound)));
        assert!(err.to_string().starts_with("Database error"));
    }
}
