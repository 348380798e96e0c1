/// Every failure a core operation can report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("username is already taken")]
    DuplicateUsername,
    #[error("email is already registered")]
    DuplicateEmail,
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Same error for an unknown user and a wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("users cannot follow themselves")]
    SelfFollowNotAllowed,
    #[error("not logged in")]
    Unauthorized,
    #[error("only the owner may do that")]
    Forbidden,
    /// The store stayed busy through every retry; nothing was applied.
    #[error("storage is busy, try again")]
    Busy,
    #[error("failed to generate id: {0}")]
    Snowflake(snowcloud::Error),
    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl Error {
    /// Whether the whole operation may simply be attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Busy | Error::Snowflake(_)) || self.is_busy_store()
    }

    pub(crate) fn is_busy_store(&self) -> bool {
        use rusqlite::ErrorCode::{DatabaseBusy, DatabaseLocked};

        matches!(
            self,
            Error::Database(rusqlite::Error::SqliteFailure(err, _))
                if matches!(err.code, DatabaseBusy | DatabaseLocked)
        )
    }
}
