use chrono::{DateTime, Utc};
use log::debug;

use crate::model::{Database, Error, Identity};

/// Resolve a client-held token to who is acting.
///
/// An unknown token and an expired one both come back as
/// [`Identity::Anonymous`]; the expired session is deleted on the way.
pub fn verify_session(
    token: Option<&str>,
    database: &mut Database,
    now: DateTime<Utc>,
) -> Result<Identity, Error> {
    let Some(token) = token else {
        return Ok(Identity::Anonymous);
    };

    // Get and verify session
    match database.get_session_from_token(token)? {
        Some(session) if session.is_expired(now) => {
            debug!("Session {} expired at {}", session.id, session.expires_at);
            database.delete_session(&session.id)?;
            Ok(Identity::Anonymous)
        }
        Some(session) => Ok(Identity::Authenticated(session)),
        None => {
            debug!("Session token not found in database");
            Ok(Identity::Anonymous)
        }
    }
}
