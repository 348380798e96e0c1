use chrono::{DateTime, Utc};

use super::{user, Snowflake};

pub type Id = Snowflake;
pub type Token = String;

#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Id,
    #[serde(skip)] // Don't expose token to client
    pub token: Token,
    pub user_id: user::Id,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Who is making a request.
#[derive(Clone, Debug)]
pub enum Identity {
    Anonymous,
    Authenticated(Session),
}

impl Identity {
    pub fn session(self) -> Option<Session> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(session) => Some(session),
        }
    }
}
