use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::{Connection, OptionalExtension, Result as SqlResult, Row};

use super::{users::user_exists, Database};
use crate::model::{session, Error, Session, Snowflake};

/// Session stuff
impl Database {
    pub fn add_session(&mut self, session: &Session) -> Result<(), Error> {
        debug!("Adding session: {}", session.id);

        self.transaction(|tx| {
            if !user_exists(tx, &session.user_id)? {
                return Err(Error::NotFound("user"));
            }
            insert_session(tx, session)
        })
    }

    pub fn get_session_from_token(&self, token: &str) -> SqlResult<Option<Session>> {
        debug!("Getting session from token");
        self.conn
            .query_row(
                "SELECT s.id, s.token, s.user, u.name, s.created_at, s.expires_at
                 FROM sessions s JOIN users u ON u.id = s.user
                 WHERE s.token=?1",
                (token,),
                map_session,
            )
            .optional()
    }

    pub fn delete_session(&mut self, id: &session::Id) -> Result<bool, Error> {
        debug!("Deleting session {}", id);
        self.transaction(|tx| {
            let rows = tx.execute("DELETE FROM sessions WHERE id=?1", (id.id(),))?;
            Ok(rows > 0)
        })
    }

    /// Drop every session that expired at or before `now`.
    pub fn purge_expired_sessions(&mut self, now: DateTime<Utc>) -> Result<usize, Error> {
        let purged = self.transaction(|tx| Ok(purge_expired(tx, now)?))?;
        if purged > 0 {
            debug!("Purged {} expired sessions", purged);
        }
        Ok(purged)
    }
}

pub(super) fn insert_session(conn: &Connection, session: &Session) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO sessions (id, token, user, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            session.id.id(),
            &session.token,
            session.user_id.id(),
            session.created_at,
            session.expires_at,
        ),
    )?;
    Ok(())
}

pub(super) fn purge_expired(conn: &Connection, now: DateTime<Utc>) -> SqlResult<usize> {
    conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", (now,))
}

fn map_session(row: &Row) -> SqlResult<Session> {
    Ok(Session {
        id: Snowflake::from_db(row.get(0)?),
        token: row.get(1)?,
        user_id: Snowflake::from_db(row.get(2)?),
        username: row.get(3)?,
        created_at: row.get(4)?,
        expires_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::model::{
        database::test_util::{add_user, database},
        User,
    };

    fn session(id: i64, user: &User, token: &str, expires_at: DateTime<Utc>) -> Session {
        Session {
            id: Snowflake::from_db(id),
            token: token.to_string(),
            user_id: user.id,
            username: user.username.clone(),
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn finds_session_by_token() {
        let mut db = database();
        let alice = add_user(&mut db, 1, "alice");
        let expires = Utc::now() + Duration::hours(1);
        db.add_session(&session(10, &alice, "abc", expires)).unwrap();

        let found = db.get_session_from_token("abc").unwrap().unwrap();
        assert_eq!(found.user_id, alice.id);
        assert_eq!(found.username, "alice");
        assert_eq!(found.expires_at, expires);
        assert!(db.get_session_from_token("abd").unwrap().is_none());
    }

    #[test]
    fn deletes_session() {
        let mut db = database();
        let alice = add_user(&mut db, 1, "alice");
        let expires = Utc::now() + Duration::hours(1);
        db.add_session(&session(10, &alice, "abc", expires)).unwrap();

        assert!(db.delete_session(&Snowflake::from_db(10)).unwrap());
        assert!(!db.delete_session(&Snowflake::from_db(10)).unwrap());
        assert!(db.get_session_from_token("abc").unwrap().is_none());
    }

    #[test]
    fn purges_only_expired() {
        let mut db = database();
        let alice = add_user(&mut db, 1, "alice");
        let now = Utc::now();
        db.add_session(&session(10, &alice, "old", now - Duration::minutes(1)))
            .unwrap();
        db.add_session(&session(11, &alice, "new", now + Duration::minutes(1)))
            .unwrap();

        assert_eq!(db.purge_expired_sessions(now).unwrap(), 1);
        assert!(db.get_session_from_token("old").unwrap().is_none());
        assert!(db.get_session_from_token("new").unwrap().is_some());
    }
}
