use log::{debug, trace};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Result as SqlResult, Row, ToSql};

use super::{exists, follows, sessions, Database};
use crate::model::{
    user::{Credentials, Id},
    Error, Session, Snowflake, User,
};

/// User stuff
impl Database {
    /// Store a new user. Usernames must be unique, emails unique ignoring case.
    #[cfg(test)]
    pub fn add_user(&mut self, user: &Credentials) -> Result<User, Error> {
        debug!("Adding user {} ({}) to database", user.id, user.name);

        self.transaction(|tx| insert_user(tx, user))?;
        Ok(new_user(user))
    }

    /// Store a new user together with its first session. Either both rows are
    /// written or neither is. Sessions that expired by `session.created_at`
    /// are dropped on the way.
    pub fn add_user_with_session(
        &mut self,
        user: &Credentials,
        session: &Session,
    ) -> Result<User, Error> {
        debug!(
            "Adding user {} ({}) with session {}",
            user.id, user.name, session.id
        );

        self.transaction(|tx| {
            insert_user(tx, user)?;
            sessions::purge_expired(tx, session.created_at)?;
            sessions::insert_session(tx, session)
        })?;
        Ok(new_user(user))
    }

    pub fn get_user(&self, id: &Id) -> SqlResult<Option<User>> {
        debug!("Getting user {}", id);
        load_user(&self.conn, "SELECT * FROM users WHERE id=?1", id.id())
    }

    pub fn get_user_by_name(&self, name: &str) -> SqlResult<Option<User>> {
        debug!("Getting user (name: {})", name);
        load_user(&self.conn, "SELECT * FROM users WHERE name=?1", name)
    }

    /// The stored row including the password hash, for logging in.
    pub fn get_credentials_by_name(&self, name: &str) -> SqlResult<Option<Credentials>> {
        debug!("Getting credentials (name: {})", name);
        self.conn
            .query_row("SELECT * FROM users WHERE name=?1", (name,), map_credentials)
            .optional()
    }
}

fn insert_user(conn: &Connection, user: &Credentials) -> Result<(), Error> {
    if exists(conn, "SELECT 1 FROM users WHERE name=?1", &user.name)? {
        return Err(Error::DuplicateUsername);
    }
    if exists(conn, "SELECT 1 FROM users WHERE email=?1", &user.email)? {
        return Err(Error::DuplicateEmail);
    }

    conn.execute(
        "INSERT INTO users (id, name, email, password, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            user.id.id(),
            &user.name,
            &user.email,
            &user.password,
            user.created_at,
        ),
    )
    .map_err(map_unique_violation)?;
    Ok(())
}

/// A user that was just inserted follows nobody and has no followers.
fn new_user(user: &Credentials) -> User {
    User {
        id: user.id,
        username: user.name.clone(),
        email: user.email.clone(),
        followers: Vec::new(),
        followings: Vec::new(),
        created_at: user.created_at,
    }
}

pub(super) fn user_exists(conn: &Connection, id: &Id) -> SqlResult<bool> {
    exists(conn, "SELECT 1 FROM users WHERE id=?1", id.id())
}

/// Load one user by a single-parameter query over `users`, filling in both
/// follow lists.
pub(super) fn load_user<P: ToSql>(conn: &Connection, sql: &str, param: P) -> SqlResult<Option<User>> {
    let Some(credentials) = conn.query_row(sql, (param,), map_credentials).optional()? else {
        return Ok(None);
    };
    into_user(conn, credentials).map(Some)
}

pub(super) fn into_user(conn: &Connection, credentials: Credentials) -> SqlResult<User> {
    let followers = follows::follower_ids(conn, &credentials.id)?;
    let followings = follows::following_ids(conn, &credentials.id)?;

    Ok(User {
        id: credentials.id,
        username: credentials.name,
        email: credentials.email,
        followers,
        followings,
        created_at: credentials.created_at,
    })
}

/// Map a `SELECT * FROM users` row.
pub(super) fn map_credentials(row: &Row) -> SqlResult<Credentials> {
    trace!("Mapping db row to user");

    Ok(Credentials {
        id: Snowflake::from_db(row.get("id")?),
        name: row.get("name")?,
        email: row.get("email")?,
        password: row.get("password")?,
        created_at: row.get("created_at")?,
    })
}

/// The pre-insert checks run in the same transaction, so this only fires if
/// the table was written from outside this process.
fn map_unique_violation(err: rusqlite::Error) -> Error {
    let duplicate = match &err {
        rusqlite::Error::SqliteFailure(failure, Some(message))
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            if message.contains("users.name") {
                Some(Error::DuplicateUsername)
            } else if message.contains("users.email") {
                Some(Error::DuplicateEmail)
            } else {
                None
            }
        }
        _ => None,
    };
    duplicate.unwrap_or(Error::Database(err))
}
