mod follows;
mod pins;
mod sessions;
mod users;

use std::{path::Path, time::Duration};

use log::{info, trace, warn};
use rusqlite::{Connection, Result as SqlResult, Transaction, TransactionBehavior};

use super::Error;

/// How many times a transaction is attempted while the store reports it is
/// busy or locked.
const MAX_ATTEMPTS: u32 = 3;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Database {
    conn: Connection,
}

/// Build the database.
impl Database {
    pub fn build(path: impl AsRef<Path>) -> SqlResult<Database> {
        let path = path.as_ref();
        let conn = if path == Path::new(":memory:") {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        trace!("Opened database connection to {}", path.display());

        Database::init_db(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> SqlResult<Database> {
        Database::init_db(Connection::open_in_memory()?)
    }

    fn init_db(conn: Connection) -> SqlResult<Database> {
        trace!("Initializing database...");

        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS follows (
                seq         INTEGER PRIMARY KEY AUTOINCREMENT,
                follower    INTEGER NOT NULL REFERENCES users(id),
                followee    INTEGER NOT NULL REFERENCES users(id),
                created_at  TEXT NOT NULL,
                UNIQUE(follower, followee)
            );
            CREATE INDEX IF NOT EXISTS follows_followee ON follows(followee);

            CREATE TABLE IF NOT EXISTS pins (
                id          INTEGER PRIMARY KEY,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                username    TEXT NOT NULL,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                rating      INTEGER NOT NULL,
                lat         REAL NOT NULL,
                long        REAL NOT NULL,
                created_at  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS pins_user_id ON pins(user_id);

            CREATE TABLE IF NOT EXISTS sessions (
                id          INTEGER PRIMARY KEY,
                token       TEXT NOT NULL UNIQUE,
                user        INTEGER NOT NULL REFERENCES users(id),
                created_at  TEXT NOT NULL,
                expires_at  TEXT NOT NULL
            );",
        )?;

        info!("Finished initializing database");

        Ok(Database { conn })
    }
}

/// Helper methods
impl Database {
    /// Run `op` inside an immediate transaction and commit it.
    ///
    /// Nothing `op` wrote survives an error. When the store is busy or locked
    /// the whole transaction is rolled back and `op` runs again from the
    /// start, up to [`MAX_ATTEMPTS`] times, after which [`Error::Busy`] is
    /// returned.
    fn transaction<T, F>(&mut self, mut op: F) -> Result<T, Error>
    where
        F: FnMut(&Transaction) -> Result<T, Error>,
    {
        let mut attempt = 1;
        loop {
            let result = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(Error::from)
                .and_then(|tx| {
                    let value = op(&tx)?;
                    tx.commit()?;
                    Ok(value)
                });

            match result {
                Err(err) if err.is_busy_store() => {
                    if attempt >= MAX_ATTEMPTS {
                        warn!("Giving up on transaction after {} attempts", attempt);
                        return Err(Error::Busy);
                    }
                    warn!("Store busy, retrying transaction (attempt {})", attempt);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

/// Whether `sql` (taking a single parameter) returns any row.
fn exists<P: rusqlite::ToSql>(conn: &Connection, sql: &str, param: P) -> SqlResult<bool> {
    let mut stmt = conn.prepare_cached(sql)?;
    stmt.exists((param,))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_in_memory_from_path() {
        let db = Database::build(":memory:").unwrap();
        let tables: i64 = db
            .conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('users', 'follows', 'pins', 'sessions')",
                (),
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 4);
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let mut db = test_util::database();
        let result: Result<(), Error> = db.transaction(|tx| {
            tx.execute(
                "INSERT INTO users (id, name, email, password, created_at)
                 VALUES (1, 'ghost', 'g@x.com', 'x', '2024-01-01')",
                (),
            )?;
            Err(Error::InvalidInput("abort"))
        });
        assert!(matches!(result, Err(Error::InvalidInput("abort"))));
        assert!(db.get_user_by_name("ghost").unwrap().is_none());
    }
}
