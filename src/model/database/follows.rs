use chrono::Utc;
use log::debug;
use rusqlite::{Connection, Result as SqlResult};

use super::{
    users::{into_user, map_credentials, user_exists},
    Database,
};
use crate::model::{user::Id, Error, Snowflake, User};

// There is one row per "follower follows followee" edge. Both directions of
// the relation are read from that row, so a user's followings and the
// target's followers can never disagree.

/// Follow stuff
impl Database {
    /// Make `actor` follow `target`. Returns whether anything changed;
    /// following someone twice is not an error.
    pub fn follow(&mut self, actor: &Id, target: &Id) -> Result<bool, Error> {
        if actor == target {
            return Err(Error::SelfFollowNotAllowed);
        }

        let added = self.transaction(|tx| {
            require_users(tx, actor, target)?;
            let rows = tx.execute(
                "INSERT OR IGNORE INTO follows (follower, followee, created_at)
                 VALUES (?1, ?2, ?3)",
                (actor.id(), target.id(), Utc::now()),
            )?;
            Ok(rows > 0)
        })?;

        debug!("User {} follows {} (changed: {})", actor, target, added);
        Ok(added)
    }

    /// Undo a follow. Returns whether anything changed; unfollowing someone
    /// not followed is not an error.
    pub fn unfollow(&mut self, actor: &Id, target: &Id) -> Result<bool, Error> {
        let removed = self.transaction(|tx| {
            require_users(tx, actor, target)?;
            let rows = tx.execute(
                "DELETE FROM follows WHERE follower=?1 AND followee=?2",
                (actor.id(), target.id()),
            )?;
            Ok(rows > 0)
        })?;

        debug!("User {} unfollowed {} (changed: {})", actor, target, removed);
        Ok(removed)
    }

    /// Users `user` follows, in the order they were followed.
    pub fn get_followings(&self, user: &Id) -> Result<Vec<User>, Error> {
        self.related_users(
            user,
            "SELECT u.* FROM follows f JOIN users u ON u.id = f.followee
             WHERE f.follower=?1 ORDER BY f.seq",
        )
    }

    /// Users following `user`, in the order they followed.
    pub fn get_followers(&self, user: &Id) -> Result<Vec<User>, Error> {
        self.related_users(
            user,
            "SELECT u.* FROM follows f JOIN users u ON u.id = f.follower
             WHERE f.followee=?1 ORDER BY f.seq",
        )
    }

    fn related_users(&self, user: &Id, sql: &str) -> Result<Vec<User>, Error> {
        if !user_exists(&self.conn, user)? {
            return Err(Error::NotFound("user"));
        }

        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt
            .query_map((user.id(),), map_credentials)?
            .collect::<SqlResult<Vec<_>>>()?;

        let users = rows
            .into_iter()
            .map(|credentials| into_user(&self.conn, credentials))
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(users)
    }
}

fn require_users(conn: &Connection, actor: &Id, target: &Id) -> Result<(), Error> {
    if !user_exists(conn, actor)? || !user_exists(conn, target)? {
        return Err(Error::NotFound("user"));
    }
    Ok(())
}

pub(super) fn following_ids(conn: &Connection, user: &Id) -> SqlResult<Vec<Id>> {
    ids(conn, "SELECT followee FROM follows WHERE follower=?1 ORDER BY seq", user)
}

pub(super) fn follower_ids(conn: &Connection, user: &Id) -> SqlResult<Vec<Id>> {
    ids(conn, "SELECT follower FROM follows WHERE followee=?1 ORDER BY seq", user)
}

fn ids(conn: &Connection, sql: &str, user: &Id) -> SqlResult<Vec<Id>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let ids = stmt
        .query_map((user.id(),), |row| Ok(Snowflake::from_db(row.get(0)?)))?
        .collect();
    ids
}
