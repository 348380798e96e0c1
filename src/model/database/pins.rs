use log::{debug, trace};
use rusqlite::{OptionalExtension, Result as SqlResult, Row};

use super::{users::user_exists, Database};
use crate::model::{pin, user, Error, Pin, Snowflake};

/// Pin stuff
impl Database {
    pub fn add_pin(&mut self, pin: &Pin) -> Result<(), Error> {
        debug!("Adding pin {} for user {}", pin.id, pin.user_id);

        self.transaction(|tx| {
            if !user_exists(tx, &pin.user_id)? {
                return Err(Error::NotFound("user"));
            }
            tx.execute(
                "INSERT INTO pins (id, user_id, username, title, description, rating, lat, long, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                (
                    pin.id.id(),
                    pin.user_id.id(),
                    &pin.username,
                    &pin.title,
                    &pin.description,
                    pin.rating,
                    pin.lat,
                    pin.long,
                    pin.created_at,
                ),
            )?;
            Ok(())
        })
    }

    /// Every pin owned by `user`, oldest first.
    pub fn get_pins_by_user(&self, user: &user::Id) -> SqlResult<Vec<Pin>> {
        debug!("Getting pins of user {}", user);

        let mut stmt = self
            .conn
            .prepare_cached("SELECT * FROM pins WHERE user_id=?1 ORDER BY id")?;
        let pins = stmt.query_map((user.id(),), map_pin)?.collect();

        pins
    }

    /// Delete a pin on behalf of `owner`, returning what was removed.
    pub fn delete_pin(&mut self, owner: &user::Id, id: &pin::Id) -> Result<Pin, Error> {
        debug!("Deleting pin {} for user {}", id, owner);

        self.transaction(|tx| {
            let pin = tx
                .query_row("SELECT * FROM pins WHERE id=?1", (id.id(),), map_pin)
                .optional()?
                .ok_or(Error::NotFound("pin"))?;

            if pin.user_id != *owner {
                debug!("User {} does not own pin {}", owner, id);
                return Err(Error::Forbidden);
            }

            tx.execute("DELETE FROM pins WHERE id=?1", (id.id(),))?;
            Ok(pin)
        })
    }
}

fn map_pin(row: &Row) -> SqlResult<Pin> {
    trace!("Mapping db row to pin");

    Ok(Pin {
        id: Snowflake::from_db(row.get("id")?),
        user_id: Snowflake::from_db(row.get("user_id")?),
        username: row.get("username")?,
        title: row.get("title")?,
        description: row.get("description")?,
        rating: row.get("rating")?,
        lat: row.get("lat")?,
        long: row.get("long")?,
        created_at: row.get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::{
        database::test_util::{add_user, database},
        User,
    };

    fn pin(id: i64, owner: &User, title: &str) -> Pin {
        Pin {
            id: Snowflake::from_db(id),
            user_id: owner.id,
            username: owner.username.clone(),
            title: title.to_string(),
            description: "Nice view".to_string(),
            rating: 5,
            lat: 37.8,
            long: -150.4,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn lists_pins_of_owner_only() {
        let mut db = database();
        let alice = add_user(&mut db, 1, "alice");
        let bob = add_user(&mut db, 2, "bob1");

        let park = pin(10, &alice, "Park");
        let cafe = pin(11, &bob, "Cafe");
        let beach = pin(12, &alice, "Beach");
        for pin in [&park, &cafe, &beach] {
            db.add_pin(pin).unwrap();
        }

        assert_eq!(db.get_pins_by_user(&alice.id).unwrap(), [park, beach]);
        assert_eq!(db.get_pins_by_user(&bob.id).unwrap(), [cafe]);
    }

    #[test]
    fn unknown_owner_is_not_found() {
        let mut db = database();
        let alice = add_user(&mut db, 1, "alice");
        let mut orphan = pin(10, &alice, "Park");
        orphan.user_id = Snowflake::from_db(42);

        assert!(matches!(db.add_pin(&orphan), Err(Error::NotFound(_))));
        assert!(db.get_pins_by_user(&alice.id).unwrap().is_empty());
    }

    #[test]
    fn owner_deletes_pin() {
        let mut db = database();
        let alice = add_user(&mut db, 1, "alice");
        let park = pin(10, &alice, "Park");
        db.add_pin(&park).unwrap();

        assert_eq!(db.delete_pin(&alice.id, &park.id).unwrap(), park);
        assert!(db.get_pins_by_user(&alice.id).unwrap().is_empty());
    }

    #[test]
    fn deleting_missing_pin_changes_nothing() {
        let mut db = database();
        let alice = add_user(&mut db, 1, "alice");
        let park = pin(10, &alice, "Park");
        db.add_pin(&park).unwrap();

        let err = db
            .delete_pin(&alice.id, &Snowflake::from_db(999))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound("pin")));
        assert_eq!(db.get_pins_by_user(&alice.id).unwrap(), [park]);
    }

    #[test]
    fn only_owner_may_delete() {
        let mut db = database();
        let alice = add_user(&mut db, 1, "alice");
        let bob = add_user(&mut db, 2, "bob1");
        let park = pin(10, &alice, "Park");
        db.add_pin(&park).unwrap();

        assert!(matches!(
            db.delete_pin(&bob.id, &park.id),
            Err(Error::Forbidden)
        ));
        assert_eq!(db.get_pins_by_user(&alice.id).unwrap(), [park]);
    }
}
