use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::Mutex;

use super::{
    pin::{self, NewPin},
    user::{self, Credentials, NewUser},
    Database, Error, Identity, Pin, Session, Snowflake, User,
};
use crate::{
    auth::{self, hash::DUMMY_HASH},
    config::Config,
};

type Snowcloud = snowcloud::MultiThread<43, 8, 12>;
const EPOCH: u64 = 1650667342;
const PRIMARY_ID: i64 = 1;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to open database: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("failed to create id generator: {0}")]
    Snowcloud(snowcloud::Error),
    #[error("session lifetime out of range: {0}")]
    SessionTtl(#[from] chrono::OutOfRangeError),
}

/// Shared by every request. Owns the store, the id generator and the
/// session lifetime, and exposes every operation the routes need.
pub struct AppState {
    pub database: Mutex<Database>,
    snowcloud: Snowcloud,
    session_ttl: chrono::Duration,
}

impl AppState {
    pub fn build(config: &Config) -> Result<AppState, BuildError> {
        let database = Database::build(&config.database)?;
        AppState::with_database(database, config.session_ttl)
    }

    pub fn with_database(
        database: Database,
        session_ttl: std::time::Duration,
    ) -> Result<AppState, BuildError> {
        let snowcloud = Snowcloud::new(PRIMARY_ID, EPOCH).map_err(BuildError::Snowcloud)?;

        Ok(AppState {
            database: Mutex::new(database),
            snowcloud,
            session_ttl: chrono::Duration::from_std(session_ttl)?,
        })
    }

    pub fn next_snowflake(&self) -> Result<Snowflake, Error> {
        match self.snowcloud.next_id() {
            Ok(snowflake) => Ok(snowflake.into()),
            Err(err) => {
                warn!("Failed to generate snowflake: {}", err);
                Err(Error::Snowflake(err))
            }
        }
    }
}

/// Credential stuff
impl AppState {
    /// Create an account and log it straight in. The user and its session
    /// are stored in one transaction.
    pub async fn register(&self, new_user: NewUser) -> Result<(User, Session), Error> {
        let new_user = new_user.validate()?;
        let id = self.next_snowflake()?;
        let password = auth::hash::hash_in_background(new_user.password).await?;
        let credentials = Credentials {
            id,
            name: new_user.username,
            email: new_user.email,
            password,
            created_at: Utc::now(),
        };
        let session = self.new_session(credentials.id, &credentials.name)?;

        let mut database = self.database.lock().await;
        let user = database.add_user_with_session(&credentials, &session)?;
        info!("Registered user {} ({})", user.username, user.id);

        Ok((user, session))
    }

    /// Check a username and password. Unknown users and wrong passwords
    /// fail the same way.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, Error> {
        let credentials = {
            let database = self.database.lock().await;
            database.get_credentials_by_name(username.trim())?
        };

        let Some(credentials) = credentials else {
            auth::hash::check_in_background(password.to_string(), DUMMY_HASH.clone()).await?;
            debug!("User not found: {}", username);
            return Err(Error::InvalidCredentials);
        };

        let matches = auth::hash::check_in_background(
            password.to_string(),
            credentials.password.clone(),
        )
        .await?;
        if !matches {
            debug!("Password incorrect for user: {}", credentials.name);
            return Err(Error::InvalidCredentials);
        }

        let database = self.database.lock().await;
        database
            .get_user(&credentials.id)?
            .ok_or(Error::InvalidCredentials)
    }

    pub async fn find_user(&self, id: &user::Id) -> Result<User, Error> {
        let database = self.database.lock().await;
        database.get_user(id)?.ok_or(Error::NotFound("user"))
    }

    /// Exact, case-sensitive lookup.
    pub async fn find_user_by_name(&self, username: &str) -> Result<User, Error> {
        let database = self.database.lock().await;
        database
            .get_user_by_name(username)?
            .ok_or(Error::NotFound("user"))
    }
}

/// Session stuff
impl AppState {
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, Session), Error> {
        let user = self.authenticate(username, password).await?;
        let session = self.new_session(user.id, &user.username)?;

        let mut database = self.database.lock().await;
        database.purge_expired_sessions(session.created_at)?;
        database.add_session(&session)?;
        info!("Logged in user {} with session {}", user.username, session.id);

        Ok((user, session))
    }

    pub async fn identify(&self, token: Option<&str>) -> Result<Identity, Error> {
        let mut database = self.database.lock().await;
        auth::verify_session(token, &mut database, Utc::now())
    }

    pub async fn logout(&self, session: &Session) -> Result<(), Error> {
        debug!("Logging out session: {}", session.id);
        let mut database = self.database.lock().await;
        database.delete_session(&session.id)?;
        Ok(())
    }

    fn new_session(&self, user_id: user::Id, username: &str) -> Result<Session, Error> {
        let now = Utc::now();

        Ok(Session {
            id: self.next_snowflake()?,
            token: auth::token::generate_token(),
            user_id,
            username: username.to_string(),
            created_at: now,
            expires_at: now + self.session_ttl,
        })
    }
}

/// Follow stuff
impl AppState {
    pub async fn follow(&self, actor: &Session, target: &user::Id) -> Result<(), Error> {
        let mut database = self.database.lock().await;
        if database.follow(&actor.user_id, target)? {
            info!("{} followed user {}", actor.username, target);
        }
        Ok(())
    }

    pub async fn unfollow(&self, actor: &Session, target: &user::Id) -> Result<(), Error> {
        let mut database = self.database.lock().await;
        if database.unfollow(&actor.user_id, target)? {
            info!("{} unfollowed user {}", actor.username, target);
        }
        Ok(())
    }

    pub async fn followings(&self, user: &user::Id) -> Result<Vec<User>, Error> {
        let database = self.database.lock().await;
        database.get_followings(user)
    }

    pub async fn followers(&self, user: &user::Id) -> Result<Vec<User>, Error> {
        let database = self.database.lock().await;
        database.get_followers(user)
    }
}

/// Pin stuff
impl AppState {
    pub async fn create_pin(&self, owner: &Session, new_pin: NewPin) -> Result<Pin, Error> {
        let new_pin = new_pin.validate()?;
        let pin = Pin {
            id: self.next_snowflake()?,
            user_id: owner.user_id,
            username: owner.username.clone(),
            title: new_pin.title,
            description: new_pin.description,
            rating: new_pin.rating,
            lat: new_pin.lat,
            long: new_pin.long,
            created_at: Utc::now(),
        };

        let mut database = self.database.lock().await;
        database.add_pin(&pin)?;
        info!("{} dropped pin {} \"{}\"", owner.username, pin.id, pin.title);

        Ok(pin)
    }

    pub async fn pins_by_user(&self, user: &user::Id) -> Result<Vec<Pin>, Error> {
        let database = self.database.lock().await;
        Ok(database.get_pins_by_user(user)?)
    }

    pub async fn delete_pin(&self, owner: &Session, id: &pin::Id) -> Result<(), Error> {
        let mut database = self.database.lock().await;
        let pin = database.delete_pin(&owner.user_id, id)?;
        info!("{} deleted pin {} \"{}\"", owner.username, pin.id, pin.title);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::time::Duration;

    use super::*;

    pub fn state() -> AppState {
        state_with_ttl(Duration::from_secs(60 * 60))
    }

    pub fn state_with_ttl(ttl: Duration) -> AppState {
        AppState::with_database(Database::open_in_memory().unwrap(), ttl).unwrap()
    }

    pub fn new_user(username: &str, email: &str, password: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    pub async fn register(state: &AppState, username: &str) -> (User, Session) {
        state
            .register(new_user(
                username,
                &format!("{}@example.com", username),
                "secret1",
            ))
            .await
            .unwrap()
    }
}
