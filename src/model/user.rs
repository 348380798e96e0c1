use chrono::{DateTime, Utc};

use super::{Error, Snowflake};

pub type Id = Snowflake;

pub const MIN_USERNAME_LENGTH: usize = 4;
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// The public view of a user. The password hash never makes it in here.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    /// Users following this user, oldest follow first.
    pub followers: Vec<Id>,
    /// Users this user follows, oldest follow first.
    pub followings: Vec<Id>,
    pub created_at: DateTime<Utc>,
}

/// A user row as stored, hash included. Only used to write new users and to
/// check passwords.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, serde::Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// Check registration input, trimming the username and email.
    /// The password is kept exactly as typed.
    pub fn validate(self) -> Result<NewUser, Error> {
        let username = self.username.trim().to_string();
        let email = self.email.trim().to_string();

        if username.chars().count() < MIN_USERNAME_LENGTH {
            return Err(Error::InvalidInput(
                "username must be at least 4 characters",
            ));
        }
        if !email.contains('@') {
            return Err(Error::InvalidInput("email must contain '@'"));
        }
        if self.password.trim().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::InvalidInput(
                "password must be at least 6 characters",
            ));
        }

        Ok(NewUser {
            username,
            email,
            password: self.password,
        })
    }
}
