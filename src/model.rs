pub(crate) mod app_state;
pub mod database;
mod error;
pub mod pin;
pub mod session;
mod snowflake;
pub mod user;

pub use app_state::AppState;
pub use database::Database;
pub use error::Error;
pub use pin::Pin;
pub use session::{Identity, Session};
pub use snowflake::Snowflake;
pub use user::User;
