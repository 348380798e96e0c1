pub mod hash;
pub mod token;
pub mod verify_session;

pub use verify_session::verify_session;
