// Session state and the authentication endpoints that drive it

pub mod auth;
pub mod store;

pub use auth::AuthClient;
pub use store::{Session, SessionStore};
