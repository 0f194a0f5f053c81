pub mod auth;
pub mod error;
pub mod trace;

pub use auth::AuthStage;
pub use error::ErrorStage;
pub use trace::TraceStage;
