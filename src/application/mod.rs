mod session_service;
mod user_directory;

pub use session_service::{SessionService, TokenPair};
pub use user_directory::{UpsertUser, UserDirectory};
