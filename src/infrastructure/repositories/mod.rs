mod refresh_token_repository;
mod traits;
mod user_repository;

pub use refresh_token_repository::RefreshTokenRepositoryImpl;
pub use traits::{RefreshTokenRepository, UserRepository};
pub use user_repository::UserRepositoryImpl;
