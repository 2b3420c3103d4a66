pub mod auth_dto;
pub mod user_dto;

pub use auth_dto::*;
pub use user_dto::*;
