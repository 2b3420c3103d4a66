pub mod user;

pub use user::{Provider, RefreshToken, Role, User, UserPatch};
