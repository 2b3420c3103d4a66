use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Provider, Role};

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    pub provider: Option<Provider>,
    pub roles: Option<Vec<Role>>,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub id: Uuid,
}
