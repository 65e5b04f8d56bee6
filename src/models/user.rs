//! Member (user account) model and related types

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::enums::Role;

/// Library member as returned by `/users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
}

impl Member {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Short member representation nested in loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserShort {
    pub id: i64,
    pub username: String,
}

/// Create member request (admin)
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateMember {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: Role,
}

/// Update member request (admin)
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Update own profile request
#[derive(Debug, Clone, Serialize, Validate)]
pub struct UpdateProfile {
    #[validate(custom(function = "super::not_blank", message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Change own password request
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    #[validate(custom(function = "super::not_blank", message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
    #[serde(skip)]
    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub confirm_password: String,
}
