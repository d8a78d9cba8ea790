use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    #[validate(length(min = 4, max = 20, message = "Username must be 4-20 characters"))]
    pub username: String,

    #[validate(
        email(message = "Invalid email format"),
        length(min = 3, max = 320, message = "Email must be 3-320 characters")
    )]
    pub email: String,

    #[validate(length(min = 4, max = 100, message = "Password must be 4-100 characters"))]
    pub password: String,

    /// Role name; must parse into a known `Role`.
    pub role: String,
}

/// Full update of a user by an admin. The password is only replaced when
/// supplied.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    #[validate(length(min = 4, max = 20, message = "Username must be 4-20 characters"))]
    pub username: String,

    #[validate(
        email(message = "Invalid email format"),
        length(min = 3, max = 320, message = "Email must be 3-320 characters")
    )]
    pub email: String,

    #[validate(length(min = 4, max = 100, message = "Password must be 4-100 characters"))]
    pub password: Option<String>,

    pub role: String,
}

/// Self-service profile update: cannot touch role or password.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    #[validate(length(min = 4, max = 20, message = "Username must be 4-20 characters"))]
    pub username: String,

    #[validate(
        email(message = "Invalid email format"),
        length(min = 3, max = 320, message = "Email must be 3-320 characters")
    )]
    pub email: String,
}
