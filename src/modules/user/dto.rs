use serde::{Deserialize, Serialize};

use crate::shape::{BodyShape, FieldKind};

use super::entity::{USER_TYPES, User, UserType};

pub fn create_user_shape() -> BodyShape {
    BodyShape::new("CreateUserDto")
        .required("name", FieldKind::text(1, 15))
        .required("email", FieldKind::Email)
        .optional("avatar", FieldKind::text(1, 256))
        .required("password", FieldKind::text(6, 12))
        .required("type", FieldKind::OneOf(USER_TYPES))
}

pub fn login_user_shape() -> BodyShape {
    BodyShape::new("LoginUserDto")
        .required("email", FieldKind::Email)
        .required("password", FieldKind::text(6, 12))
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub password: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginUserDto {
    pub email: String,
    pub password: String,
}

/// A user as returned to clients; never carries the password hash.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserRdo {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(rename = "type")]
    pub user_type: UserType,
}

impl From<User> for UserRdo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            user_type: user.user_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoggedUserRdo {
    #[serde(flatten)]
    pub user: UserRdo,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UploadAvatarRdo {
    pub filepath: String,
}
