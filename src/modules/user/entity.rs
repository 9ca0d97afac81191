use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::auth::Principal;

pub const USER_TYPES: &[&str] = &["regular", "pro"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Regular,
    Pro,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub password_hash: String,
    pub user_type: UserType,
}

impl User {
    pub fn verify_password(&self, password: &str, salt: &str) -> bool {
        self.password_hash == hash_password(password, salt)
    }

    pub fn principal(&self) -> Principal {
        Principal { id: self.id.clone(), email: self.email.clone(), name: self.name.clone() }
    }
}

/// Hex-encoded SHA-256 of `password` followed by `salt`.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}
