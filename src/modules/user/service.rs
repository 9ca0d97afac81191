use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::object_id;

use super::dto::CreateUserDto;
use super::entity::{User, hash_password};

#[async_trait]
pub trait UserService: Send + Sync {
    /// Registers a user, hashing the password with `salt`.
    ///
    /// Returns `None` when the email is already registered.
    async fn create(&self, dto: CreateUserDto, salt: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<User>>;
    async fn update_avatar(&self, id: &str, avatar: String) -> anyhow::Result<Option<User>>;
}

/// Process-local [`UserService`]. Emails are matched case-insensitively.
#[derive(Default)]
pub struct MemoryUserService {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserService {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[async_trait]
impl UserService for MemoryUserService {
    async fn create(&self, dto: CreateUserDto, salt: &str) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write().await;
        if users.values().any(|u| same_email(&u.email, &dto.email)) {
            return Ok(None);
        }

        let user = User {
            id: object_id::generate(),
            name: dto.name,
            email: dto.email,
            avatar: dto.avatar,
            password_hash: hash_password(&dto.password, salt),
            user_type: dto.user_type,
        };
        users.insert(user.id.clone(), user.clone());
        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(Some(user))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| same_email(&u.email, email)).cloned())
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn update_avatar(&self, id: &str, avatar: String) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(id).map(|user| {
            user.avatar = Some(avatar);
            user.clone()
        }))
    }
}
