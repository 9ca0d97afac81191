//! Resource families: each submodule owns its records, request shapes,
//! service contract and controller.

use std::path::Path;
use std::sync::Arc;

use crate::auth::JwtAuth;
use crate::config::Config;
use crate::upload::{DiskFileStore, FileStore};

pub mod comment;
pub mod offer;
pub mod user;

use comment::{CommentService, MemoryCommentService};
use offer::{MemoryOfferService, OfferService};
use user::{MemoryUserService, UserService};

/// Collaborators shared by every controller. Cloned once per request, so it
/// holds only `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub offers: Arc<dyn OfferService>,
    pub users: Arc<dyn UserService>,
    pub comments: Arc<dyn CommentService>,
    pub auth: Arc<JwtAuth>,
    pub files: Arc<dyn FileStore>,
    pub salt: Arc<str>,
    pub upload_directory: Arc<Path>,
}

impl AppState {
    /// In-memory services, disk uploads, JWT auth from `config`.
    pub fn in_memory(config: &Config) -> Self {
        Self {
            offers: Arc::new(MemoryOfferService::new()),
            users: Arc::new(MemoryUserService::new()),
            comments: Arc::new(MemoryCommentService::new()),
            auth: Arc::new(JwtAuth::new(&config.jwt_secret, config.jwt_ttl)),
            files: Arc::new(DiskFileStore),
            salt: Arc::from(config.salt.as_str()),
            upload_directory: Arc::from(config.upload_directory.as_path()),
        }
    }
}
