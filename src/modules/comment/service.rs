use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::object_id;

use super::{Comment, CreateCommentDto};

#[async_trait]
pub trait CommentService: Send + Sync {
    async fn create(&self, offer_id: &str, author_id: &str, dto: CreateCommentDto) -> anyhow::Result<Comment>;
    /// Newest first, at most `limit`.
    async fn find_by_offer_id(&self, offer_id: &str, limit: usize) -> anyhow::Result<Vec<Comment>>;
    /// Returns how many comments were removed.
    async fn delete_by_offer_id(&self, offer_id: &str) -> anyhow::Result<usize>;
}

/// Process-local [`CommentService`], kept in insertion order.
#[derive(Default)]
pub struct MemoryCommentService {
    comments: RwLock<Vec<Comment>>,
}

impl MemoryCommentService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentService for MemoryCommentService {
    async fn create(&self, offer_id: &str, author_id: &str, dto: CreateCommentDto) -> anyhow::Result<Comment> {
        let comment = Comment {
            id: object_id::generate(),
            text: dto.text,
            rating: dto.rating,
            posted_at: Utc::now(),
            offer_id: offer_id.to_owned(),
            author_id: author_id.to_owned(),
        };
        self.comments.write().await.push(comment.clone());
        Ok(comment)
    }

    async fn find_by_offer_id(&self, offer_id: &str, limit: usize) -> anyhow::Result<Vec<Comment>> {
        let comments = self.comments.read().await;
        Ok(comments.iter()
            .rev()
            .filter(|c| c.offer_id == offer_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn delete_by_offer_id(&self, offer_id: &str) -> anyhow::Result<usize> {
        let mut comments = self.comments.write().await;
        let before = comments.len();
        comments.retain(|c| c.offer_id != offer_id);
        Ok(before - comments.len())
    }
}
