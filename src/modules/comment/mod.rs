//! Offer comments.

mod controller;
mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modules::user::UserRdo;
use crate::shape::{BodyShape, FieldKind};

pub use controller::{DEFAULT_COMMENT_COUNT, controller};
pub use service::{CommentService, MemoryCommentService};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub rating: u8,
    pub posted_at: DateTime<Utc>,
    pub offer_id: String,
    pub author_id: String,
}

pub fn create_comment_shape() -> BodyShape {
    BodyShape::new("CreateCommentDto")
        .required("text", FieldKind::text(5, 1024))
        .required("rating", FieldKind::integer(1, 5))
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateCommentDto {
    pub text: String,
    pub rating: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRdo {
    pub id: String,
    pub text: String,
    pub rating: u8,
    pub posted_at: DateTime<Utc>,
    /// `None` once the author no longer exists.
    pub author: Option<UserRdo>,
}

impl CommentRdo {
    pub fn new(comment: Comment, author: Option<UserRdo>) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            rating: comment.rating,
            posted_at: comment.posted_at,
            author,
        }
    }
}
