use crate::{ArticleId, CommentId, Time};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Active,
    Hidden,
}

/// One line of the moderation table
///
/// This is a flat read-model, unrelated to the reply tree readers see: replies show up as their
/// own rows, and only point to their parent by id.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminComment {
    pub id: CommentId,
    pub article_id: ArticleId,
    pub parent_id: Option<CommentId>,
    pub name: String,
    pub email: String,
    pub content: String,
    pub status: CommentStatus,
    pub likes: u64,
    pub created_at: Time,
}
