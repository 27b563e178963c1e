use crate::{
    api::{AdminComment, ArticleId, Author, CommentId, CommentStatus, NewComment, Time},
    forest, Forest,
};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub article_id: ArticleId,

    /// None for top-level comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,

    pub author: Author,
    pub content: String,
    pub created_at: Time,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<Time>,
    #[serde(default)]
    pub is_edited: bool,

    #[serde(default)]
    pub likes: u64,

    /// Replies in chronological order
    #[serde(default)]
    pub replies: Forest,
}

impl Comment {
    pub fn new(
        article_id: ArticleId,
        parent_id: Option<CommentId>,
        input: NewComment,
        now: Time,
    ) -> Comment {
        Comment {
            id: CommentId::generate(),
            article_id,
            parent_id,
            author: Author {
                name: input.name,
                email: input.email,
            },
            content: input.content,
            created_at: now,
            edited_at: None,
            is_edited: false,
            likes: 0,
            replies: Forest::new(),
        }
    }

    pub fn find_in<'a>(comments: &'a Forest, id: &CommentId) -> Option<&'a Comment> {
        for c in comments.iter() {
            if c.id == *id {
                return Some(c);
            }
            if let Some(res) = Comment::find_in(&c.replies, id) {
                return Some(res);
            }
        }
        None
    }

    /// Number of comments in the reply subtree, not counting self
    pub fn descendant_count(&self) -> usize {
        forest::count(&self.replies)
    }

    pub fn to_admin(&self) -> AdminComment {
        AdminComment {
            id: self.id.clone(),
            article_id: self.article_id.clone(),
            parent_id: self.parent_id.clone(),
            name: self.author.name.clone(),
            email: self.author.email.clone(),
            content: self.content.clone(),
            status: CommentStatus::Active,
            likes: self.likes,
            created_at: self.created_at,
        }
    }
}
