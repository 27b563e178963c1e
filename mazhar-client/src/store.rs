use chrono::Utc;

use crate::{
    api::{self, ArticleId, CommentId, Error, NewComment},
    forest, Comment, Forest, Persistence, Snapshot,
};

/// All the comments of all the articles, along with where to persist them
///
/// Every mutation computes a new [`Snapshot`] from the current one, swaps it in and then saves
/// it. Lookups that fail leave the current snapshot untouched and save nothing.
pub struct CommentStore<P> {
    snapshot: Snapshot,
    persistence: P,
}

impl<P: Persistence> CommentStore<P> {
    /// Loads the last saved snapshot, starting empty if it cannot be read
    pub fn open(persistence: P) -> CommentStore<P> {
        let snapshot = match persistence.load() {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(?err, "failed loading comments, starting from an empty state");
                Snapshot::new()
            }
        };
        tracing::info!(
            articles = snapshot.len(),
            comments = snapshot.comment_count(),
            "opened comment store"
        );
        CommentStore {
            snapshot,
            persistence,
        }
    }

    fn commit(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        if let Err(err) = self.persistence.save(&self.snapshot) {
            tracing::warn!(?err, "failed saving comments, keeping them in memory only");
        }
    }

    fn commit_forest(&mut self, article: &ArticleId, forest: Forest) {
        let snapshot = self.snapshot.with_forest(article.clone(), forest);
        self.commit(snapshot);
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    pub fn get_comments(&self, article: &ArticleId) -> Forest {
        self.snapshot.forest(article)
    }

    pub fn get_comment_count(&self, article: &ArticleId) -> usize {
        forest::count(&self.snapshot.forest(article))
    }

    pub fn find_comment(&self, article: &ArticleId, id: &CommentId) -> Option<Comment> {
        forest::find(&self.snapshot.forest(article), id).cloned()
    }

    pub fn add_comment(
        &mut self,
        article: &ArticleId,
        input: NewComment,
    ) -> Result<Comment, Error> {
        article.validate()?;
        input.validate()?;
        let comment = Comment::new(article.clone(), None, input, Utc::now());
        let mut forest = self.snapshot.forest(article);
        forest.push_back(comment.clone());
        self.commit_forest(article, forest);
        tracing::debug!(%article, comment = %comment.id, "added comment");
        Ok(comment)
    }

    pub fn add_reply(
        &mut self,
        article: &ArticleId,
        parent: &CommentId,
        input: NewComment,
    ) -> Result<Comment, Error> {
        article.validate()?;
        input.validate()?;
        let reply = Comment::new(article.clone(), Some(parent.clone()), input, Utc::now());
        let forest = forest::insert_reply(&self.snapshot.forest(article), parent, reply.clone())
            .ok_or_else(|| Error::CommentNotFound(parent.clone()))?;
        self.commit_forest(article, forest);
        tracing::debug!(%article, %parent, comment = %reply.id, "added reply");
        Ok(reply)
    }

    /// Returns the new number of likes, or None if there is no such comment
    pub fn like_comment(&mut self, article: &ArticleId, id: &CommentId) -> Option<u64> {
        self.update_likes(article, id, |likes| likes.saturating_add(1))
    }

    /// Returns the new number of likes, or None if there is no such comment
    pub fn unlike_comment(&mut self, article: &ArticleId, id: &CommentId) -> Option<u64> {
        self.update_likes(article, id, |likes| likes.saturating_sub(1))
    }

    fn update_likes(
        &mut self,
        article: &ArticleId,
        id: &CommentId,
        f: impl FnOnce(u64) -> u64,
    ) -> Option<u64> {
        let mut likes = None;
        let forest = forest::update(&self.snapshot.forest(article), id, |c| {
            c.likes = f(c.likes);
            likes = Some(c.likes);
        })?;
        self.commit_forest(article, forest);
        tracing::debug!(%article, comment = %id, ?likes, "updated likes");
        likes
    }

    pub fn edit_comment(
        &mut self,
        article: &ArticleId,
        id: &CommentId,
        content: String,
    ) -> Result<Comment, Error> {
        api::validate_content(&content)?;
        let now = Utc::now();
        let mut edited = None;
        let forest = forest::update(&self.snapshot.forest(article), id, |c| {
            c.content = content;
            c.is_edited = true;
            c.edited_at = Some(now);
            edited = Some(c.clone());
        })
        .ok_or_else(|| Error::CommentNotFound(id.clone()))?;
        self.commit_forest(article, forest);
        tracing::debug!(%article, comment = %id, "edited comment");
        edited.ok_or_else(|| Error::CommentNotFound(id.clone()))
    }

    /// Removes the comment and all its replies, returning the removed subtree
    pub fn delete_comment(&mut self, article: &ArticleId, id: &CommentId) -> Option<Comment> {
        let (forest, removed) = forest::remove(&self.snapshot.forest(article), id)?;
        self.commit_forest(article, forest);
        tracing::debug!(
            %article,
            comment = %id,
            replies = removed.descendant_count(),
            "deleted comment"
        );
        Some(removed)
    }

    /// Removes every comment of the article, returning how many there were
    pub fn clear_comments(&mut self, article: &ArticleId) -> usize {
        let removed = self.get_comment_count(article);
        if self.snapshot.contains(article) {
            let snapshot = self.snapshot.without_article(article);
            self.commit(snapshot);
            tracing::debug!(%article, removed, "cleared comments");
        }
        removed
    }
}
