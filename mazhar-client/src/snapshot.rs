use crate::{api::ArticleId, forest, Forest};

/// Point-in-time value of all the comments, for all articles
///
/// Cloning is cheap: both the map and the forests are persistent data structures, so the clone
/// shares everything with the original until one of them changes.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    articles: im::OrdMap<ArticleId, Forest>,
}

impl Snapshot {
    pub fn new() -> Snapshot {
        Snapshot {
            articles: im::OrdMap::new(),
        }
    }

    /// Top-level comments of `article`, empty if it never got any
    pub fn forest(&self, article: &ArticleId) -> Forest {
        self.articles.get(article).cloned().unwrap_or_default()
    }

    pub fn contains(&self, article: &ArticleId) -> bool {
        self.articles.contains_key(article)
    }

    pub fn with_forest(&self, article: ArticleId, forest: Forest) -> Snapshot {
        Snapshot {
            articles: self.articles.update(article, forest),
        }
    }

    pub fn without_article(&self, article: &ArticleId) -> Snapshot {
        Snapshot {
            articles: self.articles.without(article),
        }
    }

    pub fn articles(&self) -> impl Iterator<Item = (&ArticleId, &Forest)> {
        self.articles.iter()
    }

    /// Number of articles with a forest, possibly empty
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn comment_count(&self) -> usize {
        self.articles.values().map(forest::count).sum()
    }

    /// See [`forest::normalize`]
    pub fn normalized(&self) -> Snapshot {
        Snapshot {
            articles: self
                .articles
                .iter()
                .map(|(article, f)| (article.clone(), forest::normalize(article, f)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{api::NewComment, Comment};

    fn comment(article: &str) -> Comment {
        Comment::new(
            ArticleId::from(article),
            None,
            NewComment::new(
                String::from("Ada"),
                String::from("a@x.com"),
                String::from("Hello"),
            ),
            Utc::now(),
        )
    }

    #[test]
    fn unknown_article_is_empty() {
        let s = Snapshot::new();
        assert!(s.forest(&ArticleId::from("nope")).is_empty());
        assert_eq!(s.comment_count(), 0);
        assert!(s.is_empty());
    }

    #[test]
    fn updates_do_not_affect_previous_snapshots() {
        let a1 = ArticleId::from("a1");
        let before = Snapshot::new().with_forest(a1.clone(), im::vector![comment("a1")]);
        let after = before.with_forest(a1.clone(), im::vector![comment("a1"), comment("a1")]);
        assert_eq!(before.forest(&a1).len(), 1);
        assert_eq!(after.forest(&a1).len(), 2);

        let cleared = after.without_article(&a1);
        assert!(cleared.forest(&a1).is_empty());
        assert_eq!(after.comment_count(), 2);
    }

    #[test]
    fn serializes_as_map_of_forests() {
        let c = comment("a1");
        let s = Snapshot::new().with_forest(ArticleId::from("a1"), im::vector![c.clone()]);
        let value = serde_json::to_value(&s).unwrap();
        assert_eq!(value["a1"][0]["id"], c.id.to_string());
        assert_eq!(value.as_object().unwrap().len(), 1);
    }
}
