use std::str::FromStr;

use crate::{Comment, Forest};

/// How to display the top-level comments of an article
///
/// Replies always stay in chronological order, whatever the order of their ancestors.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Popular,
}

impl SortOrder {
    pub fn sort(&self, comments: &mut [Comment]) {
        match self {
            SortOrder::Newest => comments.sort_unstable_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            }),
            SortOrder::Oldest => comments.sort_unstable_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            }),
            SortOrder::Popular => comments.sort_unstable_by(|a, b| {
                b.likes
                    .cmp(&a.likes)
                    .then_with(|| b.created_at.cmp(&a.created_at))
                    .then_with(|| a.id.cmp(&b.id))
            }),
        }
    }

    pub fn sorted(&self, forest: &Forest) -> Vec<Comment> {
        let mut res = forest.iter().cloned().collect::<Vec<_>>();
        self.sort(&mut res);
        res
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<SortOrder> {
        match s {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "popular" => Ok(SortOrder::Popular),
            _ => Err(anyhow::anyhow!(
                "unknown sort order {s:?}, expected newest, oldest or popular"
            )),
        }
    }
}
