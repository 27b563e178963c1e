//! Copy-on-write algorithms over a forest of comments
//!
//! A forest is the ordered list of top-level comments of one article, each carrying its replies.
//! None of the functions here mutate their input: they return a new forest in which only the
//! path from the root to the touched comment was rebuilt, while every untouched subtree is
//! shared with the input.

use std::collections::{HashMap, HashSet};

use crate::{
    api::{ArticleId, CommentId},
    Comment,
};

pub type Forest = im::Vector<Comment>;

/// Total number of comments, replies included
pub fn count(forest: &Forest) -> usize {
    forest.len() + forest.iter().map(|c| count(&c.replies)).sum::<usize>()
}

pub fn find<'a>(forest: &'a Forest, id: &CommentId) -> Option<&'a Comment> {
    Comment::find_in(forest, id)
}

/// Indices to follow from the top level down to comment `id`
fn path_to(forest: &Forest, id: &CommentId) -> Option<Vec<usize>> {
    for (i, c) in forest.iter().enumerate() {
        if c.id == *id {
            return Some(vec![i]);
        }
        if let Some(mut path) = path_to(&c.replies, id) {
            path.insert(0, i);
            return Some(path);
        }
    }
    None
}

/// Replaces the comment at `path` with the result of `f`, removing it if `f` returns None
fn rebuild_at<F>(forest: &Forest, path: &[usize], f: F) -> Forest
where
    F: FnOnce(Comment) -> Option<Comment>,
{
    let mut res = forest.clone();
    match path.split_first() {
        None => (),
        Some((&idx, [])) => match f(forest[idx].clone()) {
            Some(c) => {
                res.set(idx, c);
            }
            None => {
                res.remove(idx);
            }
        },
        Some((&idx, rest)) => {
            let mut c = forest[idx].clone();
            c.replies = rebuild_at(&c.replies, rest, f);
            res.set(idx, c);
        }
    }
    res
}

/// Applies `f` to comment `id`, returning None if there is no such comment
pub fn update<F>(forest: &Forest, id: &CommentId, f: F) -> Option<Forest>
where
    F: FnOnce(&mut Comment),
{
    let path = path_to(forest, id)?;
    Some(rebuild_at(forest, &path, |mut c| {
        f(&mut c);
        Some(c)
    }))
}

/// Appends `reply` at the end of the replies of `parent`
pub fn insert_reply(forest: &Forest, parent: &CommentId, reply: Comment) -> Option<Forest> {
    update(forest, parent, move |p| p.replies.push_back(reply))
}

/// Removes comment `id` along with all its replies, returning the removed subtree
pub fn remove(forest: &Forest, id: &CommentId) -> Option<(Forest, Comment)> {
    let path = path_to(forest, id)?;
    let mut removed = None;
    let res = rebuild_at(forest, &path, |c| {
        removed = Some(c);
        None
    });
    removed.map(|c| (res, c))
}

/// Pre-order iterator over all the comments of a forest, along with their depth
pub fn flatten(forest: &Forest) -> Flatten<'_> {
    Flatten {
        stack: vec![forest.iter()],
    }
}

pub struct Flatten<'a> {
    stack: Vec<im::vector::Iter<'a, Comment>>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = (usize, &'a Comment);

    fn next(&mut self) -> Option<(usize, &'a Comment)> {
        loop {
            let depth = self.stack.len().checked_sub(1)?;
            match self.stack[depth].next() {
                Some(c) => {
                    self.stack.push(c.replies.iter());
                    return Some((depth, c));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Rebuilds the forest from the `parent_id` links of its comments
///
/// `parent_id` is the source of truth, `replies` only materializes it. Comments that belong to
/// another article, that reuse an already-seen id or whose parent cannot be reached from the top
/// level are dropped, along with their replies. On a consistent forest this is the identity.
pub fn normalize(article: &ArticleId, forest: &Forest) -> Forest {
    let mut seen = HashSet::new();
    let mut children: HashMap<Option<CommentId>, Vec<Comment>> = HashMap::new();
    // depth of the last dropped comment, whose stored replies must go too
    let mut dropped_at = None;
    for (depth, c) in flatten(forest) {
        match dropped_at {
            Some(d) if depth > d => continue,
            _ => dropped_at = None,
        }
        if c.article_id != *article {
            tracing::warn!(%article, comment = %c.id, other = %c.article_id, "dropping comment filed under the wrong article");
            dropped_at = Some(depth);
            continue;
        }
        if !seen.insert(c.id.clone()) {
            tracing::warn!(%article, comment = %c.id, "dropping comment with duplicate id");
            dropped_at = Some(depth);
            continue;
        }
        let mut node = c.clone();
        node.replies = Forest::new();
        children.entry(c.parent_id.clone()).or_default().push(node);
    }
    let res = attach_children(None, &mut children);
    let orphans = children.values().map(Vec::len).sum::<usize>();
    if orphans > 0 {
        tracing::warn!(%article, orphans, "dropping comments whose parent does not exist");
    }
    res
}

fn attach_children(
    parent: Option<CommentId>,
    children: &mut HashMap<Option<CommentId>, Vec<Comment>>,
) -> Forest {
    children
        .remove(&parent)
        .unwrap_or_default()
        .into_iter()
        .map(|mut c| {
            c.replies = attach_children(Some(c.id.clone()), children);
            c
        })
        .collect()
}
