#![cfg(test)]

use std::{cmp, collections::HashMap, ops::RangeTo};

use bolero::generator::{bolero_generator, TypeGenerator};

use crate::{
    api::{ArticleId, CommentId, Error, NewComment},
    forest, CommentStore, MemoryPersistence,
};

const NUM_ARTICLES: u8 = 3;

#[derive(Clone, Debug, bolero_generator::TypeGenerator)]
enum FuzzOp {
    Add { article: u8, blank: bool },
    Reply { article: u8, parent: usize, blank: bool },
    ReplyToMissing { article: u8 },
    Like { article: u8, comment: usize },
    Unlike { article: u8, comment: usize },
    Edit { article: u8, comment: usize, blank: bool },
    Delete { article: u8, comment: usize },
    Clear { article: u8 },
    Reload,
}

fn resize_int(fuzz_id: usize, RangeTo { end }: RangeTo<usize>) -> Option<usize> {
    if end == 0 {
        return None;
    }
    let bucket_size = cmp::max(1, usize::MAX / end); // in case we rounded to 0
    let id = fuzz_id / bucket_size;
    Some(cmp::min(id, end - 1)) // in case id was actually over end - 1 due to rounding
}

fn article(a: u8) -> ArticleId {
    ArticleId(format!("article-{}", a % NUM_ARTICLES))
}

/// Flat model of one article: comments in creation order, linked by parent id only
#[derive(Clone, Debug)]
struct ModelComment {
    id: CommentId,
    parent: Option<CommentId>,
    content: String,
    likes: u64,
    is_edited: bool,
}

struct ComparativeFuzzer {
    persistence: MemoryPersistence,
    store: CommentStore<MemoryPersistence>,
    model: HashMap<ArticleId, Vec<ModelComment>>,
    next_content: usize,
}

impl ComparativeFuzzer {
    fn new() -> ComparativeFuzzer {
        let persistence = MemoryPersistence::new();
        ComparativeFuzzer {
            store: CommentStore::open(persistence.clone()),
            persistence,
            model: HashMap::new(),
            next_content: 0,
        }
    }

    fn content(&mut self, blank: bool) -> String {
        if blank {
            return String::from(" \n ");
        }
        self.next_content += 1;
        format!("comment number {}", self.next_content)
    }

    fn input(&mut self, blank: bool) -> NewComment {
        NewComment::new(
            String::from("Fuzzer"),
            String::from("fuzz@example.org"),
            self.content(blank),
        )
    }

    fn pick(&self, article: &ArticleId, comment: usize) -> Option<usize> {
        let len = self.model.get(article).map(Vec::len).unwrap_or(0);
        resize_int(comment, ..len)
    }

    fn execute_fuzz_op(&mut self, op: FuzzOp) {
        match op {
            FuzzOp::Add { article: a, blank } => {
                let a = article(a);
                let input = self.input(blank);
                match self.store.add_comment(&a, input.clone()) {
                    Ok(c) => {
                        assert!(!blank, "blank comment was accepted");
                        self.model.entry(a).or_default().push(ModelComment {
                            id: c.id,
                            parent: None,
                            content: input.content,
                            likes: 0,
                            is_edited: false,
                        });
                    }
                    Err(e) => {
                        assert!(blank, "valid comment was rejected: {e}");
                        assert_eq!(e, Error::EmptyContent);
                    }
                }
            }
            FuzzOp::Reply {
                article: a,
                parent,
                blank,
            } => {
                let raw = a;
                let a = article(raw);
                let Some(idx) = self.pick(&a, parent) else {
                    return self.execute_fuzz_op(FuzzOp::Add {
                        article: raw,
                        blank,
                    });
                };
                let parent = self.model[&a][idx].id.clone();
                let input = self.input(blank);
                match self.store.add_reply(&a, &parent, input.clone()) {
                    Ok(c) => {
                        assert!(!blank, "blank reply was accepted");
                        assert_eq!(c.parent_id, Some(parent.clone()));
                        self.model.entry(a).or_default().push(ModelComment {
                            id: c.id,
                            parent: Some(parent),
                            content: input.content,
                            likes: 0,
                            is_edited: false,
                        });
                    }
                    Err(e) => {
                        assert!(blank, "valid reply was rejected: {e}");
                        assert_eq!(e, Error::EmptyContent);
                    }
                }
            }
            FuzzOp::ReplyToMissing { article: a } => {
                let input = self.input(false);
                assert_eq!(
                    self.store
                        .add_reply(&article(a), &CommentId::stub(), input),
                    Err(Error::CommentNotFound(CommentId::stub()))
                );
            }
            FuzzOp::Like {
                article: a,
                comment,
            } => {
                let a = article(a);
                let Some(idx) = self.pick(&a, comment) else {
                    assert_eq!(self.store.like_comment(&a, &CommentId::stub()), None);
                    return;
                };
                let m = &mut self.model.get_mut(&a).expect("picked from model")[idx];
                m.likes += 1;
                assert_eq!(self.store.like_comment(&a, &m.id), Some(m.likes));
            }
            FuzzOp::Unlike {
                article: a,
                comment,
            } => {
                let a = article(a);
                let Some(idx) = self.pick(&a, comment) else {
                    assert_eq!(self.store.unlike_comment(&a, &CommentId::stub()), None);
                    return;
                };
                let m = &mut self.model.get_mut(&a).expect("picked from model")[idx];
                m.likes = m.likes.saturating_sub(1);
                assert_eq!(self.store.unlike_comment(&a, &m.id), Some(m.likes));
            }
            FuzzOp::Edit {
                article: a,
                comment,
                blank,
            } => {
                let a = article(a);
                let content = self.content(blank);
                let Some(idx) = self.pick(&a, comment) else {
                    let res = self.store.edit_comment(&a, &CommentId::stub(), content);
                    match blank {
                        true => assert_eq!(res, Err(Error::EmptyContent)),
                        false => assert_eq!(res, Err(Error::CommentNotFound(CommentId::stub()))),
                    }
                    return;
                };
                let m = &mut self.model.get_mut(&a).expect("picked from model")[idx];
                let res = self.store.edit_comment(&a, &m.id, content.clone());
                if blank {
                    assert_eq!(res, Err(Error::EmptyContent));
                } else {
                    let edited = res.expect("editing existing comment");
                    assert!(edited.is_edited);
                    assert!(edited.edited_at.is_some());
                    m.content = content;
                    m.is_edited = true;
                }
            }
            FuzzOp::Delete {
                article: a,
                comment,
            } => {
                let a = article(a);
                let Some(idx) = self.pick(&a, comment) else {
                    assert!(self.store.delete_comment(&a, &CommentId::stub()).is_none());
                    return;
                };
                let comments = self.model.get_mut(&a).expect("picked from model");
                // replies are always created after their parent, so one pass is enough
                let mut removed = vec![comments[idx].id.clone()];
                for c in comments.iter() {
                    if c.parent.as_ref().map_or(false, |p| removed.contains(p)) {
                        removed.push(c.id.clone());
                    }
                }
                comments.retain(|c| !removed.contains(&c.id));
                let deleted = self
                    .store
                    .delete_comment(&a, &removed[0])
                    .expect("deleting existing comment");
                assert_eq!(deleted.descendant_count() + 1, removed.len());
            }
            FuzzOp::Clear { article: a } => {
                let a = article(a);
                let expected = self.model.remove(&a).map(|c| c.len()).unwrap_or(0);
                assert_eq!(self.store.clear_comments(&a), expected);
            }
            FuzzOp::Reload => {
                let before = self.store.snapshot();
                self.store = CommentStore::open(self.persistence.clone());
                assert_eq!(self.store.snapshot(), before);
            }
        }
        self.check();
    }

    fn check(&self) {
        for a in 0..NUM_ARTICLES {
            let a = article(a);
            let empty = Vec::new();
            let model = self.model.get(&a).unwrap_or(&empty);
            let children = |parent: Option<CommentId>| {
                model
                    .iter()
                    .filter(|c| c.parent == parent)
                    .map(|c| c.id.clone())
                    .collect::<Vec<_>>()
            };

            let forest = self.store.get_comments(&a);
            assert_eq!(self.store.get_comment_count(&a), model.len());
            assert_eq!(
                forest.iter().map(|c| c.id.clone()).collect::<Vec<_>>(),
                children(None)
            );
            for (_, c) in forest::flatten(&forest) {
                assert_eq!(c.article_id, a);
                assert_eq!(
                    c.replies.iter().map(|r| r.id.clone()).collect::<Vec<_>>(),
                    children(Some(c.id.clone())),
                    "replies of {} are not in creation order",
                    c.id
                );
                let m = model
                    .iter()
                    .find(|m| m.id == c.id)
                    .expect("store has a comment the model does not know about");
                assert_eq!(c.parent_id, m.parent);
                assert_eq!(c.content, m.content);
                assert_eq!(c.likes, m.likes);
                assert_eq!(c.is_edited, m.is_edited);
            }
        }
    }
}

#[test]
fn resize_int_stays_in_range() {
    assert_eq!(resize_int(12, ..0), None);
    assert_eq!(resize_int(0, ..5), Some(0));
    assert_eq!(resize_int(usize::MAX, ..5), Some(4));
    assert_eq!(resize_int(usize::MAX, ..1), Some(0));
}

#[test]
fn fuzz_store_against_model() {
    bolero::check!()
        .with_generator(bolero::generator::gen_with::<Vec<FuzzOp>>().len(1..100usize))
        .cloned()
        .for_each(|ops| {
            let mut fuzzer = ComparativeFuzzer::new();
            for op in ops {
                fuzzer.execute_fuzz_op(op);
            }
        })
}
