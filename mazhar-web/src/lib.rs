//! Browser bindings for the comment store
//!
//! The UI talks to [`Comments`] with JSON strings. Errors are thrown as the JSON document produced
//! by [`Error::contents`], so that the UI can switch on their `type` to display form messages.

use mazhar_client::{
    admin_rows,
    api::{ArticleId, CommentId, Error, NewComment},
    CommentStore, Persistence, SortOrder,
};
use wasm_bindgen::prelude::*;

mod storage;
pub use storage::{LocalStoragePersistence, COMMENTS_STORAGE_KEY};

#[wasm_bindgen(start)]
pub fn start() {
    tracing_wasm::set_as_global_default();
}

fn js_error(err: Error) -> JsValue {
    JsValue::from_str(&String::from_utf8_lossy(&err.contents()))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value).map_err(|e| Error::Unknown(format!("serializing result: {e}")))
}

fn parse_id(id: &str) -> Result<CommentId, Error> {
    id.parse()
}

fn parse_input(input: &str) -> Result<NewComment, Error> {
    serde_json::from_str(input).map_err(|e| Error::Unknown(format!("invalid comment form: {e}")))
}

fn parse_order(order: Option<String>) -> Result<Option<SortOrder>, Error> {
    order
        .map(|o| {
            o.parse::<SortOrder>()
                .map_err(|e| Error::Unknown(e.to_string()))
        })
        .transpose()
}

fn get_comments<P: Persistence>(
    store: &CommentStore<P>,
    article: &str,
    order: Option<String>,
) -> Result<String, Error> {
    let forest = store.get_comments(&ArticleId::from(article));
    match parse_order(order)? {
        None => to_json(&forest),
        Some(o) => to_json(&o.sorted(&forest)),
    }
}

fn add_comment<P: Persistence>(
    store: &mut CommentStore<P>,
    article: &str,
    input: &str,
) -> Result<String, Error> {
    let comment = store.add_comment(&ArticleId::from(article), parse_input(input)?)?;
    to_json(&comment)
}

fn add_reply<P: Persistence>(
    store: &mut CommentStore<P>,
    article: &str,
    parent: &str,
    input: &str,
) -> Result<String, Error> {
    let parent = parse_id(parent)?;
    let reply = store.add_reply(&ArticleId::from(article), &parent, parse_input(input)?)?;
    to_json(&reply)
}

fn edit_comment<P: Persistence>(
    store: &mut CommentStore<P>,
    article: &str,
    id: &str,
    content: String,
) -> Result<String, Error> {
    let edited = store.edit_comment(&ArticleId::from(article), &parse_id(id)?, content)?;
    to_json(&edited)
}

#[wasm_bindgen]
pub struct Comments {
    store: CommentStore<LocalStoragePersistence>,
}

#[wasm_bindgen]
impl Comments {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Comments {
        Comments {
            store: CommentStore::open(LocalStoragePersistence),
        }
    }

    /// `order` is one of `newest`, `oldest` or `popular`, insertion order if absent
    #[wasm_bindgen(js_name = getComments)]
    pub fn get_comments(&self, article: &str, order: Option<String>) -> Result<String, JsValue> {
        get_comments(&self.store, article, order).map_err(js_error)
    }

    #[wasm_bindgen(js_name = getCommentCount)]
    pub fn get_comment_count(&self, article: &str) -> usize {
        self.store.get_comment_count(&ArticleId::from(article))
    }

    #[wasm_bindgen(js_name = addComment)]
    pub fn add_comment(&mut self, article: &str, input: &str) -> Result<String, JsValue> {
        add_comment(&mut self.store, article, input).map_err(js_error)
    }

    #[wasm_bindgen(js_name = addReply)]
    pub fn add_reply(
        &mut self,
        article: &str,
        parent: &str,
        input: &str,
    ) -> Result<String, JsValue> {
        add_reply(&mut self.store, article, parent, input).map_err(js_error)
    }

    /// Returns the new number of likes, or undefined if the comment does not exist
    #[wasm_bindgen(js_name = likeComment)]
    pub fn like_comment(&mut self, article: &str, id: &str) -> Result<Option<u64>, JsValue> {
        let id = parse_id(id).map_err(js_error)?;
        Ok(self.store.like_comment(&ArticleId::from(article), &id))
    }

    #[wasm_bindgen(js_name = unlikeComment)]
    pub fn unlike_comment(&mut self, article: &str, id: &str) -> Result<Option<u64>, JsValue> {
        let id = parse_id(id).map_err(js_error)?;
        Ok(self.store.unlike_comment(&ArticleId::from(article), &id))
    }

    #[wasm_bindgen(js_name = editComment)]
    pub fn edit_comment(
        &mut self,
        article: &str,
        id: &str,
        content: String,
    ) -> Result<String, JsValue> {
        edit_comment(&mut self.store, article, id, content).map_err(js_error)
    }

    /// Returns whether there was such a comment
    #[wasm_bindgen(js_name = deleteComment)]
    pub fn delete_comment(&mut self, article: &str, id: &str) -> Result<bool, JsValue> {
        let id = parse_id(id).map_err(js_error)?;
        Ok(self
            .store
            .delete_comment(&ArticleId::from(article), &id)
            .is_some())
    }

    #[wasm_bindgen(js_name = clearComments)]
    pub fn clear_comments(&mut self, article: &str) -> usize {
        self.store.clear_comments(&ArticleId::from(article))
    }

    #[wasm_bindgen(js_name = adminComments)]
    pub fn admin_comments(&self) -> Result<String, JsValue> {
        to_json(&admin_rows(&self.store.snapshot())).map_err(js_error)
    }
}

impl Default for Comments {
    fn default() -> Comments {
        Comments::new()
    }
}
