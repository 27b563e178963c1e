use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

mod admin;
pub use admin::{AdminComment, CommentStatus};

mod comment;
pub use comment::{validate_content, ArticleId, Author, CommentId, NewComment};

mod error;
pub use error::Error;

// All the `validate` functions throughout mazhar-api check what the store must never hold. Form
// layers are expected to run them too, so that they can display inline messages before calling
// into the store.
pub(crate) fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };
    if local.is_empty() {
        return false;
    }
    match domain.find('.') {
        None => false,
        Some(_) => !domain.starts_with('.') && !domain.ends_with('.'),
    }
}
