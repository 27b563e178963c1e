use std::{fmt, str::FromStr};

use uuid::Uuid;

use crate::{Error, STUB_UUID};

/// Identifier of an article, as used in its URL
#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct ArticleId(pub String);

impl ArticleId {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.0)
    }
}

impl From<&str> for ArticleId {
    fn from(s: &str) -> ArticleId {
        ArticleId(String::from(s))
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of a comment
///
/// New comments get a random UUID, but any non-empty string is accepted so that comments saved
/// with older id schemes stay addressable.
#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn generate() -> CommentId {
        CommentId(Uuid::new_v4().to_string())
    }

    pub fn stub() -> CommentId {
        CommentId(STUB_UUID.to_string())
    }

    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.0)
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CommentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<CommentId, Error> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::Unknown(String::from("comment id must not be empty")));
        }
        let id = CommentId(String::from(s));
        id.validate()?;
        Ok(id)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Author {
    pub name: String,

    /// Kept for moderation purposes only, must never be displayed
    pub email: String,
}

impl Author {
    /// Up to two upper-cased initials, for avatar placeholders
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

/// What a reader typed in the comment form
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub name: String,
    pub email: String,
    pub content: String,
}

impl NewComment {
    pub fn new(name: String, email: String, content: String) -> NewComment {
        NewComment {
            name,
            email,
            content,
        }
    }

    // See comments on other `validate` functions throughout mazhar-api
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.name)?;
        crate::validate_string(&self.email)?;
        crate::validate_string(&self.content)?;
        if self.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if !crate::is_valid_email(&self.email) {
            return Err(Error::InvalidEmail(self.email.clone()));
        }
        validate_content(&self.content)
    }

    pub fn author(&self) -> Author {
        Author {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Checks the text of a new comment or of an edit
pub fn validate_content(content: &str) -> Result<(), Error> {
    crate::validate_string(content)?;
    match content.trim().is_empty() {
        true => Err(Error::EmptyContent),
        false => Ok(()),
    }
}
