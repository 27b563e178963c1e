
use anyhow::{anyhow, Context};
use serde_json::json;

use crate::CommentId;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Invalid email address {0:?}")]
    InvalidEmail(String),

    #[error("Comment must not be empty")]
    EmptyContent,

    #[error("Comment not found {0}")]
    CommentNotFound(CommentId),
}

impl Error {
    /// Whether this error is about user input, and should be displayed next to the form
    pub fn is_validation(&self) -> bool {
        match self {
            Error::NullByteInString(_)
            | Error::EmptyName
            | Error::InvalidEmail(_)
            | Error::EmptyContent => true,
            Error::Unknown(_) | Error::CommentNotFound(_) => false,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::EmptyName => json!({
                "message": "name must not be empty",
                "type": "empty-name",
            }),
            Error::InvalidEmail(e) => json!({
                "message": "invalid email address",
                "type": "invalid-email",
                "email": e,
            }),
            Error::EmptyContent => json!({
                "message": "comment must not be empty",
                "type": "empty-content",
            }),
            Error::CommentNotFound(id) => json!({
                "message": "comment not found",
                "type": "comment-not-found",
                "id": id,
            }),
        })
        .expect("serializing error")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "null-byte" => Error::NullByteInString(String::from(
                    data.get("string").and_then(|s| s.as_str()).ok_or_else(|| {
                        anyhow!("error is a null-byte-in-string without a string")
                    })?,
                )),
                "empty-name" => Error::EmptyName,
                "invalid-email" => Error::InvalidEmail(String::from(
                    data.get("email")
                        .and_then(|e| e.as_str())
                        .ok_or_else(|| anyhow!("error is an invalid email without the email"))?,
                )),
                "empty-content" => Error::EmptyContent,
                "comment-not-found" => Error::CommentNotFound(CommentId(String::from(
                    data.get("id")
                        .and_then(|id| id.as_str())
                        .ok_or_else(|| anyhow!("error is a missing comment without a proper id"))?,
                ))),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_round_trip_through_json() {
        let errors = [
            Error::Unknown(String::from("oops")),
            Error::NullByteInString(String::from("a\0b")),
            Error::EmptyName,
            Error::InvalidEmail(String::from("nope")),
            Error::EmptyContent,
            Error::CommentNotFound(CommentId::generate()),
        ];
        for err in errors {
            assert_eq!(Error::parse(&err.contents()).unwrap(), err);
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Error::parse(b"not json").is_err());
        assert!(Error::parse(br#"{"type": "no-such-error"}"#).is_err());
        assert!(Error::parse(br#"{"type": "comment-not-found", "id": "123"}"#).is_err());
    }

    #[test]
    fn validation_errors_are_grouped() {
        assert!(Error::EmptyContent.is_validation());
        assert!(Error::InvalidEmail(String::new()).is_validation());
        assert!(!Error::CommentNotFound(CommentId::stub()).is_validation());
        assert!(!Error::Unknown(String::new()).is_validation());
    }
}
