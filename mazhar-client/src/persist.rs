use std::{
    cell::{Cell, RefCell},
    fs, io,
    path::PathBuf,
    rc::Rc,
};

use crate::{api::ArticleId, Forest, Snapshot};

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stored data could not be decoded
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend refused the operation, eg. because its quota is exceeded
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Where snapshots go to survive a reload
///
/// Implementations report errors, but the store never lets them reach its callers: persisting is
/// best-effort, and the in-memory snapshot stays authoritative for the session.
pub trait Persistence {
    /// Returns an empty snapshot if nothing was ever saved
    fn load(&self) -> Result<Snapshot, PersistError>;

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), PersistError>;
}

pub fn encode(snapshot: &Snapshot) -> Result<String, PersistError> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Decodes a snapshot and repairs its reply trees, see [`Snapshot::normalized`]
pub fn decode(data: &str) -> Result<Snapshot, PersistError> {
    let value = serde_json::from_str(data).map_err(|e| PersistError::Corrupt(e.to_string()))?;
    decode_value(value)
}

/// Articles whose comments cannot be decoded are dropped, without affecting the other articles
pub fn decode_value(value: serde_json::Value) -> Result<Snapshot, PersistError> {
    let articles: im::OrdMap<ArticleId, serde_json::Value> =
        serde_json::from_value(value).map_err(|e| PersistError::Corrupt(e.to_string()))?;
    let mut snapshot = Snapshot::new();
    for (article, forest) in articles {
        match serde_json::from_value::<Forest>(forest) {
            Ok(forest) => snapshot = snapshot.with_forest(article, forest),
            Err(err) => {
                tracing::warn!(
                    %article,
                    %err,
                    "dropping the comments of an article that cannot be decoded"
                )
            }
        }
    }
    Ok(snapshot.normalized())
}

/// Keeps the encoded snapshot in memory
///
/// Clones share the same storage, so that a store can be re-opened over what a previous one
/// saved.
#[derive(Clone, Debug, Default)]
pub struct MemoryPersistence {
    data: Rc<RefCell<Option<String>>>,
    fail_saves: Rc<Cell<bool>>,
}

impl MemoryPersistence {
    pub fn new() -> MemoryPersistence {
        MemoryPersistence::default()
    }

    pub fn with_contents(data: &str) -> MemoryPersistence {
        let res = MemoryPersistence::new();
        *res.data.borrow_mut() = Some(String::from(data));
        res
    }

    pub fn contents(&self) -> Option<String> {
        self.data.borrow().clone()
    }

    /// Makes all saves fail until called again with `false`
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self) -> Result<Snapshot, PersistError> {
        match &*self.data.borrow() {
            None => Ok(Snapshot::new()),
            Some(data) => decode(data),
        }
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), PersistError> {
        if self.fail_saves.get() {
            return Err(PersistError::Unavailable(String::from(
                "memory storage is configured to fail",
            )));
        }
        *self.data.borrow_mut() = Some(encode(snapshot)?);
        Ok(())
    }
}

/// Keeps the encoded snapshot in a JSON file
#[derive(Clone, Debug)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> FilePersistence {
        FilePersistence { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Persistence for FilePersistence {
    fn load(&self) -> Result<Snapshot, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => decode(&data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Snapshot::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), PersistError> {
        // write then rename, so that readers never see a partially-written file
        let tmp = self.tmp_path();
        fs::write(&tmp, encode(snapshot)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        api::{CommentId, NewComment},
        forest, Comment,
    };

    fn deep_snapshot() -> Snapshot {
        let a1 = ArticleId::from("a1");
        let input = |content: &str| {
            NewComment::new(
                String::from("Ada"),
                String::from("a@x.com"),
                String::from(content),
            )
        };
        let c1 = Comment::new(a1.clone(), None, input("c1"), Utc::now());
        let r1 = Comment::new(a1.clone(), Some(c1.id.clone()), input("r1"), Utc::now());
        let mut r2 = Comment::new(a1.clone(), Some(r1.id.clone()), input("r2"), Utc::now());
        r2.likes = 3;
        r2.is_edited = true;
        r2.edited_at = Some(Utc::now());
        let (c1_id, r1_id) = (c1.id.clone(), r1.id.clone());
        let mut f: Forest = im::vector![c1];
        f = forest::insert_reply(&f, &c1_id, r1).unwrap();
        f = forest::insert_reply(&f, &r1_id, r2).unwrap();
        let a2 = ArticleId::from("a2");
        let other = Comment::new(a2.clone(), None, input("other"), Utc::now());
        Snapshot::new()
            .with_forest(a1, f)
            .with_forest(a2, im::vector![other])
    }

    #[test]
    fn codec_round_trip_keeps_nesting() {
        let s = deep_snapshot();
        assert_eq!(decode(&encode(&s).unwrap()).unwrap(), s);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode("{not json"), Err(PersistError::Corrupt(_))));
        assert!(matches!(decode("[1, 2, 3]"), Err(PersistError::Corrupt(_))));
    }

    #[test]
    fn undecodable_article_does_not_affect_others() {
        let s = deep_snapshot();
        let mut value = serde_json::to_value(&s).unwrap();
        value["broken"] = serde_json::json!([{"content": "no id nor author"}]);
        let decoded = decode(&value.to_string()).unwrap();
        assert_eq!(decoded, s);
    }

    #[test]
    fn decodes_snapshots_from_the_first_site_version() {
        // base-36 ids, millisecond timestamps, avatar urls and no replies field on leaves
        let data = r#"{
            "sessizlik": [
                {
                    "id": "k2j4h5g6lq3x9z0",
                    "articleId": "sessizlik",
                    "author": {"name": "Ayşe", "email": "ayse@example.org", "avatar": "https://x/a.png"},
                    "content": "Harika bir yazı",
                    "createdAt": "2024-03-01T10:00:00.000Z",
                    "likes": 2,
                    "replies": [
                        {
                            "id": "p9q8r7s6lq3x9z1",
                            "articleId": "sessizlik",
                            "parentId": "k2j4h5g6lq3x9z0",
                            "author": {"name": "Can", "email": "can@example.org"},
                            "content": "Katılıyorum",
                            "createdAt": "2024-03-01T11:00:00.000Z",
                            "likes": 0,
                            "isEdited": true,
                            "editedAt": "2024-03-01T11:05:00.000Z"
                        }
                    ]
                }
            ]
        }"#;
        let mut p = MemoryPersistence::with_contents(data);
        let s = p.load().unwrap();
        let article = ArticleId::from("sessizlik");
        let f = s.forest(&article);
        assert_eq!(forest::count(&f), 2);
        assert_eq!(f[0].likes, 2);
        let reply = &f[0].replies[0];
        assert_eq!(reply.parent_id, Some(CommentId(String::from("k2j4h5g6lq3x9z0"))));
        assert!(reply.is_edited);

        // saving it again keeps the old ids addressable
        p.save(&s).unwrap();
        let reloaded = p.load().unwrap();
        assert_eq!(reloaded, s);
        assert!(forest::find(
            &reloaded.forest(&article),
            &CommentId(String::from("p9q8r7s6lq3x9z1"))
        )
        .is_some());
    }

    #[test]
    fn memory_clones_share_storage() {
        let mut p = MemoryPersistence::new();
        let other = p.clone();
        assert_eq!(other.load().unwrap(), Snapshot::new());
        let s = deep_snapshot();
        p.save(&s).unwrap();
        assert_eq!(other.load().unwrap(), s);
    }

    #[test]
    fn memory_can_fail_saves() {
        let mut p = MemoryPersistence::new();
        p.set_fail_saves(true);
        assert!(matches!(
            p.save(&deep_snapshot()),
            Err(PersistError::Unavailable(_))
        ));
        assert_eq!(p.contents(), None);
        p.set_fail_saves(false);
        p.save(&deep_snapshot()).unwrap();
        assert!(p.contents().is_some());
    }

    #[test]
    fn file_missing_loads_empty() {
        let dir = tempfile::tempdir().expect("creating tempdir");
        let p = FilePersistence::new(dir.path().join("comments.json"));
        assert_eq!(p.load().unwrap(), Snapshot::new());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().expect("creating tempdir");
        let path = dir.path().join("comments.json");
        let mut p = FilePersistence::new(&path);
        let s = deep_snapshot();
        p.save(&s).unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("comments.json.tmp").exists());
        assert_eq!(FilePersistence::new(&path).load().unwrap(), s);
    }

    #[test]
    fn file_corrupt_is_reported() {
        let dir = tempfile::tempdir().expect("creating tempdir");
        let path = dir.path().join("comments.json");
        fs::write(&path, "garbage").unwrap();
        assert!(matches!(
            FilePersistence::new(&path).load(),
            Err(PersistError::Corrupt(_))
        ));
    }
}
