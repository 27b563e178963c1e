use gloo_storage::{errors::StorageError, LocalStorage, Storage};
use mazhar_client::{decode_value, PersistError, Persistence, Snapshot};

pub const COMMENTS_STORAGE_KEY: &str = "mazhar_comments";

/// Persists snapshots to the browser's `localStorage`
#[derive(Clone, Debug, Default)]
pub struct LocalStoragePersistence;

fn persist_error(err: StorageError) -> PersistError {
    match err {
        StorageError::SerdeError(e) => PersistError::Corrupt(e.to_string()),
        // Most likely the quota is exceeded, or storage is disabled for this origin
        e => PersistError::Unavailable(e.to_string()),
    }
}

impl Persistence for LocalStoragePersistence {
    fn load(&self) -> Result<Snapshot, PersistError> {
        match LocalStorage::get::<serde_json::Value>(COMMENTS_STORAGE_KEY) {
            Ok(value) => decode_value(value),
            Err(StorageError::KeyNotFound(_)) => Ok(Snapshot::new()),
            Err(e) => Err(persist_error(e)),
        }
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), PersistError> {
        LocalStorage::set(COMMENTS_STORAGE_KEY, snapshot).map_err(persist_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_errors_are_corruption() {
        let err = serde_json::from_str::<Snapshot>("{nope").unwrap_err();
        assert!(matches!(
            persist_error(StorageError::SerdeError(err)),
            PersistError::Corrupt(_)
        ));
        assert!(matches!(
            persist_error(StorageError::KeyNotFound(String::from(COMMENTS_STORAGE_KEY))),
            PersistError::Unavailable(_)
        ));
    }
}
