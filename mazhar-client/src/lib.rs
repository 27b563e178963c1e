mod admin;
pub use admin::admin_rows;

mod comment;
pub use comment::Comment;

pub mod forest;
pub use forest::Forest;

mod fuzz;

mod order;
pub use order::SortOrder;

mod persist;
pub use persist::{
    decode, decode_value, encode, FilePersistence, MemoryPersistence, PersistError, Persistence,
};

mod snapshot;
pub use snapshot::Snapshot;

mod store;
pub use store::CommentStore;

pub mod api {
    pub use mazhar_api::*;
}
