pub mod models;
pub mod error;
pub mod store;
pub mod memory;
pub mod dbs;

pub use models::{
    AttachmentKind, AttachmentRecord, AttachmentState, ListOrder, Sender, StoredMessage,
    UserProfile,
};
pub use error::{PersistError, Result};
pub use store::ConversationStore;
pub use memory::InMemoryStore;

#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoConversationStore;
