mod message;
mod attachment;
mod user;

pub use message::{ListOrder, Sender, StoredMessage};
pub use attachment::{AttachmentKind, AttachmentRecord, AttachmentState};
pub use user::UserProfile;
