pub mod attachments;
pub mod chat;
pub mod health;
pub mod messages;
pub mod openapi;
pub mod users;
