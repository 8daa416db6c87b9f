use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AttachmentKind, AttachmentRecord, AttachmentState, Sender, StoredMessage, UserProfile};

/// MongoDB message document. `_id` doubles as the insertion tie-breaker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub thread_id: String,
    pub sender: Sender,
    pub content: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAttachment {
    pub thread_id: String,
    pub kind: AttachmentKind,
    pub file_name: String,
    pub provider_file_name: String,
    pub provider_file_uri: String,
    pub mime_type: String,
    #[serde(default)]
    pub size_bytes: Option<i64>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: AttachmentState,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub display_name: Option<String>,
    pub primary_email: Option<String>,
    pub primary_email_verified: bool,
    pub profile_image_url: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl From<MongoMessage> for StoredMessage {
    fn from(msg: MongoMessage) -> Self {
        Self {
            id: msg.id.to_hex(),
            thread_id: msg.thread_id,
            sender: msg.sender,
            content: msg.content,
            sent_at: msg.sent_at,
        }
    }
}

impl From<AttachmentRecord> for MongoAttachment {
    fn from(record: AttachmentRecord) -> Self {
        Self {
            thread_id: record.thread_id,
            kind: record.kind,
            file_name: record.file_name,
            provider_file_name: record.provider_file_name,
            provider_file_uri: record.provider_file_uri,
            mime_type: record.mime_type,
            size_bytes: record.size_bytes.and_then(|s| i64::try_from(s).ok()),
            created_at: record.created_at,
            updated_at: record.updated_at,
            expires_at: record.expires_at,
            state: record.state,
            error: record.error,
        }
    }
}

impl From<MongoAttachment> for AttachmentRecord {
    fn from(doc: MongoAttachment) -> Self {
        Self {
            thread_id: doc.thread_id,
            kind: doc.kind,
            file_name: doc.file_name,
            provider_file_name: doc.provider_file_name,
            provider_file_uri: doc.provider_file_uri,
            mime_type: doc.mime_type,
            size_bytes: doc.size_bytes.and_then(|s| u64::try_from(s).ok()),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            expires_at: doc.expires_at,
            state: doc.state,
            error: doc.error,
        }
    }
}

impl From<UserProfile> for MongoUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            display_name: profile.display_name,
            primary_email: profile.primary_email,
            primary_email_verified: profile.primary_email_verified,
            profile_image_url: profile.profile_image_url,
            updated_at: profile.updated_at,
        }
    }
}
