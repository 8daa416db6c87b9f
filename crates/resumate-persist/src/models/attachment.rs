use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two single-slot documents a thread can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Resume,
    JobDescription,
}

impl AttachmentKind {
    /// Human label used in API messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Resume => "Resume",
            Self::JobDescription => "Job description",
        }
    }

    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Resume => "resume.pdf",
            Self::JobDescription => "job_description.pdf",
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            Self::Resume => "resumes",
            Self::JobDescription => "job_descriptions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentState {
    #[default]
    Active,
    Processing,
    Failed,
}

/// Provider-side document bound to a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    pub thread_id: String,
    pub kind: AttachmentKind,
    pub file_name: String,
    pub provider_file_name: String,
    pub provider_file_uri: String,
    pub mime_type: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: AttachmentState,
    #[serde(default)]
    pub error: Option<String>,
}

impl AttachmentRecord {
    pub fn new(
        kind: AttachmentKind,
        thread_id: impl Into<String>,
        file_name: impl Into<String>,
        provider_file_name: impl Into<String>,
        provider_file_uri: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            thread_id: thread_id.into(),
            kind,
            file_name: file_name.into(),
            provider_file_name: provider_file_name.into(),
            provider_file_uri: provider_file_uri.into(),
            mime_type: mime_type.into(),
            size_bytes: None,
            created_at: now,
            updated_at: now,
            expires_at: None,
            state: AttachmentState::Active,
            error: None,
        }
    }

    pub fn with_size(mut self, size_bytes: Option<u64>) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    pub fn file_ref(&self) -> resumate_llm::FileRef {
        resumate_llm::FileRef::new(self.provider_file_uri.clone(), self.mime_type.clone())
    }
}
