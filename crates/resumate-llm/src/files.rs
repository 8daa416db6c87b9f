use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

use crate::traits::FileClient;
use crate::types::FileRef;

/// Processing state of a provider-side file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    #[default]
    StateUnspecified,
    Processing,
    Active,
    Failed,
}

/// File metadata as returned by the Files API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFile {
    /// Resource name, e.g. `files/abc123`
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub mime_type: String,
    /// int64 fields are encoded as JSON strings
    #[serde(default)]
    pub size_bytes: Option<String>,
    pub uri: String,
    #[serde(default)]
    pub state: FileState,
}

impl ProviderFile {
    pub fn file_ref(&self) -> FileRef {
        FileRef::new(self.uri.clone(), self.mime_type.clone())
    }

    pub fn is_processing(&self) -> bool {
        self.state == FileState::Processing
    }
}

/// Bounded exponential backoff used while a file is processing
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Poll until the file leaves PROCESSING.
///
/// FAILED and running past `policy.timeout` are errors; any other
/// non-processing state is handed back as-is.
pub async fn wait_until_active<C: FileClient + ?Sized>(
    client: &C,
    mut file: ProviderFile,
    policy: PollPolicy,
) -> Result<ProviderFile> {
    let deadline = Instant::now() + policy.timeout;
    let mut delay = policy.initial_delay;

    while file.is_processing() {
        if Instant::now() + delay > deadline {
            bail!(
                "File {} still processing after {:?}",
                file.name,
                policy.timeout
            );
        }

        tracing::debug!(file = %file.name, delay_ms = delay.as_millis() as u64, "file still processing");
        tokio::time::sleep(delay).await;
        delay = (delay * 2).min(policy.max_delay);

        file = client.get_file(&file.name).await?;
    }

    if file.state == FileState::Failed {
        bail!("File {} failed provider processing", file.name);
    }

    Ok(file)
}
