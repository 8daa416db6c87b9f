use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub primary_email: Option<String>,
    #[serde(default)]
    pub primary_email_verified: bool,
    pub profile_image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}
