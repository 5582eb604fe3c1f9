use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::sanitize::plain_text;

// ---------------------------------------------------------------------------
// Contact messages
// ---------------------------------------------------------------------------

/// Review state of a contact message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
    Archived,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Read => "read",
            ContactStatus::Replied => "replied",
            ContactStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ContactStatus::New),
            "read" => Ok(ContactStatus::Read),
            "replied" => Ok(ContactStatus::Replied),
            "archived" => Ok(ContactStatus::Archived),
            other => Err(format!("Unknown contact status: {other}")),
        }
    }
}

/// A stored contact form submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub contact_no: String,
    pub message: String,
    pub project_id: Option<Uuid>,
    pub project_title: Option<String>,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

/// Contact message to insert, built from the public form body.
#[derive(Debug, Clone, Default)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub contact_no: String,
    pub message: String,
    pub project_id: Option<Uuid>,
    pub project_title: Option<String>,
}

impl NewContactMessage {
    /// All four contact fields must be present and non-blank.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [&self.name, &self.email, &self.contact_no, &self.message];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AppError::Validation("All fields are required".into()));
        }
        Ok(())
    }

    /// Trim the required fields and drop markup from the echoed project title.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.contact_no = self.contact_no.trim().to_string();
        self.message = self.message.trim().to_string();
        self.project_title = self
            .project_title
            .map(|t| plain_text(&t))
            .filter(|t| !t.is_empty());
        self
    }
}

// ---------------------------------------------------------------------------
// Admin users
// ---------------------------------------------------------------------------

/// Administrator account as exposed by the API. The password hash is never loaded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Image or video metadata. The inline payload is only loaded when serving the asset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub url: Option<String>,
    pub is_chunked: bool,
    pub chunk_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Where an asset's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Bytes stored in the `images.data` column.
    Inline(Vec<u8>),
    /// External blob-storage URL.
    Url(String),
}

/// Payload needed to serve an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageContent {
    pub mime_type: String,
    pub source: ImageSource,
}

const SVG_MIME_TYPE: &str = "image/svg+xml";

/// Validated image to insert.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub filename: String,
    pub mime_type: String,
    pub source: ImageSource,
}

impl NewImage {
    pub fn new(filename: &str, mime_type: &str, source: ImageSource) -> Result<Self, AppError> {
        let filename = plain_text(filename);
        if filename.is_empty() {
            return Err(AppError::Validation("filename is required".into()));
        }
        let mime_type = mime_type.trim().to_ascii_lowercase();
        if !(mime_type.starts_with("image/") || mime_type.starts_with("video/")) {
            return Err(AppError::Validation(format!(
                "unsupported mime type: {mime_type}"
            )));
        }
        // SVG can carry script and is served from the API origin.
        if mime_type.starts_with(SVG_MIME_TYPE) {
            return Err(AppError::Validation(
                "svg images are not accepted, upload a raster image".into(),
            ));
        }
        match &source {
            ImageSource::Inline(bytes) if bytes.is_empty() => {
                return Err(AppError::Validation("image data is empty".into()));
            }
            ImageSource::Url(url) if !(url.starts_with("https://") || url.starts_with("http://")) => {
                return Err(AppError::Validation("image url must be http(s)".into()));
            }
            _ => {}
        }
        Ok(Self {
            filename,
            mime_type,
            source,
        })
    }

    /// Size in bytes; URL-referenced assets report the size given by the uploader.
    pub fn inline_size(&self) -> Option<i64> {
        match &self.source {
            ImageSource::Inline(bytes) => Some(bytes.len() as i64),
            ImageSource::Url(_) => None,
        }
    }
}
