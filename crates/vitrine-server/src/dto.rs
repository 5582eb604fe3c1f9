use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vitrine_core::models::{AdminUser, ContactMessage, Image, NewContactMessage};

// ---------------------------------------------------------------------------
// Generic results
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: Uuid,
}

impl CreatedResponse {
    pub fn new(id: Uuid) -> Self {
        Self { success: true, id }
    }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// Wire shape of the public contact form.
///
/// Missing fields default to empty so that validation, not deserialization, reports them.
/// Converts into the core [`NewContactMessage`], which stays free of OpenAPI derives.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub contact_no: String,
    pub message: String,
    /// Project the visitor enquired about, if any
    pub project_id: Option<Uuid>,
    pub project_title: Option<String>,
}

impl From<ContactRequest> for NewContactMessage {
    fn from(body: ContactRequest) -> Self {
        NewContactMessage {
            name: body.name,
            email: body.email,
            contact_no: body.contact_no,
            message: body.message,
            project_id: body.project_id,
            project_title: body.project_title,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub contact_no: String,
    pub message: String,
    pub project_id: Option<Uuid>,
    pub project_title: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<ContactMessage> for ContactMessageResponse {
    fn from(m: ContactMessage) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            contact_no: m.contact_no,
            message: m.message,
            project_id: m.project_id,
            project_title: m.project_title,
            status: m.status.to_string(),
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListContactQuery {
    /// Only return messages with this status (new, read, replied, archived)
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateContactStatusRequest {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AdminUser> for AdminUserResponse {
    fn from(u: AdminUser) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageRequest {
    pub filename: String,
    pub mime_type: String,
    /// Size in bytes of a URL-referenced asset (inline data is measured)
    pub size: Option<i64>,
    /// External blob-storage URL
    pub url: Option<String>,
    /// Base64 payload, optionally as a `data:` URL
    pub data: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub url: Option<String>,
    pub is_chunked: bool,
    pub chunk_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Image> for ImageResponse {
    fn from(i: Image) -> Self {
        Self {
            id: i.id,
            filename: i.filename,
            mime_type: i.mime_type,
            size: i.size,
            url: i.url,
            is_chunked: i.is_chunked,
            chunk_count: i.chunk_count,
            created_at: i.created_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlobAvailabilityResponse {
    pub available: bool,
    pub single_video_upload_only: bool,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
