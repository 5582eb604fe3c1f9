use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::{
    CACHE_CONTROL, CONTENT_SECURITY_POLICY, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS,
};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{MethodRouter, delete, get, post, put};
use axum::{Json, Router, middleware};
use axum_extra::extract::cookie::CookieJar;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use vitrine_core::models::{ContactStatus, ImageSource, NewContactMessage, NewImage};
use vitrine_core::resource::{RESOURCES, ResourceSpec};

use crate::auth::{AdminSession, clear_session, require_admin};
use crate::dto::{
    AdminUserResponse, BlobAvailabilityResponse, ContactMessageResponse, ContactRequest,
    CreateImageRequest, CreatedResponse, HealthResponse, ImageResponse, ListContactQuery,
    SuccessResponse, UpdateContactStatusRequest,
};
use crate::error::{ApiError, ResultExt};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Upper bound for an image upload body (base64 inflates payloads by a third).
pub const IMAGE_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let mut content = Router::new();
    for spec in RESOURCES {
        content = content.merge(resource_routes(spec));
    }

    let admin = Router::new()
        .route("/api/admin/contact", get(list_contact_messages))
        .route(
            "/api/admin/contact/{id}",
            put(update_contact_status).delete(delete_contact_message),
        )
        .route(
            "/api/admin/images",
            get(list_images)
                .post(create_image)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(IMAGE_BODY_LIMIT)),
        )
        .route("/api/admin/images/{id}", delete(delete_image))
        .route("/api/admin/blob-available", get(blob_available))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let public = Router::new()
        .route("/health", get(health))
        .route("/api/contact", post(submit_contact))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/admin/auth/logout", post(logout))
        .route("/api/images/{id}", get(serve_image))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.merge(content).merge(admin).with_state(state)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

// ---------------------------------------------------------------------------
// Display resources
// ---------------------------------------------------------------------------

/// Routes for one display resource: public listing, admin create, and admin update/delete
/// where the resource allows them.
fn resource_routes(spec: &'static ResourceSpec) -> Router<Arc<AppState>> {
    let collection = format!("/api/admin/{}", spec.path);

    let mut router = Router::new().route(
        &collection,
        get(move |State(state): State<Arc<AppState>>| list_records(state, spec)).post(
            move |State(state): State<Arc<AppState>>,
                  session: AdminSession,
                  payload: Result<Json<Value>, JsonRejection>| {
                create_record(state, session, spec, payload)
            },
        ),
    );

    let mut item: Option<MethodRouter<Arc<AppState>>> = None;
    if spec.capabilities.update {
        item = Some(put(
            move |State(state): State<Arc<AppState>>,
                  session: AdminSession,
                  Path(id): Path<Uuid>,
                  payload: Result<Json<Value>, JsonRejection>| {
                update_record(state, session, spec, id, payload)
            },
        ));
    }
    if spec.capabilities.delete {
        let remove = move |State(state): State<Arc<AppState>>,
                           session: AdminSession,
                           Path(id): Path<Uuid>| {
            delete_record(state, session, spec, id)
        };
        item = Some(match item {
            Some(methods) => methods.delete(remove),
            None => delete(remove),
        });
    }
    if let Some(methods) = item {
        router = router.route(&format!("{collection}/{{id}}"), methods);
    }

    router
}

async fn list_records(
    state: Arc<AppState>,
    spec: &'static ResourceSpec,
) -> Result<Json<Vec<Value>>, ApiError> {
    let records = state
        .db
        .content_repo(spec)
        .list()
        .await
        .context(format!("Failed to fetch {}", spec.plural))?;

    Ok(Json(records))
}

async fn create_record(
    state: Arc<AppState>,
    _session: AdminSession,
    spec: &'static ResourceSpec,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let failure = format!("Failed to create {}", spec.singular);
    let body = json_body(payload)?;
    let record = spec.new_record(&body).context(&failure)?;

    let id = state
        .db
        .content_repo(spec)
        .create(record)
        .await
        .context(failure)?;

    tracing::info!(resource = spec.path, %id, "record created");
    Ok((StatusCode::CREATED, Json(CreatedResponse::new(id))))
}

async fn update_record(
    state: Arc<AppState>,
    _session: AdminSession,
    spec: &'static ResourceSpec,
    id: Uuid,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let failure = format!("Failed to update {}", spec.singular);
    let body = json_body(payload)?;
    let changes = spec.changes(&body).context(&failure)?;

    let updated = state
        .db
        .content_repo(spec)
        .update(id, changes)
        .await
        .context(failure)?;

    if !updated {
        return Err(ApiError::NotFound(format!("{} not found", spec.singular)));
    }

    tracing::info!(resource = spec.path, %id, "record updated");
    Ok(Json(SuccessResponse::ok()))
}

async fn delete_record(
    state: Arc<AppState>,
    _session: AdminSession,
    spec: &'static ResourceSpec,
    id: Uuid,
) -> Result<Json<SuccessResponse>, ApiError> {
    let removed = state
        .db
        .content_repo(spec)
        .delete(id)
        .await
        .context(format!("Failed to delete {}", spec.singular))?;

    tracing::info!(resource = spec.path, %id, removed, "record deleted");
    Ok(Json(SuccessResponse::ok()))
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message stored", body = CreatedResponse),
        (status = 400, description = "A required field is empty", body = crate::dto::ErrorResponse),
    ),
    tag = "contact"
)]
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let message = NewContactMessage::from(json_body(payload)?);
    message.validate()?;
    let message = message.normalized();

    let id = state
        .db
        .contact_repo()
        .create(&message)
        .await
        .context("Failed to send message")?;

    tracing::info!(%id, "contact message received");
    Ok((StatusCode::CREATED, Json(CreatedResponse::new(id))))
}

#[utoipa::path(
    get,
    path = "/api/admin/contact",
    params(ListContactQuery),
    responses(
        (status = 200, description = "Contact messages, newest first", body = [ContactMessageResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session" = [])),
    tag = "contact"
)]
pub async fn list_contact_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListContactQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = query
        .status
        .map(|s| s.parse::<ContactStatus>())
        .transpose()
        .map_err(ApiError::Validation)?;

    let messages = state
        .db
        .contact_repo()
        .list(status)
        .await
        .context("Failed to fetch contact messages")?;

    Ok(Json(
        messages
            .into_iter()
            .map(ContactMessageResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    put,
    path = "/api/admin/contact/{id}",
    params(("id" = Uuid, Path, description = "Message ID")),
    request_body = UpdateContactStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = SuccessResponse),
        (status = 400, description = "Unknown status", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session" = [])),
    tag = "contact"
)]
pub async fn update_contact_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateContactStatusRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let status: ContactStatus = json_body(payload)?
        .status
        .parse()
        .map_err(ApiError::Validation)?;

    let updated = state
        .db
        .contact_repo()
        .set_status(id, status)
        .await
        .context("Failed to update contact message")?;

    if !updated {
        return Err(ApiError::NotFound("contact message not found".into()));
    }

    Ok(Json(SuccessResponse::ok()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/contact/{id}",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session" = [])),
    tag = "contact"
)]
pub async fn delete_contact_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .db
        .contact_repo()
        .delete(id)
        .await
        .context("Failed to delete contact message")?;

    Ok(Json(SuccessResponse::ok()))
}

// ---------------------------------------------------------------------------
// Users & session
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Administrators", body = [AdminUserResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
) -> Result<impl IntoResponse, ApiError> {
    let users = state
        .db
        .user_repo()
        .list()
        .await
        .context("Failed to fetch users")?;

    Ok(Json(
        users
            .into_iter()
            .map(AdminUserResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/users",
    responses(
        (status = 405, description = "User creation is disabled", body = crate::dto::ErrorResponse),
    ),
    tag = "users"
)]
pub async fn create_user() -> ApiError {
    ApiError::PolicyDenied("User creation is disabled".into())
}

#[utoipa::path(
    post,
    path = "/api/admin/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = SuccessResponse),
    ),
    tag = "users"
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<SuccessResponse>) {
    (clear_session(jar), Json(SuccessResponse::ok()))
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/admin/blob-available",
    responses(
        (status = 200, description = "Blob storage availability", body = BlobAvailabilityResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session" = [])),
    tag = "images"
)]
pub async fn blob_available(State(state): State<Arc<AppState>>) -> Json<BlobAvailabilityResponse> {
    Json(BlobAvailabilityResponse {
        available: state.storage.token_present,
        single_video_upload_only: state.storage.single_video_upload_only,
    })
}

#[utoipa::path(
    get,
    path = "/api/admin/images",
    responses(
        (status = 200, description = "Image metadata, newest first", body = [ImageResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session" = [])),
    tag = "images"
)]
pub async fn list_images(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let images = state
        .db
        .image_repo()
        .list()
        .await
        .context("Failed to fetch images")?;

    Ok(Json(
        images
            .into_iter()
            .map(ImageResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/images",
    request_body = CreateImageRequest,
    responses(
        (status = 201, description = "Image stored", body = CreatedResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session" = [])),
    tag = "images"
)]
pub async fn create_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateImageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(payload)?;

    let source = match (body.url, body.data) {
        (Some(url), None) => ImageSource::Url(url.trim().to_string()),
        (None, Some(data)) => ImageSource::Inline(decode_base64(&data)?),
        _ => {
            return Err(ApiError::Validation(
                "exactly one of url or data is required".into(),
            ));
        }
    };
    let image = NewImage::new(&body.filename, &body.mime_type, source)?;

    let id = state
        .db
        .image_repo()
        .create(image, body.size)
        .await
        .context("Failed to save image")?;

    tracing::info!(%id, "image stored");
    Ok((StatusCode::CREATED, Json(CreatedResponse::new(id))))
}

/// Decode a base64 payload, accepting a `data:<mime>;base64,` prefix.
fn decode_base64(data: &str) -> Result<Vec<u8>, ApiError> {
    let payload = data
        .split_once(";base64,")
        .map(|(_, encoded)| encoded)
        .unwrap_or(data);

    STANDARD
        .decode(payload.trim())
        .map_err(|_| ApiError::Validation("image data is not valid base64".into()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/images/{id}",
    params(("id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("session" = [])),
    tag = "images"
)]
pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .db
        .image_repo()
        .delete(id)
        .await
        .context("Failed to delete image")?;

    Ok(Json(SuccessResponse::ok()))
}

#[utoipa::path(
    get,
    path = "/api/images/{id}",
    params(("id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Inline asset bytes"),
        (status = 307, description = "Redirect to the blob-storage URL"),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "images"
)]
pub async fn serve_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let content = state
        .db
        .image_repo()
        .content(id)
        .await
        .context("Failed to load image")?
        .ok_or_else(|| ApiError::NotFound("Image not found".into()))?;

    let response = match content.source {
        // Served from the API origin, so the browser must not sniff or run it.
        ImageSource::Inline(bytes) => (
            [(CONTENT_TYPE, content.mime_type)],
            [
                (CACHE_CONTROL, "public, max-age=31536000, immutable"),
                (X_CONTENT_TYPE_OPTIONS, "nosniff"),
                (CONTENT_SECURITY_POLICY, "sandbox"),
            ],
            bytes,
        )
            .into_response(),
        ImageSource::Url(url) => Redirect::temporary(&url).into_response(),
    };

    Ok(response)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let healthy = match state.db.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            false
        }
    };

    let (status, response) = if healthy {
        (
            StatusCode::OK,
            HealthResponse {
                status: "healthy",
                database: "ok",
            },
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "unhealthy",
                database: "error",
            },
        )
    };

    (status, Json(response))
}
