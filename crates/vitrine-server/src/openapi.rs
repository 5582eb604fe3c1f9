use utoipa::OpenApi;
use utoipa::openapi::path::{HttpMethod, OperationBuilder};
use utoipa::openapi::response::ResponseBuilder;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

use vitrine_core::resource::RESOURCES;

use crate::auth::SESSION_COOKIE;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vitrine API",
        version = "0.3.0",
        description = "Content backend for a company showcase site with an admin panel."
    ),
    paths(
        crate::routes::submit_contact,
        crate::routes::list_contact_messages,
        crate::routes::update_contact_status,
        crate::routes::delete_contact_message,
        crate::routes::list_users,
        crate::routes::create_user,
        crate::routes::logout,
        crate::routes::blob_available,
        crate::routes::list_images,
        crate::routes::create_image,
        crate::routes::delete_image,
        crate::routes::serve_image,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::SuccessResponse,
        crate::dto::CreatedResponse,
        crate::dto::ContactRequest,
        crate::dto::ContactMessageResponse,
        crate::dto::UpdateContactStatusRequest,
        crate::dto::AdminUserResponse,
        crate::dto::CreateImageRequest,
        crate::dto::ImageResponse,
        crate::dto::BlobAvailabilityResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "content", description = "Display resources shown on the public site"),
        (name = "contact", description = "Contact form and inbox"),
        (name = "users", description = "Administrators and session"),
        (name = "images", description = "Stored images and videos"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon, &ResourcePaths)
)]
pub struct ApiDoc;

/// Adds the admin session cookie security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE,
                    "Admin session issued at login. Checked against ADMIN_SESSION_TOKEN.",
                ))),
            );
        }
    }
}

/// Documents the display-resource routes, which are generated per resource rather than
/// written as annotated handlers.
struct ResourcePaths;

impl utoipa::Modify for ResourcePaths {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        for spec in RESOURCES {
            let collection = format!("/api/admin/{}", spec.path);
            let item = format!("{collection}/{{id}}");

            openapi.paths.add_path_operation(
                &collection,
                vec![HttpMethod::Get],
                operation(format!("List {}", spec.plural), "200", "Records in display order"),
            );
            openapi.paths.add_path_operation(
                &collection,
                vec![HttpMethod::Post],
                operation(format!("Create a {}", spec.singular), "201", "Record created"),
            );
            if spec.capabilities.update {
                openapi.paths.add_path_operation(
                    &item,
                    vec![HttpMethod::Put],
                    operation(format!("Update a {}", spec.singular), "200", "Record updated"),
                );
            }
            if spec.capabilities.delete {
                openapi.paths.add_path_operation(
                    &item,
                    vec![HttpMethod::Delete],
                    operation(format!("Delete a {}", spec.singular), "200", "Record deleted"),
                );
            }
        }
    }
}

fn operation(summary: String, status: &str, description: &str) -> utoipa::openapi::path::Operation {
    OperationBuilder::new()
        .tag("content")
        .summary(Some(summary))
        .response(status, ResponseBuilder::new().description(description).build())
        .build()
}
