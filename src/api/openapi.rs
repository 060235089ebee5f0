//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, visitors};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Visitor Registry API",
        version = "0.1.0",
        description = "Residential building visitor check-in / check-out API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Visitors
        visitors::register_visitor,
        visitors::list_active_visitors,
        visitors::admin_exit_visitor,
        visitors::self_exit_visitor,
    ),
    components(
        schemas(
            // Visitors
            crate::models::visitor::Visitor,
            crate::models::visitor::RegisterVisitor,
            crate::models::visitor::RegisteredVisitor,
            crate::models::visitor::SelfExitRequest,
            crate::models::visitor::MessageResponse,
            crate::models::enums::VehicleType,
            crate::models::enums::VisitorStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "visitors", description = "Visitor registration and exit")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
