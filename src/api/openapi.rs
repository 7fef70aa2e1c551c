//! OpenAPI document for the REST surface.
//!
//! Served as JSON at `/api-docs/openapi.json`; with the `swagger-ui`
//! feature the interactive UI is mounted at `/swagger-ui`.

use axum::Router;
use utoipa::OpenApi;

use crate::api::dto::EntryListResponse;
use crate::api::handlers::{auth, diary, system};
use crate::app_state::AppState;
use crate::domain::{EntryDocument, EntryKind, Food, Meal, MealType, Nutrition, Symptom, SymptomType};
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::{
    BadFood, DayCount, DaySummary, DaySymptomCount, MonthSummary, SymptomOverview,
    SymptomTypeStats,
};
use crate::validation::FieldViolation;

/// Path of the generated OpenAPI JSON.
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Aggregated OpenAPI description of every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "gut-diary",
        description = "Meal and gastrointestinal symptom diary API"
    ),
    paths(
        diary::create_meal,
        diary::create_symptom,
        diary::list_entries,
        diary::symptom_overview,
        diary::day_summary,
        diary::month_summary,
        diary::entries_with_food,
        diary::get_entry,
        diary::update_entry,
        diary::delete_entry,
        auth::logout,
        system::health_handler,
    ),
    components(schemas(
        EntryDocument,
        EntryKind,
        Meal,
        MealType,
        Food,
        Nutrition,
        Symptom,
        SymptomType,
        EntryListResponse,
        DaySummary,
        DayCount,
        MonthSummary,
        SymptomOverview,
        SymptomTypeStats,
        DaySymptomCount,
        BadFood,
        ErrorResponse,
        ErrorBody,
        FieldViolation,
        system::HealthResponse,
    )),
    tags(
        (name = "Diary", description = "Meal and symptom entries"),
        (name = "Auth", description = "Session cookies"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

/// Routes serving the OpenAPI document (and Swagger UI when enabled).
#[cfg(feature = "swagger-ui")]
pub fn routes() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(OPENAPI_JSON_PATH, ApiDoc::openapi()),
    )
}

/// Routes serving the OpenAPI document (and Swagger UI when enabled).
#[cfg(not(feature = "swagger-ui"))]
pub fn routes() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    Router::new().route(OPENAPI_JSON_PATH, get(|| async { Json(ApiDoc::openapi()) }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/diary",
            "/api/v1/diary/meals",
            "/api/v1/diary/symptoms",
            "/api/v1/diary/overview/symptoms",
            "/api/v1/diary/date/{date}",
            "/api/v1/diary/month/{year}/{month}",
            "/api/v1/diary/foods/{foodId}",
            "/api/v1/diary/{id}",
            "/api/v1/auth/logout",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
