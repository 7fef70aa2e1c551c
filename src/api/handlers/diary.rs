//! Diary handlers: create, read, update, delete and summaries.
//!
//! Every handler runs on behalf of the [`CurrentUser`] and parses its
//! input with the explicit parsers in [`crate::api::dto`] before calling
//! the [`DiaryService`](crate::service::DiaryService).

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;

use crate::api::dto::{
    EntryListResponse, RawListQuery, RawOverviewQuery, parse_create_meal, parse_create_symptom,
    parse_date_param, parse_entry_id, parse_list_query, parse_month_params, parse_overview_days,
    parse_update_entry,
};
use crate::api::extractors::CurrentUser;
use crate::app_state::AppState;
use crate::domain::EntryDocument;
use crate::error::{DiaryError, ErrorResponse};
use crate::service::{DaySummary, MonthSummary, SymptomOverview};

/// `POST /diary/meals` — Log a meal.
///
/// # Errors
///
/// Returns [`DiaryError::Validation`] listing every invalid field.
#[utoipa::path(
    post,
    path = "/api/v1/diary/meals",
    tag = "Diary",
    summary = "Log a meal",
    description = "Creates a meal entry on the given local day. `meal.foods` must contain at least one food.",
    request_body(content = serde_json::Value, description = "`{ date, meal: { type, time, foods, notes? } }`"),
    params(("x-user-id" = String, Header, description = "Authenticated user")),
    responses(
        (status = 201, description = "Meal logged", body = EntryDocument),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing user", body = ErrorResponse),
    )
)]
pub async fn create_meal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, DiaryError> {
    let Json(body) = payload?;
    let request = parse_create_meal(&body)?;
    let entry = state.diary_service.create_meal(&user, request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `POST /diary/symptoms` — Log a symptom.
///
/// # Errors
///
/// Returns [`DiaryError::Validation`] listing every invalid field.
#[utoipa::path(
    post,
    path = "/api/v1/diary/symptoms",
    tag = "Diary",
    summary = "Log a symptom",
    description = "Creates a symptom entry on the given local day. Intensity ranges from 1 to 5.",
    request_body(content = serde_json::Value, description = "`{ date, symptom: { type, intensity, time, duration?, notes? } }`"),
    params(("x-user-id" = String, Header, description = "Authenticated user")),
    responses(
        (status = 201, description = "Symptom logged", body = EntryDocument),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing user", body = ErrorResponse),
    )
)]
pub async fn create_symptom(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, DiaryError> {
    let Json(body) = payload?;
    let request = parse_create_symptom(&body)?;
    let entry = state.diary_service.create_symptom(&user, request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /diary` — List entries by day or date range.
///
/// # Errors
///
/// Returns [`DiaryError::Validation`] on malformed query values.
#[utoipa::path(
    get,
    path = "/api/v1/diary",
    tag = "Diary",
    summary = "List entries",
    description = "Lists entries of one day (`date`) or of an inclusive range (`startDate`/`endDate`), newest first, optionally filtered by `type`.",
    params(
        RawListQuery,
        ("x-user-id" = String, Header, description = "Authenticated user"),
    ),
    responses(
        (status = 200, description = "Matching entries", body = EntryListResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse),
    )
)]
pub async fn list_entries(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    query: Result<Query<RawListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, DiaryError> {
    let Query(raw) = query?;
    let query = parse_list_query(&raw)?;
    let entries = state.diary_service.list_entries(&user, query).await?;
    Ok(Json(EntryListResponse::from(entries)))
}

/// `GET /diary/overview/symptoms` — Symptom statistics.
///
/// # Errors
///
/// Returns [`DiaryError::Validation`] if `days` is out of range.
#[utoipa::path(
    get,
    path = "/api/v1/diary/overview/symptoms",
    tag = "Diary",
    summary = "Symptom overview",
    description = "Aggregates symptoms of the trailing `days` local days (default 30): totals, per-kind breakdown, per-day counts, foods marked as bad and the most intense entries.",
    params(
        RawOverviewQuery,
        ("x-user-id" = String, Header, description = "Authenticated user"),
    ),
    responses(
        (status = 200, description = "Symptom overview", body = SymptomOverview),
        (status = 400, description = "Invalid window", body = ErrorResponse),
    )
)]
pub async fn symptom_overview(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    query: Result<Query<RawOverviewQuery>, QueryRejection>,
) -> Result<impl IntoResponse, DiaryError> {
    let Query(raw) = query?;
    let days = parse_overview_days(&raw)?;
    let overview = state.diary_service.symptom_overview(&user, days).await?;
    Ok(Json(overview))
}

/// `GET /diary/date/{date}` — Day summary.
///
/// # Errors
///
/// Returns [`DiaryError::Validation`] if `date` is not `YYYY-MM-DD`.
#[utoipa::path(
    get,
    path = "/api/v1/diary/date/{date}",
    tag = "Diary",
    summary = "Day summary",
    description = "Entries of one local day with nutrition totals and meal/symptom counts.",
    params(
        ("date" = String, Path, description = "Day, `YYYY-MM-DD`"),
        ("x-user-id" = String, Header, description = "Authenticated user"),
    ),
    responses(
        (status = 200, description = "Day summary", body = DaySummary),
        (status = 400, description = "Invalid date", body = ErrorResponse),
    )
)]
pub async fn day_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, DiaryError> {
    let date = parse_date_param(&date)?;
    let summary = state.diary_service.day_summary(&user, date).await?;
    Ok(Json(summary))
}

/// `GET /diary/month/{year}/{month}` — Month summary.
///
/// # Errors
///
/// Returns [`DiaryError::Validation`] on a malformed year or month.
#[utoipa::path(
    get,
    path = "/api/v1/diary/month/{year}/{month}",
    tag = "Diary",
    summary = "Month summary",
    description = "Entries of one month with meal and symptom counts for every day.",
    params(
        ("year" = String, Path, description = "Four-digit year"),
        ("month" = String, Path, description = "Month, 1–12"),
        ("x-user-id" = String, Header, description = "Authenticated user"),
    ),
    responses(
        (status = 200, description = "Month summary", body = MonthSummary),
        (status = 400, description = "Invalid year or month", body = ErrorResponse),
    )
)]
pub async fn month_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((year, month)): Path<(String, String)>,
) -> Result<impl IntoResponse, DiaryError> {
    let (year, month) = parse_month_params(&year, &month)?;
    let summary = state.diary_service.month_summary(&user, year, month).await?;
    Ok(Json(summary))
}

/// `GET /diary/foods/{foodId}` — Entries containing a food.
///
/// # Errors
///
/// Returns [`DiaryError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/diary/foods/{foodId}",
    tag = "Diary",
    summary = "Entries containing a food",
    description = "Meal entries in which the given catalog food was eaten, newest first.",
    params(
        ("foodId" = String, Path, description = "Catalog food id"),
        ("x-user-id" = String, Header, description = "Authenticated user"),
    ),
    responses(
        (status = 200, description = "Matching meal entries", body = EntryListResponse),
    )
)]
pub async fn entries_with_food(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(food_id): Path<String>,
) -> Result<impl IntoResponse, DiaryError> {
    let entries = state.diary_service.entries_with_food(&user, &food_id).await?;
    Ok(Json(EntryListResponse::from(entries)))
}

/// `GET /diary/{id}` — Get one entry.
///
/// # Errors
///
/// Returns [`DiaryError::EntryNotFound`] if the user has no such entry.
#[utoipa::path(
    get,
    path = "/api/v1/diary/{id}",
    tag = "Diary",
    summary = "Get entry",
    params(
        ("id" = uuid::Uuid, Path, description = "Entry id"),
        ("x-user-id" = String, Header, description = "Authenticated user"),
    ),
    responses(
        (status = 200, description = "The entry", body = EntryDocument),
        (status = 404, description = "Entry not found", body = ErrorResponse),
    )
)]
pub async fn get_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DiaryError> {
    let id = parse_entry_id(&id)?;
    let entry = state.diary_service.get_entry(&user, id).await?;
    Ok(Json(entry))
}

/// `PATCH /diary/{id}` — Partially update an entry.
///
/// # Errors
///
/// Returns [`DiaryError::EntryTypeMismatch`] if the update targets the
/// other payload, or [`DiaryError::Validation`] on invalid fields.
#[utoipa::path(
    patch,
    path = "/api/v1/diary/{id}",
    tag = "Diary",
    summary = "Update entry",
    description = "Replaces the supplied meal or symptom fields. An entry's type never changes.",
    request_body(content = serde_json::Value, description = "`{ meal?: {...}, symptom?: {...} }`, every member optional"),
    params(
        ("id" = uuid::Uuid, Path, description = "Entry id"),
        ("x-user-id" = String, Header, description = "Authenticated user"),
    ),
    responses(
        (status = 200, description = "Updated entry", body = EntryDocument),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse),
        (status = 409, description = "Update targets the other entry type", body = ErrorResponse),
    )
)]
pub async fn update_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, DiaryError> {
    let id = parse_entry_id(&id)?;
    let Json(body) = payload?;
    let update = parse_update_entry(&body)?;
    let entry = state.diary_service.update_entry(&user, id, update).await?;
    Ok(Json(entry))
}

/// `DELETE /diary/{id}` — Delete an entry.
///
/// # Errors
///
/// Returns [`DiaryError::EntryNotFound`] if the user has no such entry.
#[utoipa::path(
    delete,
    path = "/api/v1/diary/{id}",
    tag = "Diary",
    summary = "Delete entry",
    params(
        ("id" = uuid::Uuid, Path, description = "Entry id"),
        ("x-user-id" = String, Header, description = "Authenticated user"),
    ),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Entry not found", body = ErrorResponse),
    )
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DiaryError> {
    let id = parse_entry_id(&id)?;
    state.diary_service.delete_entry(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Diary routes, mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/diary", get(list_entries))
        .route("/diary/meals", post(create_meal))
        .route("/diary/symptoms", post(create_symptom))
        .route("/diary/overview/symptoms", get(symptom_overview))
        .route("/diary/date/{date}", get(day_summary))
        .route("/diary/month/{year}/{month}", get(month_summary))
        .route("/diary/foods/{foodId}", get(entries_with_food))
        .route(
            "/diary/{id}",
            get(get_entry).patch(update_entry).delete(delete_entry),
        )
}
