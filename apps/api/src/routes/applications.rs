//! Applied and saved job applications. Both resources share one record
//! shape and one handler core, parameterized by the entity type, so the two
//! lists stay behaviorally identical while living in separate collections.

use axum::{
    extract::{Path, Query as Params, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use pagination::Page;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Application, ApplicationView, SavedApplication};
use crate::routes::{company_map, company_ref, entity_not_found, page_params, reject_empty_update};
use crate::state::AppState;
use crate::store::query::Query;
use crate::store::Entity;
use crate::validation::Violations;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApplications {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub user_id: Option<Uuid>,
    /// Company id filter.
    pub company: Option<Uuid>,
    /// Case-insensitive position substring.
    pub position: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplication {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub position: String,
    pub job_link: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplication {
    pub company_id: Option<Uuid>,
    pub position: Option<String>,
    pub job_link: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

// ── Applied ──────────────────────────────────────────────────────────────────

/// GET /api/applications/applied
pub async fn handle_list_applied(
    state: State<AppState>,
    params: Params<ListApplications>,
) -> Result<Json<Page<ApplicationView>>, AppError> {
    list::<Application>(state, params).await
}

/// POST /api/applications/applied
pub async fn handle_create_applied(
    state: State<AppState>,
    req: Json<CreateApplication>,
) -> Result<(StatusCode, Json<ApplicationView>), AppError> {
    create::<Application>(state, req).await
}

/// GET /api/applications/applied/:id
pub async fn handle_get_applied(
    state: State<AppState>,
    id: Path<Uuid>,
) -> Result<Json<ApplicationView>, AppError> {
    get::<Application>(state, id).await
}

/// PATCH /api/applications/applied/:id
pub async fn handle_update_applied(
    state: State<AppState>,
    id: Path<Uuid>,
    req: Json<UpdateApplication>,
) -> Result<Json<ApplicationView>, AppError> {
    update::<Application>(state, id, req).await
}

/// DELETE /api/applications/applied/:id
pub async fn handle_delete_applied(
    state: State<AppState>,
    id: Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete::<Application>(state, id).await
}

// ── Saved ────────────────────────────────────────────────────────────────────

/// GET /api/applications/saved
pub async fn handle_list_saved(
    state: State<AppState>,
    params: Params<ListApplications>,
) -> Result<Json<Page<ApplicationView>>, AppError> {
    list::<SavedApplication>(state, params).await
}

/// POST /api/applications/saved
pub async fn handle_create_saved(
    state: State<AppState>,
    req: Json<CreateApplication>,
) -> Result<(StatusCode, Json<ApplicationView>), AppError> {
    create::<SavedApplication>(state, req).await
}

/// GET /api/applications/saved/:id
pub async fn handle_get_saved(
    state: State<AppState>,
    id: Path<Uuid>,
) -> Result<Json<ApplicationView>, AppError> {
    get::<SavedApplication>(state, id).await
}

/// PATCH /api/applications/saved/:id
pub async fn handle_update_saved(
    state: State<AppState>,
    id: Path<Uuid>,
    req: Json<UpdateApplication>,
) -> Result<Json<ApplicationView>, AppError> {
    update::<SavedApplication>(state, id, req).await
}

/// DELETE /api/applications/saved/:id
pub async fn handle_delete_saved(
    state: State<AppState>,
    id: Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete::<SavedApplication>(state, id).await
}

// ── Shared core ──────────────────────────────────────────────────────────────

async fn list<E>(
    State(state): State<AppState>,
    Params(params): Params<ListApplications>,
) -> Result<Json<Page<ApplicationView>>, AppError>
where
    E: Entity + Into<Application>,
{
    let mut query = Query::new(E::schema());
    if let Some(user_id) = params.user_id {
        query = query.filter_eq("userId", user_id.to_string())?;
    }
    if let Some(company) = params.company {
        query = query.filter_eq("companyId", company.to_string())?;
    }
    if let Some(position) = &params.position {
        query = query.filter_contains("position", position)?;
    }
    if let Some(needle) = &params.query {
        query = query.search(needle);
    }
    if let Some(key) = &params.sort_by {
        query = query.sort_by(key)?;
    }

    let page = state
        .store
        .find_page::<E>(query, page_params(params.page, params.per_page))
        .await?;
    let page = page.map(Into::into);
    into_views(&state, page).await.map(Json)
}

async fn create<E>(
    State(state): State<AppState>,
    Json(req): Json<CreateApplication>,
) -> Result<(StatusCode, Json<ApplicationView>), AppError>
where
    E: Entity + From<Application>,
{
    let mut violations = Violations::new();
    violations.non_empty("position", &req.position);
    violations.url("jobLink", req.job_link.as_deref());
    violations.finish()?;

    ensure_unique::<E>(&state, req.user_id, req.company_id, &req.position, None).await?;

    let now = Utc::now();
    let application = Application {
        id: Uuid::new_v4(),
        user_id: req.user_id,
        company_id: req.company_id,
        position: req.position,
        job_link: req.job_link,
        deadline: req.deadline,
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };
    state.store.insert(&E::from(application.clone())).await?;

    let view = view_one(&state, application).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get<E>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationView>, AppError>
where
    E: Entity + Into<Application>,
{
    let record: E = state
        .store
        .get(id)
        .await?
        .ok_or_else(entity_not_found::<E>)?;
    view_one(&state, record.into()).await.map(Json)
}

async fn update<E>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateApplication>,
) -> Result<Json<ApplicationView>, AppError>
where
    E: Entity + From<Application> + Into<Application>,
{
    reject_empty_update(
        req.company_id.is_some()
            || req.position.is_some()
            || req.job_link.is_some()
            || req.deadline.is_some()
            || req.notes.is_some(),
    )?;

    let mut violations = Violations::new();
    if let Some(position) = &req.position {
        violations.non_empty("position", position);
    }
    violations.url("jobLink", req.job_link.as_deref());
    violations.finish()?;

    let record: E = state
        .store
        .get(id)
        .await?
        .ok_or_else(entity_not_found::<E>)?;
    let mut application: Application = record.into();

    let company_id = req.company_id.unwrap_or(application.company_id);
    let position = req.position.unwrap_or_else(|| application.position.clone());
    if company_id != application.company_id || position != application.position {
        ensure_unique::<E>(&state, application.user_id, company_id, &position, Some(id)).await?;
    }

    application.company_id = company_id;
    application.position = position;
    if let Some(job_link) = req.job_link {
        application.job_link = Some(job_link);
    }
    if let Some(deadline) = req.deadline {
        application.deadline = Some(deadline);
    }
    if let Some(notes) = req.notes {
        application.notes = Some(notes);
    }
    application.updated_at = Utc::now();

    if !state.store.replace(&E::from(application.clone())).await? {
        return Err(entity_not_found::<E>());
    }
    view_one(&state, application).await.map(Json)
}

async fn delete<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete::<E>(id).await? {
        return Err(entity_not_found::<E>());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// One tracked record per (user, company, position) within each list.
async fn ensure_unique<E: Entity>(
    state: &AppState,
    user_id: Uuid,
    company_id: Uuid,
    position: &str,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    let query = Query::new(E::schema())
        .filter_eq("userId", user_id.to_string())?
        .filter_eq("companyId", company_id.to_string())?
        .filter_eq("position", position)?;
    if let Some(existing) = state.store.find_one::<E>(query).await? {
        if exclude != Some(existing.id()) {
            let message = if E::COLLECTION == SavedApplication::COLLECTION {
                "posting already saved for this position"
            } else {
                "application already tracked for this position"
            };
            return Err(AppError::Conflict(message.to_string()));
        }
    }
    Ok(())
}

async fn view_one(state: &AppState, application: Application) -> Result<ApplicationView, AppError> {
    let company = company_ref(&state.store, Some(application.company_id)).await?;
    Ok(ApplicationView::from_application(application, company))
}

async fn into_views(
    state: &AppState,
    page: Page<Application>,
) -> Result<Page<ApplicationView>, AppError> {
    let companies = company_map(&state.store, page.data.iter().map(|a| a.company_id)).await?;
    Ok(page.map(|app| {
        let company = companies.get(&app.company_id).cloned();
        ApplicationView::from_application(app, company)
    }))
}
