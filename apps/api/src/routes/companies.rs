use axum::{
    extract::{Path, Query as Params, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use pagination::Page;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Company;
use crate::routes::{page_params, reject_empty_update};
use crate::state::AppState;
use crate::store::query::Query;
use crate::store::Entity;
use crate::validation::Violations;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCompanies {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    /// Comma-separated industries.
    pub industry: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompany {
    pub name: String,
    pub industry: String,
    pub logo_key: Option<String>,
    pub location: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub logo_key: Option<String>,
    pub location: Option<String>,
    pub size: Option<String>,
}

/// Splits a comma-separated filter value, dropping blank segments.
pub(crate) fn csv_values(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// GET /api/companies
pub async fn handle_list_companies(
    State(state): State<AppState>,
    Params(params): Params<ListCompanies>,
) -> Result<Json<Page<Company>>, AppError> {
    let mut query = Query::new(Company::schema());
    if let Some(industry) = &params.industry {
        query = query.filter_in("industry", csv_values(industry))?;
    }
    if let Some(needle) = &params.query {
        query = query.search(needle);
    }
    if let Some(key) = &params.sort_by {
        query = query.sort_by(key)?;
    }

    let page = state
        .store
        .find_page::<Company>(query, page_params(params.page, params.per_page))
        .await?;
    Ok(Json(page))
}

/// POST /api/companies
pub async fn handle_create_company(
    State(state): State<AppState>,
    Json(req): Json<CreateCompany>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    let mut violations = Violations::new();
    violations.non_empty("name", &req.name);
    violations.non_empty("industry", &req.industry);
    violations.finish()?;

    ensure_name_free(&state, &req.name, None).await?;

    let now = Utc::now();
    let company = Company {
        id: Uuid::new_v4(),
        name: req.name,
        industry: req.industry,
        logo_key: req.logo_key,
        location: req.location,
        size: req.size,
        created_at: now,
        updated_at: now,
    };
    state.store.insert(&company).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /api/companies/:id
pub async fn handle_get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Company>, AppError> {
    let company = state
        .store
        .get::<Company>(id)
        .await?
        .ok_or_else(|| AppError::not_found("company"))?;
    Ok(Json(company))
}

/// PATCH /api/companies/:id
pub async fn handle_update_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCompany>,
) -> Result<Json<Company>, AppError> {
    reject_empty_update(
        req.name.is_some()
            || req.industry.is_some()
            || req.logo_key.is_some()
            || req.location.is_some()
            || req.size.is_some(),
    )?;

    let mut company = state
        .store
        .get::<Company>(id)
        .await?
        .ok_or_else(|| AppError::not_found("company"))?;

    if let Some(name) = req.name {
        if name != company.name {
            ensure_name_free(&state, &name, Some(id)).await?;
        }
        company.name = name;
    }
    if let Some(industry) = req.industry {
        company.industry = industry;
    }
    if let Some(logo_key) = req.logo_key {
        company.logo_key = Some(logo_key);
    }
    if let Some(location) = req.location {
        company.location = Some(location);
    }
    if let Some(size) = req.size {
        company.size = Some(size);
    }
    company.updated_at = Utc::now();

    if !state.store.replace(&company).await? {
        return Err(AppError::not_found("company"));
    }
    Ok(Json(company))
}

/// DELETE /api/companies/:id
pub async fn handle_delete_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete::<Company>(id).await? {
        return Err(AppError::not_found("company"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Company names are unique. `exclude` skips the record being updated.
async fn ensure_name_free(
    state: &AppState,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    let query = Query::new(Company::schema()).filter_eq("name", name)?;
    if let Some(existing) = state.store.find_one::<Company>(query).await? {
        if exclude != Some(existing.id) {
            return Err(AppError::Conflict("company name already in use".to_string()));
        }
    }
    Ok(())
}
