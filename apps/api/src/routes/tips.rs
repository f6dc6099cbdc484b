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
use crate::models::{Tip, TipView};
use crate::routes::{company_map, company_ref, page_params, reject_empty_update};
use crate::state::AppState;
use crate::store::query::Query;
use crate::store::Entity;
use crate::validation::Violations;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTips {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub user_id: Option<Uuid>,
    /// Company id filter.
    pub company: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTip {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub text: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTip {
    pub company_id: Option<Uuid>,
    pub text: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// GET /api/tips
pub async fn handle_list_tips(
    State(state): State<AppState>,
    Params(params): Params<ListTips>,
) -> Result<Json<Page<TipView>>, AppError> {
    let mut query = Query::new(Tip::schema());
    if let Some(user_id) = params.user_id {
        query = query.filter_eq("userId", user_id.to_string())?;
    }
    if let Some(company) = params.company {
        query = query.filter_eq("companyId", company.to_string())?;
    }
    if let Some(needle) = &params.query {
        query = query.search(needle);
    }
    if let Some(key) = &params.sort_by {
        query = query.sort_by(key)?;
    }

    let page = state
        .store
        .find_page::<Tip>(query, page_params(params.page, params.per_page))
        .await?;

    let companies = company_map(&state.store, page.data.iter().filter_map(|t| t.company_id)).await?;
    Ok(Json(page.map(|tip| {
        let company = tip.company_id.and_then(|id| companies.get(&id).cloned());
        TipView::from_tip(tip, company)
    })))
}

/// POST /api/tips
pub async fn handle_create_tip(
    State(state): State<AppState>,
    Json(req): Json<CreateTip>,
) -> Result<(StatusCode, Json<TipView>), AppError> {
    let mut violations = Violations::new();
    violations.non_empty("text", &req.text);
    violations.finish()?;

    let now = Utc::now();
    let tip = Tip {
        id: Uuid::new_v4(),
        user_id: req.user_id,
        company_id: req.company_id,
        text: req.text,
        date: req.date,
        created_at: now,
        updated_at: now,
    };
    state.store.insert(&tip).await?;

    let company = company_ref(&state.store, tip.company_id).await?;
    Ok((StatusCode::CREATED, Json(TipView::from_tip(tip, company))))
}

/// GET /api/tips/:id
pub async fn handle_get_tip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TipView>, AppError> {
    let tip: Tip = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("tip"))?;
    let company = company_ref(&state.store, tip.company_id).await?;
    Ok(Json(TipView::from_tip(tip, company)))
}

/// PATCH /api/tips/:id
pub async fn handle_update_tip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTip>,
) -> Result<Json<TipView>, AppError> {
    reject_empty_update(req.company_id.is_some() || req.text.is_some() || req.date.is_some())?;

    let mut tip: Tip = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("tip"))?;

    if let Some(text) = req.text {
        let mut violations = Violations::new();
        violations.non_empty("text", &text);
        violations.finish()?;
        tip.text = text;
    }
    if let Some(company_id) = req.company_id {
        tip.company_id = Some(company_id);
    }
    if let Some(date) = req.date {
        tip.date = Some(date);
    }
    tip.updated_at = Utc::now();

    if !state.store.replace(&tip).await? {
        return Err(AppError::not_found("tip"));
    }
    let company = company_ref(&state.store, tip.company_id).await?;
    Ok(Json(TipView::from_tip(tip, company)))
}

/// DELETE /api/tips/:id
pub async fn handle_delete_tip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete::<Tip>(id).await? {
        return Err(AppError::not_found("tip"));
    }
    Ok(StatusCode::NO_CONTENT)
}
