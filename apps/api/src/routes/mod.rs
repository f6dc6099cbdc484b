pub mod applications;
pub mod companies;
pub mod health;
pub mod questions;
pub mod similarity;
pub mod tips;
pub mod users;

use std::collections::{HashMap, HashSet};

use axum::{
    routing::{get, post},
    Router,
};
use pagination::PageParams;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Company;
use crate::state::AppState;
use crate::store::query::Query;
use crate::store::{Entity, Store};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::handle_health))
        // Users
        .route(
            "/api/users",
            get(users::handle_list_users).post(users::handle_create_user),
        )
        .route("/api/users/alumni", get(users::handle_list_alumni))
        .route(
            "/api/users/:id",
            get(users::handle_get_user)
                .patch(users::handle_update_user)
                .delete(users::handle_delete_user),
        )
        // Companies
        .route(
            "/api/companies",
            get(companies::handle_list_companies).post(companies::handle_create_company),
        )
        .route(
            "/api/companies/:id",
            get(companies::handle_get_company)
                .patch(companies::handle_update_company)
                .delete(companies::handle_delete_company),
        )
        // Applications, applied and saved
        .route(
            "/api/applications/applied",
            get(applications::handle_list_applied).post(applications::handle_create_applied),
        )
        .route(
            "/api/applications/applied/:id",
            get(applications::handle_get_applied)
                .patch(applications::handle_update_applied)
                .delete(applications::handle_delete_applied),
        )
        .route(
            "/api/applications/saved",
            get(applications::handle_list_saved).post(applications::handle_create_saved),
        )
        .route(
            "/api/applications/saved/:id",
            get(applications::handle_get_saved)
                .patch(applications::handle_update_saved)
                .delete(applications::handle_delete_saved),
        )
        // Questions
        .route(
            "/api/questions/interview",
            get(questions::handle_list_interview).post(questions::handle_create_interview),
        )
        .route(
            "/api/questions/interview/:id",
            get(questions::handle_get_interview)
                .patch(questions::handle_update_interview)
                .delete(questions::handle_delete_interview),
        )
        .route(
            "/api/questions/leetcode",
            get(questions::handle_list_leetcode).post(questions::handle_create_leetcode),
        )
        .route(
            "/api/questions/leetcode/:id",
            get(questions::handle_get_leetcode)
                .patch(questions::handle_update_leetcode)
                .delete(questions::handle_delete_leetcode),
        )
        // Tips
        .route(
            "/api/tips",
            get(tips::handle_list_tips).post(tips::handle_create_tip),
        )
        .route(
            "/api/tips/:id",
            get(tips::handle_get_tip)
                .patch(tips::handle_update_tip)
                .delete(tips::handle_delete_tip),
        )
        // Similarity
        .route(
            "/api/similarity/overview",
            post(similarity::handle_similarity_overview),
        )
        .route(
            "/api/similarity/score",
            post(similarity::handle_similarity_score),
        )
        .with_state(state)
}

/// `page`/`perPage` with the list defaults applied.
pub(crate) fn page_params(page: Option<u32>, per_page: Option<u32>) -> PageParams {
    PageParams::new(
        page.unwrap_or(0),
        per_page.unwrap_or(pagination::DEFAULT_PER_PAGE),
    )
}

/// Resolves a batch of company references in one query, for expanding
/// `companyId` fields without one lookup per record.
pub(crate) async fn company_map(
    store: &Store,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, Company>, AppError> {
    let unique: HashSet<Uuid> = ids.into_iter().collect();
    if unique.is_empty() {
        return Ok(HashMap::new());
    }
    let ids: Vec<String> = unique.iter().map(Uuid::to_string).collect();
    let query = Query::new(Company::schema()).filter_in("_id", ids)?;
    let companies: Vec<Company> = store.find(query).await?;
    Ok(companies.into_iter().map(|c| (c.id, c)).collect())
}

/// Looks up one company reference, tolerating dangling ids.
pub(crate) async fn company_ref(
    store: &Store,
    id: Option<Uuid>,
) -> Result<Option<Company>, AppError> {
    Ok(match id {
        Some(id) => store.get(id).await?,
        None => None,
    })
}

/// The no-op update guard: a PATCH that names nothing updatable is a 400.
pub(crate) fn reject_empty_update(any_field: bool) -> Result<(), AppError> {
    if any_field {
        Ok(())
    } else {
        Err(AppError::Validation(vec![crate::validation::FieldError {
            field: "body".to_string(),
            message: "at least one updatable field is required".to_string(),
        }]))
    }
}

/// 404 for a typed entity, with the resource named after its collection
/// (`saved_applications` → "saved application").
pub(crate) fn entity_not_found<E: Entity>() -> AppError {
    let resource = E::COLLECTION
        .trim_end_matches('s')
        .replace('_', " ");
    AppError::NotFound(format!("{resource} not found"))
}
