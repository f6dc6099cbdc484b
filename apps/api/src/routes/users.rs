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
use crate::models::{AlumniProfile, Company, RoleProfile, StudentProfile, User, UserView};
use crate::routes::companies::csv_values;
use crate::routes::{company_map, page_params, reject_empty_update};
use crate::state::AppState;
use crate::store::query::Query;
use crate::store::Entity;
use crate::validation::Violations;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsers {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAlumni {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    /// Comma-separated industries, matched against the referenced company.
    pub industry: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub avatar_key: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(flatten)]
    pub profile: RoleProfile,
}

/// Flat PATCH payload. Sending `role` replaces the whole role profile from
/// the fields in this request; without `role`, role-specific fields must
/// match the user's current role.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_key: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
    pub role: Option<String>,
    pub school: Option<String>,
    pub major: Option<String>,
    pub grad_year: Option<i32>,
    pub company_id: Option<Uuid>,
    pub position: Option<String>,
    pub share_profile: Option<bool>,
}

impl UpdateUser {
    fn has_student_fields(&self) -> bool {
        self.school.is_some() || self.major.is_some() || self.grad_year.is_some()
    }

    fn has_alumni_fields(&self) -> bool {
        self.company_id.is_some() || self.position.is_some() || self.share_profile.is_some()
    }

    fn has_any_field(&self) -> bool {
        self.name.is_some()
            || self.email.is_some()
            || self.avatar_key.is_some()
            || self.location.is_some()
            || self.bio.is_some()
            || self.skills.is_some()
            || self.interests.is_some()
            || self.role.is_some()
            || self.has_student_fields()
            || self.has_alumni_fields()
    }
}

/// GET /api/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    Params(params): Params<ListUsers>,
) -> Result<Json<Page<UserView>>, AppError> {
    let mut query = Query::new(User::schema());
    if let Some(role) = &params.role {
        query = query.filter_eq("role", role.as_str())?;
    }
    if let Some(needle) = &params.query {
        query = query.search(needle);
    }
    if let Some(key) = &params.sort_by {
        query = query.sort_by(key)?;
    }

    let page = state
        .store
        .find_page::<User>(query, page_params(params.page, params.per_page))
        .await?;
    Ok(Json(into_views(&state, page).await?))
}

/// GET /api/users/alumni
///
/// The shared alumni directory: alumni who opted in via `shareProfile`.
/// The `industry` filter resolves matching companies first, then narrows
/// the alumni to those referencing them.
pub async fn handle_list_alumni(
    State(state): State<AppState>,
    Params(params): Params<ListAlumni>,
) -> Result<Json<Page<UserView>>, AppError> {
    let page_params = page_params(params.page, params.per_page);
    let mut query = Query::new(User::schema())
        .filter_eq("role", "alumni")?
        .filter_eq("shareProfile", true)?;

    if let Some(industry) = &params.industry {
        let companies_query =
            Query::new(Company::schema()).filter_in("industry", csv_values(industry))?;
        let companies: Vec<Company> = state.store.find(companies_query).await?;
        if companies.is_empty() {
            return Ok(Json(Page::empty(page_params)));
        }
        let ids: Vec<String> = companies.iter().map(|c| c.id.to_string()).collect();
        query = query.filter_in("companyId", ids)?;
    }
    if let Some(needle) = &params.query {
        query = query.search(needle);
    }
    if let Some(key) = &params.sort_by {
        query = query.sort_by(key)?;
    }

    let page = state.store.find_page::<User>(query, page_params).await?;
    Ok(Json(into_views(&state, page).await?))
}

/// POST /api/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    let mut violations = Violations::new();
    violations.non_empty("name", &req.name);
    violations.email("email", &req.email);
    if let RoleProfile::Student(student) = &req.profile {
        violations.non_empty("school", &student.school);
        violations.non_empty("major", &student.major);
    }
    violations.finish()?;

    ensure_email_free(&state, &req.email, None).await?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: req.name,
        email: req.email,
        avatar_key: req.avatar_key,
        location: req.location,
        bio: req.bio,
        skills: req.skills,
        interests: req.interests,
        profile: req.profile,
        created_at: now,
        updated_at: now,
    };
    state.store.insert(&user).await?;

    let view = view_one(&state, user).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, AppError> {
    let user = state
        .store
        .get::<User>(id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;
    Ok(Json(view_one(&state, user).await?))
}

/// PATCH /api/users/:id
pub async fn handle_update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUser>,
) -> Result<Json<UserView>, AppError> {
    reject_empty_update(req.has_any_field())?;

    let mut user = state
        .store
        .get::<User>(id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    let mut violations = Violations::new();
    if let Some(name) = &req.name {
        violations.non_empty("name", name);
    }
    if let Some(email) = &req.email {
        violations.email("email", email);
    }

    // With `role` the whole profile is rebuilt from this request; without it,
    // role-specific fields must belong to the user's current role.
    let new_profile = match req.role.as_deref() {
        None => {
            match &user.profile {
                RoleProfile::Student(_) if req.has_alumni_fields() => {
                    violations.push("role", "alumni fields require an alumni profile");
                }
                RoleProfile::Alumni(_) if req.has_student_fields() => {
                    violations.push("role", "student fields require a student profile");
                }
                _ => {}
            }
            None
        }
        Some("student") => {
            let school = req.school.clone().unwrap_or_default();
            let major = req.major.clone().unwrap_or_default();
            violations.non_empty("school", &school);
            violations.non_empty("major", &major);
            Some(RoleProfile::Student(StudentProfile {
                school,
                major,
                grad_year: req.grad_year,
            }))
        }
        Some("alumni") => Some(RoleProfile::Alumni(AlumniProfile {
            company_id: req.company_id,
            position: req.position.clone(),
            share_profile: req.share_profile.unwrap_or(false),
        })),
        Some(_) => {
            violations.push("role", "role must be 'student' or 'alumni'");
            None
        }
    };
    violations.finish()?;

    if let Some(email) = &req.email {
        if *email != user.email {
            ensure_email_free(&state, email, Some(user.id)).await?;
        }
    }

    if let Some(name) = req.name {
        user.name = name;
    }
    if let Some(email) = req.email {
        user.email = email;
    }
    if let Some(avatar_key) = req.avatar_key {
        user.avatar_key = Some(avatar_key);
    }
    if let Some(location) = req.location {
        user.location = Some(location);
    }
    if let Some(bio) = req.bio {
        user.bio = Some(bio);
    }
    if let Some(skills) = req.skills {
        user.skills = skills;
    }
    if let Some(interests) = req.interests {
        user.interests = interests;
    }
    match new_profile {
        Some(profile) => user.profile = profile,
        None => match &mut user.profile {
            RoleProfile::Student(p) => {
                if let Some(school) = req.school {
                    p.school = school;
                }
                if let Some(major) = req.major {
                    p.major = major;
                }
                if let Some(grad_year) = req.grad_year {
                    p.grad_year = Some(grad_year);
                }
            }
            RoleProfile::Alumni(p) => {
                if let Some(company_id) = req.company_id {
                    p.company_id = Some(company_id);
                }
                if let Some(position) = req.position {
                    p.position = Some(position);
                }
                if let Some(share_profile) = req.share_profile {
                    p.share_profile = share_profile;
                }
            }
        },
    }
    user.updated_at = Utc::now();

    if !state.store.replace(&user).await? {
        return Err(AppError::not_found("user"));
    }
    Ok(Json(view_one(&state, user).await?))
}

/// DELETE /api/users/:id
pub async fn handle_delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete::<User>(id).await? {
        return Err(AppError::not_found("user"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Emails are unique. `exclude` skips the record being updated.
async fn ensure_email_free(
    state: &AppState,
    email: &str,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    let query = Query::new(User::schema()).filter_eq("email", email)?;
    if let Some(existing) = state.store.find_one::<User>(query).await? {
        if exclude != Some(existing.id) {
            return Err(AppError::Conflict("email already in use".to_string()));
        }
    }
    Ok(())
}

async fn view_one(state: &AppState, user: User) -> Result<UserView, AppError> {
    let company = match user.as_alumni().and_then(|p| p.company_id) {
        Some(id) => state.store.get::<Company>(id).await?,
        None => None,
    };
    Ok(UserView::from_user(user, company))
}

/// Expands company references for a whole page with one companies query.
async fn into_views(state: &AppState, page: Page<User>) -> Result<Page<UserView>, AppError> {
    let company_ids = page
        .data
        .iter()
        .filter_map(|u| u.as_alumni().and_then(|p| p.company_id));
    let companies = company_map(&state.store, company_ids).await?;
    Ok(page.map(|user| {
        let company = user
            .as_alumni()
            .and_then(|p| p.company_id)
            .and_then(|id| companies.get(&id).cloned());
        UserView::from_user(user, company)
    }))
}
