//! Community question banks: interview questions reported by users and
//! curated leetcode-style practice problems.

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
use crate::models::{Difficulty, InterviewQuestion, InterviewQuestionView, LeetcodeQuestion};
use crate::routes::{company_map, company_ref, entity_not_found, page_params, reject_empty_update};
use crate::state::AppState;
use crate::store::query::Query;
use crate::store::Entity;
use crate::validation::Violations;

// ── Interview questions ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInterview {
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
pub struct CreateInterview {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub question: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInterview {
    pub company_id: Option<Uuid>,
    pub question: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// GET /api/questions/interview
pub async fn handle_list_interview(
    State(state): State<AppState>,
    Params(params): Params<ListInterview>,
) -> Result<Json<Page<InterviewQuestionView>>, AppError> {
    let mut query = Query::new(InterviewQuestion::schema());
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
        .find_page::<InterviewQuestion>(query, page_params(params.page, params.per_page))
        .await?;

    let companies = company_map(&state.store, page.data.iter().filter_map(|q| q.company_id)).await?;
    Ok(Json(page.map(|q| {
        let company = q.company_id.and_then(|id| companies.get(&id).cloned());
        InterviewQuestionView::from_question(q, company)
    })))
}

/// POST /api/questions/interview
pub async fn handle_create_interview(
    State(state): State<AppState>,
    Json(req): Json<CreateInterview>,
) -> Result<(StatusCode, Json<InterviewQuestionView>), AppError> {
    let mut violations = Violations::new();
    violations.non_empty("question", &req.question);
    violations.finish()?;

    ensure_question_free(&state, &req.question, None).await?;

    let now = Utc::now();
    let question = InterviewQuestion {
        id: Uuid::new_v4(),
        user_id: req.user_id,
        company_id: req.company_id,
        question: req.question,
        date: req.date,
        created_at: now,
        updated_at: now,
    };
    state.store.insert(&question).await?;

    let company = company_ref(&state.store, question.company_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(InterviewQuestionView::from_question(question, company)),
    ))
}

/// GET /api/questions/interview/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewQuestionView>, AppError> {
    let question: InterviewQuestion = state
        .store
        .get(id)
        .await?
        .ok_or_else(entity_not_found::<InterviewQuestion>)?;
    let company = company_ref(&state.store, question.company_id).await?;
    Ok(Json(InterviewQuestionView::from_question(question, company)))
}

/// PATCH /api/questions/interview/:id
pub async fn handle_update_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateInterview>,
) -> Result<Json<InterviewQuestionView>, AppError> {
    reject_empty_update(req.company_id.is_some() || req.question.is_some() || req.date.is_some())?;

    let mut question: InterviewQuestion = state
        .store
        .get(id)
        .await?
        .ok_or_else(entity_not_found::<InterviewQuestion>)?;

    if let Some(text) = req.question {
        let mut violations = Violations::new();
        violations.non_empty("question", &text);
        violations.finish()?;
        if text != question.question {
            ensure_question_free(&state, &text, Some(id)).await?;
        }
        question.question = text;
    }
    if let Some(company_id) = req.company_id {
        question.company_id = Some(company_id);
    }
    if let Some(date) = req.date {
        question.date = Some(date);
    }
    question.updated_at = Utc::now();

    if !state.store.replace(&question).await? {
        return Err(entity_not_found::<InterviewQuestion>());
    }
    let company = company_ref(&state.store, question.company_id).await?;
    Ok(Json(InterviewQuestionView::from_question(question, company)))
}

/// DELETE /api/questions/interview/:id
pub async fn handle_delete_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete::<InterviewQuestion>(id).await? {
        return Err(entity_not_found::<InterviewQuestion>());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Question text is globally unique, so the bank never lists the same
/// question twice even when two users report it.
async fn ensure_question_free(
    state: &AppState,
    question: &str,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    let query = Query::new(InterviewQuestion::schema()).filter_eq("question", question)?;
    if let Some(existing) = state.store.find_one::<InterviewQuestion>(query).await? {
        if exclude != Some(existing.id) {
            return Err(AppError::Conflict(
                "question already in the bank".to_string(),
            ));
        }
    }
    Ok(())
}

// ── Leetcode questions ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLeetcode {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub user_id: Option<Uuid>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeetcode {
    pub user_id: Uuid,
    pub title: String,
    pub link: Option<String>,
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeetcode {
    pub title: Option<String>,
    pub link: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub topics: Option<Vec<String>>,
}

/// GET /api/questions/leetcode
pub async fn handle_list_leetcode(
    State(state): State<AppState>,
    Params(params): Params<ListLeetcode>,
) -> Result<Json<Page<LeetcodeQuestion>>, AppError> {
    let mut query = Query::new(LeetcodeQuestion::schema());
    if let Some(user_id) = params.user_id {
        query = query.filter_eq("userId", user_id.to_string())?;
    }
    if let Some(difficulty) = params.difficulty {
        query = query.filter_eq("difficulty", difficulty.as_str())?;
    }
    if let Some(needle) = &params.query {
        query = query.search(needle);
    }
    if let Some(key) = &params.sort_by {
        query = query.sort_by(key)?;
    }

    let page = state
        .store
        .find_page::<LeetcodeQuestion>(query, page_params(params.page, params.per_page))
        .await?;
    Ok(Json(page))
}

/// POST /api/questions/leetcode
pub async fn handle_create_leetcode(
    State(state): State<AppState>,
    Json(req): Json<CreateLeetcode>,
) -> Result<(StatusCode, Json<LeetcodeQuestion>), AppError> {
    let mut violations = Violations::new();
    violations.non_empty("title", &req.title);
    violations.url("link", req.link.as_deref());
    violations.finish()?;

    ensure_title_free(&state, &req.title, None).await?;

    let now = Utc::now();
    let question = LeetcodeQuestion {
        id: Uuid::new_v4(),
        user_id: req.user_id,
        title: req.title,
        link: req.link,
        difficulty: req.difficulty,
        topics: req.topics,
        created_at: now,
        updated_at: now,
    };
    state.store.insert(&question).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// GET /api/questions/leetcode/:id
pub async fn handle_get_leetcode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeetcodeQuestion>, AppError> {
    let question: LeetcodeQuestion = state
        .store
        .get(id)
        .await?
        .ok_or_else(entity_not_found::<LeetcodeQuestion>)?;
    Ok(Json(question))
}

/// PATCH /api/questions/leetcode/:id
pub async fn handle_update_leetcode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLeetcode>,
) -> Result<Json<LeetcodeQuestion>, AppError> {
    reject_empty_update(
        req.title.is_some()
            || req.link.is_some()
            || req.difficulty.is_some()
            || req.topics.is_some(),
    )?;

    let mut violations = Violations::new();
    if let Some(title) = &req.title {
        violations.non_empty("title", title);
    }
    violations.url("link", req.link.as_deref());
    violations.finish()?;

    let mut question: LeetcodeQuestion = state
        .store
        .get(id)
        .await?
        .ok_or_else(entity_not_found::<LeetcodeQuestion>)?;

    if let Some(title) = req.title {
        if title != question.title {
            ensure_title_free(&state, &title, Some(id)).await?;
        }
        question.title = title;
    }
    if let Some(link) = req.link {
        question.link = Some(link);
    }
    if let Some(difficulty) = req.difficulty {
        question.difficulty = Some(difficulty);
    }
    if let Some(topics) = req.topics {
        question.topics = topics;
    }
    question.updated_at = Utc::now();

    if !state.store.replace(&question).await? {
        return Err(entity_not_found::<LeetcodeQuestion>());
    }
    Ok(Json(question))
}

/// DELETE /api/questions/leetcode/:id
pub async fn handle_delete_leetcode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete::<LeetcodeQuestion>(id).await? {
        return Err(entity_not_found::<LeetcodeQuestion>());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Problem titles are globally unique in the practice bank.
async fn ensure_title_free(
    state: &AppState,
    title: &str,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    let query = Query::new(LeetcodeQuestion::schema()).filter_eq("title", title)?;
    if let Some(existing) = state.store.find_one::<LeetcodeQuestion>(query).await? {
        if exclude != Some(existing.id) {
            return Err(AppError::Conflict("problem already in the bank".to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_support::{send, test_router};
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use uuid::Uuid;

    async fn create_company(router: &axum::Router, name: &str) -> String {
        let (status, body) = send(
            router,
            "POST",
            "/api/companies",
            Some(json!({"name": name, "industry": "Tech"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["_id"].as_str().unwrap().to_string()
    }

    fn interview_body(question: &str, company_id: Option<&str>) -> Value {
        json!({
            "userId": Uuid::new_v4(),
            "companyId": company_id,
            "question": question,
            "date": "2025-05-20T00:00:00Z"
        })
    }

    fn leetcode_body(title: &str, difficulty: &str) -> Value {
        json!({
            "userId": Uuid::new_v4(),
            "title": title,
            "link": "https://leetcode.com/problems/two-sum",
            "difficulty": difficulty,
            "topics": ["arrays", "hashing"]
        })
    }

    #[tokio::test]
    async fn test_create_interview_expands_company() {
        let (router, _state) = test_router();
        let company_id = create_company(&router, "Acme").await;

        let (status, body) = send(
            &router,
            "POST",
            "/api/questions/interview",
            Some(interview_body("Design a rate limiter", Some(&company_id))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["company"]["name"], "Acme");
        assert_eq!(body["question"], "Design a rate limiter");
    }

    #[tokio::test]
    async fn test_interview_question_unique_across_users() {
        let (router, _state) = test_router();
        let (status, _) = send(
            &router,
            "POST",
            "/api/questions/interview",
            Some(interview_body("Design a rate limiter", None)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        // Different user, same text: still a duplicate for the shared bank.
        let (status, body) = send(
            &router,
            "POST",
            "/api/questions/interview",
            Some(interview_body("Design a rate limiter", None)),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["message"], "question already in the bank");
    }

    #[tokio::test]
    async fn test_interview_list_filters_by_company() {
        let (router, _state) = test_router();
        let acme = create_company(&router, "Acme").await;
        let beta = create_company(&router, "Beta").await;

        for (text, company) in [
            ("Reverse a linked list", Some(acme.as_str())),
            ("Design a URL shortener", Some(beta.as_str())),
            ("Tell me about yourself", None),
        ] {
            let (status, _) = send(
                &router,
                "POST",
                "/api/questions/interview",
                Some(interview_body(text, company)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, body) = send(
            &router,
            "GET",
            &format!("/api/questions/interview?company={acme}"),
            None,
        )
        .await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["question"], "Reverse a linked list");
    }

    #[tokio::test]
    async fn test_interview_patch_question_text_conflicts() {
        let (router, _state) = test_router();
        send(
            &router,
            "POST",
            "/api/questions/interview",
            Some(interview_body("Question A", None)),
        )
        .await;
        let (_, created) = send(
            &router,
            "POST",
            "/api/questions/interview",
            Some(interview_body("Question B", None)),
        )
        .await;
        let id = created["_id"].as_str().unwrap();

        let (status, _) = send(
            &router,
            "PATCH",
            &format!("/api/questions/interview/{id}"),
            Some(json!({"question": "Question A"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_create_leetcode_and_duplicate_title() {
        let (router, _state) = test_router();
        let (status, body) = send(
            &router,
            "POST",
            "/api/questions/leetcode",
            Some(leetcode_body("Two Sum", "easy")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["difficulty"], "easy");
        assert_eq!(body["topics"].as_array().unwrap().len(), 2);

        let (status, _) = send(
            &router,
            "POST",
            "/api/questions/leetcode",
            Some(leetcode_body("Two Sum", "medium")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_leetcode_list_filters_by_difficulty() {
        let (router, _state) = test_router();
        for (title, difficulty) in [
            ("Two Sum", "easy"),
            ("LRU Cache", "medium"),
            ("Median of Two Sorted Arrays", "hard"),
        ] {
            send(
                &router,
                "POST",
                "/api/questions/leetcode",
                Some(leetcode_body(title, difficulty)),
            )
            .await;
        }

        let (status, body) = send(
            &router,
            "GET",
            "/api/questions/leetcode?difficulty=medium",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["title"], "LRU Cache");
    }

    #[tokio::test]
    async fn test_leetcode_search_hits_topics() {
        let (router, _state) = test_router();
        send(
            &router,
            "POST",
            "/api/questions/leetcode",
            Some(leetcode_body("Two Sum", "easy")),
        )
        .await;
        let mut graph = leetcode_body("Course Schedule", "medium");
        graph["topics"] = json!(["graphs", "topological sort"]);
        send(&router, "POST", "/api/questions/leetcode", Some(graph)).await;

        let (_, body) = send(&router, "GET", "/api/questions/leetcode?query=graph", None).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["title"], "Course Schedule");
    }

    #[tokio::test]
    async fn test_leetcode_bad_link_is_400() {
        let (router, _state) = test_router();
        let mut body = leetcode_body("Two Sum", "easy");
        body["link"] = json!("leetcode.com/problems/two-sum");

        let (status, resp) = send(&router, "POST", "/api/questions/leetcode", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"]["fields"][0]["field"], "link");
    }

    #[tokio::test]
    async fn test_leetcode_patch_and_delete() {
        let (router, _state) = test_router();
        let (_, created) = send(
            &router,
            "POST",
            "/api/questions/leetcode",
            Some(leetcode_body("Two Sum", "easy")),
        )
        .await;
        let id = created["_id"].as_str().unwrap();

        let (status, body) = send(
            &router,
            "PATCH",
            &format!("/api/questions/leetcode/{id}"),
            Some(json!({"difficulty": "medium"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["difficulty"], "medium");
        assert_eq!(body["title"], "Two Sum");

        let (status, _) = send(
            &router,
            "DELETE",
            &format!("/api/questions/leetcode/{id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            &router,
            "GET",
            &format!("/api/questions/leetcode/{id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "leetcode question not found");
    }
}
