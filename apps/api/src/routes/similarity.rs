use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::similarity::{self, SimilarityOverview, SimilarityRequest, SimilarityScore};
use crate::state::AppState;

/// POST /api/similarity/overview
pub async fn handle_similarity_overview(
    State(state): State<AppState>,
    Json(req): Json<SimilarityRequest>,
) -> Result<Json<SimilarityOverview>, AppError> {
    let overview = similarity::overview(&state, &req).await?;
    Ok(Json(overview))
}

/// POST /api/similarity/score
pub async fn handle_similarity_score(
    State(state): State<AppState>,
    Json(req): Json<SimilarityRequest>,
) -> Result<Json<SimilarityScore>, AppError> {
    let score = similarity::score(&state, &req).await?;
    Ok(Json(score))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{send, test_router};
    use axum::http::StatusCode;
    use serde_json::json;
    use uuid::Uuid;

    async fn create_user(router: &axum::Router, body: serde_json::Value) -> String {
        let (status, body) = send(router, "POST", "/api/users", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        body["_id"].as_str().unwrap().to_string()
    }

    // The profile lookup runs before any model call, so the failure paths
    // are exercised without network access.

    #[tokio::test]
    async fn test_overview_unknown_student_is_404() {
        let (router, _state) = test_router();
        let alumni = create_user(
            &router,
            json!({
                "name": "Sam",
                "email": "sam@corp.com",
                "role": "alumni",
                "position": "Engineer"
            }),
        )
        .await;

        let (status, body) = send(
            &router,
            "POST",
            "/api/similarity/overview",
            Some(json!({"studentId": Uuid::new_v4(), "alumniId": alumni})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "student not found");
    }

    #[tokio::test]
    async fn test_score_swapped_roles_is_400_naming_both_fields() {
        let (router, _state) = test_router();
        let student = create_user(
            &router,
            json!({
                "name": "Dana",
                "email": "dana@school.edu",
                "role": "student",
                "school": "State University",
                "major": "CS"
            }),
        )
        .await;
        let alumni = create_user(
            &router,
            json!({
                "name": "Sam",
                "email": "sam@corp.com",
                "role": "alumni",
                "position": "Engineer"
            }),
        )
        .await;

        let (status, body) = send(
            &router,
            "POST",
            "/api/similarity/score",
            Some(json!({"studentId": alumni, "alumniId": student})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = body["error"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["studentId", "alumniId"]);
    }
}
