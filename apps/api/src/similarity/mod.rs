//! LLM-backed comparison of a student profile with an alumni profile,
//! either as a qualitative overview or as per-dimension scores.

pub mod prompts;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Company, User};
use crate::similarity::prompts::{
    OVERVIEW_PROMPT_TEMPLATE, SCORE_PROMPT_TEMPLATE, SIMILARITY_SYSTEM,
};
use crate::state::AppState;
use crate::store::Store;
use crate::validation::Violations;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityRequest {
    pub student_id: Uuid,
    pub alumni_id: Uuid,
}

/// Qualitative comparison: concrete common ground plus a short paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityOverview {
    pub similarities: Vec<String>,
    pub summary: String,
}

/// 0–100 per dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScores {
    pub education: u8,
    pub skills: u8,
    pub interests: u8,
    pub industry: u8,
    pub location: u8,
    pub career_path: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityScore {
    pub scores: DimensionScores,
    pub overall: u8,
}

/// Generates the qualitative overview for a student/alumni pair.
pub async fn overview(
    state: &AppState,
    request: &SimilarityRequest,
) -> Result<SimilarityOverview, AppError> {
    let (student_json, alumni_json) = profile_pair(&state.store, request).await?;
    let prompt = OVERVIEW_PROMPT_TEMPLATE
        .replace("{student_json}", &student_json)
        .replace("{alumni_json}", &alumni_json);
    Ok(state
        .llm
        .call_json::<SimilarityOverview>(&prompt, SIMILARITY_SYSTEM)
        .await?)
}

/// Generates per-dimension scores for a student/alumni pair.
pub async fn score(
    state: &AppState,
    request: &SimilarityRequest,
) -> Result<SimilarityScore, AppError> {
    let (student_json, alumni_json) = profile_pair(&state.store, request).await?;
    let prompt = SCORE_PROMPT_TEMPLATE
        .replace("{student_json}", &student_json)
        .replace("{alumni_json}", &alumni_json);
    Ok(state
        .llm
        .call_json::<SimilarityScore>(&prompt, SIMILARITY_SYSTEM)
        .await?)
}

/// Loads both users, enforces their roles, expands the alumni company, and
/// renders both profiles as prompt-ready JSON.
async fn profile_pair(
    store: &Store,
    request: &SimilarityRequest,
) -> Result<(String, String), AppError> {
    let student: User = store
        .get(request.student_id)
        .await?
        .ok_or_else(|| AppError::not_found("student"))?;
    let alumni: User = store
        .get(request.alumni_id)
        .await?
        .ok_or_else(|| AppError::not_found("alumni"))?;

    let mut violations = Violations::new();
    if student.as_student().is_none() {
        violations.push("studentId", "user is not a student");
    }
    if alumni.as_alumni().is_none() {
        violations.push("alumniId", "user is not an alumni");
    }
    violations.finish()?;

    let company = match alumni.as_alumni().and_then(|p| p.company_id) {
        Some(company_id) => store.get::<Company>(company_id).await?,
        None => None,
    };

    Ok((
        profile_json(&student, None).to_string(),
        profile_json(&alumni, company.as_ref()).to_string(),
    ))
}

/// Compact profile for the prompt: only fields the model should reason over,
/// with the company reference already resolved to its name and industry.
fn profile_json(user: &User, company: Option<&Company>) -> Value {
    let mut profile = json!({
        "name": user.name,
        "location": user.location,
        "bio": user.bio,
        "skills": user.skills,
        "interests": user.interests,
    });

    if let Some(student) = user.as_student() {
        profile["role"] = json!("student");
        profile["school"] = json!(student.school);
        profile["major"] = json!(student.major);
        profile["gradYear"] = json!(student.grad_year);
    }
    if let Some(alumni) = user.as_alumni() {
        profile["role"] = json!("alumni");
        profile["position"] = json!(alumni.position);
        profile["company"] = match company {
            Some(c) => json!({"name": c.name, "industry": c.industry, "location": c.location}),
            None => Value::Null,
        };
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlumniProfile, RoleProfile, StudentProfile};
    use chrono::Utc;

    fn make_user(profile: RoleProfile) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Dana".to_string(),
            email: "dana@school.edu".to_string(),
            avatar_key: None,
            location: Some("Boston".to_string()),
            bio: None,
            skills: vec!["rust".to_string(), "sql".to_string()],
            interests: vec!["databases".to_string()],
            profile,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_student() -> User {
        make_user(RoleProfile::Student(StudentProfile {
            school: "State University".to_string(),
            major: "CS".to_string(),
            grad_year: Some(2026),
        }))
    }

    fn make_alumni(company_id: Option<Uuid>) -> User {
        make_user(RoleProfile::Alumni(AlumniProfile {
            company_id,
            position: Some("Staff Engineer".to_string()),
            share_profile: true,
        }))
    }

    #[test]
    fn test_score_response_parses_camel_case_wire() {
        let wire = r#"{
            "scores": {
                "education": 80, "skills": 65, "interests": 70,
                "industry": 55, "location": 20, "careerPath": 60
            },
            "overall": 62
        }"#;
        let score: SimilarityScore = serde_json::from_str(wire).unwrap();
        assert_eq!(score.scores.career_path, 60);
        assert_eq!(score.overall, 62);
    }

    #[test]
    fn test_student_profile_json_has_school_not_company() {
        let profile = profile_json(&make_student(), None);
        assert_eq!(profile["role"], "student");
        assert_eq!(profile["school"], "State University");
        assert!(profile.get("company").is_none());
    }

    #[test]
    fn test_alumni_profile_json_resolves_company() {
        let company = Company {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            industry: "Tech".to_string(),
            logo_key: None,
            location: Some("Austin".to_string()),
            size: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let profile = profile_json(&make_alumni(Some(company.id)), Some(&company));
        assert_eq!(profile["company"]["name"], "Acme");
        assert_eq!(profile["company"]["industry"], "Tech");
        assert_eq!(profile["position"], "Staff Engineer");
    }

    #[tokio::test]
    async fn test_profile_pair_missing_user_is_not_found() {
        let store = Store::memory();
        let request = SimilarityRequest {
            student_id: Uuid::new_v4(),
            alumni_id: Uuid::new_v4(),
        };
        match profile_pair(&store, &request).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "student not found"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_profile_pair_rejects_swapped_roles() {
        let store = Store::memory();
        let student = make_student();
        let alumni = make_alumni(None);
        store.insert(&student).await.unwrap();
        store.insert(&alumni).await.unwrap();

        // Ids swapped: the alumni is offered as the student and vice versa.
        let request = SimilarityRequest {
            student_id: alumni.id,
            alumni_id: student.id,
        };
        match profile_pair(&store, &request).await {
            Err(AppError::Validation(fields)) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field, "studentId");
                assert_eq!(fields[1].field, "alumniId");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_profile_pair_tolerates_dangling_company() {
        let store = Store::memory();
        let student = make_student();
        let alumni = make_alumni(Some(Uuid::new_v4()));
        store.insert(&student).await.unwrap();
        store.insert(&alumni).await.unwrap();

        let request = SimilarityRequest {
            student_id: student.id,
            alumni_id: alumni.id,
        };
        let (_, alumni_json) = profile_pair(&store, &request).await.unwrap();
        let parsed: Value = serde_json::from_str(&alumni_json).unwrap();
        assert!(parsed["company"].is_null());
    }
}
