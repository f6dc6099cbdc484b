use pagination::Page;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ClientError;
use crate::types::{
    Application, ApplicationPatch, Company, CompanyPatch, InterviewQuestion,
    InterviewQuestionPatch, LeetcodeQuestion, LeetcodeQuestionPatch, NewApplication, NewCompany,
    NewInterviewQuestion, NewLeetcodeQuestion, NewTip, NewUser, SimilarityOverview,
    SimilarityRequest, SimilarityScore, Tip, TipPatch, User, UserPatch,
};

/// Query-string builder for list endpoints: paging plus whatever filters the
/// endpoint understands (`role`, `industry`, `userId`, `company`, ...).
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pairs: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, page: u32) -> Self {
        self.with("page", page)
    }

    pub fn per_page(self, per_page: u32) -> Self {
        self.with("perPage", per_page)
    }

    /// Case-insensitive substring search over the endpoint's search fields.
    pub fn query(self, needle: &str) -> Self {
        self.with("query", needle)
    }

    /// Sort key; prefix with `-` for descending.
    pub fn sort_by(self, key: &str) -> Self {
        self.with("sortBy", key)
    }

    /// Endpoint-specific filter, e.g. `filter("industry", "Finance,Tech")`.
    pub fn filter(self, key: &str, value: impl ToString) -> Self {
        self.with(key, value)
    }

    fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Typed wrapper over the REST API. Cheap to clone; holds one connection
/// pool for the process.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // ── Plumbing ─────────────────────────────────────────────────────────────

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQuery,
    ) -> Result<Page<T>, ClientError> {
        debug!("GET {path}");
        let response = self
            .http
            .get(self.url(path))
            .query(query.pairs())
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn fetch_one<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        debug!("GET {path}");
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        debug!("POST {path}");
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        debug!("PATCH {path}");
        let response = self.http.patch(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn delete_path(&self, path: &str) -> Result<(), ClientError> {
        debug!("DELETE {path}");
        let response = self.http.delete(self.url(path)).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await?;
            warn!("API returned {status}: {body}");
            Err(ClientError::from_response(status, &body))
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let body = response.text().await?;
            warn!("API returned {status}: {body}");
            Err(ClientError::from_response(status, &body))
        }
    }

    // ── Users ────────────────────────────────────────────────────────────────

    pub async fn list_users(&self, query: &ListQuery) -> Result<Page<User>, ClientError> {
        self.fetch_list("/api/users", query).await
    }

    /// The shared alumni directory: only alumni with `shareProfile` set.
    pub async fn list_alumni(&self, query: &ListQuery) -> Result<Page<User>, ClientError> {
        self.fetch_list("/api/users/alumni", query).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, ClientError> {
        self.fetch_one(&format!("/api/users/{id}")).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ClientError> {
        self.post_json("/api/users", user).await
    }

    pub async fn update_user(&self, id: Uuid, patch: &UserPatch) -> Result<User, ClientError> {
        self.patch_json(&format!("/api/users/{id}"), patch).await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete_path(&format!("/api/users/{id}")).await
    }

    // ── Companies ────────────────────────────────────────────────────────────

    pub async fn list_companies(&self, query: &ListQuery) -> Result<Page<Company>, ClientError> {
        self.fetch_list("/api/companies", query).await
    }

    pub async fn get_company(&self, id: Uuid) -> Result<Company, ClientError> {
        self.fetch_one(&format!("/api/companies/{id}")).await
    }

    pub async fn create_company(&self, company: &NewCompany) -> Result<Company, ClientError> {
        self.post_json("/api/companies", company).await
    }

    pub async fn update_company(
        &self,
        id: Uuid,
        patch: &CompanyPatch,
    ) -> Result<Company, ClientError> {
        self.patch_json(&format!("/api/companies/{id}"), patch).await
    }

    pub async fn delete_company(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete_path(&format!("/api/companies/{id}")).await
    }

    // ── Applications: applied ────────────────────────────────────────────────

    pub async fn list_applied(&self, query: &ListQuery) -> Result<Page<Application>, ClientError> {
        self.fetch_list("/api/applications/applied", query).await
    }

    pub async fn get_applied(&self, id: Uuid) -> Result<Application, ClientError> {
        self.fetch_one(&format!("/api/applications/applied/{id}")).await
    }

    pub async fn create_applied(
        &self,
        application: &NewApplication,
    ) -> Result<Application, ClientError> {
        self.post_json("/api/applications/applied", application).await
    }

    pub async fn update_applied(
        &self,
        id: Uuid,
        patch: &ApplicationPatch,
    ) -> Result<Application, ClientError> {
        self.patch_json(&format!("/api/applications/applied/{id}"), patch)
            .await
    }

    pub async fn delete_applied(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete_path(&format!("/api/applications/applied/{id}"))
            .await
    }

    // ── Applications: saved ──────────────────────────────────────────────────

    pub async fn list_saved(&self, query: &ListQuery) -> Result<Page<Application>, ClientError> {
        self.fetch_list("/api/applications/saved", query).await
    }

    pub async fn get_saved(&self, id: Uuid) -> Result<Application, ClientError> {
        self.fetch_one(&format!("/api/applications/saved/{id}")).await
    }

    pub async fn create_saved(
        &self,
        application: &NewApplication,
    ) -> Result<Application, ClientError> {
        self.post_json("/api/applications/saved", application).await
    }

    pub async fn update_saved(
        &self,
        id: Uuid,
        patch: &ApplicationPatch,
    ) -> Result<Application, ClientError> {
        self.patch_json(&format!("/api/applications/saved/{id}"), patch)
            .await
    }

    pub async fn delete_saved(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete_path(&format!("/api/applications/saved/{id}"))
            .await
    }

    // ── Interview questions ──────────────────────────────────────────────────

    pub async fn list_interview_questions(
        &self,
        query: &ListQuery,
    ) -> Result<Page<InterviewQuestion>, ClientError> {
        self.fetch_list("/api/questions/interview", query).await
    }

    pub async fn get_interview_question(
        &self,
        id: Uuid,
    ) -> Result<InterviewQuestion, ClientError> {
        self.fetch_one(&format!("/api/questions/interview/{id}")).await
    }

    pub async fn create_interview_question(
        &self,
        question: &NewInterviewQuestion,
    ) -> Result<InterviewQuestion, ClientError> {
        self.post_json("/api/questions/interview", question).await
    }

    pub async fn update_interview_question(
        &self,
        id: Uuid,
        patch: &InterviewQuestionPatch,
    ) -> Result<InterviewQuestion, ClientError> {
        self.patch_json(&format!("/api/questions/interview/{id}"), patch)
            .await
    }

    pub async fn delete_interview_question(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete_path(&format!("/api/questions/interview/{id}"))
            .await
    }

    // ── Leetcode questions ───────────────────────────────────────────────────

    pub async fn list_leetcode_questions(
        &self,
        query: &ListQuery,
    ) -> Result<Page<LeetcodeQuestion>, ClientError> {
        self.fetch_list("/api/questions/leetcode", query).await
    }

    pub async fn get_leetcode_question(&self, id: Uuid) -> Result<LeetcodeQuestion, ClientError> {
        self.fetch_one(&format!("/api/questions/leetcode/{id}")).await
    }

    pub async fn create_leetcode_question(
        &self,
        question: &NewLeetcodeQuestion,
    ) -> Result<LeetcodeQuestion, ClientError> {
        self.post_json("/api/questions/leetcode", question).await
    }

    pub async fn update_leetcode_question(
        &self,
        id: Uuid,
        patch: &LeetcodeQuestionPatch,
    ) -> Result<LeetcodeQuestion, ClientError> {
        self.patch_json(&format!("/api/questions/leetcode/{id}"), patch)
            .await
    }

    pub async fn delete_leetcode_question(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete_path(&format!("/api/questions/leetcode/{id}"))
            .await
    }

    // ── Tips ─────────────────────────────────────────────────────────────────

    pub async fn list_tips(&self, query: &ListQuery) -> Result<Page<Tip>, ClientError> {
        self.fetch_list("/api/tips", query).await
    }

    pub async fn get_tip(&self, id: Uuid) -> Result<Tip, ClientError> {
        self.fetch_one(&format!("/api/tips/{id}")).await
    }

    pub async fn create_tip(&self, tip: &NewTip) -> Result<Tip, ClientError> {
        self.post_json("/api/tips", tip).await
    }

    pub async fn update_tip(&self, id: Uuid, patch: &TipPatch) -> Result<Tip, ClientError> {
        self.patch_json(&format!("/api/tips/{id}"), patch).await
    }

    pub async fn delete_tip(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete_path(&format!("/api/tips/{id}")).await
    }

    // ── Similarity ───────────────────────────────────────────────────────────

    pub async fn similarity_overview(
        &self,
        request: &SimilarityRequest,
    ) -> Result<SimilarityOverview, ClientError> {
        self.post_json("/api/similarity/overview", request).await
    }

    pub async fn similarity_score(
        &self,
        request: &SimilarityRequest,
    ) -> Result<SimilarityScore, ClientError> {
        self.post_json("/api/similarity/score", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_collects_pairs_in_order() {
        let query = ListQuery::new()
            .page(2)
            .per_page(50)
            .query("rust")
            .sort_by("-deadline")
            .filter("industry", "Finance,Tech");
        assert_eq!(
            query.pairs(),
            &[
                ("page".to_string(), "2".to_string()),
                ("perPage".to_string(), "50".to_string()),
                ("query".to_string(), "rust".to_string()),
                ("sortBy".to_string(), "-deadline".to_string()),
                ("industry".to_string(), "Finance,Tech".to_string()),
            ]
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.url("/api/users"), "http://localhost:8080/api/users");
    }
}
