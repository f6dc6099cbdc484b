use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::company::Company;
use crate::store::query::{FieldDef, FieldKind, Schema};
use crate::store::Entity;

/// An interview question reported by a user, optionally tied to the company
/// that asked it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuestion {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub company_id: Option<Uuid>,
    pub question: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

static INTERVIEW_SCHEMA: Schema = Schema {
    filterable: &[
        FieldDef {
            name: "_id",
            kind: FieldKind::Id,
        },
        FieldDef {
            name: "userId",
            kind: FieldKind::Id,
        },
        FieldDef {
            name: "companyId",
            kind: FieldKind::Id,
        },
        FieldDef {
            name: "question",
            kind: FieldKind::Text,
        },
    ],
    sortable: &[FieldDef {
        name: "date",
        kind: FieldKind::Date,
    }],
    searchable: &["question"],
};

impl Entity for InterviewQuestion {
    const COLLECTION: &'static str = "interview_questions";

    fn id(&self) -> Uuid {
        self.id
    }

    fn schema() -> &'static Schema {
        &INTERVIEW_SCHEMA
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuestionView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: Option<Company>,
    pub question: String,
    pub date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InterviewQuestionView {
    pub fn from_question(q: InterviewQuestion, company: Option<Company>) -> Self {
        Self {
            id: q.id,
            user_id: q.user_id,
            company,
            question: q.question,
            date: q.date,
            created_at: q.created_at,
            updated_at: q.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Wire spelling, as stored and filtered.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// A curated practice problem shared with the community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetcodeQuestion {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

static LEETCODE_SCHEMA: Schema = Schema {
    filterable: &[
        FieldDef {
            name: "_id",
            kind: FieldKind::Id,
        },
        FieldDef {
            name: "userId",
            kind: FieldKind::Id,
        },
        FieldDef {
            name: "title",
            kind: FieldKind::Text,
        },
        FieldDef {
            name: "difficulty",
            kind: FieldKind::Text,
        },
    ],
    sortable: &[FieldDef {
        name: "title",
        kind: FieldKind::Text,
    }],
    searchable: &["title", "topics"],
};

impl Entity for LeetcodeQuestion {
    const COLLECTION: &'static str = "leetcode_questions";

    fn id(&self) -> Uuid {
        self.id
    }

    fn schema() -> &'static Schema {
        &LEETCODE_SCHEMA
    }
}
