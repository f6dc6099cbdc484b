use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::company::Company;
use crate::store::query::{FieldDef, FieldKind, Schema};
use crate::store::Entity;

/// A job application a user is actively tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub position: String,
    #[serde(default)]
    pub job_link: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

static SCHEMA: Schema = Schema {
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
            name: "position",
            kind: FieldKind::Text,
        },
    ],
    sortable: &[
        FieldDef {
            name: "deadline",
            kind: FieldKind::Date,
        },
        FieldDef {
            name: "position",
            kind: FieldKind::Text,
        },
    ],
    searchable: &["position"],
};

impl Entity for Application {
    const COLLECTION: &'static str = "applications";

    fn id(&self) -> Uuid {
        self.id
    }

    fn schema() -> &'static Schema {
        &SCHEMA
    }
}

/// A posting saved for later. Same shape as [`Application`], stored in its
/// own collection so the applied and saved lists never bleed into each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedApplication(pub Application);

impl Entity for SavedApplication {
    const COLLECTION: &'static str = "saved_applications";

    fn id(&self) -> Uuid {
        self.0.id
    }

    fn schema() -> &'static Schema {
        &SCHEMA
    }
}

impl From<Application> for SavedApplication {
    fn from(app: Application) -> Self {
        SavedApplication(app)
    }
}

impl From<SavedApplication> for Application {
    fn from(saved: SavedApplication) -> Self {
        saved.0
    }
}

/// Response shape with the company reference expanded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: Option<Company>,
    pub position: String,
    pub job_link: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationView {
    pub fn from_application(app: Application, company: Option<Company>) -> Self {
        Self {
            id: app.id,
            user_id: app.user_id,
            company,
            position: app.position,
            job_link: app.job_link,
            deadline: app.deadline,
            notes: app.notes,
            created_at: app.created_at,
            updated_at: app.updated_at,
        }
    }
}
