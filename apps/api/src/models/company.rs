use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::query::{FieldDef, FieldKind, Schema};
use crate::store::Entity;

/// A company referenced by users, applications, tips, and questions.
/// `logo_key` is an opaque object-storage key; this service never touches
/// the blob itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub industry: String,
    pub logo_key: Option<String>,
    pub location: Option<String>,
    /// Free-form headcount bucket, e.g. "501-1000".
    pub size: Option<String>,
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
            name: "name",
            kind: FieldKind::Text,
        },
        FieldDef {
            name: "industry",
            kind: FieldKind::Text,
        },
    ],
    sortable: &[
        FieldDef {
            name: "name",
            kind: FieldKind::Text,
        },
        FieldDef {
            name: "industry",
            kind: FieldKind::Text,
        },
    ],
    searchable: &["name", "industry", "location"],
};

impl Entity for Company {
    const COLLECTION: &'static str = "companies";

    fn id(&self) -> Uuid {
        self.id
    }

    fn schema() -> &'static Schema {
        &SCHEMA
    }
}
