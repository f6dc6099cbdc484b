use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::company::Company;
use crate::store::query::{FieldDef, FieldKind, Schema};
use crate::store::Entity;

/// A shared interview or career tip, optionally pinned to a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub company_id: Option<Uuid>,
    pub text: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
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
    ],
    sortable: &[FieldDef {
        name: "date",
        kind: FieldKind::Date,
    }],
    searchable: &["text"],
};

impl Entity for Tip {
    const COLLECTION: &'static str = "tips";

    fn id(&self) -> Uuid {
        self.id
    }

    fn schema() -> &'static Schema {
        &SCHEMA
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TipView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: Option<Company>,
    pub text: String,
    pub date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TipView {
    pub fn from_tip(tip: Tip, company: Option<Company>) -> Self {
        Self {
            id: tip.id,
            user_id: tip.user_id,
            company,
            text: tip.text,
            date: tip.date,
            created_at: tip.created_at,
            updated_at: tip.updated_at,
        }
    }
}
